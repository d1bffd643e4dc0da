//! Compiler
mod compiler;
mod frame;

use crate::{error::JackResult, lex::Lexer, vm::VmWriter};

pub use self::{
    compiler::Compiler,
    frame::{Frame, IfLabels, SubroutineKind, WhileLabels},
};

/// Compile a Jack class with the default configuration.
pub fn compile_str(source_code: impl AsRef<str>) -> JackResult<VmWriter> {
    compile_with(source_code, CompilerConf::default())
}

pub fn compile_with(source_code: impl AsRef<str>, conf: CompilerConf) -> JackResult<VmWriter> {
    let lexer = Lexer::new(source_code.as_ref());
    Compiler::new(lexer, conf).compile()
}

#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct CompilerConf {
    /// Prefix generated labels with the enclosing function name,
    /// as in `Main.main$WHILE_EXP0`.
    ///
    /// Off by default, so labels are unique per function only.
    pub qualify_labels: bool,
}
