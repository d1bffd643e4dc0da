pub mod compile;
pub mod constants;
mod error;
pub mod lex;
pub mod symbol;
pub mod trace;
pub mod vm;

/// Version of the compiler crate.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use self::{
    compile::{compile_str, compile_with, CompilerConf},
    error::{Diagnostic, DiagnosticKind, JackError, JackResult, SyntaxError, SyntaxErrorKind},
};

pub mod prelude {
    pub use super::{
        compile::{compile_str, compile_with, Compiler, CompilerConf},
        error::{JackError, JackResult},
        symbol::{Symbol, SymbolKind, SymbolTable},
        trace::token_listing,
        vm::{Command, Instruction, Segment, VmWriter},
    };
}
