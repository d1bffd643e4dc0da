//! Stack VM instructions and the writer that records them.
use std::{fmt, io};

use smol_str::SmolStr;

use crate::constants::{MATH_DIVIDE, MATH_MULTIPLY};

/// Addressable memory region of the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Argument => write!(f, "argument"),
            Self::Local    => write!(f, "local"),
            Self::Static   => write!(f, "static"),
            Self::This     => write!(f, "this"),
            Self::That     => write!(f, "that"),
            Self::Pointer  => write!(f, "pointer"),
            Self::Temp     => write!(f, "temp"),
        }
    }
}

/// Arithmetic and logical operation.
///
/// `Multiply` and `Divide` have no VM instruction. The writer
/// lowers them to calls into the `Math` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Multiply,
    Divide,
}

/// One line of VM code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(Segment, u16),
    Pop(Segment, u16),
    /// Native arithmetic only. Never `Multiply` or `Divide`.
    Arithmetic(Command),
    Label(SmolStr),
    Goto(SmolStr),
    IfGoto(SmolStr),
    Call(SmolStr, u16),
    Function(SmolStr, u16),
    Return,
}

/// Outputs instruction as VM code.
impl fmt::Display for Instruction {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction as I;
        match self {
            I::Push(segment, index) => write!(f, "push {segment} {index}"),
            I::Pop(segment, index)  => write!(f, "pop {segment} {index}"),
            I::Arithmetic(command)  => write!(f, "{command}"),
            I::Label(name)          => write!(f, "label {name}"),
            I::Goto(name)           => write!(f, "goto {name}"),
            I::IfGoto(name)         => write!(f, "if-goto {name}"),
            I::Call(name, n)        => write!(f, "call {name} {n}"),
            I::Function(name, n)    => write!(f, "function {name} {n}"),
            I::Return               => write!(f, "return"),
        }
    }
}

impl fmt::Display for Command {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add      => write!(f, "add"),
            Self::Sub      => write!(f, "sub"),
            Self::Neg      => write!(f, "neg"),
            Self::Eq       => write!(f, "eq"),
            Self::Gt       => write!(f, "gt"),
            Self::Lt       => write!(f, "lt"),
            Self::And      => write!(f, "and"),
            Self::Or       => write!(f, "or"),
            Self::Not      => write!(f, "not"),
            Self::Multiply => write!(f, "call {MATH_MULTIPLY} 2"),
            Self::Divide   => write!(f, "call {MATH_DIVIDE} 2"),
        }
    }
}

/// Append-only buffer of emitted instructions.
///
/// Nothing is rendered until the whole unit has compiled, so a
/// failed compilation never leaves partial output behind.
#[derive(Debug, Default)]
pub struct VmWriter {
    instructions: Vec<Instruction>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    #[inline]
    pub fn write_push(&mut self, segment: Segment, index: u16) {
        self.instructions.push(Instruction::Push(segment, index));
    }

    #[inline]
    pub fn write_pop(&mut self, segment: Segment, index: u16) {
        self.instructions.push(Instruction::Pop(segment, index));
    }

    pub fn write_arithmetic(&mut self, command: Command) {
        let instruction = match command {
            Command::Multiply => Instruction::Call(MATH_MULTIPLY.into(), 2),
            Command::Divide => Instruction::Call(MATH_DIVIDE.into(), 2),
            _ => Instruction::Arithmetic(command),
        };
        self.instructions.push(instruction);
    }

    pub fn write_label(&mut self, name: impl Into<SmolStr>) {
        self.instructions.push(Instruction::Label(name.into()));
    }

    pub fn write_goto(&mut self, name: impl Into<SmolStr>) {
        self.instructions.push(Instruction::Goto(name.into()));
    }

    pub fn write_if(&mut self, name: impl Into<SmolStr>) {
        self.instructions.push(Instruction::IfGoto(name.into()));
    }

    pub fn write_call(&mut self, name: impl Into<SmolStr>, arg_count: u16) {
        self.instructions.push(Instruction::Call(name.into(), arg_count));
    }

    pub fn write_function(&mut self, name: impl Into<SmolStr>, local_count: u16) {
        self.instructions.push(Instruction::Function(name.into(), local_count));
    }

    pub fn write_return(&mut self) {
        self.instructions.push(Instruction::Return);
    }

    /// Render every instruction, one per line, into the given sink.
    pub fn write_to(&self, mut sink: impl io::Write) -> io::Result<()> {
        for instruction in &self.instructions {
            writeln!(sink, "{instruction}")?;
        }
        sink.flush()
    }
}

impl fmt::Display for VmWriter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let cases: &[(Instruction, &str)] = &[
            (Instruction::Push(Segment::Constant, 7), "push constant 7"),
            (Instruction::Pop(Segment::Pointer, 1), "pop pointer 1"),
            (Instruction::Push(Segment::That, 0), "push that 0"),
            (Instruction::Arithmetic(Command::Not), "not"),
            (Instruction::Label("WHILE_EXP0".into()), "label WHILE_EXP0"),
            (Instruction::Goto("IF_END2".into()), "goto IF_END2"),
            (Instruction::IfGoto("IF_TRUE0".into()), "if-goto IF_TRUE0"),
            (Instruction::Call("Output.printInt".into(), 1), "call Output.printInt 1"),
            (Instruction::Function("Main.main".into(), 3), "function Main.main 3"),
            (Instruction::Return, "return"),
        ];

        for (instruction, expected) in cases {
            assert_eq!(instruction.to_string(), *expected);
        }
    }

    #[test]
    fn test_multiply_divide_lowered_to_calls() {
        let mut writer = VmWriter::new();
        writer.write_arithmetic(Command::Add);
        writer.write_arithmetic(Command::Multiply);
        writer.write_arithmetic(Command::Divide);

        assert_eq!(
            writer.instructions(),
            &[
                Instruction::Arithmetic(Command::Add),
                Instruction::Call("Math.multiply".into(), 2),
                Instruction::Call("Math.divide".into(), 2),
            ]
        );
    }

    #[test]
    fn test_render() {
        let mut writer = VmWriter::new();
        writer.write_function("Main.main", 0);
        writer.write_push(Segment::Constant, 0);
        writer.write_return();

        const EXPECTED: &str = "function Main.main 0\npush constant 0\nreturn\n";
        assert_eq!(writer.to_string(), EXPECTED);

        let mut buf = Vec::new();
        writer.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), EXPECTED);
    }
}
