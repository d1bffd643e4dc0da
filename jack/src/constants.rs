//! Constant values of the Jack language and its VM target.

/// Largest integer constant the VM can push.
pub const MAX_INT: u16 = 0x7FFF; // 32767

/// Number of hash buckets in a symbol table.
///
/// Prime, so the bucket order of names spreads evenly.
pub const TABLE_SIZE: usize = 31;

/// Temp segment slot that swallows the unused result of a `do` call.
pub const TEMP_DISCARD: u16 = 0;

/// Temp segment slot holding an array element address while
/// the right hand side of a `let` is evaluated.
pub const TEMP_ARRAY_ADDR: u16 = 1;

// OS routines the generated code calls into.
pub const MEMORY_ALLOC: &str = "Memory.alloc";
pub const MATH_MULTIPLY: &str = "Math.multiply";
pub const MATH_DIVIDE: &str = "Math.divide";
pub const STRING_NEW: &str = "String.new";
pub const STRING_APPEND_CHAR: &str = "String.appendChar";

// Generated label prefixes. The per-subroutine counter is appended.
pub const LABEL_WHILE_EXP: &str = "WHILE_EXP";
pub const LABEL_WHILE_END: &str = "WHILE_END";
pub const LABEL_IF_TRUE: &str = "IF_TRUE";
pub const LABEL_IF_FALSE: &str = "IF_FALSE";
pub const LABEL_IF_END: &str = "IF_END";

/// File extension of Jack source files.
pub const SOURCE_EXTENSION: &str = "jack";

/// File extension of generated VM files.
pub const OUTPUT_EXTENSION: &str = "vm";
