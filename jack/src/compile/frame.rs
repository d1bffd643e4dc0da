//! Per-subroutine compilation state.
use smol_str::SmolStr;

use crate::{
    constants::{LABEL_IF_END, LABEL_IF_FALSE, LABEL_IF_TRUE, LABEL_WHILE_END, LABEL_WHILE_EXP},
    lex::Keyword,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl SubroutineKind {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Constructor => Some(Self::Constructor),
            Keyword::Function => Some(Self::Function),
            Keyword::Method => Some(Self::Method),
            _ => None,
        }
    }
}

/// State of the subroutine currently being compiled.
///
/// A new frame is created for every subroutine, so label
/// numbering restarts at zero in each one.
#[derive(Debug)]
pub struct Frame {
    /// Fully qualified name, `Class.name`.
    pub function: SmolStr,
    pub kind: SubroutineKind,
    while_count: u32,
    if_count: u32,
    /// Prefix labels with the function name.
    qualify: bool,
}

/// Labels of one `while` statement.
pub struct WhileLabels {
    pub exp: SmolStr,
    pub end: SmolStr,
}

/// Labels of one `if` statement.
pub struct IfLabels {
    pub on_true: SmolStr,
    pub on_false: SmolStr,
    pub end: SmolStr,
}

impl Frame {
    pub fn new(function: impl Into<SmolStr>, kind: SubroutineKind, qualify: bool) -> Self {
        Self {
            function: function.into(),
            kind,
            while_count: 0,
            if_count: 0,
            qualify,
        }
    }

    pub fn next_while(&mut self) -> WhileLabels {
        let n = self.while_count;
        self.while_count += 1;
        WhileLabels {
            exp: self.label(LABEL_WHILE_EXP, n),
            end: self.label(LABEL_WHILE_END, n),
        }
    }

    pub fn next_if(&mut self) -> IfLabels {
        let n = self.if_count;
        self.if_count += 1;
        IfLabels {
            on_true: self.label(LABEL_IF_TRUE, n),
            on_false: self.label(LABEL_IF_FALSE, n),
            end: self.label(LABEL_IF_END, n),
        }
    }

    fn label(&self, prefix: &str, n: u32) -> SmolStr {
        if self.qualify {
            SmolStr::from(format!("{}${prefix}{n}", self.function))
        } else {
            SmolStr::from(format!("{prefix}{n}"))
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new("", SubroutineKind::Function, false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_independent_counters() {
        let mut frame = Frame::new("Main.main", SubroutineKind::Function, false);

        assert_eq!(frame.next_while().exp, "WHILE_EXP0");
        let labels = frame.next_while();
        assert_eq!(labels.exp, "WHILE_EXP1");
        assert_eq!(labels.end, "WHILE_END1");

        let labels = frame.next_if();
        assert_eq!(labels.on_true, "IF_TRUE0");
        assert_eq!(labels.on_false, "IF_FALSE0");
        assert_eq!(labels.end, "IF_END0");
    }

    #[test]
    fn test_qualified_labels() {
        let mut frame = Frame::new("Main.main", SubroutineKind::Function, true);
        assert_eq!(frame.next_while().end, "Main.main$WHILE_END0");
        assert_eq!(frame.next_if().on_true, "Main.main$IF_TRUE0");
    }
}
