//! Character cursor over source text.
use std::{iter::Peekable, str::CharIndices};

/// Stand-in character returned when the cursor has run
/// past the end of the source.
pub const EOF_CHAR: char = '\0';

/// Scans the source one character at a time, keeping
/// track of the current character and its byte offset.
///
/// Starts *before* the first character. Call [`Cursor::next`]
/// once to prime it.
pub struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    /// Byte offset and value of the current character.
    current: (usize, char),
    len: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            current: (0, EOF_CHAR),
            len: text.len(),
        }
    }

    /// Advance to the next character and return it.
    ///
    /// Once the end is reached the cursor stays there,
    /// returning [`EOF_CHAR`].
    pub fn next(&mut self) -> char {
        self.current = match self.chars.next() {
            Some(pair) => pair,
            None => (self.len, EOF_CHAR),
        };
        self.current.1
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    /// The character after the current one, without advancing.
    #[inline]
    pub fn peek(&mut self) -> char {
        self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR)
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.current.0 as u32
    }

    /// Byte offset of the character after the current one.
    #[inline]
    pub fn peek_offset(&mut self) -> u32 {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len) as u32
    }

    /// The current character lies past the end of the source.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}
