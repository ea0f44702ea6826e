//! Positioned input and the outcome model every parser returns.
//!
//! A [`State`] is an immutable cursor: advancing returns a new value and the
//! underlying text is only ever borrowed. Line and column are 0-based.

use thiserror::Error;

/// Label carried by [`ParserError::TooDeeplyNested`].
pub const NESTING_ERROR: &str = "too many nested type specifiers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State<'s> {
    pub input: &'s str,
    pub line:  usize,
    pub col:   usize,
    /// Byte offset into `input`. Never decreases across a parse.
    pub pos:   usize,
}

impl<'s> State<'s> {
    pub fn new(input: &'s str) -> Self {
        State { input, line: 0, col: 0, pos: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The character under the cursor, or `None` at end of input.
    pub fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the state one character ahead. A newline moves to column 0 of
    /// the next line. At end of input the state is returned unchanged.
    pub fn advance(&self) -> State<'s> {
        match self.current_char() {
            Some('\n') => State {
                line: self.line + 1,
                col:  0,
                pos:  self.pos + 1,
                ..*self
            },
            Some(c) => State {
                col: self.col + 1,
                pos: self.pos + c.len_utf8(),
                ..*self
            },
            None => *self,
        }
    }

    /// The input not yet consumed.
    pub fn remaining(&self) -> &'s str {
        &self.input[self.pos..]
    }
}

/// A successful parse: the produced value and the state after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<'s, T> {
    pub value: T,
    pub state: State<'s>,
}

impl<'s, T> Success<'s, T> {
    pub fn new(value: T, state: State<'s>) -> Self {
        Success { value, state }
    }
}

pub type ParseResult<'s, T> = Result<Success<'s, T>, ParserError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("Error parsing {}. Unexpected '{found}' at Line {line}, Column {col}", display_label(.label))]
    UnexpectedToken {
        label: Option<String>,
        found: char,
        line:  usize,
        col:   usize,
    },

    #[error("Error parsing {}. No more input", display_label(.label))]
    NoMoreInput { label: Option<String> },

    #[error("Error parsing {}. Syntax error at Line {line}, Column {col}", display_label(.label))]
    SyntaxError {
        label: Option<String>,
        line:  usize,
        col:   usize,
    },

    /// A `List`/`Map` opened past the nesting bound. Keeps its label through
    /// every enclosing rule.
    #[error("Error parsing field-type. Too many nested type specifiers at Line {line}, Column {col}")]
    TooDeeplyNested { line: usize, col: usize },
}

fn display_label(label: &Option<String>) -> &str {
    label.as_deref().unwrap_or("unknown")
}

impl ParserError {
    pub fn unexpected(label: &str, found: char, state: &State<'_>) -> Self {
        ParserError::UnexpectedToken {
            label: Some(label.to_string()),
            found,
            line: state.line,
            col: state.col,
        }
    }

    pub fn no_more_input(label: &str) -> Self {
        ParserError::NoMoreInput { label: Some(label.to_string()) }
    }

    pub fn syntax(label: &str, state: &State<'_>) -> Self {
        ParserError::SyntaxError {
            label: Some(label.to_string()),
            line:  state.line,
            col:   state.col,
        }
    }

    pub fn too_deeply_nested(state: &State<'_>) -> Self {
        ParserError::TooDeeplyNested { line: state.line, col: state.col }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ParserError::UnexpectedToken { label, .. }
            | ParserError::NoMoreInput { label }
            | ParserError::SyntaxError { label, .. } => label.as_deref(),
            ParserError::TooDeeplyNested { .. } => Some(NESTING_ERROR),
        }
    }

    /// Returns the same error carrying `label` instead of its current one.
    pub fn relabel(self, label: &str) -> Self {
        let label = Some(label.to_string());
        match self {
            ParserError::UnexpectedToken { found, line, col, .. } => {
                ParserError::UnexpectedToken { label, found, line, col }
            }
            ParserError::NoMoreInput { .. } => ParserError::NoMoreInput { label },
            ParserError::SyntaxError { line, col, .. } => ParserError::SyntaxError { label, line, col },
            nested @ ParserError::TooDeeplyNested { .. } => nested,
        }
    }

    /// Line and column of the failure, if the error carries one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParserError::UnexpectedToken { line, col, .. }
            | ParserError::SyntaxError { line, col, .. }
            | ParserError::TooDeeplyNested { line, col } => Some((*line, *col)),
            ParserError::NoMoreInput { .. } => None,
        }
    }

    /// Whether the failure lies beyond `state`, meaning the rule started at
    /// `state` matched something before it broke.
    pub fn is_past(&self, state: &State<'_>) -> bool {
        self.position().map_or(true, |at| at > (state.line, state.col))
    }

    /// Whichever of two failures got further into the input. A nesting error
    /// beats any other failure and running out of input counts as furthest;
    /// on a tie `other` wins.
    pub fn furthest(self, other: ParserError) -> ParserError {
        let nested = |err: &ParserError| matches!(err, ParserError::TooDeeplyNested { .. });
        if nested(&other) {
            return other;
        }
        if nested(&self) {
            return self;
        }
        match (self.position(), other.position()) {
            (None, Some(_)) => self,
            (Some(this), Some(that)) if this > that => self,
            _ => other,
        }
    }
}
