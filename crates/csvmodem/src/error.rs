use std::io;

use bstr::BString;
use thiserror::Error;

/// A fatal failure of a parse run, tagged with the 1-based line and column of
/// the character being examined when it occurred.
#[derive(Error, Debug)]
#[error("{kind} at {line}:{column}")]
pub struct ParserError {
    #[source]
    pub(crate) kind: ErrorKind,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl ParserError {
    pub(crate) fn new(kind: ErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes the error, returning what went wrong.
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}

impl From<OptionsError> for ParserError {
    fn from(err: OptionsError) -> Self {
        Self::new(ErrorKind::Options(err), 0, 0)
    }
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid {encoding} byte sequence {bytes:?}")]
    Decoding {
        encoding: &'static str,
        bytes: BString,
    },
    #[error("unterminated quoted field")]
    UnterminatedQuote,
    #[error("unexpected character '{0}' after closing quote")]
    MalformedQuote(char),
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
}

/// Rejected [`ParserOptions`](crate::ParserOptions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{first} and {second} characters are both '{ch}'")]
    DuplicateGrammarChar {
        first: &'static str,
        second: &'static str,
        ch: char,
    },
    #[error("{name} character cannot be a line terminator")]
    LineTerminator { name: &'static str },
    #[error("buffer size must be at least 1")]
    ZeroBufferSize,
    #[error("unknown encoding label `{0}`")]
    UnknownEncoding(String),
}
