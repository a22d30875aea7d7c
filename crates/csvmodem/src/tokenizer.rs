//! Character-level CSV state machine.
//!
//! The tokenizer turns the decoded character stream into a flat sequence of
//! [`Token`]s: closed fields (with a flag marking the last field of a record),
//! blank lines, and comment lines. Record assembly and field post-processing
//! happen one layer up.
//!
//! Line terminators are `\n`, `\r\n`, and a lone `\r`. Grammar characters
//! (delimiter, quote, escape, comment) are compared by `char`, so any Unicode
//! scalar value works.

use std::io::Read;

use crate::{
    ParserOptions,
    buffer::{Buffer, PeekedChar},
    control::CancelHandle,
    error::{ErrorKind, ParserError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A closed, raw field. `last` is set when a line terminator or the end
    /// of input closed it.
    Field { value: String, last: bool },
    /// A line with no characters at all.
    EmptyLine,
    /// A comment line, without the comment character and the terminator.
    Comment(String),
    /// Cancellation was observed. No further tokens follow.
    Cancelled,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    RecordStart,
    FieldStart,
    UnquotedField,
    QuotedField,
    QuotedFieldEscape,
    AfterQuote,
    Comment,
    Done,
}

pub(crate) struct Tokenizer<R> {
    buffer: Buffer<R>,
    cancel: CancelHandle,

    delimiter: char,
    quote: char,
    escape: Option<char>,
    comment: Option<char>,

    state: State,
    field: String,

    line: usize,
    column: usize,
    after_cr: bool,
}

impl<R: Read> Tokenizer<R> {
    pub(crate) fn new(buffer: Buffer<R>, options: &ParserOptions, cancel: CancelHandle) -> Self {
        Self {
            buffer,
            cancel,
            delimiter: options.delimiter,
            quote: options.quote_char,
            escape: options.escape_char,
            comment: options.comment_char,
            state: State::RecordStart,
            field: String::new(),
            line: 1,
            column: 1,
            after_cr: false,
        }
    }

    /// Produces the next token. After [`Token::Eof`], [`Token::Cancelled`], or
    /// an error, every further call returns [`Token::Eof`].
    pub(crate) fn next_token(&mut self) -> Result<Token, ParserError> {
        loop {
            if self.state == State::Done {
                return Ok(Token::Eof);
            }
            if self.cancel.is_cancelled() {
                tracing::debug!(line = self.line, column = self.column, "cancellation observed");
                self.state = State::Done;
                self.field.clear();
                return Ok(Token::Cancelled);
            }

            let next = match self.buffer.peek() {
                Ok(next) => next,
                Err(kind) => return Err(self.fail(kind)),
            };
            match self.step(next) {
                Ok(Some(token)) => return Ok(token),
                Ok(None) => {}
                Err(kind) => return Err(self.fail(kind)),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn fail(&mut self, kind: ErrorKind) -> ParserError {
        self.state = State::Done;
        ParserError::new(kind, self.line, self.column)
    }

    #[expect(clippy::too_many_lines)]
    fn step(&mut self, next: PeekedChar) -> Result<Option<Token>, ErrorKind> {
        use PeekedChar::{Char, EndOfInput};
        use State::*;

        match self.state {
            Done => Ok(Some(Token::Eof)),

            RecordStart => match next {
                EndOfInput => {
                    self.state = Done;
                    Ok(Some(Token::Eof))
                }
                // Second half of a `\r\n` that ended the previous line.
                Char('\n') if self.after_cr => {
                    self.advance();
                    Ok(None)
                }
                Char('\r' | '\n') => {
                    self.advance();
                    Ok(Some(Token::EmptyLine))
                }
                Char(c) if Some(c) == self.comment => {
                    self.advance();
                    self.state = Comment;
                    Ok(None)
                }
                Char(_) => {
                    self.state = FieldStart;
                    Ok(None)
                }
            },

            FieldStart => match next {
                Char(c) if c == self.quote => {
                    self.advance();
                    self.state = QuotedField;
                    Ok(None)
                }
                Char(c) if c == self.delimiter => {
                    self.advance();
                    Ok(Some(self.close_field(false)))
                }
                Char('\r' | '\n') => {
                    self.advance();
                    Ok(Some(self.close_field(true)))
                }
                EndOfInput => Ok(Some(self.close_field(true))),
                Char(_) => {
                    self.state = UnquotedField;
                    Ok(None)
                }
            },

            UnquotedField => match next {
                Char(c) if c == self.delimiter => {
                    self.advance();
                    Ok(Some(self.close_field(false)))
                }
                Char('\r' | '\n') => {
                    self.advance();
                    Ok(Some(self.close_field(true)))
                }
                EndOfInput => Ok(Some(self.close_field(true))),
                Char(_) => {
                    let delimiter = self.delimiter;
                    self.copy_run(move |c| c != delimiter && !is_terminator(c));
                    Ok(None)
                }
            },

            QuotedField => match next {
                Char(c) if c == self.quote => {
                    self.advance();
                    self.state = AfterQuote;
                    Ok(None)
                }
                Char(c) if Some(c) == self.escape => {
                    self.advance();
                    self.state = QuotedFieldEscape;
                    Ok(None)
                }
                Char(c) if is_terminator(c) => {
                    self.advance();
                    self.field.push(c);
                    Ok(None)
                }
                Char(_) => {
                    let (quote, escape) = (self.quote, self.escape);
                    self.copy_run(move |c| c != quote && Some(c) != escape && !is_terminator(c));
                    Ok(None)
                }
                EndOfInput => Err(ErrorKind::UnterminatedQuote),
            },

            QuotedFieldEscape => match next {
                Char(c) => {
                    self.advance();
                    self.field.push(c);
                    self.state = QuotedField;
                    Ok(None)
                }
                EndOfInput => Err(ErrorKind::UnterminatedQuote),
            },

            AfterQuote => match next {
                Char(c) if c == self.quote => {
                    self.advance();
                    self.field.push(c);
                    self.state = QuotedField;
                    Ok(None)
                }
                Char(c) if c == self.delimiter => {
                    self.advance();
                    Ok(Some(self.close_field(false)))
                }
                Char('\r' | '\n') => {
                    self.advance();
                    Ok(Some(self.close_field(true)))
                }
                EndOfInput => Ok(Some(self.close_field(true))),
                Char(c) => Err(ErrorKind::MalformedQuote(c)),
            },

            Comment => match next {
                Char('\r' | '\n') => {
                    self.advance();
                    self.state = RecordStart;
                    Ok(Some(Token::Comment(core::mem::take(&mut self.field))))
                }
                EndOfInput => {
                    self.state = RecordStart;
                    Ok(Some(Token::Comment(core::mem::take(&mut self.field))))
                }
                Char(_) => {
                    self.copy_run(|c| !is_terminator(c));
                    Ok(None)
                }
            },
        }
    }

    fn close_field(&mut self, last: bool) -> Token {
        self.state = if last {
            State::RecordStart
        } else {
            State::FieldStart
        };
        Token::Field {
            value: core::mem::take(&mut self.field),
            last,
        }
    }

    #[inline]
    fn advance(&mut self) {
        match self.buffer.advance() {
            Some('\r') => {
                self.line += 1;
                self.column = 1;
                self.after_cr = true;
            }
            Some('\n') => {
                if !self.after_cr {
                    self.line += 1;
                }
                self.column = 1;
                self.after_cr = false;
            }
            Some(_) => {
                self.column += 1;
                self.after_cr = false;
            }
            None => {}
        }
    }

    /// Bulk-copies a run of ordinary characters into the current field. The
    /// run never contains a line terminator, so only the column moves.
    #[inline]
    fn copy_run(&mut self, mut predicate: impl FnMut(char) -> bool) {
        let cancel = &self.cancel;
        let copied = self
            .buffer
            .copy_while(&mut self.field, |c| predicate(c) && !cancel.is_cancelled());
        if copied > 0 {
            self.column += copied;
            self.after_cr = false;
        }
    }
}

#[inline]
fn is_terminator(c: char) -> bool {
    matches!(c, '\r' | '\n')
}
