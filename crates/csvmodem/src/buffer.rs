#![expect(clippy::inline_always)]

use std::{collections::VecDeque, io::Read};

use crate::{error::ErrorKind, source::CharSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Represents a peeked character from the lookahead window.
pub(crate) enum PeekedChar {
    Char(char),
    /// The source is exhausted and the window is empty.
    EndOfInput,
}

/// Bounded window of decoded characters in front of a [`CharSource`].
///
/// The window is refilled with up to `capacity` characters whenever it runs
/// dry. A decoding or I/O failure met part way through a refill is held back
/// until the characters decoded before it have been consumed, so failures
/// surface at the same stream position whatever the capacity.
pub(crate) struct Buffer<R> {
    source: CharSource<R>,
    data: VecDeque<char>,
    capacity: usize,
    end_of_input: bool,
    deferred: Option<ErrorKind>,
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(source: CharSource<R>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            data: VecDeque::with_capacity(capacity),
            capacity,
            end_of_input: false,
            deferred: None,
        }
    }

    #[inline(always)]
    pub(crate) fn peek(&mut self) -> Result<PeekedChar, ErrorKind> {
        if self.data.is_empty() {
            self.refill()?;
        }
        Ok(match self.data.front() {
            Some(&ch) => PeekedChar::Char(ch),
            None => PeekedChar::EndOfInput,
        })
    }

    /// Consumes the character returned by the last [`peek`](Self::peek).
    #[inline(always)]
    pub(crate) fn advance(&mut self) -> Option<char> {
        self.data.pop_front()
    }

    /// Moves characters from the window into `dst` while `predicate` holds.
    /// Stops at the end of the window without refilling.
    #[inline]
    pub(crate) fn copy_while<F>(&mut self, dst: &mut String, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let mut copied = 0;
        loop {
            let (front_len, prefix) = {
                let (front, _) = self.data.as_slices();
                if front.is_empty() {
                    break;
                }

                let prefix = front.iter().take_while(|&&ch| predicate(ch)).count();
                if prefix == 0 {
                    break;
                }

                (front.len(), prefix)
            };

            dst.extend(self.data.drain(..prefix));
            copied += prefix;

            if prefix < front_len {
                break;
            }
        }
        copied
    }

    fn refill(&mut self) -> Result<(), ErrorKind> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }
        if self.end_of_input {
            return Ok(());
        }

        while self.data.len() < self.capacity {
            match self.source.next_char() {
                Ok(Some(ch)) => self.data.push_back(ch),
                Ok(None) => {
                    self.end_of_input = true;
                    break;
                }
                Err(err) if self.data.is_empty() => return Err(err),
                Err(err) => {
                    self.deferred = Some(err);
                    break;
                }
            }
        }
        tracing::trace!(
            chars = self.data.len(),
            end_of_input = self.end_of_input,
            "lookahead refilled"
        );
        Ok(())
    }
}
