//! Decoding character source.
//!
//! Raw bytes are pulled from the reader in blocks, but handed to the
//! `encoding_rs` decoder one byte at a time. A decoder step either produces
//! nothing (the byte was the start of a longer sequence) or completes one or
//! more characters; every byte consumed since the previous character is
//! charged to the first character of the step. This keeps `bytes_read` exact
//! at character granularity for every encoding, including stateful ones, and
//! means a refill boundary can never split a multi-byte sequence.

use std::{collections::VecDeque, io::Read};

use bstr::BString;
use encoding_rs::{Decoder, DecoderResult, Encoding};

use crate::{control::Progress, error::ErrorKind};

/// Worst case output of a single decoder step when the decoder cannot tell us.
const MAX_STEP_OUTPUT: usize = 16;

pub(crate) struct CharSource<R> {
    reader: R,
    encoding: &'static Encoding,
    decoder: Decoder,

    raw: Box<[u8]>,
    raw_pos: usize,
    raw_len: usize,
    reader_done: bool,
    decoder_done: bool,

    /// Decoder output for the current step.
    scratch: String,
    /// Characters decoded but not yet handed out.
    decoded: VecDeque<char>,
    /// Bytes consumed since the last character was produced.
    sequence: Vec<u8>,

    progress: Progress,
}

impl<R: Read> CharSource<R> {
    pub(crate) fn new(
        reader: R,
        encoding: &'static Encoding,
        block_size: usize,
        progress: Progress,
    ) -> Self {
        Self {
            reader,
            encoding,
            decoder: encoding.new_decoder_with_bom_removal(),
            raw: vec![0; block_size.max(1)].into_boxed_slice(),
            raw_pos: 0,
            raw_len: 0,
            reader_done: false,
            decoder_done: false,
            scratch: String::new(),
            decoded: VecDeque::new(),
            sequence: Vec::new(),
            progress,
        }
    }

    /// Decodes the next character, or `None` once the input is exhausted.
    /// Calling again after `None` keeps returning `None` without touching the
    /// reader.
    pub(crate) fn next_char(&mut self) -> Result<Option<char>, ErrorKind> {
        loop {
            if let Some(ch) = self.decoded.pop_front() {
                return Ok(Some(ch));
            }
            if self.decoder_done {
                return Ok(None);
            }
            match self.next_byte()? {
                Some(byte) => self.step(Some(byte))?,
                None => {
                    self.decoder_done = true;
                    self.step(None)?;
                }
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        if self.raw_pos == self.raw_len {
            if self.reader_done {
                return Ok(None);
            }
            loop {
                match self.reader.read(&mut self.raw) {
                    Ok(0) => {
                        self.reader_done = true;
                        return Ok(None);
                    }
                    Ok(n) => {
                        self.raw_pos = 0;
                        self.raw_len = n;
                        break;
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(err) => return Err(ErrorKind::Io(err)),
                }
            }
        }
        let byte = self.raw[self.raw_pos];
        self.raw_pos += 1;
        Ok(Some(byte))
    }

    /// Runs the decoder over one byte, or flushes it when `byte` is `None`.
    fn step(&mut self, byte: Option<u8>) -> Result<(), ErrorKind> {
        let storage = [byte.unwrap_or_default()];
        let (src, last) = match byte {
            Some(_) => (&storage[..], false),
            None => (&storage[..0], true),
        };

        self.scratch.clear();
        let needed = self
            .decoder
            .max_utf8_buffer_length_without_replacement(src.len())
            .unwrap_or(MAX_STEP_OUTPUT);
        self.scratch.reserve(needed);

        let (result, read) =
            self.decoder
                .decode_to_string_without_replacement(src, &mut self.scratch, last);
        self.sequence.extend_from_slice(&src[..read]);

        match result {
            DecoderResult::InputEmpty => {}
            DecoderResult::OutputFull => {
                unreachable!("decoder output was reserved for the worst case")
            }
            DecoderResult::Malformed(..) => {
                return Err(ErrorKind::Decoding {
                    encoding: self.encoding.name(),
                    bytes: BString::from(std::mem::take(&mut self.sequence)),
                });
            }
        }

        // A flush settles bytes that never produced a char: a lone BOM, or
        // the trailing shift sequence of a stateful encoding.
        if !self.scratch.is_empty() || last {
            self.progress.add(self.sequence.len() as u64);
            self.sequence.clear();
            self.decoded.extend(self.scratch.chars());
        }
        Ok(())
    }
}

#[cfg(test)]
impl<R> CharSource<R> {
    pub(crate) fn get_ref(&self) -> &R {
        &self.reader
    }
}
