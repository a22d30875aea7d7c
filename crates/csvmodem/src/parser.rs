use std::{fs::File, io::Read, path::Path};

use encoding_rs::{Encoding, UTF_8};

use crate::{
    ParserOptions, Record,
    assembler::{Flow, RecordAssembler},
    buffer::Buffer,
    control::{CancelHandle, Progress},
    delegate::ParserDelegate,
    error::{ErrorKind, ParserError},
    source::CharSource,
    tokenizer::Tokenizer,
};

/// A single forward pass of the CSV tokenizer over one input.
///
/// The parser owns its input. [`parse`](Self::parse) consumes the parser, so
/// the input is closed exactly once however the run ends.
///
/// Run state lives inside [`parse`](Self::parse) and is not observable from
/// outside while it runs. The captured header reaches the delegate through
/// [`ParserDelegate::header`] as soon as it closes, and is returned again in
/// [`ParseSummary::header`].
///
/// # Examples
///
/// ```
/// use csvmodem::{CsvParser, ParserOptions};
///
/// let parser = CsvParser::from_str(
///     "name,age\nAlice,30\n",
///     ParserOptions {
///         has_header: true,
///         ..Default::default()
///     },
/// )
/// .unwrap();
/// let summary = parser.parse(csvmodem::Callbacks::new()).unwrap();
/// assert_eq!(summary.records, 1);
/// assert_eq!(summary.header.unwrap().to_strings(), ["name", "age"]);
/// ```
#[derive(Debug)]
pub struct CsvParser<R> {
    reader: R,
    options: ParserOptions,
    cancel: CancelHandle,
    progress: Progress,
}

/// Outcome of a run that was not stopped by an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseSummary {
    /// The header record, when [`ParserOptions::has_header`] was set and the
    /// input had at least one record.
    pub header: Option<Record>,
    /// Data records dispatched, header excluded.
    pub records: usize,
    pub comments: usize,
    /// Raw bytes consumed, byte-order mark included.
    pub bytes_read: u64,
    pub cancelled: bool,
}

impl<R: Read> CsvParser<R> {
    /// Creates a parser over an arbitrary byte stream, decoded with
    /// `options.encoding`.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Options`] when `options` do not validate.
    pub fn new(reader: R, options: ParserOptions) -> Result<Self, ParserError> {
        options.validate()?;
        Ok(Self {
            reader,
            options,
            cancel: CancelHandle::new(),
            progress: Progress::new(),
        })
    }

    /// Runs the parse to completion, dispatching notifications to `delegate`.
    ///
    /// `begin_parse` is always the first notification and `end_parse` the
    /// last; a failure is reported through `parse_failed` in between and then
    /// returned. Cancellation is not a failure: the run ends with
    /// [`ParseSummary::cancelled`] set.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] other than [`ErrorKind::Options`].
    pub fn parse<D: ParserDelegate>(self, mut delegate: D) -> Result<ParseSummary, ParserError> {
        let Self {
            reader,
            options,
            cancel,
            progress,
        } = self;

        let source = CharSource::new(reader, options.encoding, options.buffer_size, progress.clone());
        let mut tokenizer = Tokenizer::new(
            Buffer::new(source, options.buffer_size),
            &options,
            cancel.clone(),
        );
        let mut assembler = RecordAssembler::new(&options, cancel);

        tracing::debug!(
            encoding = options.encoding.name(),
            buffer_size = options.buffer_size,
            has_header = options.has_header,
            "parse started"
        );
        delegate.begin_parse();

        let outcome = loop {
            match tokenizer.next_token() {
                Ok(token) => match assembler.accept(token, &mut delegate) {
                    Flow::Continue => {}
                    Flow::Finished { cancelled } => break Ok(cancelled),
                },
                Err(err) => break Err(err),
            }
        };
        // Closes the input before the final notification.
        drop(tokenizer);

        let bytes_read = progress.bytes_read();
        match outcome {
            Ok(cancelled) => {
                let summary = ParseSummary {
                    header: assembler.take_header(),
                    records: assembler.records(),
                    comments: assembler.comments(),
                    bytes_read,
                    cancelled,
                };
                if cancelled {
                    tracing::debug!(records = summary.records, bytes_read, "parse cancelled");
                }
                tracing::debug!(
                    records = summary.records,
                    comments = summary.comments,
                    bytes_read,
                    cancelled,
                    "parse finished"
                );
                delegate.end_parse();
                Ok(summary)
            }
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    records = assembler.records(),
                    bytes_read,
                    "parse failed"
                );
                delegate.parse_failed(&err);
                delegate.end_parse();
                Err(err)
            }
        }
    }
}

impl<R> CsvParser<R> {
    /// The input stream, not yet read.
    pub fn input(&self) -> &R {
        &self.reader
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.options.encoding
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// A handle onto the bytes-read counter that stays valid during and after
    /// the run.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// A handle that can stop the run from another thread or from inside a
    /// delegate callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Requests cancellation before the run starts. A run started afterwards
    /// dispatches only `begin_parse` and `end_parse`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<'a> CsvParser<&'a [u8]> {
    /// Parses an in-memory string. The configured encoding is replaced with
    /// UTF-8.
    ///
    /// # Errors
    ///
    /// Fails when `options` do not validate.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &'a str, options: ParserOptions) -> Result<Self, ParserError> {
        Self::new(
            text.as_bytes(),
            ParserOptions {
                encoding: UTF_8,
                ..options
            },
        )
    }

    /// Parses raw bytes in the configured encoding.
    ///
    /// # Errors
    ///
    /// Fails when `options` do not validate.
    pub fn from_bytes(bytes: &'a [u8], options: ParserOptions) -> Result<Self, ParserError> {
        Self::new(bytes, options)
    }
}

impl CsvParser<File> {
    /// Opens `path` for parsing in the configured encoding.
    ///
    /// # Errors
    ///
    /// Fails when `options` do not validate or the file cannot be opened. The
    /// position of an open failure is `0:0`.
    pub fn from_path(path: impl AsRef<Path>, options: ParserOptions) -> Result<Self, ParserError> {
        options.validate()?;
        let file = File::open(path.as_ref()).map_err(|err| ParserError::new(ErrorKind::Io(err), 0, 0))?;
        Self::new(file, options)
    }
}
