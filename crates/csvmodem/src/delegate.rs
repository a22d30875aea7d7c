//! The observer side of a parse run.

use crate::{ParserError, Record};

/// Receives notifications from [`CsvParser::parse`](crate::CsvParser::parse).
///
/// Every method has a no-op default, so an implementation only overrides the
/// notifications it cares about. Notifications arrive synchronously, on the
/// parsing thread, in stream order:
///
/// ```text
/// begin_parse
///   header                                  (once, with `has_header`)
///   comment                                 (anywhere between records)
///   begin_record(i) field(v, 0).. record(r, i) end_record(i)
///   parse_failed                            (only on failure)
/// end_parse                                 (always, exactly once)
/// ```
///
/// Data record indices start at `0` whether or not a header was read.
pub trait ParserDelegate {
    fn begin_parse(&mut self) {}

    /// Last notification of every run, including failed and cancelled runs.
    /// The input has already been closed.
    fn end_parse(&mut self) {}

    fn begin_record(&mut self, _index: usize) {}

    fn end_record(&mut self, _index: usize) {}

    fn header(&mut self, _header: &Record) {}

    fn record(&mut self, _record: &Record, _index: usize) {}

    /// A post-processed field; `None` when nullified.
    fn field(&mut self, _value: Option<&str>, _index: usize) {}

    /// Text after the comment character, without the line terminator.
    fn comment(&mut self, _text: &str) {}

    fn parse_failed(&mut self, _error: &ParserError) {}
}

impl<D: ParserDelegate + ?Sized> ParserDelegate for &mut D {
    fn begin_parse(&mut self) {
        (**self).begin_parse();
    }

    fn end_parse(&mut self) {
        (**self).end_parse();
    }

    fn begin_record(&mut self, index: usize) {
        (**self).begin_record(index);
    }

    fn end_record(&mut self, index: usize) {
        (**self).end_record(index);
    }

    fn header(&mut self, header: &Record) {
        (**self).header(header);
    }

    fn record(&mut self, record: &Record, index: usize) {
        (**self).record(record, index);
    }

    fn field(&mut self, value: Option<&str>, index: usize) {
        (**self).field(value, index);
    }

    fn comment(&mut self, text: &str) {
        (**self).comment(text);
    }

    fn parse_failed(&mut self, error: &ParserError) {
        (**self).parse_failed(error);
    }
}

type Slot<F> = Option<Box<F>>;

/// A delegate assembled from independently optional closures.
///
/// ```
/// use csvmodem::{Callbacks, CsvParser, ParserOptions};
///
/// let mut rows = Vec::new();
/// let mut callbacks = Callbacks::new().on_record(|record, _| rows.push(record.to_strings().join("|")));
/// CsvParser::from_str("a,b\nc,d\n", ParserOptions::default())
///     .unwrap()
///     .parse(&mut callbacks)
///     .unwrap();
/// drop(callbacks);
/// assert_eq!(rows, ["a|b", "c|d"]);
/// ```
#[derive(Default)]
pub struct Callbacks<'a> {
    begin_parse: Slot<dyn FnMut() + 'a>,
    end_parse: Slot<dyn FnMut() + 'a>,
    begin_record: Slot<dyn FnMut(usize) + 'a>,
    end_record: Slot<dyn FnMut(usize) + 'a>,
    header: Slot<dyn FnMut(&Record) + 'a>,
    record: Slot<dyn FnMut(&Record, usize) + 'a>,
    field: Slot<dyn FnMut(Option<&str>, usize) + 'a>,
    comment: Slot<dyn FnMut(&str) + 'a>,
    parse_failed: Slot<dyn FnMut(&ParserError) + 'a>,
}

impl<'a> Callbacks<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_begin_parse(mut self, f: impl FnMut() + 'a) -> Self {
        self.begin_parse = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_end_parse(mut self, f: impl FnMut() + 'a) -> Self {
        self.end_parse = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_begin_record(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.begin_record = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_end_record(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.end_record = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_header(mut self, f: impl FnMut(&Record) + 'a) -> Self {
        self.header = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_record(mut self, f: impl FnMut(&Record, usize) + 'a) -> Self {
        self.record = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_field(mut self, f: impl FnMut(Option<&str>, usize) + 'a) -> Self {
        self.field = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_comment(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.comment = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_parse_failed(mut self, f: impl FnMut(&ParserError) + 'a) -> Self {
        self.parse_failed = Some(Box::new(f));
        self
    }
}

impl ParserDelegate for Callbacks<'_> {
    fn begin_parse(&mut self) {
        if let Some(f) = &mut self.begin_parse {
            f();
        }
    }

    fn end_parse(&mut self) {
        if let Some(f) = &mut self.end_parse {
            f();
        }
    }

    fn begin_record(&mut self, index: usize) {
        if let Some(f) = &mut self.begin_record {
            f(index);
        }
    }

    fn end_record(&mut self, index: usize) {
        if let Some(f) = &mut self.end_record {
            f(index);
        }
    }

    fn header(&mut self, header: &Record) {
        if let Some(f) = &mut self.header {
            f(header);
        }
    }

    fn record(&mut self, record: &Record, index: usize) {
        if let Some(f) = &mut self.record {
            f(record, index);
        }
    }

    fn field(&mut self, value: Option<&str>, index: usize) {
        if let Some(f) = &mut self.field {
            f(value, index);
        }
    }

    fn comment(&mut self, text: &str) {
        if let Some(f) = &mut self.comment {
            f(text);
        }
    }

    fn parse_failed(&mut self, error: &ParserError) {
        if let Some(f) = &mut self.parse_failed {
            f(error);
        }
    }
}

impl core::fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("begin_parse", &self.begin_parse.is_some())
            .field("end_parse", &self.end_parse.is_some())
            .field("begin_record", &self.begin_record.is_some())
            .field("end_record", &self.end_record.is_some())
            .field("header", &self.header.is_some())
            .field("record", &self.record.is_some())
            .field("field", &self.field.is_some())
            .field("comment", &self.comment.is_some())
            .field("parse_failed", &self.parse_failed.is_some())
            .finish()
    }
}
