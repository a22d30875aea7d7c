use crate::{
    ParserOptions, Record,
    control::CancelHandle,
    delegate::ParserDelegate,
    record::FieldProcessor,
    tokenizer::Token,
};

/// What [`RecordAssembler::accept`] wants the driver loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Finished { cancelled: bool },
}

/// Groups tokens into records and forwards them to a delegate.
///
/// The first non-comment record is captured as the header when requested; it
/// produces a single `header` notification and does not consume an index.
pub(crate) struct RecordAssembler {
    processor: FieldProcessor,
    cancel: CancelHandle,
    ignore_empty_lines: bool,

    awaiting_header: bool,
    header: Option<Record>,

    fields: Record,
    in_record: bool,
    next_index: usize,
    comments: usize,
}

impl RecordAssembler {
    pub(crate) fn new(options: &ParserOptions, cancel: CancelHandle) -> Self {
        Self {
            processor: FieldProcessor::new(options),
            cancel,
            ignore_empty_lines: options.ignore_empty_lines,
            awaiting_header: options.has_header,
            header: None,
            fields: Record::new(),
            in_record: false,
            next_index: 0,
            comments: 0,
        }
    }

    /// Dispatches the notifications for one token. A cancellation requested
    /// by the delegate itself is honoured before the next notification.
    pub(crate) fn accept<D: ParserDelegate>(&mut self, token: Token, delegate: &mut D) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Finished { cancelled: true };
        }
        match token {
            Token::Field { value, last } => {
                let flow = self.push_field(value, delegate);
                if flow != Flow::Continue || !last {
                    return flow;
                }
                self.finish_record(delegate)
            }
            Token::EmptyLine if self.ignore_empty_lines => Flow::Continue,
            Token::EmptyLine => match self.push_field(String::new(), delegate) {
                Flow::Continue => self.finish_record(delegate),
                finished => finished,
            },
            Token::Comment(text) => {
                self.comments += 1;
                delegate.comment(&text);
                self.checkpoint()
            }
            Token::Cancelled => Flow::Finished { cancelled: true },
            Token::Eof => Flow::Finished { cancelled: false },
        }
    }

    pub(crate) fn records(&self) -> usize {
        self.next_index
    }

    pub(crate) fn comments(&self) -> usize {
        self.comments
    }

    pub(crate) fn take_header(&mut self) -> Option<Record> {
        self.header.take()
    }

    fn checkpoint(&self) -> Flow {
        if self.cancel.is_cancelled() {
            Flow::Finished { cancelled: true }
        } else {
            Flow::Continue
        }
    }

    fn push_field<D: ParserDelegate>(&mut self, raw: String, delegate: &mut D) -> Flow {
        let value = self.processor.apply(raw);
        if !self.awaiting_header {
            if !self.in_record {
                self.in_record = true;
                delegate.begin_record(self.next_index);
                if self.cancel.is_cancelled() {
                    return Flow::Finished { cancelled: true };
                }
            }
            delegate.field(value.as_deref(), self.fields.len());
        }
        self.fields.push(value);
        self.checkpoint()
    }

    fn finish_record<D: ParserDelegate>(&mut self, delegate: &mut D) -> Flow {
        let record = core::mem::take(&mut self.fields);
        if self.awaiting_header {
            self.awaiting_header = false;
            delegate.header(&record);
            tracing::debug!(fields = record.len(), "header captured");
            self.header = Some(record);
            return self.checkpoint();
        }

        let index = self.next_index;
        self.in_record = false;
        self.next_index += 1;
        delegate.record(&record, index);
        if self.cancel.is_cancelled() {
            return Flow::Finished { cancelled: true };
        }
        delegate.end_record(index);
        tracing::trace!(index, fields = record.len(), "record closed");
        self.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseEvent, record};

    fn field(value: &str, last: bool) -> Token {
        Token::Field {
            value: value.into(),
            last,
        }
    }

    fn run(options: &ParserOptions, tokens: Vec<Token>) -> (Vec<ParseEvent>, RecordAssembler) {
        let mut assembler = RecordAssembler::new(options, CancelHandle::new());
        let mut events = Vec::new();
        for token in tokens {
            assembler.accept(token, &mut events);
        }
        (events, assembler)
    }

    #[test]
    fn header_is_silent_and_takes_no_index() {
        let options = ParserOptions {
            has_header: true,
            ..Default::default()
        };
        let (events, mut assembler) = run(
            &options,
            vec![field("name", false), field("age", true), field("Alice", false), field("30", true)],
        );
        assert_eq!(
            events,
            vec![
                ParseEvent::Header {
                    fields: record!["name", "age"]
                },
                ParseEvent::BeginRecord { index: 0 },
                ParseEvent::Field {
                    value: Some("Alice".into()),
                    index: 0
                },
                ParseEvent::Field {
                    value: Some("30".into()),
                    index: 1
                },
                ParseEvent::Record {
                    fields: record!["Alice", "30"],
                    index: 0
                },
                ParseEvent::EndRecord { index: 0 },
            ]
        );
        assert_eq!(assembler.records(), 1);
        assert_eq!(assembler.take_header(), Some(record!["name", "age"]));
    }

    #[test]
    fn comments_before_header_do_not_become_the_header() {
        let options = ParserOptions {
            has_header: true,
            ..Default::default()
        };
        let (events, assembler) = run(&options, vec![Token::Comment("x".into()), field("h", true)]);
        assert_eq!(
            events,
            vec![
                ParseEvent::Comment { text: "x".into() },
                ParseEvent::Header { fields: record!["h"] },
            ]
        );
        assert_eq!(assembler.comments(), 1);
        assert_eq!(assembler.records(), 0);
    }

    #[test]
    fn empty_line_is_a_single_empty_field_unless_ignored() {
        let (events, _) = run(&ParserOptions::default(), vec![Token::EmptyLine]);
        assert_eq!(
            events,
            vec![
                ParseEvent::BeginRecord { index: 0 },
                ParseEvent::Field {
                    value: Some(String::new()),
                    index: 0
                },
                ParseEvent::Record {
                    fields: record![""],
                    index: 0
                },
                ParseEvent::EndRecord { index: 0 },
            ]
        );

        let ignoring = ParserOptions {
            ignore_empty_lines: true,
            ..Default::default()
        };
        let (events, assembler) = run(&ignoring, vec![field("a", true), Token::EmptyLine, field("b", true)]);
        let indices: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ParseEvent::Record { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, [0, 1]);
        assert_eq!(assembler.records(), 2);
    }

    #[test]
    fn nullified_fields_reach_the_delegate_as_none() {
        let options = ParserOptions {
            nullify_empty_fields: true,
            ..Default::default()
        };
        let (events, _) = run(&options, vec![field("", false), field("x", true)]);
        assert!(events.contains(&ParseEvent::Field { value: None, index: 0 }));
        assert!(events.contains(&ParseEvent::Record {
            fields: record![None, "x"],
            index: 0
        }));
    }

    #[test]
    fn cancelling_from_a_field_callback_suppresses_the_record() {
        let cancel = CancelHandle::new();
        let mut assembler = RecordAssembler::new(&ParserOptions::default(), cancel.clone());
        let mut seen = Vec::new();
        let mut delegate = crate::Callbacks::new()
            .on_field(|value, _| {
                seen.push(value.map(str::to_owned));
                cancel.cancel();
            })
            .on_record(|_, _| panic!("record after cancellation"));
        assert_eq!(
            assembler.accept(field("a", true), &mut delegate),
            Flow::Finished { cancelled: true }
        );
        drop(delegate);
        assert_eq!(seen, [Some("a".to_string())]);
    }

    #[test]
    fn cancelling_from_begin_record_suppresses_its_fields() {
        let cancel = CancelHandle::new();
        let mut assembler = RecordAssembler::new(&ParserOptions::default(), cancel.clone());
        let mut begun = Vec::new();
        let mut delegate = crate::Callbacks::new()
            .on_begin_record(|index| {
                begun.push(index);
                cancel.cancel();
            })
            .on_field(|_, _| panic!("field after cancellation"))
            .on_end_record(|_| panic!("end_record after cancellation"));
        assert_eq!(
            assembler.accept(field("a", false), &mut delegate),
            Flow::Finished { cancelled: true }
        );
        assert_eq!(
            assembler.accept(field("b", true), &mut delegate),
            Flow::Finished { cancelled: true }
        );
        drop(delegate);
        assert_eq!(begun, [0]);
        assert_eq!(assembler.records(), 0);
    }

    #[test]
    fn cancelling_from_a_blank_line_field_suppresses_its_record() {
        let cancel = CancelHandle::new();
        let mut assembler = RecordAssembler::new(&ParserOptions::default(), cancel.clone());
        let mut records = Vec::new();
        let mut delegate = crate::Callbacks::new()
            .on_field(|value, _| {
                if value == Some("") {
                    cancel.cancel();
                }
            })
            .on_record(|record, index| records.push((record.clone(), index)));
        assert_eq!(assembler.accept(field("a", true), &mut delegate), Flow::Continue);
        assert_eq!(
            assembler.accept(Token::EmptyLine, &mut delegate),
            Flow::Finished { cancelled: true }
        );
        drop(delegate);
        assert_eq!(records, [(record!["a"], 0)]);
    }

    #[test]
    fn cancelling_from_a_record_callback_skips_its_end_record() {
        let cancel = CancelHandle::new();
        let mut assembler = RecordAssembler::new(&ParserOptions::default(), cancel.clone());
        let mut delegate = crate::Callbacks::new()
            .on_record(|_, _| cancel.cancel())
            .on_end_record(|_| panic!("end_record after cancellation"));
        assert_eq!(
            assembler.accept(field("a", true), &mut delegate),
            Flow::Finished { cancelled: true }
        );
        drop(delegate);
        assert_eq!(assembler.records(), 1);
    }

    #[test]
    fn terminal_tokens_finish_the_run() {
        let mut assembler = RecordAssembler::new(&ParserOptions::default(), CancelHandle::new());
        let mut events = Vec::new();
        assert_eq!(assembler.accept(field("a", false), &mut events), Flow::Continue);
        assert_eq!(
            assembler.accept(Token::Cancelled, &mut events),
            Flow::Finished { cancelled: true }
        );
        assert_eq!(
            events,
            vec![
                ParseEvent::BeginRecord { index: 0 },
                ParseEvent::Field {
                    value: Some("a".into()),
                    index: 0
                },
            ]
        );
        assert_eq!(assembler.records(), 0);
        assert_eq!(
            assembler.accept(Token::Eof, &mut events),
            Flow::Finished { cancelled: false }
        );
    }
}
