//! Owned notifications recorded by the `Vec<ParseEvent>` delegate.
//!
//! # Examples
//!
//! ```
//! use csvmodem::{CsvParser, ParseEvent, ParserOptions, record};
//!
//! let mut events = Vec::new();
//! CsvParser::from_str("a,b\n", ParserOptions::default())
//!     .unwrap()
//!     .parse(&mut events)
//!     .unwrap();
//! assert_eq!(
//!     events,
//!     vec![
//!         ParseEvent::BeginParse,
//!         ParseEvent::BeginRecord { index: 0 },
//!         ParseEvent::Field { value: Some("a".into()), index: 0 },
//!         ParseEvent::Field { value: Some("b".into()), index: 1 },
//!         ParseEvent::Record { fields: record!["a", "b"], index: 0 },
//!         ParseEvent::EndRecord { index: 0 },
//!         ParseEvent::EndParse,
//!     ]
//! );
//! ```

use crate::{ParserError, Record, delegate::ParserDelegate};

/// One delegate notification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize), serde(tag = "kind"))]
pub enum ParseEvent {
    BeginParse,
    EndParse,
    BeginRecord { index: usize },
    EndRecord { index: usize },
    Header { fields: Record },
    Record { fields: Record, index: usize },
    Field { value: Option<String>, index: usize },
    Comment { text: String },
    /// The failure, rendered with `Display`.
    Failed { message: String },
}

impl ParseEvent {
    /// Returns `true` for events that carry document content rather than run
    /// bracketing.
    #[must_use]
    pub fn is_content(&self) -> bool {
        !matches!(self, Self::BeginParse | Self::EndParse | Self::Failed { .. })
    }
}

impl ParserDelegate for Vec<ParseEvent> {
    fn begin_parse(&mut self) {
        self.push(ParseEvent::BeginParse);
    }

    fn end_parse(&mut self) {
        self.push(ParseEvent::EndParse);
    }

    fn begin_record(&mut self, index: usize) {
        self.push(ParseEvent::BeginRecord { index });
    }

    fn end_record(&mut self, index: usize) {
        self.push(ParseEvent::EndRecord { index });
    }

    fn header(&mut self, header: &Record) {
        self.push(ParseEvent::Header {
            fields: header.clone(),
        });
    }

    fn record(&mut self, record: &Record, index: usize) {
        self.push(ParseEvent::Record {
            fields: record.clone(),
            index,
        });
    }

    fn field(&mut self, value: Option<&str>, index: usize) {
        self.push(ParseEvent::Field {
            value: value.map(str::to_owned),
            index,
        });
    }

    fn comment(&mut self, text: &str) {
        self.push(ParseEvent::Comment { text: text.into() });
    }

    fn parse_failed(&mut self, error: &ParserError) {
        self.push(ParseEvent::Failed {
            message: error.to_string(),
        });
    }
}
