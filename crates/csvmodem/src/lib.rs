//! Streaming, event-driven CSV tokenizer.
//!
//! A [`CsvParser`] makes a single forward pass over a byte stream in a known
//! text encoding and pushes what it recognises (records, fields, the header,
//! comment lines) to a [`ParserDelegate`] as soon as each unit is complete.
//! Memory use is bounded by the lookahead window plus one record, whatever the
//! length of the input.
//!
//! ```rust
//! use csvmodem::{CsvParser, ParseEvent, ParserOptions};
//!
//! let mut events = Vec::new();
//! let summary = CsvParser::from_str("#totals\n\"a,b\nc\"\"d\",2\n", ParserOptions::default())
//!     .unwrap()
//!     .parse(&mut events)
//!     .unwrap();
//!
//! assert_eq!(summary.records, 1);
//! assert!(events.contains(&ParseEvent::Comment { text: "totals".into() }));
//! assert!(events.contains(&ParseEvent::Field {
//!     value: Some("a,b\nc\"d".into()),
//!     index: 0
//! }));
//! ```
//!
//! Long runs can be stopped from another thread through a [`CancelHandle`]
//! and observed through [`Progress`].

#![allow(missing_docs)]

mod assembler;
mod buffer;
mod control;
mod delegate;
mod error;
mod event;
mod options;
mod parser;
mod record;
mod source;
mod tokenizer;

#[cfg(test)]
mod tests;

pub use control::{CancelHandle, Progress};
pub use delegate::{Callbacks, ParserDelegate};
pub use error::{ErrorKind, OptionsError, ParserError};
pub use event::ParseEvent;
pub use options::{DEFAULT_BUFFER_SIZE, ParserOptions};
pub use parser::{CsvParser, ParseSummary};
#[doc(hidden)]
pub use record::IntoField;
pub use record::Record;
