//! Dialect and run configuration for [`CsvParser`](crate::CsvParser).

use encoding_rs::{Encoding, UTF_8};

use crate::error::OptionsError;

/// Default number of characters pulled into the lookahead window per refill.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Configuration options for the CSV tokenizer.
///
/// The options are fixed for the duration of a run: the parser copies them at
/// construction and never consults the caller's value again.
///
/// # Default
///
/// Comma-delimited, double-quote quoting, backslash escapes inside quoted
/// fields, `#` comment lines, UTF-8 input, and every flag `false`.
///
/// ```
/// use csvmodem::ParserOptions;
///
/// let options = ParserOptions {
///     delimiter: ';',
///     has_header: true,
///     ..Default::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[expect(clippy::struct_excessive_bools)]
pub struct ParserOptions {
    /// Character separating fields within a record.
    pub delimiter: char,

    /// Character that opens and closes a quoted field. Inside a quoted field a
    /// doubled quote stands for one literal quote.
    pub quote_char: char,

    /// Character that, inside a quoted field, makes the following character
    /// literal. `None` disables escapes.
    pub escape_char: Option<char>,

    /// Character that turns a whole line into a comment when it is the first
    /// character of a record. `None` disables comments.
    pub comment_char: Option<char>,

    /// Whether the first record is a header rather than data.
    ///
    /// The header does not consume a record index: the first data record is
    /// always index `0`.
    pub has_header: bool,

    /// Replace whitespace control characters with a space and drop every
    /// other control character.
    pub sanitize_fields: bool,

    /// Strip leading and trailing whitespace from every field.
    pub trim_field_whitespaces: bool,

    /// Report a field that is empty after post-processing as `None`.
    pub nullify_empty_fields: bool,

    /// Drop lines that contain no characters at all.
    pub ignore_empty_lines: bool,

    /// Number of characters decoded per lookahead refill. Must be at least 1.
    /// The value never changes the emitted events.
    pub buffer_size: usize,

    /// Text encoding of the byte source.
    #[cfg_attr(feature = "serde", serde(with = "encoding_label"))]
    pub encoding: &'static Encoding,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            escape_char: Some('\\'),
            comment_char: Some('#'),
            has_header: false,
            sanitize_fields: false,
            trim_field_whitespaces: false,
            nullify_empty_fields: false,
            ignore_empty_lines: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            encoding: UTF_8,
        }
    }
}

impl ParserOptions {
    /// Replaces the encoding with the one named by a WHATWG label such as
    /// `"latin1"` or `"utf-16le"`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::UnknownEncoding`] if the label is not
    /// recognised.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, OptionsError> {
        self.encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| OptionsError::UnknownEncoding(label.into()))?;
        Ok(self)
    }

    /// Checks that the options describe an unambiguous grammar.
    ///
    /// # Errors
    ///
    /// - [`OptionsError::ZeroBufferSize`] when `buffer_size` is `0`.
    /// - [`OptionsError::LineTerminator`] when a grammar character is CR or LF.
    /// - [`OptionsError::DuplicateGrammarChar`] when two grammar characters
    ///   coincide.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.buffer_size == 0 {
            return Err(OptionsError::ZeroBufferSize);
        }

        let grammar = self.grammar_chars();
        for (i, &(name, ch)) in grammar.iter().enumerate() {
            let Some(ch) = ch else { continue };
            if matches!(ch, '\r' | '\n') {
                return Err(OptionsError::LineTerminator { name });
            }
            for &(other, other_ch) in &grammar[i + 1..] {
                if other_ch == Some(ch) {
                    return Err(OptionsError::DuplicateGrammarChar {
                        first: name,
                        second: other,
                        ch,
                    });
                }
            }
        }
        Ok(())
    }

    fn grammar_chars(&self) -> [(&'static str, Option<char>); 4] {
        [
            ("delimiter", Some(self.delimiter)),
            ("quote", Some(self.quote_char)),
            ("escape", self.escape_char),
            ("comment", self.comment_char),
        ]
    }
}

#[cfg(feature = "serde")]
mod encoding_label {
    use encoding_rs::Encoding;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S: Serializer>(
        encoding: &&'static Encoding,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(encoding.name())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static Encoding, D::Error> {
        let label = String::deserialize(deserializer)?;
        Encoding::for_label(label.as_bytes())
            .ok_or_else(|| D::Error::custom(format_args!("unknown encoding label `{label}`")))
    }
}

#[cfg(test)]
mod tests {
    use encoding_rs::{UTF_16LE, WINDOWS_1252};

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ParserOptions::default().validate(), Ok(()));
    }

    #[test]
    fn duplicate_grammar_chars_are_rejected() {
        let options = ParserOptions {
            delimiter: '#',
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::DuplicateGrammarChar {
                first: "delimiter",
                second: "comment",
                ch: '#',
            })
        );
    }

    #[test]
    fn disabled_chars_never_collide() {
        let options = ParserOptions {
            escape_char: None,
            comment_char: None,
            ..Default::default()
        };
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn quote_cannot_double_as_escape() {
        let options = ParserOptions {
            escape_char: Some('"'),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(OptionsError::DuplicateGrammarChar { first: "quote", second: "escape", .. })
        ));
    }

    #[test]
    fn line_terminators_are_not_grammar() {
        let options = ParserOptions {
            comment_char: Some('\n'),
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::LineTerminator { name: "comment" })
        );
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let options = ParserOptions {
            buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(OptionsError::ZeroBufferSize));
    }

    #[test]
    fn encoding_labels_resolve() {
        let options = ParserOptions::default().with_encoding_label("latin1").unwrap();
        assert_eq!(options.encoding, WINDOWS_1252);
        let options = options.with_encoding_label("utf-16le").unwrap();
        assert_eq!(options.encoding, UTF_16LE);
        assert_eq!(
            ParserOptions::default().with_encoding_label("klingon"),
            Err(OptionsError::UnknownEncoding("klingon".into()))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_deserialize_with_label() {
        let options: ParserOptions =
            serde_json::from_str(r#"{"delimiter": ";", "encoding": "latin1"}"#).unwrap();
        assert_eq!(options.delimiter, ';');
        assert_eq!(options.encoding, WINDOWS_1252);
        assert_eq!(options.quote_char, '"');
    }
}
