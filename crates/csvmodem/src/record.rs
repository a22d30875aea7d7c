//! Records, fields, and per-field post-processing.

use core::ops::Deref;

use crate::ParserOptions;

/// An ordered sequence of fields. `None` marks a field nullified by
/// [`ParserOptions::nullify_empty_fields`].
///
/// # Examples
///
/// ```
/// use csvmodem::{Record, record};
///
/// let r: Record = record!["a", None, "c"];
/// assert_eq!(r.len(), 3);
/// assert_eq!(r.get(1), Some(None));
/// assert_eq!(r.to_strings(), vec!["a", "", "c"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize), serde(transparent))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Record(Vec<Option<String>>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The field at `index`: `None` past the end, `Some(None)` for a null
    /// field.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Option<&str>> {
        self.0.get(index).map(Option::as_deref)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.0.iter().map(Option::as_deref)
    }

    /// Field values with null fields rendered as empty strings.
    #[must_use]
    pub fn to_strings(&self) -> Vec<&str> {
        self.iter().map(Option::unwrap_or_default).collect()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Option<String>> {
        self.0
    }

    pub(crate) fn push(&mut self, field: Option<String>) {
        self.0.push(field);
    }
}

impl Deref for Record {
    type Target = [Option<String>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Option<String>>> for Record {
    fn from(fields: Vec<Option<String>>) -> Self {
        Self(fields)
    }
}

impl FromIterator<Option<String>> for Record {
    fn from_iter<T: IntoIterator<Item = Option<String>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = Option<String>;
    type IntoIter = std::vec::IntoIter<Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[doc(hidden)]
pub trait IntoField {
    fn into_field(self) -> Option<String>;
}

impl IntoField for &str {
    fn into_field(self) -> Option<String> {
        Some(self.to_owned())
    }
}

impl IntoField for String {
    fn into_field(self) -> Option<String> {
        Some(self)
    }
}

impl IntoField for Option<&str> {
    fn into_field(self) -> Option<String> {
        self.map(str::to_owned)
    }
}

/// Builds a [`Record`] from string-like values; `None` is a null field.
#[macro_export]
macro_rules! record {
    ( $( $field:expr ),* $(,)? ) => {{
        $crate::Record::from(::std::vec![$($crate::IntoField::into_field($field)),*])
    }};
}

/// Applies the configured post-processing to a closed field: trim, then
/// sanitize, then nullify.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldProcessor {
    trim: bool,
    sanitize: bool,
    nullify: bool,
}

impl FieldProcessor {
    pub(crate) fn new(options: &ParserOptions) -> Self {
        Self {
            trim: options.trim_field_whitespaces,
            sanitize: options.sanitize_fields,
            nullify: options.nullify_empty_fields,
        }
    }

    pub(crate) fn apply(self, mut value: String) -> Option<String> {
        if self.trim {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                value = trimmed.to_owned();
            }
        }
        if self.sanitize && value.chars().any(char::is_control) {
            value = sanitize(&value);
        }
        if self.nullify && value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter_map(|ch| match ch {
            '\t' | '\n' | '\r' | '\u{b}' | '\u{c}' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}
