
use crate::{CsvParser, ParseEvent, ParseSummary, ParserError, ParserOptions};

/// Parses `input` and returns every notification alongside the outcome.
pub(crate) fn parse_events(
    input: &str,
    options: ParserOptions,
) -> (Vec<ParseEvent>, Result<ParseSummary, ParserError>) {
    let mut events = Vec::new();
    let result = CsvParser::from_str(input, options)
        .expect("options should validate")
        .parse(&mut events);
    (events, result)
}

/// The fields of every `Record` notification, nulls rendered as `""`.
pub(crate) fn records(events: &[ParseEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .filter_map(|event| match event {
            ParseEvent::Record { fields, .. } => {
                Some(fields.to_strings().into_iter().map(str::to_owned).collect())
            }
            _ => None,
        })
        .collect()
}
