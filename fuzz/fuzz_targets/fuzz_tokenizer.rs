#![no_main]
use arbitrary::Arbitrary;
use csvmodem::{CsvParser, ParseEvent, ParserOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u8,
    window: u8,
    /// Index into `DIALECTS`.
    dialect: u8,
    bytes: Vec<u8>,
}

const DIALECTS: &[(char, char, Option<char>, Option<char>)] = &[
    (',', '"', Some('\\'), Some('#')),
    (';', '\'', None, None),
    ('\t', '"', Some('~'), Some(';')),
    ('│', '«', Some('»'), Some('※')),
];

fn options(input: &Input, buffer_size: usize) -> ParserOptions {
    let (delimiter, quote_char, escape_char, comment_char) =
        DIALECTS[usize::from(input.dialect) % DIALECTS.len()];
    ParserOptions {
        delimiter,
        quote_char,
        escape_char,
        comment_char,
        has_header: input.flags & 0b0_0001 != 0,
        sanitize_fields: input.flags & 0b0_0010 != 0,
        trim_field_whitespaces: input.flags & 0b0_0100 != 0,
        nullify_empty_fields: input.flags & 0b0_1000 != 0,
        ignore_empty_lines: input.flags & 0b1_0000 != 0,
        buffer_size,
        ..Default::default()
    }
}

fn run(input: &Input, buffer_size: usize) -> (Vec<ParseEvent>, Result<u64, String>) {
    let mut events = Vec::new();
    let result = CsvParser::from_bytes(&input.bytes, options(input, buffer_size))
        .expect("fuzz dialects are valid")
        .parse(&mut events)
        .map(|summary| summary.bytes_read)
        .map_err(|err| err.to_string());
    (events, result)
}

fuzz_target!(|input: Input| {
    let small = run(&input, usize::from(input.window % 32) + 1);
    let large = run(&input, 8192);
    assert_eq!(small, large, "window size changed the outcome");

    assert_eq!(large.0.first(), Some(&ParseEvent::BeginParse));
    assert_eq!(large.0.last(), Some(&ParseEvent::EndParse));
    if let Ok(bytes_read) = large.1 {
        assert_eq!(bytes_read, input.bytes.len() as u64);
    }
});
