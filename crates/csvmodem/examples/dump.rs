//! Prints the header, records, and comments of a CSV file.
//!
//! ```text
//! RUST_LOG=csvmodem=debug cargo run --example dump -- data.csv [encoding-label] [--header]
//! ```
#![allow(missing_docs)]

use std::{env, process::ExitCode};

use csvmodem::{Callbacks, CsvParser, ParserOptions};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or("usage: dump <path> [encoding-label] [--header]")?;

    let mut options = ParserOptions::default();
    for arg in args {
        if arg == "--header" {
            options.has_header = true;
        } else {
            options = options.with_encoding_label(&arg)?;
        }
    }

    let parser = CsvParser::from_path(&path, options)?;
    let progress = parser.progress();
    let callbacks = Callbacks::new()
        .on_header(|header| println!("header: {:?}", header.to_strings()))
        .on_record(|record, index| println!("#{index}: {:?}", record.to_strings()))
        .on_comment(|text| println!("comment: {text}"));

    let summary = parser.parse(callbacks)?;
    eprintln!(
        "{} records, {} comments, {} bytes{}",
        summary.records,
        summary.comments,
        progress.bytes_read(),
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}
