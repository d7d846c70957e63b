//! Connect Document Library
//!
//! Converts records from connector pipelines into documents ready for a document
//! store. Three input forms are supported, one per line of JSON Lines input:
//!
//! - `json` - a plain JSON object
//! - `record` - a schema/payload envelope (`{"schema": ..., "payload": ...}`) whose payload
//!   is converted under its schema, including logical types (date, time, timestamp, decimal)
//! - `dynamic` - a plain key/value map without schema
//!
//! # CLI Usage
//!
//! ```bash
//! # Convert schema-carrying records read from a file
//! connect-document convert --mode record --input records.jsonl --output docs.jsonl
//!
//! # Convert JSON from stdin and emit MongoDB extended JSON
//! cat events.jsonl | connect-document convert --mode json --format extjson
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use connect_types::envelope::parse_envelope_str;
use document_types::{try_from_dynamic_map, try_from_json_tree, try_from_typed_record, Document};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Input form of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Plain JSON objects
    Json,
    /// Schema/payload envelopes
    Record,
    /// Schema-less key/value maps
    Dynamic,
}

/// Output encoding of each document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain JSON; binary as base64 text, decimals as strings
    Json,
    /// Relaxed MongoDB extended JSON
    Extjson,
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertOpts {
    /// Input form of each line
    #[arg(long, value_enum, env = "CONNECT_DOCUMENT_MODE")]
    pub mode: Mode,

    /// JSON Lines input file (default: stdin)
    #[arg(long, value_name = "PATH")]
    pub input: Option<std::path::PathBuf>,

    /// Output file, one document per line (default: stdout)
    #[arg(long, value_name = "PATH")]
    pub output: Option<std::path::PathBuf>,

    /// Output encoding
    #[arg(long, value_enum, default_value = "json", env = "CONNECT_DOCUMENT_FORMAT")]
    pub format: OutputFormat,

    /// Abort on the first line that fails to convert
    #[arg(long)]
    pub fail_fast: bool,
}

/// Line counts of a finished conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Convert every non-blank line of `reader` and write one document per line to `writer`.
///
/// Lines that fail to parse or convert are logged and counted, unless `fail_fast` is set,
/// in which case the first failure aborts the run. I/O errors always abort.
pub fn run_convert<R, W>(opts: &ConvertOpts, reader: R, mut writer: W) -> Result<ConvertSummary>
where
    R: BufRead,
    W: Write,
{
    info!(mode = ?opts.mode, format = ?opts.format, "Starting conversion");
    let mut summary = ConvertSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read input line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match convert_line(opts.mode, line) {
            Ok(doc) => {
                write_document(&mut writer, doc, opts.format)
                    .with_context(|| format!("Failed to write document for line {line_no}"))?;
                summary.converted += 1;
                debug!(line = line_no, "Converted line");
            }
            Err(e) if opts.fail_fast => {
                return Err(e.context(format!("Line {line_no} failed to convert")));
            }
            Err(e) => {
                warn!(line = line_no, "Skipping line that failed to convert: {e:#}");
                summary.failed += 1;
            }
        }
    }

    writer.flush().context("Failed to flush output")?;
    info!(
        converted = summary.converted,
        failed = summary.failed,
        "Conversion completed"
    );
    Ok(summary)
}

fn convert_line(mode: Mode, line: &str) -> Result<Document> {
    let doc = match mode {
        Mode::Json => {
            let tree: serde_json::Value = serde_json::from_str(line).context("Invalid JSON")?;
            try_from_json_tree(&tree)?
        }
        Mode::Record => {
            let envelope = parse_envelope_str(line).context("Invalid record envelope")?;
            try_from_typed_record(Some(&envelope.schema), &envelope.payload)?
        }
        Mode::Dynamic => {
            let map: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(line).context("Invalid key/value map")?;
            try_from_dynamic_map(&map)?
        }
    };
    Ok(doc)
}

fn write_document<W: Write>(writer: &mut W, doc: Document, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => serde_json::to_writer(&mut *writer, &doc)?,
        OutputFormat::Extjson => {
            let extjson = bson::Bson::Document(doc.into()).into_relaxed_extjson();
            serde_json::to_writer(&mut *writer, &extjson)?;
        }
    }
    writer.write_all(b"\n")?;
    Ok(())
}

/// Open the input file, or stdin when no path is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {path:?}"))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Create the output file, or use stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {path:?}"))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
