use connect_document::{
    open_input, open_output, run_convert, ConvertOpts, ConvertSummary, Mode, OutputFormat,
};
use serde_json::{json, Value};
use std::io::Cursor;

fn opts(mode: Mode) -> ConvertOpts {
    ConvertOpts {
        mode,
        input: None,
        output: None,
        format: OutputFormat::Json,
        fail_fast: false,
    }
}

fn convert(opts: &ConvertOpts, input: &str) -> (ConvertSummary, Vec<Value>) {
    let mut output = Vec::new();
    let summary = run_convert(opts, Cursor::new(input), &mut output).unwrap();
    let docs = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (summary, docs)
}

const USER_RECORD: &str = r#"{"schema":{"type":"struct","name":"user","fields":[{"field":"id","type":"int64"},{"field":"born","type":"int32","name":"org.apache.kafka.connect.data.Date","optional":true},{"field":"balance","type":"bytes","name":"org.apache.kafka.connect.data.Decimal","parameters":{"scale":"2"},"optional":true}]},"payload":{"id":7,"born":19723,"balance":"MDk="}}"#;

#[test]
fn test_json_mode() {
    let input = "{\"a\":1,\"b\":{\"c\":\"x\"},\"d\":null}\n\n{\"a\":[]}\n";
    let (summary, docs) = convert(&opts(Mode::Json), input);

    assert_eq!(
        summary,
        ConvertSummary {
            converted: 2,
            failed: 0
        }
    );
    assert_eq!(docs, vec![json!({"a": 1, "b": {"c": "x"}}), json!({"a": []})]);
}

#[test]
fn test_record_mode_applies_logical_types() {
    let (summary, docs) = convert(&opts(Mode::Record), USER_RECORD);

    assert_eq!(summary.converted, 1);
    assert_eq!(
        docs,
        vec![json!({
            "id": 7,
            "born": "2024-01-01T00:00:00.000Z",
            "balance": "123.45",
        })]
    );
}

#[test]
fn test_record_mode_missing_required_field() {
    let input = r#"{"schema":{"type":"struct","fields":[{"field":"id","type":"int64"}]},"payload":{}}"#;
    let (summary, docs) = convert(&opts(Mode::Record), input);

    assert_eq!(summary.failed, 1);
    assert!(docs.is_empty());
}

#[test]
fn test_dynamic_mode() {
    let mut output = Vec::new();
    let summary = run_convert(
        &opts(Mode::Dynamic),
        Cursor::new(r#"{"z":1,"a":null,"m":[1,null],"b":true}"#),
        &mut output,
    )
    .unwrap();

    assert_eq!(summary.converted, 1);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"z\":1,\"m\":[1],\"b\":true}\n"
    );
}

#[test]
fn test_failed_lines_are_counted() {
    let input = "{\"ok\":true}\n[1,2]\nnot json\n{\"ok\":false}\n";
    let (summary, docs) = convert(&opts(Mode::Json), input);

    assert_eq!(
        summary,
        ConvertSummary {
            converted: 2,
            failed: 2
        }
    );
    assert_eq!(docs.len(), 2);
}

#[test]
fn test_fail_fast_aborts() {
    let mut opts = opts(Mode::Json);
    opts.fail_fast = true;

    let mut output = Vec::new();
    let err = run_convert(&opts, Cursor::new("{\"ok\":true}\n\"hello\"\n"), &mut output)
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Line 2"), "{message}");
    assert!(message.contains("Invalid top-level input"), "{message}");
}

#[test]
fn test_extjson_output() {
    let mut opts = opts(Mode::Record);
    opts.format = OutputFormat::Extjson;

    let (_, docs) = convert(&opts, USER_RECORD);
    let doc = &docs[0];
    assert_eq!(doc["id"], json!(7));
    assert_eq!(doc["born"], json!("2024-01-01T00:00:00.000Z"));
    assert!(doc["balance"].get("$numberDecimal").is_some());
}

#[test]
fn test_file_input_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.jsonl");
    let output_path = dir.path().join("output.jsonl");
    std::fs::write(&input_path, "{\"x\":1.5}\n{\"y\":\"z\"}\n").unwrap();

    let reader = open_input(Some(&input_path)).unwrap();
    let writer = open_output(Some(&output_path)).unwrap();
    let summary = run_convert(&opts(Mode::Json), reader, writer).unwrap();
    assert_eq!(summary.converted, 2);

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(written, "{\"x\":1.5}\n{\"y\":\"z\"}\n");
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_input(Some(&dir.path().join("absent.jsonl"))).err().unwrap();
    assert!(err.to_string().contains("Failed to open input file"));
}
