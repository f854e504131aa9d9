use gqlshape::adapter::{from_json_str, AnyAdapter, CustomScalarAdapters};
use gqlshape::Position;
use gqlshape::json::{
    DecodeError, EncodeError, JsonReader, JsonWriter, TokenKind, WriterOptions, DEFAULT_MAX_DEPTH,
};

const HERO: &str = r#"{
  "data": {
    "hero": {
      "__typename": "Droid",
      "name": "R2-D2",
      "appearsIn": ["NEWHOPE", "EMPIRE"],
      "meta": {"nested": [1, {"deep": null}]},
      "friends": [
        {"name": "Luke"},
        {"name": "Han"},
        {"name": "Leia"}
      ]
    }
  }
}"#;

fn write_with(
    options: WriterOptions,
    f: impl FnOnce(&mut JsonWriter<'_>) -> Result<(), EncodeError>,
) -> String {
    let mut out = Vec::new();
    {
        let mut writer = JsonWriter::new(&mut out, options);
        f(&mut writer).unwrap();
        writer.finish().unwrap();
    }
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Reader navigation
// ============================================================================

#[test]
fn test_select_name_skips_unknown_members() {
    let mut reader = JsonReader::new(HERO);
    reader.begin_object().unwrap();
    assert_eq!(reader.select_name(&["data"]).unwrap(), Some(0));
    reader.begin_object().unwrap();
    assert_eq!(reader.select_name(&["hero"]).unwrap(), Some(0));
    reader.begin_object().unwrap();

    let mut names = Vec::new();
    while let Some(index) = reader.select_name(&["name", "friends"]).unwrap() {
        match index {
            0 => names.push(reader.next_string().unwrap()),
            _ => {
                reader.begin_array().unwrap();
                while reader.has_next().unwrap() {
                    reader.begin_object().unwrap();
                    reader.next_name().unwrap();
                    names.push(reader.next_string().unwrap());
                    reader.end_object().unwrap();
                }
                reader.end_array().unwrap();
            }
        }
    }
    assert_eq!(names, vec!["R2-D2", "Luke", "Han", "Leia"]);

    reader.end_object().unwrap();
    reader.end_object().unwrap();
    reader.end_object().unwrap();
    assert_eq!(reader.peek().unwrap(), TokenKind::EndDocument);
}

#[test]
fn test_path_inside_nested_arrays() {
    let mut reader = JsonReader::new(HERO);
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.begin_object().unwrap();
    assert_eq!(reader.select_name(&["friends"]).unwrap(), Some(0));
    reader.begin_array().unwrap();
    reader.skip_value().unwrap();
    reader.skip_value().unwrap();
    assert_eq!(reader.path(), "$.data.hero.friends[2]");
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    assert_eq!(reader.path(), "$.data.hero.friends[2].name");
}

#[test]
fn test_peek_does_not_consume() {
    let mut reader = JsonReader::new("[true]");
    assert_eq!(reader.peek().unwrap(), TokenKind::BeginArray);
    assert_eq!(reader.peek().unwrap(), TokenKind::BeginArray);
    reader.begin_array().unwrap();
    assert_eq!(reader.peek().unwrap(), TokenKind::Boolean);
    assert!(reader.has_next().unwrap());
    assert!(reader.next_boolean().unwrap());
    assert!(!reader.has_next().unwrap());
    reader.end_array().unwrap();
}

#[test]
fn test_skip_value_at_end_of_container_fails() {
    let mut reader = JsonReader::new("[]");
    reader.begin_array().unwrap();
    assert!(matches!(
        reader.skip_value(),
        Err(DecodeError::UnexpectedToken { found: TokenKind::EndArray, .. })
    ));
}

#[test]
fn test_from_reader() {
    let mut reader = JsonReader::from_reader(r#"{"ok": true}"#.as_bytes()).unwrap();
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "ok");
    assert!(reader.next_boolean().unwrap());
    reader.end_object().unwrap();
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_numbers() {
    let mut reader = JsonReader::new("[42, -7, 1e3, 2.0, 3.25, 9999999999, \"15\"]");
    reader.begin_array().unwrap();
    assert_eq!(reader.next_int().unwrap(), 42);
    assert_eq!(reader.next_long().unwrap(), -7);
    assert_eq!(reader.next_long().unwrap(), 1000);
    assert_eq!(reader.next_int().unwrap(), 2);
    assert_eq!(reader.next_double().unwrap(), 3.25);
    assert!(matches!(reader.next_int(), Err(DecodeError::InvalidValue { .. })));
    assert_eq!(reader.next_number().unwrap(), "15");
    reader.end_array().unwrap();
}

#[test]
fn test_fractional_long_is_rejected() {
    let mut reader = JsonReader::new("1.5");
    match reader.next_long() {
        Err(DecodeError::InvalidValue { path, .. }) => assert_eq!(path, "$"),
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_next_string_accepts_numbers() {
    let mut reader = JsonReader::new("[\"a\", 12.50]");
    reader.begin_array().unwrap();
    assert_eq!(reader.next_string().unwrap(), "a");
    assert_eq!(reader.next_string().unwrap(), "12.50");
    reader.end_array().unwrap();
}

#[test]
fn test_string_escapes() {
    let mut reader = JsonReader::new(r#""tab\there \"quoted\" é 😀""#);
    assert_eq!(reader.next_string().unwrap(), "tab\there \"quoted\" é 😀");
}

#[test]
fn test_unexpected_null_reports_path() {
    let mut reader = JsonReader::new(r#"{"name": null}"#);
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    match reader.next_string() {
        Err(DecodeError::UnexpectedNull { expected, path, .. }) => {
            assert_eq!(expected, TokenKind::String);
            assert_eq!(path, "$.name");
        }
        other => panic!("expected UnexpectedNull, got {:?}", other),
    }
}

#[test]
fn test_wrong_token_kind() {
    let mut reader = JsonReader::new("[1]");
    let err = reader.begin_object().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedToken {
            expected: TokenKind::BeginObject,
            found: TokenKind::BeginArray,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "expected BEGIN_OBJECT but was BEGIN_ARRAY at path $ (line 1, column 1)"
    );
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_syntax_errors() {
    let cases = ["", "[1,]", "{\"a\" 1}", "{a: 1}", "[01]", "nul", "\"open", "[1] 2"];
    for input in cases {
        let mut reader = JsonReader::new(input);
        let result = reader.skip_value().and_then(|_| reader.peek());
        assert!(
            matches!(result, Err(DecodeError::Syntax { .. })),
            "{:?} gave {:?}",
            input,
            result
        );
    }
}

fn nested_arrays(depth: usize) -> String {
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn test_nesting_limit() {
    let mut reader = JsonReader::new(&nested_arrays(DEFAULT_MAX_DEPTH));
    assert!(reader.skip_value().is_ok());

    let mut reader = JsonReader::new(&nested_arrays(DEFAULT_MAX_DEPTH + 1));
    match reader.skip_value() {
        Err(DecodeError::Syntax { message, position }) => {
            assert!(message.contains("nesting deeper than 128"), "{}", message);
            assert_eq!(
                position,
                Position {
                    line: 1,
                    column: DEFAULT_MAX_DEPTH + 1
                }
            );
        }
        other => panic!("expected Syntax, got {:?}", other),
    }
}

#[test]
fn test_deep_document_is_an_error_not_a_crash() {
    let input = nested_arrays(200_000);
    let result = from_json_str(&AnyAdapter, &CustomScalarAdapters::empty(), &input);
    assert!(matches!(result, Err(DecodeError::Syntax { .. })));

    let input = format!("{}1{}", r#"{"a":"#.repeat(200_000), "}".repeat(200_000));
    let result = from_json_str(&AnyAdapter, &CustomScalarAdapters::empty(), &input);
    assert!(matches!(result, Err(DecodeError::Syntax { .. })));
}

#[test]
fn test_custom_nesting_limit() {
    let mut reader = JsonReader::new("[[1]]").with_max_depth(1);
    reader.begin_array().unwrap();
    assert!(matches!(reader.begin_array(), Err(DecodeError::Syntax { .. })));
}

// ============================================================================
// Writer
// ============================================================================

#[test]
fn test_writer_custom_indent() {
    let json = write_with(WriterOptions::with_indent(4), |w| {
        w.begin_object()?;
        w.name("a")?;
        w.begin_array()?;
        w.value_bool(true)?;
        w.end_array()?;
        w.end_object()
    });
    assert_eq!(json, "{\n    \"a\": [\n        true\n    ]\n}");
}

#[test]
fn test_writer_json_value() {
    let value = serde_json::json!({"b": [1, 2.5, null], "a": "x"});
    let json = write_with(WriterOptions::compact(), |w| w.value_json(&value));
    assert_eq!(json, r#"{"a":"x","b":[1,2.5,null]}"#);
}

#[test]
fn test_writer_then_reader() {
    let json = write_with(WriterOptions::pretty(), |w| {
        w.begin_array()?;
        w.value_str("line\nbreak")?;
        w.value_i64(-3)?;
        w.value_number("12.500")?;
        w.null_value()?;
        w.end_array()
    });

    let mut reader = JsonReader::new(&json);
    reader.begin_array().unwrap();
    assert_eq!(reader.next_string().unwrap(), "line\nbreak");
    assert_eq!(reader.next_long().unwrap(), -3);
    assert_eq!(reader.next_number().unwrap(), "12.500");
    reader.next_null().unwrap();
    reader.end_array().unwrap();
}

#[test]
fn test_writer_rejects_name_outside_object() {
    let mut out = Vec::new();
    let mut writer = JsonWriter::new(&mut out, WriterOptions::compact());
    writer.begin_array().unwrap();
    assert!(matches!(writer.name("a"), Err(EncodeError::InvalidState { .. })));
}

#[test]
fn test_writer_rejects_unbalanced_close() {
    let mut out = Vec::new();
    let mut writer = JsonWriter::new(&mut out, WriterOptions::compact());
    writer.begin_array().unwrap();
    assert!(matches!(writer.end_object(), Err(EncodeError::InvalidState { .. })));
}
