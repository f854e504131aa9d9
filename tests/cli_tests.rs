#![cfg(feature = "cli")]

use gqlshape::cli::{
    execute_decode, execute_eval, execute_normalize, execute_variants, CliError, DecodeOptions,
    Decoded, EvalOptions, NormalizeOptions, VariantsOptions,
};
use gqlshape::DecodeError;

fn decode(type_ref: &str, input: &str) -> Result<String, CliError> {
    execute_decode(&DecodeOptions {
        type_ref: type_ref.into(),
        input: Some(input.into()),
        ..Default::default()
    })
    .map(|result| result.json)
}

// ============================================================================
// eval
// ============================================================================

#[test]
fn test_eval() {
    let options = EvalOptions {
        condition: "$a | $b".into(),
        variables: vec!["b".into()],
        typename: None,
    };
    assert!(execute_eval(&options).unwrap());

    let options = EvalOptions {
        condition: "$a & $b".into(),
        variables: vec!["b".into()],
        typename: None,
    };
    assert!(!execute_eval(&options).unwrap());
}

#[test]
fn test_eval_with_typename() {
    let options = EvalOptions {
        condition: "type(Droid) & !$compact".into(),
        variables: vec![],
        typename: Some("Droid".into()),
    };
    assert!(execute_eval(&options).unwrap());
}

#[test]
fn test_eval_parse_error() {
    let options = EvalOptions {
        condition: "$a &".into(),
        ..Default::default()
    };
    let err = execute_eval(&options).unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
    assert!(err.to_string().starts_with("Parse error: expected a condition"));
}

// ============================================================================
// normalize
// ============================================================================

#[test]
fn test_normalize() {
    let result = execute_normalize(&NormalizeOptions {
        condition: "$b & $a | $a & !$b".into(),
        simplify_only: false,
    })
    .unwrap();
    assert_eq!(result.to_string(), "$a");
}

#[test]
fn test_simplify_only() {
    let result = execute_normalize(&NormalizeOptions {
        condition: "$b & true & ($a & $b)".into(),
        simplify_only: true,
    })
    .unwrap();
    assert_eq!(result.to_string(), "$b & $a");
}

// ============================================================================
// variants
// ============================================================================

#[test]
fn test_variants_report() {
    let report = execute_variants(&VariantsOptions {
        conditions: vec!["$a & $b".into(), "$b & $a".into(), "!$a".into()],
        typenames: vec![],
    })
    .unwrap();

    assert_eq!(report.groups.len(), 2);
    assert!(report.groups.iter().any(|(_, fields)| fields == &vec![0, 1]));
    assert!(report.groups.iter().any(|(_, fields)| fields == &vec![2]));
    assert_eq!(report.shapes.len(), 3);

    let text = report.to_string();
    assert!(text.contains("  $a & $b: #0, #1\n"));
    assert!(text.contains("shapes: 3\n"));
    assert!(text.contains("  001\n"));
}

// ============================================================================
// decode
// ============================================================================

#[test]
fn test_decode_reformats() {
    assert_eq!(decode("[Int!]!", "[1, 2,\n 3]").unwrap(), "[1,2,3]");
    assert_eq!(decode("[String]", "[\"a\", null]").unwrap(), r#"["a",null]"#);
    assert_eq!(decode("Decimal", "0.10").unwrap(), "0.10");
    assert_eq!(decode("JSON!", r#"{"b": 1, "a": [true]}"#).unwrap(), r#"{"a":[true],"b":1}"#);
}

#[test]
fn test_decode_nullability() {
    assert_eq!(decode("String", "null").unwrap(), "null");
    assert!(matches!(
        decode("String!", "null"),
        Err(CliError::Decode(DecodeError::UnexpectedNull { .. }))
    ));
    assert!(matches!(
        decode("[Int!]", "[1, null]"),
        Err(CliError::Decode(DecodeError::UnexpectedNull { .. }))
    ));
}

#[test]
fn test_decode_value() {
    let result = execute_decode(&DecodeOptions {
        type_ref: "[Boolean!]!".into(),
        input: Some("[true, false]".into()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        result.value,
        Decoded::List(vec![Decoded::Boolean(true), Decoded::Boolean(false)])
    );
}

#[test]
fn test_decode_pretty() {
    let result = execute_decode(&DecodeOptions {
        type_ref: "[ID!]!".into(),
        input: Some(r#"["1000"]"#.into()),
        pretty: true,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(result.json, "[\n  \"1000\"\n]");
}

#[test]
fn test_decode_custom_scalar() {
    let options = DecodeOptions {
        type_ref: "[Date!]!".into(),
        input: Some(r#"["2024-01-01"]"#.into()),
        pretty: false,
        scalars: vec!["Date=String".into()],
    };
    assert_eq!(execute_decode(&options).unwrap().json, r#"["2024-01-01"]"#);

    assert!(matches!(
        decode("Date!", r#""2024-01-01""#),
        Err(CliError::Decode(DecodeError::UnknownScalar { .. }))
    ));
}

#[test]
fn test_decode_errors() {
    assert!(matches!(decode("[Int", "[]"), Err(CliError::InvalidType { .. })));
    assert!(matches!(
        execute_decode(&DecodeOptions {
            type_ref: "Int".into(),
            ..Default::default()
        }),
        Err(CliError::NoInput)
    ));
    assert!(matches!(
        decode("Int!", "true"),
        Err(CliError::Decode(DecodeError::UnexpectedToken { .. }))
    ));
    assert!(matches!(
        decode("Int!", "\"x\""),
        Err(CliError::Decode(DecodeError::InvalidValue { .. }))
    ));
}
