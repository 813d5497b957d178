use omcl::{
    parse_item_str, parse_str, serialize, serialize_document, serialize_to, serialize_to_file,
    serialize_with, Array, ErrorKind, Object, Parser, SerializerOptions, Value,
};

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::from(entries.into_iter().collect::<Object>())
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn scalars() {
    assert_eq!(serialize(&Value::none()).unwrap(), "none");
    assert_eq!(serialize(&Value::from(false)).unwrap(), "false");
    assert_eq!(serialize(&Value::from(-12)).unwrap(), "-12");
    assert_eq!(serialize(&Value::from(2.5)).unwrap(), "2.5");
    assert_eq!(serialize(&Value::from(3.0)).unwrap(), "3.0");
    assert_eq!(serialize(&Value::from("hi")).unwrap(), "\"hi\"");
}

#[test]
fn empty_containers() {
    assert_eq!(serialize(&Value::from(Object::new())).unwrap(), "{}");
    assert_eq!(serialize(&Value::from(Array::new())).unwrap(), "[]");
}

#[test]
fn flat_object() {
    let value = object([("name", Value::from("demo")), ("port", Value::from(8080))]);
    assert_eq!(
        serialize(&value).unwrap(),
        "{\n    name = \"demo\"\n    port = 8080\n}"
    );
}

#[test]
fn nested_layout() {
    let inner: Array = [1, 2].into_iter().collect();
    let value = object([
        ("list", Value::from(inner)),
        ("child", object([("x", Value::from(true))])),
        ("empty", Value::from(Array::new())),
    ]);
    let expected = "{\n    list = [\n        1\n        2\n    ]\n    child = {\n        x = true\n    }\n    empty = []\n}";
    assert_eq!(serialize(&value).unwrap(), expected);
}

#[test]
fn custom_indent() {
    let value = object([("a", Value::from(1))]);
    let text = serialize_with(&value, &SerializerOptions { indent: 2 }).unwrap();
    assert_eq!(text, "{\n  a = 1\n}");
}

#[test]
fn insertion_order_is_kept() {
    let value = object([("zeta", Value::from(1)), ("alpha", Value::from(2))]);
    let text = serialize(&value).unwrap();
    assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
}

#[test]
fn tags_are_not_written() {
    let value = Value::from(1).with_tag("Soccer");
    assert_eq!(serialize(&value).unwrap(), "1");
}

#[test]
fn document_form_has_no_braces() {
    let doc: Object = [("a", Value::from(1)), ("b", object([("c", Value::from(2))]))]
        .into_iter()
        .collect();
    assert_eq!(
        serialize_document(&doc).unwrap(),
        "a = 1\nb = {\n    c = 2\n}"
    );
    assert_eq!(parse_str(&serialize_document(&doc).unwrap()).unwrap(), doc);
}

// ============================================================================
// Strings and keys
// ============================================================================

#[test]
fn strings_with_double_quotes_read_back() {
    for s in [r#"say "hi""#, r#"""#, r#"a""b"#, "'single'", "multi\nline"] {
        let text = serialize(&Value::from(s)).unwrap();
        assert_eq!(parse_item_str(&text).unwrap(), Value::from(s), "{text}");
    }
}

#[test]
fn key_quoting() {
    let value = object([
        ("plain_key", Value::from(1)),
        ("with space", Value::from(2)),
        ("9lives", Value::from(3)),
        ("it\"s", Value::from(4)),
    ]);
    let text = serialize(&value).unwrap();
    assert!(text.contains("\n    plain_key = 1\n"), "{text}");
    assert!(text.contains("\n    \"with space\" = 2\n"), "{text}");
    assert!(text.contains("\n    \"9lives\" = 3\n"), "{text}");
    assert!(text.contains("\n    'it\"s' = 4\n"), "{text}");
    assert_eq!(parse_item_str(&text).unwrap(), value);
}

#[test]
fn keyword_keys_read_back() {
    let value = object([("none", Value::from(1)), ("true", Value::from(2))]);
    let text = serialize(&value).unwrap();
    assert_eq!(parse_item_str(&text).unwrap(), value);
}

#[test]
fn key_with_both_quote_kinds_is_unsupported() {
    let value = object([("a'b\"c", Value::from(1))]);
    assert_eq!(serialize(&value).unwrap_err().kind(), ErrorKind::UnsupportedType);
}

#[test]
fn non_finite_float_is_unsupported() {
    let err = serialize(&Value::from(f64::INFINITY)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
}

// ============================================================================
// Sinks
// ============================================================================

#[test]
fn serialize_into_writer() {
    let mut buf = Vec::new();
    serialize_to(&Value::from(Array::from(vec![Value::from("x")])), &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "[\n    \"x\"\n]");
}

#[test]
fn serialize_into_file_and_read_back() {
    let path = std::env::temp_dir().join(format!("omcl-serializer-{}.omcl", std::process::id()));
    let value = object([("port", Value::from(9000))]);
    serialize_to_file(&value, &path).unwrap();

    let read = Parser::from_file(&path).unwrap().parse_item().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(read, value);
}

#[test]
fn parsed_document_reserializes_identically() {
    let src = "{\n    name = \"demo\"\n    sizes = [\n        1\n        2.5\n    ]\n    inner = {}\n}";
    let value = parse_item_str(src).unwrap();
    assert_eq!(serialize(&value).unwrap(), src);
}
