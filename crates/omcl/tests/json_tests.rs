use omcl::{from_json, parse_item_str, parse_str, serialize_document, to_json, ErrorKind, Value, ValueKind};
use serde_json::json;

#[test]
fn document_to_json_keeps_order_and_drops_tags() {
    let doc = parse_str("zeta = 1\nalpha = !Meters 2.5\nlist = [true, none, \"s\"]").unwrap();
    let json: serde_json::Value = serde_json::from_str(&to_json(&Value::from(doc)).unwrap()).unwrap();
    assert_eq!(json, json!({"zeta": 1, "alpha": 2.5, "list": [true, null, "s"]}));
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["zeta", "alpha", "list"]);
}

#[test]
fn to_json_is_pretty_printed() {
    let value = parse_item_str("{ a = 1 }").unwrap();
    assert_eq!(to_json(&value).unwrap(), "{\n  \"a\": 1\n}");
}

#[test]
fn non_finite_float_becomes_null() {
    assert_eq!(to_json(&Value::from(f64::NAN)).unwrap(), "null");
}

#[test]
fn json_kinds_map_onto_omcl_kinds() {
    let value = from_json(r#"{"n": null, "b": false, "i": -3, "f": 0.5, "s": "x", "a": [], "o": {}}"#)
        .unwrap();
    let object = value.as_object().unwrap();
    assert!(object["n"].is_none());
    assert_eq!(object["b"], Value::from(false));
    assert_eq!(object["i"], Value::from(-3));
    assert_eq!(object["f"], Value::from(0.5));
    assert_eq!(object["s"], Value::from("x"));
    assert!(matches!(object["a"].kind(), ValueKind::Array(a) if a.is_empty()));
    assert!(matches!(object["o"].kind(), ValueKind::Object(o) if o.is_empty()));
}

#[test]
fn json_object_becomes_a_document() {
    let value = from_json(r#"{"name": "demo", "limits": {"max": 10}}"#).unwrap();
    let text = serialize_document(value.as_object().unwrap()).unwrap();
    assert_eq!(text, "name = \"demo\"\nlimits = {\n    max = 10\n}");
    assert_eq!(Value::from(parse_str(&text).unwrap()), value);
}

#[test]
fn invalid_json() {
    let err = from_json("{ not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Json);
}
