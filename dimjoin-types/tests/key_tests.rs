use dimjoin_types::{FieldSpec, FieldType, FieldValue, KeyValue, LookupKey, Schema};
use std::collections::HashSet;

fn schema(key: &[&str]) -> Schema {
    Schema::new(
        vec![
            FieldSpec::new("product_id", FieldType::String),
            FieldSpec::new("region_code", FieldType::Double),
            FieldSpec::new("name", FieldType::String),
        ],
        key.iter().map(|k| k.to_string()).collect(),
    )
    .unwrap()
}

#[test]
fn key_from_string_value() {
    let key = LookupKey::from_values(&schema(&["product_id"]), &[FieldValue::from("p1")]).unwrap();
    assert_eq!(key, LookupKey::string("p1"));
    assert_eq!(key.to_string(), "p1");
}

#[test]
fn key_from_number_value_uses_decimal_text() {
    let key = LookupKey::from_values(&schema(&["region_code"]), &[FieldValue::Double(42.0)]).unwrap();
    assert_eq!(key.parts(), &[KeyValue::Number("42".to_string())]);
}

#[test]
fn composite_key_display() {
    let key = LookupKey::from_values(
        &schema(&["product_id", "region_code"]),
        &[FieldValue::from("p1"), FieldValue::Double(7.5)],
    )
    .unwrap();
    assert_eq!(key.len(), 2);
    assert_eq!(key.to_string(), "p1|7.5");
}

#[test]
fn key_rejects_null() {
    let err = LookupKey::from_values(&schema(&["product_id"]), &[FieldValue::Null]).unwrap_err();
    assert!(err.contains("null"));
}

#[test]
fn key_rejects_empty_string() {
    assert!(LookupKey::from_values(&schema(&["product_id"]), &[FieldValue::from("")]).is_err());
}

#[test]
fn key_rejects_wrong_arity() {
    let err = LookupKey::from_values(&schema(&["product_id"]), &[FieldValue::from("a"), FieldValue::from("b")]).unwrap_err();
    assert!(err.contains("expected 1"));
}

#[test]
fn key_rejects_type_mismatch() {
    assert!(LookupKey::from_values(&schema(&["product_id"]), &[FieldValue::Double(1.0)]).is_err());
    assert!(LookupKey::from_values(&schema(&["region_code"]), &[FieldValue::from("1")]).is_err());
}

#[test]
fn key_rejects_non_finite_number() {
    assert!(
        LookupKey::from_values(&schema(&["region_code"]), &[FieldValue::Double(f64::NAN)]).is_err()
    );
}

#[test]
fn keys_hash_by_value() {
    let mut set = HashSet::new();
    set.insert(LookupKey::string("p1"));
    set.insert(LookupKey::from("p1"));
    set.insert(LookupKey::string("p2"));
    assert_eq!(set.len(), 2);
}
