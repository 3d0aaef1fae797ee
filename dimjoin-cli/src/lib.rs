//! Building blocks for the `dimjoin` binary: JSON conversions, the item
//! loader and the JSON-lines enricher.

mod enrich;
mod load;

pub use enrich::{EnrichOptions, EnrichSummary, enrich_record, enrich_stream};
pub use load::{LoadSummary, load_items};

use anyhow::{Context, Result, bail};
use dimjoin_types::{AttributeValue, FieldType, FieldValue, Item, Row, Schema};
use serde_json::{Map, Value};

/// Converts a JSON object into a store item.
pub fn json_to_item(value: &Value) -> Result<Item> {
    let Value::Object(object) = value else {
        bail!("expected a JSON object, got {value}");
    };
    Ok(object
        .iter()
        .map(|(name, v)| (name.clone(), AttributeValue::from_json(v)))
        .collect())
}

/// Maps a JSON scalar to a field value. Non-scalars become null.
pub fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::String(s.clone()),
        Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Double),
        Value::Bool(b) => FieldValue::Boolean(*b),
        _ => FieldValue::Null,
    }
}

pub fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Double(d) => serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number),
        FieldValue::Boolean(b) => Value::Bool(*b),
    }
}

/// Reads the key fields of `record` by name, in the schema's key order.
/// Missing fields become null, which the lookup rejects as a malformed key.
pub fn key_values_from_record(schema: &Schema, record: &Map<String, Value>) -> Vec<FieldValue> {
    schema
        .key_names()
        .iter()
        .map(|name| record.get(name).map_or(FieldValue::Null, json_to_field))
        .collect()
}

/// Parses command-line key arguments against the schema's key types.
pub fn parse_key_args(schema: &Schema, args: &[String]) -> Result<Vec<FieldValue>> {
    if args.len() != schema.key_names().len() {
        bail!(
            "expected {} key value(s) ({}), got {}",
            schema.key_names().len(),
            schema.key_names().join(", "),
            args.len()
        );
    }

    schema
        .key_names()
        .iter()
        .zip(schema.key_types())
        .zip(args)
        .map(|((name, ty), arg)| match ty {
            FieldType::Double => arg
                .trim()
                .parse::<f64>()
                .map(FieldValue::Double)
                .with_context(|| format!("key field '{name}' expects a number, got '{arg}'")),
            _ => Ok(FieldValue::String(arg.clone())),
        })
        .collect()
}

/// Renders a row as a JSON object keyed by field name.
pub fn row_to_json(schema: &Schema, row: &Row) -> Map<String, Value> {
    schema
        .field_names()
        .zip(row.iter())
        .map(|(name, value)| (name.to_string(), field_to_json(value)))
        .collect()
}
