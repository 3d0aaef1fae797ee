//! Store item to row conversion.
//!
//! Dispatches on the attribute variant, then checks the result against the
//! declared field type. Fields that are absent, unparsable or of the wrong
//! type become null; conversion itself never fails.

use dimjoin_types::{AttributeValue, FieldSpec, FieldValue, Item, Row, Schema};
use tracing::debug;

/// Converts a raw item into a row in schema field order.
pub fn convert(item: &Item, schema: &Schema) -> Row {
    schema
        .fields()
        .iter()
        .map(|field| convert_field(field, item.get(&field.name)))
        .collect()
}

fn convert_field(field: &FieldSpec, value: Option<&AttributeValue>) -> FieldValue {
    let Some(value) = value else {
        return FieldValue::Null;
    };

    let converted = match value {
        AttributeValue::String(s) => FieldValue::String(s.clone()),
        AttributeValue::Number(n) => match n.trim().parse::<f64>() {
            Ok(d) => FieldValue::Double(d),
            Err(e) => {
                debug!("Field '{}': cannot parse number {:?}: {}", field.name, n, e);
                return FieldValue::Null;
            }
        },
        AttributeValue::Boolean(b) => FieldValue::Boolean(*b),
        AttributeValue::Other(text) => FieldValue::String(text.clone()),
    };

    if field.ty.accepts(&converted) {
        converted
    } else {
        debug!(
            "Field '{}': {} value does not fit declared type {}",
            field.name,
            value.kind(),
            field.ty
        );
        FieldValue::Null
    }
}
