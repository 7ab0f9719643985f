//! Conversions between Terraform values and typed provider models
//!
//! Models hold [`Field`]s so that "not yet known" (planning) and "explicitly
//! null" survive the round trip through a typed struct. Each supported Rust
//! type implements [`FromDynamic`] and [`IntoDynamic`]; models call
//! [`read_field`] and [`write_field`] once per attribute.

use thiserror::Error;
use tfplug::schema::AttributeType;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

/// Three-state attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Known only after apply
    Unknown,
    Null,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Null
    }
}

impl<T> Field<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Set(v),
            None => Field::Null,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone> Field<T> {
    pub fn cloned_value(&self) -> Option<T> {
        self.value().cloned()
    }
}

impl<T: PartialEq> Field<T> {
    /// The value to send when `self` is planned over `prior`: only values
    /// that are set and differ from prior state.
    pub fn changed_from(&self, prior: &Field<T>) -> Option<&T> {
        match self {
            Field::Set(v) if prior.value() != Some(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("attribute {attribute}: expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("attribute {attribute}: value {value} does not fit in {target}")]
    Overflow {
        attribute: String,
        value: String,
        target: &'static str,
    },

    #[error("attribute {0} is required but has no value")]
    MissingField(String),

    #[error("attribute {attribute}: unexpected value {value:?}")]
    UnexpectedValue { attribute: String, value: String },

    #[error("attribute {attribute}: {message}")]
    State { attribute: String, message: String },
}

/// Decodes a known, non-null value
pub trait FromDynamic: Sized {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError>;
}

/// Encodes a value for state
pub trait IntoDynamic {
    fn to_dynamic(&self) -> Dynamic;
}

fn mismatch(attribute: &str, expected: &'static str, actual: &Dynamic) -> MappingError {
    MappingError::TypeMismatch {
        attribute: attribute.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

impl FromDynamic for String {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(attribute, "string", value))
    }
}

impl IntoDynamic for String {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::String(self.clone())
    }
}

impl FromDynamic for bool {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(attribute, "bool", value))
    }
}

impl IntoDynamic for bool {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Bool(*self)
    }
}

impl FromDynamic for f64 {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        value
            .as_number()
            .ok_or_else(|| mismatch(attribute, "number", value))
    }
}

impl IntoDynamic for f64 {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Number(*self)
    }
}

/// Terraform numbers are f64; integers must be integral and in range
fn integral(
    attribute: &str,
    value: &Dynamic,
    min: f64,
    max: f64,
    target: &'static str,
) -> Result<f64, MappingError> {
    let n = f64::from_dynamic(attribute, value)?;
    if n.fract() != 0.0 || n < min || n > max {
        return Err(MappingError::Overflow {
            attribute: attribute.to_string(),
            value: n.to_string(),
            target,
        });
    }
    Ok(n)
}

impl FromDynamic for i64 {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        // f64 represents integers exactly up to 2^53
        const LIMIT: f64 = 9_007_199_254_740_992.0;
        integral(attribute, value, -LIMIT, LIMIT, "i64").map(|n| n as i64)
    }
}

impl IntoDynamic for i64 {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Number(*self as f64)
    }
}

impl FromDynamic for i32 {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        integral(attribute, value, i32::MIN as f64, i32::MAX as f64, "i32").map(|n| n as i32)
    }
}

impl IntoDynamic for i32 {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Number(f64::from(*self))
    }
}

impl FromDynamic for u32 {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        integral(attribute, value, 0.0, u32::MAX as f64, "u32").map(|n| n as u32)
    }
}

impl IntoDynamic for u32 {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Number(f64::from(*self))
    }
}

impl FromDynamic for u16 {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        integral(attribute, value, 0.0, u16::MAX as f64, "u16").map(|n| n as u16)
    }
}

impl IntoDynamic for u16 {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Number(f64::from(*self))
    }
}

impl<T: FromDynamic> FromDynamic for Vec<T> {
    fn from_dynamic(attribute: &str, value: &Dynamic) -> Result<Self, MappingError> {
        let items = value
            .as_list()
            .ok_or_else(|| mismatch(attribute, "list", value))?;
        items
            .iter()
            .map(|item| T::from_dynamic(attribute, item))
            .collect()
    }
}

impl<T: IntoDynamic> IntoDynamic for Vec<T> {
    fn to_dynamic(&self) -> Dynamic {
        Dynamic::List(self.iter().map(IntoDynamic::to_dynamic).collect())
    }
}

/// Terraform type of an attribute backed by `Self`
pub trait SchemaType {
    fn attribute_type() -> AttributeType;
}

impl SchemaType for String {
    fn attribute_type() -> AttributeType {
        AttributeType::String
    }
}

impl SchemaType for bool {
    fn attribute_type() -> AttributeType {
        AttributeType::Bool
    }
}

impl SchemaType for i64 {
    fn attribute_type() -> AttributeType {
        AttributeType::Number
    }
}

impl SchemaType for f64 {
    fn attribute_type() -> AttributeType {
        AttributeType::Number
    }
}

impl<T: SchemaType> SchemaType for Vec<T> {
    fn attribute_type() -> AttributeType {
        AttributeType::List(Box::new(T::attribute_type()))
    }
}

/// Reads the attribute `name` of `object`.
///
/// A missing attribute reads as null; an unknown object makes every
/// attribute unknown.
pub fn read_field<T: FromDynamic>(object: &DynamicValue, name: &str) -> Result<Field<T>, MappingError> {
    if object.is_unknown() {
        return Ok(Field::Unknown);
    }
    match object.get(&AttributePath::new(name)) {
        None | Some(Dynamic::Null) => Ok(Field::Null),
        Some(Dynamic::Unknown) => Ok(Field::Unknown),
        Some(value) => T::from_dynamic(name, value).map(Field::Set),
    }
}

pub fn write_field<T: IntoDynamic>(
    object: &mut DynamicValue,
    name: &str,
    field: &Field<T>,
) -> Result<(), MappingError> {
    let value = match field {
        Field::Set(v) => v.to_dynamic(),
        Field::Null => Dynamic::Null,
        Field::Unknown => Dynamic::Unknown,
    };
    object
        .set(&AttributePath::new(name), value)
        .map_err(|e| MappingError::State {
            attribute: name.to_string(),
            message: e.to_string(),
        })
}

/// Reads a single nested object attribute as its own value
pub fn read_object(object: &DynamicValue, name: &str) -> Result<Field<DynamicValue>, MappingError> {
    if object.is_unknown() {
        return Ok(Field::Unknown);
    }
    match object.get(&AttributePath::new(name)) {
        None | Some(Dynamic::Null) => Ok(Field::Null),
        Some(Dynamic::Unknown) => Ok(Field::Unknown),
        Some(value @ Dynamic::Map(_)) => Ok(Field::Set(DynamicValue::new(value.clone()))),
        Some(other) => Err(mismatch(name, "object", other)),
    }
}

pub fn write_object(
    object: &mut DynamicValue,
    name: &str,
    field: Field<DynamicValue>,
) -> Result<(), MappingError> {
    let value = match field {
        Field::Set(v) => v.value,
        Field::Null => Dynamic::Null,
        Field::Unknown => Dynamic::Unknown,
    };
    object
        .set(&AttributePath::new(name), value)
        .map_err(|e| MappingError::State {
            attribute: name.to_string(),
            message: e.to_string(),
        })
}

/// Fails when a response omits a field the model cannot do without
pub fn required<T>(value: Option<T>, name: &str) -> Result<T, MappingError> {
    value.ok_or_else(|| MappingError::MissingField(name.to_string()))
}

/// Numeric appliance identifiers are stored as strings in state
pub fn id_to_string(id: i64) -> String {
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(json: &str) -> DynamicValue {
        DynamicValue::decode_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn reads_three_states() {
        let value = state(r#"{"enabled": true, "bind_dn": null, "status": "__unknown__"}"#);

        assert_eq!(read_field::<bool>(&value, "enabled").unwrap(), Field::Set(true));
        assert_eq!(read_field::<String>(&value, "bind_dn").unwrap(), Field::Null);
        assert_eq!(read_field::<String>(&value, "status").unwrap(), Field::Unknown);
        assert_eq!(read_field::<String>(&value, "absent").unwrap(), Field::Null);
        assert_eq!(
            read_field::<String>(&DynamicValue::unknown(), "anything").unwrap(),
            Field::Unknown
        );
    }

    #[test]
    fn rejects_wrong_kinds() {
        let value = state(r#"{"enabled": "yes"}"#);
        let err = read_field::<bool>(&value, "enabled").unwrap_err();
        assert_eq!(
            err,
            MappingError::TypeMismatch {
                attribute: "enabled".to_string(),
                expected: "bool",
                actual: "string",
            }
        );
    }

    #[test]
    fn integers_must_be_integral_and_in_range() {
        let value = state(r#"{"a": 3600, "b": 1.5, "c": 3000000000}"#);
        assert_eq!(read_field::<i64>(&value, "a").unwrap(), Field::Set(3600));
        assert!(matches!(
            read_field::<i64>(&value, "b"),
            Err(MappingError::Overflow { .. })
        ));
        assert!(matches!(
            read_field::<i32>(&value, "c"),
            Err(MappingError::Overflow { target: "i32", .. })
        ));
        assert_eq!(read_field::<i64>(&value, "c").unwrap(), Field::Set(3_000_000_000));
        assert!(matches!(
            read_field::<u16>(&value, "c"),
            Err(MappingError::Overflow { target: "u16", .. })
        ));
        assert_eq!(read_field::<u16>(&value, "a").unwrap(), Field::Set(3600));
    }

    #[test]
    fn writes_all_three_states() {
        let mut value = DynamicValue::object();
        write_field(&mut value, "a", &Field::Set(vec!["x".to_string()])).unwrap();
        write_field::<bool>(&mut value, "b", &Field::Null).unwrap();
        write_field::<i64>(&mut value, "c", &Field::Unknown).unwrap();

        assert_eq!(
            value.get(&AttributePath::new("a")),
            Some(&Dynamic::List(vec![Dynamic::String("x".into())]))
        );
        assert_eq!(value.get(&AttributePath::new("b")), Some(&Dynamic::Null));
        assert_eq!(value.get(&AttributePath::new("c")), Some(&Dynamic::Unknown));
    }

    #[test]
    fn nested_objects_read_as_values() {
        let value = state(r#"{"spillover_target": {"name": "pool1", "id": 4}, "bad": 3}"#);
        let nested = read_object(&value, "spillover_target").unwrap();
        let nested = nested.value().unwrap();
        assert_eq!(
            read_field::<String>(nested, "name").unwrap(),
            Field::Set("pool1".to_string())
        );
        assert!(read_object(&value, "bad").is_err());
        assert_eq!(read_object(&value, "missing").unwrap(), Field::Null);
    }

    #[test]
    fn changed_from_only_reports_set_differences() {
        let prior = Field::Set(30_i64);
        assert_eq!(Field::Set(60_i64).changed_from(&prior), Some(&60));
        assert_eq!(Field::Set(30_i64).changed_from(&prior), None);
        assert_eq!(Field::<i64>::Unknown.changed_from(&prior), None);
        assert_eq!(Field::Set(5_i64).changed_from(&Field::Null), Some(&5));
    }

    #[test]
    fn ids_convert_between_number_and_string() {
        assert_eq!(id_to_string(12), "12");
        assert_eq!(required(None::<i64>, "id"), Err(MappingError::MissingField("id".into())));
    }
}
