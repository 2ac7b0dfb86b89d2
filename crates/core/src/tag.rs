//! Typed key/value tags
//!
//! Tags attach to items and rich versions. A tag's value, when present, is
//! one of four ground types: STRING, INTEGER, LONG, BOOLEAN. The value
//! carries its own type, so "value present iff type present, and the value
//! matches the type" holds by construction rather than by runtime check.
//!
//! ## Equality
//!
//! Two tags are equal iff key and value are equal. The owner id is excluded:
//! the same logical tag can exist on different owners.
//!
//! ## Wire form
//!
//! A tag serializes as `{"value": ..., "type": ...}` where `type` is one of
//! the four ground type names or `null`. The tag key is the property name in
//! the enclosing `tags` object, so it is not repeated inside the tag itself.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of tag value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    /// UTF-8 string
    String,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// Boolean
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "STRING",
            ValueType::Integer => "INTEGER",
            ValueType::Long => "LONG",
            ValueType::Boolean => "BOOLEAN",
        };
        write!(f, "{}", name)
    }
}

/// A typed tag value.
///
/// Different types are never equal, even when the payloads look alike:
/// `Integer(5) != Long(5)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// UTF-8 string value
    String(String),
    /// 32-bit integer value
    Integer(i32),
    /// 64-bit integer value
    Long(i64),
    /// Boolean value
    Boolean(bool),
}

impl TagValue {
    /// The ground type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            TagValue::String(_) => ValueType::String,
            TagValue::Integer(_) => ValueType::Integer,
            TagValue::Long(_) => ValueType::Long,
            TagValue::Boolean(_) => ValueType::Boolean,
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagValue::String(s) => serializer.serialize_str(s),
            TagValue::Integer(i) => serializer.serialize_i32(*i),
            TagValue::Long(l) => serializer.serialize_i64(*l),
            TagValue::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

/// A typed key/value attribute attached to an item or a rich version.
#[derive(Debug, Clone, Eq)]
pub struct Tag {
    /// Id of the item or rich version this tag is attached to
    pub owner_id: u64,
    /// Tag key, unique within its owner
    pub key: String,
    /// Optional typed value; `None` means the tag is a bare marker
    pub value: Option<TagValue>,
}

impl Tag {
    /// Create a tag attached to `owner_id`
    pub fn new(owner_id: u64, key: impl Into<String>, value: Option<TagValue>) -> Self {
        Self {
            owner_id,
            key: key.into(),
            value,
        }
    }

    /// The declared type of the value, if a value is present
    pub fn value_type(&self) -> Option<ValueType> {
        self.value.as_ref().map(TagValue::value_type)
    }

    /// Re-attach this tag to a different owner under a possibly different key
    ///
    /// Used when decoding the wire form, where owner and key come from the
    /// enclosing context rather than the tag body.
    pub fn attach(mut self, owner_id: u64, key: impl Into<String>) -> Self {
        self.owner_id = owner_id;
        self.key = key.into();
        self
    }
}

/// Owner-independent equality: key and value only.
impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tag", 2)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("type", &self.value_type())?;
        state.end()
    }
}

/// Raw wire value before the declared type narrows it.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTagValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Deserialize)]
struct TagWire {
    #[serde(default)]
    value: Option<RawTagValue>,
    #[serde(rename = "type", default)]
    value_type: Option<ValueType>,
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = TagWire::deserialize(deserializer)?;
        let value = match (wire.value, wire.value_type) {
            (None, None) => None,
            (Some(raw), Some(ty)) => Some(coerce::<D>(raw, ty)?),
            (Some(_), None) => {
                return Err(de::Error::custom("tag has a value but no type"));
            }
            (None, Some(_)) => {
                return Err(de::Error::custom("tag has a type but no value"));
            }
        };
        // Owner and key are supplied by the enclosing context via `attach`.
        Ok(Tag::new(0, "", value))
    }
}

fn coerce<'de, D: Deserializer<'de>>(
    raw: RawTagValue,
    ty: ValueType,
) -> Result<TagValue, D::Error> {
    match (raw, ty) {
        (RawTagValue::Str(s), ValueType::String) => Ok(TagValue::String(s)),
        (RawTagValue::Bool(b), ValueType::Boolean) => Ok(TagValue::Boolean(b)),
        (RawTagValue::Int(i), ValueType::Long) => Ok(TagValue::Long(i)),
        (RawTagValue::Int(i), ValueType::Integer) => i
            .try_into()
            .map(TagValue::Integer)
            .map_err(|_| de::Error::custom(format!("{} does not fit in INTEGER", i))),
        (_, ty) => Err(de::Error::custom(format!("tag value does not match declared type {}", ty))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Value typing
    // ========================================

    #[test]
    fn value_type_matches_variant() {
        assert_eq!(TagValue::String("x".into()).value_type(), ValueType::String);
        assert_eq!(TagValue::Integer(1).value_type(), ValueType::Integer);
        assert_eq!(TagValue::Long(1).value_type(), ValueType::Long);
        assert_eq!(TagValue::Boolean(true).value_type(), ValueType::Boolean);
    }

    #[test]
    fn integer_and_long_are_never_equal() {
        assert_ne!(TagValue::Integer(5), TagValue::Long(5));
    }

    #[test]
    fn value_type_display_uses_ground_type_names() {
        assert_eq!(ValueType::String.to_string(), "STRING");
        assert_eq!(ValueType::Integer.to_string(), "INTEGER");
        assert_eq!(ValueType::Long.to_string(), "LONG");
        assert_eq!(ValueType::Boolean.to_string(), "BOOLEAN");
    }

    // ========================================
    // Tag equality
    // ========================================

    #[test]
    fn equality_ignores_owner() {
        let a = Tag::new(1, "quality", Some(TagValue::Integer(9)));
        let b = Tag::new(2, "quality", Some(TagValue::Integer(9)));
        assert_eq!(a, b, "identical key/value on different owners must compare equal");
    }

    #[test]
    fn equality_respects_key_and_value() {
        let a = Tag::new(1, "quality", Some(TagValue::Integer(9)));
        assert_ne!(a, Tag::new(1, "grade", Some(TagValue::Integer(9))));
        assert_ne!(a, Tag::new(1, "quality", Some(TagValue::Integer(8))));
        assert_ne!(a, Tag::new(1, "quality", None));
    }

    #[test]
    fn bare_tags_with_same_key_are_equal() {
        assert_eq!(Tag::new(1, "marker", None), Tag::new(9, "marker", None));
    }

    // ========================================
    // Wire form
    // ========================================

    #[test]
    fn serializes_value_and_type() {
        let tag = Tag::new(7, "size", Some(TagValue::Long(1024)));
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json, serde_json::json!({"value": 1024, "type": "LONG"}));
    }

    #[test]
    fn bare_tag_serializes_nulls() {
        let tag = Tag::new(7, "marker", None);
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json, serde_json::json!({"value": null, "type": null}));
    }

    #[test]
    fn deserializes_each_ground_type() {
        let cases = [
            (r#"{"value": "a", "type": "STRING"}"#, TagValue::String("a".into())),
            (r#"{"value": 5, "type": "INTEGER"}"#, TagValue::Integer(5)),
            (r#"{"value": 5, "type": "LONG"}"#, TagValue::Long(5)),
            (r#"{"value": true, "type": "BOOLEAN"}"#, TagValue::Boolean(true)),
        ];
        for (json, expected) in cases {
            let tag: Tag = serde_json::from_str(json).unwrap();
            assert_eq!(tag.value, Some(expected));
        }
    }

    #[test]
    fn absent_value_and_type_decode_to_bare_tag() {
        let tag: Tag = serde_json::from_str(r#"{"value": null, "type": null}"#).unwrap();
        assert!(tag.value.is_none());
        assert!(tag.value_type().is_none());

        let tag: Tag = serde_json::from_str("{}").unwrap();
        assert!(tag.value.is_none());
    }

    #[test]
    fn rejects_unpaired_value_or_type() {
        assert!(serde_json::from_str::<Tag>(r#"{"value": 5}"#).is_err());
        assert!(serde_json::from_str::<Tag>(r#"{"type": "LONG"}"#).is_err());
    }

    #[test]
    fn rejects_mismatched_value_and_type() {
        assert!(serde_json::from_str::<Tag>(r#"{"value": "5", "type": "INTEGER"}"#).is_err());
        assert!(serde_json::from_str::<Tag>(r#"{"value": true, "type": "STRING"}"#).is_err());
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let json = format!(r#"{{"value": {}, "type": "INTEGER"}}"#, i64::from(i32::MAX) + 1);
        assert!(serde_json::from_str::<Tag>(&json).is_err());
    }

    #[test]
    fn attach_sets_owner_and_key() {
        let tag: Tag = serde_json::from_str(r#"{"value": 1, "type": "LONG"}"#).unwrap();
        let tag = tag.attach(42, "weight");
        assert_eq!(tag.owner_id, 42);
        assert_eq!(tag.key, "weight");
    }
}
