use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a content item. CMS backends hand out integers (WordPress)
/// or opaque strings; both compare and hash as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{id}"),
            ItemId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Int(id)
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        ItemId::Int(i64::from(id))
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Str(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId::Str(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Number(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

/// A custom-field value: one scalar or a flat list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl AttrValue {
    /// Tolerant conversion from loose CMS JSON. Strings, booleans and numbers
    /// become scalars; arrays keep only their scalar elements. `null`,
    /// objects, and nested arrays have no attribute representation.
    pub fn from_json(value: &Value) -> Option<AttrValue> {
        match value {
            Value::String(s) => Some(AttrValue::Scalar(Scalar::Text(s.clone()))),
            Value::Bool(b) => Some(AttrValue::Scalar(Scalar::Bool(*b))),
            Value::Number(n) => Some(AttrValue::Scalar(Scalar::Number(n.clone()))),
            Value::Array(elements) => Some(AttrValue::List(
                elements.iter().filter_map(scalar_from_json).collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }
}

fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => Some(Scalar::Number(n.clone())),
        _ => None,
    }
}

/// One comparable content record. `title` is plain text; `description` stays
/// the raw HTML fragment the CMS delivered (normalization happens at
/// aggregation time). `attributes` preserves the record's own key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Item {
        Item {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image: None,
            date: None,
            attributes: IndexMap::new(),
        }
    }
}
