// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! The EDN data model exchanged with the REST service.
//!
//! [`Value`] is totally ordered (floats compare with `total_cmp`) so that it can
//! be used as a key in maps and sets, which the service returns for entity
//! attribute maps and tempid tables.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::writer;

/// Tag used by the service for entity-id literals.
pub const DB_ID_TAG: &str = "db/id";

// ---------------------------------------------------------------------------
// TaggedValue
// ---------------------------------------------------------------------------

/// A tagged literal that is carried through without local interpretation.
///
/// The `#db/id` literal is the main case: it wraps a partition/sequence pair
/// such as `[:db.part/user -1]` and renders back as `#db/id[:db.part/user -1]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaggedValue {
    tag: String,
    value: Box<Value>,
}

impl TaggedValue {
    /// Wrap `value` under `tag` (tag given without the leading `#`).
    pub fn new(tag: impl Into<String>, value: Value) -> Self {
        Self {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    /// Build a `#db/id` literal from its partition and optional sequence number.
    pub fn db_id(id: Value) -> Self {
        Self::new(DB_ID_TAG, id)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_db_id(&self) -> bool {
        self.tag == DB_ID_TAG
    }

    pub fn into_value(self) -> Value {
        *self.value
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::tagged_to_string(self))
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// An EDN value.
///
/// Keywords and symbols store their name without the leading `:`, including
/// any namespace (`Value::Keyword("db/ident".into())` is `:db/ident`).
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Char(char),
    Symbol(String),
    Keyword(String),
    List(Vec<Value>),
    Vector(Vec<Value>),
    Map(BTreeMap<Value, Value>),
    Set(BTreeSet<Value>),
    /// `#inst "..."`
    Inst(DateTime<Utc>),
    /// `#uuid "..."`
    Uuid(Uuid),
    /// Any other tagged literal, including `#db/id`.
    Tagged(TaggedValue),
}

impl Value {
    // -- Constructors -------------------------------------------------------

    pub fn keyword(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix(':') {
            Some(stripped) => Value::Keyword(stripped.to_owned()),
            None => Value::Keyword(name),
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn vector<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    pub fn set<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Set(items.into_iter().collect())
    }

    // -- Accessors ----------------------------------------------------------

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Keyword name without the leading colon.
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<&TaggedValue> {
        match self {
            Value::Tagged(t) => Some(t),
            _ => None,
        }
    }

    /// Look up `:name` in a map value.
    pub fn get_keyword(&self, name: &str) -> Option<&Value> {
        self.as_map()?.get(&Value::keyword(name))
    }

    /// Whether this value is a collection (list, vector, map or set).
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Vector(_) | Value::Map(_) | Value::Set(_)
        )
    }

    /// Position of each variant in the total order across variants.
    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::Char(_) => 4,
            Value::String(_) => 5,
            Value::Symbol(_) => 6,
            Value::Keyword(_) => 7,
            Value::Inst(_) => 8,
            Value::Uuid(_) => 9,
            Value::List(_) => 10,
            Value::Vector(_) => 11,
            Value::Set(_) => 12,
            Value::Map(_) => 13,
            Value::Tagged(_) => 14,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b))
            | (Value::Symbol(a), Value::Symbol(b))
            | (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::Inst(a), Value::Inst(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Vector(a), Value::Vector(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Tagged(a), Value::Tagged(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) | Value::Symbol(s) | Value::Keyword(s) => s.hash(state),
            Value::Inst(t) => t.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::List(items) | Value::Vector(items) => items.hash(state),
            Value::Set(items) => items.hash(state),
            Value::Map(m) => m.hash(state),
            Value::Tagged(t) => t.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::to_string(self))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Vector(items)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Inst(t)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<TaggedValue> for Value {
    fn from(t: TaggedValue) -> Self {
        Value::Tagged(t)
    }
}

// ---------------------------------------------------------------------------
// JSON-compatible serialization
// ---------------------------------------------------------------------------

/// Render a map key as a string: keywords and symbols by name, strings as-is,
/// anything else in its EDN text form.
fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) | Value::Keyword(s) | Value::Symbol(s) => s.clone(),
        other => writer::to_string(other),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) | Value::Symbol(s) | Value::Keyword(s) => {
                serializer.serialize_str(s)
            }
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Inst(t) => serializer.serialize_str(&t.to_rfc3339()),
            Value::Uuid(u) => serializer.serialize_str(&u.to_string()),
            Value::Tagged(t) => serializer.serialize_str(&writer::tagged_to_string(t)),
            Value::List(items) | Value::Vector(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&key_string(k), v)?;
                }
                map.end()
            }
        }
    }
}
