// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Tagged-literal parser registry.
//!
//! The reader consults a [`TagRegistry`] whenever it meets `#tag value`. A
//! registered parser turns the already-read payload into its final [`Value`];
//! unknown tags are kept as generic [`TaggedValue`]s.
//!
//! ## Process-wide registry
//!
//! [`install_global`] installs a registry for the whole process exactly once,
//! before any decoding starts. [`global`] hands out a shared reference and
//! falls back to [`TagRegistry::default`] if nothing was installed. Once the
//! global registry has been read it can no longer be replaced, so a decode in
//! flight never observes a re-initialization.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EdnError, Result};
use crate::value::{TaggedValue, Value, DB_ID_TAG};
use crate::writer;

/// Parser for the payload of one tagged literal.
pub type TagParser = fn(Value) -> Result<Value>;

static GLOBAL: OnceLock<TagRegistry> = OnceLock::new();

/// Map from tag name (without `#`) to its parser.
#[derive(Clone)]
pub struct TagRegistry {
    parsers: HashMap<String, TagParser>,
}

impl TagRegistry {
    /// A registry with no parsers at all. Every tag stays generic.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register `parser` for `tag`, replacing any earlier parser.
    ///
    /// Returns the parser that was replaced, if any.
    pub fn register(&mut self, tag: impl Into<String>, parser: TagParser) -> Option<TagParser> {
        let tag = tag.into();
        debug!(tag = %tag, "Registering tagged-literal parser");
        self.parsers.insert(tag, parser)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.parsers.contains_key(tag)
    }

    /// Materialize `#tag value`.
    pub fn parse(&self, tag: &str, value: Value) -> Result<Value> {
        match self.parsers.get(tag) {
            Some(parser) => parser(value),
            None => Ok(Value::Tagged(TaggedValue::new(tag, value))),
        }
    }
}

impl Default for TagRegistry {
    /// `#db/id`, `#inst` and `#uuid`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DB_ID_TAG, parse_db_id);
        registry.register("inst", parse_inst);
        registry.register("uuid", parse_uuid);
        registry
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.parsers.keys().collect();
        tags.sort();
        f.debug_struct("TagRegistry").field("tags", &tags).finish()
    }
}

/// Install the process-wide registry.
///
/// # Errors
///
/// Returns [`EdnError::AlreadyInstalled`] if a registry was already installed,
/// or if [`global`] was called earlier and pinned the default registry.
pub fn install_global(registry: TagRegistry) -> Result<()> {
    GLOBAL
        .set(registry)
        .map_err(|_| EdnError::AlreadyInstalled)
}

/// The process-wide registry.
pub fn global() -> &'static TagRegistry {
    GLOBAL.get_or_init(TagRegistry::default)
}

// ---------------------------------------------------------------------------
// Built-in parsers
// ---------------------------------------------------------------------------

/// `#db/id[partition n]`: the representation must be an ordered sequence.
pub fn parse_db_id(value: Value) -> Result<Value> {
    match value {
        Value::Vector(_) | Value::List(_) => Ok(Value::Tagged(TaggedValue::db_id(value))),
        other => Err(EdnError::MalformedLiteral(format!(
            "#{DB_ID_TAG} expects a vector, found {}",
            writer::to_string(&other)
        ))),
    }
}

/// `#inst "2024-01-02T03:04:05.000Z"`
pub fn parse_inst(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| Value::Inst(t.with_timezone(&Utc)))
            .map_err(|e| EdnError::InvalidInstant(format!("{s}: {e}"))),
        other => Err(EdnError::InvalidInstant(writer::to_string(&other))),
    }
}

/// `#uuid "00000000-0000-0000-0000-000000000000"`
pub fn parse_uuid(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => Uuid::parse_str(&s)
            .map(Value::Uuid)
            .map_err(|e| EdnError::InvalidUuid(format!("{s}: {e}"))),
        other => Err(EdnError::InvalidUuid(writer::to_string(&other))),
    }
}
