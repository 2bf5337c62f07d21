// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Codec configuration object.
//!
//! [`EdnCodec`] carries its own [`TagRegistry`], so callers that do not want
//! to rely on the process-wide registry can thread an explicit codec through
//! every encode/decode call.

use tracing::trace;
use url::form_urlencoded;

use crate::error::Result;
use crate::reader;
use crate::registry::{self, TagParser, TagRegistry};
use crate::value::Value;
use crate::writer;

/// EDN encoder/decoder bound to a tag registry.
#[derive(Debug, Clone)]
pub struct EdnCodec {
    registry: TagRegistry,
}

impl EdnCodec {
    /// A codec using a snapshot of the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(registry::global().clone())
    }

    pub fn with_registry(registry: TagRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Register a tag parser on this codec only.
    pub fn register(&mut self, tag: impl Into<String>, parser: TagParser) -> Option<TagParser> {
        self.registry.register(tag, parser)
    }

    /// Render `value` as EDN text.
    pub fn encode(&self, value: &Value) -> String {
        writer::to_string(value)
    }

    /// Parse one EDN value from `text`.
    pub fn decode(&self, text: &str) -> Result<Value> {
        trace!(len = text.len(), "Decoding EDN body");
        reader::from_str_with(text, &self.registry)
    }

    /// Form-urlencode `pairs` (`q=...&args=...`).
    pub fn encode_query_params<'a, I>(&self, pairs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        encode_query_params(pairs)
    }
}

impl Default for EdnCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Form-urlencode `pairs` in order.
pub fn encode_query_params<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
