// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Raw index access.
//!
//! `GET /data/{alias}/-/datoms` walks one of the four indexes. Components
//! narrow the walk; `history`, `limit` and `offset` from the database value
//! are applied here.

use std::fmt;
use std::str::FromStr;

use datomic_edn::{EdnCodec, Value};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::async_result::AsyncResult;
use crate::database::DatabaseValue;
use crate::error::{DbError, Result};
use crate::target::Target;
use crate::transport::HttpRequest;

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Index {
    Eavt,
    Aevt,
    Avet,
    Vaet,
}

impl Index {
    pub fn as_str(&self) -> &'static str {
        match self {
            Index::Eavt => "eavt",
            Index::Aevt => "aevt",
            Index::Avet => "avet",
            Index::Vaet => "vaet",
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Index {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches(':') {
            "eavt" => Ok(Index::Eavt),
            "aevt" => Ok(Index::Aevt),
            "avet" => Ok(Index::Avet),
            "vaet" => Ok(Index::Vaet),
            other => Err(DbError::InvalidArgument(format!("unknown index {other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Leading components and range bounds for an index walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Components {
    pub e: Option<Value>,
    pub a: Option<Value>,
    pub v: Option<Value>,
    pub start: Option<Value>,
    pub end: Option<Value>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn e(mut self, e: impl Into<Value>) -> Self {
        self.e = Some(e.into());
        self
    }

    pub fn a(mut self, a: impl Into<Value>) -> Self {
        self.a = Some(a.into());
        self
    }

    pub fn v(mut self, v: impl Into<Value>) -> Self {
        self.v = Some(v.into());
        self
    }

    pub fn start(mut self, start: impl Into<Value>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<Value>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Set components as EDN-encoded query parameters, in `e a v start end` order.
    fn params(&self, codec: &EdnCodec) -> Vec<(String, String)> {
        [
            ("e", &self.e),
            ("a", &self.a),
            ("v", &self.v),
            ("start", &self.start),
            ("end", &self.end),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_ref()
                .map(|v| (name.to_owned(), codec.encode(v)))
        })
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Datom
// ---------------------------------------------------------------------------

/// One fact: entity, attribute, value, transaction, and whether it was
/// asserted or retracted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datom {
    pub e: i64,
    pub a: Value,
    pub v: Value,
    pub tx: i64,
    pub added: bool,
}

impl Datom {
    /// Decode `{:e .. :a .. :v .. :tx .. :added ..}` or `[e a v tx added]`.
    /// `added` defaults to `true` when absent.
    pub fn from_edn(value: &Value) -> Result<Self> {
        let (e, a, v, tx, added) = match value {
            Value::Map(_) => (
                value.get_keyword("e"),
                value.get_keyword("a"),
                value.get_keyword("v"),
                value.get_keyword("tx"),
                value.get_keyword("added"),
            ),
            Value::Vector(items) | Value::List(items) if items.len() >= 4 => {
                (items.first(), items.get(1), items.get(2), items.get(3), items.get(4))
            }
            other => return Err(DbError::Decode(format!("expected a datom, found {other}"))),
        };

        let missing = |field: &str| DbError::Decode(format!("datom is missing {field}: {value}"));

        Ok(Datom {
            e: e.and_then(Value::as_i64).ok_or_else(|| missing("e"))?,
            a: a.cloned().ok_or_else(|| missing("a"))?,
            v: v.cloned().ok_or_else(|| missing("v"))?,
            tx: tx.and_then(Value::as_i64).ok_or_else(|| missing("tx"))?,
            added: match added {
                None => true,
                Some(flag) => flag.as_bool().ok_or_else(|| missing("added"))?,
            },
        })
    }
}

/// Decode a collection of datoms.
pub(crate) fn decode_datoms(body: &Value) -> Result<Vec<Datom>> {
    match body {
        Value::Vector(items) | Value::List(items) => items.iter().map(Datom::from_edn).collect(),
        Value::Set(items) => items.iter().map(Datom::from_edn).collect(),
        other => Err(DbError::Decode(format!(
            "expected a collection of datoms, found {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// Walk `index` of `src`, narrowed by `components`.
pub fn datoms(src: impl Into<Target>, index: Index, components: Components) -> AsyncResult<Vec<Datom>> {
    AsyncResult::spawn(fetch_datoms(src.into(), index, components))
}

/// Datoms of `index` between `start` (inclusive) and `end` (exclusive).
/// `None` leaves that side open.
pub fn index_range(
    src: impl Into<Target>,
    index: Index,
    start: Option<Value>,
    end: Option<Value>,
) -> AsyncResult<Vec<Datom>> {
    let components = Components {
        start,
        end,
        ..Components::default()
    };
    datoms(src, index, components)
}

impl DatabaseValue {
    pub fn datoms(&self, index: Index, components: Components) -> AsyncResult<Vec<Datom>> {
        datoms(self, index, components)
    }

    pub fn index_range(
        &self,
        index: Index,
        start: Option<Value>,
        end: Option<Value>,
    ) -> AsyncResult<Vec<Datom>> {
        index_range(self, index, start, end)
    }
}

#[instrument(skip_all, fields(db_alias = %target.db_alias(), index = %index))]
async fn fetch_datoms(target: Target, index: Index, components: Components) -> Result<Vec<Datom>> {
    let client = target.connection().client().clone();

    let mut request = HttpRequest::get(target.connection().url(&target.datoms_endpoint()))
        .query_param("index", index.as_str());
    let params = components
        .params(client.codec())
        .into_iter()
        .chain(target.point_params())
        .chain(target.paging_params());
    for (name, value) in params {
        request = request.query_param(name, value);
    }

    let body = client.send_edn(request).await?;
    let datoms = decode_datoms(&body)?;
    debug!(count = datoms.len(), "Index walk returned");
    Ok(datoms)
}
