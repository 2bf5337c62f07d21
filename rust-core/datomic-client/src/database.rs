// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Database values.
//!
//! A [`DatabaseValue`] names a snapshot of a remote database: a
//! [`Connection`] plus the filters `as-of`, `since`, `history`, `limit` and
//! `offset`. Filter methods take `&self` and return a new value; the receiver
//! never changes. Setting a filter twice keeps the last value for that filter
//! and leaves every other filter as it was.
//!
//! ```rust,no_run
//! # use datomic_client::{DatomicClient, TxPoint};
//! # let client = DatomicClient::new().unwrap();
//! let db = client.connect("localhost", 8888, "free", "test").db();
//! let then = db.as_of(1000);
//! assert_eq!(db.as_of_t(), None);
//! assert_eq!(then.as_of_t(), Some(&TxPoint::T(1000)));
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use datomic_edn::Value;
use serde::Serialize;

use crate::connection::Connection;

// ---------------------------------------------------------------------------
// TxPoint
// ---------------------------------------------------------------------------

/// A point in database time, passed to the service verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxPoint {
    /// Basis t (transaction number).
    T(i64),
    /// Transaction entity id.
    Tx(i64),
    /// Wall-clock instant.
    Instant(DateTime<Utc>),
}

impl TxPoint {
    /// EDN form, used inside query argument maps.
    pub fn to_edn(&self) -> Value {
        match self {
            TxPoint::T(t) | TxPoint::Tx(t) => Value::Integer(*t),
            TxPoint::Instant(at) => Value::Inst(*at),
        }
    }

    /// Plain text form, used in query strings and URL paths.
    pub fn to_param(&self) -> String {
        match self {
            TxPoint::T(t) | TxPoint::Tx(t) => t.to_string(),
            TxPoint::Instant(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl fmt::Display for TxPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_param())
    }
}

impl From<i64> for TxPoint {
    fn from(t: i64) -> Self {
        TxPoint::T(t)
    }
}

impl From<i32> for TxPoint {
    fn from(t: i32) -> Self {
        TxPoint::T(i64::from(t))
    }
}

impl From<DateTime<Utc>> for TxPoint {
    fn from(at: DateTime<Utc>) -> Self {
        TxPoint::Instant(at)
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// The implicit arguments carried by a database value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Filters {
    pub as_of: Option<TxPoint>,
    pub since: Option<TxPoint>,
    pub history: bool,
    /// Only applies to raw index access and query paging.
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Filters {
    pub const NONE: Filters = Filters {
        as_of: None,
        since: None,
        history: false,
        limit: None,
        offset: None,
    };
}

// ---------------------------------------------------------------------------
// DatabaseValue
// ---------------------------------------------------------------------------

/// An immutable, filterable snapshot descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseValue {
    connection: Connection,
    filters: Filters,
}

impl DatabaseValue {
    pub(crate) fn new(connection: Connection) -> Self {
        Self {
            connection,
            filters: Filters::default(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn db_alias(&self) -> &str {
        self.connection.db_alias()
    }

    fn with(&self, update: impl FnOnce(&mut Filters)) -> Self {
        let mut next = self.clone();
        update(&mut next.filters);
        next
    }

    /// The database as of `t`, inclusive.
    pub fn as_of(&self, t: impl Into<TxPoint>) -> Self {
        let t = t.into();
        self.with(|f| f.as_of = Some(t))
    }

    /// Only facts added after `t`, exclusive.
    pub fn since(&self, t: impl Into<TxPoint>) -> Self {
        let t = t.into();
        self.with(|f| f.since = Some(t))
    }

    /// All assertions and retractions. There is no way back.
    pub fn history(&self) -> Self {
        self.with(|f| f.history = true)
    }

    pub fn limit(&self, n: u64) -> Self {
        self.with(|f| f.limit = Some(n))
    }

    pub fn offset(&self, n: u64) -> Self {
        self.with(|f| f.offset = Some(n))
    }

    pub fn as_of_t(&self) -> Option<&TxPoint> {
        self.filters.as_of.as_ref()
    }

    pub fn since_t(&self) -> Option<&TxPoint> {
        self.filters.since.as_ref()
    }

    pub fn is_history(&self) -> bool {
        self.filters.history
    }
}
