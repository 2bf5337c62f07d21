// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! What an operation runs against.
//!
//! [`Target`] is the closed set {`Connection`, `DatabaseValue`}. A bare
//! connection behaves like its current, unfiltered database. Endpoint paths
//! and implicit parameters are derived here so every executor builds
//! requests the same way.

use datomic_edn::Value;

use crate::connection::Connection;
use crate::database::{DatabaseValue, Filters};

/// Path of the query endpoint.
pub const QUERY_ENDPOINT: &str = "/api/query";

static NO_FILTERS: Filters = Filters::NONE;

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Connection(Connection),
    Database(DatabaseValue),
}

impl Target {
    pub fn connection(&self) -> &Connection {
        match self {
            Target::Connection(conn) => conn,
            Target::Database(db) => db.connection(),
        }
    }

    pub fn filters(&self) -> &Filters {
        match self {
            Target::Connection(_) => &NO_FILTERS,
            Target::Database(db) => db.filters(),
        }
    }

    pub fn db_alias(&self) -> &str {
        self.connection().db_alias()
    }

    /// The implicit first query input: `{:db/alias "..."}` plus any
    /// `:as-of`, `:since` and `:history` set on the value.
    pub fn query_args(&self) -> Value {
        let filters = self.filters();
        let mut entries = vec![(
            Value::keyword("db/alias"),
            Value::string(self.db_alias()),
        )];
        if let Some(t) = &filters.as_of {
            entries.push((Value::keyword("as-of"), t.to_edn()));
        }
        if let Some(t) = &filters.since {
            entries.push((Value::keyword("since"), t.to_edn()));
        }
        if filters.history {
            entries.push((Value::keyword("history"), Value::Bool(true)));
        }
        Value::map(entries)
    }

    pub fn query_endpoint(&self) -> &'static str {
        QUERY_ENDPOINT
    }

    /// `/data/{alias}/-/entity`
    pub fn entity_endpoint(&self) -> String {
        format!("/data/{}/-/entity", self.db_alias())
    }

    /// `/data/{alias}/-/datoms`
    pub fn datoms_endpoint(&self) -> String {
        format!("/data/{}/-/datoms", self.db_alias())
    }

    /// `/data/{alias}/{as-of or -}/`
    pub fn basis_endpoint(&self) -> String {
        let point = self
            .filters()
            .as_of
            .as_ref()
            .map(|t| t.to_param())
            .unwrap_or_else(|| "-".to_owned());
        format!("/data/{}/{}/", self.db_alias(), point)
    }

    /// `/data/{alias}/`
    pub fn transact_endpoint(&self) -> String {
        format!("/data/{}/", self.db_alias())
    }

    /// `as-of` and `since` query parameters, when set.
    pub(crate) fn point_params(&self) -> Vec<(String, String)> {
        let filters = self.filters();
        let mut params = Vec::new();
        if let Some(t) = &filters.as_of {
            params.push(("as-of".to_owned(), t.to_param()));
        }
        if let Some(t) = &filters.since {
            params.push(("since".to_owned(), t.to_param()));
        }
        params
    }

    /// `history`, `limit` and `offset` query parameters, when set.
    pub(crate) fn paging_params(&self) -> Vec<(String, String)> {
        let filters = self.filters();
        let mut params = Vec::new();
        if filters.history {
            params.push(("history".to_owned(), "true".to_owned()));
        }
        if let Some(n) = filters.limit {
            params.push(("limit".to_owned(), n.to_string()));
        }
        if let Some(n) = filters.offset {
            params.push(("offset".to_owned(), n.to_string()));
        }
        params
    }
}

impl From<Connection> for Target {
    fn from(conn: Connection) -> Self {
        Target::Connection(conn)
    }
}

impl From<&Connection> for Target {
    fn from(conn: &Connection) -> Self {
        Target::Connection(conn.clone())
    }
}

impl From<DatabaseValue> for Target {
    fn from(db: DatabaseValue) -> Self {
        Target::Database(db)
    }
}

impl From<&DatabaseValue> for Target {
    fn from(db: &DatabaseValue) -> Self {
        Target::Database(db.clone())
    }
}
