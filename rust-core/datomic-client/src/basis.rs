// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Basis resolution: the most recent transaction visible through a
//! database value.
//!
//! Two states:
//! - **Cached**: the value carries an `as-of` point, which is returned
//!   immediately with no I/O.
//! - **Remote**: one `GET /data/{alias}/-/` and the `:basis-t` of the body.
//!
//! Nothing is cached between calls.

use datomic_edn::Value;
use tracing::{debug, instrument};

use crate::async_result::AsyncResult;
use crate::connection::Connection;
use crate::database::{DatabaseValue, TxPoint};
use crate::error::{DbError, Result};
use crate::target::Target;
use crate::transport::HttpRequest;

/// How a basis request will be answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Basis {
    Cached(TxPoint),
    Remote,
}

impl Basis {
    pub fn of(target: &Target) -> Self {
        match &target.filters().as_of {
            Some(t) => Basis::Cached(t.clone()),
            None => Basis::Remote,
        }
    }
}

/// Resolve the basis of `src`.
pub fn basis_t(src: impl Into<Target>) -> AsyncResult<TxPoint> {
    let target = src.into();
    match Basis::of(&target) {
        Basis::Cached(t) => {
            debug!(db_alias = %target.db_alias(), basis = %t, "Basis answered from as-of point");
            AsyncResult::ready(Ok(t))
        }
        Basis::Remote => AsyncResult::spawn(resolve_remote(target)),
    }
}

impl DatabaseValue {
    /// The as-of point if set, otherwise the service's current `basis-t`.
    pub fn basis_t(&self) -> AsyncResult<TxPoint> {
        basis_t(self)
    }
}

impl Connection {
    /// The service's current `basis-t` for this database.
    pub fn basis_t(&self) -> AsyncResult<TxPoint> {
        basis_t(self)
    }
}

#[instrument(skip_all, fields(db_alias = %target.db_alias()))]
async fn resolve_remote(target: Target) -> Result<TxPoint> {
    let client = target.connection().client().clone();
    let request = HttpRequest::get(target.connection().url(&target.basis_endpoint()));

    let body = client.send_edn(request).await?;
    extract_basis(&body)
}

fn extract_basis(body: &Value) -> Result<TxPoint> {
    body.get_keyword("basis-t")
        .and_then(Value::as_i64)
        .map(TxPoint::T)
        .ok_or_else(|| DbError::Decode(format!("response has no integer :basis-t: {body}")))
}
