// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Datalog query execution.
//!
//! A query is sent as `GET /api/query` with the query form in `q` and the
//! input list in `args`. The first input is always the implicit database
//! argument (see [`Target::query_args`]); caller inputs follow it.

use datomic_edn::{EdnCodec, Value};
use tracing::{debug, instrument};

use crate::async_result::AsyncResult;
use crate::database::DatabaseValue;
use crate::error::{DbError, Result};
use crate::target::Target;
use crate::transport::HttpRequest;

/// Rows of a query result, in the order the service returned them.
pub type QueryResult = Vec<Vec<Value>>;

/// A query, either as EDN text (sent verbatim) or as a form.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryForm {
    Text(String),
    Form(Value),
}

impl QueryForm {
    fn into_text(self, codec: &EdnCodec) -> String {
        match self {
            QueryForm::Text(text) => text,
            QueryForm::Form(form) => codec.encode(&form),
        }
    }
}

impl From<&str> for QueryForm {
    fn from(text: &str) -> Self {
        QueryForm::Text(text.to_owned())
    }
}

impl From<String> for QueryForm {
    fn from(text: String) -> Self {
        QueryForm::Text(text)
    }
}

impl From<Value> for QueryForm {
    fn from(form: Value) -> Self {
        QueryForm::Form(form)
    }
}

/// Run `query` against `src` with extra `inputs`.
pub fn q(
    query: impl Into<QueryForm>,
    src: impl Into<Target>,
    inputs: Vec<Value>,
) -> AsyncResult<QueryResult> {
    AsyncResult::spawn(execute_query(src.into(), query.into(), inputs))
}

impl DatabaseValue {
    /// Run `query` against this database value with extra `inputs`.
    pub fn q(&self, query: impl Into<QueryForm>, inputs: Vec<Value>) -> AsyncResult<QueryResult> {
        q(query, self, inputs)
    }
}

#[instrument(skip_all, fields(db_alias = %target.db_alias(), inputs = inputs.len()))]
async fn execute_query(target: Target, query: QueryForm, inputs: Vec<Value>) -> Result<QueryResult> {
    let client = target.connection().client().clone();
    let codec = client.codec();

    let mut args = Vec::with_capacity(inputs.len() + 1);
    args.push(target.query_args());
    args.extend(inputs);

    let mut request = HttpRequest::get(target.connection().url(target.query_endpoint()))
        .query_param("q", query.into_text(codec))
        .query_param("args", codec.encode(&Value::Vector(args)));
    for (name, value) in target.paging_params() {
        request = request.query_param(name, value);
    }

    let body = client.send_edn(request).await?;
    let rows = decode_rows(body)?;
    debug!(rows = rows.len(), "Query returned");
    Ok(rows)
}

/// Accept a vector, list or set of tuples.
fn decode_rows(body: Value) -> Result<QueryResult> {
    let rows: Vec<Value> = match body {
        Value::Vector(items) | Value::List(items) => items,
        Value::Set(items) => items.into_iter().collect(),
        other => {
            return Err(DbError::Decode(format!(
                "expected a collection of result tuples, found {other}"
            )))
        }
    };

    rows.into_iter()
        .map(|row| match row {
            Value::Vector(cols) | Value::List(cols) => Ok(cols),
            other => Err(DbError::Decode(format!(
                "expected a result tuple, found {other}"
            ))),
        })
        .collect()
}
