// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Transactions.
//!
//! `POST /data/{alias}/` with form field `tx-data`. Transaction data is
//! either EDN text, sent byte-for-byte, or a list of operations serialized
//! by the writer. The service alone decides atomicity; there is no retry.

use std::collections::BTreeMap;

use datomic_edn::{EdnCodec, TaggedValue, Value};
use serde::Serialize;
use tracing::{info, instrument};

use crate::async_result::AsyncResult;
use crate::connection::Connection;
use crate::datoms::decode_datoms;
use crate::datoms::Datom;
use crate::error::{DbError, Result};
use crate::target::Target;
use crate::transport::HttpRequest;

// ---------------------------------------------------------------------------
// Tempids
// ---------------------------------------------------------------------------

/// A fresh temporary id in `partition`: `#db/id[:db.part/user]`.
pub fn tempid(partition: &str) -> Value {
    Value::Tagged(TaggedValue::db_id(Value::vector([Value::keyword(partition)])))
}

/// Temporary id `n` in `partition`: `#db/id[:db.part/user -1]`. The same
/// `n` refers to the same new entity within one transaction.
pub fn tempid_n(partition: &str, n: i64) -> Value {
    Value::Tagged(TaggedValue::db_id(Value::vector([
        Value::keyword(partition),
        Value::Integer(n),
    ])))
}

// ---------------------------------------------------------------------------
// TxData
// ---------------------------------------------------------------------------

/// Transaction data.
#[derive(Debug, Clone, PartialEq)]
pub enum TxData {
    /// EDN text, sent verbatim.
    Raw(String),
    /// Operations: maps, or vectors starting with an operation keyword
    /// (`[:db/add e a v]`, `[:db/retract e a v]`, `[:db.fn/retractEntity e]`).
    Ops(Vec<Value>),
}

impl TxData {
    /// The `tx-data` form value.
    pub fn to_wire(&self, codec: &EdnCodec) -> Result<String> {
        match self {
            TxData::Raw(text) => Ok(text.clone()),
            TxData::Ops(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    validate_op(i, op)?;
                }
                Ok(codec.encode(&Value::Vector(ops.clone())))
            }
        }
    }
}

fn validate_op(index: usize, op: &Value) -> Result<()> {
    match op {
        Value::Map(_) => Ok(()),
        Value::Vector(items) | Value::List(items)
            if matches!(items.first(), Some(Value::Keyword(_))) =>
        {
            Ok(())
        }
        other => Err(DbError::InvalidArgument(format!(
            "transaction operation {index} must be a map or start with an operation keyword, found {other}"
        ))),
    }
}

impl From<&str> for TxData {
    fn from(text: &str) -> Self {
        TxData::Raw(text.to_owned())
    }
}

impl From<String> for TxData {
    fn from(text: String) -> Self {
        TxData::Raw(text)
    }
}

impl From<Vec<Value>> for TxData {
    fn from(ops: Vec<Value>) -> Self {
        TxData::Ops(ops)
    }
}

// ---------------------------------------------------------------------------
// TxReport
// ---------------------------------------------------------------------------

/// Outcome of a transaction.
///
/// Only the facts written and the tempid resolutions are reported. Database
/// values before and after the transaction are not exposed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TxReport {
    /// Datoms asserted or retracted by the transaction.
    pub tx_data: Vec<Datom>,
    /// Temporary id (as sent or as the service names it) to permanent id.
    pub tempids: BTreeMap<Value, i64>,
}

impl TxReport {
    pub fn from_edn(body: &Value) -> Result<Self> {
        if body.as_map().is_none() {
            return Err(DbError::Decode(format!(
                "expected a transaction report map, found {body}"
            )));
        }

        let tx_data = match body.get_keyword("tx-data") {
            Some(datoms) => decode_datoms(datoms)?,
            None => Vec::new(),
        };

        let mut tempids = BTreeMap::new();
        if let Some(table) = body.get_keyword("tempids") {
            let table = table.as_map().ok_or_else(|| {
                DbError::Decode(format!("expected :tempids to be a map, found {table}"))
            })?;
            for (temp, resolved) in table {
                let id = resolved.as_i64().ok_or_else(|| {
                    DbError::Decode(format!("tempid {temp} resolved to non-integer {resolved}"))
                })?;
                tempids.insert(temp.clone(), id);
            }
        }

        Ok(TxReport { tx_data, tempids })
    }

    /// Permanent id assigned to `tempid`.
    pub fn resolve_tempid(&self, tempid: &Value) -> Option<i64> {
        self.tempids.get(tempid).copied()
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Submit `tx_data` to the database behind `conn`.
pub fn transact(conn: &Connection, tx_data: impl Into<TxData>) -> AsyncResult<TxReport> {
    AsyncResult::spawn(submit(conn.clone(), tx_data.into()))
}

impl Connection {
    /// Submit `tx_data` to this database.
    pub fn transact(&self, tx_data: impl Into<TxData>) -> AsyncResult<TxReport> {
        transact(self, tx_data)
    }
}

#[instrument(skip_all, fields(db_alias = %conn.db_alias()))]
async fn submit(conn: Connection, tx_data: TxData) -> Result<TxReport> {
    let client = conn.client().clone();
    let wire = tx_data.to_wire(client.codec())?;

    let target = Target::from(&conn);
    let request = HttpRequest::post(conn.url(&target.transact_endpoint())).form_field("tx-data", wire);

    let body = client.send_edn(request).await?;
    let report = TxReport::from_edn(&body)?;
    info!(datoms = report.tx_data.len(), tempids = report.tempids.len(), "Transaction committed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datomic_edn::from_str;

    fn add_op() -> Value {
        Value::vector([
            Value::keyword("db/add"),
            Value::Integer(1),
            Value::keyword("name"),
            Value::string("x"),
        ])
    }

    #[test]
    fn test_raw_and_structured_produce_same_wire_text() {
        let codec = EdnCodec::default();
        let raw = TxData::from("[[:db/add 1 :name \"x\"]]");
        let ops = TxData::from(vec![add_op()]);
        assert_eq!(raw.to_wire(&codec).unwrap(), ops.to_wire(&codec).unwrap());
    }

    #[test]
    fn test_raw_text_is_not_reserialized() {
        let codec = EdnCodec::default();
        let text = "[ [:db/add 1 :name \"x\"] ,\n ]";
        assert_eq!(TxData::from(text).to_wire(&codec).unwrap(), text);
    }

    #[test]
    fn test_invalid_ops_are_rejected() {
        let codec = EdnCodec::default();
        let err = TxData::from(vec![add_op(), Value::Integer(3)])
            .to_wire(&codec)
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(msg) if msg.contains("operation 1")));

        let map_op = Value::map([(Value::keyword("db/id"), tempid("db.part/user"))]);
        assert!(TxData::from(vec![map_op]).to_wire(&codec).is_ok());
    }

    #[test]
    fn test_tempid_literals() {
        assert_eq!(tempid("db.part/user").to_string(), "#db/id[:db.part/user]");
        assert_eq!(tempid_n("db.part/user", -1).to_string(), "#db/id[:db.part/user -1]");
    }

    #[test]
    fn test_tx_report_decoding() {
        let body = from_str(
            r#"{:db-before {:basis-t 1000}
                :db-after {:basis-t 1001}
                :tx-data [{:e 13194139534313 :a 50 :v #inst "2024-01-02T03:04:05.000Z" :tx 13194139534313 :added true}
                          {:e 17592186045418 :a 63 :v "x" :tx 13194139534313 :added true}]
                :tempids {-9223350046623220288 17592186045418}}"#,
        )
        .unwrap();

        let report = TxReport::from_edn(&body).unwrap();
        assert_eq!(report.tx_data.len(), 2);
        assert_eq!(report.tx_data[1].v, Value::string("x"));
        assert_eq!(
            report.resolve_tempid(&Value::Integer(-9223350046623220288)),
            Some(17592186045418)
        );
    }

    #[test]
    fn test_tx_report_rejects_bad_shapes() {
        assert!(matches!(
            TxReport::from_edn(&Value::Integer(1)),
            Err(DbError::Decode(_))
        ));
        assert!(matches!(
            TxReport::from_edn(&from_str("{:tempids [1 2]}").unwrap()),
            Err(DbError::Decode(_))
        ));
    }
}
