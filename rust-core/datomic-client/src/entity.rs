// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Entity lookup.

use std::collections::BTreeMap;

use datomic_edn::Value;
use tracing::instrument;

use crate::async_result::AsyncResult;
use crate::database::DatabaseValue;
use crate::error::{DbError, Result};
use crate::target::Target;
use crate::transport::HttpRequest;

/// The attribute map of one entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    attributes: BTreeMap<Value, Value>,
}

impl Entity {
    /// Value of attribute `attr` (`"person/name"` or `":person/name"`).
    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attributes.get(&Value::keyword(attr))
    }

    /// The `:db/id` attribute, when the service includes it.
    pub fn id(&self) -> Option<i64> {
        self.get("db/id").and_then(Value::as_i64)
    }

    pub fn attributes(&self) -> &BTreeMap<Value, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> BTreeMap<Value, Value> {
        self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl TryFrom<Value> for Entity {
    type Error = DbError;

    fn try_from(body: Value) -> Result<Self> {
        match body {
            Value::Map(attributes) => Ok(Entity { attributes }),
            other => Err(DbError::Decode(format!(
                "expected an entity attribute map, found {other}"
            ))),
        }
    }
}

/// Fetch the attributes of `entity_id` as seen by `src`.
pub fn entity(src: impl Into<Target>, entity_id: impl Into<Value>) -> AsyncResult<Entity> {
    AsyncResult::spawn(fetch_entity(src.into(), entity_id.into()))
}

impl DatabaseValue {
    /// Fetch the attributes of `entity_id` in this database value.
    pub fn entity(&self, entity_id: impl Into<Value>) -> AsyncResult<Entity> {
        entity(self, entity_id)
    }
}

#[instrument(skip_all, fields(db_alias = %target.db_alias(), e = %entity_id))]
async fn fetch_entity(target: Target, entity_id: Value) -> Result<Entity> {
    let client = target.connection().client().clone();

    let mut request = HttpRequest::get(target.connection().url(&target.entity_endpoint()))
        .query_param("e", client.codec().encode(&entity_id));
    for (name, value) in target.point_params() {
        request = request.query_param(name, value);
    }

    let body = client.send_edn(request).await?;
    Entity::try_from(body)
}
