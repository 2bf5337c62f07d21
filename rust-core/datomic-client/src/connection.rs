// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Connections and database creation.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::async_result::AsyncResult;
use crate::client::{status_error, ClientInner, DatomicClient};
use crate::database::DatabaseValue;
use crate::error::Result;
use crate::transport::HttpRequest;

/// Immutable handle on one remote database (`alias/db-name`).
///
/// Equality and `Debug` consider the host, port and alias only.
#[derive(Clone)]
pub struct Connection {
    hostname: String,
    port: u16,
    db_alias: String,
    client: Arc<ClientInner>,
}

impl Connection {
    pub(crate) fn new(
        client: Arc<ClientInner>,
        hostname: &str,
        port: u16,
        alias: &str,
        db_name: &str,
    ) -> Self {
        Self {
            hostname: hostname.to_owned(),
            port,
            db_alias: format!("{alias}/{db_name}"),
            client,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `storage-alias/db-name`, e.g. `free/test`.
    pub fn db_alias(&self) -> &str {
        &self.db_alias
    }

    /// `http://{hostname}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }

    /// Absolute URL for `path` on this connection's peer.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub(crate) fn client(&self) -> &Arc<ClientInner> {
        &self.client
    }

    /// The current database, with no filters.
    pub fn db(&self) -> DatabaseValue {
        DatabaseValue::new(self.clone())
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.hostname == other.hostname && self.port == other.port && self.db_alias == other.db_alias
    }
}

impl Eq for Connection {}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("db_alias", &self.db_alias)
            .finish()
    }
}

impl DatomicClient {
    /// Create `db_name` under storage `alias` and connect to it.
    ///
    /// Issues one `POST /data/{alias}/` with form field `db-name`. HTTP 200
    /// and 201 resolve to a [`Connection`]; any other status resolves to
    /// [`DbError::HttpStatus`]. There is no retry.
    ///
    /// [`DbError::HttpStatus`]: crate::error::DbError::HttpStatus
    pub fn create_database(
        &self,
        hostname: &str,
        port: u16,
        alias: &str,
        db_name: &str,
    ) -> AsyncResult<Connection> {
        let conn = self.connect(hostname, port, alias, db_name);
        let alias = alias.to_owned();
        let db_name = db_name.to_owned();
        AsyncResult::spawn(create_database(conn, alias, db_name))
    }
}

#[instrument(skip(conn), fields(host = %conn.hostname(), port = conn.port()))]
async fn create_database(conn: Connection, alias: String, db_name: String) -> Result<Connection> {
    let url = conn.url(&format!("/data/{alias}/"));
    let request = HttpRequest::post(url.clone()).form_field("db-name", db_name);
    let response = conn.client().send(request).await?;

    match response.status {
        200 | 201 => {
            info!(db_alias = %conn.db_alias(), "Database ready");
            Ok(conn)
        }
        _ => Err(status_error(&url, response)),
    }
}
