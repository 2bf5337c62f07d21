// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client handle and shared request helpers.
//!
//! [`DatomicClient`] owns the transport and the EDN codec. Connections and
//! database values created from it share these through an `Arc`, so they
//! can be cloned and sent across tasks freely. Operation-specific methods
//! live in their own modules (`query`, `entity`, `datoms`, `transact`,
//! `basis`).

use std::fmt;
use std::sync::Arc;

use datomic_edn::{EdnCodec, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{DbError, Result};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Media type requested on every call.
pub const EDN_MEDIA_TYPE: &str = "application/edn";

/// Error bodies longer than this are cut in [`DbError::HttpStatus`] messages.
const MAX_ERROR_BODY: usize = 512;

// ---------------------------------------------------------------------------
// Shared internals
// ---------------------------------------------------------------------------

pub(crate) struct ClientInner {
    transport: Arc<dyn Transport>,
    codec: EdnCodec,
}

impl ClientInner {
    pub(crate) fn codec(&self) -> &EdnCodec {
        &self.codec
    }

    /// Send `request` with the EDN `Accept` header.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.header("Accept", EDN_MEDIA_TYPE);
        debug!(method = ?request.method, url = %request.url, "Sending request");

        match self.transport.send(request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(error = %e, "Transport failure");
                Err(e.into())
            }
        }
    }

    /// Send `request` and decode a successful body as EDN.
    pub(crate) async fn send_edn(&self, request: HttpRequest) -> Result<Value> {
        let url = request.url.clone();
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&url, response));
        }
        self.codec.decode(&response.body).map_err(|e| {
            warn!(url = %url, error = %e, "Response body is not valid EDN");
            DbError::from(e)
        })
    }
}

/// Turn a non-2xx response into [`DbError::HttpStatus`].
pub(crate) fn status_error(url: &str, response: HttpResponse) -> DbError {
    let status = response.status;
    warn!(url = %url, status, "Request rejected");

    let body = response.body.trim();
    let message = if body.is_empty() {
        format!("HTTP {status}")
    } else if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_owned()
    };

    DbError::HttpStatus { status, message }
}

// ---------------------------------------------------------------------------
// DatomicClient
// ---------------------------------------------------------------------------

/// Entry point: builds connections to databases served by a REST peer.
///
/// # Examples
///
/// ```rust,no_run
/// use datomic_client::DatomicClient;
///
/// # #[tokio::main]
/// # async fn main() -> datomic_client::Result<()> {
/// let client = DatomicClient::new()?;
/// let conn = client.connect("localhost", 8888, "free", "test");
/// let rows = conn.db().q("[:find ?e :where [?e :db/ident :db/doc]]", vec![]).await?;
/// println!("{rows:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DatomicClient {
    inner: Arc<ClientInner>,
}

impl DatomicClient {
    /// Client over reqwest, configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Transport`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Client over a custom transport, using the process-wide tag registry.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::with_parts(transport, EdnCodec::new())
    }

    /// Client over a custom transport and an explicit codec.
    pub fn with_parts(transport: Arc<dyn Transport>, codec: EdnCodec) -> Self {
        Self {
            inner: Arc::new(ClientInner { transport, codec }),
        }
    }

    pub fn codec(&self) -> &EdnCodec {
        self.inner.codec()
    }

    /// Handle on `alias/db_name` at `hostname:port`. No I/O.
    pub fn connect(&self, hostname: &str, port: u16, alias: &str, db_name: &str) -> Connection {
        Connection::new(Arc::clone(&self.inner), hostname, port, alias, db_name)
    }
}

impl fmt::Debug for DatomicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatomicClient")
            .field("codec", self.inner.codec())
            .finish_non_exhaustive()
    }
}
