// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Datomic REST client.
//!
//! Every asynchronous operation in this crate resolves to a [`Result<T>`],
//! an alias for `std::result::Result<T, DbError>`. Errors are never returned
//! synchronously; they travel through the same [`AsyncResult`] as successes.
//!
//! [`DbError`] is `Clone` because every reader of an [`AsyncResult`] observes
//! the same outcome.
//!
//! [`AsyncResult`]: crate::async_result::AsyncResult

use datomic_edn::EdnError;
use thiserror::Error;

use crate::transport::TransportError;

/// Error type for Datomic client operations.
///
/// The variants keep "could not reach the service", "the service rejected
/// the request" and "the response was unparsable" apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// The request never produced an HTTP response (connection refused, DNS
    /// failure, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Description from the transport layer.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("HTTP error ({status}): {message}")]
    HttpStatus {
        /// HTTP status code (e.g. 400, 404, 500).
        status: u16,
        /// Response body, or `HTTP <status>` when the body was empty.
        message: String,
    },

    /// The response body is not the expected EDN value.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A tagged literal had the wrong representation (e.g. `#db/id 5`).
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// Client-side validation failed before the request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation was started outside a tokio runtime, so it never ran.
    #[error("No tokio runtime is available to run the operation")]
    NoRuntime,

    /// The producing task went away without delivering a result.
    #[error("Operation abandoned before delivering a result")]
    Abandoned,
}

impl DbError {
    /// HTTP status, if the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DbError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DbError::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, DbError::Decode(_) | DbError::MalformedLiteral(_))
    }
}

impl From<EdnError> for DbError {
    fn from(err: EdnError) -> Self {
        match err {
            EdnError::MalformedLiteral(msg) => DbError::MalformedLiteral(msg),
            other => DbError::Decode(other.to_string()),
        }
    }
}

impl From<TransportError> for DbError {
    fn from(err: TransportError) -> Self {
        DbError::Transport {
            message: err.to_string(),
        }
    }
}

/// Crate-level result alias using [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
