// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Datomic REST Client
//!
//! Database-as-value access to a Datomic REST peer. A [`Connection`] names a
//! remote database; [`Connection::db`] gives an immutable [`DatabaseValue`]
//! that can be narrowed with `as_of`, `since`, `history`, `limit` and
//! `offset` and then queried. Every operation returns an [`AsyncResult`]
//! which resolves exactly once, to a value or to a [`DbError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datomic_client::{DatomicClient, Value};
//!
//! #[tokio::main]
//! async fn main() -> datomic_client::Result<()> {
//!     let client = DatomicClient::new()?;
//!     let conn = client.create_database("localhost", 8888, "free", "test").await?;
//!
//!     conn.transact(r#"[[:db/add #db/id[:db.part/user] :db/doc "hello"]]"#).await?;
//!
//!     let db = conn.db();
//!     let rows = db
//!         .q("[:find ?e :in $ ?doc :where [?e :db/doc ?doc]]", vec![Value::from("hello")])
//!         .await?;
//!     println!("{rows:?} at basis {}", db.basis_t().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: `DatomicClient`, transport and codec ownership.
//! - [`connection`]: `Connection` and database creation.
//! - [`database`]: `DatabaseValue`, filters and `TxPoint`.
//! - [`target`]: the closed {connection, database} dispatch and endpoints.
//! - [`async_result`]: the single-value result channel.
//! - [`query`]: Datalog queries.
//! - [`entity`]: entity lookup.
//! - [`datoms`]: raw index access and index ranges.
//! - [`transact`]: transactions, tempids and reports.
//! - [`basis`]: basis resolution.
//! - [`transport`]: the HTTP seam and the reqwest implementation.
//! - [`config`]: transport configuration.
//! - [`error`]: `DbError` and the crate-level `Result` alias.

pub mod async_result;
pub mod basis;
pub mod client;
pub mod config;
pub mod connection;
pub mod database;
pub mod datoms;
pub mod entity;
pub mod error;
pub mod query;
pub mod target;
pub mod transact;
pub mod transport;

pub use datomic_edn as edn;
pub use datomic_edn::{TaggedValue, Value};

pub use async_result::AsyncResult;
pub use basis::basis_t;
pub use client::DatomicClient;
pub use config::ClientConfig;
pub use connection::Connection;
pub use database::{DatabaseValue, Filters, TxPoint};
pub use datoms::{datoms, index_range, Components, Datom, Index};
pub use entity::{entity, Entity};
pub use error::{DbError, Result};
pub use query::{q, QueryForm, QueryResult};
pub use target::Target;
pub use transact::{tempid, tempid_n, transact, TxData, TxReport};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
