// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # datomic-edn
//!
//! The wire codec used by `datomic-client`: an EDN value model, a reader, a
//! canonical writer, query-string encoding and the tagged-literal registry.
//!
//! ```rust
//! use datomic_edn::{from_str, Value};
//!
//! let v = from_str("#db/id[1000 5]").unwrap();
//! assert_eq!(v.to_string(), "#db/id[1000 5]");
//! assert!(matches!(v, Value::Tagged(_)));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value` and `TaggedValue`.
//! - [`reader`]: EDN text to `Value`.
//! - [`writer`]: `Value` to canonical EDN text.
//! - [`registry`]: tag parsers and the process-wide registry.
//! - [`codec`]: `EdnCodec`, the explicit codec configuration object.
//! - [`error`]: `EdnError` and the crate-level `Result` alias.

pub mod codec;
pub mod error;
pub mod reader;
pub mod registry;
pub mod value;
pub mod writer;

pub use codec::{encode_query_params, EdnCodec};
pub use error::{EdnError, Result};
pub use reader::{from_str, from_str_with, MAX_DEPTH};
pub use registry::{global, install_global, TagParser, TagRegistry};
pub use value::{TaggedValue, Value, DB_ID_TAG};
pub use writer::to_string;
