// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the EDN codec.
//!
//! Every fallible codec operation returns [`Result<T>`], an alias for
//! `std::result::Result<T, EdnError>`. Reader errors carry the character offset
//! at which parsing stopped.

use thiserror::Error;

/// Errors raised while reading, writing or registering EDN literals.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EdnError {
    /// Input ended in the middle of a form.
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    /// A character that cannot start or continue the current form.
    #[error("Unexpected {found:?} at offset {offset}")]
    Unexpected {
        /// Character offset into the input.
        offset: usize,
        /// The offending character.
        found: char,
    },

    /// A numeric token that is neither a valid integer nor a valid float.
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),

    /// A map literal with a key and no value.
    #[error("Map literal ending at offset {offset} has an odd number of forms ({forms})")]
    OddMap {
        /// Character offset of the closing `}`.
        offset: usize,
        /// Number of forms read inside the braces.
        forms: usize,
    },

    /// Collections or tagged literals nested deeper than the reader allows.
    #[error("Nesting deeper than {max} levels at offset {offset}")]
    TooDeep {
        /// Character offset where the limit was hit.
        offset: usize,
        /// The nesting limit.
        max: usize,
    },

    /// An unknown string or character escape.
    #[error("Invalid escape sequence: {0}")]
    InvalidEscape(String),

    /// A tagged literal whose representation has the wrong shape
    /// (e.g. `#db/id 5` instead of `#db/id[...]`).
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// An `#inst` payload that is not an RFC 3339 timestamp.
    #[error("Invalid #inst literal: {0}")]
    InvalidInstant(String),

    /// A `#uuid` payload that is not a canonical UUID string.
    #[error("Invalid #uuid literal: {0}")]
    InvalidUuid(String),

    /// The process-wide tag registry was already installed.
    #[error("Tag registry already installed for this process")]
    AlreadyInstalled,
}

/// Crate-level result alias using [`EdnError`].
pub type Result<T> = std::result::Result<T, EdnError>;
