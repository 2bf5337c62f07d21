// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Single-value result channel.
//!
//! Every asynchronous operation returns an [`AsyncResult`]. The producer side,
//! [`Deliver`], is consumed by [`Deliver::deliver`], so a result can be written
//! at most once. Any number of clones of the [`AsyncResult`] may wait on it and
//! all of them observe the same outcome.
//!
//! There is no cancellation: dropping every [`AsyncResult`] does not abort the
//! request that is already in flight.

use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::warn;

use crate::error::{DbError, Result};

type Slot<T> = Option<Result<T>>;

/// Create a connected producer/consumer pair.
pub fn channel<T>() -> (Deliver<T>, AsyncResult<T>) {
    let (tx, rx) = watch::channel(None);
    (Deliver { tx }, AsyncResult { rx })
}

/// Write side of an [`AsyncResult`].
#[derive(Debug)]
pub struct Deliver<T> {
    tx: watch::Sender<Slot<T>>,
}

impl<T> Deliver<T> {
    /// Publish the outcome. Consumers that already gave up are ignored.
    pub fn deliver(self, outcome: Result<T>) {
        self.tx.send_replace(Some(outcome));
    }
}

/// Read side: a cloneable handle on a value that arrives once.
#[derive(Debug, Clone)]
pub struct AsyncResult<T> {
    rx: watch::Receiver<Slot<T>>,
}

impl<T> AsyncResult<T> {
    /// A result that is already resolved.
    pub fn ready(outcome: Result<T>) -> Self {
        let (tx, rx) = watch::channel(Some(outcome));
        drop(tx);
        Self { rx }
    }

    /// Whether the outcome has been delivered.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

impl<T: Clone> AsyncResult<T> {
    /// The outcome if already delivered, without waiting.
    pub fn try_get(&self) -> Option<Result<T>> {
        self.rx.borrow().clone()
    }

    /// Wait for the outcome.
    ///
    /// Resolves to [`DbError::Abandoned`] if the producer was dropped without
    /// delivering.
    pub async fn wait(&self) -> Result<T> {
        let mut rx = self.rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or(Err(DbError::Abandoned))
    }
}

impl<T: Clone + Send + Sync + 'static> AsyncResult<T> {
    /// Run `operation` on the ambient tokio runtime and deliver its outcome.
    ///
    /// Outside a runtime the operation is dropped unrun and the result is
    /// already resolved to [`DbError::NoRuntime`].
    pub fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("Operation started outside a tokio runtime");
            return Self::ready(Err(DbError::NoRuntime));
        };

        let (deliver, result) = channel();
        runtime.spawn(async move {
            deliver.deliver(operation.await);
        });
        result
    }
}

impl<T: Clone + Send + Sync + 'static> IntoFuture for AsyncResult<T> {
    type Output = Result<T>;
    type IntoFuture = BoxFuture<'static, Result<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}
