// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for database value filters

use std::sync::Arc;

use async_trait::async_trait;
use datomic_client::{
    DatabaseValue, DatomicClient, HttpRequest, HttpResponse, Target, Transport, TransportError,
    TxPoint,
};
use proptest::prelude::*;

struct NoNetwork;

#[async_trait]
impl Transport for NoNetwork {
    async fn send(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("offline"))
    }
}

fn db() -> DatabaseValue {
    DatomicClient::with_transport(Arc::new(NoNetwork))
        .connect("localhost", 8888, "free", "test")
        .db()
}

#[derive(Debug, Clone)]
enum Filter {
    AsOf(i64),
    Since(i64),
    History,
    Limit(u64),
    Offset(u64),
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    prop_oneof![
        any::<i64>().prop_map(Filter::AsOf),
        any::<i64>().prop_map(Filter::Since),
        Just(Filter::History),
        (0u64..10_000).prop_map(Filter::Limit),
        (0u64..10_000).prop_map(Filter::Offset),
    ]
}

fn apply(db: &DatabaseValue, filter: &Filter) -> DatabaseValue {
    match filter {
        Filter::AsOf(t) => db.as_of(*t),
        Filter::Since(t) => db.since(*t),
        Filter::History => db.history(),
        Filter::Limit(n) => db.limit(*n),
        Filter::Offset(n) => db.offset(*n),
    }
}

proptest! {
    #[test]
    fn test_last_as_of_wins(t1 in any::<i64>(), t2 in any::<i64>(), since in any::<i64>()) {
        let base = db().since(since);
        let twice = base.as_of(t1).as_of(t2);
        prop_assert_eq!(twice.as_of_t(), Some(&TxPoint::T(t2)));
        prop_assert_eq!(twice.since_t(), Some(&TxPoint::T(since)));
        prop_assert_eq!(twice, base.as_of(t2));
    }

    #[test]
    fn test_history_is_idempotent(filters in prop::collection::vec(arb_filter(), 0..6)) {
        let db = filters.iter().fold(db(), |db, f| apply(&db, f));
        prop_assert_eq!(db.history().history(), db.history());
    }

    #[test]
    fn test_filters_never_mutate_receiver(filters in prop::collection::vec(arb_filter(), 1..6)) {
        let original = db();
        let mut current = original.clone();
        for f in &filters {
            let before = current.clone();
            let next = apply(&current, f);
            prop_assert_eq!(&current, &before);
            current = next;
        }
        prop_assert_eq!(original, db());
    }

    #[test]
    fn test_query_args_always_lead_with_alias(filters in prop::collection::vec(arb_filter(), 0..6)) {
        let db = filters.iter().fold(db(), |db, f| apply(&db, f));
        let args = Target::from(&db).query_args();
        prop_assert_eq!(
            args.get_keyword("db/alias").and_then(|v| v.as_str()),
            Some("free/test")
        );
    }
}
