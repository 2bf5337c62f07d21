// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for the Datomic REST client
//!
//! Drives every operation through a scripted transport: requests are
//! recorded, responses are replayed in order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use datomic_client::edn::from_str;
use datomic_client::{
    basis_t, entity, q, tempid_n, Components, DatomicClient, DbError, HttpRequest, HttpResponse,
    Index, Method, Transport, TransportError, TxPoint, Value,
};

/// Transport that replays queued responses and records what it was sent.
#[derive(Default)]
struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
    }
}

fn setup() -> (Arc<MockTransport>, DatomicClient) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();

    let mock = MockTransport::new();
    let client = DatomicClient::with_transport(mock.clone());
    (mock, client)
}

// ---------------------------------------------------------------------------
// Database creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_database_created() {
    let (mock, client) = setup();
    mock.respond(201, "");

    let conn = client
        .create_database("localhost", 8888, "free", "test")
        .await
        .unwrap();
    assert_eq!(conn.db_alias(), "free/test");

    let request = mock.last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "http://localhost:8888/data/free/");
    assert_eq!(request.form_value("db-name"), Some("test"));
    assert_eq!(request.header_value("Accept"), Some("application/edn"));
}

#[tokio::test]
async fn test_create_database_already_exists() {
    let (mock, client) = setup();
    mock.respond(200, "");

    let conn = client.create_database("localhost", 8888, "free", "test").await;
    assert!(conn.is_ok());
}

#[tokio::test]
async fn test_create_database_server_error() {
    let (mock, client) = setup();
    mock.respond(500, "storage unavailable");

    let err = client
        .create_database("localhost", 8888, "free", "test")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("storage unavailable"));
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_query_sends_implicit_database_argument() {
    let (mock, client) = setup();
    mock.respond(200, "[[17592186045418]]");

    let conn = client.connect("localhost", 8888, "free", "test");
    let rows = conn
        .db()
        .q("[:find ?e :where [?e :db/doc]]", vec![])
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Value::Integer(17592186045418)]]);

    let request = mock.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, "http://localhost:8888/api/query");
    assert_eq!(request.query_value("q"), Some("[:find ?e :where [?e :db/doc]]"));

    let args = from_str(request.query_value("args").unwrap()).unwrap();
    assert_eq!(
        serde_json::to_value(&args).unwrap(),
        serde_json::json!([{ "db/alias": "free/test" }])
    );
}

#[tokio::test]
async fn test_query_with_inputs_and_filters() {
    let (mock, client) = setup();
    mock.respond(200, "#{[\"Ada\"]}");

    let db = client
        .connect("localhost", 8888, "free", "test")
        .db()
        .as_of(1000)
        .history()
        .limit(10);
    let rows = q(
        "[:find ?n :in $ ?e :where [?e :person/name ?n]]",
        &db,
        vec![Value::Integer(42)],
    )
    .await
    .unwrap();
    assert_eq!(rows, vec![vec![Value::string("Ada")]]);

    let request = mock.last_request();
    let args = from_str(request.query_value("args").unwrap()).unwrap();
    let args = args.as_seq().unwrap();
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].get_keyword("as-of"), Some(&Value::Integer(1000)));
    assert_eq!(args[0].get_keyword("history"), Some(&Value::Bool(true)));
    assert_eq!(args[1], Value::Integer(42));
    assert_eq!(request.query_value("limit"), Some("10"));
}

#[tokio::test]
async fn test_query_against_connection() {
    let (mock, client) = setup();
    mock.respond(200, "[]");

    let conn = client.connect("localhost", 8888, "free", "test");
    let rows = q("[:find ?e :where [?e :db/ident]]", &conn, vec![]).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(
        mock.last_request().query_value("args"),
        Some(r#"[{:db/alias "free/test"}]"#)
    );
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

const TX_REPORT: &str = r#"{:db-before {:basis-t 1000}
    :db-after {:basis-t 1001}
    :tx-data [{:e 17592186045418 :a 63 :v "x" :tx 13194139534313 :added true}]
    :tempids {-1 17592186045418}}"#;

#[tokio::test]
async fn test_transact_raw_and_structured_send_same_body() {
    let (mock, client) = setup();
    mock.respond(201, TX_REPORT);
    mock.respond(201, TX_REPORT);

    let conn = client.connect("localhost", 8888, "free", "test");
    conn.transact(r#"[[:db/add #db/id[:db.part/user -1] :db/doc "x"]]"#)
        .await
        .unwrap();
    conn.transact(vec![Value::vector([
        Value::keyword("db/add"),
        tempid_n("db.part/user", -1),
        Value::keyword("db/doc"),
        Value::string("x"),
    ])])
    .await
    .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, "http://localhost:8888/data/free/test/");
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].form_body(), requests[1].form_body());
}

#[tokio::test]
async fn test_transact_report() {
    let (mock, client) = setup();
    mock.respond(201, TX_REPORT);

    let conn = client.connect("localhost", 8888, "free", "test");
    let report = conn.transact("[]").await.unwrap();
    assert_eq!(report.tx_data.len(), 1);
    assert_eq!(report.tx_data[0].v, Value::string("x"));
    assert_eq!(
        report.resolve_tempid(&Value::Integer(-1)),
        Some(17592186045418)
    );
}

#[tokio::test]
async fn test_transact_rejects_invalid_ops_without_io() {
    let (mock, client) = setup();

    let conn = client.connect("localhost", 8888, "free", "test");
    let err = conn.transact(vec![Value::Integer(1)]).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
    assert!(mock.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Basis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_basis_from_as_of_makes_no_call() {
    let (mock, client) = setup();

    let db = client.connect("localhost", 8888, "free", "test").db().as_of(1000);
    assert_eq!(db.basis_t().await.unwrap(), TxPoint::T(1000));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_basis_remote() {
    let (mock, client) = setup();
    mock.respond(200, r#"{:db/alias "free/test", :basis-t 1042}"#);

    let conn = client.connect("localhost", 8888, "free", "test");
    assert_eq!(basis_t(&conn).await.unwrap(), TxPoint::T(1042));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://localhost:8888/data/free/test/-/");
}

// ---------------------------------------------------------------------------
// Entity and datoms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_entity_request() {
    let (mock, client) = setup();
    mock.respond(200, r#"{:db/id 17592186045418, :person/name "Ada"}"#);

    let db = client.connect("localhost", 8888, "free", "test").db().since(900);
    let e = entity(&db, 17592186045418_i64).await.unwrap();
    assert_eq!(e.get("person/name"), Some(&Value::string("Ada")));

    let request = mock.last_request();
    assert_eq!(request.url, "http://localhost:8888/data/free/test/-/entity");
    assert_eq!(request.query_value("e"), Some("17592186045418"));
    assert_eq!(request.query_value("since"), Some("900"));
    assert_eq!(request.query_value("as-of"), None);
}

#[tokio::test]
async fn test_entity_request_as_of() {
    let (mock, client) = setup();
    mock.respond(200, r#"{:db/id 1, :person/name "Ada"}"#);

    let db = client.connect("localhost", 8888, "free", "test").db().as_of(1000);
    db.entity(1_i64).await.unwrap();

    let request = mock.last_request();
    assert_eq!(request.query_value("as-of"), Some("1000"));
    assert_eq!(request.query_value("since"), None);
    assert_eq!(request.query_value("history"), None);
    assert_eq!(request.query_value("limit"), None);
    assert_eq!(request.query_value("offset"), None);
}

#[tokio::test]
async fn test_datoms_request() {
    let (mock, client) = setup();
    mock.respond(
        200,
        r#"[{:e 1 :a :person/name :v "Ada" :tx 1000 :added true}
            {:e 2 :a :person/name :v "Bob" :tx 1001}]"#,
    );

    let db = client
        .connect("localhost", 8888, "free", "test")
        .db()
        .limit(2)
        .offset(4);
    let datoms = db
        .datoms(Index::Aevt, Components::new().a(Value::keyword("person/name")))
        .await
        .unwrap();
    assert_eq!(datoms.len(), 2);
    assert_eq!(datoms[1].v, Value::string("Bob"));
    assert!(datoms[1].added);

    let request = mock.last_request();
    assert_eq!(request.url, "http://localhost:8888/data/free/test/-/datoms");
    assert_eq!(request.query_value("index"), Some("aevt"));
    assert_eq!(request.query_value("a"), Some(":person/name"));
    assert_eq!(request.query_value("limit"), Some("2"));
    assert_eq!(request.query_value("offset"), Some("4"));
}

#[tokio::test]
async fn test_index_range_request() {
    let (mock, client) = setup();
    mock.respond(200, "[]");

    let db = client.connect("localhost", 8888, "free", "test").db();
    let datoms = db
        .index_range(Index::Avet, Some(Value::string("A")), None)
        .await
        .unwrap();
    assert!(datoms.is_empty());

    let request = mock.last_request();
    assert_eq!(request.query_value("index"), Some("avet"));
    assert_eq!(request.query_value("start"), Some("\"A\""));
    assert_eq!(request.query_value("end"), None);
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_transport_failure() {
    let (mock, client) = setup();
    mock.fail("connection refused");

    let db = client.connect("localhost", 8888, "free", "test").db();
    let err = db.q("[:find ?e]", vec![]).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_unparsable_body() {
    let (mock, client) = setup();
    mock.respond(200, "[[1 2");

    let db = client.connect("localhost", 8888, "free", "test").db();
    let err = db.q("[:find ?e]", vec![]).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_deeply_nested_body_is_a_decode_error() {
    let (mock, client) = setup();
    mock.respond(200, &"[".repeat(5_000));

    let db = client.connect("localhost", 8888, "free", "test").db();
    let err = db.q("[:find ?e]", vec![]).await.unwrap_err();
    assert!(matches!(err, DbError::Decode(msg) if msg.contains("Nesting deeper than")));
}

#[tokio::test]
async fn test_odd_map_body_is_a_decode_error() {
    let (mock, client) = setup();
    mock.respond(200, "{:a 1 :b}");

    let db = client.connect("localhost", 8888, "free", "test").db();
    let err = db.entity(1_i64).await.unwrap_err();
    assert!(matches!(err, DbError::Decode(_)));
}

#[test]
fn test_operation_outside_runtime_fails_without_io() {
    let (mock, client) = setup();

    let db = client.connect("localhost", 8888, "free", "test").db();
    let pending = db.q("[:find ?e]", vec![]);
    assert_eq!(pending.try_get(), Some(Err(DbError::NoRuntime)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_http_status_error() {
    let (mock, client) = setup();
    mock.respond(404, "Unknown database");

    let db = client.connect("localhost", 8888, "free", "missing").db();
    let err = db.entity(1_i64).await.unwrap_err();
    assert_eq!(
        err,
        DbError::HttpStatus {
            status: 404,
            message: "Unknown database".into()
        }
    );
}

#[tokio::test]
async fn test_result_observed_by_every_reader() {
    let (mock, client) = setup();
    mock.respond(200, r#"{:basis-t 7}"#);

    let pending = client.connect("localhost", 8888, "free", "test").basis_t();
    let other = pending.clone();
    assert_eq!(pending.wait().await, Ok(TxPoint::T(7)));
    assert_eq!(other.await, Ok(TxPoint::T(7)));
    assert_eq!(mock.requests().len(), 1);
}
