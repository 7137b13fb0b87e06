use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use loyalty::prelude::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Canned reply from the mock accrual service
#[derive(Clone)]
enum Reply {
    Json(StatusCode, serde_json::Value),
    Raw(StatusCode, &'static str),
    Status(StatusCode),
}

#[derive(Default)]
struct MockInner {
    scripts: HashMap<String, VecDeque<Reply>>,
    sticky: HashMap<String, Reply>,
    hits: HashMap<String, usize>,
}

/// Accrual service stand-in: scripted replies per order, then a sticky reply,
/// then 204
#[derive(Clone, Default)]
struct MockAccrual {
    inner: Arc<Mutex<MockInner>>,
}

impl MockAccrual {
    fn script(&self, order: &str, reply: Reply) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .entry(order.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn always(&self, order: &str, reply: Reply) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .sticky
            .insert(order.to_string(), reply);
        self
    }

    fn hits(&self, order: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .hits
            .get(order)
            .copied()
            .unwrap_or(0)
    }

    fn next(&self, order: &str) -> Reply {
        let mut inner = self.inner.lock().unwrap();
        *inner.hits.entry(order.to_string()).or_insert(0) += 1;
        if let Some(reply) = inner.scripts.get_mut(order).and_then(VecDeque::pop_front) {
            return reply;
        }
        inner
            .sticky
            .get(order)
            .cloned()
            .unwrap_or(Reply::Status(StatusCode::NO_CONTENT))
    }
}

async fn order_handler(State(mock): State<MockAccrual>, Path(number): Path<String>) -> Response {
    match mock.next(&number) {
        Reply::Json(status, body) => (status, Json(body)).into_response(),
        Reply::Raw(status, body) => (status, body).into_response(),
        Reply::Status(status) => status.into_response(),
    }
}

async fn serve(mock: MockAccrual) -> SocketAddr {
    let app = Router::new()
        .route("/api/orders/:number", get(order_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr, retry_count: usize) -> HttpAccrualClient {
    HttpAccrualClient::new(
        AccrualClientConfig::default()
            .with_base_address(addr.to_string())
            .with_retry_count(retry_count)
            .with_retry_wait(Duration::from_millis(10)),
    )
    .unwrap()
}

fn number(raw: &str) -> OrderNumber {
    OrderNumber::parse(raw).unwrap()
}

#[tokio::test]
async fn http_client_decodes_processed_order() {
    let mock = MockAccrual::default();
    mock.script(
        "49927398716",
        Reply::Json(
            StatusCode::OK,
            json!({"order": "49927398716", "status": "PROCESSED", "accrual": 500}),
        ),
    );
    let client = client_for(serve(mock).await, 3);

    let response = client.lookup(&number("49927398716")).await.unwrap();
    match classify(&number("49927398716"), response) {
        Verdict::Found(result) => {
            assert_eq!(result.status, OrderStatus::Processed);
            assert_eq!(result.accrual, Some(Points::from_whole(500).unwrap()));
        }
        other => panic!("Expected Found, got {other:?}"),
    }
}

#[tokio::test]
async fn http_client_accepts_fractional_and_string_accruals() {
    let mock = MockAccrual::default();
    mock.script(
        "79927398713",
        Reply::Json(
            StatusCode::OK,
            json!({"order": "79927398713", "status": "PROCESSED", "accrual": 729.98}),
        ),
    )
    .script(
        "12345678903",
        Reply::Json(
            StatusCode::OK,
            json!({"order": "12345678903", "status": "PROCESSED", "accrual": "0.5"}),
        ),
    );
    let client = client_for(serve(mock).await, 0);

    let fractional = client.lookup(&number("79927398713")).await.unwrap();
    assert_eq!(
        fractional.body.unwrap().accrual,
        Some(Points::from_decimal_str("729.98").unwrap())
    );

    let string = client.lookup(&number("12345678903")).await.unwrap();
    assert_eq!(string.body.unwrap().accrual, Some(Points::from_raw(50)));
}

#[tokio::test]
async fn http_client_retries_rate_limit_then_succeeds() {
    let mock = MockAccrual::default();
    mock.script("49927398716", Reply::Status(StatusCode::TOO_MANY_REQUESTS))
        .script("49927398716", Reply::Status(StatusCode::TOO_MANY_REQUESTS))
        .script(
            "49927398716",
            Reply::Json(
                StatusCode::OK,
                json!({"order": "49927398716", "status": "PROCESSING"}),
            ),
        );
    let client = client_for(serve(mock.clone()).await, 3);

    let response = client.lookup(&number("49927398716")).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.unwrap().status, OrderStatus::Processing);
    assert_eq!(mock.hits("49927398716"), 3);
}

#[tokio::test]
async fn http_client_gives_up_after_retry_count() {
    let mock = MockAccrual::default();
    mock.always("49927398716", Reply::Status(StatusCode::TOO_MANY_REQUESTS));
    let client = client_for(serve(mock.clone()).await, 2);

    let response = client.lookup(&number("49927398716")).await.unwrap();

    assert_eq!(
        classify(&number("49927398716"), response),
        Verdict::RateLimited
    );
    // First attempt plus two retries
    assert_eq!(mock.hits("49927398716"), 3);
}

#[tokio::test]
async fn http_client_does_not_retry_other_statuses() {
    let mock = MockAccrual::default();
    mock.always("49927398716", Reply::Status(StatusCode::INTERNAL_SERVER_ERROR))
        .script("79927398713", Reply::Raw(StatusCode::OK, "not json"));
    let client = client_for(serve(mock.clone()).await, 3);

    let failed = client.lookup(&number("49927398716")).await.unwrap();
    assert_eq!(
        classify(&number("49927398716"), failed),
        Verdict::Rejected(StatusCode::INTERNAL_SERVER_ERROR)
    );
    assert_eq!(mock.hits("49927398716"), 1);

    let garbled = client.lookup(&number("79927398713")).await.unwrap();
    assert_eq!(
        classify(&number("79927398713"), garbled),
        Verdict::Undecodable
    );

    // Unknown to the service
    let unknown = client.lookup(&number("12345678903")).await.unwrap();
    assert_eq!(
        classify(&number("12345678903"), unknown),
        Verdict::NotRegistered
    );
}

#[tokio::test]
async fn http_client_reports_unreachable_service() {
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr, 1);

    let result = client.lookup(&number("49927398716")).await;
    assert!(matches!(result, Err(ClientError::Http(_))));
}

#[tokio::test(start_paused = true)]
async fn pipeline_credits_processed_order_once() {
    let user = UserId::new();
    let order = number("49927398716");
    let store = Arc::new(ConcurrentOrderStore::new());
    store.register_order(user, order.clone()).await.unwrap();

    let client = Arc::new(ScriptedAccrualClient::new().with_fallback(AccrualResponse::ok(
        AccrualResult::new(
            order.clone(),
            OrderStatus::Processed,
            Some(Points::from_whole(500).unwrap()),
        ),
    )));

    let cancel = CancellationToken::new();
    let handle = ReconciliationPipeline::new(
        store.clone(),
        client.clone(),
        PipelineConfig::default(),
    )
    .spawn(cancel.clone());

    tokio::time::sleep(Duration::from_secs(60)).await;
    cancel.cancel();
    let report = handle.await.unwrap();

    assert!(report.all_stages_completed());
    let persisted = store.order(&order).unwrap();
    assert_eq!(persisted.status, OrderStatus::Processed);
    assert_eq!(persisted.accrual, Some(Points::from_whole(500).unwrap()));
    assert_eq!(store.replenishment_count(), 1);
    assert_eq!(
        store.replenishment(&order).unwrap().sum,
        Points::from_whole(500).unwrap()
    );
    assert_eq!(
        store.balance(user).await.unwrap(),
        Balance {
            current: Points::from_whole(500).unwrap(),
            withdrawn: Points::zero(),
        }
    );

    // Credited points can be spent once
    store
        .withdraw(user, number("2377225624"), Points::from_whole(200).unwrap())
        .await
        .unwrap();
    let balance = store.balance(user).await.unwrap();
    assert_eq!(balance.current, Points::from_whole(300).unwrap());
    assert_eq!(balance.withdrawn, Points::from_whole(200).unwrap());
}

#[tokio::test]
async fn service_seeds_reconciles_and_writes_snapshot() {
    const USER: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    let mock = MockAccrual::default();
    mock.always(
        "49927398716",
        Reply::Json(
            StatusCode::OK,
            json!({"order": "49927398716", "status": "PROCESSED", "accrual": 500}),
        ),
    )
    .always(
        "79927398713",
        Reply::Json(
            StatusCode::OK,
            json!({"order": "79927398713", "status": "INVALID"}),
        ),
    );
    let addr = serve(mock.clone()).await;

    let mut seed = tempfile::NamedTempFile::new().unwrap();
    writeln!(seed, "order,user").unwrap();
    writeln!(seed, "49927398716,{USER}").unwrap();
    writeln!(seed, "79927398713,{USER}").unwrap();
    // Not registered with the accrual service: stays NEW
    writeln!(seed, "12345678903,{USER}").unwrap();
    // Fails the Luhn check: skipped
    writeln!(seed, "12345678901,{USER}").unwrap();
    seed.flush().unwrap();

    let config = AppConfig::try_parse_from([
        "loyalty".to_string(),
        "-r".to_string(),
        addr.to_string(),
        "--idle-interval-ms".to_string(),
        "200".to_string(),
        "--retry-wait-ms".to_string(),
        "10".to_string(),
        seed.path().display().to_string(),
    ])
    .unwrap();

    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        stopper.cancel();
    });

    let mut output = Vec::new();
    let report = run_service(config, &mut output, shutdown).await.unwrap();

    assert!(report.all_stages_completed());
    assert_eq!(report.sink.applied, 2);
    // Terminal orders are looked up once; the pending one on every pass
    assert_eq!(mock.hits("49927398716"), 1);
    assert_eq!(mock.hits("79927398713"), 1);
    assert!(mock.hits("12345678903") >= 2);

    let snapshot = String::from_utf8(output).unwrap();
    assert!(snapshot.starts_with("order,user,status,accrual\n"));
    assert_eq!(snapshot.lines().count(), 4);
    assert!(snapshot.contains(&format!("49927398716,{USER},PROCESSED,500.00\n")));
    assert!(snapshot.contains(&format!("79927398713,{USER},INVALID,\n")));
    assert!(snapshot.contains(&format!("12345678903,{USER},NEW,\n")));
}

#[tokio::test]
async fn strict_seed_import_aborts_on_bad_row() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    writeln!(seed, "order,user").unwrap();
    writeln!(seed, "12345678901,67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
    seed.flush().unwrap();

    let config = AppConfig::try_parse_from([
        "loyalty".to_string(),
        "-r".to_string(),
        "127.0.0.1:1".to_string(),
        "--strict-seed".to_string(),
        seed.path().display().to_string(),
    ])
    .unwrap();

    let mut output = Vec::new();
    let result = run_service(config, &mut output, CancellationToken::new()).await;

    assert!(matches!(result, Err(AppError::ImportAborted(_))));
    assert!(output.is_empty());
}
