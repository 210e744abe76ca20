//! End-to-end tests for error envelopes and the rescue path.

use http::StatusCode;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trestle::prelude::*;
use trestle::RequestInfo;
use trestle::Translations;
use trestle::middleware::Response;
use trestle_test::TestClient;

fn client(app: App) -> TestClient {
    let app = Arc::new(app);
    TestClient::new(move |request| {
        let app = Arc::clone(&app);
        async move { app.handle(request).await }
    })
}

static LEDGER_ERROR: ErrorClass = ErrorClass::new("LedgerError", Some(&STANDARD_ERROR));
static ENTRY_ERROR: ErrorClass = ErrorClass::new("EntryError", Some(&LEDGER_ERROR));
static ENTRY_LOCKED: ErrorClass = ErrorClass::new("EntryLocked", Some(&ENTRY_ERROR));

#[derive(Debug, thiserror::Error)]
#[error("entry {0} is locked")]
struct EntryLocked(u32);

impl Classified for EntryLocked {
    fn error_class(&self) -> &'static ErrorClass {
        &ENTRY_LOCKED
    }
}

async fn throttle(_action: Action) -> TrestleResult<Response> {
    raise!("throttled");
}

async fn locked(_action: Action) -> TrestleResult<Response> {
    Err(EntryLocked(7).into())
}

async fn crash(_action: Action) -> TrestleResult<Response> {
    Err(Failure::other(
        anyhow::anyhow!("connection reset").context("ledger unavailable"),
    ))
}

async fn invalid(_action: Action) -> TrestleResult<Response> {
    let errors = ValidationErrors::new().with("amount", "must be positive");
    Err(ApiError::invalid_resource(errors).into())
}

async fn create(action: Action) -> TrestleResult<Response> {
    let entry: serde_json::Value = action.json()?;
    action.expose_with(&entry, ExposeOptions::new().status(StatusCode::CREATED))
}

fn ledger_app(settings: Settings, controller: Controller) -> App {
    let controller = Arc::new(controller);
    let router = ApiRouter::new()
        .mount(
            ApiScope::new()
                .version(1)
                .get("/throttle", Endpoint::new(&controller, "throttle", throttle))
                .get("/locked", Endpoint::new(&controller, "locked", locked))
                .get("/crash", Endpoint::new(&controller, "crash", crash))
                .get("/invalid", Endpoint::new(&controller, "invalid", invalid))
                .post("/entries", Endpoint::new(&controller, "create", create)),
        )
        .unwrap();
    App::new(settings, router)
}

#[tokio::test]
async fn test_raised_kind_renders_with_its_status() {
    let client = client(ledger_app(
        Settings::for_environment("production"),
        Controller::new("ledger"),
    ));
    client
        .get("/1/throttle")
        .send()
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_content_length()
        .assert_json_eq(&json!({
            "error": "throttled",
            "error_description": "The given request has been throttled."
        }));
}

#[tokio::test]
async fn test_registered_kinds_render_even_when_errors_pass_through() {
    let client = client(ledger_app(Settings::for_environment("test"), Controller::new("ledger")));
    client
        .get("/1/throttle")
        .send()
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_error("throttled");
}

#[tokio::test]
async fn test_nearest_mapped_ancestor_is_used() {
    let controller = Controller::builder("ledger")
        .map_error("LedgerError", "conflict")
        .map_error("EntryError", "forbidden")
        .build();
    let client = client(ledger_app(Settings::for_environment("production"), controller));
    client
        .get("/1/locked")
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_error("forbidden");
}

#[tokio::test]
async fn test_mapping_with_transform_keeps_message() {
    let controller = Controller::builder("ledger")
        .map_error_with("EntryError", |failure| {
            ApiError::named("conflict")
                .with_message(failure.message())
                .with_metadata("retry", json!(true))
        })
        .build();
    let settings = Settings::for_environment("production")
        .with_translations(Translations::empty())
        .with_show_exception_message(true);
    let client = client(ledger_app(settings, controller));
    client
        .get("/1/locked")
        .send()
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_json_eq(&json!({
            "error": "conflict",
            "error_description": "entry 7 is locked",
            "retry": true
        }));
}

#[tokio::test]
async fn test_unmapped_failure_is_genericized_and_notified() {
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    let controller = Controller::builder("ledger")
        .notifier(Arc::new(move |failure: &Failure, request: &RequestInfo| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(failure.class_name(), "RuntimeError");
            assert_eq!(request.path(), "/1/crash");
            Some("incident-42".to_string())
        }))
        .build();
    let client = client(ledger_app(Settings::for_environment("production"), controller));

    client
        .get("/1/crash")
        .send()
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_eq(&json!({
            "error": "system",
            "error_description": "An unknown error has occurred.",
            "error_identifier": "incident-42"
        }));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pass_through_returns_plain_text_chain() {
    let client = client(ledger_app(Settings::for_environment("development"), Controller::new("ledger")));
    let response = client.get("/1/crash").send().await;

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_header("content-type", "text/plain; charset=utf-8");
    assert_eq!(
        response.text().unwrap(),
        "RuntimeError: ledger unavailable\n=> connection reset"
    );
}

#[tokio::test]
async fn test_invalid_resource_lists_messages() {
    let client = client(ledger_app(Settings::for_environment("production"), Controller::new("ledger")));
    let response = client.get("/1/invalid").send().await;

    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_error("invalid_resource");
    assert_eq!(
        response.envelope_metadata("messages"),
        Some(json!({"amount": ["must be positive"]}))
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let client = client(ledger_app(Settings::for_environment("production"), Controller::new("ledger")));
    client
        .post("/1/entries")
        .body("{not json")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("bad_request");

    client
        .post("/1/entries")
        .json(&json!({"amount": 5}))
        .send()
        .await
        .assert_status(StatusCode::CREATED)
        .assert_exposes(&json!({"amount": 5}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let client = client(ledger_app(Settings::for_environment("production"), Controller::new("ledger")));
    client
        .get("/1/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json_eq(&json!({
            "error": "not_found",
            "error_description": "The requested resource could not be found."
        }));
}
