//! Shared test utilities for service and API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use tokio::runtime::{Handle, Runtime};

use memedrop::api::start_http_server;
use memedrop::config::Config;
use memedrop::otp::MemoryDelivery;
use memedrop::service::AirdropService;
use memedrop::store::Store;
use memedrop::verifier::StaticVerifier;
use memedrop::TaskId;

pub const WALLET: &str = "0xAbCdEf0123456789abcdef0123456789ABCDEF01";
pub const EMAIL: &str = "holder@example.com";

pub const TASK_IDS: [&str; 5] = [
    "follow_x",
    "join_telegram",
    "retweet_launch",
    "join_discord",
    "subscribe_youtube",
];

/// Service backed by a database in a temp dir.
/// Codes are captured in `delivery`; every task is approved.
pub struct TestApp {
    pub service: AirdropService,
    pub delivery: Arc<MemoryDelivery>,
    pub config: Config,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::with_defaults();
    config.settings.database_path = Some(dir.path().join("memedrop.db"));
    config.airdrop.verification_delay_secs = 0;
    config
}

pub fn create_test_app(runtime: Handle) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&dir);
    let store = Store::open(&config.database_path()).expect("Failed to open store");

    let delivery = Arc::new(MemoryDelivery::default());
    let verifier = StaticVerifier::approving(TASK_IDS.iter().map(|id| TaskId::from(*id)));
    let service = AirdropService::new(config.clone(), store, runtime)
        .expect("Failed to build service")
        .with_delivery(delivery.clone())
        .with_verifier(Arc::new(verifier));

    TestApp {
        service,
        delivery,
        config,
        _dir: dir,
    }
}

/// Request and confirm a code for `wallet`
pub fn verify_email(app: &TestApp, wallet: &str, email: &str) {
    app.service.request_otp(wallet, email).expect("Failed to request code");
    let code = app.delivery.last_code(email).expect("No code delivered");
    let confirmation = app
        .service
        .confirm_otp(wallet, email, &code)
        .expect("Failed to confirm code");
    assert!(confirmation.check.is_verified());
}

/// HTTP server on an ephemeral port with its own runtime
pub struct TestServer {
    pub base_url: String,
    pub app: TestApp,
    _runtime: Runtime,
}

pub fn start_test_server() -> TestServer {
    start_test_server_with(|service| service)
}

/// Like [`start_test_server`], with a chance to swap service collaborators
pub fn start_test_server_with(customize: impl FnOnce(AirdropService) -> AirdropService) -> TestServer {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    let mut app = create_test_app(runtime.handle().clone());
    app.service = customize(app.service);
    let (addr, _handle) =
        start_http_server(app.service.clone(), "127.0.0.1:0").expect("Failed to start server");

    TestServer {
        base_url: format!("http://{}", addr),
        app,
        _runtime: runtime,
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> (u16, serde_json::Value) {
        into_json(ureq::get(&self.url(path)).call())
    }

    pub fn post(&self, path: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        into_json(ureq::post(&self.url(path)).send_json(body))
    }

    pub fn admin_get(&self, path: &str, token: &str) -> (u16, serde_json::Value) {
        into_json(ureq::get(&self.url(path)).set("X-Memedrop-Admin", token).call())
    }

    pub fn admin_post(&self, path: &str, token: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        into_json(
            ureq::post(&self.url(path))
                .set("X-Memedrop-Admin", token)
                .send_json(body),
        )
    }
}

/// ureq reports 4xx/5xx as errors; fold them back into (status, body)
fn into_json(result: Result<ureq::Response, ureq::Error>) -> (u16, serde_json::Value) {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => panic!("Request failed: {}", e),
    };
    let status = response.status();
    let body = response
        .into_json::<serde_json::Value>()
        .unwrap_or(serde_json::Value::Null);
    (status, body)
}
