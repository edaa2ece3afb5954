//! REST API for the airdrop landing page
//!
//! Public endpoints:
//! - GET  /api/ping, /api/tasks, /api/news
//! - GET  /api/participants/{wallet}
//! - POST /api/participants/{wallet}/otp            {email}
//! - POST /api/participants/{wallet}/otp/verify     {email, code}
//! - POST /api/participants/{wallet}/tasks/{id}/open
//! - POST /api/participants/{wallet}/claim
//! - GET  /api/participants/{wallet}/income
//!
//! Admin endpoints under /api/admin/* require the `X-Memedrop-Admin` header.

mod handlers;
pub mod types;

use std::io::Read;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use tiny_http::{Response, Server};
use tracing::{error, info};

use crate::service::AirdropService;
use handlers::*;

const ADMIN_HEADER: &str = "X-Memedrop-Admin";
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Bound HTTP listener, not yet serving
pub struct HttpServer {
    server: Server,
    addr: SocketAddr,
}

impl HttpServer {
    /// Bind to `addr` (use port 0 for an ephemeral port)
    pub fn bind(addr: &str) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow!("Listener on {} is not an IP socket", addr))?;
        Ok(Self { server, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve requests on the current thread until the listener closes
    pub fn run(self, service: AirdropService) {
        info!(
            "[memedrop:http] Server listening on http://{} (admin: {})",
            self.addr,
            if service.config().admin_enabled() { "enabled" } else { "disabled" }
        );

        for mut request in self.server.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let path = url.split('?').next().unwrap_or(url.as_str()).to_string();
            let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

            let body = if method == "POST" {
                match read_request_body(&mut request) {
                    Ok(body) => body,
                    Err(response) => {
                        let _ = request.respond(response);
                        continue;
                    }
                }
            } else {
                String::new()
            };

            if segments.get(1) == Some(&"admin") {
                if let Err((status, code)) = check_admin(&request, &service.config().settings.admin_token) {
                    respond_json(request, status, serde_json::json!({ "error": code }));
                    continue;
                }
            }

            // A panicking handler drops its request (tiny_http answers 500)
            // but must not take the server loop down with it
            let routed = panic::catch_unwind(AssertUnwindSafe(|| match (method.as_str(), segments.as_slice()) {
                ("GET", ["api", "ping"]) => {
                    respond_json(
                        request,
                        200,
                        serde_json::json!({
                            "status": "ok",
                            "version": env!("CARGO_PKG_VERSION"),
                        }),
                    );
                }
                ("GET", ["api", "tasks"]) => handle_tasks_list(&service, request),
                ("GET", ["api", "news"]) => handle_news_list(&service, request),

                ("GET", ["api", "participants", wallet]) => {
                    handle_session_get(&service, wallet, request)
                }
                ("POST", ["api", "participants", wallet, "otp"]) => {
                    handle_otp_request(&service, wallet, &body, request)
                }
                ("POST", ["api", "participants", wallet, "otp", "verify"]) => {
                    handle_otp_verify(&service, wallet, &body, request)
                }
                ("POST", ["api", "participants", wallet, "tasks", task_id, "open"]) => {
                    handle_task_open(&service, wallet, task_id, request)
                }
                ("POST", ["api", "participants", wallet, "claim"]) => {
                    handle_claim(&service, wallet, request)
                }
                ("GET", ["api", "participants", wallet, "income"]) => {
                    handle_income(&service, wallet, request)
                }

                ("GET", ["api", "admin", "participants"]) => {
                    handle_admin_participants(&service, request)
                }
                ("POST", ["api", "admin", "news"]) => {
                    handle_admin_news_create(&service, &body, request)
                }
                ("POST", ["api", "admin", "news", id, "delete"]) => {
                    handle_admin_news_delete(&service, id, request)
                }

                _ => {
                    respond_json(request, 404, serde_json::json!({ "error": "not_found" }));
                }
            }));

            if routed.is_err() {
                error!("[memedrop:http] Handler panicked on {} {}", method, path);
            }
        }
    }
}

/// Bind and serve in a background thread
/// Returns the bound address once the listener is up
pub fn start_http_server(service: AirdropService, addr: &str) -> Result<(SocketAddr, JoinHandle<()>)> {
    let server = HttpServer::bind(addr)?;
    let local = server.local_addr();
    let handle = thread::spawn(move || server.run(service));
    Ok((local, handle))
}

fn check_admin(request: &tiny_http::Request, expected: &str) -> Result<(), (u16, &'static str)> {
    if expected.trim().is_empty() {
        return Err((403, "admin_disabled"));
    }

    let authorized = request
        .headers()
        .iter()
        .find(|h| h.field.equiv(ADMIN_HEADER))
        .map(|h| h.value.as_str() == expected)
        .unwrap_or(false);

    if authorized { Ok(()) } else { Err((401, "unauthorized")) }
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid")
}

fn read_request_body(
    request: &mut tiny_http::Request,
) -> Result<String, Response<std::io::Cursor<Vec<u8>>>> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[memedrop:http] Failed to read body: {}", e);
        let response = Response::from_string("{\"error\":\"bad_request\"}")
            .with_status_code(400)
            .with_header(json_content_type());
        return Err(response);
    }

    if body.len() > MAX_BODY_BYTES {
        let response = Response::from_string("{\"error\":\"payload_too_large\"}")
            .with_status_code(413)
            .with_header(json_content_type());
        return Err(response);
    }

    Ok(body)
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: serde_json::Value) {
    let body =
        serde_json::to_string(&value).unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(status_code)
        .with_header(json_content_type());
    let _ = request.respond(response);
}
