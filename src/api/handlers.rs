//! HTTP request handlers for participant, news and admin endpoints.

use chrono::Utc;
use serde_json::json;
use tiny_http::Request;
use tracing::error;

use super::respond_json;
use super::types::{
    NewsCreateRequest, OtpRequest, OtpVerifyRequest, ParticipantsResponse,
    TaskOpenResponse,
};
use crate::domain::AirdropError;
use crate::input::InputError;
use crate::service::{AirdropService, ServiceError};

const NEWS_LIMIT: usize = 50;

/// Respond with the status code matching an error's kind
pub(super) fn respond_error(request: Request, err: anyhow::Error) {
    if let Some(e) = err.downcast_ref::<AirdropError>() {
        match e {
            AirdropError::TaskNotFound(id) => {
                respond_json(request, 404, json!({ "error": "task_not_found", "task_id": id }));
            }
            AirdropError::IneligibleClaim { status } => {
                respond_json(
                    request,
                    409,
                    json!({
                        "error": "ineligible_claim",
                        "status": status,
                        "details": status.message(),
                    }),
                );
            }
            AirdropError::DuplicateTask(_) | AirdropError::EmptyTaskSet => {
                error!("[memedrop:http] Campaign misconfigured: {}", e);
                respond_json(request, 500, json!({ "error": "campaign_misconfigured" }));
            }
        }
        return;
    }

    if let Some(e) = err.downcast_ref::<InputError>() {
        respond_json(request, 400, json!({ "error": "invalid_input", "details": e.to_string() }));
        return;
    }

    if let Some(ServiceError::IncomeDisabled) = err.downcast_ref::<ServiceError>() {
        respond_json(request, 503, json!({ "error": "income_disabled" }));
        return;
    }

    error!("[memedrop:http] Internal error: {:#}", err);
    respond_json(request, 500, json!({ "error": "internal" }));
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str, request: Request) -> Option<(T, Request)> {
    match serde_json::from_str(body) {
        Ok(value) => Some((value, request)),
        Err(e) => {
            respond_json(
                request,
                400,
                json!({ "error": "invalid_json", "details": e.to_string() }),
            );
            None
        }
    }
}

pub fn handle_tasks_list(service: &AirdropService, request: Request) {
    respond_json(request, 200, json!({ "tasks": service.config().airdrop.tasks }));
}

pub fn handle_session_get(service: &AirdropService, wallet: &str, request: Request) {
    match service.session(wallet) {
        Ok(view) => respond_json(request, 200, json!(view)),
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_otp_request(service: &AirdropService, wallet: &str, body: &str, request: Request) {
    let Some((req, request)) = parse_body::<OtpRequest>(body, request) else {
        return;
    };
    match service.request_otp(wallet, &req.email) {
        Ok(issued) => respond_json(request, 200, json!({ "status": "sent", "otp": issued })),
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_otp_verify(service: &AirdropService, wallet: &str, body: &str, request: Request) {
    let Some((req, request)) = parse_body::<OtpVerifyRequest>(body, request) else {
        return;
    };
    match service.confirm_otp(wallet, &req.email, &req.code) {
        Ok(confirmation) => {
            let status = if confirmation.check.is_verified() { 200 } else { 422 };
            respond_json(request, status, json!(confirmation));
        }
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_task_open(service: &AirdropService, wallet: &str, task_id: &str, request: Request) {
    match service.open_task(wallet, task_id) {
        Ok(opened) => respond_json(
            request,
            200,
            json!(TaskOpenResponse {
                task_id: task_id.to_string(),
                opened,
            }),
        ),
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_claim(service: &AirdropService, wallet: &str, request: Request) {
    match service.claim(wallet) {
        Ok(confirmation) => respond_json(request, 200, json!(confirmation)),
        Err(e) => respond_error(request, e),
    }
}

/// Lookups can take seconds, so the request is answered from the runtime
/// and the server loop moves on to the next one
pub fn handle_income(service: &AirdropService, wallet: &str, request: Request) {
    let runtime = service.runtime().clone();
    let service = service.clone();
    let wallet = wallet.to_string();
    runtime.spawn(async move {
        match service.income(&wallet).await {
            Ok(history) => respond_json(request, 200, json!(history)),
            Err(e) => respond_error(request, e),
        }
    });
}

pub fn handle_news_list(service: &AirdropService, request: Request) {
    match service.store().news().list(NEWS_LIMIT) {
        Ok(items) => respond_json(request, 200, json!({ "news": items })),
        Err(e) => respond_error(request, e),
    }
}

// ========================================
// ADMIN
// ========================================

pub fn handle_admin_participants(service: &AirdropService, request: Request) {
    match service.participants() {
        Ok((summary, participants)) => respond_json(
            request,
            200,
            json!(ParticipantsResponse {
                summary,
                participants,
            }),
        ),
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_admin_news_create(service: &AirdropService, body: &str, request: Request) {
    let Some((req, request)) = parse_body::<NewsCreateRequest>(body, request) else {
        return;
    };
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        respond_json(request, 400, json!({ "error": "missing_title_or_body" }));
        return;
    }

    let link = req.link.as_deref().map(str::trim).filter(|l| !l.is_empty());
    match service.store().news().insert(
        req.title.trim(),
        req.body.trim(),
        link,
        Utc::now().timestamp_millis(),
    ) {
        Ok(item) => respond_json(request, 201, json!(item)),
        Err(e) => respond_error(request, e),
    }
}

pub fn handle_admin_news_delete(service: &AirdropService, id: &str, request: Request) {
    match service.store().news().delete(id) {
        Ok(true) => respond_json(request, 200, json!({ "status": "deleted", "id": id })),
        Ok(false) => respond_json(request, 404, json!({ "error": "news_not_found" })),
        Err(e) => respond_error(request, e),
    }
}
