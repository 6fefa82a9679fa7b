//! API request handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::AutoconfigError;
use crate::generators::{apple, AppleGenerator, ConfigGenerator};
use crate::utils::split_email;

/// Shared application state
pub struct AppState {
    pub apple: AppleGenerator,
}

/// Query parameters of the mobileconfig endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MobileConfigParams {
    pub emailaddress: Option<String>,
    /// Display name to use when the directory has none
    pub name: Option<String>,
    pub password: Option<String>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// Status code for a generator error
pub fn error_status(err: &AutoconfigError) -> StatusCode {
    match err {
        AutoconfigError::DomainNotFound(_)
        | AutoconfigError::NoProviderForDomain(_)
        | AutoconfigError::NoServersForDomain(_)
        | AutoconfigError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
        AutoconfigError::DirectoryLookup(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: AutoconfigError) -> Response {
    let status = error_status(&err);
    if status.is_server_error() {
        error!("Autoconfig request failed: {}", err);
    } else {
        warn!("Autoconfig request rejected: {}", err);
    }
    (status, Json(ApiError::new(&err.to_string()))).into_response()
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /mobileconfig/?emailaddress=...&name=... - Apple configuration profile
pub async fn mobileconfig(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MobileConfigParams>,
) -> Response {
    let Some(address) = params.emailaddress.as_deref() else {
        return error_response(AutoconfigError::InvalidEmail(
            "Missing emailaddress parameter".to_string(),
        ));
    };
    let (local_part, domain) = match split_email(address) {
        Ok(parts) => parts,
        Err(e) => return error_response(e),
    };

    info!("Mobileconfig requested for {}@{}", local_part, domain);

    let realname = params.name.as_deref().unwrap_or_default();
    let password = params.password.as_deref().unwrap_or_default();
    match state
        .apple
        .client_config(local_part, domain, realname, password)
        .await
    {
        Ok(document) if document.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(document) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, apple::CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.mobileconfig\"", domain),
                ),
            ],
            document,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status() {
        assert_eq!(
            error_status(&AutoconfigError::DomainNotFound("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AutoconfigError::NoServersForDomain("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AutoconfigError::DirectoryLookup("bind".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&AutoconfigError::InvalidServerType("pop3".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_status(&AutoconfigError::PayloadIntegrity(vec!["k".to_string()])),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
