//! server::handlers
//!
//! Request handlers. Each one parses the request, makes a single vault
//! call, and shapes the response. No business logic lives here.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::vault::Vault;

/// Shared handler state.
pub type AppState = Arc<Vault>;

/// `GET /secrets` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSecretsResponse {
    pub secrets: Vec<String>,
}

/// `GET /secrets/{name}` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretResponse {
    pub secret_name: String,
    pub value: String,
}

/// `POST /secrets` request. Both fields are required; they are optional
/// here so a missing field is a 400 with our message, not a rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSecretRequest {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Message-only response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn list_secrets(
    State(vault): State<AppState>,
) -> Result<Json<ListSecretsResponse>, ApiError> {
    let secrets = vault
        .list()
        .await
        .map_err(|e| ApiError::from_secret(e, "failed to list secrets"))?;
    Ok(Json(ListSecretsResponse { secrets }))
}

pub async fn get_secret(
    State(vault): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
    let value = vault.get(&name).await.map_err(|e| {
        ApiError::from_secret(e, format!("secret '{}' not found or inaccessible", name))
    })?;
    Ok(Json(SecretResponse {
        secret_name: name,
        value,
    }))
}

pub async fn store_secret(
    State(vault): State<AppState>,
    payload: Result<Json<StoreSecretRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected secret payload");
        ApiError::bad_request("request body must be a JSON object with 'name' and 'value'")
    })?;

    let name = request.name.unwrap_or_default();
    let value = request.value.unwrap_or_default();
    if name.is_empty() || value.is_empty() {
        return Err(ApiError::bad_request("fields 'name' and 'value' are required"));
    }

    vault
        .put(&name, &value)
        .await
        .map_err(|e| ApiError::from_secret(e, format!("failed to store secret '{}'", name)))?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("secret '{}' stored", name),
        }),
    ))
}

pub async fn delete_secret(
    State(vault): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    vault
        .delete(&name)
        .await
        .map_err(|e| ApiError::from_secret(e, format!("unable to delete secret '{}'", name)))?;
    Ok(Json(MessageResponse {
        message: format!("secret '{}' deleted", name),
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
