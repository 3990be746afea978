//! Route handlers.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the Finance QA Agent API";

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// `GET /`
pub async fn handle_root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_documents: usize,
}

/// `GET /health`
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_documents: state.pipeline.cache().len(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Fields of the `POST /query/` form.
struct QueryForm {
    file_name: String,
    bytes: Vec<u8>,
    query: String,
}

async fn read_query_form(multipart: &mut Multipart) -> Result<QueryForm, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut query: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart form: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                file = Some((name, data.to_vec()));
            }
            Some("query") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read query: {}", e)))?;
                query = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("missing file"))?;
    let query = query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("query must not be empty"))?;

    Ok(QueryForm {
        file_name,
        bytes,
        query,
    })
}

/// `POST /query/`: multipart `file` + `query`.
pub async fn handle_query(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QueryResponse>, ApiError> {
    let form = read_query_form(&mut multipart).await?;

    tracing::info!(
        file = %form.file_name,
        bytes = form.bytes.len(),
        "Received query upload"
    );

    let answer = state
        .pipeline
        .answer_upload(&form.file_name, form.bytes, &form.query)
        .await?;

    tracing::info!(origin = ?answer.origin, cache_hit = answer.cache_hit, "Answered query");

    Ok(Json(QueryResponse {
        response: answer.response,
    }))
}
