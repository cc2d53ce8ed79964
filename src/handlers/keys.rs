// API key pool status and manual rotation

use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

use super::json_response;
use crate::llm::KeyPool;
use crate::models::RotateKeyResponse;

/// GET /api-status
pub async fn api_status_handler(keys: Arc<KeyPool>) -> Result<Response, Infallible> {
    Ok(json_response(&keys.status(), StatusCode::OK))
}

/// POST /rotate-key
pub async fn rotate_key_handler(keys: Arc<KeyPool>) -> Result<Response, Infallible> {
    let index = keys.rotate();
    Ok(json_response(
        &RotateKeyResponse {
            message: "Key rotated successfully".to_string(),
            current_key: index + 1,
            total_keys: keys.len(),
        },
        StatusCode::OK,
    ))
}
