// Handlers module

pub mod admin;
pub mod chat;
pub mod history;
pub mod keys;
pub mod knowledge;
pub mod pages;

pub use admin::{login_handler, login_page_handler, logout_handler};
pub use chat::chat_handler;
pub use history::history_handler;
pub use keys::{api_status_handler, rotate_key_handler};
pub use knowledge::{
    add_knowledge_handler, delete_knowledge_handler, download_sample_csv_handler,
    get_knowledge_handler, update_knowledge_handler, upload_csv_handler,
};
pub use pages::{admin_page_handler, index_handler};

use serde::Serialize;
use std::convert::Infallible;
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::auth::{LoginRequired, Unauthorized};
use crate::models::ErrorResponse;
use crate::store::StoreError;

/// Serialize `body` with `status`
pub fn json_response<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    json_response(&ErrorResponse::new(error), status)
}

/// Map a storage failure onto an HTTP status
pub fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err.to_string()),
        other => {
            tracing::error!(error = %other, "Storage operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

/// Turn rejections into JSON errors, or a login redirect for gated pages
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.find::<LoginRequired>().is_some() {
        return Ok(
            warp::redirect::see_other(Uri::from_static("/admin/login")).into_response(),
        );
    }
    if err.find::<Unauthorized>().is_some() {
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            "Admin login required",
        ));
    }
    if err.is_not_found() {
        return Ok(error_response(StatusCode::NOT_FOUND, "Not found"));
    }
    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_response(StatusCode::BAD_REQUEST, e.to_string()));
    }
    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported content type",
        ));
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Upload too large",
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        ));
    }

    tracing::error!(rejection = ?err, "Unhandled rejection");
    Ok(error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}
