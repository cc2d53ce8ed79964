// GET /history handler

use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

use super::{json_response, store_error_response};
use crate::store::operations::HISTORY_LIMIT;
use crate::store::Repository;

pub async fn history_handler(repository: Arc<dyn Repository>) -> Result<Response, Infallible> {
    match repository.recent_conversations(HISTORY_LIMIT).await {
        Ok(records) => Ok(json_response(&records, StatusCode::OK)),
        Err(err) => Ok(store_error_response(err)),
    }
}
