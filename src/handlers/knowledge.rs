// Knowledge base administration

use bytes::BufMut;
use futures::TryStreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::reply::Response;
use warp::Reply;

use super::{error_response, json_response, store_error_response};
use crate::csv_import::{is_csv_filename, parse_knowledge_csv, ImportReport, SAMPLE_CSV};
use crate::models::{AddKnowledgeRequest, MessageResponse, UpdateKnowledgeRequest};
use crate::store::Repository;

const UPLOAD_FIELD: &str = "file";

/// POST /add_knowledge
pub async fn add_knowledge_handler(
    request: AddKnowledgeRequest,
    repository: Arc<dyn Repository>,
) -> Result<Response, Infallible> {
    match repository.insert_knowledge(request.into()).await {
        Ok(id) => {
            tracing::info!(id, "Knowledge entry added");
            Ok(json_response(
                &MessageResponse::new("Knowledge added successfully"),
                StatusCode::OK,
            ))
        }
        Err(err) => Ok(store_error_response(err)),
    }
}

/// GET /get_knowledge
pub async fn get_knowledge_handler(
    repository: Arc<dyn Repository>,
) -> Result<Response, Infallible> {
    match repository.list_knowledge().await {
        Ok(entries) => Ok(json_response(&entries, StatusCode::OK)),
        Err(err) => Ok(store_error_response(err)),
    }
}

/// PUT /update_knowledge/{id}
pub async fn update_knowledge_handler(
    id: i32,
    request: UpdateKnowledgeRequest,
    repository: Arc<dyn Repository>,
) -> Result<Response, Infallible> {
    match repository.update_knowledge(id, request.into()).await {
        Ok(()) => Ok(json_response(
            &MessageResponse::new("Knowledge updated successfully"),
            StatusCode::OK,
        )),
        Err(err) => Ok(store_error_response(err)),
    }
}

/// DELETE /delete_knowledge/{id}
pub async fn delete_knowledge_handler(
    id: i32,
    repository: Arc<dyn Repository>,
) -> Result<Response, Infallible> {
    match repository.delete_knowledge(id).await {
        Ok(()) => Ok(json_response(
            &MessageResponse::new("Knowledge deleted successfully"),
            StatusCode::OK,
        )),
        Err(err) => Ok(store_error_response(err)),
    }
}

/// GET /download_sample_csv
pub async fn download_sample_csv_handler() -> Result<impl Reply, Infallible> {
    let reply = warp::reply::with_header(SAMPLE_CSV, "content-type", "text/csv");
    Ok(warp::reply::with_header(
        reply,
        "content-disposition",
        "attachment; filename=knowledge_base_template.csv",
    ))
}

async fn read_part(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut data, chunk| async move {
            data.put(chunk);
            Ok(data)
        })
        .await
}

/// POST /upload_csv
pub async fn upload_csv_handler(
    mut form: FormData,
    repository: Arc<dyn Repository>,
) -> Result<Response, Infallible> {
    let mut upload = None;
    loop {
        match form.try_next().await {
            Ok(Some(part)) if part.name() == UPLOAD_FIELD => {
                upload = Some(part);
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "Malformed multipart upload");
                return Ok(error_response(StatusCode::BAD_REQUEST, err.to_string()));
            }
        }
    }

    let Some(part) = upload else {
        return Ok(error_response(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    let filename = part.filename().unwrap_or_default().to_string();
    if filename.is_empty() {
        return Ok(error_response(StatusCode::BAD_REQUEST, "No file selected"));
    }
    if !is_csv_filename(&filename) {
        return Ok(error_response(StatusCode::BAD_REQUEST, "File must be a CSV"));
    }

    let data = match read_part(part).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(error = %err, filename = %filename, "Failed to read upload");
            return Ok(error_response(StatusCode::BAD_REQUEST, err.to_string()));
        }
    };

    let mut parsed = match parse_knowledge_csv(&data) {
        Ok(parsed) => parsed,
        Err(err) => return Ok(error_response(StatusCode::BAD_REQUEST, err.to_string())),
    };

    let entries = std::mem::take(&mut parsed.entries);
    let added = match repository.insert_knowledge_batch(entries).await {
        Ok(added) => added,
        Err(err) => return Ok(store_error_response(err)),
    };

    tracing::info!(
        filename = %filename,
        added,
        skipped = parsed.skipped,
        "CSV import finished"
    );
    Ok(json_response(&ImportReport::new(added, parsed), StatusCode::OK))
}
