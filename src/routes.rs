// Route definitions and handlers

use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

use crate::auth::{admin_api, admin_page, session_token, with_sessions};
use crate::handlers;
use crate::llm::KeyPool;
use crate::relay::ChatService;
use crate::state::AppState;
use crate::store::Repository;

/// Largest accepted CSV upload
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Largest accepted JSON body
pub const MAX_JSON_BYTES: u64 = 1024 * 1024;

fn with_chat(chat: ChatService) -> impl Filter<Extract = (ChatService,), Error = Infallible> + Clone {
    warp::any().map(move || chat.clone())
}

fn with_repository(
    repository: Arc<dyn Repository>,
) -> impl Filter<Extract = (Arc<dyn Repository>,), Error = Infallible> + Clone {
    warp::any().map(move || repository.clone())
}

fn with_keys(keys: Arc<KeyPool>) -> impl Filter<Extract = (Arc<KeyPool>,), Error = Infallible> + Clone {
    warp::any().map(move || keys.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_JSON_BYTES).and(warp::body::json())
}

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let AppState {
        chat,
        repository,
        keys,
        sessions,
    } = state;

    // GET /
    let index = warp::path::end()
        .and(warp::get())
        .and_then(handlers::index_handler);

    // GET /admin/login
    let login_page = warp::path!("admin" / "login")
        .and(warp::get())
        .and(session_token())
        .and(with_sessions(sessions.clone()))
        .and_then(handlers::login_page_handler);

    // POST /admin/login
    let login = warp::path!("admin" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_sessions(sessions.clone()))
        .and_then(handlers::login_handler);

    // GET /admin/logout
    let logout = warp::path!("admin" / "logout")
        .and(warp::get())
        .and(session_token())
        .and(with_sessions(sessions.clone()))
        .and_then(handlers::logout_handler);

    // GET /admin
    let admin = warp::path!("admin")
        .and(warp::get())
        .and(admin_page(sessions.clone()))
        .and_then(handlers::admin_page_handler);

    // POST /chat
    let chat_route = warp::path!("chat")
        .and(warp::post())
        .and(json_body())
        .and(with_chat(chat))
        .and_then(handlers::chat_handler);

    // GET /api-status
    let api_status = warp::path!("api-status")
        .and(warp::get())
        .and(admin_api(sessions.clone()))
        .and(with_keys(keys.clone()))
        .and_then(handlers::api_status_handler);

    // POST /rotate-key
    let rotate_key = warp::path!("rotate-key")
        .and(warp::post())
        .and(admin_api(sessions.clone()))
        .and(with_keys(keys))
        .and_then(handlers::rotate_key_handler);

    // POST /add_knowledge
    let add_knowledge = warp::path!("add_knowledge")
        .and(warp::post())
        .and(admin_api(sessions.clone()))
        .and(json_body())
        .and(with_repository(repository.clone()))
        .and_then(handlers::add_knowledge_handler);

    // POST /upload_csv
    let upload_csv = warp::path!("upload_csv")
        .and(warp::post())
        .and(admin_api(sessions.clone()))
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_repository(repository.clone()))
        .and_then(handlers::upload_csv_handler);

    // GET /download_sample_csv
    let sample_csv = warp::path!("download_sample_csv")
        .and(warp::get())
        .and_then(handlers::download_sample_csv_handler);

    // GET /get_knowledge
    let get_knowledge = warp::path!("get_knowledge")
        .and(warp::get())
        .and(admin_api(sessions.clone()))
        .and(with_repository(repository.clone()))
        .and_then(handlers::get_knowledge_handler);

    // PUT /update_knowledge/{id}
    let update_knowledge = warp::path!("update_knowledge" / i32)
        .and(warp::put())
        .and(admin_api(sessions.clone()))
        .and(json_body())
        .and(with_repository(repository.clone()))
        .and_then(handlers::update_knowledge_handler);

    // DELETE /delete_knowledge/{id}
    let delete_knowledge = warp::path!("delete_knowledge" / i32)
        .and(warp::delete())
        .and(admin_api(sessions.clone()))
        .and(with_repository(repository.clone()))
        .and_then(handlers::delete_knowledge_handler);

    // GET /history
    let history = warp::path!("history")
        .and(warp::get())
        .and(admin_api(sessions))
        .and(with_repository(repository))
        .and_then(handlers::history_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["Content-Type"]);

    // Combine routes
    let pages = index
        .or(login_page)
        .or(login)
        .or(logout)
        .or(admin)
        .boxed();

    let api = chat_route
        .or(api_status)
        .or(rotate_key)
        .or(add_knowledge)
        .or(upload_csv)
        .or(sample_csv)
        .or(get_knowledge)
        .or(update_knowledge)
        .or(delete_knowledge)
        .or(history)
        .boxed();

    pages
        .or(api)
        .recover(handlers::handle_rejection)
        .with(cors)
}
