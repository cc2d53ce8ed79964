// Admin login and logout

use std::convert::Infallible;
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::Reply;

use super::json_response;
use super::pages::ADMIN_LOGIN_HTML;
use crate::auth::{expired_cookie, session_cookie, SessionStore};
use crate::models::{LoginRequest, LoginResponse};

/// GET /admin/login
pub async fn login_page_handler(
    token: Option<String>,
    sessions: SessionStore,
) -> Result<Response, Infallible> {
    if sessions.is_logged_in(token.as_deref()) {
        return Ok(warp::redirect::see_other(Uri::from_static("/admin")).into_response());
    }
    Ok(warp::reply::html(ADMIN_LOGIN_HTML).into_response())
}

/// POST /admin/login
pub async fn login_handler(
    request: LoginRequest,
    sessions: SessionStore,
) -> Result<Response, Infallible> {
    match sessions.login(&request.password) {
        Some(token) => {
            let body = json_response(
                &LoginResponse {
                    success: true,
                    error: None,
                },
                StatusCode::OK,
            );
            let cookie = session_cookie(&token, sessions.ttl());
            Ok(warp::reply::with_header(body, "set-cookie", cookie).into_response())
        }
        None => Ok(json_response(
            &LoginResponse {
                success: false,
                error: Some("Invalid password".to_string()),
            },
            StatusCode::UNAUTHORIZED,
        )),
    }
}

/// GET /admin/logout
pub async fn logout_handler(
    token: Option<String>,
    sessions: SessionStore,
) -> Result<Response, Infallible> {
    if let Some(token) = token {
        sessions.logout(&token);
    }
    let redirect = warp::redirect::see_other(Uri::from_static("/admin/login"));
    Ok(warp::reply::with_header(redirect, "set-cookie", expired_cookie()).into_response())
}
