// Static HTML pages

use std::convert::Infallible;
use warp::Reply;

pub const INDEX_HTML: &str = include_str!("../../static/index.html");
pub const ADMIN_HTML: &str = include_str!("../../static/admin.html");
pub const ADMIN_LOGIN_HTML: &str = include_str!("../../static/admin_login.html");

/// GET /
pub async fn index_handler() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::html(INDEX_HTML))
}

/// GET /admin, behind the page gate
pub async fn admin_page_handler() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::html(ADMIN_HTML))
}
