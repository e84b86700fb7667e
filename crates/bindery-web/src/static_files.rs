use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "site/"]
struct Pages;

/// Serves the embedded marketing pages. Pretty URLs resolve by appending
/// `.html`; anything else falls back to the landing page.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(content) = Pages::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    if !path.is_empty() && !path.contains('.') {
        let html_path = format!("{path}.html");
        if let Some(content) = Pages::get(&html_path) {
            return Html(String::from_utf8_lossy(&content.data).to_string()).into_response();
        }
    }

    if let Some(content) = Pages::get("index.html") {
        Html(String::from_utf8_lossy(&content.data).to_string()).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
