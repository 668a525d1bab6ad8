use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    body::Body,
    extract::{
        ConnectInfo, FromRequest, FromRequestParts, Multipart, Path as AxumPath, Query, Request,
        State,
    },
    http::{header, request::Parts, HeaderMap, HeaderValue, Response, StatusCode},
    response::{Html, IntoResponse},
    Form,
};
use serde::Deserialize;

use crate::components::{View, ViewData};
use crate::errors::WikiError;
use crate::logger::Action;
use crate::types::{AppState, Page, Title};
use crate::utils::{content_type_for, is_safe_relative_path};

/// Name of the form field holding the page body
pub const BODY_FIELD: &str = "body";

#[derive(Debug, Deserialize)]
struct BodyField {
    body: Option<String>,
}

/// Body submitted to `/save/<title>`.
///
/// The field is read from a urlencoded or multipart body first, then from the
/// query string. Anything else, including a request with no content type,
/// yields an empty body, so extraction never rejects.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SaveForm {
    pub body: String,
}

#[async_trait]
impl<S> FromRequest<S> for SaveForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<BodyField>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(fields)| fields.body);

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let from_body = if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<BodyField>::from_request(req, state).await {
                Ok(Form(fields)) => fields.body,
                Err(e) => {
                    log::debug!("Ignoring unreadable form body: {}", e);
                    None
                }
            }
        } else if content_type.starts_with("multipart/form-data") {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => multipart_body(multipart).await,
                Err(e) => {
                    log::debug!("Ignoring unreadable multipart body: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self { body: from_body.or(from_query).unwrap_or_default() })
    }
}

async fn multipart_body(mut multipart: Multipart) -> Option<String> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some(BODY_FIELD) {
            return field.text().await.ok();
        }
    }
    None
}

/// Where a request came from, as reported by a proxy or the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| *addr);
        Ok(Self(client_origin(&parts.headers, peer)))
    }
}

/// Proxy headers win over the peer address
fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(origin) = forwarded {
        return origin.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(origin) = real_ip {
        return origin.to_string();
    }

    peer.map(|addr| addr.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn log_access(state: &AppState, title: &Title, action: Action, origin: &ClientOrigin) {
    if let Some(access_log) = &state.access_log {
        access_log.record(title, action, &origin.0);
    }
}

fn render(state: &AppState, view: View, data: ViewData<'_>) -> Result<Response<Body>, WikiError> {
    let html = state.renderer.render(view, &data).inspect_err(|e| {
        log::error!("Rendering {} failed: {}", view.name(), e);
    })?;
    Ok(Html(html).into_response())
}

fn found(location: &str) -> Response<Body> {
    let mut resp = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        resp.headers_mut().insert(header::LOCATION, value);
    }
    resp
}

/// Handle `/`: list every known page
pub async fn handle_root(State(state): State<AppState>) -> Result<Response<Body>, WikiError> {
    let titles = state.catalog.list().await.inspect_err(|e| {
        log::error!("Catalog listing failed: {}", e);
    })?;
    log::debug!("Rendering index with {} pages", titles.len());
    render(&state, View::Index, ViewData::Titles(&titles))
}

/// Handle `/view/<title>`
pub async fn handle_view(
    State(state): State<AppState>,
    origin: ClientOrigin,
    title: Title,
) -> Result<Response<Body>, WikiError> {
    log_access(&state, &title, Action::View, &origin);
    match state.store.load(&title).await {
        Ok(page) => render(&state, View::View, ViewData::Page(&page)),
        Err(_) => {
            log::debug!("Page '{}' not found, rendering notfound view", title);
            render(&state, View::NotFound, ViewData::Page(&Page::blank(title)))
        }
    }
}

/// Handle `/edit/<title>`: the form is prefilled when the page exists
pub async fn handle_edit(
    State(state): State<AppState>,
    origin: ClientOrigin,
    title: Title,
) -> Result<Response<Body>, WikiError> {
    log_access(&state, &title, Action::Edit, &origin);
    let page = match state.store.load(&title).await {
        Ok(page) => page,
        Err(_) => Page::blank(title),
    };
    render(&state, View::Edit, ViewData::Page(&page))
}

/// Handle `/save/<title>`: persist the submitted body, then show the page
pub async fn handle_save(
    State(state): State<AppState>,
    origin: ClientOrigin,
    title: Title,
    form: SaveForm,
) -> Result<Response<Body>, WikiError> {
    log_access(&state, &title, Action::Save, &origin);
    let page = Page::new(title, form.body.into_bytes());
    state.store.save(&page).await.inspect_err(|e| {
        log::error!("Saving page '{}' failed: {}", page.title, e);
    })?;
    log::info!("Saved page '{}'", page.title);
    Ok(found(&format!("/view/{}", page.title)))
}

/// Handle `/js/<path>`
pub async fn handle_js(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response<Body>, WikiError> {
    serve_asset(&state, "js", &path).await
}

/// Handle `/css/<path>`
pub async fn handle_css(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response<Body>, WikiError> {
    serve_asset(&state, "css", &path).await
}

/// Any other path goes back to the index
pub async fn handle_fallback() -> Response<Body> {
    found("/")
}

async fn serve_asset(state: &AppState, kind: &str, path: &str) -> Result<Response<Body>, WikiError> {
    if !is_safe_relative_path(path) {
        log::warn!("Rejected asset path '{}/{}'", kind, path);
        return Err(WikiError::InvalidPath);
    }

    let requested = state.static_dir.join(kind).join(path);
    if !tokio::fs::metadata(&requested).await.map(|m| m.is_file()).unwrap_or(false) {
        log::debug!("Asset not found: {:?}", requested);
        return Err(WikiError::NotFound);
    }

    let bytes = tokio::fs::read(&requested).await?;
    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&requested)),
    );
    Ok(resp)
}
