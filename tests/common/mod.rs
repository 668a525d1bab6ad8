#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use quill::{
    create_router, AppState, Page, PageCatalog, PageStore, RequestLogger, StorageError,
    TemplateComponent, Title,
};

/// In-memory store that counts every call and can be told to fail writes
#[derive(Default)]
pub struct CountingStore {
    pages: Mutex<HashMap<String, Vec<u8>>>,
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
    pub lists: AtomicUsize,
    failing: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saves and listings fail with an I/O error
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    pub fn with_page(self, title: &str, body: &str) -> Self {
        self.pages.lock().unwrap().insert(title.to_string(), body.as_bytes().to_vec());
        self
    }

    pub fn calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst) + self.saves.load(Ordering::SeqCst) + self.lists.load(Ordering::SeqCst)
    }

    pub fn body_of(&self, title: &str) -> Option<Vec<u8>> {
        self.pages.lock().unwrap().get(title).cloned()
    }
}

#[async_trait]
impl PageStore for CountingStore {
    async fn load(&self, title: &Title) -> Result<Page, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(title.as_str())
            .map(|body| Page::new(title.clone(), body.clone()))
            .ok_or(StorageError::NotFound)
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.pages.lock().unwrap().insert(page.title.to_string(), page.body.clone());
        Ok(())
    }
}

#[async_trait]
impl PageCatalog for CountingStore {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StorageError::Io(std::io::Error::other("directory vanished")));
        }
        let mut titles: Vec<String> = self.pages.lock().unwrap().keys().cloned().collect();
        titles.sort();
        Ok(titles)
    }
}

/// Application state over any store/catalog pair with the built-in templates
pub fn state_for<S>(store: Arc<S>, static_dir: &Path) -> AppState
where
    S: PageStore + PageCatalog + 'static,
{
    AppState {
        store: store.clone(),
        catalog: store,
        renderer: Arc::new(TemplateComponent::new()),
        access_log: Some(RequestLogger::new()),
        static_dir: Arc::new(static_dir.to_path_buf()),
    }
}

pub fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub fn post(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(state: &AppState, req: Request<Body>) -> TestResponse {
    let resp = app(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}
