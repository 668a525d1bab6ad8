mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{get, post_form, send, state_for};
use quill::{
    AppState, Backend, Config, DatabaseStore, FileStore, OpenedBackend, Page, PageCatalog,
    PageStore, StorageError, TemplateComponent, Title,
};

fn title(s: &str) -> Title {
    Title::parse(s).unwrap()
}

async fn file_state(dir: &tempfile::TempDir) -> AppState {
    let store = Arc::new(FileStore::open(dir.path().join("pages")).await.unwrap());
    state_for(store, &dir.path().join("static"))
}

async fn database_state(dir: &tempfile::TempDir, limit: usize) -> AppState {
    let store = Arc::new(DatabaseStore::connect("sqlite::memory:", limit).await.unwrap());
    state_for(store, &dir.path().join("static"))
}

async fn save_and_view(state: &AppState) {
    let resp = send(state, post_form("/save/Test", "body=hello")).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location(), Some("/view/Test"));

    let resp = send(state, get("/view/Test")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("hello"));

    let resp = send(state, get("/")).await;
    assert!(resp.body.contains("/view/Test"));
}

#[tokio::test]
async fn file_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(&dir).await;
    save_and_view(&state).await;
    assert_eq!(std::fs::read(dir.path().join("pages/Test.txt")).unwrap(), b"hello".to_vec());
}

#[tokio::test]
async fn database_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let state = database_state(&dir, 100).await;
    save_and_view(&state).await;
}

#[tokio::test]
async fn file_backend_is_case_sensitive_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(&dir).await;

    send(&state, post_form("/save/Foo", "body=upper")).await;
    let resp = send(&state, get("/view/foo")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("does not exist"));
    assert!(!resp.body.contains("upper"));
}

#[tokio::test]
async fn database_backend_folds_case_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let state = database_state(&dir, 100).await;

    send(&state, post_form("/save/Foo", "body=upper")).await;
    let resp = send(&state, get("/view/foo")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("upper"));
}

#[tokio::test]
async fn repeated_saves_leave_one_listing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let files = Arc::new(FileStore::open(dir.path().join("pages")).await.unwrap());
    let database = Arc::new(DatabaseStore::connect("sqlite::memory:", 100).await.unwrap());
    let file_store: Arc<dyn PageStore> = files.clone();
    let file_catalog: Arc<dyn PageCatalog> = files;
    let database_store: Arc<dyn PageStore> = database.clone();
    let database_catalog: Arc<dyn PageCatalog> = database;

    for (store, catalog) in [(file_store, file_catalog), (database_store, database_catalog)] {
        for _ in 0..3 {
            store.save(&Page::new(title("Same"), "content")).await.unwrap();
        }
        assert_eq!(store.load(&title("Same")).await.unwrap().body, b"content".to_vec());
        assert_eq!(catalog.list().await.unwrap(), vec!["Same".to_string()]);
    }
}

#[tokio::test]
async fn unsaved_titles_are_not_found_in_both_backends() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::open(dir.path().join("pages")).await.unwrap();
    let database = DatabaseStore::connect("sqlite::memory:", 100).await.unwrap();

    assert!(matches!(files.load(&title("Ghost")).await, Err(StorageError::NotFound)));
    assert!(matches!(database.load(&title("Ghost")).await, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn database_index_never_exceeds_catalog_bound() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DatabaseStore::connect("sqlite::memory:", 100).await.unwrap());
    for i in 0..120 {
        store.save(&Page::new(title(&format!("Page{i}")), "x")).await.unwrap();
    }
    assert_eq!(store.list().await.unwrap().len(), 100);

    let state = state_for(store, &dir.path().join("static"));
    let resp = send(&state, get("/")).await;
    assert_eq!(resp.body.matches("<li>").count(), 100);
}

#[tokio::test]
async fn opened_backend_follows_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::new();
    config.pages_dir = dir.path().join("pages");
    config.static_dir = dir.path().join("static");
    config.access_log = false;

    let backend = OpenedBackend::open(&config).await.unwrap();
    assert!(matches!(backend, OpenedBackend::Files(_)));
    let state = AppState::build(&config, &backend, Arc::new(TemplateComponent::new()));
    assert!(state.access_log.is_none());
    save_and_view(&state).await;
    assert!(dir.path().join("pages/Test.txt").is_file());

    config.backend = Backend::Database { url: "sqlite::memory:".to_string() };
    let backend = OpenedBackend::open(&config).await.unwrap();
    assert!(matches!(backend, OpenedBackend::Database(_)));
    let state = AppState::build(&config, &backend, Arc::new(TemplateComponent::new()));
    save_and_view(&state).await;
    backend.close().await;
}
