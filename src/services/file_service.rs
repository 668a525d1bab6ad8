use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info, warn, error};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::StorageError;
use crate::services::{PageCatalog, PageStore};
use crate::types::{is_valid_title, Page, Title};

/// Extension of page files inside the pages directory
pub const PAGE_EXTENSION: &str = "txt";

/// Page store backed by one file per page
///
/// The file name is the title verbatim, so `Foo` and `foo` are distinct pages.
#[derive(Clone, Debug)]
pub struct FileStore {
    pages_dir: PathBuf,
}

impl FileStore {
    /// Open a file store, creating the pages directory if needed
    pub async fn open(pages_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let pages_dir = pages_dir.into();
        fs::create_dir_all(&pages_dir).await.map_err(|e| {
            error!("Failed to create pages directory {:?}: {}", pages_dir, e);
            StorageError::Io(e)
        })?;
        info!("Using file store at {:?}", pages_dir);
        Ok(Self { pages_dir })
    }

    /// Storage key for a title: `<pages_dir>/<title>.txt`
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.pages_dir.join(format!("{}.{}", title.as_str(), PAGE_EXTENSION))
    }
}

#[async_trait]
impl PageStore for FileStore {
    async fn load(&self, title: &Title) -> Result<Page, StorageError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => {
                debug!("Read page {:?}, {} bytes", path, body.len());
                Ok(Page::new(title.clone(), body))
            }
            Err(e) => {
                debug!("Could not read page {:?}: {}", path, e);
                Err(StorageError::NotFound)
            }
        }
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        let path = self.path_for(&page.title);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await.map_err(|e| {
            error!("Failed to open {:?} for writing: {}", path, e);
            StorageError::Io(e)
        })?;
        file.write_all(&page.body).await?;
        file.flush().await?;
        info!("Wrote page {:?}, {} bytes", path, page.body.len());
        Ok(())
    }
}

#[async_trait]
impl PageCatalog for FileStore {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.pages_dir).await.map_err(|e| {
            error!("Failed to read directory {:?}: {}", self.pages_dir, e);
            StorageError::Io(e)
        })?;

        let mut titles = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_file = match entry.file_type().await {
                Ok(ft) => ft.is_file(),
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            if !is_file {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(PAGE_EXTENSION) {
                continue;
            }
            // Skip anything that could not have been written through a title
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_title(stem) {
                    titles.push(stem.to_string());
                }
            }
        }

        info!("Listed {:?}, found {} pages", self.pages_dir, titles.len());
        Ok(titles)
    }
}
