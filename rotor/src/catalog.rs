use crate::errors::RotorError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// The agent catalog document: an ordered list of user agent strings plus
/// metadata about when and how the list was generated. Immutable once loaded.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Catalog {
    /// Date the list was generated
    pub updated: String,
    /// Entry count recorded by the generator; `useragents.len()` is
    /// authoritative
    #[serde(default)]
    pub count: u64,
    /// Selection policy label, e.g. "chrome" or "mix"
    pub browser_choice: String,
    pub useragents: Vec<String>,
}

impl Catalog {
    pub fn total(&self) -> i64 {
        self.useragents.len() as i64
    }

    /// Looks up an entry by 1-based index.
    pub fn agent(&self, index: i64) -> Option<&str> {
        if index < 1 {
            return None;
        }
        self.useragents.get(index as usize - 1).map(String::as_str)
    }
}

/// Process-lifetime catalog cache with lazy initialization.
///
/// The first successful load is kept for the remaining lifetime of the
/// process and never re-read or invalidated. A failed load leaves the cell
/// empty, so the failure is per-request and a later request may succeed.
/// Concurrent first requests initialize the cell exactly once.
pub struct CatalogCache {
    path: PathBuf,
    cell: OnceCell<Catalog>,
}

impl CatalogCache {
    pub fn new(path: PathBuf) -> Self {
        CatalogCache {
            path,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&Catalog, RotorError> {
        self.cell
            .get_or_try_init(|| async {
                let catalog = load(&self.path).await?;
                tracing::info!(
                    path = %self.path.display(),
                    total = catalog.total(),
                    updated = %catalog.updated,
                    "agent catalog loaded"
                );
                Ok(catalog)
            })
            .await
    }
}

async fn load(path: &Path) -> Result<Catalog, RotorError> {
    let catalog_error = |reason: String| RotorError::CatalogLoad {
        path: path.display().to_string(),
        reason,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| catalog_error(e.to_string()))?;
    let catalog: Catalog =
        serde_json::from_slice(&bytes).map_err(|e| catalog_error(e.to_string()))?;

    // A zero-length list would make the wraparound arithmetic divide by
    // zero; reject it here so the handler never sees it.
    if catalog.useragents.is_empty() {
        return Err(RotorError::EmptyCatalog);
    }

    Ok(catalog)
}
