#![forbid(unsafe_code)]

//! Persistence backends.
//!
//! - [`MemoryBackend`]: an in-process page table with failure injection.
//! - [`JsonFileBackend`]: the whole page table in one JSON file.
//!
//! # File format
//!
//! ```json
//! {
//!   "version": 1,
//!   "pages": [
//!     { "id": "about", "title": "About", "slug": "about", "parent_id": null,
//!       "order_index": 0, "is_active": true, "show_in_menu": true }
//!   ]
//! }
//! ```
//!
//! # Atomic writes
//!
//! Every write goes to a sibling temp file which is then renamed over the
//! target, so a failed write leaves the previous file intact.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sitetree_core::{
    DeleteReport, DeleteStrategy, OrderUpdate, Page, PageDraft, PageId, PageStore,
};

use crate::error::GatewayError;
use crate::gateway::{MoveRequest, PageRepository, PersistRequest, PersistenceGateway};

/// Current file format version.
const FORMAT_VERSION: u64 = 1;

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-process page table.
///
/// Failures can be queued with [`fail_next`](Self::fail_next) (the next write
/// is rejected) or forced with [`set_offline`](Self::set_offline) (every call
/// is unavailable). Accepted gateway requests are recorded in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: PageStore,
    rejections: VecDeque<String>,
    offline: bool,
    attempts: usize,
    accepted: Vec<PersistRequest>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new(store: PageStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn from_pages(pages: Vec<Page>) -> Result<Self, GatewayError> {
        Ok(Self::new(PageStore::from_pages(pages)?))
    }

    /// Reject the next write with `message`. Calls queue up.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.rejections.push_back(message.into());
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    #[must_use]
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Gateway calls received, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Gateway requests that were applied, oldest first.
    #[must_use]
    pub fn accepted(&self) -> &[PersistRequest] {
        &self.accepted
    }

    fn check_reachable(&self) -> Result<(), GatewayError> {
        if self.offline {
            return Err(GatewayError::Unavailable("memory backend is offline".into()));
        }
        Ok(())
    }

    fn check_write(&mut self) -> Result<(), GatewayError> {
        self.check_reachable()?;
        match self.rejections.pop_front() {
            Some(message) => Err(GatewayError::Rejected(message)),
            None => Ok(()),
        }
    }

    fn apply(&mut self, request: PersistRequest) -> Result<(), GatewayError> {
        self.attempts += 1;
        self.check_write()?;
        request.apply_to(&mut self.store)?;
        tracing::debug!(
            target: "sitetree.gateway",
            backend = "memory",
            updates = request.updates().len(),
            "request applied"
        );
        self.accepted.push(request);
        Ok(())
    }
}

impl PersistenceGateway for MemoryBackend {
    fn reorder(&mut self, updates: &[OrderUpdate]) -> Result<(), GatewayError> {
        self.apply(PersistRequest::Reorder {
            updates: updates.to_vec(),
        })
    }

    fn move_page(&mut self, request: &MoveRequest) -> Result<(), GatewayError> {
        self.apply(PersistRequest::Move(request.clone()))
    }
}

impl PageRepository for MemoryBackend {
    fn list_pages(&mut self) -> Result<Vec<Page>, GatewayError> {
        self.check_reachable()?;
        Ok(self.store.pages().to_vec())
    }

    fn create_page(&mut self, draft: PageDraft) -> Result<Page, GatewayError> {
        self.check_write()?;
        Ok(self.store.create(draft)?.clone())
    }

    fn set_active(&mut self, page: &PageId, active: bool) -> Result<(), GatewayError> {
        self.check_write()?;
        Ok(self.store.set_active(page, active)?)
    }

    fn set_show_in_menu(&mut self, page: &PageId, show: bool) -> Result<(), GatewayError> {
        self.check_write()?;
        Ok(self.store.set_show_in_menu(page, show)?)
    }

    fn delete_page(
        &mut self,
        page: &PageId,
        strategy: DeleteStrategy,
    ) -> Result<DeleteReport, GatewayError> {
        self.check_write()?;
        Ok(self.store.delete(page, strategy)?)
    }
}

// ============================================================================
// JsonFileBackend
// ============================================================================

/// On-disk representation of the page table.
#[derive(Debug, Serialize, Deserialize)]
struct PageFile {
    version: u64,
    pages: Vec<Page>,
}

/// Page table stored as one JSON file.
///
/// Every operation reads the file, applies the change to a [`PageStore`],
/// and writes the whole table back.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the page table. A missing file is an empty table.
    pub fn load(&self) -> Result<PageStore, GatewayError> {
        Ok(PageStore::from_pages(load_pages(&self.path)?)?)
    }

    /// Replace the page table with `store`.
    pub fn save(&self, store: &PageStore) -> Result<(), GatewayError> {
        save_pages(store.pages(), &self.path)
    }

    fn update<T>(
        &self,
        change: impl FnOnce(&mut PageStore) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut store = self.load()?;
        let out = change(&mut store)?;
        self.save(&store)?;
        Ok(out)
    }
}

impl PersistenceGateway for JsonFileBackend {
    fn reorder(&mut self, updates: &[OrderUpdate]) -> Result<(), GatewayError> {
        let request = PersistRequest::Reorder {
            updates: updates.to_vec(),
        };
        self.update(|store| request.apply_to(store))?;
        tracing::debug!(
            target: "sitetree.gateway",
            backend = "json",
            path = %self.path.display(),
            updates = updates.len(),
            "reorder written"
        );
        Ok(())
    }

    fn move_page(&mut self, request: &MoveRequest) -> Result<(), GatewayError> {
        let batch = PersistRequest::Move(request.clone());
        self.update(|store| batch.apply_to(store))?;
        tracing::debug!(
            target: "sitetree.gateway",
            backend = "json",
            path = %self.path.display(),
            page = %request.page_id,
            updates = request.updates.len(),
            "move written"
        );
        Ok(())
    }
}

impl PageRepository for JsonFileBackend {
    fn list_pages(&mut self) -> Result<Vec<Page>, GatewayError> {
        load_pages(&self.path)
    }

    fn create_page(&mut self, draft: PageDraft) -> Result<Page, GatewayError> {
        self.update(|store| Ok(store.create(draft)?.clone()))
    }

    fn set_active(&mut self, page: &PageId, active: bool) -> Result<(), GatewayError> {
        self.update(|store| Ok(store.set_active(page, active)?))
    }

    fn set_show_in_menu(&mut self, page: &PageId, show: bool) -> Result<(), GatewayError> {
        self.update(|store| Ok(store.set_show_in_menu(page, show)?))
    }

    fn delete_page(
        &mut self,
        page: &PageId,
        strategy: DeleteStrategy,
    ) -> Result<DeleteReport, GatewayError> {
        self.update(|store| Ok(store.delete(page, strategy)?))
    }
}

/// Read pages from `path`.
///
/// - **Missing file** returns an empty list.
/// - **Corrupted file** returns [`GatewayError::Json`].
/// - **Version mismatch** returns [`GatewayError::Io`] with `InvalidData`.
pub fn load_pages(path: &Path) -> Result<Vec<Page>, GatewayError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let file: PageFile = serde_json::from_str(&contents)?;
    if file.version != FORMAT_VERSION {
        return Err(GatewayError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "unsupported page file version: {} (expected {FORMAT_VERSION})",
                file.version
            ),
        )));
    }
    Ok(file.pages)
}

/// Write pages to `path` via temp file and rename. Pages are written
/// grouped by parent and in sibling order so diffs stay readable.
pub fn save_pages(pages: &[Page], path: &Path) -> Result<(), GatewayError> {
    let mut pages = pages.to_vec();
    pages.sort_by(|a, b| {
        (&a.parent_id, a.order_index, &a.id).cmp(&(&b.parent_id, b.order_index, &b.id))
    });
    let file = PageFile {
        version: FORMAT_VERSION,
        pages,
    };
    let json = serde_json::to_string_pretty(&file)?;

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, json)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}
