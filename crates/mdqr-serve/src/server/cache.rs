//! Read-through cache of the rendered page.
//!
//! The page is rendered at most once per invalidation. Rendering happens with
//! the cache lock held, so concurrent misses wait for a single render instead
//! of each reading the file.

use crate::error::{Result, ResultExt, ServeError};
use crate::server::page;
use mdqr_render::RenderOptions;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The document a cache renders, and the token baked into its reload script.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub path: PathBuf,
    pub token: Arc<str>,
}

#[derive(Default)]
struct Slot {
    source: Option<DocumentSource>,
    html: Option<Arc<str>>,
}

pub struct ContentCache {
    slot: Mutex<Slot>,
    dirty: AtomicBool,
    options: RenderOptions,
}

impl ContentCache {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            dirty: AtomicBool::new(true),
            options,
        }
    }

    /// Return the page, re-rendering it first if it is missing or stale.
    ///
    /// Blocks on file I/O and rendering; call it from a blocking worker.
    pub fn get(&self) -> Result<Arc<str>> {
        let mut slot = self.slot.lock();

        if !self.dirty.load(Ordering::Acquire) {
            if let Some(html) = &slot.html {
                return Ok(Arc::clone(html));
            }
        }

        let source = slot.source.clone().ok_or(ServeError::NoDocument)?;

        // Cleared before reading so a change landing mid-render marks it stale again.
        let stale = StaleUnlessRendered::clear(&self.dirty);
        let html: Arc<str> = Arc::from(render_page(&source, &self.options)?);
        stale.rendered();

        slot.html = Some(Arc::clone(&html));
        tracing::debug!(path = %source.path.display(), bytes = html.len(), "rendered page");
        Ok(html)
    }

    /// Mark the page stale. The next `get` re-renders.
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Drop the page and unbind the document.
    pub fn reset(&self) {
        let mut slot = self.slot.lock();
        slot.html = None;
        slot.source = None;
        self.dirty.store(true, Ordering::Release);
    }

    /// Reset, then bind to a new document.
    pub fn bind(&self, source: DocumentSource) {
        let mut slot = self.slot.lock();
        slot.html = None;
        slot.source = Some(source);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn bound_path(&self) -> Option<PathBuf> {
        self.slot.lock().source.as_ref().map(|s| s.path.clone())
    }
}

/// Clears the dirty flag for the length of a render and sets it again when
/// dropped, unless the render finished. Covers both errors and panics.
struct StaleUnlessRendered<'a> {
    dirty: &'a AtomicBool,
    armed: bool,
}

impl<'a> StaleUnlessRendered<'a> {
    fn clear(dirty: &'a AtomicBool) -> Self {
        dirty.store(false, Ordering::Release);
        Self { dirty, armed: true }
    }

    fn rendered(mut self) {
        self.armed = false;
    }
}

impl Drop for StaleUnlessRendered<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.dirty.store(true, Ordering::Release);
        }
    }
}

fn render_page(source: &DocumentSource, options: &RenderOptions) -> Result<String> {
    let markdown = std::fs::read_to_string(&source.path).with_path(&source.path)?;
    let body = mdqr_render::render_with_options(&markdown, options)?;

    Ok(page::build_html_document(
        &document_title(&source.path),
        &body,
        &source.token,
    ))
}

fn document_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
