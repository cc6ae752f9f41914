use std::sync::{Arc, Mutex, MutexGuard};

use scrape_model::ScrapeDefinition;

/// Append-only collection shared by concurrent discovery tasks.
#[derive(Clone, Default)]
pub struct DefinitionBag {
    inner: Arc<Mutex<Vec<ScrapeDefinition>>>,
}

impl DefinitionBag {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, def: ScrapeDefinition) {
        self.lock().push(def);
    }

    pub fn extend(&self, defs: impl IntoIterator<Item = ScrapeDefinition>) {
        self.lock().extend(defs);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take everything collected so far, leaving the bag empty.
    pub fn drain(&self) -> Vec<ScrapeDefinition> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScrapeDefinition>> {
        // Writers only append, a poisoned vector is still consistent.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}
