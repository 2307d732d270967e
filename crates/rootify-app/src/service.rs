use std::sync::Arc;

use rootify_core::{Segment, Snapshot};
use rootify_lang_chinese::TranslationEngine;
use rootify_store::{Result, WordRootStore};

/// Operations offered to the front-end.
///
/// Every text operation takes a fresh snapshot from the store and runs the
/// engine over that copy, so segmentation never holds the store lock.
#[derive(Clone)]
pub struct RootService {
    store: Arc<WordRootStore>,
}

impl RootService {
    pub fn new(store: Arc<WordRootStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WordRootStore {
        &self.store
    }

    /// Engine over the store's current contents
    pub fn engine(&self) -> Result<TranslationEngine> {
        Ok(TranslationEngine::new(self.store.get_all()?))
    }

    pub fn get_all_roots(&self) -> Result<Snapshot> {
        self.store.get_all()
    }

    pub fn add_root(&self, chinese: &str, english: &str) -> Result<()> {
        self.store.add(chinese, english)
    }

    pub fn delete_root(&self, chinese: &str) -> Result<bool> {
        self.store.delete(chinese)
    }

    pub fn clear_all_roots(&self) -> Result<usize> {
        self.store.clear_all()
    }

    pub fn import_roots<I, K, V>(&self, roots: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.store.import(roots)
    }

    pub fn export_roots(&self) -> Result<String> {
        self.store.export()
    }

    pub fn segment_text(&self, text: &str) -> Result<Vec<Segment>> {
        Ok(self.engine()?.segment(text))
    }

    pub fn translate_text(&self, text: &str) -> Result<String> {
        Ok(self.engine()?.translate(text))
    }

    pub fn is_translation_complete(&self, text: &str) -> Result<bool> {
        Ok(self.engine()?.is_complete(text))
    }
}
