use crate::core::deck;
use crate::core::resolver;
use crate::core::types::{
    ensure_bucket, Bucket, MistakesDoc, MistakesStats, WordRecord, DEFAULT_STUDY_LANG,
    DEFAULT_UI_LANG,
};
use crate::env::AppEnv;
use crate::persistence::{FileStore, StorageBackend};
use std::path::PathBuf;

/// The mistakes tracker: a scoped, durable index of wrongly answered words,
/// plus the derived deck over it.
///
/// Every operation is total. Resolution failures, policy rejections and
/// storage faults all degrade to a no-op (logged, never surfaced), so the
/// tracker can sit in the middle of a drill without ever interrupting it.
/// The document is re-read on every operation and written back in the same
/// synchronous section; nothing is cached between calls.
pub struct MistakesTracker {
    store: Box<dyn StorageBackend>,
    env: AppEnv,
}

impl MistakesTracker {
    pub fn new(store: Box<dyn StorageBackend>, env: AppEnv) -> Self {
        Self { store, env }
    }

    pub fn with_file(path: impl Into<PathBuf>, env: AppEnv) -> Self {
        Self::new(Box::new(FileStore::new(path)), env)
    }

    // --- active scope ----------------------------------------------------

    fn ui_lang(&self) -> String {
        self.env
            .locale
            .ui_lang()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_UI_LANG.to_string())
    }

    /// Study language from settings, else the language prefix of the active
    /// collection, else the default.
    fn study_lang(&self) -> String {
        self.env
            .locale
            .study_lang()
            .filter(|l| !l.is_empty())
            .or_else(|| {
                self.env
                    .registry
                    .active_key()
                    .and_then(|k| resolver::lang_of_key(&k))
            })
            .unwrap_or_else(|| DEFAULT_STUDY_LANG.to_string())
    }

    // --- document --------------------------------------------------------

    fn load_doc(&self) -> MistakesDoc {
        let payload = match self.store.read() {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("mistakes: {err}");
                None
            }
        };
        let payload = match payload {
            Some(payload) => payload,
            None => return MistakesDoc::new(),
        };
        match serde_json::from_str(&payload) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("mistakes: stored document unreadable, starting empty: {err}");
                MistakesDoc::new()
            }
        }
    }

    fn save_doc(&mut self, doc: &MistakesDoc) {
        let payload = match serde_json::to_string(doc) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("mistakes: document serialization failed: {err}");
                return;
            }
        };
        if let Err(err) = self.store.write(&payload) {
            log::warn!("mistakes: {err}");
        }
    }

    fn active_bucket(&self) -> Bucket {
        let mut doc = self.load_doc();
        ensure_bucket(&mut doc, &self.ui_lang(), &self.study_lang()).clone()
    }

    // --- mutations -------------------------------------------------------

    /// Records a wrongly answered word under its resolved origin key.
    ///
    /// Silent no-op when the id is blank, no real origin key can be derived,
    /// the word is a favorite, the key's language prefix conflicts with the
    /// active study language, the registry knows no collection behind the
    /// key, or the id is already recorded. Membership of the id in the
    /// backing collection is not required here; the deck checks it at read
    /// time.
    pub fn add(&mut self, id: &str, word: Option<&WordRecord>, explicit_key: Option<&str>) {
        if id.is_empty() {
            return;
        }
        let key = match resolver::extract_source_key(word, explicit_key, self.env.registry.as_ref())
        {
            Some(key) => key,
            None => {
                log::debug!("mistakes: add({id}) dropped, no usable source key");
                return;
            }
        };
        if self.env.favorites.is_favorite(Some(key.as_str()), id) {
            log::debug!("mistakes: add({id}) dropped, word is a favorite");
            return;
        }
        let study = self.study_lang();
        if let Some(key_lang) = resolver::lang_of_key(&key) {
            if key_lang != study {
                log::debug!(
                    "mistakes: add({id}) dropped, key {key} is {key_lang} but study language is {study}"
                );
                return;
            }
        }
        if self.env.registry.resolve_by_key(&key).is_none() {
            log::debug!("mistakes: add({id}) dropped, no collection behind {key}");
            return;
        }

        let ui = self.ui_lang();
        let bucket_lang = resolver::lang_of_key(&key).unwrap_or(study);
        let mut doc = self.load_doc();
        let bucket = ensure_bucket(&mut doc, &ui, &bucket_lang);
        // Two-layer duplicate check: reverse index first, then the per-key
        // set, in case the two ever drift apart.
        if bucket.sources.contains_key(id) || bucket.contains(&key, id) {
            return;
        }
        bucket.insert(&key, id);
        self.save_doc(&doc);
    }

    /// Fallback add path used by the session gate when no UI-layer hook is
    /// installed. Same resolution rules as `add`.
    pub fn add_on_failure(&mut self, word: &WordRecord) {
        if word.id.is_empty() {
            return;
        }
        let id = word.id.clone();
        self.add(&id, Some(word), None);
    }

    pub fn remove(&mut self, id: &str) {
        if id.is_empty() {
            return;
        }
        let ui = self.ui_lang();
        let study = self.study_lang();
        let mut doc = self.load_doc();
        let bucket = ensure_bucket(&mut doc, &ui, &study);
        if bucket.remove(id) {
            self.save_doc(&doc);
        }
    }

    /// Resolved origin key for an id in the active bucket.
    pub fn source_key_for(&self, id: &str) -> Option<String> {
        if id.is_empty() {
            return None;
        }
        self.active_bucket().sources.get(id).cloned()
    }

    pub fn get_stars(&self, source_key: &str, id: &str) -> u32 {
        self.active_bucket()
            .stars
            .get(source_key)
            .and_then(|ratings| ratings.get(id))
            .copied()
            .unwrap_or(0)
    }

    /// Stores a rating clamped into `[0, max]`, max from the rating-scale
    /// provider.
    pub fn set_stars(&mut self, source_key: &str, id: &str, value: i64) {
        if source_key.is_empty() || id.is_empty() || resolver::is_virtual_key(source_key) {
            return;
        }
        let max = i64::from(self.env.rating.max_rating());
        let stars = value.clamp(0, max) as u32;

        let ui = self.ui_lang();
        let study = self.study_lang();
        let mut doc = self.load_doc();
        let bucket = ensure_bucket(&mut doc, &ui, &study);
        bucket
            .stars
            .entry(source_key.to_string())
            .or_default()
            .insert(id.to_string(), stars);
        self.save_doc(&doc);
    }

    /// Resets the active bucket. Other (UI language, study language) pairs
    /// are untouched.
    pub fn clear_active(&mut self) {
        let ui = self.ui_lang();
        let study = self.study_lang();
        let mut doc = self.load_doc();
        *ensure_bucket(&mut doc, &ui, &study) = Bucket::default();
        self.save_doc(&doc);
    }

    // --- derived views ---------------------------------------------------

    /// The materialized mistakes deck for the active scope. Collections are
    /// re-resolved on every call.
    pub fn deck(&self) -> Vec<WordRecord> {
        deck::materialize(&self.active_bucket(), self.env.registry.as_ref())
    }

    pub fn count(&self) -> usize {
        deck::live_count(&self.active_bucket(), self.env.registry.as_ref())
    }

    pub fn stats(&self) -> MistakesStats {
        let bucket = self.active_bucket();
        MistakesStats {
            count: deck::live_count(&bucket, self.env.registry.as_ref()),
            tracked: bucket.sources.len(),
            collections: bucket.items.len(),
        }
    }

    /// Favorites probe for a raw word, keyed by the word's own origin when it
    /// carries one, else the active collection.
    pub fn is_favorite_word(&self, word: &WordRecord) -> bool {
        if word.id.is_empty() {
            return false;
        }
        let key = word
            .mistake_source_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.env
                    .registry
                    .active_key()
                    .filter(|k| !k.is_empty() && !resolver::is_virtual_key(k))
            });
        self.env.favorites.is_favorite(key.as_deref(), &word.id)
    }
}
