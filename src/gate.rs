use crate::core::tracker::MistakesTracker;
use crate::core::types::WordRecord;
use std::collections::{HashMap, HashSet};

/// Wrong answers before an add attempt is made. First miss triggers it.
const FAIL_THRESHOLD: u32 = 1;

/// UI-layer add path. When installed, the gate routes add attempts through
/// it instead of the built-in fallback, so layer-specific side effects keep
/// happening.
pub type AddHook = Box<dyn FnMut(&WordRecord, &mut MistakesTracker)>;

/// Converts wrong-answer events into at most one durable add per word per
/// session.
///
/// The failure counters and the confirmed set live in process memory only;
/// a restart opens a fresh session. An add counts as confirmed when
/// `source_key_for` flips from none to some across the attempt, which is the
/// only transition a successful write can produce.
pub struct SessionGate {
    fail: HashMap<String, u32>,
    added: HashSet<String>,
    hook: Option<AddHook>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            fail: HashMap::new(),
            added: HashSet::new(),
            hook: None,
        }
    }

    pub fn with_hook(hook: AddHook) -> Self {
        Self {
            hook: Some(hook),
            ..Self::new()
        }
    }

    /// Entry point for the wrong-answer signal.
    pub fn on_fail(&mut self, word: &WordRecord, tracker: &mut MistakesTracker) {
        if word.id.is_empty() {
            return;
        }
        if tracker.is_favorite_word(word) {
            return;
        }
        if self.added.contains(&word.id) {
            return;
        }

        let failures = self.fail.entry(word.id.clone()).or_insert(0);
        *failures += 1;
        if *failures < FAIL_THRESHOLD {
            return;
        }

        let before = tracker.source_key_for(&word.id);
        match self.hook.as_mut() {
            Some(hook) => hook(word, tracker),
            None => tracker.add_on_failure(word),
        }
        let after = tracker.source_key_for(&word.id);
        if before.is_none() && after.is_some() {
            self.added.insert(word.id.clone());
        }
    }

    /// Wrong answers seen for an id this session.
    pub fn failures(&self, id: &str) -> u32 {
        self.fail.get(id).copied().unwrap_or(0)
    }

    /// Whether an add for this id has been confirmed this session.
    pub fn confirmed(&self, id: &str) -> bool {
        self.added.contains(id)
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}
