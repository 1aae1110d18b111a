//! Shared collaborator stubs for unit tests. Everything here is `Rc`-backed
//! so a test can keep a handle and mutate external state after the tracker
//! took its boxed copy.

use crate::core::types::WordRecord;
use crate::env::{
    AppEnv, CollectionRegistry, DefaultScale, FavoritesIndex, NoFavorites, RatingScale,
    StaticLocale,
};
use crate::persistence::{StorageBackend, StoreError};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub fn word(id: &str) -> WordRecord {
    WordRecord::new(id)
}

pub fn word_with_key(id: &str, key: &str) -> WordRecord {
    WordRecord::with_source_key(id, key)
}

pub fn env(ui: &str, study: &str, registry: &SharedRegistry) -> AppEnv {
    AppEnv {
        locale: Box::new(StaticLocale::new(ui, study)),
        registry: Box::new(registry.clone()),
        favorites: Box::new(NoFavorites),
        rating: Box::new(DefaultScale),
    }
}

pub fn env_with(
    ui: &str,
    study: &str,
    registry: &SharedRegistry,
    favorites: &SharedFavorites,
) -> AppEnv {
    AppEnv {
        locale: Box::new(StaticLocale::new(ui, study)),
        registry: Box::new(registry.clone()),
        favorites: Box::new(favorites.clone()),
        rating: Box::new(DefaultScale),
    }
}

#[derive(Default)]
struct RegistryState {
    decks: HashMap<String, Vec<WordRecord>>,
    active: Option<String>,
}

/// Mutable in-memory collection registry.
#[derive(Clone, Default)]
pub struct SharedRegistry(Rc<RefCell<RegistryState>>);

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_deck(&self, key: &str, words: Vec<WordRecord>) {
        self.0.borrow_mut().decks.insert(key.to_string(), words);
    }

    pub fn drop_deck(&self, key: &str) {
        self.0.borrow_mut().decks.remove(key);
    }

    pub fn set_active(&self, key: Option<&str>) {
        self.0.borrow_mut().active = key.map(str::to_string);
    }
}

impl CollectionRegistry for SharedRegistry {
    fn active_key(&self) -> Option<String> {
        self.0.borrow().active.clone()
    }

    fn resolve_by_key(&self, key: &str) -> Option<Vec<WordRecord>> {
        self.0.borrow().decks.get(key).cloned()
    }
}

/// Favorites membership by id.
#[derive(Clone, Default)]
pub struct SharedFavorites(Rc<RefCell<HashSet<String>>>);

impl SharedFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, id: &str) {
        self.0.borrow_mut().insert(id.to_string());
    }
}

impl FavoritesIndex for SharedFavorites {
    fn is_favorite(&self, _source_key: Option<&str>, id: &str) -> bool {
        self.0.borrow().contains(id)
    }
}

/// A storage slot observable from outside the tracker that owns it.
#[derive(Clone, Default)]
pub struct SharedStore(Rc<RefCell<Option<String>>>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: &str) -> Self {
        Self(Rc::new(RefCell::new(Some(payload.to_string()))))
    }

    pub fn payload(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

impl StorageBackend for SharedStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.0.borrow().clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        *self.0.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}

/// Reads empty, refuses every write.
pub struct FailingStore;

impl StorageBackend for FailingStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn write(&mut self, _payload: &str) -> Result<(), StoreError> {
        Err(StoreError::Write(std::io::Error::new(
            std::io::ErrorKind::Other,
            "backend unavailable",
        )))
    }
}

pub struct FixedScale(pub u32);

impl RatingScale for FixedScale {
    fn max_rating(&self) -> u32 {
        self.0
    }
}
