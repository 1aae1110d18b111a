use crate::core::types::{WordRecord, DEFAULT_STARS_MAX};

/// Current UI language and study/dictionary language, as far as the settings
/// layer knows them. `None` means unset; the tracker applies its own
/// fallback chain.
pub trait LocaleProvider {
    fn ui_lang(&self) -> Option<String>;
    fn study_lang(&self) -> Option<String>;
}

/// The external dictionary/deck registry. `resolve_by_key` returns the full
/// word list behind a real source key, or `None` when no such collection is
/// addressable anymore.
pub trait CollectionRegistry {
    fn active_key(&self) -> Option<String>;
    fn resolve_by_key(&self, key: &str) -> Option<Vec<WordRecord>>;
}

/// Favorites membership. Callers that only know the id pass `None` for the
/// source key.
pub trait FavoritesIndex {
    fn is_favorite(&self, source_key: Option<&str>, id: &str) -> bool;
}

/// Upper bound of the star-rating scale.
pub trait RatingScale {
    fn max_rating(&self) -> u32 {
        DEFAULT_STARS_MAX
    }
}

/// The collaborator set a tracker runs against. Each slot has a unit default
/// below so an environment can be assembled piecemeal.
pub struct AppEnv {
    pub locale: Box<dyn LocaleProvider>,
    pub registry: Box<dyn CollectionRegistry>,
    pub favorites: Box<dyn FavoritesIndex>,
    pub rating: Box<dyn RatingScale>,
}

impl Default for AppEnv {
    fn default() -> Self {
        Self {
            locale: Box::new(StaticLocale::default()),
            registry: Box::new(EmptyRegistry),
            favorites: Box::new(NoFavorites),
            rating: Box::new(DefaultScale),
        }
    }
}

/// Fixed locale answers, mainly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticLocale {
    pub ui: Option<String>,
    pub study: Option<String>,
}

impl StaticLocale {
    pub fn new(ui: &str, study: &str) -> Self {
        Self {
            ui: Some(ui.to_string()),
            study: Some(study.to_string()),
        }
    }
}

impl LocaleProvider for StaticLocale {
    fn ui_lang(&self) -> Option<String> {
        self.ui.clone()
    }

    fn study_lang(&self) -> Option<String> {
        self.study.clone()
    }
}

/// Registry with no collections and no active key.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl CollectionRegistry for EmptyRegistry {
    fn active_key(&self) -> Option<String> {
        None
    }

    fn resolve_by_key(&self, _key: &str) -> Option<Vec<WordRecord>> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFavorites;

impl FavoritesIndex for NoFavorites {
    fn is_favorite(&self, _source_key: Option<&str>, _id: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScale;

impl RatingScale for DefaultScale {}
