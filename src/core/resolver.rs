use crate::core::types::WordRecord;
use crate::env::CollectionRegistry;

/// Reserved keys naming derived views instead of real collections. Never a
/// valid origin for a tracked word.
const VIRTUAL_KEYS: [&str; 3] = ["mistakes", "fav", "favorites"];

pub fn is_virtual_key(key: &str) -> bool {
    VIRTUAL_KEYS.iter().any(|v| key.eq_ignore_ascii_case(v))
}

/// Lowercased two-letter language prefix of a source key (`en_basics` ->
/// `en`). Keys without the `xx_` shape are language-agnostic.
pub fn lang_of_key(key: &str) -> Option<String> {
    let bytes = key.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b'_'
    {
        Some(key[..2].to_ascii_lowercase())
    } else {
        None
    }
}

/// Derives the origin key for a word being recorded. Precedence: the explicit
/// argument, then the origin-key fields carried on the word, then the
/// registry's active key when it is a real collection. Whatever wins must be
/// non-empty and not virtual, otherwise resolution fails as a whole.
pub fn extract_source_key(
    word: Option<&WordRecord>,
    explicit: Option<&str>,
    registry: &dyn CollectionRegistry,
) -> Option<String> {
    let candidate = explicit
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            word.and_then(|w| w.mistake_source_key.clone())
                .filter(|k| !k.is_empty())
        })
        .or_else(|| {
            word.and_then(|w| w.favorite_source_key.clone())
                .filter(|k| !k.is_empty())
        })
        .or_else(|| {
            registry
                .active_key()
                .filter(|k| !k.is_empty() && !is_virtual_key(k))
        })?;
    if is_virtual_key(&candidate) {
        return None;
    }
    Some(candidate)
}
