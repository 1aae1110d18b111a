use crate::core::types::{Bucket, WordRecord};
use crate::env::CollectionRegistry;
use std::collections::{HashMap, HashSet};

/// Builds the effective virtual deck for one bucket against live registry
/// content. Keys whose collection is gone or empty are skipped wholesale,
/// and stored ids with no matching live word are dropped; the stored entries
/// themselves stay untouched, so a collection that comes back later
/// resurfaces its words. Each emitted record is a copy annotated with its
/// origin key.
pub fn materialize(bucket: &Bucket, registry: &dyn CollectionRegistry) -> Vec<WordRecord> {
    let mut out = Vec::new();
    for (key, ids) in &bucket.items {
        let words = registry.resolve_by_key(key).unwrap_or_default();
        if words.is_empty() {
            continue;
        }
        let by_id: HashMap<&str, &WordRecord> =
            words.iter().map(|w| (w.id.as_str(), w)).collect();
        for id in ids.keys() {
            if let Some(word) = by_id.get(id.as_str()) {
                let mut copy = (*word).clone();
                if copy.mistake_source_key.is_none() {
                    copy.mistake_source_key = Some(key.clone());
                }
                out.push(copy);
            }
        }
    }
    out
}

/// Number of stored ids that currently resolve to a live word. Applies the
/// same collection and membership checks as `materialize`, so the two always
/// agree on cardinality.
pub fn live_count(bucket: &Bucket, registry: &dyn CollectionRegistry) -> usize {
    let mut n = 0;
    for (key, ids) in &bucket.items {
        let words = registry.resolve_by_key(key).unwrap_or_default();
        if words.is_empty() {
            continue;
        }
        let have: HashSet<&str> = words.iter().map(|w| w.id.as_str()).collect();
        n += ids.keys().filter(|id| have.contains(id.as_str())).count();
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{word, SharedRegistry};

    fn bucket_with(entries: &[(&str, &str)]) -> Bucket {
        let mut bucket = Bucket::default();
        for (key, id) in entries {
            bucket.insert(key, id);
        }
        bucket
    }

    #[test]
    fn annotates_copies_with_their_origin_key() {
        let registry = SharedRegistry::new();
        registry.put_deck("en_basics", vec![word("1"), word("2")]);
        let bucket = bucket_with(&[("en_basics", "1")]);

        let deck = materialize(&bucket, &registry);
        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].id, "1");
        assert_eq!(deck[0].mistake_source_key.as_deref(), Some("en_basics"));
        // The registry's own copy stays unannotated.
        assert_eq!(
            registry.resolve_by_key("en_basics").unwrap()[0].mistake_source_key,
            None
        );
    }

    #[test]
    fn keeps_an_existing_origin_annotation() {
        let registry = SharedRegistry::new();
        let mut tagged = word("1");
        tagged.mistake_source_key = Some("en_merged".to_string());
        registry.put_deck("en_basics", vec![tagged]);
        let bucket = bucket_with(&[("en_basics", "1")]);

        let deck = materialize(&bucket, &registry);
        assert_eq!(deck[0].mistake_source_key.as_deref(), Some("en_merged"));
    }

    #[test]
    fn skips_missing_and_empty_collections() {
        let registry = SharedRegistry::new();
        registry.put_deck("en_empty", vec![]);
        let bucket = bucket_with(&[("en_gone", "1"), ("en_empty", "2")]);

        assert!(materialize(&bucket, &registry).is_empty());
        assert_eq!(live_count(&bucket, &registry), 0);
    }

    #[test]
    fn drops_ids_with_no_live_word() {
        let registry = SharedRegistry::new();
        registry.put_deck("en_basics", vec![word("1")]);
        let bucket = bucket_with(&[("en_basics", "1"), ("en_basics", "99")]);

        let deck = materialize(&bucket, &registry);
        assert_eq!(deck.len(), 1);
        assert_eq!(live_count(&bucket, &registry), deck.len());
    }
}
