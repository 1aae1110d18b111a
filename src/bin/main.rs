use crossterm::style::Stylize;
use mistakes_core::env::{AppEnv, CollectionRegistry, DefaultScale, NoFavorites, StaticLocale};
use mistakes_core::{MistakesTracker, SessionGate, WordRecord};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{stdin, stdout, Write};
use std::rc::Rc;

const STORE_PATH: &str = "mistakes.v4.json";

fn main() {
    let decks = demo_decks();
    let active = Rc::new(RefCell::new(Some("en_basics".to_string())));
    let env = AppEnv {
        locale: Box::new(StaticLocale {
            ui: Some("ru".to_string()),
            // Unset on purpose: the study language follows the prefix of the
            // active deck, like it does when the settings layer is silent.
            study: None,
        }),
        registry: Box::new(DemoRegistry {
            decks: decks.clone(),
            active: active.clone(),
        }),
        favorites: Box::new(NoFavorites),
        rating: Box::new(DefaultScale),
    };
    let mut tracker = MistakesTracker::with_file(STORE_PATH, env);
    let mut gate = SessionGate::new();

    println!("{}", "Lexitron mistakes trainer".bold());
    println!("Mistakes persist in '{STORE_PATH}'. Type 'help' for commands.");

    loop {
        print!("> ");
        stdout().flush().unwrap();
        let mut input = String::new();
        if stdin().read_line(&mut input).unwrap() == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            [] => {}
            ["help"] => print_help(),
            ["decks"] => {
                let current = active.borrow().clone().unwrap_or_default();
                let mut keys: Vec<&String> = decks.keys().collect();
                keys.sort();
                for key in keys {
                    let marker = if *key == current { "*" } else { " " };
                    println!("  {marker} {key} ({} words)", decks[key].len());
                }
            }
            ["use", key] => {
                if decks.contains_key(*key) {
                    *active.borrow_mut() = Some(key.to_string());
                    println!("active deck: {key}");
                } else {
                    println!("{}", "no such deck".red());
                }
            }
            ["drill"] => drill(&decks, &active, &mut tracker, &mut gate),
            ["mistakes"] => show_mistakes(&tracker),
            ["star", id, value] => match (tracker.source_key_for(id), value.parse::<i64>()) {
                (Some(key), Ok(v)) => {
                    tracker.set_stars(&key, id, v);
                    println!("{id}: {} star(s)", tracker.get_stars(&key, id));
                }
                (None, _) => println!("{}", "not a tracked mistake".red()),
                (_, Err(_)) => println!("{}", "stars must be a number".red()),
            },
            ["remove", id] => {
                tracker.remove(id);
                println!("removed {id}");
            }
            ["clear"] => {
                tracker.clear_active();
                println!("active scope cleared");
            }
            ["stats"] => {
                let stats = tracker.stats();
                println!(
                    "live: {}, tracked: {}, collections: {}",
                    stats.count, stats.tracked, stats.collections
                );
            }
            ["quit"] | ["exit"] => break,
            _ => println!("{}", "unknown command, try 'help'".yellow()),
        }
    }
}

fn drill(
    decks: &HashMap<String, Vec<WordRecord>>,
    active: &Rc<RefCell<Option<String>>>,
    tracker: &mut MistakesTracker,
    gate: &mut SessionGate,
) {
    let key = match active.borrow().clone() {
        Some(key) => key,
        None => {
            println!("no active deck, pick one with 'use'");
            return;
        }
    };
    let words = decks.get(&key).cloned().unwrap_or_default();
    println!("drilling '{key}', translate into Russian:");

    for word in &words {
        let term = word.field("term").unwrap_or("?");
        let expected = word.field("translation").unwrap_or("");
        print!("  {} = ", term.bold());
        stdout().flush().unwrap();

        let mut answer = String::new();
        if stdin().read_line(&mut answer).unwrap() == 0 {
            return;
        }
        if answer.trim().to_lowercase() == expected.to_lowercase() {
            println!("  {}", "correct".green());
        } else {
            println!("  {} {expected}", "wrong:".red());
            gate.on_fail(word, tracker);
        }
    }
    println!("done, {} mistake(s) tracked in this scope", tracker.count());
}

fn show_mistakes(tracker: &MistakesTracker) {
    let deck = tracker.deck();
    if deck.is_empty() {
        println!("no mistakes in the active scope");
        return;
    }
    for word in &deck {
        let key = word.mistake_source_key.as_deref().unwrap_or("?");
        let stars = tracker.get_stars(key, &word.id);
        println!(
            "  {} {} = {} [{key}] {}",
            word.id,
            word.field("term").unwrap_or("?"),
            word.field("translation").unwrap_or("?"),
            "*".repeat(stars as usize)
        );
    }
    println!("{} mistake(s)", tracker.count());
}

fn print_help() {
    println!("  decks            list demo decks ('*' marks the active one)");
    println!("  use <key>        switch the active deck");
    println!("  drill            run through the active deck once");
    println!("  mistakes         show the materialized mistakes deck");
    println!("  star <id> <n>    rate a tracked mistake");
    println!("  remove <id>      untrack a mistake");
    println!("  clear            clear the active scope");
    println!("  stats            live/tracked/collection counts");
    println!("  quit             exit");
}

fn demo_word(id: &str, term: &str, translation: &str) -> WordRecord {
    let mut word = WordRecord::new(id);
    word.extra
        .insert("term".to_string(), Value::String(term.to_string()));
    word.extra.insert(
        "translation".to_string(),
        Value::String(translation.to_string()),
    );
    word
}

fn demo_decks() -> HashMap<String, Vec<WordRecord>> {
    let mut decks = HashMap::new();
    decks.insert(
        "en_basics".to_string(),
        vec![
            demo_word("en-1", "cat", "кошка"),
            demo_word("en-2", "dog", "собака"),
            demo_word("en-3", "house", "дом"),
            demo_word("en-4", "water", "вода"),
        ],
    );
    decks.insert(
        "de_basics".to_string(),
        vec![
            demo_word("de-1", "Katze", "кошка"),
            demo_word("de-2", "Hund", "собака"),
            demo_word("de-3", "Haus", "дом"),
            demo_word("de-4", "Wasser", "вода"),
        ],
    );
    // No language prefix: usable from any study language.
    decks.insert(
        "phrases".to_string(),
        vec![
            demo_word("ph-1", "good morning", "доброе утро"),
            demo_word("ph-2", "thank you", "спасибо"),
        ],
    );
    decks
}

/// Registry over the built-in demo decks. The active key is shared with the
/// command loop so 'use' switches the tracker's scope too.
struct DemoRegistry {
    decks: HashMap<String, Vec<WordRecord>>,
    active: Rc<RefCell<Option<String>>>,
}

impl CollectionRegistry for DemoRegistry {
    fn active_key(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    fn resolve_by_key(&self, key: &str) -> Option<Vec<WordRecord>> {
        self.decks.get(key).cloned()
    }
}
