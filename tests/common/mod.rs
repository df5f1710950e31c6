//! A temporary directory holding a real lookup index and a real SQLite
//! dictionary store, written with the crate's fixture writers.

#![allow(dead_code)]

use std::path::PathBuf;

use seforim_lookup::morphology::DictionaryEntry;
use seforim_lookup::testing::{BookDoc, TocDoc, append_to, write_index, write_store};
use tempfile::TempDir;

pub use seforim_lookup::testing::{book, toc};

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn index_dir(&self) -> PathBuf {
        self.dir.path().join("index")
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.dir.path().join("lexical.db")
    }

    /// Create the index, or commit to it if it already exists.
    pub fn index(&self, books: &[BookDoc], tocs: &[TocDoc]) {
        let dir = self.index_dir();
        if dir.exists() {
            append_to(&dir, books, tocs).unwrap();
        } else {
            std::fs::create_dir_all(&dir).unwrap();
            write_index(&dir, books, tocs).unwrap();
        }
    }

    /// Write `(surface, base, variants)` rows to the dictionary store.
    pub fn dictionary(&self, rows: &[(&str, &str, &[&str])]) {
        let entries: Vec<DictionaryEntry> = rows
            .iter()
            .map(|(surface, base, variants)| {
                DictionaryEntry::new(*surface, *base, variants.iter().copied())
            })
            .collect();
        write_store(&self.dictionary_path(), &entries).unwrap();
    }
}
