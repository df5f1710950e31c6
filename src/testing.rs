//! Fixture writers for tests and benchmarks: a small lookup index in the
//! layout [`lookup_schema`] describes, and a dictionary store in the layout
//! [`crate::morphology::store`] reads.

use std::path::Path;

use rusqlite::Connection;
use tantivy::{Index, IndexWriter, TantivyDocument};

use crate::analysis::normalizer::normalize;
use crate::error::Result;
use crate::lookup::schema::{LookupFields, lookup_schema};
use crate::morphology::dictionary::DictionaryEntry;

#[derive(Debug, Clone)]
pub struct BookDoc {
    pub id: u64,
    pub category_id: u64,
    pub title: &'static str,
    pub is_base: bool,
    pub order_index: i64,
}

#[derive(Debug, Clone)]
pub struct TocDoc {
    pub toc_id: u64,
    pub book_id: u64,
    pub book_title: &'static str,
    pub text: &'static str,
    pub level: u64,
    pub is_base: bool,
    pub order_index: i64,
}

pub fn book(id: u64, title: &'static str, is_base: bool, order_index: i64) -> BookDoc {
    BookDoc {
        id,
        category_id: 1,
        title,
        is_base,
        order_index,
    }
}

/// An entry of `parent`'s table of contents, inheriting its sort keys.
pub fn toc(toc_id: u64, parent: &BookDoc, text: &'static str, level: u64) -> TocDoc {
    TocDoc {
        toc_id,
        book_id: parent.id,
        book_title: parent.title,
        text,
        level,
        is_base: parent.is_base,
        order_index: parent.order_index,
    }
}

/// Create a new index in the existing directory `dir`.
pub fn write_index(dir: &Path, books: &[BookDoc], tocs: &[TocDoc]) -> Result<()> {
    let index = Index::create_in_dir(dir, lookup_schema())?;
    append(&index, books, tocs)
}

/// Commit more documents to the index in `dir`.
pub fn append_to(dir: &Path, books: &[BookDoc], tocs: &[TocDoc]) -> Result<()> {
    let index = Index::open_in_dir(dir)?;
    append(&index, books, tocs)
}

fn append(index: &Index, books: &[BookDoc], tocs: &[TocDoc]) -> Result<()> {
    let f = LookupFields::resolve(&index.schema())?;
    let mut writer: IndexWriter = index.writer_with_num_threads(1, 15_000_000)?;

    for b in books {
        let mut doc = TantivyDocument::default();
        doc.add_text(f.kind, "book");
        doc.add_text(f.q, normalize(b.title));
        doc.add_u64(f.book_id, b.id);
        doc.add_u64(f.category_id, b.category_id);
        doc.add_text(f.book_title, b.title);
        doc.add_u64(f.is_base_book, u64::from(b.is_base));
        doc.add_i64(f.order_index, b.order_index);
        writer.add_document(doc)?;
    }

    for t in tocs {
        let mut doc = TantivyDocument::default();
        doc.add_text(f.kind, "toc");
        doc.add_text(f.q, normalize(&format!("{} {}", t.book_title, t.text)));
        doc.add_u64(f.toc_id, t.toc_id);
        doc.add_u64(f.book_id, t.book_id);
        doc.add_text(f.book_title, t.book_title);
        doc.add_text(f.toc_text, t.text);
        doc.add_u64(f.toc_level, t.level);
        doc.add_u64(f.is_base_book, u64::from(t.is_base));
        doc.add_i64(f.order_index, t.order_index);
        writer.add_document(doc)?;
    }

    writer.commit()?;
    Ok(())
}

/// Create a dictionary store at `path` holding `entries`.
pub fn write_store(path: &Path, entries: &[DictionaryEntry]) -> Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE base (id INTEGER PRIMARY KEY, value TEXT NOT NULL UNIQUE);
         CREATE TABLE surface (id INTEGER PRIMARY KEY, value TEXT NOT NULL, base_id INTEGER NOT NULL);
         CREATE TABLE variant (id INTEGER PRIMARY KEY, value TEXT NOT NULL, surface_id INTEGER NOT NULL);",
    )?;

    let tx = conn.transaction()?;
    for entry in entries {
        tx.execute("INSERT OR IGNORE INTO base (value) VALUES (?1)", [&entry.base])?;
        let base_id: i64 = tx.query_row(
            "SELECT id FROM base WHERE value = ?1",
            [&entry.base],
            |r| r.get(0),
        )?;
        tx.execute(
            "INSERT INTO surface (value, base_id) VALUES (?1, ?2)",
            rusqlite::params![entry.surface, base_id],
        )?;
        let surface_id = tx.last_insert_rowid();
        for variant in &entry.variants {
            tx.execute(
                "INSERT INTO variant (value, surface_id) VALUES (?1, ?2)",
                rusqlite::params![variant, surface_id],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}
