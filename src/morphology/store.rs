//! SQLite dictionary store.
//!
//! The store holds three tables:
//!
//! - `base(id, value)`
//! - `surface(id, value, base_id)`
//! - `variant(id, value, surface_id)`
//!
//! It is read once, through a single join that folds each surface form's
//! variants into one column separated by the ASCII unit separator.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::Result;
use crate::morphology::dictionary::DictionaryEntry;

/// Separator used by `group_concat` for the variants column.
pub const VARIANT_SEPARATOR: char = '\u{1F}';

const ENTRIES_SQL: &str = "
    SELECT s.value AS surface, b.value AS base, group_concat(v.value, char(31)) AS variants
    FROM surface s
    JOIN base b ON b.id = s.base_id
    LEFT JOIN variant v ON v.surface_id = s.id
    GROUP BY s.id
    ORDER BY s.id
";

/// Open the store read-only and fetch every `(surface, base, variants)` row.
pub fn read_entries(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    fetch_entries(&conn)
}

/// Fetch every dictionary row through an open connection.
pub fn fetch_entries(conn: &Connection) -> Result<Vec<DictionaryEntry>> {
    let mut stmt = conn.prepare(ENTRIES_SQL)?;
    let rows = stmt.query_map([], |row| {
        let surface: Option<String> = row.get("surface")?;
        let base: Option<String> = row.get("base")?;
        let variants: Option<String> = row.get("variants")?;
        Ok(DictionaryEntry {
            surface: surface.unwrap_or_default(),
            base: base.unwrap_or_default(),
            variants: split_variants(variants.as_deref().unwrap_or_default()),
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

fn split_variants(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(VARIANT_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_store;
    use tempfile::TempDir;

    #[test]
    fn test_split_variants() {
        assert!(split_variants("").is_empty());
        assert_eq!(split_variants("א\u{1F}ב"), vec!["א", "ב"]);
    }

    #[test]
    fn test_read_entries_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dictionary.db");
        write_store(
            &path,
            &[
                DictionaryEntry::new("ספרים", "ספר", ["ספרי", "ספריהם"]),
                DictionaryEntry::new("בתים", "בית", Vec::<String>::new()),
            ],
        )
        .unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].surface, "ספרים");
        assert_eq!(entries[0].base, "ספר");
        let mut variants = entries[0].variants.clone();
        variants.sort();
        assert_eq!(variants, vec!["ספרי", "ספריהם"]);
        assert_eq!(entries[1].surface, "בתים");
        assert!(entries[1].variants.is_empty());
    }

    #[test]
    fn test_missing_tables_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path).unwrap();
        assert!(read_entries(&path).is_err());
    }
}
