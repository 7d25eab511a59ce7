//! Alias records and the lookups the resolver depends on

use serde::{Deserialize, Serialize};

use crate::Result;
use links_storage::{like_prefix, now_timestamp, Database};

/// Maximum number of candidates returned by a prefix lookup
pub const PREFIX_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecord {
    pub alias: String,
    pub name: String,
    pub url_template: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAlias {
    pub alias: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Read side of alias storage used by the resolver.
pub trait AliasRepository {
    /// Aliases starting with `prefix`, an exact match first, then oldest first.
    fn find_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<AliasRecord>>;

    /// Aliases equal to `alias`. Usually zero or one, but duplicates are allowed.
    fn find_by_exact_alias(&self, alias: &str) -> Result<Vec<AliasRecord>>;
}

/// SQLite-backed alias storage
pub struct AliasStore {
    db: Database,
}

impl AliasStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, alias: &NewAlias) -> Result<AliasRecord> {
        let tags = serde_json::to_string(&alias.tags).map_err(links_storage::StorageError::from)?;

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO items (alias, name, url, tags, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    alias.alias,
                    alias.name,
                    alias.url,
                    tags,
                    now_timestamp()
                ],
            )?;
            Ok(())
        })?;

        tracing::info!(alias = %alias.alias, "Alias created");

        Ok(AliasRecord {
            alias: alias.alias.clone(),
            name: alias.name.clone(),
            url_template: alias.url.clone(),
        })
    }

    /// Most recently created aliases first
    pub fn list(&self, limit: usize) -> Result<Vec<AliasRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT alias, name, url FROM items
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let records = stmt
                .query_map([limit as i64], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })?)
    }
}

impl AliasRepository for AliasStore {
    fn find_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<AliasRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT alias, name, url FROM items
                 WHERE alias LIKE ?1 ESCAPE '\\'
                 ORDER BY alias = ?2 DESC, created_at ASC, id ASC
                 LIMIT ?3",
            )?;

            let records = stmt
                .query_map(
                    rusqlite::params![like_prefix(prefix), prefix, limit as i64],
                    record_from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })?)
    }

    fn find_by_exact_alias(&self, alias: &str) -> Result<Vec<AliasRecord>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT alias, name, url FROM items
                 WHERE alias = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;

            let records = stmt
                .query_map([alias], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })?)
    }
}

impl Clone for AliasStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AliasRecord> {
    Ok(AliasRecord {
        alias: row.get(0)?,
        name: row.get(1)?,
        url_template: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(aliases: &[(&str, &str)]) -> AliasStore {
        let store = AliasStore::new(Database::open_in_memory().unwrap());
        for (alias, url) in aliases {
            store
                .create(&NewAlias {
                    alias: alias.to_string(),
                    name: format!("{alias} link"),
                    url: url.to_string(),
                    tags: Vec::new(),
                })
                .unwrap();
        }
        store
    }

    fn aliases(records: &[AliasRecord]) -> Vec<&str> {
        records.iter().map(|r| r.alias.as_str()).collect()
    }

    #[test]
    fn test_prefix_puts_exact_match_first() {
        let store = store_with(&[
            ("ghi", "https://ghi.example"),
            ("gh", "https://github.com/%s"),
            ("gha", "https://github.com/actions"),
        ]);

        let found = store.find_by_prefix("gh", PREFIX_LIMIT).unwrap();
        assert_eq!(aliases(&found), vec!["gh", "ghi", "gha"]);

        let found = store.find_by_prefix("gha", PREFIX_LIMIT).unwrap();
        assert_eq!(aliases(&found), vec!["gha"]);
    }

    #[test]
    fn test_prefix_respects_limit() {
        let store = store_with(&[
            ("a1", "https://1"),
            ("a2", "https://2"),
            ("a3", "https://3"),
        ]);
        let found = store.find_by_prefix("a", 2).unwrap();
        assert_eq!(aliases(&found), vec!["a1", "a2"]);
    }

    #[test]
    fn test_prefix_treats_wildcards_literally() {
        let store = store_with(&[("a_b", "https://1"), ("axb", "https://2")]);
        let found = store.find_by_prefix("a_", PREFIX_LIMIT).unwrap();
        assert_eq!(aliases(&found), vec!["a_b"]);

        assert!(store.find_by_prefix("%", PREFIX_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_exact_match_returns_duplicates_in_creation_order() {
        let store = store_with(&[
            ("yt", "https://youtube.com/results?q=%s"),
            ("ytm", "https://music.youtube.com"),
            ("yt", "https://invidious.example/search?q=%s"),
        ]);

        let found = store.find_by_exact_alias("yt").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].url_template, "https://youtube.com/results?q=%s");
        assert_eq!(found[1].url_template, "https://invidious.example/search?q=%s");

        assert!(store.find_by_exact_alias("y").unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let store = store_with(&[("one", "https://1"), ("two", "https://2")]);
        let listed = store.list(10).unwrap();
        assert_eq!(aliases(&listed), vec!["two", "one"]);
        assert_eq!(listed[0].name, "two link");
    }
}
