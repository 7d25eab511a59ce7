//! Usage log: one row per followed expansion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use links_storage::{now_timestamp, parse_timestamp, Database};

/// Append-only destination for usage records.
pub trait UsageSink {
    fn append(&self, alias: &str, args: &[String], device_id: &str) -> Result<()>;

    /// Append without letting a failure reach the caller. Returns whether the
    /// entry was written; a lost entry is acceptable.
    fn record(&self, alias: &str, args: &[String], device_id: &str) -> bool {
        match self.append(alias, args, device_id) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(alias, device_id, error = %err, "Failed to write usage log entry");
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub id: i64,
    pub alias: String,
    pub args: Vec<String>,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasCount {
    pub alias: String,
    pub count: i64,
}

pub struct UsageLog {
    db: Database,
}

impl UsageLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Newest entries first
    pub fn recent(&self, limit: usize) -> Result<Vec<UsageEntry>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, alias, args, device_id, created_at FROM logs
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit as i64], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut entries = Vec::with_capacity(rows.len());
            for (id, alias, args, device_id, created_at) in rows {
                entries.push(UsageEntry {
                    id,
                    alias,
                    args: serde_json::from_str(&args)?,
                    device_id,
                    created_at: parse_timestamp("created_at", &created_at)?,
                });
            }

            Ok(entries)
        })?)
    }

    /// Aliases by number of uses.
    ///
    /// A positive `limit` returns the most used, a negative one the least
    /// used. Equal counts keep the alias that was used first ahead.
    pub fn top_aliases(&self, limit: i64) -> Result<Vec<AliasCount>> {
        let order = if limit < 0 { "ASC" } else { "DESC" };
        let rows = i64::try_from(limit.unsigned_abs()).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT alias, COUNT(*) AS uses FROM logs
             GROUP BY alias
             ORDER BY uses {order}, MIN(id) ASC
             LIMIT ?1"
        );

        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let counts = stmt
                .query_map([rows], |row| {
                    Ok(AliasCount {
                        alias: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(counts)
        })?)
    }
}

impl UsageSink for UsageLog {
    fn append(&self, alias: &str, args: &[String], device_id: &str) -> Result<()> {
        Ok(self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO logs (alias, args, device_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    alias,
                    serde_json::to_string(args)?,
                    device_id,
                    now_timestamp()
                ],
            )?;
            Ok(())
        })?)
    }
}

impl Clone for UsageLog {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl UsageSink for Broken {
        fn append(&self, _alias: &str, _args: &[String], _device_id: &str) -> Result<()> {
            Err(links_storage::StorageError::Sqlite(rusqlite::Error::InvalidQuery).into())
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_record_and_read_back() {
        let log = UsageLog::new(Database::open_in_memory().unwrap());

        assert!(log.record("gh", &args(&["rust-lang", "rust"]), "laptop"));
        assert!(log.record("g", &args(&["weather"]), "phone"));

        let recent = log.recent(30).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].alias, "g");
        assert_eq!(recent[0].device_id, "phone");
        assert_eq!(recent[1].args, vec!["rust-lang", "rust"]);

        assert_eq!(log.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        assert!(!Broken.record("gh", &[], "laptop"));
    }

    #[test]
    fn test_top_and_bottom_aliases() {
        let log = UsageLog::new(Database::open_in_memory().unwrap());
        for alias in ["gh", "rs", "gh", "yt", "gh", "rs"] {
            log.append(alias, &[], "laptop").unwrap();
        }

        let top = log.top_aliases(2).unwrap();
        assert_eq!(
            top,
            vec![
                AliasCount {
                    alias: "gh".to_string(),
                    count: 3
                },
                AliasCount {
                    alias: "rs".to_string(),
                    count: 2
                },
            ]
        );

        let bottom = log.top_aliases(-10).unwrap();
        let order: Vec<_> = bottom.iter().map(|c| c.alias.as_str()).collect();
        assert_eq!(order, vec!["yt", "rs", "gh"]);

        assert!(log.top_aliases(0).unwrap().is_empty());
    }

    #[test]
    fn test_extreme_limits_return_everything() {
        let log = UsageLog::new(Database::open_in_memory().unwrap());
        for alias in ["gh", "rs", "gh"] {
            log.append(alias, &[], "laptop").unwrap();
        }

        let bottom = log.top_aliases(i64::MIN).unwrap();
        let order: Vec<_> = bottom.iter().map(|c| c.alias.as_str()).collect();
        assert_eq!(order, vec!["rs", "gh"]);

        let top = log.top_aliases(i64::MAX).unwrap();
        let order: Vec<_> = top.iter().map(|c| c.alias.as_str()).collect();
        assert_eq!(order, vec!["gh", "rs"]);
    }
}
