//! Devices allowed to use the service, identified by a cookie token

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::Result;
use links_storage::{now_timestamp, parse_timestamp, Database};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct DeviceRegistry {
    db: Database,
}

impl DeviceRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn register(&self, name: &str, token: &str) -> Result<Device> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "Device name cannot be empty".to_string(),
            ));
        }
        if !is_valid_token(token) {
            return Err(CoreError::Validation(
                "Device token must be a non-empty cookie-safe ASCII string".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let created_at = now_timestamp();

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO devices (id, name, token, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, name, token, created_at],
            )?;
            Ok(())
        })?;

        tracing::info!(device = name, "Device registered");

        Ok(Device {
            id,
            name: name.to_string(),
            created_at: parse_timestamp("created_at", &created_at)?,
        })
    }

    /// The device holding `token`. Ambiguous tokens authenticate nobody.
    pub fn authenticate(&self, token: &str) -> Result<Option<Device>> {
        if token.is_empty() {
            return Ok(None);
        }

        Ok(self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, created_at FROM devices WHERE token = ?1 LIMIT 2")?;
            let rows = stmt
                .query_map([token], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            match rows.as_slice() {
                [(id, name, created_at)] => Ok(Some(Device {
                    id: id.clone(),
                    name: name.clone(),
                    created_at: parse_timestamp("created_at", created_at)?,
                })),
                _ => Ok(None),
            }
        })?)
    }
}

/// Tokens travel in a cookie verbatim, so they must be plain cookie octets.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

impl Clone for DeviceRegistry {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}
