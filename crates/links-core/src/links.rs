//! Main application state container

use parking_lot::RwLock;
use std::sync::Arc;

use links_resolver::{
    format_suggestions, AliasCount, AliasRecord, AliasStore, ItemsResult, NewAlias,
    OpenSearchSuggestions, QueryResolver, Redirect, UsageEntry, UsageLog, UsageSink,
};
use links_storage::Database;

use crate::config::Config;
use crate::devices::{Device, DeviceRegistry};
use crate::error::CoreError;
use crate::opensearch::opensearch_description;
use crate::Result;

const SEARCH_ENGINE_SETTING: &str = "search_engine";

/// Links instance
///
/// Every surface (HTTP, CLI) goes through here. Cloning is cheap and clones
/// share the same database and resolver.
pub struct Links {
    config: Config,
    db: Database,
    aliases: AliasStore,
    usage: UsageLog,
    devices: DeviceRegistry,
    resolver: Arc<RwLock<QueryResolver<AliasStore>>>,
}

impl Links {
    /// Open the configured database, creating its directory if needed
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Database) -> Self {
        let aliases = AliasStore::new(db.clone());
        let resolver = Arc::new(RwLock::new(QueryResolver::with_settings(
            aliases.clone(),
            config.resolver_settings(),
        )));

        Self {
            aliases,
            usage: UsageLog::new(db.clone()),
            devices: DeviceRegistry::new(db.clone()),
            resolver,
            config,
            db,
        }
    }

    /// Apply persisted preferences over the config file
    pub fn initialize(&self) -> Result<()> {
        if let Some(template) = self.db.get_setting(SEARCH_ENGINE_SETTING)? {
            self.resolver.write().set_search_engine(template);
        }

        tracing::info!(
            database = %self.config.database_path.display(),
            app_url = %self.config.app_url,
            "Links initialized"
        );

        Ok(())
    }

    // === Resolution ===

    pub fn resolve(&self, query: &str) -> ItemsResult {
        self.resolver.read().resolve(query)
    }

    pub fn expand(&self, query: &str) -> Redirect {
        self.resolver.read().expand(query)
    }

    pub fn suggestions(&self, query: &str) -> OpenSearchSuggestions {
        let resolver = self.resolver.read();
        let result = resolver.resolve(query);
        let lines = format_suggestions(result.items(), query, resolver.settings().arg_encoding);
        OpenSearchSuggestions(query.to_string(), lines)
    }

    /// Log a followed resolution. Ambiguous and unknown-alias results are
    /// skipped; a failed write is logged and reported as `false`.
    pub fn record_usage(&self, result: &ItemsResult, device_id: &str) -> bool {
        match result.loggable() {
            Some(expansion) => self
                .usage
                .record(&expansion.alias, &expansion.args, device_id),
            None => false,
        }
    }

    // === Aliases ===

    pub fn create_alias(&self, alias: NewAlias) -> Result<AliasRecord> {
        let alias = NewAlias {
            alias: alias.alias.trim().to_string(),
            name: alias.name.trim().to_string(),
            url: alias.url.trim().to_string(),
            tags: alias
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };

        if alias.alias.is_empty() {
            return Err(CoreError::Validation("Alias cannot be empty".to_string()));
        }
        if alias.alias.contains(char::is_whitespace) {
            return Err(CoreError::Validation(format!(
                "Alias cannot contain spaces: {:?}",
                alias.alias
            )));
        }
        if alias.url.is_empty() {
            return Err(CoreError::Validation("URL cannot be empty".to_string()));
        }

        Ok(self.aliases.create(&alias)?)
    }

    pub fn list_aliases(&self, limit: usize) -> Result<Vec<AliasRecord>> {
        Ok(self.aliases.list(limit)?)
    }

    // === Usage ===

    pub fn recent_usage(&self, limit: usize) -> Result<Vec<UsageEntry>> {
        Ok(self.usage.recent(limit)?)
    }

    pub fn top_aliases(&self, limit: i64) -> Result<Vec<AliasCount>> {
        Ok(self.usage.top_aliases(limit)?)
    }

    // === Devices ===

    pub fn register_device(&self, name: &str, token: &str) -> Result<Device> {
        self.devices.register(name, token)
    }

    pub fn authenticate(&self, token: &str) -> Result<Option<Device>> {
        self.devices.authenticate(token)
    }

    // === Settings ===

    pub fn search_engine(&self) -> String {
        self.resolver.read().settings().search_engine.clone()
    }

    pub fn set_search_engine(&self, template: String) -> Result<()> {
        if template.trim().is_empty() {
            return Err(CoreError::Validation(
                "Search engine template cannot be empty".to_string(),
            ));
        }

        self.db.set_setting(SEARCH_ENGINE_SETTING, &template)?;
        self.resolver.write().set_search_engine(template);
        Ok(())
    }

    pub fn opensearch_description(&self) -> String {
        opensearch_description(&self.config.app_url)
    }

    // === Config ===

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Clone for Links {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
            aliases: self.aliases.clone(),
            usage: self.usage.clone(),
            devices: self.devices.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}
