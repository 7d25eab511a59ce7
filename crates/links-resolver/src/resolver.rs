//! Query resolution
//!
//! `resolve` is total: every query lands in exactly one [`Resolution`], and a
//! failing repository reads as "no alias found".

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::repository::{AliasRecord, AliasRepository, PREFIX_LIMIT};
use crate::template::{expand, ArgEncoding, Expansion, PLACEHOLDER};

/// Tag of a [`Resolution`], as exposed to callers and serialized views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// Initial value; `resolve` never produces it
    #[default]
    Unknown,
    MultipleCandidates,
    NewItem,
    ArgsMode,
    FallbackSearch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One token and at least one alias starts with it.
    ///
    /// `best_guess` expands whichever candidate sorted first. It is a
    /// convenience for "go straight there" callers, not a decision.
    MultipleCandidates {
        items: Vec<AliasRecord>,
        best_guess: Expansion,
    },
    /// One token and no alias starts with it
    NewItem,
    /// Several tokens and the first one is an alias
    ArgsMode {
        items: Vec<AliasRecord>,
        expansion: Expansion,
    },
    /// Several tokens and the first one is not an alias
    FallbackSearch { expansion: Expansion },
}

impl Resolution {
    pub fn state(&self) -> ResolutionState {
        match self {
            Resolution::MultipleCandidates { .. } => ResolutionState::MultipleCandidates,
            Resolution::NewItem => ResolutionState::NewItem,
            Resolution::ArgsMode { .. } => ResolutionState::ArgsMode,
            Resolution::FallbackSearch { .. } => ResolutionState::FallbackSearch,
        }
    }

    pub fn items(&self) -> &[AliasRecord] {
        match self {
            Resolution::MultipleCandidates { items, .. } | Resolution::ArgsMode { items, .. } => {
                items
            }
            Resolution::NewItem | Resolution::FallbackSearch { .. } => &[],
        }
    }

    pub fn expansion(&self) -> Option<&Expansion> {
        match self {
            Resolution::MultipleCandidates { best_guess, .. } => Some(best_guess),
            Resolution::ArgsMode { expansion, .. } | Resolution::FallbackSearch { expansion } => {
                Some(expansion)
            }
            Resolution::NewItem => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsResult {
    /// Alias part of the query, verbatim
    pub first_token: String,
    pub resolution: Resolution,
}

impl ItemsResult {
    pub fn state(&self) -> ResolutionState {
        self.resolution.state()
    }

    pub fn items(&self) -> &[AliasRecord] {
        self.resolution.items()
    }

    pub fn expansion(&self) -> Option<&Expansion> {
        self.resolution.expansion()
    }

    /// The expansion worth recording in the usage log.
    ///
    /// Only definite resolutions count: args mode, fallback search, and a
    /// candidate list whose first entry is the typed alias itself.
    pub fn loggable(&self) -> Option<&Expansion> {
        match &self.resolution {
            Resolution::ArgsMode { expansion, .. } | Resolution::FallbackSearch { expansion } => {
                Some(expansion)
            }
            Resolution::MultipleCandidates { items, best_guess }
                if items.first().is_some_and(|r| r.alias == self.first_token) =>
            {
                Some(best_guess)
            }
            Resolution::MultipleCandidates { .. } | Resolution::NewItem => None,
        }
    }

    /// Where a "go straight to the destination" endpoint should send the browser
    pub fn redirect(&self) -> Redirect {
        match &self.resolution {
            Resolution::NewItem => Redirect::CreateAlias(self.first_token.clone()),
            Resolution::MultipleCandidates { best_guess: e, .. }
            | Resolution::ArgsMode { expansion: e, .. }
            | Resolution::FallbackSearch { expansion: e } => Redirect::Destination(e.url.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Expanded target URL
    Destination(String),
    /// Unknown alias; send the user to the creation form
    CreateAlias(String),
}

impl Redirect {
    pub fn location(&self) -> String {
        match self {
            Redirect::Destination(url) => url.clone(),
            Redirect::CreateAlias(alias) => format!("/new?alias={}", urlencoding::encode(alias)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Public base URL of this service, used for `expand_url`
    pub app_url: String,
    /// Fallback search template (%s replaced with the `+`-joined terms)
    pub search_engine: String,
    /// Alias reported for fallback searches
    pub fallback_alias: String,
    pub arg_encoding: ArgEncoding,
}

impl ResolverSettings {
    fn expand_url(&self, query: &str) -> String {
        format!("{}/api/expand?q={}", self.app_url.trim_end_matches('/'), query)
    }

    fn search_url(&self, terms: &[String]) -> String {
        let joined = terms
            .iter()
            .map(|term| form_urlencoded::byte_serialize(term.as_bytes()).collect::<String>())
            .collect::<Vec<_>>()
            .join("+");

        if self.search_engine.contains(PLACEHOLDER) {
            self.search_engine.replacen(PLACEHOLDER, &joined, 1)
        } else {
            format!("{}{}", self.search_engine, joined)
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            app_url: "http://localhost:8090".to_string(),
            search_engine: "https://google.com/search?q=%s".to_string(),
            fallback_alias: "g".to_string(),
            arg_encoding: ArgEncoding::Raw,
        }
    }
}

pub struct QueryResolver<R> {
    repository: R,
    settings: ResolverSettings,
}

impl<R: AliasRepository> QueryResolver<R> {
    pub fn new(repository: R) -> Self {
        Self::with_settings(repository, ResolverSettings::default())
    }

    pub fn with_settings(repository: R, settings: ResolverSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn set_search_engine(&mut self, template: String) {
        self.settings.search_engine = template;
    }

    /// Classify a raw query and expand the winning candidate
    pub fn resolve(&self, query: &str) -> ItemsResult {
        let (first_token, rest) = match query.split_once(' ') {
            Some((first, rest)) => (first, Some(rest)),
            None => (query, None),
        };

        let candidates = self.lookup(first_token, rest.is_some());

        let top = candidates
            .first()
            .map(|record| expand(record, query, self.settings.arg_encoding));

        let resolution = match (rest, top) {
            (Some(rest), None) => {
                let terms: Vec<String> = rest.split(' ').map(str::to_string).collect();
                Resolution::FallbackSearch {
                    expansion: Expansion {
                        alias: self.settings.fallback_alias.clone(),
                        url: self.settings.search_url(&terms),
                        args: terms,
                        expand_url: Some(self.settings.expand_url(query)),
                    },
                }
            }
            (None, None) => Resolution::NewItem,
            (Some(_), Some(mut expansion)) => {
                expansion.expand_url = Some(self.settings.expand_url(query));
                Resolution::ArgsMode {
                    items: candidates,
                    expansion,
                }
            }
            (None, Some(best_guess)) => Resolution::MultipleCandidates {
                items: candidates,
                best_guess,
            },
        };

        tracing::debug!(
            query,
            state = ?resolution.state(),
            candidates = resolution.items().len(),
            "Query resolved"
        );

        ItemsResult {
            first_token: first_token.to_string(),
            resolution,
        }
    }

    /// Resolve and pick the redirect target in one step
    pub fn expand(&self, query: &str) -> Redirect {
        self.resolve(query).redirect()
    }

    fn lookup(&self, first_token: &str, exact: bool) -> Vec<AliasRecord> {
        let found = if exact {
            self.repository.find_by_exact_alias(first_token)
        } else {
            self.repository.find_by_prefix(first_token, PREFIX_LIMIT)
        };

        found.unwrap_or_else(|err| {
            tracing::warn!(alias = first_token, error = %err, "Alias lookup failed, treating as no match");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{AliasStore, NewAlias};
    use crate::{ResolverError, Result};
    use links_storage::{Database, StorageError};

    fn resolver_with(aliases: &[(&str, &str)]) -> QueryResolver<AliasStore> {
        let store = AliasStore::new(Database::open_in_memory().unwrap());
        for (alias, url) in aliases {
            store
                .create(&NewAlias {
                    alias: alias.to_string(),
                    name: String::new(),
                    url: url.to_string(),
                    tags: Vec::new(),
                })
                .unwrap();
        }
        QueryResolver::with_settings(
            store,
            ResolverSettings {
                app_url: "https://links.example/".to_string(),
                ..ResolverSettings::default()
            },
        )
    }

    struct Unavailable;

    impl AliasRepository for Unavailable {
        fn find_by_prefix(&self, _prefix: &str, _limit: usize) -> Result<Vec<AliasRecord>> {
            Err(ResolverError::Storage(StorageError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )))
        }

        fn find_by_exact_alias(&self, _alias: &str) -> Result<Vec<AliasRecord>> {
            Err(ResolverError::Storage(StorageError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )))
        }
    }

    #[test]
    fn test_unknown_single_token_is_new_item() {
        let resolver = resolver_with(&[("gh", "https://github.com/%s")]);

        let result = resolver.resolve("zzz");
        assert_eq!(result.state(), ResolutionState::NewItem);
        assert_eq!(result.first_token, "zzz");
        assert!(result.items().is_empty());
        assert!(result.expansion().is_none());
        assert!(result.loggable().is_none());
        assert_eq!(result.redirect(), Redirect::CreateAlias("zzz".to_string()));
    }

    #[test]
    fn test_prefix_lists_exact_match_first() {
        let resolver = resolver_with(&[
            ("ghp", "https://github.com/pulls"),
            ("gh", "https://github.com/%s"),
            ("ghi", "https://github.com/issues"),
        ]);

        let result = resolver.resolve("gh");
        assert_eq!(result.state(), ResolutionState::MultipleCandidates);
        let aliases: Vec<_> = result.items().iter().map(|r| r.alias.as_str()).collect();
        assert_eq!(aliases, vec!["gh", "ghp", "ghi"]);

        let guess = result.expansion().unwrap();
        assert_eq!(guess.alias, "gh");
        assert_eq!(guess.url, "https://github.com/%s");
        assert!(guess.expand_url.is_none());

        // the typed alias exists, so going there counts as a use
        assert_eq!(result.loggable().map(|e| e.alias.as_str()), Some("gh"));
    }

    #[test]
    fn test_prefix_only_candidates_are_not_logged() {
        let resolver = resolver_with(&[
            ("ghp", "https://github.com/pulls"),
            ("ghi", "https://github.com/issues"),
        ]);

        let result = resolver.resolve("gh");
        assert_eq!(result.state(), ResolutionState::MultipleCandidates);
        // the full list is there even though the guess is arbitrary
        assert_eq!(result.items().len(), 2);
        assert_eq!(result.expansion().unwrap().url, "https://github.com/pulls");
        assert!(result.loggable().is_none());
        assert_eq!(
            result.redirect(),
            Redirect::Destination("https://github.com/pulls".to_string())
        );
    }

    #[test]
    fn test_prefix_is_capped() {
        let aliases: Vec<(String, String)> = (0..15)
            .map(|i| (format!("a{i:02}"), format!("https://{i}.example")))
            .collect();
        let borrowed: Vec<(&str, &str)> = aliases
            .iter()
            .map(|(a, u)| (a.as_str(), u.as_str()))
            .collect();
        let resolver = resolver_with(&borrowed);

        let result = resolver.resolve("a");
        assert_eq!(result.items().len(), PREFIX_LIMIT);
        assert_eq!(result.items()[0].alias, "a00");
    }

    #[test]
    fn test_args_mode_substitutes() {
        let resolver = resolver_with(&[
            ("gh", "https://github.com/%s/%s"),
            ("ghx", "https://ghx.example/%s"),
        ]);

        let result = resolver.resolve("gh rust-lang rust");
        assert_eq!(result.state(), ResolutionState::ArgsMode);
        // exact lookup, so the longer alias is not a candidate
        assert_eq!(result.items().len(), 1);

        let expansion = result.expansion().unwrap();
        assert_eq!(expansion.url, "https://github.com/rust-lang/rust");
        assert_eq!(expansion.args, vec!["rust-lang", "rust"]);
        assert_eq!(
            expansion.expand_url.as_deref(),
            Some("https://links.example/api/expand?q=gh rust-lang rust")
        );
        assert_eq!(result.loggable(), Some(expansion));
    }

    #[test]
    fn test_args_mode_uses_first_duplicate() {
        let resolver = resolver_with(&[
            ("yt", "https://youtube.com/results?search_query=%s"),
            ("yt", "https://invidious.example/search?q=%s"),
        ]);

        let result = resolver.resolve("yt lofi");
        assert_eq!(result.state(), ResolutionState::ArgsMode);
        assert_eq!(result.items().len(), 2);
        assert_eq!(
            result.expansion().unwrap().url,
            "https://youtube.com/results?search_query=lofi"
        );
    }

    #[test]
    fn test_unknown_alias_with_args_falls_back_to_search() {
        let resolver = resolver_with(&[("gh", "https://github.com/%s")]);

        let result = resolver.resolve("ghz rust borrow checker");
        assert_eq!(result.state(), ResolutionState::FallbackSearch);
        assert_eq!(result.first_token, "ghz");
        assert!(result.items().is_empty());

        let expansion = result.expansion().unwrap();
        assert_eq!(expansion.alias, "g");
        assert_eq!(expansion.args, vec!["rust", "borrow", "checker"]);
        assert_eq!(
            expansion.url,
            "https://google.com/search?q=rust+borrow+checker"
        );
        assert_eq!(
            expansion.expand_url.as_deref(),
            Some("https://links.example/api/expand?q=ghz rust borrow checker")
        );
        assert!(result.loggable().is_some());
    }

    #[test]
    fn test_fallback_encodes_each_term() {
        let resolver = resolver_with(&[]);
        let result = resolver.resolve("? c++ & rust");
        assert_eq!(
            result.expansion().unwrap().url,
            "https://google.com/search?q=c%2B%2B+%26+rust"
        );
    }

    #[test]
    fn test_custom_search_engine() {
        let mut resolver = resolver_with(&[]);
        resolver.set_search_engine("https://duckduckgo.com/?q=%s&ia=web".to_string());

        let result = resolver.resolve("x hello there");
        assert_eq!(
            result.expansion().unwrap().url,
            "https://duckduckgo.com/?q=hello+there&ia=web"
        );
    }

    #[test]
    fn test_empty_query() {
        let resolver = resolver_with(&[]);
        let result = resolver.resolve("");
        assert_eq!(result.state(), ResolutionState::NewItem);
        assert_eq!(result.first_token, "");

        let resolver = resolver_with(&[("gh", "https://github.com")]);
        let result = resolver.resolve("");
        assert_eq!(result.state(), ResolutionState::MultipleCandidates);
        assert_eq!(result.items().len(), 1);
    }

    #[test]
    fn test_repository_failure_degrades() {
        let resolver = QueryResolver::new(Unavailable);

        let result = resolver.resolve("gh");
        assert_eq!(result.state(), ResolutionState::NewItem);

        let result = resolver.resolve("gh rust");
        assert_eq!(result.state(), ResolutionState::FallbackSearch);
        assert_eq!(
            result.expansion().unwrap().url,
            "https://google.com/search?q=rust"
        );
    }

    #[test]
    fn test_expand_redirect() {
        let resolver = resolver_with(&[("rs", "https://docs.rs/%s")]);

        assert_eq!(
            resolver.expand("rs serde"),
            Redirect::Destination("https://docs.rs/serde".to_string())
        );
        assert_eq!(
            resolver.expand("new thing").location(),
            "https://google.com/search?q=thing"
        );
        assert_eq!(
            resolver.expand("a b&c").location(),
            "https://google.com/search?q=b%26c"
        );
        assert_eq!(resolver.expand("x&y").location(), "/new?alias=x%26y");
    }

    #[test]
    fn test_unknown_state_is_default() {
        assert_eq!(ResolutionState::default(), ResolutionState::Unknown);
    }
}
