use serde::{Deserialize, Serialize};

use links_core::{
    AliasCount, AliasRecord, Expansion, ItemsResult, NewAlias, Resolution, ResolutionState,
};

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAliasQuery {
    #[serde(default)]
    pub alias: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAliasForm {
    pub alias: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    /// Comma separated
    #[serde(default)]
    pub tags: String,
}

impl From<NewAliasForm> for NewAlias {
    fn from(form: NewAliasForm) -> Self {
        NewAlias {
            alias: form.alias,
            name: form.name,
            url: form.url,
            tags: form.tags.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
}

/// JSON view of a resolution
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub state: ResolutionState,
    pub items: Vec<AliasRecord>,
    pub expansion: Option<Expansion>,
    pub first_token: String,
}

impl From<ItemsResult> for ItemsResponse {
    fn from(result: ItemsResult) -> Self {
        let state = result.state();
        let (items, expansion) = match result.resolution {
            Resolution::MultipleCandidates { items, best_guess } => (items, Some(best_guess)),
            Resolution::ArgsMode { items, expansion } => (items, Some(expansion)),
            Resolution::FallbackSearch { expansion } => (Vec::new(), Some(expansion)),
            Resolution::NewItem => (Vec::new(), None),
        };

        Self {
            state,
            items,
            expansion,
            first_token: result.first_token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub topn: Vec<AliasCount>,
    pub lown: Vec<AliasCount>,
}
