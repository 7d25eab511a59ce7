//! Autocomplete suggestions for browser search bars

use serde::Serialize;

use crate::repository::AliasRecord;
use crate::template::{expand, ArgEncoding};

/// OpenSearch suggestions payload, serialized as `[query, [suggestions...]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenSearchSuggestions(pub String, pub Vec<String>);

/// One `<alias> <first token> <expanded url>` line per candidate, in order.
pub fn format_suggestions(
    candidates: &[AliasRecord],
    query: &str,
    encoding: ArgEncoding,
) -> Vec<String> {
    let first_token = query.split(' ').next().unwrap_or_default();

    candidates
        .iter()
        .map(|record| {
            let expansion = expand(record, query, encoding);
            format!("{} {} {}", record.alias, first_token, expansion.url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(alias: &str, template: &str) -> AliasRecord {
        AliasRecord {
            alias: alias.to_string(),
            name: String::new(),
            url_template: template.to_string(),
        }
    }

    #[test]
    fn test_one_line_per_candidate_in_order() {
        let candidates = vec![
            record("gh", "https://github.com/%s"),
            record("ghp", "https://github.com/pulls"),
            record("gh", "https://gh.example/%s"),
        ];

        let lines = format_suggestions(&candidates, "gh", ArgEncoding::Raw);
        assert_eq!(
            lines,
            vec![
                "gh gh https://github.com/%s",
                "ghp gh https://github.com/pulls",
                "gh gh https://gh.example/%s",
            ]
        );
    }

    #[test]
    fn test_lines_use_query_arguments() {
        let candidates = vec![record("rs", "https://docs.rs/%s")];
        let lines = format_suggestions(&candidates, "rs tokio", ArgEncoding::Raw);
        assert_eq!(lines, vec!["rs rs https://docs.rs/tokio"]);
    }

    #[test]
    fn test_payload_shape() {
        let payload = OpenSearchSuggestions("gh".to_string(), vec!["gh gh x".to_string()]);
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"["gh",["gh gh x"]]"#
        );
    }

    #[test]
    fn test_no_candidates() {
        assert!(format_suggestions(&[], "zzz", ArgEncoding::Raw).is_empty());
    }
}
