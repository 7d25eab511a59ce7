//! URL template expansion
//!
//! A template carries zero or more `%s` placeholders. The query is split into
//! at most `placeholders + 1` parts, so the last argument keeps any remaining
//! spaces: `w hello world` against `https://w.org/%s` yields `hello world`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::repository::AliasRecord;

pub const PLACEHOLDER: &str = "%s";

/// How arguments are written into a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgEncoding {
    /// Substitute verbatim.
    #[default]
    Raw,
    /// Percent-encode every reserved byte, so an argument cannot change the
    /// scheme, host or path structure of the target.
    Percent,
}

impl ArgEncoding {
    fn apply(self, arg: &str) -> Cow<'_, str> {
        match self {
            ArgEncoding::Raw => Cow::Borrowed(arg),
            ArgEncoding::Percent => urlencoding::encode(arg),
        }
    }
}

/// Result of substituting query arguments into an alias template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expansion {
    pub alias: String,
    /// Arguments actually consumed by placeholders, in order
    pub args: Vec<String>,
    pub url: String,
    /// Followable API link, set only when the caller needs one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_url: Option<String>,
}

pub fn placeholder_count(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}

/// Expand `record`'s template with the arguments of the full `query`.
///
/// Never fails. Missing arguments leave their placeholders in place; with no
/// placeholders the template comes back unchanged and extra tokens are ignored.
pub fn expand(record: &AliasRecord, query: &str, encoding: ArgEncoding) -> Expansion {
    let slots = placeholder_count(&record.url_template);
    let args: Vec<String> = query
        .splitn(slots + 1, ' ')
        .skip(1)
        .map(str::to_string)
        .collect();
    let url = substitute(&record.url_template, &args, encoding);

    Expansion {
        alias: record.alias.clone(),
        args,
        url,
        expand_url: None,
    }
}

/// Fill placeholders left to right. Text that an argument brings in is never
/// scanned again, so an argument containing `%s` stays literal.
fn substitute(template: &str, args: &[String], encoding: ArgEncoding) -> String {
    let extra: usize = args.iter().map(String::len).sum();
    let mut url = String::with_capacity(template.len() + extra);
    let mut rest = template;

    for arg in args {
        let Some(idx) = rest.find(PLACEHOLDER) else {
            break;
        };
        url.push_str(&rest[..idx]);
        url.push_str(&encoding.apply(arg));
        rest = &rest[idx + PLACEHOLDER.len()..];
    }

    url.push_str(rest);
    url
}
