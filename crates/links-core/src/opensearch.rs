//! OpenSearch description document
//!
//! Lets a browser register the service as a search engine: queries go to
//! `/api/expand`, autocomplete to `/api/opensearch`.

use crate::html::escape_html;

pub fn opensearch_description(app_url: &str) -> String {
    let base = escape_html(app_url.trim_end_matches('/'));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns="http://a9.com/-/spec/opensearch/1.1/"
                       xmlns:moz="http://www.mozilla.org/2006/browser/search/">
  <ShortName>Links</ShortName>
  <InputEncoding>UTF-8</InputEncoding>
  <Description>Just a bunch of links.</Description>
  <Tags>links</Tags>
  <Url type="text/html" method="get" template="{base}/api/expand?q={{searchTerms}}" />
  <Url type="application/x-suggestions+json" rel="suggestions" template="{base}/api/opensearch?q={{searchTerms}}" />
  <moz:SearchForm>{base}</moz:SearchForm>
</OpenSearchDescription>
"#
    )
}
