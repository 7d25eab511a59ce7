//! Bare HTML forms, just enough to log in and create an alias

use links_core::escape_html;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Links</title>
<link rel="search" type="application/opensearchdescription+xml" title="Links" href="/opensearch.xml">
</head>
<body>
<form method="get" action="/api/expand">
  <input name="q" autofocus placeholder="alias args...">
</form>
</body>
</html>
"#;

pub const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Links - Login</title></head>
<body>
<form method="post" action="/login">
  <input name="token" type="password" placeholder="device token">
  <button type="submit">Login</button>
</form>
</body>
</html>
"#;

pub fn new_alias_html(alias: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Links - New</title></head>
<body>
<form method="post" action="/items">
  <input name="alias" value="{alias}" placeholder="alias">
  <input name="name" placeholder="name">
  <input name="url" placeholder="https://example.com/?q=%s">
  <input name="tags" placeholder="tag, tag">
  <button type="submit">Create</button>
</form>
</body>
</html>
"#,
        alias = escape_html(alias)
    )
}
