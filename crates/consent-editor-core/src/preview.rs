//! Standalone documents wrapped around sanitized fragments.

use crate::types::SizeClass;

const BODY_RULE: &str = "body { font: 16px/1.6 system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif; color:#0f172a; margin:16px; }";
const IMAGE_RULE: &str = "img { max-width:100%; height:auto; }";
const TABLE_RULE: &str = "table { width:100%; border-collapse:collapse; }";

/// The live preview document. Links open in a new browsing context.
pub fn preview_document(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <base target="_blank">
  <style>
    {BODY_RULE}
    {IMAGE_RULE}
    {TABLE_RULE}
    {sizes}
  </style>
</head>
<body>
{body}
</body>
</html>"#,
        sizes = SizeClass::stylesheet(),
    )
}

/// The downloadable document.
pub fn export_document(title: &str, body: &str) -> String {
    let mut escaped_title = String::new();
    let _ = pulldown_cmark_escape::escape_html_body_text(
        pulldown_cmark_escape::FmtWriter(&mut escaped_title),
        title,
    );
    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{escaped_title}</title>
  <style>
    {BODY_RULE}
    {IMAGE_RULE}
    {sizes}
  </style>
</head>
<body>
{body}
</body>
</html>"#,
        sizes = SizeClass::stylesheet(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_document() {
        insta::assert_snapshot!(preview_document("<p>Hi</p>"), @r#"
        <!doctype html>
        <html>
        <head>
          <meta charset="utf-8" />
          <meta name="viewport" content="width=device-width, initial-scale=1" />
          <base target="_blank">
          <style>
            body { font: 16px/1.6 system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif; color:#0f172a; margin:16px; }
            img { max-width:100%; height:auto; }
            table { width:100%; border-collapse:collapse; }
            .size-smallest{font-size:.75rem}.size-smaller{font-size:.875rem}.size-normal{font-size:1rem}.size-larger{font-size:1.125rem}.size-largest{font-size:1.25rem}
          </style>
        </head>
        <body>
        <p>Hi</p>
        </body>
        </html>
        "#);
    }

    #[test]
    fn test_export_document() {
        insta::assert_snapshot!(export_document("Terms & Consent", "<p>Hi</p>"), @r#"
        <!doctype html>
        <html>
        <head>
          <meta charset="utf-8" />
          <meta name="viewport" content="width=device-width, initial-scale=1" />
          <title>Terms &amp; Consent</title>
          <style>
            body { font: 16px/1.6 system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif; color:#0f172a; margin:16px; }
            img { max-width:100%; height:auto; }
            .size-smallest{font-size:.75rem}.size-smaller{font-size:.875rem}.size-normal{font-size:1rem}.size-larger{font-size:1.125rem}.size-largest{font-size:1.25rem}
          </style>
        </head>
        <body>
        <p>Hi</p>
        </body>
        </html>
        "#);
    }
}
