//! Page markup extraction and the HTTP content source

use std::sync::LazyLock;

use regex::Regex;

use crate::page::PageContent;
use crate::{Error, Result};

/// Class of the transition mask element, never copied from fetched pages
pub const MASK_CLASS: &str = "page-transition-mask";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").unwrap());

static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>").unwrap());

static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// An empty `<div>` carrying the mask class
static MASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bclass\s*=\s*["'][^"']*\bpage-transition-mask\b[^"']*["'][^>]*>\s*</div>"#)
        .unwrap()
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z][a-zA-Z0-9]{1,7}));").unwrap()
});

/// Extract the title and body children of an HTML document
///
/// Any transition mask inside the fetched body is dropped so the live page
/// keeps exactly one. A document without a `<body>` is a `Markup` error.
pub fn parse_page(html: &str) -> Result<PageContent> {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| document_title(m.as_str()))
        .unwrap_or_default();

    let open = BODY_OPEN_RE
        .find(html)
        .ok_or_else(|| Error::Markup("document has no <body>".to_string()))?;
    let rest = &html[open.end()..];
    // Last closing tag wins; browsers tolerate a missing one
    let inner = match BODY_CLOSE_RE.find_iter(rest).last() {
        Some(close) => &rest[..close.start()],
        None => rest,
    };

    let body = MASK_RE.replace_all(inner, "").trim().to_string();
    Ok(PageContent { title, body })
}

/// Title text as a browser reports it: entities decoded, whitespace collapsed
fn document_title(raw: &str) -> String {
    let decoded = decode_entities(raw);
    decoded.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode character references in one pass; unknown names are left as written
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let code = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok()
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else {
                return match caps.get(3).and_then(|name| named_entity(name.as_str())) {
                    Some(c) => c.to_string(),
                    None => caps[0].to_string(),
                };
            };
            code.filter(|&c| c != 0)
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string()
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        "middot" => '\u{b7}',
        "bull" => '\u{2022}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(c)
}

#[cfg(feature = "native")]
pub use http::HttpContentSource;

#[cfg(feature = "native")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
    use reqwest::Client;
    use url::Url;

    use super::parse_page;
    use crate::config::AppConfig;
    use crate::page::{ContentSource, PageContent};
    use crate::{Error, Result};

    const PAGE_USER_AGENT: &str = concat!("sitefx/", env!("CARGO_PKG_VERSION"));

    /// Fetches pages over HTTP
    pub struct HttpContentSource {
        client: Client,
    }

    impl HttpContentSource {
        pub fn new(config: &AppConfig) -> Result<Self> {
            let client = Self::build_client(config.http.request_timeout_secs)?;
            Ok(Self { client })
        }

        fn build_client(timeout_secs: u64) -> Result<Client> {
            Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .gzip(true)
                .deflate(true)
                .brotli(true)
                .redirect(reqwest::redirect::Policy::limited(10))
                .default_headers(Self::build_headers())
                .build()
                .map_err(Error::Http)
        }

        fn build_headers() -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert(
                ACCEPT,
                HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
            );
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
            headers.insert(USER_AGENT, HeaderValue::from_static(PAGE_USER_AGENT));
            headers
        }
    }

    #[async_trait(?Send)]
    impl ContentSource for HttpContentSource {
        async fn fetch(&self, url: &Url) -> Result<PageContent> {
            tracing::debug!(url = %url, "Fetching page");

            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::ContentStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let html = response.text().await?;
            parse_page(&html)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Lamp &amp; Light | Studio</title>
</head>
<body class="product">
  <nav class="site-nav"><a class="logo-link" href="/">Studio</a></nav>
  <main><h1>Lamp</h1></main>
  <div class="page-transition-mask revealed"></div>
</body>
</html>"#;

    #[test]
    fn test_parse_page_extracts_title_and_body() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.title, "Lamp & Light | Studio");
        assert!(page.body.starts_with("<nav class=\"site-nav\">"));
        assert!(page.body.contains("<h1>Lamp</h1>"));
        assert!(!page.body.contains(MASK_CLASS));
        assert!(!page.body.contains("</body>"));
    }

    #[test]
    fn test_title_character_references() {
        let html = "<title>Work &#8211; Studio&#x2019;s &ldquo;Lamp&rdquo;</title><body></body>";
        assert_eq!(parse_page(html).unwrap().title, "Work \u{2013} Studio\u{2019}s \u{201c}Lamp\u{201d}");

        // One pass: an escaped ampersand is not decoded twice
        assert_eq!(decode_entities("&amp;lt; &unknown; &#0; &#x110000;"), "&lt; &unknown; \u{fffd} \u{fffd}");
    }

    #[test]
    fn test_title_whitespace_collapses() {
        let html = "<title>\n  Lamp&nbsp;&amp;\n  Light  </title><body></body>";
        assert_eq!(parse_page(html).unwrap().title, "Lamp\u{a0}& Light");
    }

    #[test]
    fn test_parse_page_tolerates_missing_pieces() {
        let page = parse_page("<body><p>hi</p>").unwrap();
        assert_eq!(page.title, "");
        assert_eq!(page.body, "<p>hi</p>");
    }

    #[test]
    fn test_parse_page_without_body_fails() {
        let err = parse_page("<html><head><title>x</title></head></html>").unwrap_err();
        assert!(matches!(err, Error::Markup(_)));
    }

    #[test]
    fn test_mask_with_other_classes_is_stripped() {
        let html = r#"<body><div id="m" class="active page-transition-mask covered"> </div><p>x</p></body>"#;
        assert_eq!(parse_page(html).unwrap().body, "<p>x</p>");
    }
}
