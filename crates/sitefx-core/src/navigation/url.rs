//! URL comparison and link interception rules

use url::Url;

/// Comparison key for "already showing this content": fragment and one
/// trailing slash removed
pub fn normalize_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// True if both URLs name the same content
pub fn same_content(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}

/// A primary-button click on an anchor element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    pub href: String,
    /// The anchor's `target` attribute, if any
    pub target: Option<String>,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl LinkClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    fn has_modifier(&self) -> bool {
        self.ctrl || self.meta || self.shift
    }
}

/// Resolve a click into a transition target, or `None` to let the browser
/// handle it
///
/// Only same-origin links to a different path are taken over. Links with a
/// `target`, or clicked with ctrl/meta/shift held, open the browser's way.
pub fn should_intercept(current: &Url, link: &LinkClick) -> Option<Url> {
    if link.href.is_empty() || link.has_modifier() {
        return None;
    }
    if link.target.as_deref().is_some_and(|t| !t.is_empty()) {
        return None;
    }

    let url = current.join(&link.href).ok()?;
    if url.origin() != current.origin() || url.path() == current.path() {
        return None;
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Url {
        Url::parse("https://studio.test/work/").unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://studio.test/work/"), "https://studio.test/work");
        assert_eq!(normalize_url("https://studio.test/work#team"), "https://studio.test/work");
        assert_eq!(normalize_url("https://studio.test/work/#team"), "https://studio.test/work");
        assert_eq!(normalize_url("https://studio.test/"), "https://studio.test");
        assert!(same_content("https://studio.test/about", "https://studio.test/about/#top"));
        assert!(!same_content("https://studio.test/about", "https://studio.test/work"));
    }

    #[test]
    fn test_intercepts_same_origin_other_path() {
        let url = should_intercept(&current(), &LinkClick::new("/about")).unwrap();
        assert_eq!(url.as_str(), "https://studio.test/about");

        let absolute = LinkClick::new("https://studio.test/products/lamp");
        assert!(should_intercept(&current(), &absolute).is_some());
    }

    #[test]
    fn test_leaves_other_links_alone() {
        let cur = current();
        assert!(should_intercept(&cur, &LinkClick::new("https://elsewhere.test/about")).is_none());
        // Same path, only a fragment differs
        assert!(should_intercept(&cur, &LinkClick::new("/work/#team")).is_none());
        assert!(should_intercept(&cur, &LinkClick::new("")).is_none());

        let mut blank = LinkClick::new("/about");
        blank.target = Some("_blank".to_string());
        assert!(should_intercept(&cur, &blank).is_none());

        for modifier in 0..3 {
            let mut click = LinkClick::new("/about");
            match modifier {
                0 => click.ctrl = true,
                1 => click.meta = true,
                _ => click.shift = true,
            }
            assert!(should_intercept(&cur, &click).is_none());
        }
    }
}
