//! In-memory page model
//!
//! Implements every collaborator trait without a browser so the engines can
//! be driven from the CLI and from tests. Geometry follows a single tall
//! feature section whose wrapper is `position: sticky` at `sticky_top`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::motion::{clamp, Rect};
use crate::navigation::normalize_url;
use crate::page::{
    ContentSource, FeatureSection, MaskPhase, MaskSurface, PageContent, PageHost, Point,
    ScrollBehavior, ScrollPort, VertexId,
};
use crate::{Error, Result};

/// Page geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadlessLayout {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Document offset of the feature section
    pub section_top: f64,
    pub section_height: f64,
    /// Sticky `top` of the wrapper inside the section
    pub sticky_top: f64,
    pub document_height: f64,
}

impl Default for HeadlessLayout {
    fn default() -> Self {
        Self {
            viewport_width: 1440.0,
            viewport_height: 900.0,
            section_top: 1800.0,
            section_height: 3600.0,
            sticky_top: 100.0,
            document_height: 9000.0,
        }
    }
}

/// A page with one feature section
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    layout: HeadlessLayout,
    scroll_y: f64,
    tabs: Vec<bool>,
    panels: Vec<bool>,
    wrapper_locked: bool,
    scroll_log: Vec<(f64, ScrollBehavior)>,
}

impl HeadlessPage {
    pub fn new(tab_count: usize) -> Self {
        Self::with_layout(tab_count, HeadlessLayout::default())
    }

    pub fn with_layout(tab_count: usize, layout: HeadlessLayout) -> Self {
        Self {
            layout,
            scroll_y: 0.0,
            tabs: vec![false; tab_count],
            panels: vec![false; tab_count],
            wrapper_locked: false,
            scroll_log: Vec::new(),
        }
    }

    pub fn layout(&self) -> &HeadlessLayout {
        &self.layout
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.layout.viewport_width = width;
    }

    /// Natural user scroll, as a browser would apply it when nothing intercepts
    pub fn scroll_by(&mut self, dy: f64) {
        let top = self.scroll_y + dy;
        self.scroll_to(top, ScrollBehavior::Smooth);
    }

    pub fn wrapper_locked(&self) -> bool {
        self.wrapper_locked
    }

    pub fn active_tabs(&self) -> Vec<usize> {
        active_indices(&self.tabs)
    }

    pub fn active_panels(&self) -> Vec<usize> {
        active_indices(&self.panels)
    }

    /// Every programmatic scroll issued so far
    pub fn scroll_log(&self) -> &[(f64, ScrollBehavior)] {
        &self.scroll_log
    }

    fn max_scroll(&self) -> f64 {
        (self.layout.document_height - self.layout.viewport_height).max(0.0)
    }
}

fn active_indices(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, active)| active.then_some(i))
        .collect()
}

impl ScrollPort for HeadlessPage {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.layout.viewport_height
    }

    fn viewport_width(&self) -> f64 {
        self.layout.viewport_width
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_y = clamp(top, 0.0, self.max_scroll());
        self.scroll_log.push((top, behavior));
    }
}

impl FeatureSection for HeadlessPage {
    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn panel_count(&self) -> usize {
        self.panels.len()
    }

    fn section_rect(&self) -> Rect {
        Rect::new(
            self.layout.section_top - self.scroll_y,
            self.layout.section_height,
        )
    }

    fn wrapper_rect(&self) -> Rect {
        let layout = &self.layout;
        let height = layout.viewport_height - layout.sticky_top;
        if self.wrapper_locked {
            return Rect::new(layout.sticky_top, height);
        }
        let natural = layout.section_top - self.scroll_y;
        let section_bottom = natural + layout.section_height;
        let top = natural.max(layout.sticky_top).min(section_bottom - height);
        Rect::new(top, height)
    }

    fn set_wrapper_locked(&mut self, locked: bool) {
        self.wrapper_locked = locked;
    }

    fn set_tab_active(&mut self, index: usize, active: bool) {
        if let Some(tab) = self.tabs.get_mut(index) {
            *tab = active;
        }
    }

    fn set_panel_active(&mut self, index: usize, active: bool) {
        if let Some(panel) = self.panels.get_mut(index) {
            *panel = active;
        }
    }
}

/// Transition mask that records what was written to it
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMask {
    pub points: [Point; 4],
    pub phase: MaskPhase,
    pub phase_history: Vec<MaskPhase>,
    pub vertex_writes: usize,
}

impl Default for HeadlessMask {
    fn default() -> Self {
        Self {
            points: [Point::new(50.0, 50.0); 4],
            phase: MaskPhase::Revealed,
            phase_history: Vec::new(),
            vertex_writes: 0,
        }
    }
}

impl MaskSurface for HeadlessMask {
    fn set_vertex(&mut self, vertex: VertexId, position: Point) {
        self.points[vertex.index()] = position;
        self.vertex_writes += 1;
    }

    fn set_phase(&mut self, phase: MaskPhase) {
        self.phase = phase;
        self.phase_history.push(phase);
    }
}

/// Document, history and lifecycle bookkeeping for navigation runs
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub title: String,
    pub body: String,
    pub history: Vec<Url>,
    pub view_transition: bool,
    /// Advertise view transitions but reject the call, as a browser with a
    /// partial implementation would
    pub reject_view_transition: bool,
    pub view_transitions_run: usize,
    pub navigating_marker: bool,
    pub reinitialized: usize,
    pub scrolled_to_top: usize,
    pub hard_navigations: Vec<Url>,
    /// Make `reinitialize` fail, to exercise the fallback path
    pub fail_reinitialize: bool,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view_transition(mut self) -> Self {
        self.view_transition = true;
        self
    }
}

#[async_trait(?Send)]
impl PageHost for HeadlessHost {
    fn supports_view_transition(&self) -> bool {
        self.view_transition
    }

    async fn swap_with_view_transition(&mut self, content: PageContent) -> Result<()> {
        if !self.view_transition || self.reject_view_transition {
            return Err(Error::Unsupported("view transitions".to_string()));
        }
        self.view_transitions_run += 1;
        self.swap_content(&content)
    }

    fn swap_content(&mut self, content: &PageContent) -> Result<()> {
        self.title = content.title.clone();
        self.body = content.body.clone();
        Ok(())
    }

    fn push_history(&mut self, url: &Url) {
        self.history.push(url.clone());
    }

    fn scroll_to_top(&mut self) {
        self.scrolled_to_top += 1;
    }

    fn reinitialize(&mut self) -> Result<()> {
        if self.fail_reinitialize {
            return Err(Error::Host("page scripts failed to start".to_string()));
        }
        self.reinitialized += 1;
        Ok(())
    }

    fn set_navigating_marker(&mut self, navigating: bool) {
        self.navigating_marker = navigating;
    }

    fn hard_navigate(&mut self, url: &Url) {
        self.hard_navigations.push(url.clone());
    }
}

/// Serves fixed pages keyed by normalized URL
#[derive(Debug, Default)]
pub struct StaticContentSource {
    pages: HashMap<String, PageContent>,
    requests: Mutex<Vec<Url>>,
}

impl StaticContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, title: &str, body: &str) -> Self {
        self.pages.insert(
            normalize_url(url),
            PageContent {
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// URLs requested so far
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait(?Send)]
impl ContentSource for StaticContentSource {
    async fn fetch(&self, url: &Url) -> Result<PageContent> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.clone());
        }
        self.pages
            .get(&normalize_url(url.as_str()))
            .cloned()
            .ok_or(Error::ContentStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_sticks_inside_section() {
        let mut page = HeadlessPage::new(4);
        // Section below the fold: wrapper follows the section
        assert_eq!(page.wrapper_rect().top, 1800.0);
        page.scroll_to(1000.0, ScrollBehavior::Instant);
        assert_eq!(page.wrapper_rect().top, 800.0);
        // Past the section top: pinned at sticky_top
        page.scroll_to(2500.0, ScrollBehavior::Instant);
        assert_eq!(page.wrapper_rect().top, 100.0);
        // Past the section bottom: scrolls away with it
        page.scroll_to(5000.0, ScrollBehavior::Instant);
        assert!(page.wrapper_rect().top < 100.0);
    }

    #[test]
    fn test_scroll_is_clamped_to_document() {
        let mut page = HeadlessPage::new(2);
        page.scroll_by(-100.0);
        assert_eq!(page.scroll_y(), 0.0);
        page.scroll_by(100_000.0);
        assert_eq!(page.scroll_y(), 8100.0);
    }

    #[tokio::test]
    async fn test_static_source_normalizes_keys() {
        let source = StaticContentSource::new().with_page("https://site.test/work/", "Work", "<p/>");
        let url = Url::parse("https://site.test/work#top").unwrap();
        let page = source.fetch(&url).await.unwrap();
        assert_eq!(page.title, "Work");
        assert_eq!(source.requests().len(), 1);

        let missing = Url::parse("https://site.test/nope").unwrap();
        assert!(source.fetch(&missing).await.is_err());
    }
}
