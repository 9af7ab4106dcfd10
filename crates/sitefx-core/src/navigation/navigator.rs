//! L3 Molecular Layer: Animated in-place navigation
//!
//! One navigation runs at a time: cover the page, swap content, re-run page
//! scripts, reveal. Anything that goes wrong before the reveal ends in a
//! full page load to the target instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use url::Url;

use super::url::{normalize_url, should_intercept, LinkClick};
use crate::frame::FrameClock;
use crate::page::{ContentSource, MaskSurface, PageHost};
use crate::transition::TransitionMaskAnimator;
use crate::{Error, Result};

/// How a navigation request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Content swapped and revealed in place
    Completed,
    /// Dropped because another navigation was running
    Ignored,
    /// Target is the content already shown
    AlreadyCurrent,
    /// Handed to the host as a full page load
    FellBack,
}

impl NavigationOutcome {
    pub fn name(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Ignored => "ignored",
            Self::AlreadyCurrent => "already-current",
            Self::FellBack => "fell-back",
        }
    }
}

/// Host and mask, used exclusively by whichever run holds the lock
struct Stage<H, M> {
    host: H,
    animator: TransitionMaskAnimator<M>,
}

pub struct Navigator<S, H, M, C> {
    source: S,
    clock: C,
    stage: AsyncMutex<Stage<H, M>>,
    in_flight: AtomicBool,
    current_url: Mutex<Url>,
    /// Latest viewport width, applied when the next run starts
    pending_width: Mutex<Option<f64>>,
}

impl<S, H, M, C> Navigator<S, H, M, C>
where
    S: ContentSource,
    H: PageHost,
    M: MaskSurface,
    C: FrameClock,
{
    pub fn new(
        source: S,
        host: H,
        animator: TransitionMaskAnimator<M>,
        clock: C,
        current_url: Url,
    ) -> Self {
        Self {
            source,
            clock,
            stage: AsyncMutex::new(Stage { host, animator }),
            in_flight: AtomicBool::new(false),
            current_url: Mutex::new(current_url),
            pending_width: Mutex::new(None),
        }
    }

    /// URL of the content currently shown
    pub fn current_url(&self) -> Url {
        self.current_url
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Record a viewport resize; a run already in progress keeps its timing
    pub fn set_viewport_width(&self, width: f64) {
        *self.pending_width.lock().unwrap_or_else(|e| e.into_inner()) = Some(width);
    }

    /// Decide whether a link click becomes an animated navigation
    pub fn intercept(&self, link: &LinkClick) -> Option<Url> {
        should_intercept(&self.current_url(), link)
    }

    /// Settle the mask for a freshly loaded document
    ///
    /// Plays the entrance when the page was reached through a transition (or
    /// back/forward), otherwise shows content immediately.
    pub async fn on_page_load(&self, arrived_via_navigation: bool) {
        let mut stage = self.stage.lock().await;
        self.apply_pending_width(&mut stage);

        if arrived_via_navigation {
            stage.host.set_navigating_marker(false);
            stage.animator.play_entrance(&self.clock).await;
            info!(url = %self.current_url(), "Entrance played on page load");
        } else {
            stage.animator.snap_revealed();
        }
    }

    /// Browser back/forward: the address bar already shows `url`
    pub async fn on_history_pop(&self, url: Url) -> NavigationOutcome {
        self.navigate(url, false).await
    }

    /// Run the full exit, swap, reinitialize, entrance sequence
    pub async fn navigate(&self, url: Url, push_state: bool) -> NavigationOutcome {
        if self.is_in_flight() {
            debug!(url = %url, "Navigation already running, request dropped");
            return NavigationOutcome::Ignored;
        }
        if normalize_url(url.as_str()) == normalize_url(self.current_url().as_str()) {
            debug!(url = %url, "Already showing this page");
            return NavigationOutcome::AlreadyCurrent;
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return NavigationOutcome::Ignored;
        }

        info!(url = %url, push_state, "Navigation started");
        let mut stage = self.stage.lock().await;
        self.apply_pending_width(&mut stage);

        let outcome = match self.run(&mut stage, &url, push_state).await {
            Ok(()) => {
                info!(url = %url, "Navigation completed");
                NavigationOutcome::Completed
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Transition failed, falling back to full page load");
                stage.host.set_navigating_marker(true);
                stage.host.hard_navigate(&url);
                NavigationOutcome::FellBack
            }
        };

        drop(stage);
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self, stage: &mut Stage<H, M>, url: &Url, push_state: bool) -> Result<()> {
        stage.host.set_navigating_marker(true);
        stage.animator.play_exit(&self.clock).await;

        let content = self.source.fetch(url).await?;

        let mut swapped = false;
        if push_state && stage.host.supports_view_transition() {
            match stage.host.swap_with_view_transition(content.clone()).await {
                Ok(()) => swapped = true,
                Err(Error::Unsupported(what)) => {
                    debug!(%what, "View transition unavailable, swapping manually");
                }
                Err(e) => return Err(e),
            }
        }
        if !swapped {
            stage.host.swap_content(&content)?;
        }

        stage.host.reinitialize()?;
        if push_state {
            stage.host.push_history(url);
        }
        stage.host.scroll_to_top();

        *self.current_url.lock().unwrap_or_else(|e| e.into_inner()) = url.clone();

        stage.animator.play_entrance(&self.clock).await;
        // No page load follows an in-place swap
        stage.host.set_navigating_marker(false);
        Ok(())
    }

    fn apply_pending_width(&self, stage: &mut Stage<H, M>) {
        let pending = self
            .pending_width
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(width) = pending {
            stage.animator.set_viewport_width(width);
        }
    }

    /// Tear down, handing the collaborators back
    pub fn into_parts(self) -> (S, H, TransitionMaskAnimator<M>, C) {
        let stage = self.stage.into_inner();
        (self.source, stage.host, stage.animator, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionConfig;
    use crate::frame::SteppedClock;
    use crate::headless::{HeadlessHost, HeadlessMask, StaticContentSource};
    use crate::page::MaskPhase;
    use crate::transition::ViewportClass;

    type TestNavigator = Navigator<StaticContentSource, HeadlessHost, HeadlessMask, SteppedClock>;

    fn url(path: &str) -> Url {
        Url::parse("https://studio.test/").unwrap().join(path).unwrap()
    }

    fn site() -> StaticContentSource {
        StaticContentSource::new()
            .with_page("https://studio.test/", "Studio", "<main>home</main>")
            .with_page("https://studio.test/about", "About", "<main>about</main>")
            .with_page("https://studio.test/work", "Work", "<main>work</main>")
    }

    fn navigator(host: HeadlessHost) -> TestNavigator {
        let animator =
            TransitionMaskAnimator::new(HeadlessMask::default(), TransitionConfig::default(), 1440.0);
        Navigator::new(site(), host, animator, SteppedClock::new(16.0), url("/"))
    }

    #[tokio::test]
    async fn test_navigate_swaps_content_in_order() {
        let nav = navigator(HeadlessHost::new());
        let outcome = nav.navigate(url("/about"), true).await;
        assert_eq!(outcome, NavigationOutcome::Completed);
        assert_eq!(nav.current_url(), url("/about"));
        assert!(!nav.is_in_flight());

        let (source, host, animator, _) = nav.into_parts();
        assert_eq!(source.requests(), vec![url("/about")]);
        assert_eq!(host.title, "About");
        assert_eq!(host.body, "<main>about</main>");
        assert_eq!(host.history, vec![url("/about")]);
        assert_eq!(host.reinitialized, 1);
        assert_eq!(host.scrolled_to_top, 1);
        assert_eq!(host.view_transitions_run, 0);
        assert!(!host.navigating_marker);
        assert!(host.hard_navigations.is_empty());
        assert_eq!(
            animator.mask().phase_history,
            vec![
                MaskPhase::Revealed,
                MaskPhase::Covering,
                MaskPhase::Covered,
                MaskPhase::Revealing,
                MaskPhase::Revealed,
            ]
        );
    }

    #[tokio::test]
    async fn test_same_content_is_noop() {
        let nav = navigator(HeadlessHost::new());
        let outcome = nav.navigate(url("/#contact"), true).await;
        assert_eq!(outcome, NavigationOutcome::AlreadyCurrent);
        assert!(!nav.is_in_flight());

        let (source, host, animator, _) = nav.into_parts();
        assert!(source.requests().is_empty());
        assert!(host.history.is_empty());
        assert_eq!(animator.mask().phase_history, vec![MaskPhase::Revealed]);
    }

    #[tokio::test]
    async fn test_concurrent_request_is_dropped() {
        let nav = navigator(HeadlessHost::new());
        let (first, second) = tokio::join!(
            nav.navigate(url("/about"), true),
            nav.navigate(url("/work"), true)
        );
        assert_eq!(first, NavigationOutcome::Completed);
        assert_eq!(second, NavigationOutcome::Ignored);
        assert_eq!(nav.current_url(), url("/about"));

        // Guard clears once the run is done
        assert_eq!(nav.navigate(url("/work"), true).await, NavigationOutcome::Completed);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_full_load() {
        let nav = navigator(HeadlessHost::new());
        let outcome = nav.navigate(url("/missing"), true).await;
        assert_eq!(outcome, NavigationOutcome::FellBack);
        assert_eq!(nav.current_url(), url("/"));
        assert!(!nav.is_in_flight());

        let (_, host, _, _) = nav.into_parts();
        assert_eq!(host.hard_navigations, vec![url("/missing")]);
        assert!(host.navigating_marker);
        assert!(host.history.is_empty());
    }

    #[tokio::test]
    async fn test_reinitialize_failure_falls_back() {
        let mut host = HeadlessHost::new();
        host.fail_reinitialize = true;
        let nav = navigator(host);
        assert_eq!(nav.navigate(url("/work"), true).await, NavigationOutcome::FellBack);
        let (_, host, _, _) = nav.into_parts();
        assert_eq!(host.hard_navigations, vec![url("/work")]);
    }

    #[tokio::test]
    async fn test_view_transition_used_only_when_pushing() {
        let nav = navigator(HeadlessHost::new().with_view_transition());
        nav.navigate(url("/about"), true).await;
        nav.on_history_pop(url("/")).await;

        let (_, host, _, _) = nav.into_parts();
        assert_eq!(host.view_transitions_run, 1);
        // Pop does not push a history entry
        assert_eq!(host.history, vec![url("/about")]);
        assert_eq!(host.title, "Studio");
    }

    #[tokio::test]
    async fn test_rejected_view_transition_swaps_manually() {
        let mut host = HeadlessHost::new().with_view_transition();
        host.reject_view_transition = true;
        let nav = navigator(host);
        assert_eq!(nav.navigate(url("/work"), true).await, NavigationOutcome::Completed);

        let (_, host, _, _) = nav.into_parts();
        assert_eq!(host.view_transitions_run, 0);
        assert_eq!(host.title, "Work");
        assert!(host.hard_navigations.is_empty());
    }

    #[tokio::test]
    async fn test_page_load_entrance_decision() {
        let nav = navigator(HeadlessHost::new());
        nav.on_page_load(false).await;
        let before = nav.clock().now();
        assert_eq!(before, 0.0);

        let mut host = HeadlessHost::new();
        host.navigating_marker = true;
        let nav = navigator(host);
        nav.on_page_load(true).await;
        assert!(nav.clock().now() > 1000.0);
        let (_, host, animator, _) = nav.into_parts();
        assert!(!host.navigating_marker);
        assert_eq!(animator.mask().phase, MaskPhase::Revealed);
    }

    #[tokio::test]
    async fn test_resize_applies_to_next_run() {
        let nav = navigator(HeadlessHost::new());
        nav.set_viewport_width(500.0);
        nav.navigate(url("/about"), true).await;
        let (_, _, animator, _) = nav.into_parts();
        assert_eq!(animator.viewport_class(), ViewportClass::Compact);
    }

    /// Single-threaded source, the shape of a browser `fetch` handle
    struct SharedSource(std::rc::Rc<StaticContentSource>);

    #[async_trait::async_trait(?Send)]
    impl ContentSource for SharedSource {
        async fn fetch(&self, url: &Url) -> Result<crate::page::PageContent> {
            self.0.fetch(url).await
        }
    }

    #[tokio::test]
    async fn test_single_threaded_collaborators() {
        let source = std::rc::Rc::new(site());
        let animator =
            TransitionMaskAnimator::new(HeadlessMask::default(), TransitionConfig::default(), 1440.0);
        let nav = Navigator::new(
            SharedSource(source.clone()),
            HeadlessHost::new(),
            animator,
            SteppedClock::new(16.0),
            url("/"),
        );
        let (first, second) = tokio::join!(
            nav.navigate(url("/work"), true),
            nav.navigate(url("/about"), true)
        );
        assert_eq!(first, NavigationOutcome::Completed);
        assert_eq!(second, NavigationOutcome::Ignored);
        assert_eq!(source.requests(), vec![url("/work")]);
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(NavigationOutcome::Completed.name(), "completed");
        assert_eq!(NavigationOutcome::AlreadyCurrent.name(), "already-current");
        assert_eq!(NavigationOutcome::FellBack.name(), "fell-back");
    }

    #[test]
    fn test_intercept_uses_current_content_url() {
        let nav = navigator(HeadlessHost::new());
        assert_eq!(nav.intercept(&LinkClick::new("/work")), Some(url("/work")));
        assert_eq!(nav.intercept(&LinkClick::new("/#products")), None);
    }
}
