//! Collaborator surface between the engines and the page they run on
//!
//! The engines never touch a document directly. A browser binding, the
//! headless model, or a test fake implements these traits.
//!
//! The async traits are `?Send`: browser handles are single-threaded, so a
//! navigation future stays on the thread that started it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::motion::Rect;
use crate::Result;

/// How a programmatic scroll should move the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Window scroll position and geometry
pub trait ScrollPort {
    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn viewport_width(&self) -> f64;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
}

/// The tabbed feature section and its sticky wrapper
pub trait FeatureSection {
    fn tab_count(&self) -> usize;
    fn panel_count(&self) -> usize;
    fn section_rect(&self) -> Rect;
    fn wrapper_rect(&self) -> Rect;
    /// Toggle the fixed-position class that freezes the wrapper on screen
    fn set_wrapper_locked(&mut self, locked: bool);
    fn set_tab_active(&mut self, index: usize, active: bool);
    fn set_panel_active(&mut self, index: usize, active: bool);
}

/// One of the four mask corners, in clockwise order from top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexId {
    Point1,
    Point2,
    Point3,
    Point4,
}

impl VertexId {
    pub const ALL: [VertexId; 4] = [Self::Point1, Self::Point2, Self::Point3, Self::Point4];

    pub fn index(self) -> usize {
        match self {
            Self::Point1 => 0,
            Self::Point2 => 1,
            Self::Point3 => 2,
            Self::Point4 => 3,
        }
    }

    /// Prefix of the CSS custom properties (`--point1X`, `--point1Y`)
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Point1 => "point1",
            Self::Point2 => "point2",
            Self::Point3 => "point3",
            Self::Point4 => "point4",
        }
    }
}

/// A mask vertex position in percent of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Presentation state of the transition mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskPhase {
    /// Content visible, mask idle
    Revealed,
    /// Exit animation running
    Covering,
    /// Screen fully covered
    Covered,
    /// Entrance animation running
    Revealing,
}

impl MaskPhase {
    /// Classes present on the mask element in this phase
    pub fn classes(self) -> &'static [&'static str] {
        match self {
            Self::Revealed => &["revealed"],
            Self::Covering => &["active"],
            Self::Covered => &["active", "covered"],
            Self::Revealing => &["active", "covered"],
        }
    }
}

/// The full-screen transition mask element
pub trait MaskSurface {
    fn set_vertex(&mut self, vertex: VertexId, position: Point);
    fn set_phase(&mut self, phase: MaskPhase);
}

/// Title and body markup of a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageContent {
    pub title: String,
    pub body: String,
}

/// Source of page markup for in-place navigation
#[async_trait(?Send)]
pub trait ContentSource {
    async fn fetch(&self, url: &Url) -> Result<PageContent>;
}

/// Document, history and script lifecycle of the hosting page
#[async_trait(?Send)]
pub trait PageHost {
    /// Whether a browser-native view transition primitive exists
    fn supports_view_transition(&self) -> bool;

    /// Swap content inside a native view transition, resolving when it finishes
    ///
    /// Returns `Error::Unsupported` if the primitive turns out to be unavailable.
    async fn swap_with_view_transition(&mut self, content: PageContent) -> Result<()>;

    /// Replace title and body children, keeping the transition mask in place
    fn swap_content(&mut self, content: &PageContent) -> Result<()>;

    fn push_history(&mut self, url: &Url);

    fn scroll_to_top(&mut self);

    /// Re-run dependent page scripts and announce the completed transition
    fn reinitialize(&mut self) -> Result<()>;

    /// Session flag read by the next page load to decide on an entrance animation
    fn set_navigating_marker(&mut self, navigating: bool);

    /// Traditional full page load, abandoning the animated transition
    fn hard_navigate(&mut self, url: &Url);
}
