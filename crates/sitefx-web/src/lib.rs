#![forbid(unsafe_code)]

//! Browser binding for the sitefx engines.
//!
//! On `wasm32` the collaborator traits are implemented over `web-sys` and the
//! controllers are exported through `wasm-bindgen`. The page's JavaScript only
//! forwards events and `requestAnimationFrame` timestamps; navigations run on
//! `requestAnimationFrame` from inside the binding and resolve as promises.
//!
//! After an in-place swap the binding fires `pageTransitionComplete` on the
//! window, which is where page scripts re-attach their scroll lock.

pub mod resize;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use resize::ResizeTracker;

/// Markup hooks the binding looks up in the document
pub mod selectors {
    pub const FEATURE_SECTION: &str = ".features-tabs-section";
    pub const STICKY_WRAPPER: &str = ".features-sticky-wrapper";
    pub const FEATURE_TAB: &str = ".feature-tab";
    pub const TAB_PANEL: &str = ".tab-panel";

    /// Class marking the active tab and panel
    pub const ACTIVE: &str = "active";
    /// Class switching the sticky wrapper to fixed positioning
    pub const POSITION_LOCKED: &str = "position-locked";

    /// Every class a mask phase may set
    pub const MASK_PHASE_CLASSES: [&str; 3] = ["revealed", "active", "covered"];

    /// Session storage key telling the next page load it was reached by a transition
    pub const NAVIGATING_KEY: &str = "pageTransitionNavigating";

    /// Window event announcing swapped-in content
    pub const TRANSITION_COMPLETE_EVENT: &str = "pageTransitionComplete";

    /// Page script hooks re-run after a swap, in order
    pub const REINIT_HOOKS: [&str; 2] = ["initializeWebsite", "initializeAnimations"];
}
