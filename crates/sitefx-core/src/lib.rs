pub mod config;
pub mod error;
pub mod frame;
pub mod headless;
pub mod motion;
pub mod navigation;
pub mod page;
pub mod scroll_lock;
pub mod transition;

pub use config::{AppConfig, ScrollLockConfig, TransitionConfig};
pub use error::{Error, Result};
pub use navigation::{NavigationOutcome, Navigator};
pub use scroll_lock::ScrollLockTabController;
pub use transition::TransitionMaskAnimator;
