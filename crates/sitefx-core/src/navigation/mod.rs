//! In-place page navigation behind the transition mask
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `url` - Content comparison and link interception rules
//! - `content` - Markup extraction and HTTP fetching
//!
//! ## L3 Molecular Layer
//! - `navigator` - The guarded exit/swap/reinit/entrance pipeline

// L4 Atomic Layer
pub mod content;
pub mod url;

// L3 Molecular Layer
pub mod navigator;

#[cfg(feature = "native")]
pub use content::HttpContentSource;
pub use content::{parse_page, MASK_CLASS};
pub use navigator::{NavigationOutcome, Navigator};
pub use self::url::{normalize_url, same_content, should_intercept, LinkClick};
