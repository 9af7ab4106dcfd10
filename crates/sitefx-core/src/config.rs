use serde::{Deserialize, Serialize};
use std::path::Path;
#[cfg(feature = "native")]
use std::path::PathBuf;

use crate::motion::CubicBezier;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll_lock: ScrollLockConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Feature-tab scroll capture tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollLockConfig {
    /// Virtual scroll units consumed by each tab
    #[serde(default = "default_units_per_tab")]
    pub units_per_tab: f64,
    /// Sticky wrapper top edge (px from viewport top) at or above which the section locks
    #[serde(default = "default_lock_offset")]
    pub lock_offset_px: f64,
    /// Buffer value below which the section releases upward
    #[serde(default = "default_upward_unlock_threshold")]
    pub upward_unlock_threshold: f64,
    /// Multiplier applied to finger travel before it enters the buffer
    #[serde(default = "default_touch_sensitivity")]
    pub touch_sensitivity: f64,
    /// Delay before an activated panel fades in
    #[serde(default = "default_panel_reveal_delay")]
    pub panel_reveal_delay_ms: f64,
    /// Section ids below the feature section; linking to them bypasses the lock
    #[serde(default = "default_downstream_sections")]
    pub downstream_sections: Vec<String>,
}

impl Default for ScrollLockConfig {
    fn default() -> Self {
        Self {
            units_per_tab: default_units_per_tab(),
            lock_offset_px: default_lock_offset(),
            upward_unlock_threshold: default_upward_unlock_threshold(),
            touch_sensitivity: default_touch_sensitivity(),
            panel_reveal_delay_ms: default_panel_reveal_delay(),
            downstream_sections: default_downstream_sections(),
        }
    }
}

impl ScrollLockConfig {
    /// Total buffer span for `tab_count` tabs
    pub fn span(&self, tab_count: usize) -> f64 {
        self.units_per_tab * tab_count as f64
    }

    /// True if `section_id` (with or without a leading `#`) lives below the feature section
    pub fn is_downstream(&self, section_id: &str) -> bool {
        let id = section_id.trim_start_matches('#');
        !id.is_empty() && self.downstream_sections.iter().any(|s| s == id)
    }

    /// True for an in-page link (`#id`) whose target lives below the feature section
    pub fn is_downstream_anchor(&self, href: &str) -> bool {
        href.strip_prefix('#').is_some_and(|id| self.is_downstream(id))
    }

    /// Whether a fresh session should start with the lock already spent
    ///
    /// `fragment` is the page URL's fragment at load time; `requested` is set
    /// when the user followed an in-page link to a downstream section.
    pub fn bypass_for(&self, fragment: Option<&str>, requested: bool) -> bool {
        requested || fragment.is_some_and(|f| self.is_downstream(f))
    }
}

/// Timing of one mask animation profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Nominal duration of each vertex's travel
    pub duration_ms: f64,
    /// Delay of the trailing diagonal pair relative to the leading pair
    pub pair_delay_ms: f64,
}

/// Page-transition mask tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Viewports at or below this width use the compact profile
    #[serde(default = "default_compact_max_width")]
    pub compact_max_width: f64,
    /// Pause between covering the screen and starting the reveal
    #[serde(default = "default_entrance_delay")]
    pub entrance_delay_ms: f64,
    /// Easing of the leading pair (top-left, bottom-right)
    #[serde(default = "default_leading_easing")]
    pub leading_easing: CubicBezier,
    /// Easing of the trailing pair (top-right, bottom-left)
    #[serde(default = "default_trailing_easing")]
    pub trailing_easing: CubicBezier,
    #[serde(default = "default_desktop_profile")]
    pub desktop: TimingProfile,
    #[serde(default = "default_compact_profile")]
    pub compact: TimingProfile,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            compact_max_width: default_compact_max_width(),
            entrance_delay_ms: default_entrance_delay(),
            leading_easing: default_leading_easing(),
            trailing_easing: default_trailing_easing(),
            desktop: default_desktop_profile(),
            compact: default_compact_profile(),
        }
    }
}

impl TransitionConfig {
    /// True when a viewport of this width gets the compact profile
    pub fn is_compact(&self, viewport_width: f64) -> bool {
        viewport_width <= self.compact_max_width
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_units_per_tab() -> f64 {
    300.0
}

fn default_lock_offset() -> f64 {
    110.0
}

fn default_upward_unlock_threshold() -> f64 {
    -50.0
}

fn default_touch_sensitivity() -> f64 {
    2.0
}

fn default_panel_reveal_delay() -> f64 {
    50.0
}

fn default_downstream_sections() -> Vec<String> {
    vec![
        "products".to_string(),
        "solutions".to_string(),
        "contact".to_string(),
    ]
}

fn default_compact_max_width() -> f64 {
    1023.0
}

fn default_entrance_delay() -> f64 {
    100.0
}

fn default_leading_easing() -> CubicBezier {
    CubicBezier::STANDARD
}

fn default_trailing_easing() -> CubicBezier {
    CubicBezier::TRAILING
}

fn default_desktop_profile() -> TimingProfile {
    TimingProfile {
        duration_ms: 1200.0,
        pair_delay_ms: 250.0,
    }
}

fn default_compact_profile() -> TimingProfile {
    TimingProfile {
        duration_ms: 400.0,
        pair_delay_ms: 100.0,
    }
}

fn default_timeout() -> u64 {
    15
}

impl AppConfig {
    /// Load configuration from the default location, or defaults if absent
    #[cfg(feature = "native")]
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    #[cfg(feature = "native")]
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/sitefx/config.toml on all platforms
    #[cfg(feature = "native")]
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sitefx")
            .join("config.toml")
    }

    /// Reject values the engines cannot run with
    ///
    /// Every number must be finite; comparisons alone would let NaN through.
    pub fn validate(&self) -> crate::Result<()> {
        let lock = &self.scroll_lock;
        positive("scroll_lock.units_per_tab", lock.units_per_tab)?;
        positive("scroll_lock.touch_sensitivity", lock.touch_sensitivity)?;
        finite("scroll_lock.lock_offset_px", lock.lock_offset_px)?;
        if !(lock.upward_unlock_threshold.is_finite() && lock.upward_unlock_threshold <= 0.0) {
            return Err(invalid("scroll_lock.upward_unlock_threshold must not be positive"));
        }
        non_negative("scroll_lock.panel_reveal_delay_ms", lock.panel_reveal_delay_ms)?;

        let transition = &self.transition;
        non_negative("transition.compact_max_width", transition.compact_max_width)?;
        non_negative("transition.entrance_delay_ms", transition.entrance_delay_ms)?;
        for (name, profile) in [("desktop", transition.desktop), ("compact", transition.compact)] {
            positive(&format!("transition.{}.duration_ms", name), profile.duration_ms)?;
            non_negative(&format!("transition.{}.pair_delay_ms", name), profile.pair_delay_ms)?;
        }

        Ok(())
    }
}

fn invalid(message: &str) -> crate::Error {
    crate::Error::Config(message.to_string())
}

fn finite(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be a finite number", name)))
    }
}

fn positive(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be positive", name)))
    }
}

fn non_negative(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{} must not be negative", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scroll_lock.units_per_tab, 300.0);
        assert_eq!(config.scroll_lock.lock_offset_px, 110.0);
        assert_eq!(config.scroll_lock.upward_unlock_threshold, -50.0);
        assert_eq!(config.scroll_lock.touch_sensitivity, 2.0);
        assert_eq!(config.transition.desktop.duration_ms, 1200.0);
        assert_eq!(config.transition.compact.pair_delay_ms, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [scroll_lock]
            units_per_tab = 250.0

            [transition.compact]
            duration_ms = 300.0
            pair_delay_ms = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll_lock.units_per_tab, 250.0);
        assert_eq!(config.scroll_lock.touch_sensitivity, 2.0);
        assert_eq!(config.transition.compact.duration_ms, 300.0);
        assert_eq!(config.transition.desktop.duration_ms, 1200.0);
        assert_eq!(config.transition.leading_easing, CubicBezier::STANDARD);
    }

    #[test]
    fn test_easing_parsed_and_validated() {
        let config = AppConfig::from_toml(
            r#"
            [transition]
            leading_easing = [0.25, 0.1, 0.25, 1.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.transition.leading_easing, CubicBezier::EASE);

        let err = AppConfig::from_toml(
            r#"
            [transition]
            trailing_easing = [1.5, 0.0, 0.2, 1.0]
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.scroll_lock.units_per_tab = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scroll_lock.upward_unlock_threshold = 10.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.transition.desktop.duration_ms = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for toml in [
            "[scroll_lock]\npanel_reveal_delay_ms = nan",
            "[scroll_lock]\nlock_offset_px = nan",
            "[scroll_lock]\nupward_unlock_threshold = -inf",
            "[scroll_lock]\nunits_per_tab = inf",
            "[transition]\ncompact_max_width = nan",
            "[transition]\nentrance_delay_ms = nan",
            "[transition.compact]\nduration_ms = 400.0\npair_delay_ms = nan",
        ] {
            let err = AppConfig::from_toml(toml).unwrap_err();
            assert!(matches!(err, crate::Error::Config(_)), "{toml}");
        }
    }

    #[test]
    fn test_bypass_rules() {
        let lock = ScrollLockConfig::default();
        assert!(lock.bypass_for(Some("contact"), false));
        assert!(lock.bypass_for(Some("#products"), false));
        assert!(!lock.bypass_for(Some("about"), false));
        assert!(!lock.bypass_for(Some(""), false));
        assert!(!lock.bypass_for(None, false));
        assert!(lock.bypass_for(None, true));

        assert!(lock.is_downstream_anchor("#solutions"));
        assert!(!lock.is_downstream_anchor("#"));
        assert!(!lock.is_downstream_anchor("#features"));
        assert!(!lock.is_downstream_anchor("/contact"));
    }

    #[test]
    fn test_compact_breakpoint() {
        let transition = TransitionConfig::default();
        assert!(transition.is_compact(1023.0));
        assert!(transition.is_compact(375.0));
        assert!(!transition.is_compact(1024.0));
    }

    #[test]
    fn test_round_trip_through_toml_text() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.scroll_lock.downstream_sections.len(), 3);
    }
}
