use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{MnemographError, Result};
use crate::graph::GraphMode;

/// Main configuration structure for mnemograph
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Row-packing layout parameters
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Pan/zoom limits and zoom step factors
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Forgetting-curve thresholds
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Retention curve plot configuration
    #[serde(default)]
    pub curve: CurveConfig,
    /// Interactive viewer configuration
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".mnemograph").join("config.toml")),
            dirs::config_dir().map(|c| c.join("mnemograph").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MnemographError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MnemographError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the layout and viewport math divides by or clamps with
    pub fn validate(&self) -> Result<()> {
        let viewport = &self.viewport;
        let scales_ok = viewport.min_scale.is_finite()
            && viewport.max_scale.is_finite()
            && viewport.min_scale > 0.0
            && viewport.min_scale <= viewport.max_scale;
        if !scales_ok {
            return Err(MnemographError::Config(format!(
                "viewport scale range must satisfy 0 < min_scale <= max_scale, got {}..{}",
                viewport.min_scale, viewport.max_scale
            )));
        }

        let layout = &self.layout;
        let pitch = layout.node_size + layout.horizontal_gap;
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(MnemographError::Config(format!(
                "layout node_size + horizontal_gap must be positive, got {pitch}"
            )));
        }
        if !(layout.width_bonus_reference.is_finite() && layout.width_bonus_reference > 0.0) {
            return Err(MnemographError::Config(format!(
                "layout width_bonus_reference must be positive, got {}",
                layout.width_bonus_reference
            )));
        }
        Ok(())
    }
}

/// Layout engine configuration (graph-space units)
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Y coordinate of the first depth block
    #[serde(default = "default_top_margin")]
    pub top_margin: f64,
    /// Vertical gap between depth blocks
    #[serde(default = "default_depth_spacing")]
    pub depth_spacing: f64,
    /// Vertical offset between layers sharing a depth
    #[serde(default = "default_layer_spacing")]
    pub layer_spacing: f64,
    /// Node diameter
    #[serde(default = "default_node_size")]
    pub node_size: f64,
    /// Horizontal gap between nodes in a row
    #[serde(default = "default_horizontal_gap")]
    pub horizontal_gap: f64,
    /// Vertical gap between wrapped rows
    #[serde(default = "default_vertical_gap")]
    pub vertical_gap: f64,
    /// Width/height ratio the packing search aims for
    #[serde(default = "default_target_aspect_ratio")]
    pub target_aspect_ratio: f64,
    /// Smallest "max nodes per row" candidate
    #[serde(default = "default_min_nodes_per_row")]
    pub min_nodes_per_row: usize,
    /// Floor for the largest candidate
    #[serde(default = "default_min_search_upper")]
    pub min_search_upper: usize,
    /// Multiple of the canvas width the widest candidate may span
    #[serde(default = "default_search_width_factor")]
    pub search_width_factor: f64,
    /// Layout width at which the width bonus reaches 1.0
    #[serde(default = "default_width_bonus_reference")]
    pub width_bonus_reference: f64,
    /// Upper bound on the width bonus
    #[serde(default = "default_width_bonus_cap")]
    pub width_bonus_cap: f64,
    /// Score multiplier applied to layouts taller than wide
    #[serde(default = "default_tall_penalty")]
    pub tall_penalty: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            top_margin: default_top_margin(),
            depth_spacing: default_depth_spacing(),
            layer_spacing: default_layer_spacing(),
            node_size: default_node_size(),
            horizontal_gap: default_horizontal_gap(),
            vertical_gap: default_vertical_gap(),
            target_aspect_ratio: default_target_aspect_ratio(),
            min_nodes_per_row: default_min_nodes_per_row(),
            min_search_upper: default_min_search_upper(),
            search_width_factor: default_search_width_factor(),
            width_bonus_reference: default_width_bonus_reference(),
            width_bonus_cap: default_width_bonus_cap(),
            tall_penalty: default_tall_penalty(),
        }
    }
}

fn default_top_margin() -> f64 {
    80.0
}

fn default_depth_spacing() -> f64 {
    100.0
}

fn default_layer_spacing() -> f64 {
    25.0
}

fn default_node_size() -> f64 {
    60.0
}

fn default_horizontal_gap() -> f64 {
    80.0
}

fn default_vertical_gap() -> f64 {
    50.0
}

fn default_target_aspect_ratio() -> f64 {
    1.0
}

fn default_min_nodes_per_row() -> usize {
    2
}

fn default_min_search_upper() -> usize {
    20
}

fn default_search_width_factor() -> f64 {
    1.5
}

fn default_width_bonus_reference() -> f64 {
    600.0
}

fn default_width_bonus_cap() -> f64 {
    1.5
}

fn default_tall_penalty() -> f64 {
    0.1
}

/// Viewport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Scale factor per wheel tick scrolling up
    #[serde(default = "default_wheel_zoom_in")]
    pub wheel_zoom_in: f64,
    /// Scale factor per wheel tick scrolling down
    #[serde(default = "default_wheel_zoom_out")]
    pub wheel_zoom_out: f64,
    /// Scale factor of the "+" control
    #[serde(default = "default_button_zoom_in")]
    pub button_zoom_in: f64,
    /// Scale factor of the "-" control
    #[serde(default = "default_button_zoom_out")]
    pub button_zoom_out: f64,
    /// Background grid spacing at scale 1
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            wheel_zoom_in: default_wheel_zoom_in(),
            wheel_zoom_out: default_wheel_zoom_out(),
            button_zoom_in: default_button_zoom_in(),
            button_zoom_out: default_button_zoom_out(),
            grid_spacing: default_grid_spacing(),
        }
    }
}

fn default_min_scale() -> f64 {
    0.1
}

fn default_max_scale() -> f64 {
    3.0
}

fn default_wheel_zoom_in() -> f64 {
    1.05
}

fn default_wheel_zoom_out() -> f64 {
    0.95
}

fn default_button_zoom_in() -> f64 {
    1.1
}

fn default_button_zoom_out() -> f64 {
    0.9
}

fn default_grid_spacing() -> f64 {
    40.0
}

/// Retention model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Retention below which a node is due for review
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            review_threshold: default_review_threshold(),
        }
    }
}

fn default_review_threshold() -> f64 {
    0.6
}

/// Retention curve plot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CurveConfig {
    #[serde(default = "default_curve_width")]
    pub width: f64,
    #[serde(default = "default_curve_height")]
    pub height: f64,
    /// Sub-steps sampled between consecutive history timestamps
    #[serde(default = "default_samples_per_segment")]
    pub samples_per_segment: usize,
    /// Ease factor used when a history snapshot lacks one
    #[serde(default = "default_ease")]
    pub default_ease: f64,
    /// Redraw period in seconds
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            width: default_curve_width(),
            height: default_curve_height(),
            samples_per_segment: default_samples_per_segment(),
            default_ease: default_ease(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

fn default_curve_width() -> f64 {
    400.0
}

fn default_curve_height() -> f64 {
    300.0
}

fn default_samples_per_segment() -> usize {
    100
}

fn default_ease() -> f64 {
    2.5
}

fn default_refresh_secs() -> u64 {
    1
}

/// Interactive viewer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Snapshot file to poll (JSON)
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// Snapshot poll period in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// "Now" clock refresh period in seconds
    #[serde(default = "default_clock_interval_secs")]
    pub clock_interval_secs: u64,
    /// Layer naming scheme
    #[serde(default)]
    pub mode: GraphMode,
    /// Canvas width used before the surface reports a size
    #[serde(default = "default_width")]
    pub default_width: f64,
    /// Canvas height used before the surface reports a size
    #[serde(default = "default_height")]
    pub default_height: f64,
    /// Log file for the terminal viewer
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            poll_interval_secs: default_poll_interval_secs(),
            clock_interval_secs: default_clock_interval_secs(),
            mode: GraphMode::default(),
            default_width: default_width(),
            default_height: default_height(),
            log_file: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_clock_interval_secs() -> u64 {
    1
}

fn default_width() -> f64 {
    1000.0
}

fn default_height() -> f64 {
    600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.layout.top_margin, 80.0);
        assert_eq!(config.layout.depth_spacing, 100.0);
        assert_eq!(config.layout.layer_spacing, 25.0);
        assert_eq!(config.layout.node_size, 60.0);
        assert_eq!(config.layout.horizontal_gap, 80.0);
        assert_eq!(config.layout.vertical_gap, 50.0);
        assert_eq!(config.layout.min_nodes_per_row, 2);
        assert_eq!(config.layout.min_search_upper, 20);
        assert_eq!(config.viewport.min_scale, 0.1);
        assert_eq!(config.viewport.max_scale, 3.0);
        assert_eq!(config.viewport.wheel_zoom_in, 1.05);
        assert_eq!(config.viewport.wheel_zoom_out, 0.95);
        assert_eq!(config.retention.review_threshold, 0.6);
        assert_eq!(config.curve.samples_per_segment, 100);
        assert_eq!(config.curve.default_ease, 2.5);
        assert!(config.viewer.snapshot_path.is_none());
        assert_eq!(config.viewer.mode, GraphMode::Vocabulary);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[layout]
top_margin = 40.0
node_size = 30.0
horizontal_gap = 20.0

[viewport]
max_scale = 5.0
wheel_zoom_in = 1.2

[retention]
review_threshold = 0.5

[curve]
width = 800.0
samples_per_segment = 20

[viewer]
snapshot_path = "/tmp/graph.json"
poll_interval_secs = 5
mode = "article"
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.layout.top_margin, 40.0);
        assert_eq!(config.layout.node_size, 30.0);
        assert_eq!(config.layout.horizontal_gap, 20.0);
        assert_eq!(config.layout.vertical_gap, 50.0);
        assert_eq!(config.viewport.max_scale, 5.0);
        assert_eq!(config.viewport.wheel_zoom_in, 1.2);
        assert_eq!(config.viewport.wheel_zoom_out, 0.95);
        assert_eq!(config.retention.review_threshold, 0.5);
        assert_eq!(config.curve.width, 800.0);
        assert_eq!(config.curve.samples_per_segment, 20);
        assert_eq!(
            config.viewer.snapshot_path,
            Some(PathBuf::from("/tmp/graph.json"))
        );
        assert_eq!(config.viewer.poll_interval_secs, 5);
        assert_eq!(config.viewer.mode, GraphMode::Article);
    }

    #[test]
    fn test_toml_partial_deserialization() {
        let toml_str = r#"
[viewer]
clock_interval_secs = 3
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.viewer.clock_interval_secs, 3);
        assert_eq!(config.viewer.poll_interval_secs, 2);
        assert_eq!(config.layout.node_size, 60.0);
        assert_eq!(config.curve.refresh_secs, 1);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\ndepth_spacing = 64.0\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.layout.depth_spacing, 64.0);
    }

    #[test]
    fn test_load_missing_explicit_path_is_config_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, MnemographError::Config(_)));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[viewport]\nmin_scale = 5.0\nmax_scale = 3.0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, MnemographError::Config(_)));
    }

    #[test]
    fn test_nan_scale_rejected() {
        let mut config = Config::default();
        config.viewport.max_scale = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_layout_divisors_rejected() {
        let mut config = Config::default();
        config.layout.node_size = 0.0;
        config.layout.horizontal_gap = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layout.width_bonus_reference = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let toml_str = r#"
[viewer]
mode = "spreadsheet"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
