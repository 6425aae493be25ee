#![forbid(unsafe_code)]

//! Construction-time attributes for [`StateLayout`](crate::StateLayout).
//!
//! The attribute block is read once when the layout is created. Every field
//! is optional in the serialized form; anything left out falls back to the
//! built-in default, so an empty file (or `StateLayoutConfig::default()`)
//! produces the stock look.
//!
//! ```toml
//! # statelayout.toml
//! [loading]
//! message = "Fetching..."
//! indicator_color = "#FF5722"
//!
//! [error]
//! button_text = "Try again"
//! retry_policy = "show_loading"
//! ```
//!
//! ```rust,ignore
//! let config = StateLayoutConfig::load("statelayout.toml")?;
//! let layout = StateLayout::new(config);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::overlay::Icon;

pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";
pub const DEFAULT_EMPTY_TITLE: &str = "No item found";
pub const DEFAULT_EMPTY_MESSAGE: &str = "Enjoy free day";
pub const DEFAULT_ERROR_TITLE: &str = "Error";
pub const DEFAULT_ERROR_MESSAGE: &str =
    "This error happens because of network connection failure. You may retry later.";
pub const DEFAULT_RETRY_TEXT: &str = "Retry";

const DEFAULT_INDICATOR_SIZE: u16 = 108;
const DEFAULT_IMAGE_SIZE: u16 = 308;
const DEFAULT_TITLE_TEXT_SIZE: f32 = 17.0;
const DEFAULT_TEXT_SIZE: f32 = 14.0;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Default text, colors, sizes and icons for every overlay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateLayoutConfig {
    pub loading: LoadingConfig,
    pub empty: EmptyConfig,
    pub error: ErrorConfig,
    pub progress: ProgressConfig,
}

impl StateLayoutConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load a file by extension (`.json` is JSON, anything else TOML) and
    /// reject it if [`validate`](Self::validate) finds problems.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        tracing::debug!(path = %path.display(), "loaded state layout config");
        Ok(config)
    }

    /// Check every size is usable.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        check_text_size(&mut errors, "loading.text_size", self.loading.text_size);
        check_extent(&mut errors, "loading.indicator_width", self.loading.indicator_width);
        check_extent(&mut errors, "loading.indicator_height", self.loading.indicator_height);

        check_text_size(&mut errors, "empty.title_text_size", self.empty.title_text_size);
        check_text_size(&mut errors, "empty.message_text_size", self.empty.message_text_size);
        check_extent(&mut errors, "empty.image_width", self.empty.image_width);
        check_extent(&mut errors, "empty.image_height", self.empty.image_height);

        check_text_size(&mut errors, "error.title_text_size", self.error.title_text_size);
        check_text_size(&mut errors, "error.message_text_size", self.error.message_text_size);
        check_extent(&mut errors, "error.image_width", self.error.image_width);
        check_extent(&mut errors, "error.image_height", self.error.image_height);
        if self.error.button_text.trim().is_empty() {
            errors.push("error.button_text must not be blank".to_owned());
        }

        check_text_size(&mut errors, "progress.text_size", self.progress.text_size);

        errors
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check_text_size(errors: &mut Vec<String>, field: &str, value: f32) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{field} must be a positive number, got {value}"));
    }
}

fn check_extent(errors: &mut Vec<String>, field: &str, value: u16) {
    if value == 0 {
        errors.push(format!("{field} must be greater than zero"));
    }
}

// ---------------------------------------------------------------------------
// Per-overlay sections
// ---------------------------------------------------------------------------

/// Loading overlay attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub message: String,
    /// Message text size in sp.
    pub text_size: f32,
    pub text_color: Rgb,
    /// Indicator width in px.
    pub indicator_width: u16,
    /// Indicator height in px.
    pub indicator_height: u16,
    pub indicator_color: Rgb,
    pub background: Rgb,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_LOADING_MESSAGE.to_owned(),
            text_size: DEFAULT_TEXT_SIZE,
            text_color: Rgb::BLACK,
            indicator_width: DEFAULT_INDICATOR_SIZE,
            indicator_height: DEFAULT_INDICATOR_SIZE,
            indicator_color: Rgb::RED,
            background: Rgb::BACKGROUND,
        }
    }
}

/// Empty overlay attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmptyConfig {
    pub icon: Icon,
    pub title: String,
    pub message: String,
    pub image_width: u16,
    pub image_height: u16,
    pub title_text_size: f32,
    pub message_text_size: f32,
    pub title_color: Rgb,
    pub message_color: Rgb,
    pub background: Rgb,
}

impl Default for EmptyConfig {
    fn default() -> Self {
        Self {
            icon: Icon::Email,
            title: DEFAULT_EMPTY_TITLE.to_owned(),
            message: DEFAULT_EMPTY_MESSAGE.to_owned(),
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            title_text_size: DEFAULT_TITLE_TEXT_SIZE,
            message_text_size: DEFAULT_TEXT_SIZE,
            title_color: Rgb::BLACK,
            message_color: Rgb::BLACK,
            background: Rgb::BACKGROUND,
        }
    }
}

/// What tapping the error overlay's button does before the retry callback
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Hide the error overlay, revealing the content underneath.
    #[default]
    DismissError,
    /// Switch straight to the loading overlay with its default message.
    ShowLoading,
}

/// Error overlay attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorConfig {
    pub icon: Icon,
    pub title: String,
    pub message: String,
    pub image_width: u16,
    pub image_height: u16,
    pub title_text_size: f32,
    pub message_text_size: f32,
    pub title_color: Rgb,
    pub message_color: Rgb,
    pub button_text: String,
    pub button_text_color: Rgb,
    pub button_background: Rgb,
    pub background: Rgb,
    pub retry_policy: RetryPolicy,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            icon: Icon::NoConnection,
            title: DEFAULT_ERROR_TITLE.to_owned(),
            message: DEFAULT_ERROR_MESSAGE.to_owned(),
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            title_text_size: DEFAULT_TITLE_TEXT_SIZE,
            message_text_size: DEFAULT_TEXT_SIZE,
            title_color: Rgb::BLACK,
            message_color: Rgb::BLACK,
            button_text: DEFAULT_RETRY_TEXT.to_owned(),
            button_text_color: Rgb::PRIMARY,
            button_background: Rgb::WHITE,
            background: Rgb::BACKGROUND,
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Progress overlay attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub message: String,
    pub text_size: f32,
    pub text_color: Rgb,
    pub bar_color: Rgb,
    pub background: Rgb,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_LOADING_MESSAGE.to_owned(),
            text_size: DEFAULT_TEXT_SIZE,
            text_color: Rgb::BLACK,
            bar_color: Rgb::RED,
            background: Rgb::BACKGROUND,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
