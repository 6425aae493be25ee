#![forbid(unsafe_code)]

//! Per-call overrides for the show operations.
//!
//! Every field is optional. Resolution is layered: a value set on the
//! request wins, otherwise the layout's configured default applies (which in
//! turn was filled from the built-in default when the configuration was
//! read).

use std::fmt;

use crate::overlay::{ClickHandler, Icon};

/// Overrides for [`StateLayout::show_loading`](crate::StateLayout::show_loading).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingRequest {
    pub message: Option<String>,
}

impl LoadingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Overrides for [`StateLayout::show_empty`](crate::StateLayout::show_empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyRequest {
    pub icon: Option<Icon>,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl EmptyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Overrides for [`StateLayout::show_error`](crate::StateLayout::show_error).
#[derive(Default)]
pub struct ErrorRequest {
    pub icon: Option<Icon>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub button_text: Option<String>,
    /// Invoked after the retry policy is applied when the button is tapped.
    pub on_retry: Option<ClickHandler>,
}

impl ErrorRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn button_text(mut self, text: impl Into<String>) -> Self {
        self.button_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn on_retry(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_retry = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ErrorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRequest")
            .field("icon", &self.icon)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("button_text", &self.button_text)
            .field("on_retry", &self.on_retry.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Overrides for [`StateLayout::show_progress`](crate::StateLayout::show_progress).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRequest {
    pub message: Option<String>,
    /// Starting value; the indicator clamps it to `0..=100`.
    pub percent: Option<i32>,
}

impl ProgressRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn percent(mut self, percent: i32) -> Self {
        self.percent = Some(percent);
        self
    }
}

/// Pick the per-call value if present, else the configured one.
#[inline]
pub(crate) fn resolve<'a>(requested: Option<&'a str>, configured: &'a str) -> &'a str {
    requested.unwrap_or(configured)
}
