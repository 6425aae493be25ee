#![forbid(unsafe_code)]

//! Overlay views.
//!
//! Each [`OverlayView`] is a small fixed tree: an optional icon, an optional
//! title, a message, an optional action button and an optional progress
//! indicator, stacked vertically over a full-bleed background. The shape of
//! the tree is decided once by [`OverlayView::build`]; afterwards only text,
//! icon, progress value, click handler and visibility change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::StateLayoutConfig;
use crate::container::{ViewId, Visibility};
use crate::state::OverlayKind;

/// Zero-argument click handler attached to a button.
pub type ClickHandler = Box<dyn FnMut()>;

// ---------------------------------------------------------------------------
// Icon
// ---------------------------------------------------------------------------

/// Artwork shown at the top of the empty and error overlays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    /// Envelope; the stock empty-state artwork.
    Email,
    /// Broken link; the stock error-state artwork.
    NoConnection,
    /// Any caller-supplied glyph.
    Glyph(String),
}

impl Icon {
    pub fn glyph(&self) -> &str {
        match self {
            Self::Email => "✉",
            Self::NoConnection => "⚠",
            Self::Glyph(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub id: ViewId,
    pub icon: Icon,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: ViewId,
    pub text: String,
    /// Text size in sp.
    pub size: f32,
    pub color: Rgb,
}

impl Label {
    fn new(text: &str, size: f32, color: Rgb) -> Self {
        Self {
            id: ViewId::next(),
            text: text.to_owned(),
            size,
            color,
        }
    }
}

pub struct Button {
    pub id: ViewId,
    pub label: String,
    pub text_color: Rgb,
    pub background: Rgb,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn has_click_handler(&self) -> bool {
        self.on_click.is_some()
    }

    pub(crate) fn set_on_click(&mut self, handler: Option<ClickHandler>) {
        self.on_click = handler;
    }

    pub(crate) fn take_on_click(&mut self) -> Option<ClickHandler> {
        self.on_click.take()
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("text_color", &self.text_color)
            .field("background", &self.background)
            .field("on_click", &self.on_click.as_ref().map(|_| ".."))
            .finish()
    }
}

/// How a [`ProgressIndicator`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorStyle {
    /// Indeterminate spinner.
    Spinner,
    /// Determinate horizontal bar.
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressIndicator {
    pub id: ViewId,
    pub style: IndicatorStyle,
    pub width: u16,
    pub height: u16,
    pub color: Rgb,
    progress: u8,
    frame: usize,
}

impl ProgressIndicator {
    pub const MAX: u8 = 100;

    fn new(style: IndicatorStyle, width: u16, height: u16, color: Rgb) -> Self {
        Self {
            id: ViewId::next(),
            style,
            width,
            height,
            color,
            progress: 0,
            frame: 0,
        }
    }

    /// Current value in `0..=100`.
    #[inline]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Set the value, clamping to `0..=100`.
    pub fn set_progress(&mut self, percent: i32) {
        self.progress = percent.clamp(0, i32::from(Self::MAX)) as u8;
    }

    #[inline]
    pub const fn frame(&self) -> usize {
        self.frame
    }

    /// Advance the spinner animation.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}

// ---------------------------------------------------------------------------
// OverlayView
// ---------------------------------------------------------------------------

/// A constructed overlay tree for one [`OverlayKind`].
#[derive(Debug)]
pub struct OverlayView {
    pub id: ViewId,
    pub kind: OverlayKind,
    pub background: Rgb,
    pub icon: Option<ImageView>,
    pub title: Option<Label>,
    pub message: Label,
    pub button: Option<Button>,
    pub indicator: Option<ProgressIndicator>,
    visibility: Visibility,
}

impl OverlayView {
    /// Build the overlay for `kind` from the configured defaults. The view
    /// starts out [`Visibility::Gone`].
    pub fn build(kind: OverlayKind, config: &StateLayoutConfig) -> Self {
        let view = match kind {
            OverlayKind::Loading => Self::build_loading(config),
            OverlayKind::Empty => Self::build_empty(config),
            OverlayKind::Error => Self::build_error(config),
            OverlayKind::Progress => Self::build_progress(config),
        };
        tracing::debug!(kind = %kind, id = view.id.get(), "overlay built");
        view
    }

    fn bare(kind: OverlayKind, background: Rgb, message: Label) -> Self {
        Self {
            id: ViewId::next(),
            kind,
            background,
            icon: None,
            title: None,
            message,
            button: None,
            indicator: None,
            visibility: Visibility::Gone,
        }
    }

    fn build_loading(config: &StateLayoutConfig) -> Self {
        let c = &config.loading;
        let mut view = Self::bare(
            OverlayKind::Loading,
            c.background,
            Label::new(&c.message, c.text_size, c.text_color),
        );
        view.indicator = Some(ProgressIndicator::new(
            IndicatorStyle::Spinner,
            c.indicator_width,
            c.indicator_height,
            c.indicator_color,
        ));
        view
    }

    fn build_empty(config: &StateLayoutConfig) -> Self {
        let c = &config.empty;
        let mut view = Self::bare(
            OverlayKind::Empty,
            c.background,
            Label::new(&c.message, c.message_text_size, c.message_color),
        );
        view.icon = Some(ImageView {
            id: ViewId::next(),
            icon: c.icon.clone(),
            width: c.image_width,
            height: c.image_height,
        });
        view.title = Some(Label::new(&c.title, c.title_text_size, c.title_color));
        view
    }

    fn build_error(config: &StateLayoutConfig) -> Self {
        let c = &config.error;
        let mut view = Self::bare(
            OverlayKind::Error,
            c.background,
            Label::new(&c.message, c.message_text_size, c.message_color),
        );
        view.icon = Some(ImageView {
            id: ViewId::next(),
            icon: c.icon.clone(),
            width: c.image_width,
            height: c.image_height,
        });
        view.title = Some(Label::new(&c.title, c.title_text_size, c.title_color));
        view.button = Some(Button {
            id: ViewId::next(),
            label: c.button_text.clone(),
            text_color: c.button_text_color,
            background: c.button_background,
            on_click: None,
        });
        view
    }

    fn build_progress(config: &StateLayoutConfig) -> Self {
        let c = &config.progress;
        let mut view = Self::bare(
            OverlayKind::Progress,
            c.background,
            Label::new(&c.message, c.text_size, c.text_color),
        );
        view.indicator = Some(ProgressIndicator::new(
            IndicatorStyle::Bar,
            0,
            0,
            c.bar_color,
        ));
        view
    }

    #[inline]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub const fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            tracing::trace!(kind = %self.kind, ?visibility, "overlay visibility");
            self.visibility = visibility;
        }
    }

    pub fn message_text(&self) -> &str {
        &self.message.text
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text.as_str())
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref().map(|i| &i.icon)
    }

    pub fn button_text(&self) -> Option<&str> {
        self.button.as_ref().map(|b| b.label.as_str())
    }

    /// Indicator value, for overlays that carry one.
    pub fn progress(&self) -> Option<u8> {
        self.indicator.as_ref().map(ProgressIndicator::progress)
    }

    pub(crate) fn set_message(&mut self, text: &str) {
        text.clone_into(&mut self.message.text);
    }

    pub(crate) fn set_title(&mut self, text: &str) {
        if let Some(title) = &mut self.title {
            text.clone_into(&mut title.text);
        }
    }

    pub(crate) fn set_icon(&mut self, icon: &Icon) {
        if let Some(image) = &mut self.icon {
            image.icon.clone_from(icon);
        }
    }

    pub(crate) fn set_button_text(&mut self, text: &str) {
        if let Some(button) = &mut self.button {
            text.clone_into(&mut button.label);
        }
    }
}
