#![forbid(unsafe_code)]

//! Loading, empty, error and progress overlays for a host view group.
//!
//! # Role
//! A screen that fetches data spends time in states other than "showing
//! content". [`StateLayout`] covers the screen with a placeholder for each of
//! them and switches between the placeholders on request, keeping exactly
//! one (or none) visible.
//!
//! # This crate provides
//! - [`StateLayout`], the state switcher, with show/dismiss operations and
//!   a retry button wired to a caller callback.
//! - [`StateLayoutConfig`], the attribute block with built-in defaults and
//!   TOML/JSON loading.
//! - [`render`], a small cell-grid toolkit the overlays draw into, with hit
//!   testing for taps.
//! - [`scheduler`] and [`cancellation`], a UI-thread message loop whose
//!   delayed and background work dies with the screen that started it.

pub mod cancellation;
pub mod color;
pub mod config;
pub mod container;
pub mod layout;
pub mod overlay;
pub mod render;
pub mod request;
pub mod scheduler;
pub mod state;

pub use color::Rgb;
pub use config::{
    ConfigError, EmptyConfig, ErrorConfig, LoadingConfig, ProgressConfig, RetryPolicy,
    StateLayoutConfig,
};
pub use container::{Container, ViewGroup, ViewId, Visibility};
pub use layout::StateLayout;
pub use overlay::{ClickHandler, Icon, OverlayView};
pub use render::{Buffer, Rect, Widget};
pub use request::{EmptyRequest, ErrorRequest, LoadingRequest, ProgressRequest};
pub use scheduler::{TaskHandle, UiLoop};
pub use state::{OverlayKind, State};
