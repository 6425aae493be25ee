#![forbid(unsafe_code)]

//! The overlay state switcher.
//!
//! [`StateLayout`] owns one [`OverlayView`] per [`OverlayKind`]. Nothing is
//! built until the first show call; that call builds every overlay at once
//! and inserts them into the host [`Container`], all hidden, before making
//! the requested one visible. From then on show and dismiss only flip
//! visibility and rewrite text.
//!
//! ```
//! use statelayout::{EmptyRequest, ErrorRequest, State, StateLayout, StateLayoutConfig};
//!
//! let mut layout = StateLayout::new(StateLayoutConfig::default());
//! layout.show_empty(EmptyRequest::new().title("Inbox zero"));
//! assert_eq!(layout.current_state(), State::Empty);
//!
//! layout.show_error(ErrorRequest::new().on_retry(|| println!("retrying")));
//! assert_eq!(layout.current_state(), State::Error);
//!
//! layout.dismiss_all();
//! assert_eq!(layout.current_state(), State::Content);
//! ```

use std::fmt;

use crate::config::{RetryPolicy, StateLayoutConfig};
use crate::container::{Container, ViewGroup, ViewId, Visibility};
use crate::overlay::{ClickHandler, OverlayView};
use crate::request::{EmptyRequest, ErrorRequest, LoadingRequest, ProgressRequest, resolve};
use crate::state::{OverlayKind, State};

/// The full set of overlays, indexed by [`OverlayKind`].
struct OverlaySet {
    views: [OverlayView; 4],
}

impl OverlaySet {
    fn build(config: &StateLayoutConfig) -> Self {
        Self {
            views: OverlayKind::ALL.map(|kind| OverlayView::build(kind, config)),
        }
    }

    #[inline]
    fn get(&self, kind: OverlayKind) -> &OverlayView {
        &self.views[kind.index()]
    }

    #[inline]
    fn get_mut(&mut self, kind: OverlayKind) -> &mut OverlayView {
        &mut self.views[kind.index()]
    }
}

/// Shows at most one loading, empty, error or progress overlay above a host
/// container's content.
///
/// All operations are synchronous and must run on the UI thread; the type is
/// `!Send` because the retry callback is an arbitrary closure.
pub struct StateLayout<C: Container = ViewGroup> {
    config: StateLayoutConfig,
    container: C,
    overlays: Option<OverlaySet>,
}

impl StateLayout<ViewGroup> {
    /// Create a layout over an empty in-memory [`ViewGroup`].
    pub fn new(config: StateLayoutConfig) -> Self {
        Self::with_container(config, ViewGroup::new())
    }
}

impl Default for StateLayout<ViewGroup> {
    fn default() -> Self {
        Self::new(StateLayoutConfig::default())
    }
}

impl<C: Container> StateLayout<C> {
    /// Create a layout that inserts its overlays into `container`.
    pub fn with_container(config: StateLayoutConfig, container: C) -> Self {
        Self {
            config,
            container,
            overlays: None,
        }
    }

    /// Attributes the overlays are built from.
    pub fn config(&self) -> &StateLayoutConfig {
        &self.config
    }

    /// The host container the overlays are inserted into.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable access to the host container, for the host's own children.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Whether the overlays have been built.
    pub fn is_built(&self) -> bool {
        self.overlays.is_some()
    }

    /// The overlay for `kind`, once built.
    pub fn overlay(&self, kind: OverlayKind) -> Option<&OverlayView> {
        self.overlays.as_ref().map(|set| set.get(kind))
    }

    /// The visible overlay, if any.
    pub fn visible_overlay(&self) -> Option<&OverlayView> {
        self.overlays
            .as_ref()
            .and_then(|set| set.views.iter().find(|view| view.is_visible()))
    }

    /// State implied by which overlay is visible.
    pub fn current_state(&self) -> State {
        self.visible_overlay()
            .map_or(State::Content, |view| view.kind.state())
    }

    /// Id of the error overlay's action button, once built.
    pub fn retry_button_id(&self) -> Option<ViewId> {
        self.overlay(OverlayKind::Error)
            .and_then(|view| view.button.as_ref())
            .map(|button| button.id)
    }

    // --- show -------------------------------------------------------------

    /// Show the loading overlay.
    pub fn show_loading(&mut self, request: LoadingRequest) {
        let view = transition(
            &mut self.overlays,
            &mut self.container,
            &self.config,
            OverlayKind::Loading,
        );
        view.set_message(resolve(
            request.message.as_deref(),
            &self.config.loading.message,
        ));
    }

    /// Show the empty overlay.
    pub fn show_empty(&mut self, request: EmptyRequest) {
        let defaults = &self.config.empty;
        let view = transition(
            &mut self.overlays,
            &mut self.container,
            &self.config,
            OverlayKind::Empty,
        );
        view.set_icon(request.icon.as_ref().unwrap_or(&defaults.icon));
        view.set_title(resolve(request.title.as_deref(), &defaults.title));
        view.set_message(resolve(request.message.as_deref(), &defaults.message));
    }

    /// Show the error overlay and bind its button to `request.on_retry`.
    ///
    /// Tapping the button first applies the configured [`RetryPolicy`], then
    /// invokes the callback. A request without a callback still unbinds any
    /// previous one.
    pub fn show_error(&mut self, request: ErrorRequest) {
        let ErrorRequest {
            icon,
            title,
            message,
            button_text,
            on_retry,
        } = request;
        let defaults = &self.config.error;
        let view = transition(
            &mut self.overlays,
            &mut self.container,
            &self.config,
            OverlayKind::Error,
        );
        view.set_icon(icon.as_ref().unwrap_or(&defaults.icon));
        view.set_title(resolve(title.as_deref(), &defaults.title));
        view.set_message(resolve(message.as_deref(), &defaults.message));
        view.set_button_text(resolve(button_text.as_deref(), &defaults.button_text));
        if let Some(button) = &mut view.button {
            button.set_on_click(on_retry);
        }
    }

    /// Show the error overlay with configured defaults for a failed
    /// operation. The error itself is only logged.
    pub fn show_error_for(
        &mut self,
        error: &dyn std::error::Error,
        on_retry: Option<ClickHandler>,
    ) {
        tracing::warn!(error = %error, "operation failed, showing error overlay");
        self.show_error(ErrorRequest {
            on_retry,
            ..ErrorRequest::default()
        });
    }

    /// Show the progress overlay with a message and a starting value
    /// (default 0).
    pub fn show_progress(&mut self, request: ProgressRequest) {
        let view = transition(
            &mut self.overlays,
            &mut self.container,
            &self.config,
            OverlayKind::Progress,
        );
        view.set_message(resolve(
            request.message.as_deref(),
            &self.config.progress.message,
        ));
        if let Some(indicator) = &mut view.indicator {
            indicator.set_progress(request.percent.unwrap_or(0));
        }
    }

    /// Update the progress value in place. Visibility is untouched, and
    /// nothing happens if the overlays were never built.
    pub fn update_progress(&mut self, percent: i32) {
        let Some(set) = &mut self.overlays else {
            tracing::trace!(percent, "progress update before overlays were built");
            return;
        };
        if let Some(indicator) = &mut set.get_mut(OverlayKind::Progress).indicator {
            indicator.set_progress(percent);
        }
    }

    /// Switch to `state` using configured defaults. `Content` dismisses
    /// every overlay; `on_retry` only applies to `Error`.
    pub fn update_state(&mut self, state: State, on_retry: Option<ClickHandler>) {
        match state {
            State::Content => self.dismiss_all(),
            State::Loading => self.show_loading(LoadingRequest::default()),
            State::Empty => self.show_empty(EmptyRequest::default()),
            State::Error => self.show_error(ErrorRequest {
                on_retry,
                ..ErrorRequest::default()
            }),
            State::Progress => self.show_progress(ProgressRequest::default()),
        }
    }

    /// Advance the loading spinner, if loading is showing.
    pub fn tick(&mut self) {
        if let Some(set) = &mut self.overlays {
            let view = set.get_mut(OverlayKind::Loading);
            if !view.is_visible() {
                return;
            }
            if let Some(indicator) = &mut view.indicator {
                indicator.tick();
            }
        }
    }

    // --- dismiss ----------------------------------------------------------

    /// Hide every overlay, revealing the content.
    pub fn dismiss_all(&mut self) {
        if let Some(set) = &mut self.overlays {
            for view in &mut set.views {
                view.set_visibility(Visibility::Gone);
            }
            tracing::debug!(to = %State::Content, "state transition");
        }
    }

    /// Hide the loading overlay; other overlays are untouched.
    pub fn dismiss_loading(&mut self) {
        self.dismiss(OverlayKind::Loading);
    }

    /// Hide the empty overlay; other overlays are untouched.
    pub fn dismiss_empty(&mut self) {
        self.dismiss(OverlayKind::Empty);
    }

    /// Hide the error overlay; other overlays are untouched.
    pub fn dismiss_error(&mut self) {
        self.dismiss(OverlayKind::Error);
    }

    /// Hide the progress overlay; other overlays are untouched.
    pub fn dismiss_progress(&mut self) {
        self.dismiss(OverlayKind::Progress);
    }

    fn dismiss(&mut self, kind: OverlayKind) {
        if let Some(set) = &mut self.overlays {
            set.get_mut(kind).set_visibility(Visibility::Gone);
        }
    }

    // --- input ------------------------------------------------------------

    /// Deliver a click to `target`.
    ///
    /// Only the error overlay's button reacts, and only while the error
    /// overlay is visible. Returns whether the click was handled.
    pub fn tap(&mut self, target: ViewId) -> bool {
        let Some(set) = &mut self.overlays else {
            return false;
        };
        let error = set.get_mut(OverlayKind::Error);
        if !error.is_visible() {
            return false;
        }
        let Some(button) = error.button.as_mut().filter(|b| b.id == target) else {
            return false;
        };
        let handler = button.take_on_click();

        match self.config.error.retry_policy {
            RetryPolicy::DismissError => self.dismiss_error(),
            RetryPolicy::ShowLoading => self.show_loading(LoadingRequest::default()),
        }
        tracing::debug!(
            policy = ?self.config.error.retry_policy,
            has_callback = handler.is_some(),
            "retry tapped"
        );
        if let Some(mut handler) = handler {
            handler();
        }
        true
    }
}

/// Make sure every overlay exists and is attached, then show `target` and
/// hide the rest.
fn transition<'a, C: Container>(
    overlays: &'a mut Option<OverlaySet>,
    container: &mut C,
    config: &StateLayoutConfig,
    target: OverlayKind,
) -> &'a mut OverlayView {
    let set = overlays.get_or_insert_with(|| OverlaySet::build(config));

    if !set.views.iter().all(|view| container.contains(view.id)) {
        let inserted = set
            .views
            .iter()
            .filter(|view| container.add_child(view.id))
            .count();
        tracing::debug!(inserted, "overlays attached to container");
    }

    for view in &mut set.views {
        let visibility = if view.kind == target {
            Visibility::Visible
        } else {
            Visibility::Gone
        };
        view.set_visibility(visibility);
    }
    tracing::debug!(to = %target, "state transition");

    set.get_mut(target)
}

impl<C: Container + fmt::Debug> fmt::Debug for StateLayout<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateLayout")
            .field("state", &self.current_state())
            .field("built", &self.is_built())
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
