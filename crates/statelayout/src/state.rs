#![forbid(unsafe_code)]

//! State tags.

use std::fmt;

/// Which overlay a [`StateLayout`](crate::StateLayout) presents.
///
/// `Content` means no overlay is visible and the host content shows through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    Loading,
    Empty,
    Error,
    #[default]
    Content,
    Progress,
}

impl State {
    /// The overlay kind that backs this state, if any.
    #[inline]
    pub const fn overlay_kind(self) -> Option<OverlayKind> {
        match self {
            Self::Loading => Some(OverlayKind::Loading),
            Self::Empty => Some(OverlayKind::Empty),
            Self::Error => Some(OverlayKind::Error),
            Self::Progress => Some(OverlayKind::Progress),
            Self::Content => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Error => "error",
            Self::Content => "content",
            Self::Progress => "progress",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The states that own an overlay view.
///
/// Ordered as the overlays are inserted into the host container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Empty,
    Error,
    Loading,
    Progress,
}

impl OverlayKind {
    /// Every kind, in insertion order.
    pub const ALL: [Self; 4] = [Self::Empty, Self::Error, Self::Loading, Self::Progress];

    #[inline]
    pub const fn state(self) -> State {
        match self {
            Self::Empty => State::Empty,
            Self::Error => State::Error,
            Self::Loading => State::Loading,
            Self::Progress => State::Progress,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Error => 1,
            Self::Loading => 2,
            Self::Progress => 3,
        }
    }
}

impl From<OverlayKind> for State {
    fn from(kind: OverlayKind) -> Self {
        kind.state()
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_has_no_overlay() {
        assert_eq!(State::Content.overlay_kind(), None);
    }

    #[test]
    fn kinds_round_trip_through_state() {
        for kind in OverlayKind::ALL {
            assert_eq!(kind.state().overlay_kind(), Some(kind));
        }
    }

    #[test]
    fn index_matches_insertion_order() {
        for (i, kind) in OverlayKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn default_state_is_content() {
        assert_eq!(State::default(), State::Content);
        assert_eq!(State::Progress.to_string(), "progress");
    }
}
