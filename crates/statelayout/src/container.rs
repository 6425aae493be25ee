#![forbid(unsafe_code)]

//! Host container seam.
//!
//! A [`StateLayout`](crate::StateLayout) does not own the toolkit's view
//! hierarchy. It only needs to put its overlay views into the host's child
//! list once and check they are still there, which is what [`Container`]
//! abstracts. [`ViewGroup`] is the in-memory implementation used by the demo
//! and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Whether a view takes part in drawing and input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Visible,
    /// Hidden and takes no space.
    #[default]
    Gone,
}

impl Visibility {
    #[inline]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// The parent view group overlays are inserted into.
pub trait Container {
    /// Whether `id` is a direct child.
    fn contains(&self, id: ViewId) -> bool;

    /// Append `id` as the topmost child.
    ///
    /// Must be idempotent: returns `false` and leaves the child list alone
    /// when `id` is already a child.
    fn add_child(&mut self, id: ViewId) -> bool;

    /// Remove `id`, returning whether it was a child.
    fn remove_child(&mut self, id: ViewId) -> bool;

    /// Child ids in z-order, bottom first.
    fn children(&self) -> Vec<ViewId>;
}

/// An ordered list of child views.
#[derive(Debug, Clone, Default)]
pub struct ViewGroup {
    children: Vec<ViewId>,
}

impl ViewGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with host content already in place.
    pub fn with_children(children: impl IntoIterator<Item = ViewId>) -> Self {
        let mut group = Self::new();
        for id in children {
            group.add_child(id);
        }
        group
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Container for ViewGroup {
    fn contains(&self, id: ViewId) -> bool {
        self.children.contains(&id)
    }

    fn add_child(&mut self, id: ViewId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.children.push(id);
        true
    }

    fn remove_child(&mut self, id: ViewId) -> bool {
        let before = self.children.len();
        self.children.retain(|child| *child != id);
        self.children.len() != before
    }

    fn children(&self) -> Vec<ViewId> {
        self.children.clone()
    }
}
