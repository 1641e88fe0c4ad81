//! Mutable state of the demo widget.

use qw_dom::TimerId;

/// What the demo is showing and whether an animation is in flight.
///
/// `is_typing` is true exactly when `active_timer` holds the reveal
/// interval. The two only change together through [`DemoState::begin_reveal`]
/// and [`DemoState::finish_reveal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoState {
    /// Index into the example catalog
    pub current_index: usize,
    pub is_typing: bool,
    pub active_timer: Option<TimerId>,
    /// Pending timeout that shows the success indicator
    pub success_timer: Option<TimerId>,
    /// Identifier of the tab whose panel is visible
    pub active_tab: Option<String>,
}

impl DemoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reveal interval as running.
    pub fn begin_reveal(&mut self, timer: TimerId) {
        self.active_timer = Some(timer);
        self.is_typing = true;
    }

    /// Mark the reveal as over and hand back its timer for clearing.
    pub fn finish_reveal(&mut self) -> Option<TimerId> {
        self.is_typing = false;
        self.active_timer.take()
    }

    pub fn invariant_holds(&self) -> bool {
        self.is_typing == self.active_timer.is_some()
    }
}
