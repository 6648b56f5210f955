//! Reference-counted busy indicator.
//!
//! Every in-flight operation holds a [`BusyGuard`]. The indicator is shown
//! when the first guard is taken and hidden when the last one is released,
//! whatever the completion order. Releasing happens in `Drop`, so error paths
//! and early returns decrement the counter too.

use std::cell::RefCell;
use std::rc::Rc;

/// Rendering side of the busy state.
pub trait BusyView {
    /// Show the progress indicator.
    fn show_indicator(&self);
    /// Hide the progress indicator.
    fn hide_indicator(&self);
    /// Dim (false) or restore (true) interaction with the content area.
    fn set_content_interactive(&self, interactive: bool);
    /// Whether the content area is currently hidden.
    fn is_content_hidden(&self) -> bool;
    /// Hide or reveal the content area.
    fn set_content_hidden(&self, hidden: bool);
}

/// View that renders nothing.
struct DetachedView;

impl BusyView for DetachedView {
    fn show_indicator(&self) {}
    fn hide_indicator(&self) {}
    fn set_content_interactive(&self, _interactive: bool) {}
    fn is_content_hidden(&self) -> bool {
        false
    }
    fn set_content_hidden(&self, _hidden: bool) {}
}

#[derive(Default)]
struct BusyState {
    pending: usize,
    /// Content visibility captured on the 0 -> 1 transition
    restore_hidden: Option<bool>,
}

/// Counts pending operations and drives a [`BusyView`].
#[derive(Clone)]
pub struct BusyController {
    state: Rc<RefCell<BusyState>>,
    view: Rc<dyn BusyView>,
}

impl BusyController {
    pub fn new(view: Rc<dyn BusyView>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BusyState::default())),
            view,
        }
    }

    /// A controller that only counts.
    pub fn detached() -> Self {
        Self::new(Rc::new(DetachedView))
    }

    /// Register one pending operation.
    ///
    /// The operation ends when the returned guard is dropped.
    #[must_use = "the operation ends as soon as the guard is dropped"]
    pub fn begin(&self) -> BusyGuard {
        let became_busy = {
            let mut state = self.state.borrow_mut();
            state.pending += 1;
            state.pending == 1
        };

        if became_busy {
            // Content must be visible under the indicator; remember how it was
            let was_hidden = self.view.is_content_hidden();
            self.state.borrow_mut().restore_hidden = Some(was_hidden);
            if was_hidden {
                self.view.set_content_hidden(false);
            }
            self.view.set_content_interactive(false);
            self.view.show_indicator();
            tracing::debug!("busy: shown");
        }

        BusyGuard {
            controller: Some(self.clone()),
        }
    }

    /// Release one pending operation. Saturates at zero.
    pub fn end(&self) {
        let restore_hidden = {
            let mut state = self.state.borrow_mut();
            if state.pending == 0 {
                tracing::warn!("busy: end() without matching begin()");
                return;
            }
            state.pending -= 1;
            if state.pending > 0 {
                return;
            }
            state.restore_hidden.take()
        };

        self.view.hide_indicator();
        self.view.set_content_interactive(true);
        if restore_hidden == Some(true) {
            self.view.set_content_hidden(true);
        }
        tracing::debug!("busy: hidden");
    }

    /// Number of pending operations.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending
    }

    /// True while any operation is pending.
    pub fn is_busy(&self) -> bool {
        self.pending() > 0
    }
}

impl std::fmt::Debug for BusyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyController")
            .field("pending", &self.pending())
            .finish()
    }
}

/// One pending operation. Calls [`BusyController::end`] on drop.
#[must_use = "the operation ends as soon as the guard is dropped"]
pub struct BusyGuard {
    controller: Option<BusyController>,
}

impl BusyGuard {
    /// Give up automatic release; the caller must call `end()` itself.
    pub fn detach(mut self) -> BusyController {
        match self.controller.take() {
            Some(controller) => controller,
            None => BusyController::detached(),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.end();
        }
    }
}
