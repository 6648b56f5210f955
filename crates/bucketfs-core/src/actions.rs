//! Toolbar enablement derived from navigation depth.
//!
//! ```text
//!            navigated(bucket = None)
//!   ┌────────┐ <──────────────────── ┌──────────────┐
//!   │ AtRoot │                       │ InsideBucket │
//!   └────────┘ ────────────────────> └──────────────┘
//!            navigated(bucket = Some)
//! ```
//!
//! `AtRoot`: New Folder and Upload disabled. `InsideBucket`: both enabled.
//! Refresh is always enabled.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::DriveError;
use crate::path::StoragePath;

pub(crate) const NO_FOLDER_AT_ROOT: &str = "folders cannot be created outside of a bucket";
pub(crate) const NO_UPLOAD_AT_ROOT: &str = "uploading files at bucket level is not allowed";

/// Enablement state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionState {
    AtRoot,
    InsideBucket,
}

impl ActionState {
    pub fn for_path(path: &StoragePath) -> Self {
        if path.is_root() {
            Self::AtRoot
        } else {
            Self::InsideBucket
        }
    }

    pub fn allows(self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::Refresh => true,
            ToolbarAction::NewFolder | ToolbarAction::Upload => self == Self::InsideBucket,
        }
    }
}

/// Toolbar slots that receive enablement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    NewFolder,
    Upload,
    Refresh,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 3] = [Self::NewFolder, Self::Upload, Self::Refresh];

    pub fn label(self) -> &'static str {
        match self {
            Self::NewFolder => "New Folder",
            Self::Upload => "File Upload",
            Self::Refresh => "Refresh",
        }
    }
}

/// Receives enablement changes.
pub trait Toolbar {
    fn set_enabled(&self, action: ToolbarAction, enabled: bool);
}

/// Last settled navigation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current_path: StoragePath,
    pub is_root: bool,
}

/// Sole owner of [`NavigationState`]; pushes enablement to a [`Toolbar`].
pub struct ActionAvailability {
    navigation: RefCell<NavigationState>,
    toolbar: Rc<dyn Toolbar>,
}

impl ActionAvailability {
    /// Start at root and apply its enablement immediately.
    pub fn new(toolbar: Rc<dyn Toolbar>) -> Self {
        let availability = Self {
            navigation: RefCell::new(NavigationState {
                current_path: StoragePath::root(),
                is_root: true,
            }),
            toolbar,
        };
        availability.apply();
        availability
    }

    /// Recompute for a settled navigation.
    pub fn on_navigated(&self, path: &StoragePath) {
        {
            let mut nav = self.navigation.borrow_mut();
            nav.current_path = path.clone();
            nav.is_root = path.is_root();
        }
        self.apply();
    }

    pub fn state(&self) -> ActionState {
        ActionState::for_path(&self.navigation.borrow().current_path)
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation.borrow().clone()
    }

    pub fn is_enabled(&self, action: ToolbarAction) -> bool {
        self.state().allows(action)
    }

    /// Gate an action: `InvalidOperation` when it is disabled.
    pub fn ensure(&self, action: ToolbarAction) -> Result<(), DriveError> {
        if self.is_enabled(action) {
            return Ok(());
        }
        Err(DriveError::invalid(match action {
            ToolbarAction::NewFolder => NO_FOLDER_AT_ROOT,
            ToolbarAction::Upload => NO_UPLOAD_AT_ROOT,
            ToolbarAction::Refresh => "refresh is not available",
        }))
    }

    fn apply(&self) {
        let state = self.state();
        for action in ToolbarAction::ALL {
            self.toolbar.set_enabled(action, state.allows(action));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingToolbar;

    fn availability() -> (ActionAvailability, Rc<RecordingToolbar>) {
        let toolbar = Rc::new(RecordingToolbar::default());
        (ActionAvailability::new(toolbar.clone()), toolbar)
    }

    #[test]
    fn test_starts_at_root_with_actions_disabled() {
        let (actions, toolbar) = availability();
        assert_eq!(actions.state(), ActionState::AtRoot);
        assert_eq!(toolbar.enabled(ToolbarAction::NewFolder), Some(false));
        assert_eq!(toolbar.enabled(ToolbarAction::Upload), Some(false));
        assert_eq!(toolbar.enabled(ToolbarAction::Refresh), Some(true));
        assert!(actions.navigation().is_root);
    }

    #[test]
    fn test_navigation_toggles_enablement() {
        let (actions, toolbar) = availability();

        actions.on_navigated(&StoragePath::parse("b1"));
        assert_eq!(actions.state(), ActionState::InsideBucket);
        assert_eq!(toolbar.enabled(ToolbarAction::NewFolder), Some(true));
        assert_eq!(toolbar.enabled(ToolbarAction::Upload), Some(true));

        actions.on_navigated(&StoragePath::parse("b1/deep/er"));
        assert_eq!(toolbar.enabled(ToolbarAction::Upload), Some(true));

        actions.on_navigated(&StoragePath::root());
        assert_eq!(toolbar.enabled(ToolbarAction::NewFolder), Some(false));
        assert_eq!(toolbar.enabled(ToolbarAction::Upload), Some(false));
    }

    #[test]
    fn test_ensure_reports_invalid_operation_at_root() {
        let (actions, _) = availability();
        let err = actions.ensure(ToolbarAction::NewFolder).unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(err.to_string(), NO_FOLDER_AT_ROOT);
        assert!(actions.ensure(ToolbarAction::Refresh).is_ok());

        actions.on_navigated(&StoragePath::parse("b1"));
        assert!(actions.ensure(ToolbarAction::Upload).is_ok());
    }
}
