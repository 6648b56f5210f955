//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowUp as Up, LuChevronRight as ChevronRight, LuCopy as Duplicate,
        LuDatabase as Bucket, LuDownload as Download, LuFile as File, LuFolder as Folder,
        LuFolderPlus as NewFolder, LuHardDrive as Storage, LuLogIn as Login, LuMove as Move,
        LuPencil as Rename, LuRefreshCw as Refresh, LuTrash2 as Delete, LuUpload as Upload,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Refresh, BsArrowUp as Up, BsArrowsMove as Move,
        BsBoxArrowInRight as Login, BsBucket as Bucket, BsChevronRight as ChevronRight,
        BsDownload as Download, BsFileEarmark as File, BsFiles as Duplicate,
        BsFolderFill as Folder, BsFolderPlus as NewFolder, BsHdd as Storage, BsPencil as Rename,
        BsTrash as Delete, BsUpload as Upload,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(STORAGE, Storage);
themed_icon!(BUCKET, Bucket);
themed_icon!(FOLDER, Folder);
themed_icon!(FILE, File);
themed_icon!(CHEVRON_RIGHT, ChevronRight);
themed_icon!(UP, Up);
themed_icon!(NEW_FOLDER, NewFolder);
themed_icon!(UPLOAD, Upload);
themed_icon!(REFRESH, Refresh);
themed_icon!(DOWNLOAD, Download);
themed_icon!(RENAME, Rename);
themed_icon!(DUPLICATE, Duplicate);
themed_icon!(MOVE, Move);
themed_icon!(DELETE, Delete);
themed_icon!(LOGIN, Login);
