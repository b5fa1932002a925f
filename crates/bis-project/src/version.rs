//! Project format versioning.
//!
//! Two version numbers govern a project file. The container envelope
//! version (see `types.rs`) describes the byte layout of the file itself.
//! The project format version, stored as a root scalar inside the tree,
//! describes the group layout that applet serializers read and write. The
//! key name and the version values are wire format, kept interchange-
//! compatible with ilastik project layouts.

/// Root scalar key holding the project format version.
pub const PROJECT_VERSION_KEY: &str = "ilastikVersion";

/// Format version written by this code.
pub const CURRENT_PROJECT_VERSION: f64 = 0.6;

/// Oldest format version the current serializers can read and write.
pub const OLDEST_COMPATIBLE_PROJECT_VERSION: f64 = 0.6;

/// The one legacy version the import adapter accepts.
pub const LEGACY_PROJECT_VERSION: f64 = 0.5;

/// Whether the current serializers can navigate a project tree of the
/// given format version.
///
/// Legacy (0.5) files fail this check on purpose; they go through the
/// import adapter instead.
pub fn is_project_version_compatible(version: f64) -> bool {
    (OLDEST_COMPATIBLE_PROJECT_VERSION..=CURRENT_PROJECT_VERSION).contains(&version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version_is_compatible() {
        assert!(is_project_version_compatible(CURRENT_PROJECT_VERSION));
    }

    #[test]
    fn test_legacy_version_is_not_compatible() {
        assert!(!is_project_version_compatible(LEGACY_PROJECT_VERSION));
    }

    #[test]
    fn test_future_version_is_not_compatible() {
        assert!(!is_project_version_compatible(0.7));
        assert!(!is_project_version_compatible(2.0));
    }
}
