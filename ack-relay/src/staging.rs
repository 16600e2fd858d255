//! Staging of the record file from removable storage.
//!
//! A drive counts as present only when its path is an actual mount point, so
//! an empty mount directory left behind after unplugging is not mistaken for
//! the stick.  The first `.csv` found on it is copied to the local staging
//! path, where [`crate::source`] later reads it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::StagingError;

/// `true` if `path` is a directory with a filesystem mounted on it.
#[cfg(unix)]
pub fn is_mounted(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    // A symlink is never a mount point.
    let Ok(meta) = fs::symlink_metadata(path) else {
        return false;
    };
    if !meta.is_dir() {
        return false;
    }
    let Ok(parent) = fs::metadata(path.join("..")) else {
        return false;
    };
    // Different device than the parent, or the filesystem root itself.
    meta.dev() != parent.dev() || meta.ino() == parent.ino()
}

/// `true` if `path` is an existing directory.
///
/// Mount points cannot be told apart portably here; any directory counts.
#[cfg(not(unix))]
pub fn is_mounted(path: &Path) -> bool {
    path.is_dir()
}

/// `true` for file names ending in `.csv`, any case.
fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Find the first CSV under `root`, walking top-down.
///
/// Within one directory, files are examined (by name) before descending into
/// sub-directories (by name).  Symlinked directories are not followed.
/// Unreadable sub-directories are skipped; an unreadable `root` is an error.
pub fn find_first_csv(root: &Path) -> Result<Option<PathBuf>, StagingError> {
    let walker = WalkDir::new(root).follow_links(false).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(StagingError::Walk {
                    path: root.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                log::warn!("[usb] skipping: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() && is_csv(entry.path()) {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Copy the first CSV under `usb_root` to `dest`.
///
/// Returns the path that was copied, or `None` if the drive holds no CSV.
/// The parent directory of `dest` is created when missing; an existing file
/// at `dest` is overwritten.
pub fn copy_first_csv(usb_root: &Path, dest: &Path) -> Result<Option<PathBuf>, StagingError> {
    let Some(src) = find_first_csv(usb_root)? else {
        log::info!("[copy] no CSV file found on {}", usb_root.display());
        return Ok(None);
    };

    let copy_err = |source| StagingError::Copy {
        from: src.clone(),
        to: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(&src, dest).map_err(copy_err)?;

    log::info!("[copy] copied {} → {}", src.display(), dest.display());
    Ok(Some(src))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn csv_extension_is_case_insensitive() {
        assert!(is_csv(Path::new("data.csv")));
        assert!(is_csv(Path::new("DATA.CSV")));
        assert!(!is_csv(Path::new("data.csv.bak")));
        assert!(!is_csv(Path::new("csv")));
    }

    #[test]
    fn files_win_over_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a_dir/first.csv"), "x");
        touch(&dir.path().join("z.csv"), "y");
        let found = find_first_csv(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("z.csv"));
    }

    #[test]
    fn files_are_examined_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"), "");
        touch(&dir.path().join("a.CSV"), "");
        touch(&dir.path().join("0.txt"), "");
        let found = find_first_csv(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("a.CSV"));
    }

    #[test]
    fn descends_into_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"), "");
        touch(&dir.path().join("logs/2024/run.csv"), "");
        let found = find_first_csv(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("logs/2024/run.csv"));
    }

    #[test]
    fn sibling_files_win_over_earlier_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/b/deep.csv"), "");
        touch(&dir.path().join("a/z.csv"), "");
        touch(&dir.path().join("b.csv"), "");
        let found = find_first_csv(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("b.csv"));

        fs::remove_file(dir.path().join("b.csv")).unwrap();
        let found = find_first_csv(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("a/z.csv"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("a_locked");
        fs::create_dir(&locked).unwrap();
        touch(&dir.path().join("b_open/data.csv"), "");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let found = find_first_csv(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(found.unwrap(), Some(dir.path().join("b_open/data.csv")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let target = tempfile::tempdir().unwrap();
        touch(&target.path().join("hidden.csv"), "");
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(target.path(), dir.path().join("link")).unwrap();

        assert_eq!(find_first_csv(dir.path()).unwrap(), None);
    }

    #[test]
    fn no_csv_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("readme.md"), "");
        assert_eq!(find_first_csv(dir.path()).unwrap(), None);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_first_csv(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, StagingError::Walk { .. }));
    }

    #[test]
    fn copy_creates_destination_directory() {
        let usb = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();
        touch(&usb.path().join("data.csv"), "line1\nline2\n");

        let dest = local.path().join("project/usb_data.csv");
        let src = copy_first_csv(usb.path(), &dest).unwrap().unwrap();
        assert_eq!(src, usb.path().join("data.csv"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "line1\nline2\n");
    }

    #[test]
    fn copy_overwrites_previous_staging_file() {
        let usb = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();
        let dest = local.path().join("usb_data.csv");
        touch(&dest, "stale");
        touch(&usb.path().join("new.csv"), "fresh");

        copy_first_csv(usb.path(), &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "fresh");
    }

    #[test]
    fn copy_without_csv_leaves_destination_alone() {
        let usb = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();
        let dest = local.path().join("usb_data.csv");
        assert_eq!(copy_first_csv(usb.path(), &dest).unwrap(), None);
        assert!(!dest.exists());
    }

    #[cfg(unix)]
    #[test]
    fn plain_directory_is_not_a_mount_point() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("usb");
        fs::create_dir(&sub).unwrap();
        assert!(!is_mounted(&sub));
        assert!(!is_mounted(&dir.path().join("missing")));
        assert!(is_mounted(Path::new("/")));
    }
}
