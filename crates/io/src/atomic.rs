use std::io::Write;

/// Suffix of the scratch file written next to the target during a save.
pub const SWAP_SUFFIX: &str = ".swp";

#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Path of the scratch file used while replacing `path`.
#[must_use]
pub fn swap_path(path: &std::path::Path) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();

    name.push(SWAP_SUFFIX);

    std::path::PathBuf::from(name)
}

/// Atomically replaces the contents of `path` with the concatenated `chunks`.
///
/// The bytes go to `<path>.swp` in the same directory first, are flushed to
/// disk, and the scratch file is then renamed over `path`. The permission bits
/// of the existing file are carried over; a file that does not exist yet is
/// created with mode `0o644`. On any failure the scratch file is removed and
/// `path` is left untouched.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if `path` cannot be stat'ed (other than not existing), or
/// if writing, syncing or renaming the scratch file fails.
pub fn write_replacing<'a>(
    path: &std::path::Path,
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> std::io::Result<u64> {
    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            log::debug!("cannot stat {}: {err}", path.display());

            return Err(err);
        }
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )
    })?;
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => std::path::Path::new("."),
    };
    let stale = swap_path(path);

    // A crash mid-save can leave the scratch file behind.
    if stale.exists() {
        log::warn!("removing stale {}", stale.display());
        std::fs::remove_file(&stale)?;
    }

    // Dropping `swap` before `persist` succeeds unlinks the scratch file.
    let mut swap = tempfile::Builder::new()
        .prefix(file_name)
        .suffix(SWAP_SUFFIX)
        .rand_bytes(0)
        .tempfile_in(parent_dir)?;
    let mut written = 0u64;

    for chunk in chunks {
        swap.write_all(chunk)?;
        written += chunk.len() as u64;
    }

    match permissions {
        Some(permissions) => swap.as_file().set_permissions(permissions)?,
        None => set_new_file_mode(swap.as_file())?,
    }

    swap.as_file().sync_all()?;
    swap.persist(path).map_err(|e| e.error)?;

    log::debug!("wrote {written} bytes to {}", path.display());

    Ok(written)
}

#[cfg(unix)]
fn set_new_file_mode(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn set_new_file_mode(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{swap_path, write_replacing};

    #[test]
    fn replaces_contents_and_leaves_no_swap_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "old").unwrap();

        let written = write_replacing(&path, [&b"new "[..], b"text"]).unwrap();

        assert_eq!(written, 8);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new text");
        assert!(!swap_path(&path).exists());
    }

    #[test]
    fn creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");

        write_replacing(&path, [&b"hello\n"[..]]).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn removes_stale_swap_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc");
        std::fs::write(&path, "x").unwrap();
        std::fs::write(swap_path(&path), "leftover").unwrap();

        write_replacing(&path, [&b"y"[..]]).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"y");
        assert!(!swap_path(&path).exists());
    }

    #[test]
    fn stat_failure_other_than_missing_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();

        // A path *through* a regular file cannot be stat'ed.
        let err = write_replacing(&file.join("child"), [&b"y"[..]]).unwrap_err();

        assert_ne!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn failed_rename_removes_swap_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("subdir");
        std::fs::create_dir(&target).unwrap();

        // The scratch file is written, but it cannot replace a directory.
        assert!(write_replacing(&target, [&b"y"[..]]).is_err());

        assert!(!swap_path(&target).exists());
        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        std::fs::write(&path, "echo hi\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).unwrap();

        write_replacing(&path, [&b"echo bye\n"[..]]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn swap_path_appends_suffix() {
        assert_eq!(
            swap_path(std::path::Path::new("dir/file.txt")),
            std::path::PathBuf::from("dir/file.txt.swp")
        );
    }
}
