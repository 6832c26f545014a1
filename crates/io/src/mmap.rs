/// A read-only memory mapping of a file on disk.
///
/// The mapping stays valid after the path is renamed over or unlinked: the
/// kernel keeps the old inode alive for as long as it is mapped, which is what
/// lets a piece table keep reading its original text while a save replaces
/// the file underneath it.
#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Caller only gets immutable &[u8]
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        log::debug!("mapped {} ({} bytes)", path.display(), mmap.len());

        Ok(Self { _file: file, mmap })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    #[test]
    fn maps_file_contents() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"abc\ndef\n").unwrap();
        temp.as_file().sync_all().unwrap();

        let mmap = super::MmapFile::open(temp.path()).unwrap();

        assert_eq!(mmap.len(), 8);
        assert_eq!(mmap.as_slice(), b"abc\ndef\n");
        assert!(!mmap.is_empty());
    }

    #[test]
    fn mapping_survives_rename_over() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"old text").unwrap();

        let mmap = super::MmapFile::open(&path).unwrap();
        let replacement = dir.path().join("doc.txt.new");
        std::fs::write(&replacement, b"new").unwrap();
        std::fs::rename(&replacement, &path).unwrap();

        assert_eq!(mmap.as_slice(), b"old text");
    }
}
