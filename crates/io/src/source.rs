/// Immutable backing bytes for the original text of a document.
///
/// Files are memory-mapped so opening a large file costs nothing up front.
/// Zero-length files and text built in memory are held as owned bytes.
#[derive(Debug)]
pub enum Source {
    Mapped(crate::mmap::MmapFile),
    Bytes(Box<[u8]>),
}

impl Source {
    /// Opens `path` as a read-only source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, stat'ed, or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();

        if std::fs::metadata(path)?.len() == 0 {
            // Mapping zero bytes is rejected by some platforms.
            std::fs::File::open(path)?;

            return Ok(Self::empty());
        }

        Ok(Self::Mapped(crate::mmap::MmapFile::open(path)?))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::Bytes(Box::default())
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => mmap.as_slice(),
            Self::Bytes(bytes) => bytes,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Source {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value.into_boxed_slice())
    }
}

impl From<&[u8]> for Source {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.into())
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::Source;

    #[test]
    fn open_maps_non_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a\nb\n").unwrap();

        let source = Source::open(&path).unwrap();

        assert!(matches!(source, Source::Mapped(_)));
        assert_eq!(source.as_slice(), b"a\nb\n");
    }

    #[test]
    fn open_empty_file_uses_owned_bytes() {
        let temp = tempfile::NamedTempFile::new().unwrap();

        let source = Source::open(temp.path()).unwrap();

        assert!(matches!(source, Source::Bytes(_)));
        assert!(source.is_empty());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Source::open(dir.path().join("missing")).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn from_str_copies_bytes() {
        let source = Source::from("abc");

        assert_eq!(source.len(), 3);
        assert_eq!(source.as_slice(), b"abc");
    }
}
