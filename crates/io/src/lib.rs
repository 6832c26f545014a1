//! File plumbing for the editor: read-only byte sources for original text
//! and atomic replacement of files on save.
pub mod atomic;
pub mod mmap;
pub mod source;
