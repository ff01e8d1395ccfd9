//! Journal backends.

pub mod file;
pub mod memory;

pub use file::FileJournal;
pub use memory::MemoryJournal;
