use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::core::error::SourceError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Raw file bytes, mapped for large files and buffered otherwise.
pub enum FileContent {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl AsRef<[u8]> for FileContent {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileContent::Mapped(mmap) => mmap,
            FileContent::Buffered(buf) => buf,
        }
    }
}

/// Read a file, memory-mapping anything above 1 MiB.
pub fn read_file_smart<P: AsRef<Path>>(path: P) -> io::Result<FileContent> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path)?;

        // Safety: the mapping is only read, and copied out before the
        // caller keeps any text derived from it
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileContent::Mapped(mmap))
    } else {
        Ok(FileContent::Buffered(std::fs::read(path)?))
    }
}

/// Read a source file as UTF-8 text.
/// Unreadable and non-UTF-8 files fail with distinct errors; an empty
/// file reads as an empty string.
pub fn read_source(path: &Path) -> Result<String, SourceError> {
    let content = read_file_smart(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match content {
        // Reuse the buffer when it is already valid UTF-8
        FileContent::Buffered(buf) => String::from_utf8(buf).map_err(|_| SourceError::Encoding {
            path: path.to_path_buf(),
        }),
        FileContent::Mapped(mmap) => std::str::from_utf8(&mmap)
            .map(str::to_owned)
            .map_err(|_| SourceError::Encoding {
                path: path.to_path_buf(),
            }),
    }
}
