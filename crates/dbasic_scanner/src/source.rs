//! Input providers consumed by the scanner.
//!
//! The scanner never opens the program text itself: it pulls lines from a
//! [`PrimarySource`] and asks an [`IncludeResolver`] to open `INCLUDE`
//! files, which it then reads through [`LineReader`].

use memchr::memchr;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::trace;

/// The top-level program text: a rewindable line supplier.
pub trait PrimarySource {
    /// Replace `buf` with the next line, at most `max_len` bytes including
    /// its newline. Returns `false` once the source is exhausted.
    fn fetch_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool>;

    /// Start over from the first line.
    fn rewind(&mut self) -> io::Result<()>;
}

/// An open include file.
pub trait LineReader {
    /// Same contract as [`PrimarySource::fetch_line`].
    fn read_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool>;
}

/// Opens include files by name (`openInPath`).
pub trait IncludeResolver {
    /// Open `name`, or `None` if it cannot be found.
    fn open_in_path(&self, name: &str) -> Option<Box<dyn LineReader>>;
}

/// Read one line of at most `max_len` bytes, keeping the newline.
///
/// A physical line longer than `max_len` is returned in pieces, the way
/// `fgets` splits it.
pub(crate) fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<bool> {
    buf.clear();
    let max_len = max_len.max(1);
    while buf.len() < max_len {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        let room = (max_len - buf.len()).min(available.len());
        let (used, done) = match memchr(b'\n', &available[..room]) {
            Some(idx) => (idx + 1, true),
            None => (room, false),
        };
        buf.extend_from_slice(&available[..used]);
        reader.consume(used);
        if done {
            break;
        }
    }
    Ok(!buf.is_empty())
}

/// Program text held in memory (an embedded program or a REPL buffer).
#[derive(Debug, Clone)]
pub struct StringSource {
    text: Cursor<Vec<u8>>,
}

impl StringSource {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: Cursor::new(text.into()),
        }
    }
}

impl PrimarySource for StringSource {
    fn fetch_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool> {
        read_bounded_line(&mut self.text, buf, max_len)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.text.set_position(0);
        Ok(())
    }
}

impl LineReader for StringSource {
    fn read_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool> {
        read_bounded_line(&mut self.text, buf, max_len)
    }
}

/// Program text read from a file; rewinding seeks back to the start.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = BufReader::new(File::open(&path)?);
        Ok(Self { path, reader })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrimarySource for FileSource {
    fn fetch_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool> {
        read_bounded_line(&mut self.reader, buf, max_len)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

/// An include file opened from disk. The handle closes when this drops.
#[derive(Debug)]
pub struct FileLineReader {
    reader: BufReader<File>,
}

impl FileLineReader {
    pub fn new(file: File) -> Self {
        Self {
            reader: BufReader::new(file),
        }
    }
}

impl LineReader for FileLineReader {
    fn read_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<bool> {
        read_bounded_line(&mut self.reader, buf, max_len)
    }
}

/// Resolves include names against the working directory and a list of
/// search directories.
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver {
    dirs: Vec<String>,
}

impl SearchPathResolver {
    pub fn new(dirs: Vec<String>) -> Self {
        Self { dirs }
    }
}

impl IncludeResolver for SearchPathResolver {
    fn open_in_path(&self, name: &str) -> Option<Box<dyn LineReader>> {
        dbasic_path::search_candidates(name, &self.dirs)
            .into_iter()
            .find_map(|candidate| match File::open(&candidate) {
                Ok(file) => {
                    trace!(%candidate, "include resolved");
                    Some(Box::new(FileLineReader::new(file)) as Box<dyn LineReader>)
                }
                Err(err) => {
                    trace!(%candidate, %err, "include candidate rejected");
                    None
                }
            })
    }
}

/// Resolves include names from an in-memory table of file contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: FxHashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl IncludeResolver for MemoryResolver {
    fn open_in_path(&self, name: &str) -> Option<Box<dyn LineReader>> {
        self.files
            .get(name)
            .map(|text| Box::new(StringSource::new(text.as_bytes())) as Box<dyn LineReader>)
    }
}
