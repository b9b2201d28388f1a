//! The line source stack and the included-file registry.

use crate::char_codes::LINE_FEED;
use crate::context::ParseContext;
use crate::reader::LastRead;
use crate::source::{LineReader, PrimarySource};
use dbasic_diagnostics::messages::READ_ERROR;
use dbasic_diagnostics::PassError;
use std::io;
use tracing::debug;

/// One entry on the input stack.
pub enum LineSource {
    /// The program text. Always the bottom of the stack.
    Primary {
        source: Box<dyn PrimarySource>,
        line_number: u32,
    },
    /// An open `INCLUDE` file; dropping it closes the file.
    Included {
        reader: Box<dyn LineReader>,
        /// Index of the file's name in the included-file registry.
        entry: usize,
        line_number: u32,
    },
}

impl LineSource {
    pub(crate) fn primary(source: Box<dyn PrimarySource>) -> Self {
        LineSource::Primary {
            source,
            line_number: 0,
        }
    }

    fn line_number_mut(&mut self) -> &mut u32 {
        match self {
            LineSource::Primary { line_number, .. } | LineSource::Included { line_number, .. } => {
                line_number
            }
        }
    }
}

/// Outcome of an `INCLUDE` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeStatus {
    /// The file was opened and its lines come next.
    Opened,
    /// The file was already included this pass; nothing was opened.
    AlreadySatisfied,
    /// The file could not be found. The caller decides whether that is fatal.
    NotFound,
}

impl ParseContext {
    /// Fetch the next line from the active source into the line buffer.
    ///
    /// An exhausted include file is closed and popped and reading resumes
    /// in the file that included it. Returns `false` once the primary
    /// source is exhausted.
    pub fn get_line(&mut self) -> Result<bool, PassError> {
        let max_line = self.options.max_line;
        let fetched = loop {
            let fetched = match self.stack.last_mut() {
                Some(LineSource::Primary { source, .. }) => source.fetch_line(&mut self.line, max_line),
                Some(LineSource::Included { reader, .. }) => reader.read_line(&mut self.line, max_line),
                None => Ok(false),
            };
            match fetched {
                Ok(true) => break true,
                Ok(false) => {}
                Err(err) => return Err(self.read_error(err)),
            }
            if !self.pop_include() {
                break false;
            }
        };

        // The reader state always describes the buffer, even an empty one
        // after the primary source is exhausted.
        self.cursor = 0;
        self.token_start = 0;
        self.last_read = LastRead::Fresh;
        if !fetched {
            self.line.clear();
            return Ok(false);
        }
        if self.line.last() != Some(&LINE_FEED) {
            self.line.push(LINE_FEED);
        }
        if let Some(top) = self.stack.last_mut() {
            *top.line_number_mut() += 1;
        }
        self.clear_saved_token();
        Ok(true)
    }

    /// Open the include file `name` and make it the active source.
    ///
    /// Names are registered even when the file is not found, so a second
    /// request for the same name is always `AlreadySatisfied`.
    pub fn push_include(&mut self, name: &str) -> IncludeStatus {
        let (entry, added) = self.included.insert(name.to_string());
        if !added {
            debug!(name, "include already satisfied");
            return IncludeStatus::AlreadySatisfied;
        }
        match self.resolver.open_in_path(name) {
            Some(reader) => {
                debug!(name, depth = self.stack.len(), "include opened");
                self.stack.push(LineSource::Included {
                    reader,
                    entry,
                    line_number: 0,
                });
                IncludeStatus::Opened
            }
            None => {
                debug!(name, "include not found");
                IncludeStatus::NotFound
            }
        }
    }

    /// Reset for a new pass over the program text: close every include
    /// file, forget which files were included, and rewind the primary
    /// source to line zero.
    pub fn rewind_for_new_pass(&mut self) -> Result<(), PassError> {
        self.close_all();
        self.included.clear();
        self.line.clear();
        self.cursor = 0;
        self.token_start = 0;
        self.last_read = LastRead::Fresh;
        self.in_comment = false;
        self.clear_saved_token();

        let rewound = match self.stack.first_mut() {
            Some(LineSource::Primary {
                source, line_number, ..
            }) => {
                *line_number = 0;
                source.rewind()
            }
            _ => Ok(()),
        };
        if let Err(err) = rewound {
            return Err(self.read_error(err));
        }
        debug!("primary source rewound");
        Ok(())
    }

    /// Close every open include file, leaving only the primary source.
    pub fn close_all(&mut self) {
        if self.stack.len() > 1 {
            debug!(count = self.stack.len() - 1, "closing open include files");
            self.stack.truncate(1);
        }
    }

    /// Names of the files included this pass, in inclusion order.
    pub fn included_files(&self) -> impl Iterator<Item = &str> {
        self.included.iter().map(String::as_str)
    }

    /// Number of include files currently open.
    pub fn include_depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Line counter of the active source.
    pub fn line_number(&self) -> u32 {
        match self.stack.last() {
            Some(LineSource::Primary { line_number, .. })
            | Some(LineSource::Included { line_number, .. }) => *line_number,
            None => 0,
        }
    }

    /// The raw text of the current line.
    pub fn line_text(&self) -> &[u8] {
        &self.line
    }

    /// Pop the top source if it is an include file. Returns `false` when
    /// the top is the primary source, which is never popped here.
    fn pop_include(&mut self) -> bool {
        match self.stack.last() {
            Some(LineSource::Included { entry, line_number, .. }) => {
                debug!(
                    name = self.included.get_index(*entry).map(String::as_str).unwrap_or(""),
                    lines = *line_number,
                    "include finished"
                );
                self.stack.pop();
                true
            }
            _ => false,
        }
    }

    fn read_error(&mut self, err: io::Error) -> PassError {
        let label = match self.stack.last() {
            Some(LineSource::Included { entry, .. }) => self
                .included
                .get_index(*entry)
                .map(|name| format!("'{}'", name))
                .unwrap_or_default(),
            _ => "the program source".to_string(),
        };
        self.error(&READ_ERROR, &[&label, &err.to_string()])
    }
}
