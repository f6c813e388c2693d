//! Human-readable diagnostic lines.
//!
//! Workers report through a [`Reporter`] so the scan engine does not care
//! where lines go. The default writes to stdout, one `println!` per line, so
//! lines from concurrent workers interleave but never tear.

use crate::store::{display_key, Side};

pub trait Reporter: Send + Sync {
    /// A key whose values differ.
    fn mismatch(&self, key: &[u8]);

    /// A key that could not be compared because a read failed.
    fn retrieval_error(&self, key: &[u8], side: Side, message: &str);

    /// A batch worker finished its page.
    fn page_done(&self, page: usize, keys: usize);
}

/// Writes the report to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn mismatch(&self, key: &[u8]) {
        println!("{}", mismatch_line(key));
    }

    fn retrieval_error(&self, key: &[u8], side: Side, message: &str) {
        println!("{}", retrieval_error_line(key, side, message));
    }

    fn page_done(&self, _page: usize, _keys: usize) {
        println!("{}", PAGE_DONE_LINE);
    }
}

pub const PAGE_DONE_LINE: &str = "Compare Redis Keys Job Done.";

/// Keys that are not valid UTF-8 are printed lossily.
pub fn mismatch_line(key: impl AsRef<[u8]>) -> String {
    format!(
        "ERROR, Key: {} Key Value in two redis server not same!!!",
        display_key(key.as_ref())
    )
}

pub fn retrieval_error_line(key: impl AsRef<[u8]>, side: Side, message: &str) -> String {
    format!(
        "ERROR, Key: {} retrieval failed on {}: {}",
        display_key(key.as_ref()),
        side,
        message
    )
}

/// Collects lines in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn mismatch(&self, key: &[u8]) {
        self.lines.lock().unwrap().push(mismatch_line(key));
    }

    fn retrieval_error(&self, key: &[u8], side: Side, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(retrieval_error_line(key, side, message));
    }

    fn page_done(&self, _page: usize, _keys: usize) {
        self.lines.lock().unwrap().push(PAGE_DONE_LINE.to_string());
    }
}
