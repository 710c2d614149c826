use std::path::PathBuf;

/// Errors produced at the ingestion boundary (parser and CLI). The
/// minimization core never fails: given a well-formed [`crate::Automaton`],
/// [`crate::minimize_backward`] always succeeds.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A tree file had inconsistent indentation: a line whose depth jumped
    /// by more than one level from the previous top of stack, a file with
    /// no depth-0 line, or a second depth-0 line after the first tree closed.
    #[error("malformed tree in {path}:{line}: {reason}")]
    MalformedTree {
        /// The file that failed to parse.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// Failure to read a tree file or list a directory.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The path being read when the error occurred.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}
