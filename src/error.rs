//! Error taxonomy for graph construction and input parsing.
//!
//! Everything that can go wrong happens before any worker starts: unreadable
//! input, a malformed file, or an edge referencing a vertex that does not
//! exist. The search engine itself has no recoverable errors; every branch of
//! the alternating-path search is a normal outcome.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be read.
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),

    /// The header line is missing or not two integers.
    #[error("malformed header, expected \"<vertices> <edges>\"")]
    BadHeader,

    /// An edge entry is missing or not two integers.
    #[error("malformed edge entry {index}, expected \"<a> <b>\"")]
    BadEdge { index: usize },

    /// An edge endpoint does not name a vertex of the graph.
    #[error("edge endpoint {id} out of range for {n} vertices")]
    VertexOutOfRange { id: usize, n: usize },

    /// An edge connects a vertex to itself.
    #[error("self-loop at vertex {id}")]
    SelfLoop { id: usize },

    /// The file continues past the declared number of edges.
    #[error("unexpected trailing input after {edges} edges")]
    TrailingInput { edges: usize },
}

impl Error {
    /// Process exit status for the binary. Argument errors exit with 2 (via
    /// clap), unreadable files with 3, malformed graph input with 4.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Io(_) => 3,
            Error::BadHeader
            | Error::BadEdge { .. }
            | Error::VertexOutOfRange { .. }
            | Error::SelfLoop { .. }
            | Error::TrailingInput { .. } => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
