//! Text graph format and matching output.
//!
//! The input is whitespace separated: a header `n m` (vertex and edge
//! counts), then `m` pairs `a b`. Line breaks are not significant. The
//! output lists the matched pairs and the run's summary figures.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::stats::Counter;

/// Whitespace-separated tokens, streamed one input line at a time.
struct Tokens<R: BufRead> {
    reader: R,
    line: String,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Tokens {
            reader,
            line: String::new(),
            pending: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(self.line.split_whitespace().map(str::to_owned));
        }
    }

    fn next_number(&mut self, missing: Error) -> Result<usize> {
        match self.next()? {
            Some(token) => token.parse().map_err(|_| missing),
            None => Err(missing),
        }
    }
}

/// Parse a graph from the `n m` / pairs format. Exactly `m` edges must
/// follow the header; trailing input is rejected.
pub fn read_graph<R: BufRead>(reader: R) -> Result<Graph> {
    let mut tokens = Tokens::new(reader);
    let n = tokens.next_number(Error::BadHeader)?;
    let m = tokens.next_number(Error::BadHeader)?;

    let mut graph = Graph::new(n);
    for index in 1..=m {
        let a = tokens.next_number(Error::BadEdge { index })?;
        let b = tokens.next_number(Error::BadEdge { index })?;
        graph.add_edge(a, b)?;
    }
    if tokens.next()?.is_some() {
        return Err(Error::TrailingInput { edges: m });
    }
    Ok(graph)
}

/// Write the matched pairs and summary counts.
pub fn write_matching<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    writeln!(out, "<Matching>")?;
    for (a, b) in graph.matched_pairs() {
        write!(out, "({a},{b}) ")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "<Nodes>\n{}", graph.vertex_count())?;
    writeln!(out)?;
    writeln!(out, "<Edges>\n{}", graph.edge_count())?;
    writeln!(out)?;
    writeln!(out, "<Trees>\n{}", graph.stats().get(Counter::TreesCreated))?;
    writeln!(out)?;
    writeln!(out, "<M>\n{}", graph.matching_size())?;
    Ok(())
}

/// Dump the adjacency structure, one vertex per line.
pub fn write_graph<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    )?;
    for v in 0..graph.vertex_count() {
        write!(out, "{v}:")?;
        for half in graph.neighbours(v) {
            let mark = if graph.is_matched(half.edge) { "=" } else { "-" };
            write!(out, " {mark}{}", half.to)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_header_and_edges() {
        let graph = read_graph("4 3\n0 1\n1 2\n2 3\n".as_bytes()).unwrap();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbours(1).len(), 2);
    }

    #[test]
    fn test_line_breaks_are_not_significant() {
        let graph = read_graph("2 1 0 1".as_bytes()).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_rejects_missing_header() {
        assert!(matches!(read_graph("".as_bytes()), Err(Error::BadHeader)));
        assert!(matches!(read_graph("x y".as_bytes()), Err(Error::BadHeader)));
    }

    #[test]
    fn test_rejects_truncated_edge_list() {
        assert!(matches!(
            read_graph("2 2\n0 1\n".as_bytes()),
            Err(Error::BadEdge { index: 2 })
        ));
        assert!(matches!(
            read_graph("2 1\n0\n".as_bytes()),
            Err(Error::BadEdge { index: 1 })
        ));
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(matches!(
            read_graph("2 1\n0 5\n".as_bytes()),
            Err(Error::VertexOutOfRange { id: 5, n: 2 })
        ));
        assert!(matches!(
            read_graph("2 1\n1 1\n".as_bytes()),
            Err(Error::SelfLoop { id: 1 })
        ));
    }

    #[test]
    fn test_rejects_trailing_input() {
        assert!(matches!(
            read_graph("2 1\n0 1\n7\n".as_bytes()),
            Err(Error::TrailingInput { edges: 1 })
        ));
        // Trailing whitespace and blank lines are fine.
        assert!(read_graph("2 1\n0 1\n\n  \n".as_bytes()).is_ok());
    }

    #[test]
    fn test_matching_output_shape() {
        let graph = read_graph("2 1\n0 1\n".as_bytes()).unwrap();
        graph.flip_match(0);
        let mut out = Vec::new();
        write_matching(&graph, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<Matching>\n(0,1) \n"));
        assert!(text.ends_with("<M>\n1\n"));
    }
}
