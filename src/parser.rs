use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::automaton::{Automaton, Node, StateId};
use crate::error::Error;

/// Parses one indented-text tree file (§6 format): each line is a node
/// label preceded by leading TABs indicating depth; depth-0 lines are
/// roots; a node's children are the following lines of strictly greater
/// depth. Exactly one root per file.
pub fn parse_tree_file(path: impl AsRef<Path>) -> Result<Node, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    trace!("parsing {}", path.display());

    // Stack of (depth, node-under-construction), shallowest first. The top
    // of the stack is always the innermost node still open for children.
    let mut stack: Vec<(usize, Node)> = Vec::new();
    let mut root: Option<Node> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = line_no + 1;
        if raw_line.trim().is_empty() {
            continue;
        }

        let depth = raw_line.chars().take_while(|&c| c == '\t').count();
        let label = &raw_line[depth..];
        if label.is_empty() {
            return malformed(path, line, "line has indentation but no label");
        }

        if depth == 0 {
            if root.is_some() || !stack.is_empty() {
                close_to_depth(&mut stack, &mut root, 0, path, line)?;
                if root.is_some() {
                    return malformed(path, line, "multiple roots in one file");
                }
            }
            stack.push((0, Node::leaf(label)));
            continue;
        }

        let Some(&(top_depth, _)) = stack.last() else {
            return malformed(path, line, "first line of a file must be at depth 0");
        };

        if depth > top_depth + 1 {
            return malformed(
                path,
                line,
                format!("depth {depth} skips past the current depth {top_depth}"),
            );
        }

        if depth <= top_depth {
            close_to_depth(&mut stack, &mut root, depth, path, line)?;
        }

        stack.push((depth, Node::leaf(label)));
    }

    close_to_depth(&mut stack, &mut root, 0, path, text.lines().count() + 1)?;

    root.ok_or_else(|| Error::MalformedTree {
        path: path.to_path_buf(),
        line: 0,
        reason: "file has no depth-0 line".to_string(),
    })
}

/// Pops `stack` until its top has depth strictly less than `target_depth`,
/// attaching each popped node to its new top as a child in the order it was
/// pushed. When the stack empties entirely, the last popped node becomes
/// `root` — and a `root` already set at that point means a second root was
/// encountered.
fn close_to_depth(
    stack: &mut Vec<(usize, Node)>,
    root: &mut Option<Node>,
    target_depth: usize,
    path: &Path,
    line: usize,
) -> Result<(), Error> {
    while let Some(&(depth, _)) = stack.last() {
        if depth < target_depth {
            break;
        }
        let (_, node) = stack.pop().expect("just peeked");
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => {
                if root.is_some() {
                    return malformed(path, line, "multiple roots in one file");
                }
                *root = Some(node);
            }
        }
    }
    Ok(())
}

fn malformed<T>(path: &Path, line: usize, reason: impl Into<String>) -> Result<T, Error> {
    Err(Error::MalformedTree {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    })
}

/// Ingests every tree file directly inside `dir` (non-recursive) into
/// `automaton`, in sorted-filename order, and returns the root state of
/// each file in that same order.
pub fn ingest_directory(automaton: &mut Automaton, dir: impl AsRef<Path>) -> Result<Vec<StateId>, Error> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .map(|entry| {
            entry
                .map(|e| e.path())
                .map_err(|source| Error::Io {
                    path: dir.to_path_buf(),
                    source,
                })
        })
        .collect::<Result<_, _>>()?;
    paths.retain(|p| p.is_file());
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let tree = parse_tree_file(path)?;
            Ok(automaton.add_tree(&tree))
        })
        .collect()
}
