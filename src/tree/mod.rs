//! The route trie.
//!
//! One tree per HTTP method. Each node carries a byte-string edge, the
//! edges of the children it dispatches on (`indices`, one first byte per
//! static child) and a priority counter that keeps hot branches at the
//! front. A node with a `:name` or `*name` child stores that child last
//! and sets `wild_child`.

mod error;
mod params;
mod query;
mod search;

pub use error::InsertError;
pub use params::{Param, Params};
pub use query::{RouteValue, Skipped};

use crate::path;
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Static,
    Root,
    Param,
    CatchAll,
}

/// A node of the route trie.
///
/// The handler slot is generic and opaque; the tree never invokes it.
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) prefix: Vec<u8>,
    pub(crate) kind: NodeKind,
    pub(crate) wild_child: bool,
    pub(crate) indices: Vec<u8>,
    pub(crate) priority: u32,
    pub(crate) pattern: String,
    pub(crate) value: Option<T>,
    pub(crate) children: Vec<Node<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            prefix: Vec::new(),
            kind: NodeKind::Static,
            wild_child: false,
            indices: Vec::new(),
            priority: 0,
            pattern: String::new(),
            value: None,
            children: Vec::new(),
        }
    }
}

impl<T> Node<T> {
    /// An empty tree root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `route`.
    ///
    /// Not safe against concurrent use of the same tree; finish all
    /// registrations before serving lookups.
    pub fn insert(&mut self, route: &str, value: T) -> Result<(), InsertError> {
        validate_route(route)?;

        self.priority += 1;

        // empty tree
        if self.prefix.is_empty() && self.children.is_empty() {
            self.insert_child(route.as_bytes(), route, value)?;
            self.kind = NodeKind::Root;
            return Ok(());
        }

        let mut path: &[u8] = route.as_bytes();
        let mut current = self;
        // bytes of `route` consumed by the edges above `current`
        let mut consumed = 0usize;

        'walk: loop {
            let i = path::longest_common_prefix(path, &current.prefix);

            // split the edge
            if i < current.prefix.len() {
                let mut child = Node {
                    prefix: current.prefix[i..].to_vec(),
                    kind: NodeKind::Static,
                    wild_child: current.wild_child,
                    indices: mem::take(&mut current.indices),
                    priority: current.priority - 1,
                    pattern: mem::take(&mut current.pattern),
                    value: current.value.take(),
                    children: Vec::new(),
                };
                mem::swap(&mut current.children, &mut child.children);

                current.indices = vec![child.prefix[0]];
                current.children.push(child);
                current.prefix.truncate(i);
                current.pattern = pattern_head(route, consumed + i);
                current.wild_child = false;
            }

            // descend with what is left of the route
            if i < path.len() {
                path = &path[i..];
                let c = path[0];

                // '/' directly after a parameter has a single child
                if current.kind == NodeKind::Param && c == b'/' && current.children.len() == 1 {
                    consumed += current.prefix.len();
                    current = &mut current.children[0];
                    current.priority += 1;
                    continue 'walk;
                }

                // existing static child with a matching first byte
                if let Some(pos) = current.indices.iter().position(|&b| b == c) {
                    consumed += current.prefix.len();
                    let pos = current.update_child_priority(pos);
                    current = &mut current.children[pos];
                    continue 'walk;
                }

                if c != b':' && c != b'*' && current.kind != NodeKind::CatchAll {
                    current.indices.push(c);
                    let pos = current.add_child(Node {
                        pattern: route.to_string(),
                        ..Node::default()
                    });
                    let pos = current.update_child_priority(pos);
                    current = &mut current.children[pos];
                } else if current.wild_child {
                    // a wildcard child exists; the new route must use it verbatim
                    let last = current.children.len() - 1;
                    current = &mut current.children[last];
                    current.priority += 1;

                    if path.len() >= current.prefix.len()
                        && current.prefix[..] == path[..current.prefix.len()]
                        && current.kind != NodeKind::CatchAll
                        && (current.prefix.len() >= path.len()
                            || path[current.prefix.len()] == b'/')
                    {
                        continue 'walk;
                    }

                    let segment = if current.kind == NodeKind::CatchAll {
                        path
                    } else {
                        &path[..path
                            .iter()
                            .position(|&b| b == b'/')
                            .unwrap_or(path.len())]
                    };
                    let segment = String::from_utf8_lossy(segment).into_owned();
                    let existing = String::from_utf8_lossy(&current.prefix).into_owned();
                    let prefix = match route.find(&segment) {
                        Some(at) => format!("{}{}", &route[..at], existing),
                        None => existing.clone(),
                    };
                    return Err(InsertError::WildcardConflict {
                        route: route.to_string(),
                        segment,
                        existing,
                        prefix,
                    });
                }

                return current.insert_child(path, route, value);
            }

            // the route ends exactly here
            if current.value.is_some() {
                return Err(InsertError::DuplicateRoute {
                    route: route.to_string(),
                });
            }
            current.value = Some(value);
            current.pattern = route.to_string();
            return Ok(());
        }
    }

    /// Append a child, keeping the wildcard child at the end.
    fn add_child(&mut self, child: Node<T>) -> usize {
        if self.wild_child && !self.children.is_empty() {
            let pos = self.children.len() - 1;
            self.children.insert(pos, child);
            pos
        } else {
            self.children.push(child);
            self.children.len() - 1
        }
    }

    /// Bump the priority of the child at `pos` and restore the ordering,
    /// returning the child's new position. `indices` moves in lockstep.
    fn update_child_priority(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }

        if new_pos != pos {
            let moved = self.indices.remove(pos);
            self.indices.insert(new_pos, moved);
        }

        new_pos
    }

    /// Consume the wildcard segments of `path`, growing the parameter and
    /// catch-all substructure under `self`. The pattern grammar has
    /// already been validated.
    fn insert_child(&mut self, mut path: &[u8], route: &str, value: T) -> Result<(), InsertError> {
        let mut current = self;

        loop {
            let (wildcard, index, _) = path::find_wildcard(path);
            let Some(index) = index else {
                current.prefix = path.to_vec();
                current.pattern = route.to_string();
                current.value = Some(value);
                return Ok(());
            };
            let wildcard = wildcard.unwrap_or_default();

            if wildcard[0] == b':' {
                // static head before the parameter
                if index > 0 {
                    current.prefix = path[..index].to_vec();
                    path = &path[index..];
                }

                let pos = current.add_child(Node {
                    kind: NodeKind::Param,
                    prefix: wildcard.to_vec(),
                    pattern: route.to_string(),
                    ..Node::default()
                });
                current.wild_child = true;
                current = &mut current.children[pos];
                current.priority += 1;

                // a static tail follows the parameter segment
                if wildcard.len() < path.len() {
                    path = &path[wildcard.len()..];
                    let pos = current.add_child(Node {
                        priority: 1,
                        pattern: route.to_string(),
                        ..Node::default()
                    });
                    current = &mut current.children[pos];
                    continue;
                }

                current.value = Some(value);
                return Ok(());
            }

            // catch-all; grammar checks guarantee it is terminal with a '/'
            // in front, so an edge already ending in '/' owns that segment
            if current.prefix.last() == Some(&b'/') {
                let segment = current
                    .children
                    .first()
                    .map(|child| {
                        let end = child
                            .prefix
                            .iter()
                            .position(|&b| b == b'/')
                            .unwrap_or(child.prefix.len());
                        String::from_utf8_lossy(&child.prefix[..end]).into_owned()
                    })
                    .unwrap_or_default();
                let head = String::from_utf8_lossy(&current.prefix).into_owned();
                return Err(InsertError::CatchAllConflict {
                    route: route.to_string(),
                    wildcard: String::from_utf8_lossy(path).into_owned(),
                    prefix: format!("{head}{segment}"),
                    segment,
                });
            }

            let slash = index - 1;
            current.prefix = path[..slash].to_vec();

            // first node: catch-all marker with an empty edge
            let pos = current.add_child(Node {
                kind: NodeKind::CatchAll,
                wild_child: true,
                pattern: route.to_string(),
                ..Node::default()
            });
            current.indices = vec![b'/'];
            current = &mut current.children[pos];
            current.priority += 1;

            // second node: holds the variable, edge starts at the '/'
            current.children = vec![Node {
                kind: NodeKind::CatchAll,
                prefix: path[slash..].to_vec(),
                pattern: route.to_string(),
                value: Some(value),
                priority: 1,
                ..Node::default()
            }];
            return Ok(());
        }
    }
}

/// Check the pattern grammar of `route` before anything is mutated.
fn validate_route(route: &str) -> Result<(), InsertError> {
    let bytes = route.as_bytes();
    let mut offset = 0;

    while offset < bytes.len() {
        let (wildcard, index, valid) = path::find_wildcard(&bytes[offset..]);
        let Some(index) = index else {
            return Ok(());
        };
        let wildcard = wildcard.unwrap_or_default();

        if !valid {
            return Err(InsertError::MultipleWildcards {
                route: route.to_string(),
                segment: String::from_utf8_lossy(wildcard).into_owned(),
            });
        }
        if wildcard.len() < 2 {
            return Err(InsertError::EmptyWildcardName {
                route: route.to_string(),
            });
        }
        if wildcard[0] == b'*' {
            let start = offset + index;
            if start + wildcard.len() != bytes.len() {
                return Err(InsertError::CatchAllPosition {
                    route: route.to_string(),
                });
            }
            if start == 0 || bytes[start - 1] != b'/' {
                return Err(InsertError::MissingCatchAllSlash {
                    route: route.to_string(),
                });
            }
        }

        offset += index + wildcard.len();
    }
    Ok(())
}

/// First `end` bytes of `route`, rounded down to a character boundary.
/// Intermediate nodes keep this as their pattern for conflict messages.
fn pattern_head(route: &str, mut end: usize) -> String {
    while end > 0 && !route.is_char_boundary(end) {
        end -= 1;
    }
    route[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit<T>(node: &Node<T>) -> u32 {
        // indices track every child except the wildcard pinned last; a
        // parameter node reaches its single child without an index
        if node.kind != NodeKind::Param {
            assert_eq!(
                node.indices.len(),
                node.children.len() - usize::from(node.wild_child),
                "indices length mismatch on '{}'",
                String::from_utf8_lossy(&node.prefix)
            );
        }
        for (i, &b) in node.indices.iter().enumerate() {
            let edge = &node.children[i].prefix;
            if !edge.is_empty() {
                assert_eq!(
                    edge[0],
                    b,
                    "index byte mismatch on '{}'",
                    String::from_utf8_lossy(&node.prefix)
                );
            }
        }
        if node.wild_child {
            let last = node.children.last().expect("wildcard child missing");
            assert!(matches!(last.kind, NodeKind::Param | NodeKind::CatchAll));
        }

        // children sorted by priority, wildcard pinned last
        let sortable = node.children.len() - usize::from(node.wild_child);
        for pair in node.children[..sortable].windows(2) {
            assert!(
                pair[0].priority >= pair[1].priority,
                "priority order violated on '{}'",
                String::from_utf8_lossy(&node.prefix)
            );
        }

        // priority equals the number of values below, like the source trees
        let mut total = u32::from(node.value.is_some());
        for child in &node.children {
            total += audit(child);
        }
        assert_eq!(
            node.priority,
            total,
            "priority mismatch on '{}'",
            String::from_utf8_lossy(&node.prefix)
        );
        total
    }

    fn tree_of(routes: &[&str]) -> Node<String> {
        let mut tree = Node::new();
        for route in routes {
            tree.insert(route, route.to_string())
                .unwrap_or_else(|e| panic!("inserting '{route}': {e}"));
        }
        tree
    }

    #[test]
    fn test_insert_and_audit() {
        let tree = tree_of(&[
            "/hi",
            "/contact",
            "/co",
            "/c",
            "/a",
            "/ab",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/ʯ",
            "/β",
        ]);
        audit(&tree);
    }

    #[test]
    fn test_insert_wildcards_and_audit() {
        let tree = tree_of(&[
            "/",
            "/cmd/:tool/:sub",
            "/cmd/:tool/",
            "/src/*filepath",
            "/search/",
            "/search/:query",
            "/user_:name",
            "/user_:name/about",
            "/files/:dir/*filepath",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/info/:user/public",
            "/info/:user/project/:project",
        ]);
        audit(&tree);
    }

    #[test]
    fn test_priority_reorder() {
        let mut tree = tree_of(&["/a", "/b", "/c"]);
        // re-registering below /b's subtree twice makes it the hottest child
        tree.insert("/b/one", "/b/one".to_string()).unwrap();
        tree.insert("/b/two", "/b/two".to_string()).unwrap();
        audit(&tree);
        assert_eq!(tree.children[0].prefix, b"b");
    }

    fn expect_errors(routes: &[(&str, bool)]) {
        let mut tree = Node::new();
        for &(route, should_fail) in routes {
            let result = tree.insert(route, route.to_string());
            if should_fail {
                assert!(result.is_err(), "expected error for route '{route}'");
            } else {
                assert!(result.is_ok(), "unexpected error for route '{route}': {result:?}");
            }
        }
    }

    #[test]
    fn test_wildcard_conflicts() {
        // static siblings of a wildcard are fine, they win over it at
        // lookup time; only a second, different wildcard conflicts
        expect_errors(&[
            ("/cmd/:tool/:sub", false),
            ("/cmd/vet", false),
            ("/src/*filepath", false),
            ("/src/*filepathx", true),
            ("/src/", true),
            ("/src1/", false),
            ("/src1/*filepath", true),
            ("/src2*filepath", true),
            ("/search/:query", false),
            ("/search/invalid", false),
            ("/user_:name", false),
            ("/user_x", false),
            ("/user_:name", true),
            ("/id:id", false),
            ("/id/:id", false),
        ]);
    }

    #[test]
    fn test_catch_all_conflicts() {
        expect_errors(&[
            ("/src/*filepath/x", true),
            ("/src2/", false),
            ("/src2/*filepath/x", true),
            ("/src2/*filepath", true),
            ("/src2/file", false),
            ("/src3/AUTHORS", false),
            ("/src3/*filepath", true),
        ]);
        expect_errors(&[("/", false), ("/*filepath", true)]);
    }

    #[test]
    fn test_wildcard_vs_wildcard() {
        expect_errors(&[
            ("/who/are/*you", false),
            ("/who/are/foo", true),
            ("/who/are/foo/bar", true),
            ("/whose/:users/:name", false),
            ("/whose/:users/:user", true),
        ]);
    }

    #[test]
    fn test_conflict_kinds() {
        let mut tree = Node::new();
        tree.insert("/users/:id", ()).unwrap();
        match tree.insert("/users/:name", ()) {
            Err(InsertError::WildcardConflict {
                segment, existing, ..
            }) => {
                assert_eq!(segment, ":name");
                assert_eq!(existing, ":id");
            }
            other => panic!("expected wildcard conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_conflict_message_names_shared_prefix() {
        let mut tree = Node::new();
        tree.insert("/users/:id", ()).unwrap();
        let message = tree.insert("/users/:name", ()).unwrap_err().to_string();
        assert!(message.contains("':name'"), "{message}");
        assert!(message.contains("'/users/:name'"), "{message}");
        assert!(message.contains("':id'"), "{message}");
        assert!(message.contains("'/users/:id'"), "{message}");
    }

    #[test]
    fn test_multiple_wildcards_per_segment() {
        for route in ["/:foo:bar", "/:foo:bar/", "/:foo*bar"] {
            let mut tree = Node::new();
            assert!(matches!(
                tree.insert(route, ()),
                Err(InsertError::MultipleWildcards { .. })
            ));
        }
    }

    #[test]
    fn test_empty_wildcard_name() {
        for route in ["/user:", "/user:/", "/cmd/:/", "/src/*"] {
            let mut tree = Node::new();
            assert!(matches!(
                tree.insert(route, ()),
                Err(InsertError::EmptyWildcardName { .. })
            ));
        }
    }

    #[test]
    fn test_catch_all_grammar() {
        let mut tree = Node::<()>::new();
        assert!(matches!(
            tree.insert("/a/*p/b", ()),
            Err(InsertError::CatchAllPosition { .. })
        ));
        let mut tree = Node::<()>::new();
        assert!(matches!(
            tree.insert("/a*p", ()),
            Err(InsertError::MissingCatchAllSlash { .. })
        ));
        // grammar errors are detected before the tree is touched
        let mut tree = Node::new();
        tree.insert("/keep", "kept".to_string()).unwrap();
        assert!(tree.insert("/a/*p/b", "new".to_string()).is_err());
        audit(&tree);
    }

    #[test]
    fn test_duplicates() {
        let routes = ["/", "/doc/", "/src/*filepath", "/search/:query", "/user_:name"];
        let mut tree = Node::new();
        for route in routes {
            tree.insert(route, route.to_string()).unwrap();
            assert!(matches!(
                tree.insert(route, route.to_string()),
                Err(InsertError::DuplicateRoute { .. })
            ));
        }
    }

    #[test]
    fn test_failed_insert_keeps_existing_routes() {
        let mut tree = tree_of(&["/who/are/*you", "/who/foo/hello"]);
        assert!(tree.insert("/who/are/foo", "x".to_string()).is_err());
        assert!(tree.insert("/who/are/foo/bar", "x".to_string()).is_err());

        let mut params = Params::new();
        let mut skipped = Vec::new();
        let value = tree.query("/who/are/me", &mut params, &mut skipped, false);
        assert_eq!(value.handler.map(String::as_str), Some("/who/are/*you"));
        let value = tree.query("/who/foo/hello", &mut params, &mut skipped, false);
        assert_eq!(value.handler.map(String::as_str), Some("/who/foo/hello"));
    }
}
