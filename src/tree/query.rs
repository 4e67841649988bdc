//! Resolving a request path against the tree.
//!
//! The walk consumes the path edge by edge. Whenever it commits to a
//! static child while the current node also has a wildcard child, the
//! alternative is recorded on the skipped stack; a later dead end pops
//! the newest frame whose recorded path still ends with what is left to
//! match and retries along the wildcard branch.

use super::{Node, NodeKind, Params};

/// A parked wildcard alternative, recorded while descending into a
/// static sibling.
#[derive(Debug)]
pub struct Skipped<'tree, 'path, T> {
    path: &'path [u8],
    node: &'tree Node<T>,
    param_count: usize,
}

/// The outcome of a query.
///
/// `handler` is `None` when nothing matched. `tsr` advises the caller
/// that redirecting to the path with (or without) a trailing slash would
/// have matched a handler. Captures land in the `Params` buffer passed to
/// [`Node::query`].
#[derive(Debug)]
pub struct RouteValue<'tree, T> {
    pub handler: Option<&'tree T>,
    pub pattern: Option<&'tree str>,
    pub tsr: bool,
}

impl<'tree, T> Default for RouteValue<'tree, T> {
    fn default() -> Self {
        Self {
            handler: None,
            pattern: None,
            tsr: false,
        }
    }
}

impl<T> Node<T> {
    /// Resolve `path`, writing captures into `params`.
    ///
    /// `params` and `skipped` are caller-owned scratch buffers; both are
    /// cleared on entry and may be reused across lookups. With `unescape`
    /// set, captured values are percent-decoded (`+` as space); a value
    /// that fails to decode is kept raw.
    ///
    /// Lookups never mutate the tree, so a frozen tree can be queried
    /// from any number of threads as long as each caller brings its own
    /// buffers.
    pub fn query<'tree, 'path>(
        &'tree self,
        path: &'path str,
        params: &mut Params<'tree, 'path>,
        skipped: &mut Vec<Skipped<'tree, 'path, T>>,
        unescape: bool,
    ) -> RouteValue<'tree, T> {
        params.clear();
        skipped.clear();

        let full = path.as_bytes();
        let mut path = full;
        let mut current = self;
        let mut backtracking = false;
        let mut value = RouteValue::default();

        'walk: loop {
            let prefix = current.prefix.as_slice();

            if path.len() > prefix.len() && &path[..prefix.len()] == prefix {
                path = &path[prefix.len()..];
                let c = path[0];

                // static children first, unless we just unwound to here
                if !backtracking {
                    if let Some(pos) = current.indices.iter().position(|&b| b == c) {
                        if current.wild_child {
                            skipped.push(Skipped {
                                path: &full[full.len() - (prefix.len() + path.len())..],
                                node: current,
                                param_count: params.len(),
                            });
                        }
                        current = &current.children[pos];
                        continue 'walk;
                    }
                }

                if !current.wild_child {
                    if path != b"/"
                        && backtrack(skipped, params, &mut path, &mut current)
                    {
                        backtracking = true;
                        continue 'walk;
                    }
                    value.tsr = path == b"/" && current.value.is_some();
                    return value;
                }

                // the wildcard child is pinned last
                current = &current.children[current.children.len() - 1];
                match current.kind {
                    NodeKind::Param => {
                        let end = path
                            .iter()
                            .position(|&b| b == b'/')
                            .unwrap_or(path.len());

                        params.grow(params.len() + 1);
                        params.capture(&current.prefix[1..], &path[..end], unescape);

                        if end < path.len() {
                            if !current.children.is_empty() {
                                path = &path[end..];
                                current = &current.children[0];
                                backtracking = false;
                                continue 'walk;
                            }
                            value.tsr = path.len() == end + 1;
                            return value;
                        }

                        if let Some(handler) = current.value.as_ref() {
                            value.handler = Some(handler);
                            value.pattern = Some(&current.pattern);
                            return value;
                        }
                        if current.children.len() == 1 {
                            let child = &current.children[0];
                            value.tsr = (child.prefix == b"/" && child.value.is_some())
                                || (child.prefix.is_empty() && child.indices == b"/");
                        }
                        return value;
                    }
                    NodeKind::CatchAll => {
                        params.grow(params.len() + 1);
                        params.capture(&current.prefix[2..], path, unescape);

                        value.handler = current.value.as_ref();
                        value.pattern = Some(&current.pattern);
                        return value;
                    }
                    _ => unreachable!("invalid node kind"),
                }
            }

            if path == prefix {
                // a parked wildcard branch may still carry the handler
                if current.value.is_none()
                    && path != b"/"
                    && backtrack(skipped, params, &mut path, &mut current)
                {
                    backtracking = true;
                    continue 'walk;
                }

                if let Some(handler) = current.value.as_ref() {
                    value.handler = Some(handler);
                    value.pattern = Some(&current.pattern);
                    return value;
                }

                if path == b"/" && current.wild_child && current.kind != NodeKind::Root {
                    value.tsr = true;
                    return value;
                }
                if path == b"/" && current.kind == NodeKind::Static {
                    value.tsr = true;
                    return value;
                }

                // a '/'-child decides whether path + '/' would match
                if let Some(pos) = current.indices.iter().position(|&b| b == b'/') {
                    let child = &current.children[pos];
                    value.tsr = (child.prefix.len() == 1 && child.value.is_some())
                        || (child.kind == NodeKind::CatchAll
                            && child.children[0].value.is_some());
                    return value;
                }
                return value;
            }

            // path diverges from the edge
            value.tsr = path == b"/"
                || (prefix.len() == path.len() + 1
                    && prefix[path.len()] == b'/'
                    && path == &prefix[..prefix.len() - 1]
                    && current.value.is_some());
            if !value.tsr
                && path != b"/"
                && backtrack(skipped, params, &mut path, &mut current)
            {
                backtracking = true;
                continue 'walk;
            }
            return value;
        }
    }
}

/// Pop skipped frames newest-first, restoring the first one whose
/// recorded path still ends with what is left to match.
fn backtrack<'tree, 'path, T>(
    skipped: &mut Vec<Skipped<'tree, 'path, T>>,
    params: &mut Params<'tree, 'path>,
    path: &mut &'path [u8],
    current: &mut &'tree Node<T>,
) -> bool {
    while let Some(frame) = skipped.pop() {
        if frame.path.ends_with(path) {
            *path = frame.path;
            *current = frame.node;
            params.truncate(frame.param_count);
            return true;
        }
    }
    false
}
