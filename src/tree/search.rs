//! Case-insensitive path recovery.
//!
//! A second walk over the tree that compares edges with a Unicode case
//! fold and rebuilds the path in its registered casing. Because a case
//! transform can change a character's encoded length, the walk carries
//! the current character's encoding in a 4-byte buffer that is shifted as
//! edge bytes are consumed; when the buffer runs dry the character
//! straddling the edge boundary is decoded from the request path and
//! probed in lowercase first, then uppercase.

use super::{Node, NodeKind};
use crate::path;

impl<T> Node<T> {
    /// Find the registered-case form of `path`, comparing case
    /// insensitively. With `fix_trailing_slash`, a match that only
    /// differs in a terminal `/` is accepted and the output adjusted
    /// accordingly.
    pub fn search(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut out = Vec::with_capacity(128.max(path.len() + 1));
        if self.search_in(path.as_bytes(), &mut out, [0; 4], fix_trailing_slash) {
            String::from_utf8(out).ok()
        } else {
            None
        }
    }

    fn search_in(
        &self,
        mut path: &[u8],
        out: &mut Vec<u8>,
        mut runes: [u8; 4],
        fix_trailing_slash: bool,
    ) -> bool {
        let mut current = self;
        let mut prefix_len = current.prefix.len();

        'walk: while path.len() >= prefix_len
            && (prefix_len == 0 || path::eq_fold(&path[1..prefix_len], &current.prefix[1..]))
        {
            let consumed = path;
            path = &path[prefix_len..];
            out.extend_from_slice(&current.prefix);

            if path.is_empty() {
                if current.value.is_some() {
                    return true;
                }
                // check whether this path plus a trailing slash exists
                if fix_trailing_slash {
                    if let Some(pos) = current.indices.iter().position(|&b| b == b'/') {
                        let child = &current.children[pos];
                        if (child.prefix.len() == 1 && child.value.is_some())
                            || (child.kind == NodeKind::CatchAll
                                && child.children[0].value.is_some())
                        {
                            out.push(b'/');
                            return true;
                        }
                        return false;
                    }
                }
                return false;
            }

            if !current.wild_child {
                runes = path::shift_rune_bytes(runes, prefix_len);

                if runes[0] != 0 {
                    // still inside the character matched one level up
                    let c = runes[0];
                    for (pos, &b) in current.indices.iter().enumerate() {
                        if b == c {
                            current = &current.children[pos];
                            prefix_len = current.prefix.len();
                            continue 'walk;
                        }
                    }
                } else {
                    // decode the character sitting on the edge boundary,
                    // scanning back over continuation bytes
                    let mut rune = char::REPLACEMENT_CHARACTER;
                    let mut off = 0;
                    let max = prefix_len.min(3);
                    while off < max {
                        let index = prefix_len - off;
                        if path::is_rune_start(consumed[index]) {
                            let (c, _) = path::decode_rune_lossy(&consumed[index..]);
                            rune = c;
                            break;
                        }
                        off += 1;
                    }

                    let lower = path::lower_rune(rune);
                    let mut encoded = [0u8; 4];
                    lower.encode_utf8(&mut encoded);
                    runes = path::shift_rune_bytes(encoded, off);

                    let c = runes[0];
                    for (pos, &b) in current.indices.iter().enumerate() {
                        if b == c {
                            // both casings can exist as indices, so the
                            // lowercase probe must not commit the walk
                            let mark = out.len();
                            if current.children[pos].search_in(
                                path,
                                out,
                                runes,
                                fix_trailing_slash,
                            ) {
                                return true;
                            }
                            out.truncate(mark);
                            break;
                        }
                    }

                    let upper = path::upper_rune(rune);
                    if upper != lower {
                        let mut encoded = [0u8; 4];
                        upper.encode_utf8(&mut encoded);
                        runes = path::shift_rune_bytes(encoded, off);

                        let c = runes[0];
                        for (pos, &b) in current.indices.iter().enumerate() {
                            if b == c {
                                current = &current.children[pos];
                                prefix_len = current.prefix.len();
                                continue 'walk;
                            }
                        }
                    }
                }

                // nothing found; the path minus its trailing slash may match
                return fix_trailing_slash && path == b"/" && current.value.is_some();
            }

            // the wildcard child is pinned last
            current = &current.children[current.children.len() - 1];
            match current.kind {
                NodeKind::Param => {
                    let end = path
                        .iter()
                        .position(|&b| b == b'/')
                        .unwrap_or(path.len());
                    out.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if !current.children.is_empty() {
                            path = &path[end..];
                            current = &current.children[0];
                            prefix_len = current.prefix.len();
                            continue 'walk;
                        }
                        return fix_trailing_slash && path.len() == end + 1;
                    }

                    if current.value.is_some() {
                        return true;
                    }
                    if fix_trailing_slash && current.children.len() == 1 {
                        let child = &current.children[0];
                        if child.prefix == b"/" && child.value.is_some() {
                            out.push(b'/');
                            return true;
                        }
                    }
                    return false;
                }
                NodeKind::CatchAll => {
                    out.extend_from_slice(path);
                    return true;
                }
                _ => unreachable!("invalid node kind"),
            }
        }

        // the walk fell off the edge; try the trailing-slash fixes
        if fix_trailing_slash {
            if path == b"/" {
                return true;
            }
            if !path.is_empty()
                && path.len() + 1 == prefix_len
                && current.prefix[path.len()] == b'/'
                && path::eq_fold(&path[1..], &current.prefix[1..path.len()])
                && current.value.is_some()
            {
                out.extend_from_slice(&current.prefix);
                return true;
            }
        }
        false
    }
}
