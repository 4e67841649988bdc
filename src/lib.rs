//! A compressed radix-tree HTTP router.
//!
//! Routes are registered as `/`-separated patterns built from static
//! segments, single-segment parameters (`:name`) and trailing catch-alls
//! (`*name`), and are resolved to at most one handler per method. Lookups
//! extract captured parameters into a caller-owned buffer, backtrack out
//! of parameter branches when a static sibling fits better, and report
//! whether the path with or without a trailing slash would have matched.

pub mod binding;
pub mod render;
pub mod router;
pub mod tree;

mod path;

pub use router::{RouteResult, Router, RouterBuilder, Tree};
pub use tree::{InsertError, Node, Param, Params, RouteValue, Skipped};
