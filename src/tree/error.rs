use thiserror::Error;

/// Errors reported while registering a route.
///
/// A failed registration never changes what any previously registered
/// route resolves to: pattern grammar is validated before the tree is
/// touched, and the conflict checks are only ever preceded by priority
/// bumps and prefix splits, neither of which alters resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{route}'")]
    MultipleWildcards { route: String, segment: String },

    #[error("wildcards must be named with a non-empty name in path '{route}'")]
    EmptyWildcardName { route: String },

    #[error("catch-all routes are only allowed at the end of the path in path '{route}'")]
    CatchAllPosition { route: String },

    #[error("no / before catch-all in path '{route}'")]
    MissingCatchAllSlash { route: String },

    #[error("catch-all wildcard '{wildcard}' in new path '{route}' conflicts with existing path segment '{segment}' in existing prefix '{prefix}'")]
    CatchAllConflict {
        route: String,
        wildcard: String,
        segment: String,
        prefix: String,
    },

    #[error("'{segment}' in new path '{route}' conflicts with existing wildcard '{existing}' in existing prefix '{prefix}'")]
    WildcardConflict {
        route: String,
        segment: String,
        existing: String,
        prefix: String,
    },

    #[error("a handler is already registered for path '{route}'")]
    DuplicateRoute { route: String },

    #[error("path must begin with '/' in path '{route}'")]
    MalformedPath { route: String },
}
