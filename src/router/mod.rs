//! Method-keyed routing on top of the tree.
//!
//! One tree per HTTP method, scanned linearly; method sets are small
//! enough that a map would not pay for itself. The router also remembers
//! the largest parameter and section counts seen at registration so the
//! per-lookup scratch buffers start out right-sized.

use crate::path;
use crate::tree::{InsertError, Node, Params, RouteValue, Skipped};
use http::Method;
use tracing::{debug, trace};

/// A per-method tree.
#[derive(Debug)]
pub struct Tree<T> {
    method: Method,
    root: Node<T>,
}

impl<T> Tree<T> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn root(&self) -> &Node<T> {
        &self.root
    }
}

/// The outcome of [`Router::at`]: the resolved handler (if any), the
/// pattern it was registered under, the captured parameters and the
/// trailing-slash advice.
#[derive(Debug)]
pub struct RouteResult<'router, 'path, T> {
    handler: Option<&'router T>,
    pattern: Option<&'router str>,
    params: Params<'router, 'path>,
    tsr: bool,
}

impl<'router, 'path, T> RouteResult<'router, 'path, T> {
    pub fn handler(&self) -> Option<&'router T> {
        self.handler
    }

    pub fn pattern(&self) -> Option<&'router str> {
        self.pattern
    }

    pub fn params(&self) -> &Params<'router, 'path> {
        &self.params
    }

    /// Whether the path with (or without) a trailing slash would match.
    pub fn tsr(&self) -> bool {
        self.tsr
    }

    pub fn is_empty(&self) -> bool {
        self.handler.is_none()
    }
}

/// A forest of per-method route trees.
#[derive(Debug)]
pub struct Router<T> {
    trees: Vec<Tree<T>>,
    max_params: usize,
    max_sections: usize,
    unescape_path_values: bool,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self {
            trees: Vec::new(),
            max_params: 0,
            max_sections: 0,
            unescape_path_values: false,
        }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with one empty tree per method, registered up front.
    pub fn with_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut router = Self::new();
        for method in methods {
            router.tree_mut(&method);
        }
        router
    }

    pub fn builder() -> RouterBuilder<T> {
        RouterBuilder::new()
    }

    /// Register `value` for `method` and `route`. A tree for an unseen
    /// method is created on the fly.
    pub fn register(&mut self, method: Method, route: &str, value: T) -> Result<(), InsertError> {
        if !route.starts_with('/') {
            return Err(InsertError::MalformedPath {
                route: route.to_string(),
            });
        }

        self.tree_mut(&method).insert(route, value)?;

        self.max_params = self.max_params.max(path::count_parameters(route));
        self.max_sections = self.max_sections.max(path::count_sections(route));
        debug!(method = %method, route, "route registered");
        Ok(())
    }

    /// Resolve `path` for `method`, with scratch buffers sized from the
    /// registered routes.
    pub fn at<'router, 'path>(
        &'router self,
        method: &Method,
        path: &'path str,
    ) -> RouteResult<'router, 'path, T> {
        let mut params = Params::with_capacity(self.max_params);
        let mut skipped = Vec::with_capacity(self.max_sections);

        let Some(root) = self.tree(method) else {
            trace!(method = %method, path, "no tree for method");
            return RouteResult {
                handler: None,
                pattern: None,
                params,
                tsr: false,
            };
        };

        let value = root.query(path, &mut params, &mut skipped, self.unescape_path_values);
        RouteResult {
            handler: value.handler,
            pattern: value.pattern,
            params,
            tsr: value.tsr,
        }
    }

    /// Case-insensitive recovery of `path` against the tree for `method`.
    pub fn search(&self, method: &Method, path: &str, fix_trailing_slash: bool) -> Option<String> {
        self.tree(method)?.search(path, fix_trailing_slash)
    }

    /// Methods whose trees resolve `path`, for building an Allow header.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut params = Params::with_capacity(self.max_params);
        let mut skipped: Vec<Skipped<'_, '_, T>> = Vec::with_capacity(self.max_sections);

        let mut allowed = Vec::new();
        for tree in &self.trees {
            let value: RouteValue<'_, T> =
                tree.root.query(path, &mut params, &mut skipped, false);
            if value.handler.is_some() {
                allowed.push(tree.method.clone());
            }
        }
        allowed
    }

    pub fn tree(&self, method: &Method) -> Option<&Node<T>> {
        self.trees
            .iter()
            .find(|tree| tree.method == *method)
            .map(|tree| &tree.root)
    }

    fn tree_mut(&mut self, method: &Method) -> &mut Node<T> {
        if let Some(pos) = self.trees.iter().position(|tree| tree.method == *method) {
            return &mut self.trees[pos].root;
        }
        self.trees.push(Tree {
            method: method.clone(),
            root: Node::new(),
        });
        &mut self.trees.last_mut().expect("tree just pushed").root
    }
}

/// Collects routes and options, then builds the [`Router`] in one go.
#[derive(Debug)]
pub struct RouterBuilder<T> {
    routes: Vec<(Method, String, T)>,
    unescape_path_values: bool,
}

impl<T> RouterBuilder<T> {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            unescape_path_values: false,
        }
    }

    pub fn route(mut self, method: Method, route: impl Into<String>, value: T) -> Self {
        self.routes.push((method, route.into(), value));
        self
    }

    /// Percent-decode captured parameter values during lookups.
    pub fn unescape_path_values(mut self, unescape: bool) -> Self {
        self.unescape_path_values = unescape;
        self
    }

    pub fn build(self) -> Result<Router<T>, InsertError> {
        let mut router = Router::new();
        router.unescape_path_values = self.unescape_path_values;
        for (method, route, value) in self.routes {
            router.register(method, &route, value)?;
        }
        Ok(router)
    }
}
