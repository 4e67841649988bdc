use http::Method;
use micro_router::Router;

/// A bundled route table, one `METHOD /pattern` per line.
#[derive(Debug, Copy, Clone)]
pub struct RouteTable {
    name: &'static str,
    content: &'static str,
}

impl RouteTable {
    pub const fn new(name: &'static str, content: &'static str) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn routes(&self) -> Vec<(Method, &'static str)> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let (method, pattern) = line
                    .split_once(' ')
                    .unwrap_or_else(|| panic!("malformed route line: '{line}'"));
                let method = method
                    .parse::<Method>()
                    .unwrap_or_else(|_| panic!("bad method in route line: '{line}'"));
                (method, pattern)
            })
            .collect()
    }

    /// Build a router where every handler is its own pattern string.
    pub fn router(&self) -> Router<&'static str> {
        let mut router = Router::new();
        for (method, pattern) in self.routes() {
            router
                .register(method, pattern, pattern)
                .unwrap_or_else(|e| panic!("registering '{pattern}': {e}"));
        }
        router
    }
}

/// A lookup to benchmark against a [`RouteTable`].
#[derive(Debug, Copy, Clone)]
pub struct LookupCase {
    name: &'static str,
    group: LookupGroup,
    method: &'static str,
    path: &'static str,
}

impl LookupCase {
    pub const fn new(
        name: &'static str,
        group: LookupGroup,
        method: &'static str,
        path: &'static str,
    ) -> Self {
        Self {
            name,
            group,
            method,
            path,
        }
    }

    pub const fn hit(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self::new(name, LookupGroup::Hit, method, path)
    }

    pub const fn miss(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self::new(name, LookupGroup::Miss, method, path)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> LookupGroup {
        self.group
    }

    pub fn method(&self) -> Method {
        self.method.parse().expect("valid method")
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LookupGroup {
    Hit,
    Miss,
}
