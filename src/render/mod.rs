//! Content-type tokens used by response renderers.

pub const HTML: &str = "text/html; charset=utf-8";
pub const JSON: &str = "application/json; charset=utf-8";
pub const JSONP: &str = "application/javascript; charset=utf-8";
pub const JSON_ASCII: &str = "application/json";
pub const MSGPACK: &str = "application/msgpack; charset=utf-8";
pub const PROTOBUF: &str = "application/x-protobuf";
pub const PLAIN: &str = "text/plain; charset=utf-8";
pub const TOML: &str = "application/toml; charset=utf-8";
pub const XML: &str = "application/xml; charset=utf-8";
pub const YAML: &str = "application/x-yaml; charset=utf-8";
