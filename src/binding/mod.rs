//! Request-decoder selection.
//!
//! The router itself never touches request bodies; this module only fixes
//! the contract by which a host server picks a decoder for a request.
//! Selection is keyed by method first and content type second. Form
//! decoding is the only decoder wired in; body decoders for other content
//! types plug into [`default`] as they appear.

use http::Method;

/// A request decoder, looked up per request.
pub trait Binding {
    fn name(&self) -> &'static str;
}

/// URL-encoded form binding, the default decoder.
pub struct Form;

impl Binding for Form {
    fn name(&self) -> &'static str {
        "form"
    }
}

/// Pick the decoder for a request. GET requests always decode from the
/// query form regardless of content type.
pub fn default(method: &Method, content_type: &str) -> &'static dyn Binding {
    if method == Method::GET {
        return &Form;
    }

    match content_type.parse::<mime::Mime>() {
        Ok(mime) if mime == mime::APPLICATION_WWW_FORM_URLENCODED => &Form,
        _ => &Form,
    }
}
