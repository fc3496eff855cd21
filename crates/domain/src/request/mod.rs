//! HTTP Request domain types

mod body;
mod header;
mod method;
mod prepared;

pub use body::{BodyStream, RequestBody};
pub use header::{HeaderSet, canonical_header_name, is_token_byte};
pub use method::HttpMethod;
pub use prepared::{BasicAuth, JSON_MEDIA_TYPE, PreparedRequest, is_absolute_url, resolve_url};
