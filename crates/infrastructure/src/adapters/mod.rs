//! Transport adapters.

mod reqwest_transport;
mod rewriting;

pub use reqwest_transport::ReqwestTransport;
pub use rewriting::UrlRewritingTransport;
