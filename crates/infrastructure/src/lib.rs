//! Callcheck Infrastructure - Adapters and the harness
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer (reqwest and URL-rewriting transports, JSON/YAML/BSON
//! codecs), the local server hosting handlers under test, and the harness
//! that ties them together.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod harness;
pub mod logging;
pub mod server;
pub mod testing;

pub use adapters::{ReqwestTransport, UrlRewritingTransport};
pub use codec::{BSON_EQUALS, BsonCodec, JSON_EQUALS, JsonCodec, YAML_EQUALS, YamlCodec};
pub use config::{ClientConfig, ConfigError};
pub use harness::{
    DoRequestParams, ExecuteFn, Harness, JsonCallParams, ResponseHook, assert_json_call,
    check_json_call, do_request, execute_fn, response_hook,
};
pub use logging::init_test_logging;
pub use server::{LocalServer, echo_router, echo_router_with};
pub use testing::ResponseVerifier;
