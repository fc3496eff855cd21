//! Callcheck Domain - Core types
//!
//! This crate defines the data model of the callcheck harness: requests under
//! test, responses, rewrite rules, decoded values and check reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod capture;
pub mod diff;
pub mod error;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod testing;
pub mod value;

pub use capture::CapturedRequest;
pub use diff::{Difference, diff, render_diff};
pub use error::{DomainError, DomainResult};
pub use request::{BasicAuth, HeaderSet, HttpMethod, PreparedRequest, RequestBody};
pub use response::{CallResponse, StatusCode};
pub use rewrite::RewriteRule;
pub use testing::{CallReport, Check, CheckResult};
pub use value::DynValue;
