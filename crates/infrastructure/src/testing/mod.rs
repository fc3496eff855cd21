//! Response verification.
//!
//! This module provides the verifier that checks call outcomes against
//! expectations.

mod verifier;

pub use verifier::ResponseVerifier;
