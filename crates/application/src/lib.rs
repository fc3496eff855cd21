//! Callcheck Application - Ports and checks
//!
//! This crate contains the transport and codec ports, the codec equality
//! algorithm and the expectation types the harness verifies calls against.
//! It depends only on the domain layer and defines interfaces (ports)
//! that the infrastructure layer implements.

pub mod codec_equals;
pub mod error;
pub mod expectations;
pub mod ports;

pub use codec_equals::CodecChecker;
pub use error::{CheckError, HarnessError, HarnessResult, TransportError, UsageError};
pub use expectations::{BodyAsserter, BodyFormat, DEFAULT_STATUS, ErasedValue, ExpectedBody, Expectations};
pub use ports::{Codec, CodecError, HttpTransport, TransportFuture};
