//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod codec;
mod transport;

pub use codec::{Codec, CodecError};
pub use transport::{HttpTransport, TransportFuture};
