//! HTTP Request body types

use std::fmt;
use std::io::{self, Cursor};
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync + 'static>>;

/// The body source of a request under test.
///
/// In-memory sources (`&str`, `String`, `Vec<u8>`, `Bytes`, cursors) become
/// [`RequestBody::Fixed`]: their length is known and they can be re-sent any
/// number of times. Streams are sent once; a declared length is forwarded as
/// `Content-Length`, otherwise the body goes out chunked.
#[derive(Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// Fully materialized body with a known length
    Fixed(Bytes),
    /// Streamed body, optionally with a declared length
    Streamed {
        /// The body chunks
        stream: BodyStream,
        /// Declared length in bytes, if known
        len: Option<u64>,
    },
}

impl RequestBody {
    /// Creates a streamed body.
    pub fn stream<S>(stream: S, len: Option<u64>) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self::Streamed {
            stream: Box::pin(stream),
            len,
        }
    }

    /// Returns the number of bytes receivers will observe, if knowable.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::Fixed(bytes) => Some(bytes.len() as u64),
            Self::Streamed { len, .. } => *len,
        }
    }

    /// Returns true if the body can be sent again after a first attempt.
    #[must_use]
    pub const fn is_rewindable(&self) -> bool {
        !matches!(self, Self::Streamed { .. })
    }

    /// Returns a copy of the body positioned at its start, or `None` for
    /// streams that have no way back.
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        match self {
            Self::Empty => Some(Self::Empty),
            Self::Fixed(bytes) => Some(Self::Fixed(bytes.clone())),
            Self::Streamed { .. } => None,
        }
    }

    /// Returns the body bytes when they are held in memory.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Empty => Some(&[]),
            Self::Fixed(bytes) => Some(bytes.as_ref()),
            Self::Streamed { .. } => None,
        }
    }

    /// Returns whether the body is known to be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_length() == Some(0) || matches!(self, Self::Empty)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Fixed(bytes) => f.debug_tuple("Fixed").field(bytes).finish(),
            Self::Streamed { len, .. } => f
                .debug_struct("Streamed")
                .field("len", len)
                .finish_non_exhaustive(),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Fixed(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Fixed(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Fixed(Bytes::from(text))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        Self::Fixed(Bytes::from_static(text.as_bytes()))
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Fixed(Bytes::from_static(bytes))
    }
}

/// A cursor contributes the bytes from its current position to the end.
impl<T: AsRef<[u8]>> From<Cursor<T>> for RequestBody {
    fn from(cursor: Cursor<T>) -> Self {
        let data = cursor.get_ref().as_ref();
        let start = usize::try_from(cursor.position())
            .unwrap_or(usize::MAX)
            .min(data.len());
        Self::Fixed(Bytes::copy_from_slice(&data[start..]))
    }
}
