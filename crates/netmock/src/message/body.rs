//! Request bodies and text encodings.

use crate::error::MockError;
use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use tracing::warn;

type BodyStream = Box<dyn Read + Send>;

/// Body of an incoming request.
///
/// A `Stream` body is drained by the first call to [`RequestBody::read`];
/// every later read, including reads through clones of the same request,
/// returns empty bytes. Matchers that inspect the body consume it, so a
/// stream-backed request should only be matched once.
#[derive(Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    Stream(Arc<Mutex<Option<BodyStream>>>),
}

impl RequestBody {
    pub fn from_stream(reader: impl Read + Send + 'static) -> Self {
        RequestBody::Stream(Arc::new(Mutex::new(Some(Box::new(reader)))))
    }

    /// Read the body. Drains stream-backed bodies.
    pub fn read(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(bytes) => bytes.clone(),
            RequestBody::Stream(slot) => {
                let Some(mut reader) = slot.lock().take() else {
                    return Bytes::new();
                };
                let mut buf = Vec::new();
                if let Err(e) = reader.read_to_end(&mut buf) {
                    warn!("Failed to read request body stream: {}", e);
                    return Bytes::new();
                }
                Bytes::from(buf)
            }
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, RequestBody::Stream(_))
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Stream(slot) => {
                let state = if slot.lock().is_some() {
                    "unread"
                } else {
                    "drained"
                };
                write!(f, "Stream({state})")
            }
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        RequestBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

/// Text encodings supported by the string body accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    /// ISO-8859-1.
    Latin1,
    Utf16Le,
}

impl TextEncoding {
    pub fn encode(self, text: &str) -> Result<Vec<u8>, MockError> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(MockError::invalid_argument(
                        "text is not representable as ASCII",
                    ))
                }
            }
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        MockError::invalid_argument(format!(
                            "character '{c}' is not representable in ISO-8859-1"
                        ))
                    })
                })
                .collect(),
            TextEncoding::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    std::str::from_utf8(bytes).ok().map(str::to_owned)
                } else {
                    None
                }
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return None;
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            }
        }
    }
}
