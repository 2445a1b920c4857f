//! Size Estimation Module
//!
//! Approximates the byte footprint of cached values. Capacity is accounted in
//! these estimates, not in real process memory.

use std::borrow::Cow;
use std::io;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

/// Estimate used for values that cannot be sized
pub const COMPLEX_ESTIMATE_BYTES: u64 = 1024;

/// Estimate used for scalar values
pub const SCALAR_ESTIMATE_BYTES: u64 = 64;

/// Structural encodings larger than this are abandoned as too expensive
pub const MAX_ENCODED_ESTIMATE_BYTES: u64 = 4 * 1024 * 1024;

// == Footprint ==
/// What a value reports about its own size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Footprint {
    /// Measured length in bytes
    Bytes(u64),
    /// Fixed-width scalar
    Scalar,
    /// Could not be measured; the reason is logged
    Unsizable(Cow<'static, str>),
}

/// Values that can be stored in the cache report their footprint through this.
pub trait EstimateSize {
    fn footprint(&self) -> Footprint;
}

// == Estimate ==
/// Result of sizing a value. Always usable, even on the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub bytes: u64,
    /// True when the value could not be measured and a constant was used
    pub fallback: bool,
}

// == Size Estimator ==
/// Turns a [`Footprint`] into a byte count that never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeEstimator;

impl SizeEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate<V: EstimateSize + ?Sized>(&self, value: &V) -> Estimate {
        match value.footprint() {
            Footprint::Bytes(bytes) => Estimate {
                bytes,
                fallback: false,
            },
            Footprint::Scalar => Estimate {
                bytes: SCALAR_ESTIMATE_BYTES,
                fallback: false,
            },
            Footprint::Unsizable(reason) => {
                debug!(
                    %reason,
                    fallback_bytes = COMPLEX_ESTIMATE_BYTES,
                    "size estimation fell back to fixed estimate"
                );
                Estimate {
                    bytes: COMPLEX_ESTIMATE_BYTES,
                    fallback: true,
                }
            }
        }
    }
}

// == Structural Encoding ==
/// Measures the JSON encoding of `value` without keeping the encoded bytes.
pub fn encoded_len<T: Serialize + ?Sized>(value: &T) -> Footprint {
    let mut counter = CountingWriter::new(MAX_ENCODED_ESTIMATE_BYTES);
    match serde_json::to_writer(&mut counter, value) {
        Ok(()) => Footprint::Bytes(counter.written),
        Err(_) if counter.exceeded => {
            Footprint::Unsizable(Cow::Borrowed("structural encoding exceeds estimate budget"))
        }
        Err(err) => Footprint::Unsizable(Cow::Owned(format!("structural encoding failed: {err}"))),
    }
}

/// Counts bytes and refuses writes past a limit.
struct CountingWriter {
    written: u64,
    limit: u64,
    exceeded: bool,
}

impl CountingWriter {
    fn new(limit: u64) -> Self {
        Self {
            written: 0,
            limit,
            exceeded: false,
        }
    }
}

impl io::Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let next = self.written + buf.len() as u64;
        if next > self.limit {
            self.exceeded = true;
            return Err(io::Error::new(io::ErrorKind::Other, "estimate budget exceeded"));
        }
        self.written = next;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// == Wrappers ==
/// Sized by its JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Structured<T>(pub T);

impl<T: Serialize> EstimateSize for Structured<T> {
    fn footprint(&self) -> Footprint {
        encoded_len(&self.0)
    }
}

impl<T> Deref for Structured<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// A value with no meaningful size; always takes the fallback estimate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Opaque<T>(pub T);

impl<T> EstimateSize for Opaque<T> {
    fn footprint(&self) -> Footprint {
        Footprint::Unsizable(Cow::Borrowed("opaque value"))
    }
}

impl<T> Deref for Opaque<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

// == Implementations ==
impl EstimateSize for str {
    fn footprint(&self) -> Footprint {
        Footprint::Bytes(self.len() as u64)
    }
}

impl EstimateSize for String {
    fn footprint(&self) -> Footprint {
        self.as_str().footprint()
    }
}

impl EstimateSize for [u8] {
    fn footprint(&self) -> Footprint {
        Footprint::Bytes(self.len() as u64)
    }
}

impl EstimateSize for Vec<u8> {
    fn footprint(&self) -> Footprint {
        self.as_slice().footprint()
    }
}

impl EstimateSize for serde_json::Value {
    fn footprint(&self) -> Footprint {
        match self {
            serde_json::Value::String(s) => s.footprint(),
            serde_json::Value::Null
            | serde_json::Value::Bool(_)
            | serde_json::Value::Number(_) => Footprint::Scalar,
            structured => encoded_len(structured),
        }
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn footprint(&self) -> Footprint {
        (**self).footprint()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn footprint(&self) -> Footprint {
        (**self).footprint()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Rc<T> {
    fn footprint(&self) -> Footprint {
        (**self).footprint()
    }
}

macro_rules! scalar_footprint {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EstimateSize for $ty {
                fn footprint(&self) -> Footprint {
                    Footprint::Scalar
                }
            }
        )*
    };
}

scalar_footprint!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
