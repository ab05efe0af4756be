#![warn(missing_docs)]
/*! Decoder for ESA Sentinel-1 Level-0 raw telemetry files.

Sentinel-1's SAR instrument downlinks raw radar echoes as a stream of CCSDS
space packets. Each packet carries a 6-byte primary header, a 62-byte
secondary header, and a user-data field that holds either ten-bit
sign-magnitude samples ("Bypass" mode) or Huffman-coded, block-adaptively
quantized samples ("FDBAQ" mode). This crate parses the headers, exposes the
user-data byte ranges they imply, and decodes the two payload formats into
complex baseband I/Q samples.

# Architecture overview

The crate is a small pipeline of pure, stateless stages:

```text
   raw bytes
      |
      v
[ header parser ]  -> header columns + user-data byte ranges
      |
      v
[ file driver ]    -> groups/batches packets sharing (baq_mode, num_quads, swath)
      |
      v
[ bypass | fdbaq ] -> four real-valued sample channels (IE, IO, QE, QO)
      |
      v
[ complex assembler ] -> interleaved complex<f32> row
```

Headers, payload decoding and reconstruction are all free functions over
borrowed byte slices: nothing in this crate owns a file handle until the
driver layer (`driver`) is reached.

# Example

```
use sentinel1_l0::bypass::decode_single_bypass;

// One quad (4 channels) of all-zero samples, bypass-coded.
let data = vec![0u8; 2 * 4]; // 2 bytes/channel * 4 channels
let samples = decode_single_bypass(&data, 1).unwrap();
assert_eq!(samples.len(), 2);
```
*/
use thiserror::Error;

pub mod bitreader;
pub mod bypass;
pub mod cache;
pub mod complex_assembler;
pub mod driver;
pub mod enums;
pub mod fdbaq;
pub mod field_names;
pub mod headers;
pub mod huffman;
pub mod metadata;
pub mod reconstruct;
pub mod sample_code;
pub mod subcom;
pub mod tables;

/// Sample value type used for reconstructed real-valued channels and the
/// assembled complex I/Q stream.
pub type Float = f32;

/// Complex (I/Q) sample.
pub type Complex = num_complex::Complex<Float>;

/// The instrument reference frequency, in Hz. Used to scale several secondary
/// header fields (PRI, SWST, SWL, pulse length, TXPRR, TXPSF).
pub const F_REF: f64 = 37.534_722_24e6;

/// Errors produced while parsing headers or decoding payloads.
///
/// Matches the error model in SPEC_FULL.md §7: every fatal condition
/// identifies a byte offset where practical; `SyncMismatch` is the one
/// variant callers are expected to log and continue past rather than abort
/// on (see `headers::decode_secondary_header`).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Input exhausted before a field or the expected number of samples
    /// could be read.
    #[error("truncated input at byte offset {offset}: {detail}")]
    Truncation {
        /// Byte offset into the buffer being read at the point of failure.
        offset: usize,
        /// Human-readable description of what was being read.
        detail: String,
    },

    /// A decoded value violates a structural invariant of the wire format
    /// (out-of-range BRC, a Huffman walk into a null child, an mcode outside
    /// its BRC's legal alphabet, a packet length that isn't a multiple of 4).
    #[error("corrupt value at byte offset {offset}: {detail}")]
    CorruptValue {
        /// Byte offset into the buffer being read at the point of failure.
        offset: usize,
        /// Human-readable description of the violated invariant.
        detail: String,
    },

    /// Secondary-header sync marker didn't match `0x352EF853`. Never
    /// returned as a hard error: callers log it via `log::warn!` and keep
    /// decoding, since a corrupt sync word doesn't by itself invalidate the
    /// rest of the header.
    #[error("sync marker mismatch at byte offset {offset}: got {got:#010x}")]
    SyncMismatch {
        /// Byte offset into the buffer being read at the point of failure.
        offset: usize,
        /// The sync word actually read.
        got: u32,
    },

    /// `baq_mode` names one of the Type-C BAQ modes (3/4/5), which this
    /// crate does not implement.
    #[error("unsupported BAQ mode: {0}")]
    UnsupportedMode(String),

    /// A batch decode request is invalid before any bytes are read: empty
    /// filter, or `num_quads`/`baq_mode` not single-valued across it.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
pub mod tests {
    //! Test helper functions.
    use super::*;

    /// For testing, assert that two slices of complex samples are almost
    /// equal. Floating point numbers are almost never exactly equal.
    pub fn assert_almost_equal_complex(left: &[Complex], right: &[Complex]) {
        assert_eq!(
            left.len(),
            right.len(),
            "\nleft: {:?}\nright: {:?}",
            left,
            right
        );
        for i in 0..left.len() {
            let dist = (left[i] - right[i]).norm_sqr().sqrt();
            if dist > 0.001 {
                assert_eq!(
                    left[i], right[i],
                    "\nElement {i}:\nleft: {:?}\nright: {:?}",
                    left, right
                );
            }
        }
    }

    /// For testing, assert that two slices of floats are almost equal within
    /// a relative tolerance.
    pub fn assert_almost_equal_rel(left: &[f64], right: &[f64], rel_tol: f64) {
        assert_eq!(
            left.len(),
            right.len(),
            "\nleft: {:?}\nright: {:?}",
            left,
            right
        );
        for i in 0..left.len() {
            let scale = right[i].abs().max(1.0);
            let dist = (left[i] - right[i]).abs() / scale;
            assert!(
                dist <= rel_tol,
                "element {i}: left={} right={} rel_dist={}",
                left[i],
                right[i],
                dist
            );
        }
    }
}
