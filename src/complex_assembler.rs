//! Interleaves the four decoded real-valued channels (IE, IO, QE, QO) into a
//! single complex I/Q sequence.
//!
//! Each quad `n` contributes two complex samples: the "even" sample
//! `IE[n] + j*QE[n]` followed by the "odd" sample `IO[n] + j*QO[n]`.

use crate::{Complex, Float};

/// Interleave four equal-length real channels into `2 * ie.len()` complex
/// samples. Panics if the four channels differ in length; callers (`bypass`,
/// `fdbaq`) always decode all four channels to the same `num_quads`.
pub fn assemble(ie: &[Float], io: &[Float], qe: &[Float], qo: &[Float]) -> Vec<Complex> {
    assert_eq!(ie.len(), io.len());
    assert_eq!(ie.len(), qe.len());
    assert_eq!(ie.len(), qo.len());

    let mut out = Vec::with_capacity(ie.len() * 2);
    for n in 0..ie.len() {
        out.push(Complex::new(ie[n], qe[n]));
        out.push(Complex::new(io[n], qo[n]));
    }
    out
}
