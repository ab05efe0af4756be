//! The sign/mantissa pair that both Bypass and FDBAQ decode down to before
//! reconstruction.

/// A decoded sign-magnitude sample code: a sign bit plus a mantissa code
/// (either a raw 10-bit Bypass magnitude or an FDBAQ Huffman mcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleCode {
    /// `true` means negative.
    pub sign: bool,
    /// Magnitude code. For Bypass this is a 10-bit unsigned magnitude; for
    /// FDBAQ this is the mcode produced by the Huffman walk.
    pub mcode: u16,
}

impl SampleCode {
    /// Construct a sample code.
    pub fn new(sign: bool, mcode: u16) -> Self {
        Self { sign, mcode }
    }

    /// Interpret as a signed integer: `-mcode` when negative, `mcode`
    /// otherwise. This is the Bypass decode path's direct output; FDBAQ goes
    /// through `crate::reconstruct` instead.
    pub fn to_signed(self) -> i32 {
        let m = self.mcode as i32;
        if self.sign {
            -m
        } else {
            m
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_signed_applies_sign() {
        assert_eq!(SampleCode::new(false, 188).to_signed(), 188);
        assert_eq!(SampleCode::new(true, 188).to_signed(), -188);
        assert_eq!(SampleCode::new(true, 0).to_signed(), 0);
    }
}
