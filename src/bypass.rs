//! Bypass (Type A/B) payload decoder.
//!
//! Bypass mode carries four channels (IE, IO, QE, QO) back to back, each
//! channel a run of `num_quads` ten-bit sign-magnitude words, each channel
//! region padded out to a whole number of 16-bit words.

use crate::complex_assembler::assemble;
use crate::sample_code::SampleCode;
use crate::{bitreader::BitReader, Complex, Error, Float, Result};

/// Number of bytes one Bypass channel occupies for `num_quads` samples:
/// `ceil(10 * num_quads / 16)` sixteen-bit words.
pub fn channel_byte_len(num_quads: usize) -> usize {
    2 * (10 * num_quads).div_ceil(16)
}

fn ten_bit_to_sample_code(word: u32) -> SampleCode {
    let sign = (word & 0x200) != 0;
    let mcode = (word & 0x1ff) as u16;
    SampleCode::new(sign, mcode)
}

/// Decode one Bypass channel's region into `num_quads` real-valued samples.
fn decode_channel(data: &[u8], num_quads: usize) -> Result<Vec<Float>> {
    let mut r = BitReader::new(data);
    let mut out = Vec::with_capacity(num_quads);
    for _ in 0..num_quads {
        let word = r.read_bits(10)?;
        out.push(ten_bit_to_sample_code(word).to_signed() as Float);
    }
    Ok(out)
}

/// Decode one Bypass-mode packet's user-data field into interleaved complex
/// I/Q samples.
///
/// `data` must contain at least `4 * channel_byte_len(num_quads)` bytes; any
/// trailing bytes (padding to the packet's declared length) are ignored.
pub fn decode_single_bypass(data: &[u8], num_quads: usize) -> Result<Vec<Complex>> {
    let chan_len = channel_byte_len(num_quads);
    let needed = 4 * chan_len;
    if data.len() < needed {
        return Err(Error::Truncation {
            offset: data.len(),
            detail: format!("bypass payload needs {needed} bytes, got {}", data.len()),
        });
    }

    let ie = decode_channel(&data[0..chan_len], num_quads)?;
    let io = decode_channel(&data[chan_len..2 * chan_len], num_quads)?;
    let qe = decode_channel(&data[2 * chan_len..3 * chan_len], num_quads)?;
    let qo = decode_channel(&data[3 * chan_len..4 * chan_len], num_quads)?;

    Ok(assemble(&ie, &io, &qe, &qo))
}
