//! Sub-commutated ephemeris/attitude data (C12).
//!
//! Each secondary header carries one 16-bit "ancillary data word" along with
//! an index `1..=64` into a slowly-rotating telemetry frame. A satellite
//! position/attitude record is spread across 64 consecutive packets; this
//! module finds runs where the index counts `1..=64` without a gap and
//! reassembles them into `EphemerisRecord`s.

use crate::headers::HeaderTable;

const WORDS_PER_RECORD: usize = 64;

/// One reassembled ephemeris/attitude record, decoded from 64 consecutive
/// ancillary data words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisRecord {
    /// ECEF X position, metres.
    pub x_pos: f64,
    /// ECEF Y position, metres.
    pub y_pos: f64,
    /// ECEF Z position, metres.
    pub z_pos: f64,
    /// ECEF X velocity, m/s.
    pub x_vel: f32,
    /// ECEF Y velocity, m/s.
    pub y_vel: f32,
    /// ECEF Z velocity, m/s.
    pub z_vel: f32,
    /// POD solution data timestamp: `w0*2^24 + w1*2^8 + w2*2^-8 + w3*2^-24`.
    pub pod_solution_timestamp: f64,
    /// Attitude quaternion component 0.
    pub q0: f32,
    /// Attitude quaternion component 1.
    pub q1: f32,
    /// Attitude quaternion component 2.
    pub q2: f32,
    /// Attitude quaternion component 3.
    pub q3: f32,
    /// X angular rate, rad/s.
    pub x_ang_rate: f32,
    /// Y angular rate, rad/s.
    pub y_ang_rate: f32,
    /// Z angular rate, rad/s.
    pub z_ang_rate: f32,
    /// Attitude data timestamp, same fixed-point encoding as
    /// `pod_solution_timestamp`.
    pub attitude_data_timestamp: f64,
}

fn fixed_point_timestamp(w: &[u16]) -> f64 {
    w[0] as f64 * 2f64.powi(24)
        + w[1] as f64 * 2f64.powi(8)
        + w[2] as f64 * 2f64.powi(-8)
        + w[3] as f64 * 2f64.powi(-24)
}

fn be_f64(words: &[u16]) -> f64 {
    let mut bytes = [0u8; 8];
    for (i, w) in words.iter().enumerate() {
        bytes[2 * i..2 * i + 2].copy_from_slice(&w.to_be_bytes());
    }
    f64::from_be_bytes(bytes)
}

fn be_f32(words: &[u16]) -> f32 {
    let mut bytes = [0u8; 4];
    bytes[0..2].copy_from_slice(&words[0].to_be_bytes());
    bytes[2..4].copy_from_slice(&words[1].to_be_bytes());
    f32::from_be_bytes(bytes)
}

fn decode_record(w: &[u16; WORDS_PER_RECORD]) -> EphemerisRecord {
    EphemerisRecord {
        x_pos: be_f64(&w[0..4]),
        y_pos: be_f64(&w[4..8]),
        z_pos: be_f64(&w[8..12]),
        x_vel: be_f32(&w[12..14]),
        y_vel: be_f32(&w[14..16]),
        z_vel: be_f32(&w[16..18]),
        pod_solution_timestamp: fixed_point_timestamp(&w[18..22]),
        q0: be_f32(&w[22..24]),
        q1: be_f32(&w[24..26]),
        q2: be_f32(&w[26..28]),
        q3: be_f32(&w[28..30]),
        x_ang_rate: be_f32(&w[30..32]),
        y_ang_rate: be_f32(&w[32..34]),
        z_ang_rate: be_f32(&w[34..36]),
        attitude_data_timestamp: fixed_point_timestamp(&w[36..40]),
    }
}

/// Scan `table`'s sub-commutated ancillary data word columns for runs of 64
/// consecutive packets whose word index counts `1..=64`, and decode each run
/// into an `EphemerisRecord`. Runs that start but don't complete (fewer than
/// 64 packets remain, or the index sequence breaks) are skipped.
pub fn read_subcommed_data(table: &HeaderTable) -> Vec<EphemerisRecord> {
    let n = table.adwidx.len();
    let mut out = Vec::new();
    let mut i = 0;
    while i < n {
        if table.adwidx[i] == Some(1) && i + WORDS_PER_RECORD <= n {
            let mut words = [0u16; WORDS_PER_RECORD];
            let mut complete = true;
            for (k, word_slot) in words.iter_mut().enumerate() {
                match (table.adwidx[i + k], table.adw[i + k]) {
                    (Some(idx), Some(word)) if idx as usize == k + 1 => *word_slot = word,
                    _ => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                out.push(decode_record(&words));
                i += WORDS_PER_RECORD;
                continue;
            }
        }
        i += 1;
    }
    out
}
