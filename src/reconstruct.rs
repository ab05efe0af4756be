//! Sample value reconstruction: turns an FDBAQ `(brc, thidx, SampleCode)`
//! triple into a real-valued sample.
//!
//! Below a per-BRC threshold THIDX, small mantissa codes are reconstructed
//! directly (the "simple" branch); the top code in that range saturates to a
//! per-BRC, per-THIDX constant. Above the threshold, the mantissa code
//! indexes a normalized reconstruction level that is then scaled by the
//! THIDX-indexed scale factor (the "normal" branch).

use crate::sample_code::SampleCode;
use crate::tables::{B0, B1, B2, B3, B4, NRL_B0, NRL_B1, NRL_B2, NRL_B3, NRL_B4, SF};
use crate::{Error, Result};

struct BrcTables {
    simple: &'static [f64],
    nrl: &'static [f64],
}

fn tables_for_brc(brc: u8) -> Result<BrcTables> {
    Ok(match brc {
        0 => BrcTables { simple: &B0, nrl: &NRL_B0 },
        1 => BrcTables { simple: &B1, nrl: &NRL_B1 },
        2 => BrcTables { simple: &B2, nrl: &NRL_B2 },
        3 => BrcTables { simple: &B3, nrl: &NRL_B3 },
        4 => BrcTables { simple: &B4, nrl: &NRL_B4 },
        other => {
            return Err(Error::CorruptValue {
                offset: 0,
                detail: format!("BRC {other} out of range 0..=4"),
            })
        }
    })
}

/// Reconstruct one real-valued sample from its BRC, THIDX and sign/mantissa
/// code. `offset` is used only to annotate errors with a byte position.
pub fn reconstruct(brc: u8, thidx: u8, code: SampleCode, offset: usize) -> Result<f64> {
    let t = tables_for_brc(brc)?;
    let limit = t.nrl.len() - 1;
    let mcode = code.mcode as usize;

    if mcode > limit {
        return Err(Error::CorruptValue {
            offset,
            detail: format!("mcode {mcode} out of range for BRC {brc} (alphabet size {})", t.nrl.len()),
        });
    }

    let magnitude = if (thidx as usize) < t.simple.len() {
        match mcode.cmp(&limit) {
            std::cmp::Ordering::Less => mcode as f64,
            std::cmp::Ordering::Equal => t.simple[thidx as usize],
            std::cmp::Ordering::Greater => unreachable!("mcode bounds-checked above"),
        }
    } else {
        t.nrl[mcode] * SF[thidx as usize]
    };

    Ok(if code.sign { -magnitude } else { magnitude })
}
