//! File driver (C9): header-stream metadata extraction, acquisition-chunk
//! assignment, and task-parallel batch payload decoding.
//!
//! The core decoders (`bypass`, `fdbaq`, `reconstruct`, `complex_assembler`)
//! are pure functions over borrowed byte slices with no shared state; this
//! module is the only place packets are grouped and dispatched to a worker
//! pool.

use rayon::prelude::*;

use crate::enums::BaqMode;
use crate::headers::{self, HeaderTable};
use crate::{bypass, fdbaq, Complex, Error, Result};

/// Parse every packet header in `data` and assign acquisition chunks.
/// Equivalent to `headers::decode_packet_headers` plus the chunking pass.
pub fn decode_metadata(data: &[u8]) -> Result<(HeaderTable, Vec<(usize, usize)>)> {
    let (mut table, bounds) = headers::decode_packet_headers(data)?;
    assign_acquisition_chunks(&mut table);
    Ok((table, bounds))
}

/// Whether two packets (by row index) belong to the same acquisition chunk,
/// per the eight constant fields plus the PRI-count and azimuth-beam-address
/// monotonicity rules in §3/§4.8.
fn breaks_chunk(table: &HeaderTable, prev: usize, cur: usize) -> bool {
    let const_differs = table.sigtyp[prev] != table.sigtyp[cur]
        || table.swath[prev] != table.swath[cur]
        || table.nq[prev] != table.nq[cur]
        || table.baqmod[prev] != table.baqmod[cur]
        || table.swst[prev] != table.swst[cur]
        || table.swl[prev] != table.swl[cur]
        || table.pri[prev] != table.pri[cur]
        || table.ebadr[prev] != table.ebadr[cur];

    let pri_not_incrementing = match (table.prict[prev], table.prict[cur]) {
        (Some(p), Some(c)) => c != p.wrapping_add(1),
        _ => true,
    };

    let azimuth_decreased = match (table.abadr[prev], table.abadr[cur]) {
        (Some(p), Some(c)) => c < p,
        _ => false,
    };

    const_differs || pri_not_incrementing || azimuth_decreased
}

/// Populate `table.acquisition_chunk`, numbering maximal runs of packets
/// that satisfy the chunk invariant from 0.
pub fn assign_acquisition_chunks(table: &mut HeaderTable) {
    let n = table.len();
    table.acquisition_chunk.clear();
    table.acquisition_chunk.reserve(n);
    let mut chunk_id = 0u32;
    for i in 0..n {
        if i > 0 && breaks_chunk(table, i - 1, i) {
            chunk_id += 1;
        }
        table.acquisition_chunk.push(chunk_id);
    }
}

fn validate_batch(table: &HeaderTable, filter: &[usize]) -> Result<(BaqMode, u16)> {
    if filter.is_empty() {
        return Err(Error::InvalidConfig("batch filter is empty".into()));
    }

    let mut num_quads = None;
    let mut baq_mode_code = None;
    let mut swath = None;
    for &i in filter {
        let nq = table.nq[i].ok_or_else(|| Error::InvalidConfig(format!("packet {i} has no secondary header")))?;
        match num_quads {
            None => num_quads = Some(nq),
            Some(seen) if seen != nq => {
                return Err(Error::InvalidConfig(format!(
                    "num_quads not single-valued across filter: {seen} vs {nq}"
                )))
            }
            _ => {}
        }

        let bm = table.baqmod[i].ok_or_else(|| Error::InvalidConfig(format!("packet {i} has no secondary header")))?;
        match baq_mode_code {
            None => baq_mode_code = Some(bm),
            Some(seen) if seen != bm => {
                return Err(Error::InvalidConfig(format!(
                    "baq_mode not single-valued across filter: {seen} vs {bm}"
                )))
            }
            _ => {}
        }

        match (swath, table.swath[i]) {
            (None, sw) => swath = Some(sw),
            (Some(seen), sw) if seen != sw => {
                log::warn!("swath number not single-valued across filter: {seen:?} vs {sw:?}");
            }
            _ => {}
        }
    }

    let baq_mode = BaqMode::from_code(baq_mode_code.unwrap())?;
    Ok((baq_mode, num_quads.unwrap()))
}

/// Decode every packet named by `filter` (a set of row indices into `table`
/// sharing `(baq_mode, num_quads)`) into one row per packet of a complex
/// I/Q matrix, dispatched across a `rayon` worker pool.
///
/// `data` is the full file buffer `bounds` (from `decode_metadata`) indexes
/// into. Validation failures (`InvalidConfig`/`UnsupportedMode`) abort
/// before any bytes are read. Once decoding starts, a single packet's
/// failure does not abort the batch: its row is zero-filled and its packet
/// index is recorded in the returned diagnostics list.
pub fn decode_batch(
    data: &[u8],
    table: &HeaderTable,
    bounds: &[(usize, usize)],
    filter: &[usize],
) -> Result<(Vec<Vec<Complex>>, Vec<usize>)> {
    let (baq_mode, num_quads) = validate_batch(table, filter)?;

    if !baq_mode.is_implemented() {
        return Err(Error::UnsupportedMode(format!("{:?}", baq_mode)));
    }

    let row_len = 2 * num_quads as usize;
    let mut flat = vec![Complex::default(); filter.len() * row_len];

    let decode_row = |(row_slice, &packet_idx): (&mut [Complex], &usize)| -> Option<usize> {
        let (start, len) = bounds[packet_idx];
        let payload = &data[start..start + len];
        let decoded = match baq_mode {
            BaqMode::Bypass => bypass::decode_single_bypass(payload, num_quads as usize),
            BaqMode::Fdbaq0 | BaqMode::Fdbaq1 | BaqMode::Fdbaq2 => {
                fdbaq::decode_single_fdbaq(payload, num_quads as usize)
            }
            _ => unreachable!("checked by is_implemented above"),
        };
        match decoded {
            Ok(row) => {
                row_slice.copy_from_slice(&row);
                None
            }
            Err(e) => {
                log::warn!("packet {packet_idx}: decode failed, zero-filling row: {e}");
                row_slice.fill(Complex::default());
                Some(packet_idx)
            }
        }
    };

    let failed: Vec<usize> = flat
        .par_chunks_mut(row_len)
        .zip(filter.par_iter())
        .filter_map(decode_row)
        .collect();

    Ok((flat.chunks(row_len).map(<[Complex]>::to_vec).collect(), failed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth_table(rows: &[(u8, u8, u16, u8, u32, u32, u32, u8, u32, u16)]) -> HeaderTable {
        // (sigtyp, swath, nq, baqmod, swst, swl, pri, ebadr, prict, abadr)
        let mut t = HeaderTable::default();
        for &(sigtyp, swath, nq, baqmod, swst, swl, pri, ebadr, prict, abadr) in rows {
            t.packet_ver_num.push(0);
            t.packet_type.push(0);
            t.secondary_header_flag.push(true);
            t.pid.push(0);
            t.pcat.push(0);
            t.sequence_flags.push(0);
            t.packet_sequence_count.push(0);
            t.packet_data_length.push(0);
            t.tcoar.push(Some(0));
            t.tfine.push(Some(0));
            t.sync.push(Some(0));
            t.dtid.push(Some(0));
            t.ecc.push(Some(0));
            t.tstmod.push(Some(0));
            t.rxchid.push(Some(0));
            t.icid.push(Some(0));
            t.adwidx.push(Some(0));
            t.adw.push(Some(0));
            t.spct.push(Some(0));
            t.prict.push(Some(prict));
            t.errflg.push(Some(false));
            t.baqmod.push(Some(baqmod));
            t.baqbl.push(Some(0));
            t.rgdec.push(Some(0));
            t.rxg.push(Some(0));
            t.txprr.push(Some(0));
            t.txpsf.push(Some(0));
            t.txpl.push(Some(0));
            t.rank.push(Some(0));
            t.pri.push(Some(pri));
            t.swst.push(Some(swst));
            t.swl.push(Some(swl));
            t.ssbflag.push(Some(0));
            t.pol.push(Some(0));
            t.tcmp.push(Some(0));
            t.ebadr.push(Some(ebadr));
            t.abadr.push(Some(abadr));
            t.sastm.push(Some(0));
            t.caltyp.push(None);
            t.cbadr.push(None);
            t.calmod.push(Some(0));
            t.txpno.push(Some(0));
            t.sigtyp.push(Some(sigtyp));
            t.swap.push(Some(false));
            t.swath.push(Some(swath));
            t.nq.push(Some(nq));
        }
        t
    }

    #[test]
    fn contiguous_matching_packets_form_one_chunk() {
        let mut t = synth_table(&[
            (0, 1, 10, 0, 0, 0, 0, 0, 0, 0),
            (0, 1, 10, 0, 0, 0, 0, 0, 1, 1),
            (0, 1, 10, 0, 0, 0, 0, 0, 2, 2),
        ]);
        assign_acquisition_chunks(&mut t);
        assert_eq!(t.acquisition_chunk, vec![0, 0, 0]);
    }

    #[test]
    fn pri_count_gap_starts_a_new_chunk() {
        let mut t = synth_table(&[
            (0, 1, 10, 0, 0, 0, 0, 0, 0, 0),
            (0, 1, 10, 0, 0, 0, 0, 0, 5, 1), // PRI count jumped, not +1
        ]);
        assign_acquisition_chunks(&mut t);
        assert_eq!(t.acquisition_chunk, vec![0, 1]);
    }

    #[test]
    fn azimuth_beam_decrease_starts_a_new_chunk() {
        let mut t = synth_table(&[
            (0, 1, 10, 0, 0, 0, 0, 0, 0, 5),
            (0, 1, 10, 0, 0, 0, 0, 0, 1, 2), // azimuth beam went down
        ]);
        assign_acquisition_chunks(&mut t);
        assert_eq!(t.acquisition_chunk, vec![0, 1]);
    }

    #[test]
    fn differing_swath_number_starts_a_new_chunk() {
        let mut t = synth_table(&[
            (0, 1, 10, 0, 0, 0, 0, 0, 0, 0),
            (0, 2, 10, 0, 0, 0, 0, 0, 1, 1),
        ]);
        assign_acquisition_chunks(&mut t);
        assert_eq!(t.acquisition_chunk, vec![0, 1]);
    }

    #[test]
    fn validate_batch_rejects_empty_filter() {
        let t = synth_table(&[]);
        assert!(matches!(
            validate_batch(&t, &[]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_batch_rejects_mixed_num_quads() {
        let t = synth_table(&[(0, 1, 10, 0, 0, 0, 0, 0, 0, 0), (0, 1, 11, 0, 0, 0, 0, 0, 1, 1)]);
        assert!(matches!(
            validate_batch(&t, &[0, 1]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn decode_batch_rejects_type_c_baq_modes() {
        let t = synth_table(&[(0, 1, 10, 3, 0, 0, 0, 0, 0, 0)]);
        let bounds = vec![(0usize, 20usize)];
        let data = vec![0u8; 20];
        assert!(matches!(
            decode_batch(&data, &t, &bounds, &[0]),
            Err(Error::UnsupportedMode(_))
        ));
    }

    #[test]
    fn decode_batch_decodes_bypass_packets() {
        let t = synth_table(&[(0, 1, 1, 0, 0, 0, 0, 0, 0, 0)]);
        let data = vec![0u8; 8]; // 2 bytes/channel * 4 channels, 1 quad
        let bounds = vec![(0usize, 8usize)];
        let (matrix, failed) = decode_batch(&data, &t, &bounds, &[0]).unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].len(), 2);
        assert!(failed.is_empty());
    }

    #[test]
    fn decode_batch_zero_fills_and_records_a_failed_row_without_aborting() {
        // Two packets sharing (baq_mode, num_quads): the first is truncated
        // (decode fails), the second is valid all-zero data.
        let t = synth_table(&[
            (0, 1, 1, 0, 0, 0, 0, 0, 0, 0),
            (0, 1, 1, 0, 0, 0, 0, 0, 1, 1),
        ]);
        let bounds = vec![(0usize, 1usize), (1usize, 8usize)];
        let mut data = vec![0u8; 1];
        data.extend(vec![0u8; 8]);
        let (matrix, failed) = decode_batch(&data, &t, &bounds, &[0, 1]).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(failed, vec![0]);
        assert_eq!(matrix[0], vec![Complex::default(); 2]);
        assert_eq!(matrix[1], vec![Complex::default(); 2]);
    }
}
