//! Primary (6-byte) and secondary (62-byte) CCSDS header parser.
//!
//! Produces raw, un-scaled field values only — enum typing, physical-unit
//! scaling and column renaming are all deferred to `crate::metadata`. This
//! mirrors the reference implementation's split between header bit-decode
//! and the later dataframe transform.

use log::warn;

use crate::{Error, Result};

const PRIMARY_HEADER_LEN: usize = 6;
const SECONDARY_HEADER_LEN: usize = 62;
const SYNC_MARKER: u32 = 0x352E_F853;

fn bits(byte: u8, start: u8, end: u8) -> u8 {
    // start/end are bit indices within the byte, inclusive, MSB = 0, LSB = 7,
    // start <= end.
    let width = end - start + 1;
    let shift = 7 - end;
    (byte >> shift) & ((1u16 << width) - 1) as u8
}

fn be_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u24(b: &[u8]) -> u32 {
    u32::from_be_bytes([0, b[0], b[1], b[2]])
}

/// Raw primary header fields (always present).
#[derive(Debug, Clone, Copy)]
pub struct PrimaryHeader {
    /// CCSDS packet version number (3 bits).
    pub packet_ver_num: u8,
    /// CCSDS packet type (1 bit).
    pub packet_type: u8,
    /// Secondary header flag (1 bit). Governs whether this packet carries
    /// the 62-byte secondary header.
    pub secondary_header_flag: bool,
    /// Application process ID (7 bits).
    pub pid: u16,
    /// Packet category (4 bits).
    pub pcat: u8,
    /// Sequence flags (2 bits).
    pub sequence_flags: u8,
    /// Packet sequence count (14 bits).
    pub packet_sequence_count: u16,
    /// Packet data length in bytes, with the spec's "stored value + 1"
    /// already applied: the number of bytes following this 6-byte header.
    pub packet_data_length: u32,
}

/// Decode the 6-byte primary header.
pub fn decode_primary_header(data: &[u8]) -> Result<PrimaryHeader> {
    if data.len() < PRIMARY_HEADER_LEN {
        return Err(Error::Truncation {
            offset: 0,
            detail: format!("primary header needs {PRIMARY_HEADER_LEN} bytes, got {}", data.len()),
        });
    }
    let b0 = data[0];
    let packet_ver_num = bits(b0, 0, 2);
    let packet_type = bits(b0, 3, 3);
    let secondary_header_flag = bits(b0, 4, 4) != 0;
    let pid = ((bits(b0, 5, 7) as u16) << 4) | (bits(data[1], 0, 3) as u16);
    let pcat = bits(data[1], 4, 7);
    let sequence_flags = bits(data[2], 0, 1);
    let packet_sequence_count = ((bits(data[2], 2, 7) as u16) << 8) | data[3] as u16;
    let packet_data_length = be_u16(&data[4..6]) as u32 + 1;

    if (packet_data_length + 6) % 4 != 0 {
        return Err(Error::CorruptValue {
            offset: 4,
            detail: format!(
                "packet_data_length {packet_data_length} + 6 is not a multiple of 4"
            ),
        });
    }

    Ok(PrimaryHeader {
        packet_ver_num,
        packet_type,
        secondary_header_flag,
        pid,
        pcat,
        sequence_flags,
        packet_sequence_count,
        packet_data_length,
    })
}

/// The SAS/SSB message (bytes 54-55), split by `sas_ssbflag`. Only the
/// branch matching the active flag is populated; the other side of the
/// union is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SasSsbMessage {
    /// Elevation Beam Address (4-bit unsigned), present when `sas_ssbflag = 0`.
    pub ebadr: Option<u8>,
    /// Azimuth Beam Address (10-bit unsigned), present when `sas_ssbflag = 0`.
    pub abadr: Option<u16>,
    /// SAS Test Mode (1 bit), present when `sas_ssbflag = 0`.
    pub sastm: Option<u8>,
    /// Cal Type (3-bit code), present when `sas_ssbflag = 1`.
    pub caltyp: Option<u8>,
    /// Calibration Beam Address (10-bit unsigned), present when `sas_ssbflag = 1`.
    pub cbadr: Option<u16>,
}

/// Raw secondary header fields (present only when `secondary_header_flag`).
#[derive(Debug, Clone, Copy)]
pub struct SecondaryHeader {
    /// Coarse time, raw u32 seconds count.
    pub tcoar: u32,
    /// Fine time, raw u16 fractional-second counter (unscaled).
    pub tfine: u16,
    /// Raw sync marker as read off the wire.
    pub sync: u32,
    /// Data-take ID.
    pub dtid: u32,
    /// ECC number raw code.
    pub ecc: u8,
    /// Test mode raw code (3 bits).
    pub tstmod: u8,
    /// Rx channel ID raw code (1 bit).
    pub rxchid: u8,
    /// Instrument configuration ID.
    pub icid: u32,
    /// Sub-commutation ancillary data word index.
    pub adwidx: u8,
    /// Sub-commutation ancillary data word.
    pub adw: u16,
    /// Space packet count.
    pub spct: u32,
    /// PRI count.
    pub prict: u32,
    /// Error flag.
    pub errflg: bool,
    /// BAQ mode raw code (5 bits).
    pub baqmod: u8,
    /// BAQ block length raw byte.
    pub baqbl: u8,
    /// Range decimation raw code.
    pub rgdec: u8,
    /// Rx gain raw byte (unscaled; scaled value is `-0.5 * raw`).
    pub rxg: u8,
    /// Tx ramp rate, raw u16 (unscaled).
    pub txprr: u16,
    /// Tx pulse start frequency, raw u16 (unscaled).
    pub txpsf: u16,
    /// Tx pulse length, raw u24 (unscaled).
    pub txpl: u32,
    /// Rank (5 bits).
    pub rank: u8,
    /// PRI, raw u24 (unscaled).
    pub pri: u32,
    /// SWST, raw u24 (unscaled).
    pub swst: u32,
    /// SWL, raw u24 (unscaled).
    pub swl: u32,
    /// SAS/SSB flag raw bit.
    pub ssbflag: u8,
    /// Polarisation raw code (3 bits).
    pub pol: u8,
    /// Temperature compensation raw code (2 bits).
    pub tcmp: u8,
    /// SAS/SSB message, interpreted per `ssbflag`.
    pub sas_ssb: SasSsbMessage,
    /// Calibration mode raw code (2 bits).
    pub calmod: u8,
    /// Tx pulse number.
    pub txpno: u8,
    /// Signal type raw code (4 bits).
    pub sigtyp: u8,
    /// Swap flag.
    pub swap: bool,
    /// Swath number.
    pub swath: u8,
    /// Number of quads.
    pub nq: u16,
}

/// Decode the 62-byte secondary header. A sync-marker mismatch is logged via
/// `Error::SyncMismatch`'s `Display` impl and does not fail decoding — see
/// that variant's documented behavior in the crate's error model.
pub fn decode_secondary_header(data: &[u8]) -> Result<SecondaryHeader> {
    if data.len() < SECONDARY_HEADER_LEN {
        return Err(Error::Truncation {
            offset: 0,
            detail: format!(
                "secondary header needs {SECONDARY_HEADER_LEN} bytes, got {}",
                data.len()
            ),
        });
    }

    let tcoar = be_u32(&data[0..4]);
    let tfine = be_u16(&data[4..6]);
    let sync = be_u32(&data[6..10]);
    if sync != SYNC_MARKER {
        warn!("{}", Error::SyncMismatch { offset: 6, got: sync });
    }
    let dtid = be_u32(&data[10..14]);
    let ecc = data[14];
    let tstmod = bits(data[15], 1, 3);
    let rxchid = bits(data[15], 4, 7);
    let icid = be_u32(&data[16..20]);
    let adwidx = data[20];
    let adw = be_u16(&data[21..23]);
    let spct = be_u32(&data[23..27]);
    let prict = be_u32(&data[27..31]);
    let errflg = bits(data[31], 0, 0) != 0;
    let baqmod = bits(data[31], 3, 7);
    let baqbl = data[32];
    let rgdec = data[34];
    let rxg = data[35];
    let txprr = be_u16(&data[36..38]);
    let txpsf = be_u16(&data[38..40]);
    let txpl = be_u24(&data[40..43]);
    let rank = bits(data[43], 3, 7);
    let pri = be_u24(&data[44..47]);
    let swst = be_u24(&data[47..50]);
    let swl = be_u24(&data[50..53]);
    let ssbflag = bits(data[53], 0, 0);
    let pol = bits(data[53], 1, 3);
    let tcmp = bits(data[53], 4, 5);

    let ssb_word = be_u16(&data[54..56]);
    let sas_ssb = if ssbflag == 0 {
        SasSsbMessage {
            ebadr: Some(((ssb_word >> 12) & 0xF) as u8),
            abadr: Some((ssb_word >> 2) & 0x3FF),
            sastm: Some(((ssb_word >> 1) & 0x1) as u8),
            caltyp: None,
            cbadr: None,
        }
    } else {
        SasSsbMessage {
            ebadr: None,
            abadr: None,
            sastm: None,
            caltyp: Some(((ssb_word >> 13) & 0x7) as u8),
            cbadr: Some((ssb_word >> 3) & 0x3FF),
        }
    };

    let calmod = bits(data[56], 0, 1);
    let txpno = bits(data[56], 3, 7);
    let sigtyp = bits(data[57], 0, 3);
    let swap = bits(data[57], 7, 7) != 0;
    let swath = data[58];
    let nq = be_u16(&data[59..61]);

    Ok(SecondaryHeader {
        tcoar,
        tfine,
        sync,
        dtid,
        ecc,
        tstmod,
        rxchid,
        icid,
        adwidx,
        adw,
        spct,
        prict,
        errflg,
        baqmod,
        baqbl,
        rgdec,
        rxg,
        txprr,
        txpsf,
        txpl,
        rank,
        pri,
        swst,
        swl,
        ssbflag,
        pol,
        tcmp,
        sas_ssb,
        calmod,
        txpno,
        sigtyp,
        swap,
        swath,
        nq,
    })
}

/// Column-oriented table of raw header fields, one row per packet, plus
/// derived bookkeeping (user-data bounds live alongside it but are returned
/// separately by `decode_packet_headers`, per the external interface).
#[derive(Debug, Default)]
pub struct HeaderTable {
    /// Raw primary-header columns.
    pub packet_ver_num: Vec<u8>,
    /// See [`PrimaryHeader::packet_type`].
    pub packet_type: Vec<u8>,
    /// See [`PrimaryHeader::secondary_header_flag`].
    pub secondary_header_flag: Vec<bool>,
    /// See [`PrimaryHeader::pid`].
    pub pid: Vec<u16>,
    /// See [`PrimaryHeader::pcat`].
    pub pcat: Vec<u8>,
    /// See [`PrimaryHeader::sequence_flags`].
    pub sequence_flags: Vec<u8>,
    /// See [`PrimaryHeader::packet_sequence_count`].
    pub packet_sequence_count: Vec<u16>,
    /// See [`PrimaryHeader::packet_data_length`].
    pub packet_data_length: Vec<u32>,

    /// Raw secondary-header columns; `None` for any packet whose
    /// `secondary_header_flag` is unset.
    pub tcoar: Vec<Option<u32>>,
    pub tfine: Vec<Option<u16>>,
    pub sync: Vec<Option<u32>>,
    pub dtid: Vec<Option<u32>>,
    pub ecc: Vec<Option<u8>>,
    pub tstmod: Vec<Option<u8>>,
    pub rxchid: Vec<Option<u8>>,
    pub icid: Vec<Option<u32>>,
    pub adwidx: Vec<Option<u8>>,
    pub adw: Vec<Option<u16>>,
    pub spct: Vec<Option<u32>>,
    pub prict: Vec<Option<u32>>,
    pub errflg: Vec<Option<bool>>,
    pub baqmod: Vec<Option<u8>>,
    pub baqbl: Vec<Option<u8>>,
    pub rgdec: Vec<Option<u8>>,
    pub rxg: Vec<Option<u8>>,
    pub txprr: Vec<Option<u16>>,
    pub txpsf: Vec<Option<u16>>,
    pub txpl: Vec<Option<u32>>,
    pub rank: Vec<Option<u8>>,
    pub pri: Vec<Option<u32>>,
    pub swst: Vec<Option<u32>>,
    pub swl: Vec<Option<u32>>,
    pub ssbflag: Vec<Option<u8>>,
    pub pol: Vec<Option<u8>>,
    pub tcmp: Vec<Option<u8>>,
    pub ebadr: Vec<Option<u8>>,
    pub abadr: Vec<Option<u16>>,
    pub sastm: Vec<Option<u8>>,
    pub caltyp: Vec<Option<u8>>,
    pub cbadr: Vec<Option<u16>>,
    pub calmod: Vec<Option<u8>>,
    pub txpno: Vec<Option<u8>>,
    pub sigtyp: Vec<Option<u8>>,
    pub swap: Vec<Option<bool>>,
    pub swath: Vec<Option<u8>>,
    pub nq: Vec<Option<u16>>,

    /// Acquisition-chunk id per packet; left empty until a file driver
    /// calls `driver::assign_acquisition_chunks`.
    pub acquisition_chunk: Vec<u32>,
}

impl HeaderTable {
    /// Number of packet rows currently in the table.
    pub fn len(&self) -> usize {
        self.packet_ver_num.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_primary(&mut self, h: &PrimaryHeader) {
        self.packet_ver_num.push(h.packet_ver_num);
        self.packet_type.push(h.packet_type);
        self.secondary_header_flag.push(h.secondary_header_flag);
        self.pid.push(h.pid);
        self.pcat.push(h.pcat);
        self.sequence_flags.push(h.sequence_flags);
        self.packet_sequence_count.push(h.packet_sequence_count);
        self.packet_data_length.push(h.packet_data_length);
    }

    fn push_secondary(&mut self, s: Option<&SecondaryHeader>) {
        macro_rules! push {
            ($field:ident) => {
                self.$field.push(s.map(|s| s.$field));
            };
        }
        push!(tcoar);
        push!(tfine);
        push!(sync);
        push!(dtid);
        push!(ecc);
        push!(tstmod);
        push!(rxchid);
        push!(icid);
        push!(adwidx);
        push!(adw);
        push!(spct);
        push!(prict);
        push!(errflg);
        push!(baqmod);
        push!(baqbl);
        push!(rgdec);
        push!(rxg);
        push!(txprr);
        push!(txpsf);
        push!(txpl);
        push!(rank);
        push!(pri);
        push!(swst);
        push!(swl);
        push!(ssbflag);
        push!(pol);
        push!(tcmp);
        push!(calmod);
        push!(txpno);
        push!(sigtyp);
        push!(swap);
        push!(swath);
        push!(nq);
        self.ebadr.push(s.and_then(|s| s.sas_ssb.ebadr));
        self.abadr.push(s.and_then(|s| s.sas_ssb.abadr));
        self.sastm.push(s.and_then(|s| s.sas_ssb.sastm));
        self.caltyp.push(s.and_then(|s| s.sas_ssb.caltyp));
        self.cbadr.push(s.and_then(|s| s.sas_ssb.cbadr));
    }
}

/// Parse every packet header in `data` from offset 0, stopping when fewer
/// than 6 bytes remain. Returns the column-oriented header table plus a
/// parallel list of `(user_data_offset, user_data_len)` byte ranges.
pub fn decode_packet_headers(data: &[u8]) -> Result<(HeaderTable, Vec<(usize, usize)>)> {
    let mut table = HeaderTable::default();
    let mut bounds = Vec::new();
    let mut offset = 0usize;

    while data.len() - offset >= PRIMARY_HEADER_LEN {
        let primary = decode_primary_header(&data[offset..])?;
        let total_len = PRIMARY_HEADER_LEN + primary.packet_data_length as usize;
        if offset + total_len > data.len() {
            return Err(Error::Truncation {
                offset,
                detail: format!(
                    "packet declares {total_len} total bytes but only {} remain",
                    data.len() - offset
                ),
            });
        }

        if primary.secondary_header_flag {
            let secondary_start = offset + PRIMARY_HEADER_LEN;
            let secondary = decode_secondary_header(&data[secondary_start..])?;
            let user_data_start = secondary_start + SECONDARY_HEADER_LEN;
            let user_data_len = primary.packet_data_length as usize - SECONDARY_HEADER_LEN;
            bounds.push((user_data_start, user_data_len));
            table.push_primary(&primary);
            table.push_secondary(Some(&secondary));
        } else {
            let user_data_start = offset + PRIMARY_HEADER_LEN;
            let user_data_len = primary.packet_data_length as usize;
            bounds.push((user_data_start, user_data_len));
            table.push_primary(&primary);
            table.push_secondary(None);
        }

        offset += total_len;
    }

    Ok((table, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth_primary(packet_data_length_stored: u16) -> [u8; 6] {
        let mut b = [0u8; 6];
        b[0] = 0b0000_1000; // ver=000, type=0, sec_hdr_flag=1, pid hi bits=000
        b[1] = 0b0001_0001; // pid lo = 0001 (pid=1), pcat = 0001
        b[2] = 0b01_000000; // seq_flags=01, seq count hi = 0
        b[3] = 0x2A; // seq count lo
        b[4..6].copy_from_slice(&packet_data_length_stored.to_be_bytes());
        b
    }

    #[test]
    fn primary_header_roundtrip() {
        let raw = synth_primary(65); // actual length = 66, 66+6=72, /4=18 OK
        let h = decode_primary_header(&raw).unwrap();
        assert_eq!(h.packet_ver_num, 0);
        assert!(h.secondary_header_flag);
        assert_eq!(h.pid, 1);
        assert_eq!(h.pcat, 1);
        assert_eq!(h.sequence_flags, 0b01);
        assert_eq!(h.packet_sequence_count, 0x2A);
        assert_eq!(h.packet_data_length, 66);
    }

    #[test]
    fn primary_header_rejects_misaligned_length() {
        let raw = synth_primary(64); // actual length 65, 65+6=71, not /4
        assert!(matches!(
            decode_primary_header(&raw),
            Err(Error::CorruptValue { .. })
        ));
    }

    fn synth_secondary() -> [u8; 62] {
        let mut b = [0u8; 62];
        b[0..4].copy_from_slice(&1234u32.to_be_bytes());
        b[4..6].copy_from_slice(&5678u16.to_be_bytes());
        b[6..10].copy_from_slice(&SYNC_MARKER.to_be_bytes());
        b[10..14].copy_from_slice(&42u32.to_be_bytes());
        b[14] = 8; // ECC
        b[15] = 0b0_110_0001; // tstmod=110=6, rxchid=0001=1
        b[16..20].copy_from_slice(&99u32.to_be_bytes());
        b[20] = 1; // adwidx
        b[21..23].copy_from_slice(&7u16.to_be_bytes());
        b[23..27].copy_from_slice(&100u32.to_be_bytes());
        b[27..31].copy_from_slice(&200u32.to_be_bytes());
        b[31] = 0b0_00_01100; // errflg=0, baqmod=01100=12
        b[32] = 10; // baqbl
        b[34] = 0; // rgdec
        b[35] = 20; // rxg
        b[36..38].copy_from_slice(&0x1234u16.to_be_bytes());
        b[38..40].copy_from_slice(&0x5678u16.to_be_bytes());
        b[40] = 0;
        b[41] = 0;
        b[42] = 5; // txpl = 5
        b[43] = 0b000_00101; // rank = 5
        b[44] = 0;
        b[45] = 0;
        b[46] = 9; // pri = 9
        b[47] = 0;
        b[48] = 0;
        b[49] = 3; // swst
        b[50] = 0;
        b[51] = 0;
        b[52] = 4; // swl
        b[53] = 0b0_010_01_00; // ssbflag=0, pol=010=2, tcmp=01=1
        // SAS/SSB message, ssbflag=0: ebadr bits0-3, abadr bits4-13, sastm bit14
        let ssb_word: u16 = (3u16 << 12) | (7u16 << 2) | (1u16 << 1);
        b[54..56].copy_from_slice(&ssb_word.to_be_bytes());
        b[56] = 0b01_0_00011; // calmod=01, txpno=00011=3
        b[57] = 0b0000_0000; // sigtyp=0, swap=0
        b[58] = 2; // swath
        b[59..61].copy_from_slice(&128u16.to_be_bytes());
        b
    }

    #[test]
    fn secondary_header_roundtrip() {
        let raw = synth_secondary();
        let s = decode_secondary_header(&raw).unwrap();
        assert_eq!(s.tcoar, 1234);
        assert_eq!(s.tfine, 5678);
        assert_eq!(s.sync, SYNC_MARKER);
        assert_eq!(s.dtid, 42);
        assert_eq!(s.ecc, 8);
        assert_eq!(s.tstmod, 6);
        assert_eq!(s.rxchid, 1);
        assert_eq!(s.icid, 99);
        assert_eq!(s.adwidx, 1);
        assert_eq!(s.adw, 7);
        assert_eq!(s.spct, 100);
        assert_eq!(s.prict, 200);
        assert!(!s.errflg);
        assert_eq!(s.baqmod, 12);
        assert_eq!(s.baqbl, 10);
        assert_eq!(s.rgdec, 0);
        assert_eq!(s.rxg, 20);
        assert_eq!(s.txprr, 0x1234);
        assert_eq!(s.txpsf, 0x5678);
        assert_eq!(s.txpl, 5);
        assert_eq!(s.rank, 5);
        assert_eq!(s.pri, 9);
        assert_eq!(s.swst, 3);
        assert_eq!(s.swl, 4);
        assert_eq!(s.ssbflag, 0);
        assert_eq!(s.pol, 2);
        assert_eq!(s.tcmp, 1);
        assert_eq!(s.sas_ssb.ebadr, Some(3));
        assert_eq!(s.sas_ssb.abadr, Some(7));
        assert_eq!(s.sas_ssb.sastm, Some(1));
        assert_eq!(s.sas_ssb.caltyp, None);
        assert_eq!(s.sas_ssb.cbadr, None);
        assert_eq!(s.calmod, 1);
        assert_eq!(s.txpno, 3);
        assert_eq!(s.sigtyp, 0);
        assert!(!s.swap);
        assert_eq!(s.swath, 2);
        assert_eq!(s.nq, 128);
    }

    #[test]
    fn sync_mismatch_is_non_fatal() {
        let mut raw = synth_secondary();
        raw[6..10].copy_from_slice(&0u32.to_be_bytes());
        let s = decode_secondary_header(&raw).unwrap();
        assert_eq!(s.sync, 0);
    }

    #[test]
    fn decode_packet_headers_walks_multiple_packets() {
        let primary_len = 65u16; // actual = 66, total incl primary = 72
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&synth_primary(primary_len));
            data.extend_from_slice(&synth_secondary());
            data.extend(std::iter::repeat_n(0u8, 66 - 62)); // user data (4 bytes)
        }
        let (table, bounds) = decode_packet_headers(&data).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(bounds.len(), 3);
        for (i, &(start, len)) in bounds.iter().enumerate() {
            assert_eq!(len, 4);
            assert_eq!(start, i * 72 + 6 + 62);
        }
    }

    #[test]
    fn decode_packet_headers_truncated_packet_is_an_error() {
        let mut data = synth_primary(65).to_vec();
        data.extend_from_slice(&synth_secondary());
        data.truncate(data.len() - 1); // one byte short of the declared length
        assert!(matches!(
            decode_packet_headers(&data),
            Err(Error::Truncation { .. })
        ));
    }

    #[test]
    fn missing_secondary_header_fields_are_none() {
        let mut raw = synth_primary(65);
        raw[0] &= 0b1111_0111; // clear secondary_header_flag (bit index 4)
        let mut data = raw.to_vec();
        data.extend(std::iter::repeat_n(0u8, 66));
        let (table, bounds) = decode_packet_headers(&data).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.tcoar[0], None);
        assert_eq!(bounds[0], (6, 66));
    }
}
