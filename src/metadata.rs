//! Raw-to-decoded metadata transform (C11): renames raw spec codes to
//! human-readable names (via `field_names`), applies enum typing to coded
//! fields, applies the documented numeric scalings, and masks calibration
//! fields that don't apply to the packet's signal type.

use crate::enums::{
    BaqMode, CalType, CalibrationMode, EccNumber, Polarisation, RangeDecimation, RxChannelId,
    SasSsbFlag, SasTestMode, SignalType, TemperatureCompensation, TestMode,
};
use crate::headers::HeaderTable;
use crate::F_REF;

/// Decode a raw 16-bit TXPRR field into Hz/s.
///
/// `sign = (-1)^(1 - (v>>15))`, magnitude from the low 15 bits, scaled by
/// `F_REF² / 2²¹`.
pub fn decode_txprr(raw: u16) -> f64 {
    let sign = if (raw >> 15) & 1 == 1 { 1.0 } else { -1.0 };
    let magnitude = (raw & 0x7fff) as f64;
    sign * magnitude * F_REF * F_REF / 2f64.powi(21)
}

/// Decode a raw 16-bit TXPSF field into Hz, given the already-decoded TXPRR
/// value it's defined relative to.
pub fn decode_txpsf(raw: u16, txprr_hz_per_s: f64) -> f64 {
    let sign = if (raw >> 15) & 1 == 1 { 1.0 } else { -1.0 };
    let magnitude = (raw & 0x7fff) as f64;
    txprr_hz_per_s / (4.0 * F_REF) + sign * magnitude * F_REF / 2f64.powi(14)
}

/// Decode the raw 16-bit fine-time counter into a fractional second.
pub fn decode_fine_time(raw: u16) -> f64 {
    (raw as f64 + 0.5) * 2f64.powi(-16)
}

/// A column-oriented table of decoded (renamed, typed, scaled, masked)
/// metadata fields, one row per packet in the source `HeaderTable`.
#[derive(Debug, Default)]
pub struct DecodedTable {
    /// CCSDS packet version number.
    pub packet_ver_num: Vec<u8>,
    /// Whether the packet carries a secondary header.
    pub secondary_header_flag: Vec<bool>,
    /// CCSDS packet sequence count.
    pub packet_sequence_count: Vec<u16>,
    /// Bytes following the primary header.
    pub packet_data_length: Vec<u32>,

    /// Coarse time, whole seconds.
    pub coarse_time: Vec<Option<u32>>,
    /// Fine time, fractional seconds: `(raw + 0.5) * 2^-16`.
    pub fine_time: Vec<Option<f64>>,
    /// Whether the secondary header sync marker matched.
    pub sync_ok: Vec<Option<bool>>,
    /// Data-take ID.
    pub data_take_id: Vec<Option<u32>>,
    /// ECC number / measurement mode.
    pub ecc_number: Vec<Option<EccNumber>>,
    /// Test mode.
    pub test_mode: Vec<Option<TestMode>>,
    /// Rx channel ID.
    pub rx_channel_id: Vec<Option<RxChannelId>>,
    /// Instrument configuration ID.
    pub instrument_config_id: Vec<Option<u32>>,
    /// Sub-commutated ancillary data word index, `1..=64`.
    pub adwidx: Vec<Option<u8>>,
    /// Sub-commutated ancillary data word.
    pub adw: Vec<Option<u16>>,
    /// Space packet count.
    pub space_packet_count: Vec<Option<u32>>,
    /// PRI count.
    pub pri_count: Vec<Option<u32>>,
    /// Error flag.
    pub error_flag: Vec<Option<bool>>,
    /// BAQ mode.
    pub baq_mode: Vec<Option<BaqMode>>,
    /// BAQ block length.
    pub baq_block_len: Vec<Option<u8>>,
    /// Range decimation filter selection.
    pub range_decimation: Vec<Option<RangeDecimation>>,
    /// Rx gain, dB: `-0.5 * raw`.
    pub rx_gain_db: Vec<Option<f64>>,
    /// Tx ramp rate, Hz/s.
    pub tx_ramp_rate_hz_per_s: Vec<Option<f64>>,
    /// Tx pulse start frequency, Hz.
    pub tx_pulse_start_freq_hz: Vec<Option<f64>>,
    /// Tx pulse length, seconds.
    pub tx_pulse_len_s: Vec<Option<f64>>,
    /// Rank.
    pub rank: Vec<Option<u8>>,
    /// PRI, seconds.
    pub pri_s: Vec<Option<f64>>,
    /// SWST, seconds.
    pub swst_s: Vec<Option<f64>>,
    /// SWL, seconds.
    pub swl_s: Vec<Option<f64>>,
    /// SAS/SSB flag selecting the SAS/SSB message interpretation.
    pub sas_ssb_flag: Vec<Option<SasSsbFlag>>,
    /// Polarisation configuration.
    pub polarisation: Vec<Option<Polarisation>>,
    /// Temperature compensation configuration.
    pub temperature_compensation: Vec<Option<TemperatureCompensation>>,
    /// Elevation beam address, present when `sas_ssb_flag` is imaging/noise.
    pub elevation_beam_address: Vec<Option<u8>>,
    /// Azimuth beam address, present when `sas_ssb_flag` is imaging/noise.
    pub azimuth_beam_address: Vec<Option<u16>>,
    /// SAS test mode, present when `sas_ssb_flag` is imaging/noise.
    pub sas_test_mode: Vec<Option<SasTestMode>>,
    /// Calibration type, present when `sas_ssb_flag` is calibration.
    pub cal_type: Vec<Option<CalType>>,
    /// Calibration beam address, present when `sas_ssb_flag` is calibration.
    pub calibration_beam_address: Vec<Option<u16>>,
    /// `None` both when the raw field was absent and when the "don't care"
    /// masking rule applies (imaging/noise acquisition on an echo/noise
    /// signal type).
    pub calibration_mode: Vec<Option<CalibrationMode>>,
    /// Tx pulse number.
    pub tx_pulse_number: Vec<Option<u8>>,
    /// Signal type.
    pub signal_type: Vec<Option<SignalType>>,
    /// Swap flag.
    pub swap_flag: Vec<Option<bool>>,
    /// Swath number.
    pub swath_number: Vec<Option<u8>>,
    /// Number of quads in this packet's user-data field.
    pub num_quads: Vec<Option<u16>>,

    /// Acquisition-chunk id per packet.
    pub acquisition_chunk: Vec<u32>,
}

fn map_opt<T, U>(v: Option<T>, f: impl FnOnce(T) -> U) -> Option<U> {
    v.map(f)
}

/// Transform a raw `HeaderTable` into a `DecodedTable`.
///
/// Coded fields whose raw value is not a legal enum code are logged via
/// `log::warn!` and mapped to `None` rather than failing the whole table —
/// a single corrupt packet's metadata should not block reading every other
/// packet's.
pub fn decode_columns(table: &HeaderTable) -> DecodedTable {
    let n = table.len();
    let mut out = DecodedTable {
        packet_ver_num: table.packet_ver_num.clone(),
        secondary_header_flag: table.secondary_header_flag.clone(),
        packet_sequence_count: table.packet_sequence_count.clone(),
        packet_data_length: table.packet_data_length.clone(),
        coarse_time: table.tcoar.clone(),
        fine_time: table.tfine.iter().map(|v| map_opt(*v, decode_fine_time)).collect(),
        sync_ok: table.sync.iter().map(|v| map_opt(*v, |s| s == 0x352E_F853)).collect(),
        data_take_id: table.dtid.clone(),
        adwidx: table.adwidx.clone(),
        adw: table.adw.clone(),
        ecc_number: table.ecc.iter().map(|v| map_opt(*v, EccNumber::from_code)).collect(),
        test_mode: (0..n).map(|_| None).collect(),
        rx_channel_id: (0..n).map(|_| None).collect(),
        instrument_config_id: table.icid.clone(),
        space_packet_count: table.spct.clone(),
        pri_count: table.prict.clone(),
        error_flag: table.errflg.clone(),
        baq_mode: (0..n).map(|_| None).collect(),
        baq_block_len: table.baqbl.clone(),
        range_decimation: (0..n).map(|_| None).collect(),
        rx_gain_db: table.rxg.iter().map(|v| map_opt(*v, |g| -0.5 * g as f64)).collect(),
        tx_ramp_rate_hz_per_s: table.txprr.iter().map(|v| map_opt(*v, decode_txprr)).collect(),
        tx_pulse_start_freq_hz: Vec::with_capacity(n),
        tx_pulse_len_s: table.txpl.iter().map(|v| map_opt(*v, |p| p as f64 / F_REF)).collect(),
        rank: table.rank.clone(),
        pri_s: table.pri.iter().map(|v| map_opt(*v, |p| p as f64 / F_REF)).collect(),
        swst_s: table.swst.iter().map(|v| map_opt(*v, |p| p as f64 / F_REF)).collect(),
        swl_s: table.swl.iter().map(|v| map_opt(*v, |p| p as f64 / F_REF)).collect(),
        sas_ssb_flag: (0..n).map(|_| None).collect(),
        polarisation: (0..n).map(|_| None).collect(),
        temperature_compensation: (0..n).map(|_| None).collect(),
        elevation_beam_address: table.ebadr.clone(),
        azimuth_beam_address: table.abadr.clone(),
        sas_test_mode: (0..n).map(|_| None).collect(),
        cal_type: (0..n).map(|_| None).collect(),
        calibration_beam_address: table.cbadr.clone(),
        calibration_mode: (0..n).map(|_| None).collect(),
        tx_pulse_number: table.txpno.clone(),
        signal_type: (0..n).map(|_| None).collect(),
        swap_flag: table.swap.clone(),
        swath_number: table.swath.clone(),
        num_quads: table.nq.clone(),
        acquisition_chunk: table.acquisition_chunk.clone(),
    };

    for i in 0..n {
        out.tx_pulse_start_freq_hz.push(match (table.txpsf[i], out.tx_ramp_rate_hz_per_s[i]) {
            (Some(raw), Some(ramp)) => Some(decode_txpsf(raw, ramp)),
            _ => None,
        });
        out.test_mode[i] = table.tstmod[i].and_then(|v| log_or_none("TestMode", TestMode::from_code(v)));
        out.rx_channel_id[i] = table.rxchid[i].and_then(|v| log_or_none("RxChannelId", RxChannelId::from_code(v)));
        out.baq_mode[i] = table.baqmod[i].and_then(|v| log_or_none("BaqMode", BaqMode::from_code(v)));
        out.range_decimation[i] = table.rgdec[i].and_then(|v| log_or_none("RangeDecimation", RangeDecimation::from_code(v)));
        out.sas_ssb_flag[i] = table.ssbflag[i].and_then(|v| log_or_none("SasSsbFlag", SasSsbFlag::from_code(v)));
        out.polarisation[i] = table.pol[i].and_then(|v| log_or_none("Polarisation", Polarisation::from_code(v)));
        out.temperature_compensation[i] =
            table.tcmp[i].and_then(|v| log_or_none("TemperatureCompensation", TemperatureCompensation::from_code(v)));
        out.sas_test_mode[i] = table.sastm[i].and_then(|v| log_or_none("SasTestMode", SasTestMode::from_code(v)));
        out.cal_type[i] = table.caltyp[i].and_then(|v| log_or_none("CalType", CalType::from_code(v)));
        out.signal_type[i] = table.sigtyp[i].and_then(|v| log_or_none("SignalType", SignalType::from_code(v)));

        let raw_cal_mode = table.calmod[i].and_then(|v| log_or_none("CalibrationMode", CalibrationMode::from_code(v)));
        let dont_care = matches!(out.sas_ssb_flag[i], Some(SasSsbFlag::ImagingOrNoiseOperation))
            && matches!(out.signal_type[i], Some(st) if st.is_echo_or_noise());
        out.calibration_mode[i] = if dont_care { None } else { raw_cal_mode };
    }

    out
}

fn log_or_none<T>(field: &str, r: crate::Result<T>) -> Option<T> {
    match r {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("metadata field {field}: {e}");
            None
        }
    }
}
