//! Bidirectional raw (spec-code) ⇄ decoded (human-readable) column-name
//! table for every secondary-header field that has a raw spec code.
//!
//! A handful of fields (packet index, acquisition chunk number, primary
//! header fields, and the sub-commutated ephemeris/attitude columns) only
//! have a decoded name and are not part of this table.

/// One (raw, decoded) column-name pair.
pub struct FieldName {
    /// The raw spec-style code, e.g. `"BAQMOD"`.
    pub raw: &'static str,
    /// The human-readable decoded name, e.g. `"BAQ Mode"`.
    pub decoded: &'static str,
}

/// All secondary-header fields carrying both a raw and a decoded name,
/// reproduced in the order the manual presents them.
pub const FIELDS: &[FieldName] = &[
    FieldName { raw: "TCOAR", decoded: "Coarse Time" },
    FieldName { raw: "TFINE", decoded: "Fine Time" },
    FieldName { raw: "SYNC", decoded: "Sync" },
    FieldName { raw: "DTID", decoded: "Data Take ID" },
    FieldName { raw: "ECC", decoded: "ECC Number" },
    FieldName { raw: "TSTMOD", decoded: "Test Mode" },
    FieldName { raw: "RXCHID", decoded: "Rx Channel ID" },
    FieldName { raw: "ICID", decoded: "Instrument Configuration ID" },
    FieldName { raw: "ADWIDX", decoded: "Sub-commutated Ancilliary Data Word Index" },
    FieldName { raw: "ADW", decoded: "Sub-commutated Ancilliary Data Word" },
    FieldName { raw: "SPCT", decoded: "Space Packet Count" },
    FieldName { raw: "PRICT", decoded: "PRI Count" },
    FieldName { raw: "ERRFLG", decoded: "Error Flag" },
    FieldName { raw: "BAQMOD", decoded: "BAQ Mode" },
    FieldName { raw: "BAQBL", decoded: "BAQ Block Length" },
    FieldName { raw: "RGDEC", decoded: "Range Decimation" },
    FieldName { raw: "RXG", decoded: "Rx Gain" },
    FieldName { raw: "TXPRR", decoded: "Tx Ramp Rate" },
    FieldName { raw: "TXPSF", decoded: "Tx Pulse Start Frequency" },
    FieldName { raw: "TXPL", decoded: "Tx Pulse Length" },
    FieldName { raw: "RANK", decoded: "Rank" },
    FieldName { raw: "PRI", decoded: "PRI" },
    FieldName { raw: "SWST", decoded: "SWST" },
    FieldName { raw: "SWL", decoded: "SWL" },
    FieldName { raw: "SSBFLAG", decoded: "SAS SSB Flag" },
    FieldName { raw: "POL", decoded: "Polarisation" },
    FieldName { raw: "TCMP", decoded: "Temperature Compensation" },
    FieldName { raw: "EBADR", decoded: "Elevation Beam Address" },
    FieldName { raw: "ABADR", decoded: "Azimuth Beam Address" },
    FieldName { raw: "SASTM", decoded: "SAS Test Mode" },
    FieldName { raw: "CALTYP", decoded: "Cal Type" },
    FieldName { raw: "CBADR", decoded: "Calibration Beam Address" },
    FieldName { raw: "CALMOD", decoded: "Calibration Mode" },
    FieldName { raw: "TXPNO", decoded: "Tx Pulse Number" },
    FieldName { raw: "SIGTYP", decoded: "Signal Type" },
    FieldName { raw: "SWAP", decoded: "Swap Flag" },
    FieldName { raw: "SWATH", decoded: "Swath Number" },
    FieldName { raw: "NQ", decoded: "Number of Quads" },
];

/// Look up the decoded name for a raw spec code, if recognized.
pub fn raw_to_decoded(raw: &str) -> Option<&'static str> {
    FIELDS.iter().find(|f| f.raw == raw).map(|f| f.decoded)
}

/// Look up the raw spec code for a decoded name, if recognized.
pub fn decoded_to_raw(decoded: &str) -> Option<&'static str> {
    FIELDS.iter().find(|f| f.decoded == decoded).map(|f| f.raw)
}
