//! Typed enums for the secondary header's coded fields, plus the
//! range-decimation physical-unit lookup (C13).
//!
//! Values and labels are reproduced verbatim from the *S1-IF-ASD-PL-0007*
//! SAR Space Packet Protocol Data Unit specification.

use crate::{Error, Result};

fn corrupt(field: &str, code: u32) -> Error {
    Error::CorruptValue {
        offset: 0,
        detail: format!("{field} code {code} is not a legal value"),
    }
}

/// ECC number / measurement mode (8-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EccNumber {
    /// Raw ECC code, with its manual label available via [`EccNumber::label`].
    Code(u8),
}

impl EccNumber {
    /// All currently-unassigned codes (`26..=27`, `48..=255`... wait, none —
    /// every code 0..=47 is defined) fall back to `"unassigned"`.
    pub fn from_code(code: u8) -> Self {
        EccNumber::Code(code)
    }

    /// Manual label for this code, or `"unassigned"` if out of the defined
    /// 0..=47 range.
    pub fn label(self) -> &'static str {
        let EccNumber::Code(code) = self;
        match code {
            0 | 7 | 28 | 29 | 30 | 36 | 47 => "contingency",
            1 => "Stripmap 1",
            2 => "Stripmap 2",
            3 => "Stripmap 3",
            4 => "Stripmap 4",
            5 => "Stripmap 5-N",
            6 => "Stripmap 6",
            8 => "Interferometric Wide Swath",
            9 => "Wave Mode",
            10 => "Stripmap 5-S",
            11 => "Stripmap 1 w/o interl.Cal",
            12 => "Stripmap 2 w/o interl.Cal",
            13 => "Stripmap 3 w/o interl.Cal",
            14 => "Stripmap 4 w/o interl.Cal",
            15 => "RFC mode",
            16 => "Test Mode Oper / Test Mode Bypass",
            17 => "Elevation Notch S3",
            18 => "Azimuth Notch S1",
            19 => "Azimuth Notch S2",
            20 => "Azimuth Notch S3",
            21 => "Azimuth Notch S4",
            22 => "Azimuth Notch S5-N",
            23 => "Azimuth Notch S5-S",
            24 => "Azimuth Notch S6",
            25 => "Stripmap 5-N w/o interl.Cal",
            26 => "Stripmap 5-S w/o interl.Cal",
            27 => "Stripmap 6 w/o interl.Cal",
            31 => "Elevation Notch S3 w/o interl.Cal",
            32 => "Extra Wide Swath",
            33 => "Azimuth Notch S1 w/o interl.Cal",
            34 => "Azimuth Notch S3 w/o interl.Cal",
            35 => "Azimuth Notch S6 w/o interl.Cal",
            37 => "Noise Characterisation S1",
            38 => "Noise Characterisation S2",
            39 => "Noise Characterisation S3",
            40 => "Noise Characterisation S4",
            41 => "Noise Characterisation S5-N",
            42 => "Noise Characterisation S5-S",
            43 => "Noise Characterisation S6",
            44 => "Noise Characterisation EWS",
            45 => "Noise Characterisation IWS",
            46 => "Noise Characterisation Wave",
            _ => "unassigned",
        }
    }
}

/// RxChannelId (1-bit field, byte 15 bits 4-7 carries it alongside spares).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxChannelId {
    /// RxV-Pol Channel.
    RxVPol,
    /// RxH-Pol Channel.
    RxHPol,
}

impl RxChannelId {
    /// Decode from the raw bit value (0 or 1).
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(RxChannelId::RxVPol),
            1 => Ok(RxChannelId::RxHPol),
            other => Err(corrupt("RxChannelId", other as u32)),
        }
    }

    /// Manual label.
    pub fn label(self) -> &'static str {
        match self {
            RxChannelId::RxVPol => "RxV-Pol Channel",
            RxChannelId::RxHPol => "RxH-Pol Channel",
        }
    }
}

/// TSTMOD - Test Mode (3-bit field). Codes 1-3 are invalid per the manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// No Test Mode.
    Default,
    /// Ground testing, RxM operational.
    ContingencyOper,
    /// Ground testing, RxM bypassed.
    ContingencyBypass,
    /// Test Mode Oper.
    TestModeOper,
    /// Test Mode Bypass.
    TestModeBypass,
}

impl TestMode {
    /// Decode from the raw 3-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(TestMode::Default),
            4 => Ok(TestMode::ContingencyOper),
            5 => Ok(TestMode::ContingencyBypass),
            6 => Ok(TestMode::TestModeOper),
            7 => Ok(TestMode::TestModeBypass),
            other => Err(corrupt("TestMode", other as u32)),
        }
    }

    /// Manual label.
    pub fn label(self) -> &'static str {
        match self {
            TestMode::Default => "Default (no Test Mode)",
            TestMode::ContingencyOper => "contingency (ground testing, RxM operational)",
            TestMode::ContingencyBypass => "contingency (ground testing, RxM bypassed)",
            TestMode::TestModeOper => "Test Mode Oper",
            TestMode::TestModeBypass => "Test Mode Bypass",
        }
    }
}

/// BAQ Mode (5-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaqMode {
    /// Bypass (10-bit sign-magnitude, no compression).
    Bypass,
    /// 3-bit BAQ (Type C, unimplemented).
    Baq3Bit,
    /// 4-bit BAQ (Type C, unimplemented).
    Baq4Bit,
    /// 5-bit BAQ (Type C, unimplemented).
    Baq5Bit,
    /// FDBAQ mode 0.
    Fdbaq0,
    /// FDBAQ mode 1.
    Fdbaq1,
    /// FDBAQ mode 2.
    Fdbaq2,
}

impl BaqMode {
    /// Decode from the raw 5-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(BaqMode::Bypass),
            3 => Ok(BaqMode::Baq3Bit),
            4 => Ok(BaqMode::Baq4Bit),
            5 => Ok(BaqMode::Baq5Bit),
            12 => Ok(BaqMode::Fdbaq0),
            13=> Ok(BaqMode::Fdbaq1),
            14 => Ok(BaqMode::Fdbaq2),
            other => Err(corrupt("BaqMode", other as u32)),
        }
    }

    /// Manual label.
    pub fn label(self) -> &'static str {
        match self {
            BaqMode::Bypass => "BYPASS MODE",
            BaqMode::Baq3Bit => "BAQ 3-BIT MODE",
            BaqMode::Baq4Bit => "BAQ 4-BIT MODE",
            BaqMode::Baq5Bit => "BAQ 5-BIT MODE",
            BaqMode::Fdbaq0 => "FDBAQ MODE 0",
            BaqMode::Fdbaq1 => "FDBAQ MODE 1",
            BaqMode::Fdbaq2 => "FDBAQ MODE 2",
        }
    }

    /// Whether this crate implements payload decoding for this mode. The
    /// Type-C BAQ modes (3/4/5) parse fine at the header level but have no
    /// payload decoder (see `driver::decode_single`).
    pub fn is_implemented(self) -> bool {
        matches!(
            self,
            BaqMode::Bypass | BaqMode::Fdbaq0 | BaqMode::Fdbaq1 | BaqMode::Fdbaq2
        )
    }
}

/// RGDEC - Range Decimation (8-bit field), with the physical-unit helpers
/// (C13) that turn a decimation code into a sample rate, filter bandwidth
/// and filter length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDecimation(u8);

impl RangeDecimation {
    /// Decode from the raw code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 | 1 | 3..=11 => Ok(RangeDecimation(code)),
            other => Err(corrupt("RangeDecimation", other as u32)),
        }
    }

    /// Raw code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// Manual label (`"RGDEC n"`).
    pub fn label(self) -> String {
        format!("RGDEC {}", self.0)
    }

    /// Decimation ratio `(L, M)`; sample rate is `(L/M) * 4 * F_REF`.
    pub fn decimation_ratio(self) -> (u32, u32) {
        match self.0 {
            0 => (3, 4),
            1 => (2, 3),
            3 => (5, 9),
            4 => (4, 9),
            5 => (3, 8),
            6 => (1, 3),
            7 => (1, 6),
            8 => (3, 7),
            9 => (5, 16),
            10 => (3, 26),
            11 => (4, 11),
            _ => unreachable!("validated in from_code"),
        }
    }

    /// Sample rate after decimation, in Hz.
    pub fn sample_rate_hz(self) -> f64 {
        let (l, m) = self.decimation_ratio();
        (l as f64 / m as f64) * 4.0 * crate::F_REF
    }

    /// Filter bandwidth, in Hz.
    pub fn filter_bandwidth_hz(self) -> f64 {
        match self.0 {
            0 => 100.0e6,
            1 => 87.71e6,
            3 => 74.25e6,
            4 => 59.44e6,
            5 => 50.62e6,
            6 => 44.89e6,
            7 => 22.2e6,
            8 => 56.59e6,
            9 => 42.86e6,
            10 => 15.1e6,
            11 => 48.35e6,
            _ => unreachable!("validated in from_code"),
        }
    }

    /// Filter length NF, in samples.
    pub fn filter_length_samples(self) -> u32 {
        match self.0 {
            0 => 28,
            1 => 28,
            3 => 32,
            4 => 40,
            5 => 48,
            6 => 52,
            7 => 92,
            8 => 36,
            9 => 68,
            10 => 120,
            11 => 44,
            _ => unreachable!("validated in from_code"),
        }
    }
}

/// SAS SSB Flag (1-bit field): selects which interpretation of the SAS/SSB
/// message bytes (54-55) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasSsbFlag {
    /// Imaging or noise acquisition: bytes 54-55 carry EBADR/ABADR/SASTM.
    ImagingOrNoiseOperation,
    /// Calibration: bytes 54-55 carry CALTYP/CBADR.
    Calibration,
}

impl SasSsbFlag {
    /// Decode from the raw bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SasSsbFlag::ImagingOrNoiseOperation),
            1 => Ok(SasSsbFlag::Calibration),
            other => Err(corrupt("SasSsbFlag", other as u32)),
        }
    }
}

/// POLcode - polarisation configuration (3-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarisation {
    /// Tx H Only.
    TxH,
    /// Tx H, Rx H.
    TxHRxH,
    /// Tx H, Rx V.
    TxHRxV,
    /// Tx H, Rx V+H.
    TxHRxVH,
    /// Tx V Only.
    TxV,
    /// Tx V, Rx H.
    TxVRxH,
    /// Tx V, Rx V.
    TxVRxV,
    /// Tx V, Rx V+H.
    TxVRxVH,
}

impl Polarisation {
    /// Decode from the raw 3-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => Polarisation::TxH,
            1 => Polarisation::TxHRxH,
            2 => Polarisation::TxHRxV,
            3 => Polarisation::TxHRxVH,
            4 => Polarisation::TxV,
            5 => Polarisation::TxVRxH,
            6 => Polarisation::TxVRxV,
            7 => Polarisation::TxVRxVH,
            other => return Err(corrupt("Polarisation", other as u32)),
        })
    }
}

/// TCMPcode - temperature compensation configuration (2-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureCompensation {
    /// Front End off, Tile Amplifier off.
    FeOffTaOff,
    /// Front End on, Tile Amplifier off.
    FeOnTaOff,
    /// Front End off, Tile Amplifier on.
    FeOffTaOn,
    /// Front End on, Tile Amplifier on.
    FeOnTaOn,
}

impl TemperatureCompensation {
    /// Decode from the raw 2-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => TemperatureCompensation::FeOffTaOff,
            1 => TemperatureCompensation::FeOnTaOff,
            2 => TemperatureCompensation::FeOffTaOn,
            3 => TemperatureCompensation::FeOnTaOn,
            other => return Err(corrupt("TemperatureCompensation", other as u32)),
        })
    }
}

/// SAS Test Mode (1-bit field, only meaningful when `sas_ssbflag =
/// ImagingOrNoiseOperation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasTestMode {
    /// SAS Test Mode active.
    Active,
    /// Normal calibration mode.
    Normal,
}

impl SasTestMode {
    /// Decode from the raw bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SasTestMode::Active),
            1 => Ok(SasTestMode::Normal),
            other => Err(corrupt("SasTestMode", other as u32)),
        }
    }
}

/// CALTYPcode - calibration type (3-bit field, only present when
/// `sas_ssbflag = Calibration`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalType {
    /// Tx Cal.
    TxCal,
    /// Rx Cal.
    RxCal,
    /// EPDN Cal.
    EpdnCal,
    /// Tx Cal Iso (S-1A/B) or TA Cal (S-1C/D).
    TxCalIsoOrTaCal,
    /// APDN Cal (S-1A/B only).
    ApdnCalS1abOnly,
    /// TxH Cal Iso (S-1A/B only).
    TxhCalIsoS1abOnly,
}

impl CalType {
    /// Decode from the raw 3-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => CalType::TxCal,
            1 => CalType::RxCal,
            2 => CalType::EpdnCal,
            3 => CalType::TxCalIsoOrTaCal,
            4 => CalType::ApdnCalS1abOnly,
            7 => CalType::TxhCalIsoS1abOnly,
            other => return Err(corrupt("CalType", other as u32)),
        })
    }
}

/// CALMODcode - calibration mode (2-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Interleaved Internal Calibration (PCC2).
    InterleavedInternal,
    /// Internal Calibration in Preamble/Postamble (PCC2).
    InternalPreamblePostamble,
    /// Phase Coded Characterisation (PCC32).
    PhaseCodedCharPcc32,
    /// Phase Coded Characterisation (RF672).
    PhaseCodedCharRf672,
}

impl CalibrationMode {
    /// Decode from the raw 2-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => CalibrationMode::InterleavedInternal,
            1 => CalibrationMode::InternalPreamblePostamble,
            2 => CalibrationMode::PhaseCodedCharPcc32,
            3 => CalibrationMode::PhaseCodedCharRf672,
            other => return Err(corrupt("CalibrationMode", other as u32)),
        })
    }
}

/// SIGTYPcode - signal type (4-bit field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Echo.
    Echo,
    /// Noise.
    Noise,
    /// Tx Cal.
    TxCal,
    /// Rx Cal.
    RxCal,
    /// EPDN Cal.
    EpdnCal,
    /// TA Cal (S-1A/B) or Tx Cal Iso (S-1C/D).
    TaCalOrTxCalIso,
    /// APDN Cal (S-1A/B only).
    ApdnCalS1abOnly,
    /// TxH Cal Iso (S-1A/B only).
    TxhCalIsoS1abOnly,
}

impl SignalType {
    /// Decode from the raw 4-bit value.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => SignalType::Echo,
            1 => SignalType::Noise,
            8 => SignalType::TxCal,
            9 => SignalType::RxCal,
            10 => SignalType::EpdnCal,
            11 => SignalType::TaCalOrTxCalIso,
            12 => SignalType::ApdnCalS1abOnly,
            15 => SignalType::TxhCalIsoS1abOnly,
            other => return Err(corrupt("SignalType", other as u32)),
        })
    }

    /// Whether this signal type is an operational echo or noise acquisition
    /// (used by the calibration-field "don't care" masking rule in
    /// `metadata::decode_columns`).
    pub fn is_echo_or_noise(self) -> bool {
        matches!(self, SignalType::Echo | SignalType::Noise)
    }
}
