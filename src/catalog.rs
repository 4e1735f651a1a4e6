//! Speaker and amplifier catalogs.
//!
//! Catalogs are JSON arrays of hardware specifications. A [`Limiter`] pairs
//! one speaker with one amplifier at a given load and reports the threshold
//! that protects both.

use crate::config::ThresholdConstants;
use crate::engine::{self, BaffleType, CalculationInput, LimiterType};
use crate::error::{LimitCalcError, Result};
use crate::rounding::{round, round_directional};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Amplifier power ratings per load; `None` when the datasheet is silent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PowerRatings {
    /// Power into 8 ohm.
    #[serde(rename = "8")]
    pub ohm8: Option<u32>,
    /// Power into 4 ohm.
    #[serde(rename = "4")]
    pub ohm4: Option<u32>,
    /// Power into 2 ohm.
    #[serde(rename = "2")]
    pub ohm2: Option<u32>,
    /// Bridged power into 8 ohm.
    #[serde(rename = "8 (bridge)")]
    pub bridge_ohm8: Option<u32>,
    /// Bridged power into 4 ohm.
    #[serde(rename = "4 (bridge)")]
    pub bridge_ohm4: Option<u32>,
}

impl PowerRatings {
    /// Stereo rating at `load` ohms.
    pub fn at(&self, load: u32) -> Option<u32> {
        match load {
            8 => self.ohm8,
            4 => self.ohm4,
            2 => self.ohm2,
            _ => None,
        }
    }
}

/// Amplifier catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Amplifier {
    /// Full reference, e.g. `"t.amp TSA 4-1300"`.
    pub reference: String,
    /// Voltage gain in dB.
    pub gain: f64,
    /// Power ratings.
    #[serde(default)]
    pub power: PowerRatings,
    /// Number of outputs.
    #[serde(default)]
    pub outputs: Option<u32>,
}

/// Loudspeaker specification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Speaker {
    /// Full reference, e.g. `"MTH 4654 (RCF LF18X401)"`.
    pub reference: String,
    /// Nominal impedance in ohms.
    pub impedance: u32,
    /// AES power in watts.
    pub power: u32,
    /// Usable range, e.g. `"330-2.2k"`.
    pub response: String,
    /// `"OPEN"` or `"CLOSED"`.
    pub baffle: String,
}

impl Speaker {
    /// Enclosure type; anything but `"OPEN"` is sealed.
    pub fn baffle_type(&self) -> BaffleType {
        if self.baffle == "OPEN" {
            BaffleType::Open
        } else {
            BaffleType::Sealed
        }
    }
}

/// Amplifiers and speakers, each sorted by reference.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Known amplifiers.
    pub amplifiers: Vec<Amplifier>,
    /// Known speakers.
    pub speakers: Vec<Speaker>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| LimitCalcError::file_open(path.to_path_buf(), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| LimitCalcError::catalog_format(path.to_path_buf(), e))
}

impl Catalog {
    /// Load both catalogs from JSON files.
    pub fn load(amplifiers: &Path, speakers: &Path) -> Result<Self> {
        let mut amplifiers: Vec<Amplifier> = read_json(amplifiers)?;
        let mut speakers: Vec<Speaker> = read_json(speakers)?;
        amplifiers.sort_by(|a, b| a.reference.cmp(&b.reference));
        speakers.sort_by(|a, b| a.reference.cmp(&b.reference));
        tracing::info!(
            amplifiers = amplifiers.len(),
            speakers = speakers.len(),
            "Catalog loaded"
        );
        Ok(Self {
            amplifiers,
            speakers,
        })
    }

    /// Find an amplifier by reference.
    pub fn amplifier(&self, reference: &str) -> Result<&Amplifier> {
        self.amplifiers
            .iter()
            .find(|a| a.reference == reference)
            .ok_or_else(|| LimitCalcError::unknown_reference("amplifier", reference))
    }

    /// Find a speaker by reference.
    pub fn speaker(&self, reference: &str) -> Result<&Speaker> {
        self.speakers
            .iter()
            .find(|s| s.reference == reference)
            .ok_or_else(|| LimitCalcError::unknown_reference("speaker", reference))
    }
}

/// Threshold of a speaker/amplifier pair with the voltages behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdReport {
    /// Maximum RMS voltage for the speaker, to 0.01 V.
    pub speaker_voltage: f64,
    /// Maximum RMS voltage of the amplifier, to 0.01 V.
    pub amplifier_voltage: f64,
    /// Threshold in dBu, rounded toward negative infinity to 0.1.
    pub threshold: f64,
}

/// One speaker driven by one amplifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Limiter {
    /// Working load in ohms.
    pub impedance: f64,
    /// Speaker enclosure.
    pub baffle: BaffleType,
    /// Speaker power at the working load.
    pub speaker_power: f64,
    /// Amplifier gain in dB.
    pub amplifier_gain: f64,
    /// Amplifier power at the working load.
    pub amplifier_power: f64,
    /// Reference voltage for 0 dBu.
    pub sensitivity: f64,
}

impl Limiter {
    /// Pair a speaker with an amplifier at `load` ohms.
    ///
    /// Speaker power is rescaled from its nominal impedance to the load.
    pub fn for_pair(speaker: &Speaker, amplifier: &Amplifier, load: u32) -> Result<Self> {
        let amplifier_power =
            amplifier
                .power
                .at(load)
                .ok_or_else(|| LimitCalcError::UnsupportedLoad {
                    amplifier: amplifier.reference.clone(),
                    load,
                })?;
        if load > speaker.impedance {
            return Err(LimitCalcError::LoadAboveNominal {
                speaker: speaker.reference.clone(),
                nominal: speaker.impedance,
            });
        }
        let speaker_power = f64::from(speaker.power) * f64::from(speaker.impedance) / f64::from(load);
        Ok(Self {
            impedance: f64::from(load),
            baffle: speaker.baffle_type(),
            speaker_power,
            amplifier_gain: amplifier.gain,
            amplifier_power: f64::from(amplifier_power),
            sensitivity: ThresholdConstants::default().sensitivity,
        })
    }

    /// Compute the threshold. With `smart` off, raw ratings are used
    /// without the baffle and amplifier divisors.
    pub fn threshold(&self, smart: bool) -> ThresholdReport {
        let constants = if smart {
            ThresholdConstants::default()
        } else {
            ThresholdConstants::unscaled()
        };
        let baffle_divisor = match self.baffle {
            BaffleType::Open => constants.open_baffle_divisor,
            BaffleType::Sealed => constants.sealed_baffle_divisor,
        };

        let speaker_voltage = (self.speaker_power / baffle_divisor * self.impedance).sqrt();
        let amplifier_voltage =
            (self.amplifier_power / constants.amplifier_divisor * self.impedance).sqrt();
        let speaker = engine::threshold(
            self.speaker_power,
            baffle_divisor,
            self.impedance,
            self.amplifier_gain,
            self.sensitivity,
        );
        let amplifier = engine::threshold(
            self.amplifier_power,
            constants.amplifier_divisor,
            self.impedance,
            self.amplifier_gain,
            self.sensitivity,
        );

        ThresholdReport {
            speaker_voltage: round(speaker_voltage, 2),
            amplifier_voltage: round(amplifier_voltage, 2),
            threshold: round_directional(engine::stricter(amplifier, speaker), 1),
        }
    }

    /// Engine input for this pair and a limiter device.
    pub fn calculation_input(&self, limiter_type: LimiterType) -> CalculationInput {
        CalculationInput {
            limiter_type,
            baffle_type: self.baffle,
            hp_power: self.speaker_power,
            impedance: self.impedance,
            ampli_power: self.amplifier_power,
            ampli_gain: self.amplifier_gain,
        }
    }
}

/// Amplifier gain in dB from input and output RMS voltages, to 0.01 dB.
pub fn amplifier_gain(voltage_in: f64, voltage_out: f64) -> f64 {
    round(20.0 * engine::log10(voltage_out / voltage_in), 2)
}
