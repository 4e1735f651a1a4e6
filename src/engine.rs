//! Limiter threshold calculation.
//!
//! Two driver-derived thresholds (open and sealed baffle) and one
//! amplifier-derived threshold are computed in dBu relative to the
//! amplifier gain. The stricter of driver and amplifier gives the raw dBu
//! limit; the DCX2496 family works from the same formulas shifted by a
//! fixed offset and per-output margins. Each limiter type then gets its own
//! rounding, and the requested one is reported.
//!
//! The engine is total: non-positive power or impedance propagates NaN or
//! negative infinity instead of failing.

use crate::config::ThresholdConstants;
use crate::rounding::round_directional;
use std::f64::consts::LN_10;
use std::fmt;

/// Limiter device whose threshold is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimiterType {
    /// Raw threshold in dBu.
    Dbu,
    /// t.racks DS 2/4 processor.
    TRacksDs24,
    /// Behringer DCX2496, sub output.
    Dcx2496Sub,
    /// Behringer DCX2496, top output.
    Dcx2496Top,
    /// Anything else; reports a threshold of 0.
    Unknown(String),
}

impl LimiterType {
    /// Parse a selector value. Matching is exact: no trimming, no case folding.
    pub fn parse(value: &str) -> Self {
        match value {
            "dBu" => Self::Dbu,
            "T.Racks DS2/4" => Self::TRacksDs24,
            "DCX2496 SUB" => Self::Dcx2496Sub,
            "DCX2496 Top" => Self::Dcx2496Top,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Selector text for this limiter type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dbu => "dBu",
            Self::TRacksDs24 => "T.Racks DS2/4",
            Self::Dcx2496Sub => "DCX2496 SUB",
            Self::Dcx2496Top => "DCX2496 Top",
            Self::Unknown(raw) => raw,
        }
    }

    /// Unit displayed next to the threshold.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Self::Dbu => " dBu",
            _ => " dB",
        }
    }
}

impl fmt::Display for LimiterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enclosure construction of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaffleType {
    /// Open baffle (`"ouverte"`).
    Open,
    /// Sealed enclosure; every other selector value.
    Sealed,
}

impl BaffleType {
    /// Parse a selector value. Only the exact string `"ouverte"` is open.
    pub fn parse(value: &str) -> Self {
        if value == "ouverte" {
            Self::Open
        } else {
            Self::Sealed
        }
    }
}

/// Inputs of one threshold calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInput {
    /// Which limiter threshold to report.
    pub limiter_type: LimiterType,
    /// Driver enclosure.
    pub baffle_type: BaffleType,
    /// Driver power rating in watts.
    pub hp_power: f64,
    /// Load impedance in ohms.
    pub impedance: f64,
    /// Amplifier power rating in watts.
    pub ampli_power: f64,
    /// Amplifier gain in dB.
    pub ampli_gain: f64,
}

impl CalculationInput {
    /// Start building an input; unset numbers are 0, unset selectors are
    /// an unknown limiter and a sealed baffle.
    pub fn builder() -> CalculationInputBuilder {
        CalculationInputBuilder::default()
    }
}

/// Builder for [`CalculationInput`].
#[derive(Debug, Clone, Default)]
pub struct CalculationInputBuilder {
    limiter_type: Option<LimiterType>,
    baffle_type: Option<BaffleType>,
    hp_power: f64,
    impedance: f64,
    ampli_power: f64,
    ampli_gain: f64,
}

impl CalculationInputBuilder {
    /// Set the limiter type.
    pub fn limiter_type(mut self, limiter_type: LimiterType) -> Self {
        self.limiter_type = Some(limiter_type);
        self
    }

    /// Set the baffle type.
    pub fn baffle_type(mut self, baffle_type: BaffleType) -> Self {
        self.baffle_type = Some(baffle_type);
        self
    }

    /// Set the driver power in watts.
    pub fn hp_power(mut self, watts: f64) -> Self {
        self.hp_power = watts;
        self
    }

    /// Set the load impedance in ohms.
    pub fn impedance(mut self, ohms: f64) -> Self {
        self.impedance = ohms;
        self
    }

    /// Set the amplifier power in watts.
    pub fn ampli_power(mut self, watts: f64) -> Self {
        self.ampli_power = watts;
        self
    }

    /// Set the amplifier gain in dB.
    pub fn ampli_gain(mut self, db: f64) -> Self {
        self.ampli_gain = db;
        self
    }

    /// Finish the input record.
    pub fn build(self) -> CalculationInput {
        CalculationInput {
            limiter_type: self
                .limiter_type
                .unwrap_or_else(|| LimiterType::Unknown(String::new())),
            baffle_type: self.baffle_type.unwrap_or(BaffleType::Sealed),
            hp_power: self.hp_power,
            impedance: self.impedance,
            ampli_power: self.ampli_power,
            ampli_gain: self.ampli_gain,
        }
    }
}

/// Result of one threshold calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutput {
    /// Selected threshold.
    pub limit_value: f64,
    /// `" dBu"` for the dBu limiter, `" dB"` otherwise.
    pub unit_label: &'static str,
}

/// Every intermediate value of a calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBreakdown {
    /// Driver threshold with the open-baffle divisor.
    pub driver_open: f64,
    /// Driver threshold with the sealed-baffle divisor.
    pub driver_sealed: f64,
    /// Driver threshold for the selected baffle.
    pub driver: f64,
    /// Amplifier threshold.
    pub amplifier: f64,
    /// Stricter of driver and amplifier, unrounded.
    pub dbu_limit: f64,
    /// Driver, offset family, sub margin.
    pub driver_offset_sub: f64,
    /// Driver, offset family, top margin.
    pub driver_offset_top: f64,
    /// Amplifier, offset family, sub margin.
    pub amplifier_offset_sub: f64,
    /// Amplifier, offset family, top margin.
    pub amplifier_offset_top: f64,
    /// Stricter sub value, unrounded.
    pub sub: f64,
    /// Stricter top value, unrounded.
    pub top: f64,
    /// Rounded dBu limiter threshold.
    pub limit_dbu: f64,
    /// Rounded T.Racks DS2/4 threshold.
    pub limit_t_racks: f64,
    /// Rounded DCX2496 sub threshold.
    pub limit_dcx2496_sub: f64,
    /// Rounded DCX2496 top threshold.
    pub limit_dcx2496_top: f64,
}

impl ThresholdBreakdown {
    /// Rounded threshold for a limiter type; 0 for unknown types.
    pub fn select(&self, limiter_type: &LimiterType) -> f64 {
        match limiter_type {
            LimiterType::Dbu => self.limit_dbu,
            LimiterType::TRacksDs24 => self.limit_t_racks,
            LimiterType::Dcx2496Sub => self.limit_dcx2496_sub,
            LimiterType::Dcx2496Top => self.limit_dcx2496_top,
            LimiterType::Unknown(_) => 0.0,
        }
    }
}

// ln-based so results match the published tables to the last bit.
pub(crate) fn log10(x: f64) -> f64 {
    x.ln() / LN_10
}

/// Level in dBu of the RMS voltage that `power / divisor` watts develop
/// across `impedance` ohms, minus the amplifier gain.
pub(crate) fn threshold(
    power: f64,
    divisor: f64,
    impedance: f64,
    gain: f64,
    sensitivity: f64,
) -> f64 {
    20.0 * log10((power / divisor * impedance).sqrt() / sensitivity) - gain
}

/// Stricter of two thresholds. A NaN on either side yields `amplifier`.
pub(crate) fn stricter(amplifier: f64, driver: f64) -> f64 {
    if amplifier > driver {
        driver
    } else {
        amplifier
    }
}

/// Compute every intermediate threshold.
pub fn breakdown(input: &CalculationInput, constants: &ThresholdConstants) -> ThresholdBreakdown {
    let th = |power: f64, divisor: f64| {
        threshold(
            power,
            divisor,
            input.impedance,
            input.ampli_gain,
            constants.sensitivity,
        )
    };
    let open = input.baffle_type == BaffleType::Open;

    let driver_open = th(input.hp_power, constants.open_baffle_divisor);
    let driver_sealed = th(input.hp_power, constants.sealed_baffle_divisor);
    let amplifier = th(input.ampli_power, constants.amplifier_divisor);
    let driver = if open { driver_open } else { driver_sealed };
    let dbu_limit = stricter(amplifier, driver);

    let driver_offset = if open {
        driver_open + constants.offset
    } else {
        driver_sealed + constants.offset
    };
    let driver_offset_sub = driver_offset + constants.sub_margin;
    let driver_offset_top = driver_offset + constants.top_margin;
    let amplifier_offset_sub = amplifier + constants.offset + constants.sub_margin;
    let amplifier_offset_top = amplifier + constants.offset + constants.top_margin;

    let sub = stricter(amplifier_offset_sub, driver_offset_sub);
    let top = stricter(amplifier_offset_top, driver_offset_top);

    ThresholdBreakdown {
        driver_open,
        driver_sealed,
        driver,
        amplifier,
        dbu_limit,
        driver_offset_sub,
        driver_offset_top,
        amplifier_offset_sub,
        amplifier_offset_top,
        sub,
        top,
        limit_dbu: round_directional(dbu_limit, 1),
        limit_t_racks: round_directional(dbu_limit - constants.t_racks_headroom, 0),
        limit_dcx2496_sub: round_directional(sub, 1),
        limit_dcx2496_top: round_directional(top, 1),
    }
}

/// Compute the threshold for `input` with explicit constants.
pub fn compute_with(input: &CalculationInput, constants: &ThresholdConstants) -> CalculationOutput {
    let limit_value = breakdown(input, constants).select(&input.limiter_type);
    if !limit_value.is_finite() {
        tracing::debug!(
            limiter = %input.limiter_type,
            impedance = input.impedance,
            "Non-finite threshold"
        );
    }
    CalculationOutput {
        limit_value,
        unit_label: input.limiter_type.unit_label(),
    }
}

/// Compute the threshold for `input`.
pub fn compute(input: &CalculationInput) -> CalculationOutput {
    compute_with(input, &ThresholdConstants::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn input(limiter: &str, baffle: &str) -> CalculationInput {
        CalculationInput {
            limiter_type: LimiterType::parse(limiter),
            baffle_type: BaffleType::parse(baffle),
            hp_power: 100.0,
            impedance: 8.0,
            ampli_power: 200.0,
            ampli_gain: 26.0,
        }
    }

    #[test]
    fn test_regression_fixture_matches_direct_formula() {
        let open = 20.0 * log10((100.0 / 1.5625 * 8.0_f64).sqrt() / 0.775) - 26.0;
        let amp = 20.0 * log10((200.0 / 2.0 * 8.0_f64).sqrt() / 0.775) - 26.0;
        let expected = round_directional(if amp > open { open } else { amp }, 1);

        let out = compute(&input("dBu", "ouverte"));
        assert_eq!(out.limit_value.to_bits(), expected.to_bits());
        assert_eq!(out.limit_value, 3.3);
        assert_eq!(out.unit_label, " dBu");
    }

    #[rstest]
    #[case("dBu", "ouverte", 3.3)]
    #[case("T.Racks DS2/4", "ouverte", 0.0)]
    #[case("DCX2496 SUB", "ouverte", -17.2)]
    #[case("DCX2496 Top", "ouverte", -15.0)]
    #[case("dBu", "close", 1.5)]
    #[case("T.Racks DS2/4", "close", -1.0)]
    #[case("DCX2496 SUB", "close", -19.0)]
    #[case("DCX2496 Top", "close", -16.8)]
    fn test_limiter_table(#[case] limiter: &str, #[case] baffle: &str, #[case] expected: f64) {
        assert_eq!(compute(&input(limiter, baffle)).limit_value, expected);
    }

    #[test]
    fn test_amplifier_bound_when_weaker() {
        // 1500 W sealed driver on a 1220 W amplifier at 8 ohm, 37.8 dB gain.
        let b = breakdown(
            &CalculationInput {
                limiter_type: LimiterType::Dbu,
                baffle_type: BaffleType::Sealed,
                hp_power: 1500.0,
                impedance: 8.0,
                ampli_power: 1220.0,
                ampli_gain: 37.8,
            },
            &ThresholdConstants::default(),
        );
        assert_eq!(b.dbu_limit, b.amplifier);
        assert_eq!(b.limit_dbu, 1.2);
        assert_eq!(b.limit_t_racks, -2.0);
        assert_eq!(b.limit_dcx2496_sub, -19.3);
        assert_eq!(b.limit_dcx2496_top, -17.0);
    }

    /// Threshold straight from the published formula, step by step.
    fn from_formula(input: &CalculationInput) -> f64 {
        let level = |power: f64, divisor: f64| {
            20.0 * log10((power / divisor * input.impedance).sqrt() / 0.775) - input.ampli_gain
        };
        let baffle_divisor = if input.baffle_type == BaffleType::Open {
            1.5625
        } else {
            2.34375
        };
        let driver = level(input.hp_power, baffle_divisor);
        let amp = level(input.ampli_power, 2.0);
        let min = |a: f64, b: f64| if a > b { b } else { a };
        match input.limiter_type {
            LimiterType::Dbu => round_directional(min(amp, driver), 1),
            LimiterType::TRacksDs24 => round_directional(min(amp, driver) - 2.5, 0),
            LimiterType::Dcx2496Sub => {
                round_directional(min(amp - 22.0 + 1.5, driver - 22.0 + 1.5), 1)
            },
            LimiterType::Dcx2496Top => {
                round_directional(min(amp - 22.0 + 3.75, driver - 22.0 + 3.75), 1)
            },
            LimiterType::Unknown(_) => 0.0,
        }
    }

    #[rstest]
    #[case(100.0, 2.0, 400.0, 20.0, "ouverte", true)]
    #[case(300.0, 4.0, 200.0, 26.0, "ouverte", false)]
    #[case(500.0, 8.0, 400.0, 32.0, "close", false)]
    #[case(250.0, 16.0, 1000.0, 37.8, "close", true)]
    #[case(1200.0, 4.0, 2000.0, 40.0, "ouverte", true)]
    #[case(80.0, 8.0, 50.0, 0.0, "close", false)]
    #[case(1500.0, 2.0, 600.0, 29.0, "ouverte", false)]
    #[case(60.0, 16.0, 120.0, 12.5, "close", true)]
    #[case(2.5, 4.0, 3000.0, -6.0, "ouverte", true)]
    fn test_compute_matches_formula(
        #[case] hp_power: f64,
        #[case] impedance: f64,
        #[case] ampli_power: f64,
        #[case] ampli_gain: f64,
        #[case] baffle: &str,
        #[case] driver_bound: bool,
        #[values(
            LimiterType::Dbu,
            LimiterType::TRacksDs24,
            LimiterType::Dcx2496Sub,
            LimiterType::Dcx2496Top
        )]
        limiter_type: LimiterType,
    ) {
        let input = CalculationInput {
            limiter_type,
            baffle_type: BaffleType::parse(baffle),
            hp_power,
            impedance,
            ampli_power,
            ampli_gain,
        };
        let out = compute(&input);
        assert!(out.limit_value.is_finite());
        assert_eq!(out.limit_value.to_bits(), from_formula(&input).to_bits());

        let b = breakdown(&input, &ThresholdConstants::default());
        let bound = if driver_bound { b.driver } else { b.amplifier };
        assert_eq!(b.dbu_limit, bound);
    }

    #[rstest]
    #[case("unknown-value")]
    #[case("dbu")]
    #[case(" dBu")]
    #[case("")]
    fn test_unknown_limiter_reports_zero(#[case] limiter: &str) {
        let out = compute(&input(limiter, "ouverte"));
        assert_eq!(out.limit_value, 0.0);
        assert_eq!(out.unit_label, " dB");
    }

    #[test]
    fn test_unit_label_only_for_dbu() {
        assert_eq!(LimiterType::Dbu.unit_label(), " dBu");
        for raw in ["T.Racks DS2/4", "DCX2496 SUB", "DCX2496 Top", "DBU"] {
            assert_eq!(LimiterType::parse(raw).unit_label(), " dB");
        }
    }

    #[test]
    fn test_baffle_exact_match() {
        assert_eq!(BaffleType::parse("ouverte"), BaffleType::Open);
        assert_eq!(BaffleType::parse("Ouverte"), BaffleType::Sealed);
        assert_eq!(BaffleType::parse(""), BaffleType::Sealed);
        assert_eq!(BaffleType::parse("fermée"), BaffleType::Sealed);
    }

    #[rstest]
    #[case("dBu")]
    #[case("T.Racks DS2/4")]
    #[case("DCX2496 SUB")]
    #[case("DCX2496 Top")]
    fn test_zero_impedance_propagates(#[case] limiter: &str) {
        let mut zero = input(limiter, "ouverte");
        zero.impedance = 0.0;
        let value = compute(&zero).limit_value;
        assert!(value.is_nan() || value == f64::NEG_INFINITY);
    }

    #[test]
    fn test_negative_power_propagates_nan() {
        let mut negative = input("dBu", "close");
        negative.hp_power = -10.0;
        negative.ampli_power = -10.0;
        assert!(compute(&negative).limit_value.is_nan());
    }

    #[test]
    fn test_repeatable_bit_for_bit() {
        let mut zero = input("DCX2496 Top", "ouverte");
        zero.ampli_power = 0.0;
        let a = compute(&zero).limit_value;
        let b = compute(&zero).limit_value;
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_builder_defaults() {
        let built = CalculationInput::builder().hp_power(100.0).build();
        assert_eq!(built.limiter_type, LimiterType::Unknown(String::new()));
        assert_eq!(built.baffle_type, BaffleType::Sealed);
        assert_eq!(built.impedance, 0.0);
        assert_eq!(
            CalculationInput::builder()
                .limiter_type(LimiterType::Dbu)
                .baffle_type(BaffleType::Open)
                .hp_power(100.0)
                .impedance(8.0)
                .ampli_power(200.0)
                .ampli_gain(26.0)
                .build(),
            input("dBu", "ouverte")
        );
    }
}
