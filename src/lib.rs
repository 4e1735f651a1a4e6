//! limitcalc - limiter thresholds for amplifier and loudspeaker protection.
//!
//! Given a driver power rating, load impedance, amplifier power and gain,
//! limitcalc computes the input level above which the driver or the
//! amplifier is at risk, expressed for a raw dBu limiter or for one of the
//! supported processors.
//!
//! # Features
//!
//! - Threshold engine with per-device rounding
//! - Direction-aware rounding primitives
//! - Locale display helpers and spreadsheet date serial decoding
//! - Form binding helpers (lenient number parsing, query-string pre-fill)
//! - Speaker/amplifier catalogs loaded from JSON
//! - Frequency, wavelength and travel-time converter
//!
//! # Example
//!
//! ```
//! use limitcalc::engine::{compute, BaffleType, CalculationInput, LimiterType};
//!
//! let input = CalculationInput::builder()
//!     .limiter_type(LimiterType::Dbu)
//!     .baffle_type(BaffleType::Open)
//!     .hp_power(100.0)
//!     .impedance(8.0)
//!     .ampli_power(200.0)
//!     .ampli_gain(26.0)
//!     .build();
//! let output = compute(&input);
//! assert_eq!(output.limit_value, 3.3);
//! assert_eq!(output.unit_label, " dBu");
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod binding;
pub mod catalog;
pub mod config;
pub mod converter;
pub mod engine;
pub mod error;
pub mod format;
pub mod navigation;
pub mod rounding;
pub mod serial_date;

pub use error::{LimitCalcError, Result};
