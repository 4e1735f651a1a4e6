//! Acoustic unit converter: frequency, wavelength and travel time in air.
//!
//! Distances are rounded to 0.01 m, times to 0.001 s, frequencies and the
//! speed of sound are truncated to whole units.

use crate::rounding::round;

/// Speed of sound (m/s) in air at `temperature` degrees Celsius.
pub fn speed_of_sound(temperature: f64) -> f64 {
    (331.3 + temperature * 0.606).trunc()
}

/// Wavelength (m) of `frequency` Hz at speed of sound `c`.
pub fn wavelength(frequency: f64, c: f64) -> f64 {
    round(c / frequency, 2)
}

/// Time (s) for sound to travel `distance` metres at speed `c`.
pub fn travel_time(distance: f64, c: f64) -> f64 {
    round(distance / c, 3)
}

/// Frequency (Hz) whose period is `time` seconds.
pub fn period_frequency(time: f64) -> f64 {
    (1.0 / time).trunc()
}

/// One consistent set of converted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Speed of sound used (m/s).
    pub speed_of_sound: f64,
    /// Frequency (Hz).
    pub frequency: f64,
    /// Wavelength or distance (m).
    pub distance: f64,
    /// Period or travel time (s).
    pub time: f64,
}

impl Conversion {
    /// Convert from a distance. `None` when `distance` is zero or not finite.
    pub fn from_distance(distance: f64, c: f64) -> Option<Self> {
        if distance == 0.0 || !distance.is_finite() {
            return None;
        }
        let time = travel_time(distance, c);
        Some(Self {
            speed_of_sound: c,
            frequency: period_frequency(time),
            distance,
            time,
        })
    }

    /// Convert from a time. `None` when `time` is zero or not finite.
    pub fn from_time(time: f64, c: f64) -> Option<Self> {
        if time == 0.0 || !time.is_finite() {
            return None;
        }
        let frequency = period_frequency(time);
        Some(Self {
            speed_of_sound: c,
            frequency,
            distance: wavelength(frequency, c),
            time,
        })
    }

    /// Convert from a frequency, truncated to whole hertz first.
    /// `None` when that leaves zero or the value is not finite.
    pub fn from_frequency(frequency: f64, c: f64) -> Option<Self> {
        let frequency = frequency.trunc();
        if frequency == 0.0 || !frequency.is_finite() {
            return None;
        }
        let distance = wavelength(frequency, c);
        Some(Self {
            speed_of_sound: c,
            frequency,
            distance,
            time: travel_time(distance, c),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(20.0, 343.0)]
    #[case(0.0, 331.0)]
    #[case(-10.0, 325.0)]
    #[case(35.5, 352.0)]
    fn test_speed_of_sound(#[case] temperature: f64, #[case] expected: f64) {
        assert_eq!(speed_of_sound(temperature), expected);
    }

    #[test]
    fn test_single_conversions() {
        assert_eq!(wavelength(100.0, 343.0), 3.43);
        assert_eq!(wavelength(1000.0, 343.0), 0.34);
        assert_eq!(travel_time(1.0, 343.0), 0.003);
        assert_eq!(travel_time(0.34, 343.0), 0.001);
        assert_eq!(period_frequency(0.003), 333.0);
        assert_eq!(period_frequency(0.01), 100.0);
    }

    #[test]
    fn test_from_distance() {
        let conv = Conversion::from_distance(1.0, 343.0).unwrap();
        assert_eq!(conv.time, 0.003);
        assert_eq!(conv.frequency, 333.0);
        assert_eq!(conv.distance, 1.0);
    }

    #[test]
    fn test_from_time() {
        let conv = Conversion::from_time(0.01, 343.0).unwrap();
        assert_eq!(conv.frequency, 100.0);
        assert_eq!(conv.distance, 3.43);
    }

    #[test]
    fn test_from_frequency_truncates() {
        let conv = Conversion::from_frequency(1000.9, 343.0).unwrap();
        assert_eq!(conv.frequency, 1000.0);
        assert_eq!(conv.distance, 0.34);
        assert_eq!(conv.time, 0.001);
    }

    #[test]
    fn test_zero_source_clears() {
        assert_eq!(Conversion::from_distance(0.0, 343.0), None);
        assert_eq!(Conversion::from_time(0.0, 343.0), None);
        assert_eq!(Conversion::from_frequency(0.4, 343.0), None);
        assert_eq!(Conversion::from_time(f64::NAN, 343.0), None);
    }
}
