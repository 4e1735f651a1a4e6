//! Configuration constants for threshold computation and display.

/// Constants of the threshold formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConstants {
    /// Reference voltage for 0 dBu.
    pub sensitivity: f64,
    /// Power divisor for a driver in an open baffle.
    pub open_baffle_divisor: f64,
    /// Power divisor for a driver in a sealed baffle.
    pub sealed_baffle_divisor: f64,
    /// Power divisor applied to the amplifier rating.
    pub amplifier_divisor: f64,
    /// Offset shared by the DCX2496 family, in dB.
    pub offset: f64,
    /// Margin added for the DCX2496 sub output.
    pub sub_margin: f64,
    /// Margin added for the DCX2496 top output.
    pub top_margin: f64,
    /// Headroom removed for the T.Racks DS2/4.
    pub t_racks_headroom: f64,
}

impl Default for ThresholdConstants {
    fn default() -> Self {
        Self {
            sensitivity: 0.775,
            open_baffle_divisor: 1.5625,
            sealed_baffle_divisor: 2.34375,
            amplifier_divisor: 2.0,
            offset: -22.0,
            sub_margin: 1.5,
            top_margin: 3.75,
            t_racks_headroom: 2.5,
        }
    }
}

impl ThresholdConstants {
    /// Constants with every power divisor at 1 (raw ratings, no smart limit).
    pub fn unscaled() -> Self {
        Self {
            open_baffle_divisor: 1.0,
            sealed_baffle_divisor: 1.0,
            amplifier_divisor: 1.0,
            ..Self::default()
        }
    }
}

/// Locale used by the display and date helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Locale {
    /// Decimal separator.
    pub decimal: char,
    /// Thousands separator.
    pub thousands: char,
    /// Abbreviated day names, Sunday first.
    pub day_names_short: [&'static str; 7],
    /// Full day names, Sunday first.
    pub day_names_long: [&'static str; 7],
    /// Abbreviated month names, January first.
    pub month_names_short: [&'static str; 12],
    /// Full month names, January first.
    pub month_names_long: [&'static str; 12],
    /// Literal strings referenced by date format codes 32 and up.
    pub literals: Vec<&'static str>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            decimal: '.',
            thousands: ' ',
            day_names_short: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
            day_names_long: [
                "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
            ],
            month_names_short: [
                "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.",
                "oct.", "nov.", "déc.",
            ],
            month_names_long: [
                "janvier",
                "février",
                "mars",
                "avril",
                "mai",
                "juin",
                "juillet",
                "août",
                "septembre",
                "octobre",
                "novembre",
                "décembre",
            ],
            literals: vec![":", "/", " "],
        }
    }
}

impl Locale {
    /// Default locale with a different decimal separator.
    pub fn with_decimal(decimal: char) -> Self {
        Self {
            decimal,
            ..Self::default()
        }
    }
}
