//! Form binding: raw control values in, engine input out.
//!
//! Text fields are parsed leniently (comma or dot decimals, trailing units
//! ignored, garbage becomes 0), selector values may carry a type prefix, and
//! a page can be pre-filled from its query string.

use crate::config::Locale;
use crate::engine::{BaffleType, CalculationInput, CalculationOutput, LimiterType};
use crate::format::display_float;
use std::borrow::Cow;

/// Limiter selector field.
pub const FIELD_LIMITER: &str = "xlew_3_3_2";
/// Baffle selector field.
pub const FIELD_BAFFLE: &str = "xlew_3_4_2";
/// Driver power field.
pub const FIELD_HP: &str = "hp";
/// Impedance field.
pub const FIELD_IMPEDANCE: &str = "impedance";
/// Amplifier power field.
pub const FIELD_AMPLI: &str = "ampli";
/// Amplifier gain field.
pub const FIELD_GAIN: &str = "gain";

/// Length of the longest decimal-number prefix of `s`.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if mantissa_digits > 0 || j > frac_start {
            mantissa_digits += j - frac_start;
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Parse the leading number of `text`, or NaN when there is none.
fn parse_leading_float(text: &str) -> f64 {
    let s = text.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }
    let len = numeric_prefix_len(s);
    if len == 0 {
        return f64::NAN;
    }
    s[..len].parse().unwrap_or(f64::NAN)
}

/// Parse a numeric text field; comma or dot decimals, 0 when unparseable.
pub fn parse_number(text: &str) -> f64 {
    let normalized = text.replace(',', ".");
    let value = parse_leading_float(&normalized);
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Value of a selector control, unpacked from its `type:value` encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DropdownValue {
    /// `b:` prefix.
    Bool(bool),
    /// `n:` prefix; NaN when the payload is not a number.
    Number(f64),
    /// `s:` prefix, or any value without a known prefix.
    Text(String),
}

impl DropdownValue {
    /// Unpack a raw selector value such as `n:100` or `s:ouverte`.
    pub fn unpack(raw: &str) -> Self {
        if let Some(data) = raw.strip_prefix("b:") {
            Self::Bool(data.to_lowercase() == "true")
        } else if let Some(data) = raw.strip_prefix("n:") {
            Self::Number(parse_leading_float(data))
        } else if let Some(data) = raw.strip_prefix("s:") {
            Self::Text(data.to_string())
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Text form, as compared against selector strings.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Number(n) => Cow::Owned(crate::format::number_to_string(*n)),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Split a query string into decoded `(key, value)` pairs, in order.
///
/// A pair without `=` has an empty value; in `a=b=c` the value is `b`.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }
    let decode = |s: &str| {
        urlencoding::decode(s)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| s.to_string())
    };
    query
        .split('&')
        .map(|pair| {
            // Only the text up to a second `=` is the value.
            let mut parts = pair.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            (decode(key), decode(value))
        })
        .collect()
}

/// Raw control values of one form, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    fields: Vec<(String, String)>,
}

impl FormValues {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`FormValues::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite fields from a query string; unknown keys are ignored.
    ///
    /// Returns the number of fields changed.
    pub fn prefill(&mut self, query: &str) -> usize {
        let mut applied = 0;
        for (key, value) in parse_query_string(query) {
            if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
                applied += 1;
            }
        }
        tracing::debug!(applied, "Pre-filled form from query string");
        applied
    }

    fn selector(&self, key: &str) -> String {
        self.get(key)
            .map(|raw| DropdownValue::unpack(raw).as_text().into_owned())
            .unwrap_or_default()
    }

    fn number(&self, key: &str) -> f64 {
        self.get(key).map_or(0.0, parse_number)
    }

    /// Build the engine input; missing numbers read as 0.
    pub fn to_input(&self) -> CalculationInput {
        CalculationInput {
            limiter_type: LimiterType::parse(&self.selector(FIELD_LIMITER)),
            baffle_type: BaffleType::parse(&self.selector(FIELD_BAFFLE)),
            hp_power: self.number(FIELD_HP),
            impedance: self.number(FIELD_IMPEDANCE),
            ampli_power: self.number(FIELD_AMPLI),
            ampli_gain: self.number(FIELD_GAIN),
        }
    }
}

/// Display text for the threshold field and its unit label.
pub fn render_output(output: &CalculationOutput, locale: &Locale) -> (String, String) {
    (
        display_float(output.limit_value, locale),
        output.unit_label.to_string(),
    )
}
