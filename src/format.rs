//! Locale display helpers for numeric form fields.
//!
//! Values are rendered with the shortest round-trip digits in the layout
//! browsers use for numbers (plain digits up to 21 integer digits, exponent
//! form below 1e-6), then adapted to the [`Locale`]. Non-finite values
//! render as `"NaN"`.

use crate::config::Locale;
use crate::rounding::round;

const NAN_TEXT: &str = "NaN";
const ZERO_PAD: &str = "00000000000000";

/// Shortest round-trip text of `x` in browser number layout.
pub fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return NAN_TEXT.to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", x.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits = even_on_tie(x.abs(), digits, exponent);
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let exp_sign = if n - 1 < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, exp_sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, exp_sign, (n - 1).abs())
        }
    };

    format!("{}{}", sign, body)
}

/// Add one in the last place; `None` on carry out of the first digit.
fn increment_digits(digits: &str) -> Option<String> {
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8(bytes).ok();
        }
    }
    None
}

/// Shortest digits of a positive finite `x`, taking the even last digit
/// when `x` lies exactly halfway between two shortest candidates.
fn even_on_tie(x: f64, digits: String, exponent: i32) -> String {
    // 800 fractional digits cover the longest exact expansion of an f64
    let exact = format!("{:.800e}", x);
    let Some((mantissa, exact_exponent)) = exact.split_once('e') else {
        return digits;
    };
    if exact_exponent.parse::<i32>().ok() != Some(exponent) {
        return digits;
    }
    let exact: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len();
    let (head, tail) = exact.split_at(k.min(exact.len()));
    if tail.trim_end_matches('0') != "5" {
        return digits;
    }
    let candidate = if head.as_bytes()[k - 1] % 2 == 0 {
        head.to_string()
    } else {
        match increment_digits(head) {
            Some(up) => up,
            None => return digits,
        }
    };
    if candidate == digits {
        return digits;
    }
    let text = format!("{}.{}e{}", &candidate[..1], &candidate[1..], exponent);
    if text.parse::<f64>() == Ok(x) {
        candidate
    } else {
        digits
    }
}

/// True when the fraction shows floating-point noise (seven 0s or 9s).
fn has_float_noise(text: &str) -> bool {
    match text.split_once('.') {
        Some((_, frac)) => frac.contains("0000000") || frac.contains("9999999"),
        None => false,
    }
}

fn localize(text: &str, locale: &Locale) -> String {
    text.replace('.', &locale.decimal.to_string())
}

/// Pad or cut a fraction to exactly `nd` digits (at most 14 of padding).
fn fixed_fraction(frac: &str, nd: i32) -> String {
    let padded = format!("{}{}", frac, ZERO_PAD);
    padded.chars().take(nd.max(0) as usize).collect()
}

/// Display a value with all significant digits.
pub fn display_float(x: f64, locale: &Locale) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    let mut text = number_to_string(x);
    if has_float_noise(&text) {
        text = number_to_string(round(x, 8));
    }
    localize(&text, locale)
}

fn display_fixed(x: f64, nd: i32, locale: &Locale, group: bool) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    let rounded = round(x, nd);
    let text = number_to_string(rounded);
    if nd <= 0 {
        return if group {
            insert_thousands(&text, locale)
        } else {
            text
        };
    }
    if text.contains('e') || text.contains('E') {
        return text;
    }
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let int_part = if group {
        insert_thousands(int_part, locale)
    } else {
        int_part.to_string()
    };
    // A missing fraction is padded from nothing, capped at the pad width.
    let decimals = if frac_part.is_empty() {
        ZERO_PAD.chars().take(nd as usize).collect()
    } else {
        fixed_fraction(frac_part, nd)
    };
    format!("{}{}{}", int_part, locale.decimal, decimals)
}

/// Display a value rounded to `nd` places with a fixed-width fraction.
pub fn display_float_nd(x: f64, nd: i32, locale: &Locale) -> String {
    display_fixed(x, nd, locale, false)
}

/// Like [`display_float_nd`] with thousands grouping.
pub fn display_float_nd_th(x: f64, nd: i32, locale: &Locale) -> String {
    display_fixed(x, nd, locale, true)
}

/// Display a ratio as a percentage.
pub fn display_percent(x: f64, locale: &Locale) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    format!("{}%", display_float(x * 100.0, locale))
}

/// Display a ratio as a percentage with `nd` fraction digits.
pub fn display_percent_nd(x: f64, nd: i32, locale: &Locale) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    format!("{}%", display_float_nd(x * 100.0, nd, locale))
}

/// Like [`display_percent_nd`] with thousands grouping.
pub fn display_percent_nd_th(x: f64, nd: i32, locale: &Locale) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    format!("{}%", display_float_nd_th(x * 100.0, nd, locale))
}

/// Display in exponent form with `nd` fraction digits, e.g. `1.50e+3`.
pub fn display_scientific(x: f64, nd: usize, locale: &Locale) -> String {
    if !x.is_finite() {
        return NAN_TEXT.to_string();
    }
    let sci = format!("{:.*e}", nd, x);
    let text = match sci.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{}e{}", mantissa, exp),
        Some((mantissa, exp)) => format!("{}e+{}", mantissa, exp),
        None => sci,
    };
    localize(&text, locale)
}

/// Group the digits of an integer string by three.
pub fn insert_thousands(whole: &str, locale: &Locale) -> String {
    if whole.is_empty() || whole.contains('e') {
        return whole.to_string();
    }
    let (minus, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(locale.thousands);
        }
        grouped.push(c);
    }
    format!("{}{}", minus, grouped.chars().rev().collect::<String>())
}
