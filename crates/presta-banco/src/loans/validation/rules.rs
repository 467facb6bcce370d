use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::bounds::NumericBounds;

pub const RUT_FORMAT: &str = "Formato inválido (ej: 12345678-9)";
pub const NAME_LENGTH: &str = "Debe tener entre 2 y 50 caracteres";
pub const PASSWORD_STRENGTH: &str =
    "La contraseña debe tener al menos 8 caracteres, una mayúscula y un número";
pub const EMAIL_FORMAT: &str = "Correo electrónico inválido";
pub const UNDERAGE: &str = "Debe ser mayor de 18 años";
pub const DATE_FORMAT: &str = "Fecha inválida (formato AAAA-MM-DD)";

pub const MINIMUM_AGE: i32 = 18;

static RUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{7,8}-[0-9kK]$").expect("rut pattern compiles"));

pub(crate) fn rut(raw: &str) -> String {
    if RUT_PATTERN.is_match(raw.trim()) {
        String::new()
    } else {
        RUT_FORMAT.to_string()
    }
}

pub(crate) fn person_name(raw: &str) -> String {
    let length = raw.trim().chars().count();
    if (2..=50).contains(&length) {
        String::new()
    } else {
        NAME_LENGTH.to_string()
    }
}

pub(crate) fn password(raw: &str) -> String {
    let long_enough = raw.chars().count() >= 8;
    let has_uppercase = raw.chars().any(char::is_uppercase);
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_uppercase && has_digit {
        String::new()
    } else {
        PASSWORD_STRENGTH.to_string()
    }
}

pub(crate) fn email(raw: &str) -> String {
    match raw.trim().split_once('@') {
        Some((_, domain)) if !domain.trim().is_empty() => String::new(),
        _ => EMAIL_FORMAT.to_string(),
    }
}

/// Whole years elapsed between `birth` and `today`; the current year only
/// counts once its month and day have been reached.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn date_of_birth(raw: &str, today: NaiveDate) -> String {
    match parse_date(raw) {
        Some(birth) if age_on(birth, today) >= MINIMUM_AGE => String::new(),
        Some(_) => UNDERAGE.to_string(),
        None => DATE_FORMAT.to_string(),
    }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub(crate) fn within(raw: &str, bounds: NumericBounds, message: impl FnOnce() -> String) -> String {
    match parse_number(raw) {
        Some(value) if bounds.contains(value) => String::new(),
        _ => message(),
    }
}

/// Like [`within`], but fractional values are rejected with the same message.
pub(crate) fn whole_within(
    raw: &str,
    bounds: NumericBounds,
    message: impl FnOnce() -> String,
) -> String {
    match parse_number(raw) {
        Some(value) if value.fract() == 0.0 && bounds.contains(value) => String::new(),
        _ => message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_waits_for_birthday() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_on(birth, date(2018, 6, 14)), 17);
        assert_eq!(age_on(birth, date(2018, 6, 15)), 18);
        assert_eq!(age_on(birth, date(2018, 12, 1)), 18);
    }

    #[test]
    fn rut_accepts_verifier_k() {
        assert_eq!(rut("1234567-k"), "");
        assert_eq!(rut("12345678-K"), "");
        assert_eq!(rut("123456789-1"), RUT_FORMAT);
        assert_eq!(rut("12.345.678-9"), RUT_FORMAT);
    }

    #[test]
    fn email_needs_domain_after_at() {
        assert_eq!(email("ana@prestabanco.cl"), "");
        assert_eq!(email("ana@"), EMAIL_FORMAT);
        assert_eq!(email("ana.prestabanco.cl"), EMAIL_FORMAT);
    }

    #[test]
    fn numbers_outside_bounds_or_garbage_fail() {
        let bounds = NumericBounds::new(1.0, 25.0);
        let message = || "fuera de rango".to_string();
        assert_eq!(within("25", bounds, message), "");
        assert_eq!(within("1", bounds, message), "");
        assert_eq!(within("25.5", bounds, message), "fuera de rango");
        assert_eq!(within("", bounds, message), "fuera de rango");
        assert_eq!(within("veinte", bounds, message), "fuera de rango");
        assert_eq!(within("NaN", bounds, message), "fuera de rango");
        assert_eq!(whole_within("25", bounds, message), "");
        assert_eq!(whole_within("12.5", bounds, message), "fuera de rango");
    }
}
