//! Validation rules for submitted printer data.
//!
//! All functions here are pure: they inspect already-received form data and
//! either accept it or return a [`ValidationError`] whose `Display` output is
//! safe to show to the user.

use std::net::IpAddr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::types::{PrinterField, PrinterInput};

/// Date-only layouts, tried in order. Numeric forms are month-first with a
/// day-first fallback for values that cannot be month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
];

/// Layouts for dates written with a two-digit year, tried after every
/// four-digit layout has failed. Years 69-99 map to 19xx, the rest to 20xx.
const TWO_DIGIT_YEAR_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d %b %y",
    "%b %d, %y",
    "%b %d %y",
];

/// Month and year without a day. The input is parsed with ` 1` appended,
/// so these resolve to the first of the month.
const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y %d", "%m/%Y %d", "%Y-%m %d"];

/// `%Y` reads one to four digits; anything earlier than this came from a
/// short year matched against a four-digit layout.
const MIN_FOUR_DIGIT_YEAR: i32 = 1000;

/// Date-time layouts; the time part is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A rejected printer field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("Field '{field}' cannot be empty.")]
    MissingField { field: PrinterField },

    /// The IP address is not valid IPv4 or IPv6.
    #[error("Invalid IP address for 'ip_address' - {value}")]
    InvalidIp { value: String },

    /// The manufacture date could not be parsed.
    #[error("Invalid date format for 'manufacture_date' - {value}")]
    InvalidDate { value: String },

    /// A field exceeds its column width.
    #[error("Field '{field}' must be at most {max} characters.")]
    TooLong { field: PrinterField, max: usize },
}

impl ValidationError {
    /// The field this error refers to.
    #[must_use]
    pub const fn field(&self) -> PrinterField {
        match self {
            Self::MissingField { field } | Self::TooLong { field, .. } => *field,
            Self::InvalidIp { .. } => PrinterField::IpAddress,
            Self::InvalidDate { .. } => PrinterField::ManufactureDate,
        }
    }
}

/// Check that every named field is present and not blank after trimming.
///
/// The first offending field, in the order given, is reported.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` naming the first missing field.
pub fn validate_required_fields(
    data: &PrinterInput,
    fields: &[PrinterField],
) -> Result<(), ValidationError> {
    match fields
        .iter()
        .find(|field| data.get(**field).is_none_or(|v| v.trim().is_empty()))
    {
        Some(field) => Err(ValidationError::MissingField { field: *field }),
        None => Ok(()),
    }
}

/// Check that a value is an IPv4 or IPv6 address in standard notation.
///
/// # Errors
///
/// Returns `ValidationError::InvalidIp` carrying the raw value.
pub fn validate_ip_address(value: &str) -> Result<IpAddr, ValidationError> {
    value
        .parse::<IpAddr>()
        .map_err(|_| ValidationError::InvalidIp {
            value: value.to_owned(),
        })
}

/// Parse a manufacture date from flexible textual input.
///
/// Accepts ISO dates, slashed/dashed/dotted numeric dates, month-name forms
/// (`Jan 5, 2021`, `5 January 2021`), date-times, RFC 3339 and RFC 2822.
/// Two-digit years (`1/5/21`) and month-year forms (`January 2021`) are
/// accepted as well; the latter resolve to the first of the month.
/// The returned date displays as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidDate` carrying the raw value.
pub fn parse_manufacture_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidDate {
        value: value.to_owned(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .filter(has_four_digit_year)
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| {
                    NaiveDateTime::parse_from_str(trimmed, fmt)
                        .ok()
                        .map(|dt| dt.date())
                        .filter(has_four_digit_year)
                })
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            DateTime::parse_from_rfc2822(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            let first_of_month = format!("{trimmed} 1");
            MONTH_YEAR_FORMATS
                .iter()
                .find_map(|fmt| {
                    NaiveDate::parse_from_str(&first_of_month, fmt)
                        .ok()
                        .filter(has_four_digit_year)
                })
        })
        .or_else(|| {
            TWO_DIGIT_YEAR_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        })
        .ok_or_else(invalid)
}

fn has_four_digit_year(date: &NaiveDate) -> bool {
    date.year() >= MIN_FOUR_DIGIT_YEAR
}

/// Check that no bounded field exceeds its column width.
///
/// # Errors
///
/// Returns `ValidationError::TooLong` for the first field over its limit.
pub fn validate_max_lengths(data: &PrinterInput) -> Result<(), ValidationError> {
    for field in PrinterField::REQUIRED {
        let (Some(max), Some(value)) = (field.max_length(), data.get(field)) else {
            continue;
        };
        if value.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_input() -> PrinterInput {
        PrinterInput {
            brand: Some("HP".to_owned()),
            model: Some("LaserJet".to_owned()),
            location: Some("Room 1".to_owned()),
            ip_address: Some("10.0.0.5".to_owned()),
            mac_address: Some("00:11:22:33:44:55".to_owned()),
            manufacture_date: Some("2020-01-01".to_owned()),
            comments: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_required_fields_accept_complete_input() {
        assert!(validate_required_fields(&complete_input(), &PrinterField::REQUIRED).is_ok());
    }

    #[test]
    fn test_required_fields_report_absent_field() {
        let input = PrinterInput {
            location: None,
            ..complete_input()
        };
        let err = validate_required_fields(&input, &PrinterField::REQUIRED).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: PrinterField::Location
            }
        );
        assert_eq!(err.to_string(), "Field 'location' cannot be empty.");
    }

    #[test]
    fn test_required_fields_treat_whitespace_as_blank() {
        let input = PrinterInput {
            mac_address: Some(" \t ".to_owned()),
            ..complete_input()
        };
        let err = validate_required_fields(&input, &PrinterField::REQUIRED).unwrap_err();
        assert_eq!(err.field(), PrinterField::MacAddress);
    }

    #[test]
    fn test_required_fields_report_first_in_order() {
        let input = PrinterInput {
            model: None,
            ip_address: None,
            ..complete_input()
        };
        let err = validate_required_fields(&input, &PrinterField::REQUIRED).unwrap_err();
        assert_eq!(err.field(), PrinterField::Model);
    }

    #[test]
    fn test_comments_are_not_required() {
        let input = PrinterInput {
            comments: None,
            ..complete_input()
        };
        assert!(validate_required_fields(&input, &PrinterField::REQUIRED).is_ok());
    }

    #[test]
    fn test_ip_address_accepts_v4_and_v6() {
        assert!(validate_ip_address("10.0.0.5").is_ok());
        assert!(validate_ip_address("192.168.1.1").is_ok());
        assert!(validate_ip_address("::1").is_ok());
        assert!(validate_ip_address("2001:db8::8a2e:370:7334").is_ok());
    }

    #[test]
    fn test_ip_address_rejects_garbage() {
        for bad in ["not-an-ip", "999.999.999.999", "10.0.0", "", "10.0.0.5 "] {
            let err = validate_ip_address(bad).unwrap_err();
            assert_eq!(err.field(), PrinterField::IpAddress, "input {bad:?}");
        }
    }

    #[test]
    fn test_invalid_ip_message_names_field_and_value() {
        let err = validate_ip_address("999.999.999.999").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ip_address"));
        assert!(message.contains("999.999.999.999"));
    }

    #[test]
    fn test_parse_iso_date() {
        let date = parse_manufacture_date("2020-01-01").unwrap();
        assert_eq!(date, ymd(2020, 1, 1));
        assert_eq!(date.to_string(), "2020-01-01");
    }

    #[test]
    fn test_parse_flexible_dates() {
        assert_eq!(parse_manufacture_date("2021/06/20").unwrap(), ymd(2021, 6, 20));
        assert_eq!(parse_manufacture_date("06/20/2021").unwrap(), ymd(2021, 6, 20));
        assert_eq!(parse_manufacture_date("Jan 5, 2021").unwrap(), ymd(2021, 1, 5));
        assert_eq!(parse_manufacture_date("January 5 2021").unwrap(), ymd(2021, 1, 5));
        assert_eq!(parse_manufacture_date("5 January 2021").unwrap(), ymd(2021, 1, 5));
        assert_eq!(parse_manufacture_date("  2025-06-21  ").unwrap(), ymd(2025, 6, 21));
    }

    #[test]
    fn test_parse_ambiguous_numeric_date_is_month_first() {
        assert_eq!(parse_manufacture_date("01/02/2020").unwrap(), ymd(2020, 1, 2));
    }

    #[test]
    fn test_parse_day_first_fallback() {
        assert_eq!(parse_manufacture_date("25/12/2020").unwrap(), ymd(2020, 12, 25));
    }

    #[test]
    fn test_parse_two_digit_years() {
        assert_eq!(parse_manufacture_date("1/5/21").unwrap(), ymd(2021, 1, 5));
        assert_eq!(parse_manufacture_date("01/05/99").unwrap(), ymd(1999, 1, 5));
        assert_eq!(parse_manufacture_date("5 Jan 21").unwrap(), ymd(2021, 1, 5));
        assert_eq!(parse_manufacture_date("25/12/20").unwrap(), ymd(2020, 12, 25));
    }

    #[test]
    fn test_parse_month_and_year() {
        assert_eq!(parse_manufacture_date("January 2021").unwrap(), ymd(2021, 1, 1));
        assert_eq!(parse_manufacture_date("06/2021").unwrap(), ymd(2021, 6, 1));
        assert_eq!(parse_manufacture_date("2021-06").unwrap(), ymd(2021, 6, 1));
    }

    #[test]
    fn test_parse_never_yields_first_millennium_years() {
        for input in ["1/5/21", "01/05/99", "5 Jan 21", "January 2021", "21-1-5"] {
            if let Ok(date) = parse_manufacture_date(input) {
                assert!(date.year() >= 1000, "{input:?} parsed as {date}");
            }
        }
    }

    #[test]
    fn test_parse_datetime_keeps_date() {
        assert_eq!(
            parse_manufacture_date("2020-01-01 13:45:00").unwrap(),
            ymd(2020, 1, 1)
        );
        assert_eq!(
            parse_manufacture_date("2020-01-01T13:45:00+02:00").unwrap(),
            ymd(2020, 1, 1)
        );
    }

    #[test]
    fn test_parse_rejects_unparseable_dates() {
        for bad in ["not-a-date", "", "   ", "2020-13-01", "2020-02-30"] {
            let err = parse_manufacture_date(bad).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidDate {
                    value: bad.to_owned()
                }
            );
        }
    }

    #[test]
    fn test_invalid_date_message_names_field_and_value() {
        let err = parse_manufacture_date("not-a-date").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid date format for 'manufacture_date' - not-a-date"
        );
    }

    #[test]
    fn test_max_lengths() {
        assert!(validate_max_lengths(&complete_input()).is_ok());

        let input = PrinterInput {
            mac_address: Some("00:11:22:33:44:55:66".to_owned()),
            ..complete_input()
        };
        assert_eq!(
            validate_max_lengths(&input).unwrap_err(),
            ValidationError::TooLong {
                field: PrinterField::MacAddress,
                max: 17
            }
        );
    }
}
