// Numeric ("9") fields: digits only, right-justified, zero-filled.
use super::raw_value;
use cnab_shared::utils::brazilian_format::digits_only;
use cnab_shared::FieldValue;

/// Keeps the digits of the stringified value and left-pads them with zeros.
///
/// A value with more digits than `width` is returned whole; the caller
/// decides whether that overflow truncates or rejects the record.
pub fn format_numeric(value: Option<&FieldValue>, width: usize) -> String {
    let Some(value) = raw_value(value) else {
        return "0".repeat(width);
    };

    let digits = digits_only(&value.to_string());
    if digits.is_empty() {
        return "0".repeat(width);
    }
    format!("{:0>width$}", digits, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(s: &str, width: usize) -> String {
        format_numeric(Some(&FieldValue::text(s)), width)
    }

    #[test]
    fn test_pads_integers() {
        assert_eq!(format_numeric(Some(&FieldValue::Integer(123)), 6), "000123");
        assert_eq!(numeric("456", 8), "00000456");
    }

    #[test]
    fn test_discards_non_digits() {
        assert_eq!(numeric("12-34.56", 6), "123456");
        assert_eq!(numeric("ABC123DEF456", 10), "0000123456");
        assert_eq!(numeric("123.456.789-01", 14), "00012345678901");
    }

    #[test]
    fn test_absent_empty_and_digitless_are_zeros() {
        assert_eq!(format_numeric(None, 4), "0000");
        assert_eq!(numeric("", 4), "0000");
        assert_eq!(numeric("N/A", 4), "0000");
    }

    #[test]
    fn test_overflow_is_returned_whole() {
        assert_eq!(numeric("1234567", 4), "1234567");
    }
}
