// Helpers for the Brazilian number conventions found in remittance spreadsheets.
pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Strips whitespace and the "R$" currency literal, then, when a comma is
    /// present, treats dots as thousand separators and the comma as the decimal
    /// separator. Without a comma the text is left in dot-decimal form.
    pub fn normalize_decimal(s: &str) -> String {
        let cleaned: String = s
            .replace("R$", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if cleaned.contains(',') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned
        }
    }

    // Parses amounts like "1.234,56", "R$ 99,90" or "1500.00" into a Decimal
    pub fn parse_decimal(s: &str) -> Result<Decimal> {
        let normalized = normalize_decimal(s);
        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))
    }

    /// Keeps only ASCII digits ("12.345.678/0001-90" -> "12345678000190").
    pub fn digits_only(s: &str) -> String {
        s.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_decimal_simple() {
            assert_eq!(parse_decimal("123,45").unwrap(), Decimal::new(12345, 2));
        }

        #[test]
        fn test_parse_decimal_with_thousands() {
            assert_eq!(parse_decimal("1.234,56").unwrap(), Decimal::new(123456, 2));
        }

        #[test]
        fn test_parse_decimal_dot_separator() {
            assert_eq!(parse_decimal("1500.00").unwrap(), Decimal::new(150000, 2));
        }

        #[test]
        fn test_parse_decimal_currency_literal() {
            assert_eq!(parse_decimal(" R$ 99,90 ").unwrap(), Decimal::new(9990, 2));
        }

        #[test]
        fn test_parse_decimal_garbage() {
            assert!(parse_decimal("abc").is_err());
            assert!(parse_decimal("").is_err());
        }

        #[test]
        fn test_digits_only() {
            assert_eq!(digits_only("12.345.678/0001-90"), "12345678000190");
            assert_eq!(digits_only("no digits"), "");
        }
    }
}
