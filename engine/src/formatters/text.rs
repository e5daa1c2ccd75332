// Alphanumeric ("X") fields: uppercase ASCII letters, digits and spaces,
// left-justified and space-filled.
use super::raw_value;
use cnab_shared::FieldValue;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Strips diacritics (NFD, combining marks dropped), removes everything outside
/// `[A-Za-z0-9 ]` and uppercases. "Ação & Reação!" becomes "ACAO  REACAO".
pub fn clean_text(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn format_text(value: Option<&FieldValue>, width: usize) -> String {
    let Some(value) = raw_value(value) else {
        return " ".repeat(width);
    };

    let mut cleaned = clean_text(&value.to_string());
    // Only ASCII survives clean_text, so byte truncation is char-safe.
    cleaned.truncate(width);
    format!("{:<width$}", cleaned, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str, width: usize) -> String {
        format_text(Some(&FieldValue::text(s)), width)
    }

    #[test]
    fn test_strips_accents_uppercases_and_truncates() {
        assert_eq!(text("José da Silva", 10), "JOSE DA SI");
    }

    #[test]
    fn test_pads_with_spaces() {
        assert_eq!(text("COBRANCA", 15), "COBRANCA       ");
    }

    #[test]
    fn test_absent_and_empty_are_spaces() {
        assert_eq!(format_text(None, 5), "     ");
        assert_eq!(text("", 5), "     ");
    }

    #[test]
    fn test_removes_special_characters() {
        assert_eq!(text("Ação & Reação!", 20), "ACAO  REACAO        ");
        assert_eq!(text("PAULISTA S.A.", 15), "PAULISTA SA    ");
    }

    #[test]
    fn test_cedilla_and_tilde() {
        assert_eq!(text("Conceição São João", 18), "CONCEICAO SAO JOAO");
    }

    #[test]
    fn test_only_symbols_gives_spaces() {
        assert_eq!(text("@#$%", 4), "    ");
    }

    #[test]
    fn test_non_text_values_are_stringified() {
        assert_eq!(format_text(Some(&FieldValue::Integer(42)), 4), "42  ");
    }

    #[test]
    fn test_length_always_matches_width() {
        let long = "x".repeat(100);
        for width in [0usize, 1, 7, 40] {
            for input in ["", "abc", "Ünïcödé stråñgé", long.as_str()] {
                assert_eq!(text(input, width).len(), width, "input {:?} width {}", input, width);
            }
        }
    }
}
