//! Free-text query classification

use super::PostalCode;
use regex::Regex;
use std::sync::LazyLock;

/// Something that looks like a postal code being typed: 5 digits, optional
/// dash, up to 3 more digits
static POSTAL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{0,3}$").expect("valid postal regex"));

/// What a search query should be routed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// A complete postal code; answered by the postal-code lookup
    PostalCode(PostalCode),
    /// Anything else; answered by place search with the raw query
    FreeText(String),
}

/// Classify a query by shape
pub fn classify_query(query: &str) -> QueryKind {
    if POSTAL_SHAPE.is_match(query) {
        if let Some(code) = PostalCode::parse(query) {
            return QueryKind::PostalCode(code);
        }
    }
    QueryKind::FreeText(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_postal_codes() {
        for q in ["14790000", "14790-000"] {
            match classify_query(q) {
                QueryKind::PostalCode(code) => assert_eq!(code.digits(), "14790000"),
                other => panic!("expected postal code for {q}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_partial_postal_code_is_free_text() {
        assert_eq!(
            classify_query("14790-0"),
            QueryKind::FreeText("14790-0".to_string())
        );
        assert_eq!(
            classify_query("14790"),
            QueryKind::FreeText("14790".to_string())
        );
    }

    #[test]
    fn test_names_are_free_text() {
        assert_eq!(
            classify_query("Ribeirão Preto"),
            QueryKind::FreeText("Ribeirão Preto".to_string())
        );
        // Eight digits buried in text don't count as a postal code
        assert!(matches!(classify_query("CEP 14790000"), QueryKind::FreeText(_)));
        assert!(matches!(classify_query("147900001"), QueryKind::FreeText(_)));
    }
}
