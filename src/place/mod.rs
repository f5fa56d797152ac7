//! Place records
//!
//! The canonical `{city, state, postalCode, neighborhood?}` record every
//! component produces, plus postal-code normalization and query classification.

pub mod query;
pub mod state;

pub use query::{classify_query, QueryKind};
pub use state::{abbreviate_state, candidate_state};

use crate::constants::place::{POSTAL_CODE_DIGITS, REGION_SENTINEL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Municipality name
    pub city: String,
    /// Two-letter region code
    pub state: String,
    /// Dashed 8-digit postal code, or the region sentinel
    pub postal_code: String,
    /// District, when the source supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
}

impl Place {
    /// Create a place with a normalized postal code
    ///
    /// Anything that isn't a complete postal code becomes the region sentinel.
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: Option<&str>,
        neighborhood: Option<String>,
    ) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            postal_code: normalize_postal_code(postal_code),
            neighborhood: neighborhood.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Whether this place can be accepted as the current location
    pub fn is_valid(&self) -> bool {
        !self.city.trim().is_empty()
            && !self.state.trim().is_empty()
            && (self.postal_code.is_empty()
                || self.postal_code == REGION_SENTINEL
                || PostalCode::parse_strict(&self.postal_code).is_some())
    }

    /// The exact postal code, if this place has one
    pub fn exact_postal_code(&self) -> Option<PostalCode> {
        PostalCode::parse_strict(&self.postal_code)
    }

    /// Key used to collapse search results that name the same area
    pub fn area_key(&self) -> (&str, &str) {
        (&self.city, &self.state)
    }

    /// Short "City, ST" label
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }

    /// Postal code line as shown under the label
    pub fn postal_label(&self) -> String {
        match self.exact_postal_code() {
            Some(code) => format!("CEP: {}", code),
            None => "Região".to_string(),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if let Some(neighborhood) = &self.neighborhood {
            write!(f, " ({})", neighborhood)?;
        }
        write!(f, " - {}", self.postal_label())
    }
}

/// A complete 8-digit postal code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostalCode([u8; POSTAL_CODE_DIGITS]);

impl PostalCode {
    /// Parse any input by keeping only its digits
    ///
    /// Returns None unless exactly 8 digits remain.
    pub fn parse(input: &str) -> Option<Self> {
        let digits: Vec<u8> = input.bytes().filter(u8::is_ascii_digit).collect();
        let digits: [u8; POSTAL_CODE_DIGITS] = digits.try_into().ok()?;
        Some(Self(digits))
    }

    /// Parse only `NNNNNNNN` or `NNNNN-NNN`
    fn parse_strict(input: &str) -> Option<Self> {
        let bytes = input.as_bytes();
        let shaped = match bytes.len() {
            8 => bytes.iter().all(u8::is_ascii_digit),
            9 => {
                bytes[5] == b'-'
                    && bytes[..5].iter().all(u8::is_ascii_digit)
                    && bytes[6..].iter().all(u8::is_ascii_digit)
            }
            _ => false,
        };
        if shaped {
            Self::parse(input)
        } else {
            None
        }
    }

    /// The bare digits, as sent to the postal-code service
    pub fn digits(&self) -> String {
        self.0.iter().map(|&b| b as char).collect()
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits();
        write!(f, "{}-{}", &digits[..5], &digits[5..])
    }
}

/// Normalize a raw postal code from any provider
pub fn normalize_postal_code(raw: Option<&str>) -> String {
    raw.and_then(PostalCode::parse)
        .map(|code| code.to_string())
        .unwrap_or_else(|| REGION_SENTINEL.to_string())
}

/// Drop later results naming the same `(city, state)`, keeping provider order
pub fn dedup_by_area(places: Vec<Place>) -> Vec<Place> {
    let mut kept: Vec<Place> = Vec::with_capacity(places.len());
    for place in places {
        if !kept.iter().any(|k| k.area_key() == place.area_key()) {
            kept.push(place);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(city: &str, state: &str) -> Place {
        Place::new(city, state, None, None)
    }

    #[test]
    fn test_postal_code_parse() {
        let code = PostalCode::parse("14790-000").unwrap();
        assert_eq!(code.digits(), "14790000");
        assert_eq!(code.to_string(), "14790-000");

        assert_eq!(PostalCode::parse("14790000"), Some(code));
        assert_eq!(PostalCode::parse(" 14.790-000 "), Some(code));
    }

    #[test]
    fn test_postal_code_wrong_length() {
        assert!(PostalCode::parse("").is_none());
        assert!(PostalCode::parse("1479").is_none());
        assert!(PostalCode::parse("14790-00").is_none());
        assert!(PostalCode::parse("147900001").is_none());
    }

    #[test]
    fn test_normalize_postal_code() {
        assert_eq!(normalize_postal_code(Some("14790000")), "14790-000");
        assert_eq!(normalize_postal_code(Some("14790")), "Geral");
        assert_eq!(normalize_postal_code(None), "Geral");
    }

    #[test]
    fn test_place_validity() {
        assert!(Place::new("Guaíra", "SP", Some("14790-000"), None).is_valid());
        assert!(place("Guaíra", "SP").is_valid());
        assert!(!place("", "SP").is_valid());
        assert!(!place("Guaíra", " ").is_valid());

        let mut partial = place("Guaíra", "SP");
        partial.postal_code = "1479".to_string();
        assert!(!partial.is_valid());

        partial.postal_code = String::new();
        assert!(partial.is_valid());
    }

    #[test]
    fn test_blank_neighborhood_dropped() {
        let p = Place::new("Guaíra", "SP", None, Some("  ".to_string()));
        assert!(p.neighborhood.is_none());
    }

    #[test]
    fn test_labels() {
        let exact = Place::new("Guaíra", "SP", Some("14790000"), Some("Centro".to_string()));
        assert_eq!(exact.label(), "Guaíra, SP");
        assert_eq!(exact.postal_label(), "CEP: 14790-000");
        assert_eq!(exact.to_string(), "Guaíra, SP (Centro) - CEP: 14790-000");

        assert_eq!(place("Barretos", "SP").postal_label(), "Região");
    }

    #[test]
    fn test_serde_shape() {
        let p = Place::new("Guaíra", "SP", Some("14790000"), None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["postalCode"], "14790-000");
        assert!(json.get("neighborhood").is_none());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut village = place("Ribeirão Preto", "SP");
        village.neighborhood = Some("Vila Virgínia".to_string());
        let places = vec![
            village.clone(),
            place("Ribeirão Preto", "SP"),
            place("Ribeirão Preto", "MG"),
            place("Cravinhos", "SP"),
        ];

        let deduped = dedup_by_area(places);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0], village);
        assert_eq!(deduped[1].state, "MG");
        assert_eq!(deduped[2].city, "Cravinhos");
    }
}
