//! Region code abbreviation

use crate::constants::place::COUNTRY_SENTINEL;

/// Brazilian federative units by full name
const STATES: &[(&str, &str)] = &[
    ("Acre", "AC"),
    ("Alagoas", "AL"),
    ("Amapá", "AP"),
    ("Amazonas", "AM"),
    ("Bahia", "BA"),
    ("Ceará", "CE"),
    ("Distrito Federal", "DF"),
    ("Espírito Santo", "ES"),
    ("Goiás", "GO"),
    ("Maranhão", "MA"),
    ("Mato Grosso", "MT"),
    ("Mato Grosso do Sul", "MS"),
    ("Minas Gerais", "MG"),
    ("Pará", "PA"),
    ("Paraíba", "PB"),
    ("Paraná", "PR"),
    ("Pernambuco", "PE"),
    ("Piauí", "PI"),
    ("Rio de Janeiro", "RJ"),
    ("Rio Grande do Norte", "RN"),
    ("Rio Grande do Sul", "RS"),
    ("Rondônia", "RO"),
    ("Roraima", "RR"),
    ("Santa Catarina", "SC"),
    ("São Paulo", "SP"),
    ("Sergipe", "SE"),
    ("Tocantins", "TO"),
];

/// Best-effort two-letter region code
///
/// Tries, in order: an explicit state code, an ISO 3166-2 subdivision
/// (`BR-SP`), a known state name, then the first two letters of the name.
/// None when the source carries no region at all.
pub fn abbreviate_state(
    state_code: Option<&str>,
    iso_subdivision: Option<&str>,
    state_name: Option<&str>,
) -> Option<String> {
    fn non_empty(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    if let Some(code) = non_empty(state_code) {
        return Some(code.to_uppercase());
    }

    if let Some(iso) = non_empty(iso_subdivision) {
        if let Some((_, sub)) = iso.split_once('-') {
            if !sub.is_empty() {
                return Some(sub.to_uppercase());
            }
        }
    }

    if let Some(name) = non_empty(state_name) {
        if let Some((_, code)) = STATES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            return Some((*code).to_string());
        }
        return Some(name.chars().take(2).collect::<String>().to_uppercase());
    }

    None
}

/// Region code for a search candidate, falling back to the country sentinel
pub fn candidate_state(
    state_code: Option<&str>,
    iso_subdivision: Option<&str>,
    state_name: Option<&str>,
) -> String {
    abbreviate_state(state_code, iso_subdivision, state_name)
        .unwrap_or_else(|| COUNTRY_SENTINEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_code_wins() {
        assert_eq!(
            abbreviate_state(Some("sp"), Some("BR-MG"), Some("Bahia")).as_deref(),
            Some("SP")
        );
    }

    #[test]
    fn test_iso_subdivision() {
        assert_eq!(
            abbreviate_state(None, Some("BR-MG"), Some("Minas Gerais")).as_deref(),
            Some("MG")
        );
    }

    #[test]
    fn test_known_state_name() {
        assert_eq!(candidate_state(None, None, Some("São Paulo")), "SP");
        assert_eq!(candidate_state(None, None, Some("mato grosso do sul")), "MS");
    }

    #[test]
    fn test_unknown_name_takes_prefix() {
        assert_eq!(candidate_state(None, None, Some("Buenos Aires")), "BU");
    }

    #[test]
    fn test_nothing_gives_country() {
        assert_eq!(abbreviate_state(None, None, None), None);
        assert_eq!(candidate_state(None, None, None), "BR");
        assert_eq!(candidate_state(Some(""), Some(" "), None), "BR");
    }
}
