//! Download filename for an exported resume.

const SUFFIX: &str = "_Resume.pdf";
const FALLBACK: &str = "resume.pdf";

/// `"Jane Q. Doe"` → `"Jane_Q._Doe_Resume.pdf"`; no usable name → `"resume.pdf"`.
///
/// Whitespace runs become a single underscore. Anything outside letters,
/// digits, `.`, `-` and `_` is dropped so the name is safe in a
/// `Content-Disposition` header and on any filesystem.
pub fn derive_filename(name: Option<&str>) -> String {
    let Some(name) = name else {
        return FALLBACK.to_string();
    };

    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    let sanitized: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');

    if sanitized.is_empty() {
        FALLBACK.to_string()
    } else {
        format!("{sanitized}{SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(derive_filename(Some("Jane Q. Doe")), "Jane_Q._Doe_Resume.pdf");
    }

    #[test]
    fn test_absent_name_uses_fallback() {
        assert_eq!(derive_filename(None), "resume.pdf");
    }

    #[test]
    fn test_blank_or_symbol_only_name_uses_fallback() {
        assert_eq!(derive_filename(Some("   ")), "resume.pdf");
        assert_eq!(derive_filename(Some("\"/\\")), "resume.pdf");
    }

    #[test]
    fn test_unsafe_characters_dropped() {
        assert_eq!(
            derive_filename(Some("  Ana \"Dev\" / Müller ")),
            "Ana_Dev__Müller_Resume.pdf"
        );
    }
}
