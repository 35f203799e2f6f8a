//! Sanitizers for free-text public input and slug generation
//!
//! Whatever reaches the database from an anonymous caller goes through
//! these first: markup-significant characters are stripped, control
//! characters collapsed, and a maximum length enforced.

const NAME_MAX_CHARS: usize = 80;
const COMMENT_MAX_CHARS: usize = 1000;
const PHONE_MAX_CHARS: usize = 32;

/// Characters stripped from free text before storage
fn is_markup_char(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '\'' | '`' | '\\' | '&')
}

fn clean_text(input: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(input.len().min(max_chars));
    let mut last_was_space = true; // swallow leading whitespace

    for c in input.chars() {
        if is_markup_char(c) {
            continue;
        }
        // Control characters (including newlines and tabs) collapse into
        // a single space, as do whitespace runs
        if c.is_control() || c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        out.push(c);
        last_was_space = false;
    }

    let trimmed = out.trim_end();
    trimmed.chars().take(max_chars).collect()
}

/// Sanitize a visitor-supplied display name
pub fn sanitize_name(input: &str) -> String {
    clean_text(input, NAME_MAX_CHARS)
}

/// Sanitize a review comment (longer limit than names)
pub fn sanitize_comment(input: &str) -> String {
    clean_text(input, COMMENT_MAX_CHARS)
}

/// Sanitize a phone number: keep digits and common separators only
pub fn sanitize_phone(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        .take(PHONE_MAX_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Turn an arbitrary display name into a URL slug.
///
/// Turkish diacritics transliterate to their ASCII equivalents; any other
/// non-alphanumeric run becomes a single hyphen. Idempotent.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_hyphen = true; // swallow leading hyphens

    for c in input.chars() {
        let mapped: Option<char> = match c {
            'ç' | 'Ç' => Some('c'),
            'ğ' | 'Ğ' => Some('g'),
            'ı' | 'I' | 'İ' => Some('i'),
            'ö' | 'Ö' => Some('o'),
            'ş' | 'Ş' => Some('s'),
            'ü' | 'Ü' => Some('u'),
            _ => {
                let lower = c.to_ascii_lowercase();
                if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                    Some(lower)
                } else {
                    None
                }
            }
        };

        match mapped {
            Some(c) => {
                out.push(c);
                last_was_hyphen = false;
            }
            None => {
                if !last_was_hyphen {
                    out.push('-');
                    last_was_hyphen = true;
                }
            }
        }
    }

    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_markup() {
        assert_eq!(sanitize_name("<script>alert(1)</script>"), "scriptalert(1)/script");
        assert_eq!(sanitize_name("  Ayşe  Yılmaz  "), "Ayşe Yılmaz");
        assert_eq!(sanitize_name("a\"b'c`d\\e"), "abcde");
    }

    #[test]
    fn test_sanitize_name_collapses_control_chars() {
        assert_eq!(sanitize_name("a\x00b\x07c"), "a b c");
        assert_eq!(sanitize_name("line1\nline2"), "line1 line2");
    }

    #[test]
    fn test_sanitize_name_enforces_max_length() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_name(&long).chars().count(), 80);
    }

    #[test]
    fn test_sanitize_comment_allows_more_than_name() {
        let long = "y".repeat(2000);
        assert_eq!(sanitize_comment(&long).chars().count(), 1000);
    }

    #[test]
    fn test_sanitize_phone() {
        assert_eq!(sanitize_phone("+90 (532) 123-45-67"), "+90 (532) 123-45-67");
        assert_eq!(sanitize_phone("abc555def1234"), "5551234");
    }

    #[test]
    fn test_slugify_turkish_transliteration() {
        assert_eq!(slugify("Kozbeyli Konağı"), "kozbeyli-konagi");
        assert_eq!(slugify("Çiğ Köfte Dürüm"), "cig-kofte-durum");
        assert_eq!(slugify("İstanbul Şubesi"), "istanbul-subesi");
        assert_eq!(slugify("Gözleme & Ayran"), "gozleme-ayran");
    }

    #[test]
    fn test_slugify_idempotent() {
        for input in [
            "Kozbeyli Konağı",
            "  --Hello-- World!! ",
            "already-a-slug",
            "ÜÖÇŞİĞI",
            "",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "slugify not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_slugify_collapses_symbol_runs() {
        assert_eq!(slugify("a !@# b"), "a-b");
        assert_eq!(slugify("--lead-and-trail--"), "lead-and-trail");
    }
}
