//! Slug derivation for business listings.
//!
//! Slugs are lowercase ASCII alphanumerics separated by single hyphens,
//! derived from the listing name. When the base slug is already taken the
//! caller appends a millisecond timestamp so two listings with the same name
//! still get distinct URLs.

use chrono::Utc;

/// Derive a URL-safe slug from a listing name.
///
/// Runs of non-alphanumeric characters collapse to one hyphen; leading and
/// trailing hyphens are dropped. Names with no usable characters fall back
/// to `"business"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("business");
    }
    slug
}

/// Slug variant used when the base slug is already taken.
pub fn with_timestamp_suffix(base: &str) -> String {
    format!("{}-{}", base, Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Rosa's Taqueria"), "rosa-s-taqueria");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("Bar  &  Grill on 5th"), "bar-grill-on-5th");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  --The Hideout!  "), "the-hideout");
    }

    #[test]
    fn falls_back_when_nothing_survives() {
        assert_eq!(slugify("???"), "business");
        assert_eq!(slugify(""), "business");
    }

    #[test]
    fn timestamp_suffix_extends_the_base() {
        let suffixed = with_timestamp_suffix("corner-cafe");
        assert!(suffixed.starts_with("corner-cafe-"));
        assert!(suffixed.len() > "corner-cafe-".len());
        assert!(suffixed["corner-cafe-".len()..].chars().all(|c| c.is_ascii_digit()));
    }
}
