// license.rs -- upstream license string classification

use lazy_static::lazy_static;
use regex::Regex;

use crate::exception::GenError;

/// One recognized license family: an anchored, case-insensitive pattern with
/// an optional version capture, plus the id to emit when no version is
/// captured.
struct Family {
    pattern: Regex,
    prefix: &'static str,
    default: &'static str,
    versioned: bool,
}

impl Family {
    fn new(pattern: &str, prefix: &'static str, default: &'static str, versioned: bool) -> Self {
        Family {
            pattern: Regex::new(&format!("(?i){}", pattern)).unwrap(),
            prefix,
            default,
            versioned,
        }
    }
}

lazy_static! {
    // Order matters only for anchoring correctness; the anchored prefixes are
    // mutually exclusive. "Mozilla" renders as MPL, matching Gentoo's license
    // directory. The Creative Commons entry maps to a single fixed id no
    // matter what version text follows.
    static ref FAMILIES: Vec<Family> = vec![
        Family::new(r"^Apache(?:.*(1\.0|1\.1|2\.0|2))?", "Apache", "Apache-1.0", true),
        Family::new(r"^BSD(?:.*([1234]))?", "BSD", "BSD", true),
        Family::new(r"^GPL(?:.*([123]))?", "GPL", "GPL-1", true),
        Family::new(r"^LGPL(?:.*(2\.1|[23]))?", "LGPL", "LGPL-2", true),
        Family::new(r"^Mozilla(?:.*(1\.1))?", "MPL", "MPL-2.0", true),
        Family::new(r"^MIT", "MIT", "MIT", false),
        Family::new(r"^Creative Commons", "CC", "CC-BY-SA-3.0", false),
    ];
}

/// Normalize a free-text license declaration into a canonical identifier,
/// e.g. "BSD 3-Clause" -> "BSD-3", "Apache License 2.0" -> "Apache-2.0".
pub fn classify(text: &str) -> Result<String, GenError> {
    let text = text.trim();
    for family in FAMILIES.iter() {
        if let Some(caps) = family.pattern.captures(text) {
            if family.versioned {
                if let Some(ver) = caps.get(1) {
                    return Ok(format!("{}-{}", family.prefix, ver.as_str()));
                }
            }
            return Ok(family.default.to_string());
        }
    }
    Err(GenError::UnknownLicense(text.to_string()))
}

/// Classify a comma-separated license declaration member by member. Any
/// member failing fails the whole list.
pub fn classify_all(text: &str) -> Result<Vec<String>, GenError> {
    text.split(',').map(classify).collect()
}

/// Render classified ids as an ebuild LICENSE value: a lone id bare, several
/// as a parenthesized group.
pub fn license_value(ids: &[String]) -> String {
    match ids {
        [single] => single.clone(),
        many => format!("( {} )", many.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_families() {
        assert_eq!(classify("BSD").unwrap(), "BSD");
        assert_eq!(classify("MIT").unwrap(), "MIT");
        assert_eq!(classify("GPL").unwrap(), "GPL-1");
        assert_eq!(classify("LGPL").unwrap(), "LGPL-2");
        assert_eq!(classify("Mozilla").unwrap(), "MPL-2.0");
        assert_eq!(classify("Apache").unwrap(), "Apache-1.0");
    }

    #[test]
    fn test_versioned_families() {
        assert_eq!(classify("BSD 2-Clause").unwrap(), "BSD-2");
        assert_eq!(classify("BSD 3-Clause").unwrap(), "BSD-3");
        assert_eq!(classify("Apache 2.0").unwrap(), "Apache-2.0");
        assert_eq!(classify("Apache License 1.1").unwrap(), "Apache-1.1");
        assert_eq!(classify("GPLv3").unwrap(), "GPL-3");
        assert_eq!(classify("LGPL v2.1").unwrap(), "LGPL-2.1");
        assert_eq!(classify("Mozilla Public License 1.1").unwrap(), "MPL-1.1");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("bsd").unwrap(), "BSD");
        assert_eq!(classify("apache 2.0").unwrap(), "Apache-2.0");
        assert_eq!(classify("mit").unwrap(), "MIT");
    }

    #[test]
    fn test_creative_commons_fixed_id() {
        assert_eq!(classify("Creative Commons").unwrap(), "CC-BY-SA-3.0");
        assert_eq!(
            classify("Creative Commons Attribution 4.0").unwrap(),
            "CC-BY-SA-3.0"
        );
        // Anything not starting with a family name must fail; the old
        // catch-all Creative Commons pattern classified these.
        assert!(matches!(
            classify("Foo-Proprietary"),
            Err(GenError::UnknownLicense(_))
        ));
    }

    #[test]
    fn test_idempotent_over_family_names() {
        for text in ["BSD 3-Clause", "Apache 2.0", "GPLv2", "LGPL-2.1", "MIT"] {
            let id = classify(text).unwrap();
            let family = id.split('-').next().unwrap();
            let again = classify(family).unwrap();
            assert!(again.starts_with(family), "{} -> {} -> {}", text, id, again);
        }
    }

    #[test]
    fn test_multi_license_group() {
        let ids = classify_all("BSD,MIT").unwrap();
        assert_eq!(ids, vec!["BSD".to_string(), "MIT".to_string()]);
        assert_eq!(license_value(&ids), "( BSD MIT )");
    }

    #[test]
    fn test_multi_license_whole_group_fails() {
        assert!(matches!(
            classify_all("BSD,Foo-Proprietary"),
            Err(GenError::UnknownLicense(_))
        ));
    }

    #[test]
    fn test_single_license_value_is_bare() {
        let ids = classify_all("BSD 3-Clause").unwrap();
        assert_eq!(license_value(&ids), "BSD-3");
    }
}
