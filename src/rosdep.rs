// rosdep.rs -- tiered rosdep name resolution

use std::fs;
use std::path::Path;

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::exception::GenError;

/// Platform section consulted inside each rosdep record.
pub const TARGET_PLATFORM: &str = "gentoo";
/// Preferred package-manager subsection inside the platform section.
const PACKAGE_MANAGER: &str = "portage";

/// The rosdep table files, in resolution priority order.
const TIER_FILES: [&str; 3] = ["base.yaml", "python.yaml", "ruby.yaml"];

/// One priority tier of the rosdep database: a mapping from dependency name
/// to a per-platform resolution record.
pub struct Tier {
    name: String,
    table: Mapping,
}

impl Tier {
    pub fn new(name: &str, table: Mapping) -> Self {
        Tier {
            name: name.to_string(),
            table,
        }
    }

    pub fn from_yaml(name: &str, text: &str) -> Result<Self, GenError> {
        let table = serde_yaml::from_str(text).map_err(|e| GenError::TableLoad {
            path: name.to_string(),
            source: e,
        })?;
        Ok(Tier::new(name, table))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this tier has a record for `name` at all, usable or not.
    fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Decoded resolution for `name` on `platform`, if the record carries a
    /// usable entry for that platform.
    fn lookup(&self, name: &str, platform: &str) -> Option<String> {
        let record = self.table.get(name)?;
        let section = record.get(platform)?;
        decode_entry(section)
    }
}

/// Shared entry decoder for all tiers: a structured package-manager listing
/// wins over a bare value, and the first listed package is the canonical
/// resolution.
fn decode_entry(section: &Value) -> Option<String> {
    if let Some(packages) = section
        .get(PACKAGE_MANAGER)
        .and_then(|pm| pm.get("packages"))
        .and_then(Value::as_sequence)
    {
        return packages.first().and_then(Value::as_str).map(String::from);
    }
    match section {
        Value::Sequence(values) => values.first().and_then(Value::as_str).map(String::from),
        Value::String(value) => Some(value.clone()),
        _ => None,
    }
}

/// The loaded rosdep database: base, python and ruby tiers, consulted in
/// that order. Loaded once and immutable for the rest of the run.
pub struct RosdepIndex {
    tiers: Vec<Tier>,
}

impl RosdepIndex {
    pub fn new(tiers: Vec<Tier>) -> Self {
        RosdepIndex { tiers }
    }

    /// Load base.yaml, python.yaml and ruby.yaml from a local directory.
    pub fn load(dir: &Path) -> Result<Self, GenError> {
        let mut tiers = Vec::with_capacity(TIER_FILES.len());
        for file in TIER_FILES {
            let path = dir.join(file);
            let text = fs::read_to_string(&path)?;
            tiers.push(Tier::from_yaml(&path.display().to_string(), &text)?);
        }
        Ok(RosdepIndex::new(tiers))
    }

    /// Translate a ROS dependency name into a Gentoo package name.
    ///
    /// The first tier that has a record for the name decides the outcome; a
    /// record without a usable gentoo entry fails the resolution rather than
    /// falling through to a later tier.
    pub fn resolve(&self, name: &str) -> Result<String, GenError> {
        for tier in &self.tiers {
            if tier.contains(name) {
                return match tier.lookup(name, TARGET_PLATFORM) {
                    Some(resolved) => {
                        debug!("resolved {} -> {} ({} tier)", name, resolved, tier.name());
                        Ok(resolved)
                    }
                    None => Err(GenError::UnresolvedDependency(name.to_string())),
                };
            }
        }
        Err(GenError::UnresolvedDependency(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(name: &str, yaml: &str) -> Tier {
        Tier::from_yaml(name, yaml).unwrap()
    }

    fn index(base: &str, python: &str, ruby: &str) -> RosdepIndex {
        RosdepIndex::new(vec![
            tier("base", base),
            tier("python", python),
            tier("ruby", ruby),
        ])
    }

    #[test]
    fn test_structured_entry_preferred_over_bare() {
        let idx = index(
            r#"
tinyxml:
  gentoo:
    portage:
      packages: [dev-libs/tinyxml, dev-libs/tinyxml-compat]
"#,
            "{}",
            "{}",
        );
        assert_eq!(idx.resolve("tinyxml").unwrap(), "dev-libs/tinyxml");
    }

    #[test]
    fn test_bare_entry_fallback() {
        let idx = index(
            r#"
boost:
  gentoo: [dev-libs/boost]
"#,
            "{}",
            "{}",
        );
        assert_eq!(idx.resolve("boost").unwrap(), "dev-libs/boost");
    }

    #[test]
    fn test_tier_priority_order() {
        let idx = index(
            r#"
yaml:
  gentoo: [dev-libs/yaml-base]
"#,
            r#"
yaml:
  gentoo: [dev-python/pyyaml]
"#,
            "{}",
        );
        // base wins even though python also has the key
        assert_eq!(idx.resolve("yaml").unwrap(), "dev-libs/yaml-base");
    }

    #[test]
    fn test_later_tier_consulted_when_absent() {
        let idx = index(
            "{}",
            r#"
python-nose:
  gentoo:
    portage:
      packages: [dev-python/nose]
"#,
            r#"
rake:
  gentoo: [dev-ruby/rake]
"#,
        );
        assert_eq!(idx.resolve("python-nose").unwrap(), "dev-python/nose");
        assert_eq!(idx.resolve("rake").unwrap(), "dev-ruby/rake");
    }

    #[test]
    fn test_missing_platform_fails_without_fallthrough() {
        // base has the key but no gentoo section; python has a usable entry
        // for the same name. Resolution must still fail.
        let idx = index(
            r#"
ambiguous:
  debian: [libambiguous-dev]
"#,
            r#"
ambiguous:
  gentoo: [dev-libs/ambiguous]
"#,
            "{}",
        );
        assert!(matches!(
            idx.resolve("ambiguous"),
            Err(GenError::UnresolvedDependency(_))
        ));
    }

    #[test]
    fn test_absent_everywhere_is_unresolved() {
        let idx = index("{}", "{}", "{}");
        let err = idx.resolve("no-such-package").unwrap_err();
        assert_eq!(err.unresolved_name(), Some("no-such-package"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let idx = index(
            r#"
tinyxml:
  gentoo:
    portage:
      packages: [dev-libs/tinyxml]
  debian: [libtinyxml-dev]
"#,
            "{}",
            "{}",
        );
        let first = idx.resolve("tinyxml").unwrap();
        for _ in 0..3 {
            assert_eq!(idx.resolve("tinyxml").unwrap(), first);
        }
    }
}
