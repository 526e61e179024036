// pkg_xml.rs -- ROS package.xml field extraction

use log::warn;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::exception::GenError;

/// The package.xml fields the generator cares about. Every field is
/// optional; absent fields are recovered with documented defaults at the
/// point of use, never treated as fatal.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Manifest {
    pub description: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub maintainer_name: Option<String>,
    pub maintainer_email: Option<String>,
}

/// Parse a package.xml document using the quick-xml event API.
///
/// Multiple `<license>` elements are joined with commas so the whole
/// declaration can go through the comma-splitting classifier. Only a `<url>`
/// of type `website` (or with no type attribute) sets the homepage, and only
/// the first `<maintainer>` is kept.
pub fn parse_manifest(xml: &str) -> Result<Manifest, GenError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut manifest = Manifest::default();
    let mut licenses: Vec<String> = Vec::new();
    let mut buf = Vec::new();
    let mut current_tag = String::new();
    let mut depth: u32 = 0;
    let mut url_is_website = false;
    let mut pending_email: Option<String> = None;
    let mut maintainer_seen = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                current_tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();

                // only top-level package children matter; export sections can
                // nest identically named tags
                if depth != 2 {
                    current_tag.clear();
                } else if current_tag == "url" {
                    let url_type = e
                        .try_get_attribute("type")
                        .map_err(|err| GenError::BadManifest(err.to_string()))?
                        .map(|attr| attr.unescape_value().unwrap_or_default().into_owned());
                    url_is_website = match url_type.as_deref() {
                        None | Some("website") => true,
                        _ => false,
                    };
                } else if current_tag == "maintainer" {
                    pending_email = e
                        .try_get_attribute("email")
                        .map_err(|err| GenError::BadManifest(err.to_string()))?
                        .map(|attr| attr.unescape_value().unwrap_or_default().into_owned());
                }
            }
            Ok(Event::Empty(ref e)) => {
                // self-closing spelling; a <maintainer email=".."/> still
                // contributes its email, with the name recovered as UNKNOWN
                // downstream
                let tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                if depth == 1 && tag == "maintainer" && !maintainer_seen {
                    maintainer_seen = true;
                    manifest.maintainer_email = e
                        .try_get_attribute("email")
                        .map_err(|err| GenError::BadManifest(err.to_string()))?
                        .map(|attr| attr.unescape_value().unwrap_or_default().into_owned());
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.xml_content().unwrap_or_default().trim().to_string();
                match current_tag.as_str() {
                    _ if text.is_empty() => {}
                    "description" if manifest.description.is_none() => {
                        manifest.description = Some(text);
                    }
                    "license" => licenses.push(text),
                    "url" if url_is_website && manifest.homepage.is_none() => {
                        manifest.homepage = Some(text);
                    }
                    "maintainer" if !maintainer_seen => {
                        maintainer_seen = true;
                        manifest.maintainer_name = Some(text);
                        manifest.maintainer_email = pending_email.take();
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                current_tag.clear();
                url_is_website = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GenError::BadManifest(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    // a maintainer tag with an email but no inner text still counts
    if !maintainer_seen && pending_email.is_some() {
        manifest.maintainer_email = pending_email;
    }

    if manifest.description.is_none() {
        warn!("package.xml carries no description");
    }
    if !licenses.is_empty() {
        manifest.license = Some(licenses.join(","));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"<?xml version="1.0"?>
<package format="2">
  <name>roscpp</name>
  <version>1.13.5</version>
  <description>C++ implementation of ROS.</description>
  <maintainer email="dev@example.org">Jane Developer</maintainer>
  <license>BSD</license>
  <url type="website">https://wiki.ros.org/roscpp</url>
  <url type="bugtracker">https://github.com/ros/ros_comm/issues</url>
</package>
"#;

    #[test]
    fn test_parse_full_manifest() {
        let m = parse_manifest(FULL).unwrap();
        assert_eq!(m.description.as_deref(), Some("C++ implementation of ROS."));
        assert_eq!(m.license.as_deref(), Some("BSD"));
        assert_eq!(m.homepage.as_deref(), Some("https://wiki.ros.org/roscpp"));
        assert_eq!(m.maintainer_name.as_deref(), Some("Jane Developer"));
        assert_eq!(m.maintainer_email.as_deref(), Some("dev@example.org"));
    }

    #[test]
    fn test_multiple_licenses_joined() {
        let xml = r#"<package>
  <name>p</name>
  <license>BSD</license>
  <license>MIT</license>
</package>"#;
        let m = parse_manifest(xml).unwrap();
        assert_eq!(m.license.as_deref(), Some("BSD,MIT"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let m = parse_manifest("<package><name>p</name></package>").unwrap();
        assert!(m.description.is_none());
        assert!(m.license.is_none());
        assert!(m.homepage.is_none());
        assert!(m.maintainer_name.is_none());
    }

    #[test]
    fn test_bugtracker_url_does_not_set_homepage() {
        let xml = r#"<package>
  <name>p</name>
  <url type="bugtracker">https://example.org/issues</url>
</package>"#;
        let m = parse_manifest(xml).unwrap();
        assert!(m.homepage.is_none());
    }

    #[test]
    fn test_first_maintainer_wins() {
        let xml = r#"<package>
  <name>p</name>
  <maintainer email="a@example.org">First</maintainer>
  <maintainer email="b@example.org">Second</maintainer>
</package>"#;
        let m = parse_manifest(xml).unwrap();
        assert_eq!(m.maintainer_name.as_deref(), Some("First"));
        assert_eq!(m.maintainer_email.as_deref(), Some("a@example.org"));
    }

    #[test]
    fn test_self_closing_maintainer_keeps_email() {
        let xml = r#"<package>
  <name>p</name>
  <maintainer email="bot@example.org"/>
</package>"#;
        let m = parse_manifest(xml).unwrap();
        assert!(m.maintainer_name.is_none());
        assert_eq!(m.maintainer_email.as_deref(), Some("bot@example.org"));
    }

    #[test]
    fn test_self_closing_maintainer_wins_over_later_ones() {
        let xml = r#"<package>
  <name>p</name>
  <maintainer email="first@example.org"/>
  <maintainer email="second@example.org">Second</maintainer>
</package>"#;
        let m = parse_manifest(xml).unwrap();
        assert!(m.maintainer_name.is_none());
        assert_eq!(m.maintainer_email.as_deref(), Some("first@example.org"));
    }

    #[test]
    fn test_malformed_xml_is_bad_manifest() {
        assert!(matches!(
            parse_manifest("<package><unclosed></package>"),
            Err(GenError::BadManifest(_))
        ));
    }
}
