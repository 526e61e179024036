// metadata_xml.rs -- companion metadata.xml generation

use crate::distro::ReleasePackage;
use crate::pkg_xml::Manifest;

/// The Gentoo metadata.xml companion record: long description plus upstream
/// maintainer contact. Fields the manifest does not carry keep documented
/// placeholder values.
#[derive(Debug, Clone)]
pub struct MetadataXml {
    pub long_description: String,
    pub upstream_name: String,
    pub upstream_email: String,
    pub bug_url: Option<String>,
}

impl Default for MetadataXml {
    fn default() -> Self {
        MetadataXml {
            long_description: "NONE".to_string(),
            upstream_name: "UNKNOWN".to_string(),
            upstream_email: "UNKNOWN".to_string(),
            bug_url: None,
        }
    }
}

impl MetadataXml {
    /// Fill from the parsed package manifest and release record; absent
    /// fields keep their defaults.
    pub fn from_manifest(manifest: &Manifest, release: &ReleasePackage) -> Self {
        let mut metadata = MetadataXml::default();
        if let Some(description) = &manifest.description {
            metadata.long_description = description.clone();
        }
        if let Some(name) = &manifest.maintainer_name {
            metadata.upstream_name = name.clone();
        }
        if let Some(email) = &manifest.maintainer_email {
            metadata.upstream_email = email.clone();
        }
        metadata.bug_url = release.bug_url();
        metadata
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(
            "<!DOCTYPE pkgmetadata SYSTEM \"http://www.gentoo.org/dtd/metadata.dtd\">\n",
        );
        out.push_str("<pkgmetadata>\n");
        out.push_str("\t<upstream>\n");
        out.push_str("\t\t<maintainer status=\"unknown\">\n");
        out.push_str(&format!("\t\t\t<email>{}</email>\n", self.upstream_email));
        out.push_str(&format!("\t\t\t<name>{}</name>\n", self.upstream_name));
        out.push_str("\t\t</maintainer>\n");
        if let Some(bug_url) = &self.bug_url {
            out.push_str(&format!("\t\t<bugs-to>{}</bugs-to>\n", bug_url));
        }
        out.push_str("\t</upstream>\n");
        out.push_str(&format!(
            "\t<longdescription>{}</longdescription>\n",
            self.long_description
        ));
        out.push_str("</pkgmetadata>\n");
        out
    }
}
