// ebuild.rs -- ebuild text assembly

use std::fmt;

use chrono::{Datelike, Utc};
use phf::phf_set;

use crate::exception::GenError;
use crate::license;
use crate::rosdep::RosdepIndex;

/// Packages with hand-maintained phase overrides in the generated ebuild.
static SPECIAL_PKGS: phf::Set<&'static str> = phf_set! {
    "catkin",
    "opencv3",
    "stage",
};

/// One KEYWORDS token: the bare arch when stable, "~arch" when testing.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub arch: String,
    pub stable: bool,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.stable {
            write!(f, "{}", self.arch)
        } else {
            write!(f, "~{}", self.arch)
        }
    }
}

/// Everything needed to render one ebuild. Dependencies are split into
/// internal (satisfied inside the ros-{distro} namespace) and external
/// (translated through the rosdep index at render time).
#[derive(Debug)]
pub struct Ebuild {
    pub name: String,
    pub distro: String,
    pub eapi: u32,
    pub description: String,
    pub homepage: String,
    pub src_uri: String,
    pub upstream_license: String,
    pub has_patches: bool,
    keywords: Vec<Keyword>,
    rdepends: Vec<String>,
    rdepends_external: Vec<String>,
    depends: Vec<String>,
    depends_external: Vec<String>,
    unresolved: Vec<String>,
}

impl Ebuild {
    pub fn new(name: &str, distro: &str) -> Self {
        Ebuild {
            name: name.to_string(),
            distro: distro.to_string(),
            eapi: 6,
            description: "NONE".to_string(),
            homepage: "https://wiki.ros.org".to_string(),
            src_uri: String::new(),
            upstream_license: "LGPL-2".to_string(),
            has_patches: false,
            keywords: Vec::new(),
            rdepends: Vec::new(),
            rdepends_external: Vec::new(),
            depends: Vec::new(),
            depends_external: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    pub fn add_keyword(&mut self, arch: &str, stable: bool) {
        self.keywords.push(Keyword {
            arch: arch.to_string(),
            stable,
        });
    }

    pub fn add_run_depend(&mut self, depend: &str, internal: bool) {
        if internal {
            self.rdepends.push(depend.to_string());
        } else {
            self.rdepends_external.push(depend.to_string());
        }
    }

    /// Build deps already covered by the run-dep blocks are skipped, since
    /// DEPEND inherits ${RDEPEND}.
    pub fn add_build_depend(&mut self, depend: &str, internal: bool) {
        if self.rdepends.iter().any(|d| d == depend) {
            return;
        }
        if self.rdepends_external.iter().any(|d| d == depend) {
            return;
        }
        if internal {
            self.depends.push(depend.to_string());
        } else {
            self.depends_external.push(depend.to_string());
        }
    }

    /// Dependency names that failed resolution during the last `text` call.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    fn resolve_into(&mut self, deps: &[String], index: &RosdepIndex, out: &mut String) {
        let mut sorted: Vec<&String> = deps.iter().collect();
        sorted.sort();
        for dep in sorted {
            match index.resolve(dep) {
                Ok(resolved) => {
                    out.push('\t');
                    out.push_str(&resolved);
                    out.push('\n');
                }
                Err(_) => {
                    if !self.unresolved.iter().any(|d| d == dep) {
                        self.unresolved.push(dep.clone());
                    }
                }
            }
        }
    }

    fn internal_block(&self, deps: &[String], out: &mut String) {
        let mut sorted: Vec<&String> = deps.iter().collect();
        sorted.sort();
        for dep in sorted {
            out.push_str(&format!("\tros-{}/{}\n", self.distro, dep));
        }
    }

    /// Render the full ebuild text.
    ///
    /// Every external run and build dependency is attempted before the
    /// outcome is decided; unresolved names accumulate and a non-empty set
    /// after the full pass fails the whole recipe, discarding the buffer.
    pub fn text(
        &mut self,
        distributor: &str,
        license_notice: &str,
        index: &RosdepIndex,
    ) -> Result<String, GenError> {
        self.unresolved.clear();
        let rdepends_external = self.rdepends_external.clone();
        let depends_external = self.depends_external.clone();

        let mut out = String::new();
        out.push_str(&format!(
            "# Copyright {} {}\n",
            Utc::now().year(),
            distributor
        ));
        out.push_str(&format!(
            "# Distributed under the terms of the {} license\n\n",
            license_notice
        ));

        out.push_str(&format!("EAPI={}\n\n", self.eapi));
        out.push_str("inherit ros-cmake\n");

        out.push_str(&format!("DESCRIPTION=\"{}\"\n", self.description));
        out.push_str(&format!("HOMEPAGE=\"{}\"\n", self.homepage));
        out.push_str(&format!(
            "SRC_URI=\"{} -> ${{PN}}-${{PV}}.tar.gz\"\n\n",
            self.src_uri
        ));

        // a bare license gets a trailing blank line, a group does not
        let license_ids = license::classify_all(&self.upstream_license)?;
        out.push_str(&format!(
            "LICENSE=\"{}\"\n",
            license::license_value(&license_ids)
        ));
        if license_ids.len() == 1 {
            out.push('\n');
        }

        let keys: Vec<String> = self.keywords.iter().map(Keyword::to_string).collect();
        out.push_str(&format!("KEYWORDS=\"{}\"\n", keys.join(" ")));
        out.push_str("PYTHON_DEPEND=\"3::3.5\"\n\n");

        out.push_str("RDEPEND=\"\n");
        self.internal_block(&self.rdepends, &mut out);
        self.resolve_into(&rdepends_external, index, &mut out);
        out.push_str("\"\n");

        out.push_str("DEPEND=\"${RDEPEND}\n");
        self.internal_block(&self.depends, &mut out);
        self.resolve_into(&depends_external, index, &mut out);
        out.push_str("\"\n\n");

        out.push_str(&format!("SLOT=\"{}\"\n", self.distro));
        out.push_str("CMAKE_BUILD_TYPE=RelWithDebInfo\n");
        out.push_str(&format!("ROS_DISTRO=\"{}\"\n", self.distro));
        out.push_str("ROS_PREFIX=\"opt/ros/${ROS_DISTRO}\"\n\n");

        if self.has_patches {
            out.push_str("src_prepare() {\n");
            out.push_str("\tcd ${P}\n");
            out.push_str("\tEPATCH_SOURCE=\"${FILESDIR}\" EPATCH_SUFFIX=\"patch\" \\\n");
            out.push_str("\tEPATCH_FORCE=\"yes\" epatch\n");
            out.push_str("\tros-cmake_src_prepare\n");
            out.push_str("}\n\n");
        }

        if SPECIAL_PKGS.contains(self.name.as_str()) {
            self.special_phases(&mut out);
        }

        if !self.unresolved.is_empty() {
            return Err(GenError::UnresolvedDependency(self.unresolved.join(", ")));
        }

        Ok(out)
    }

    fn special_phases(&self, out: &mut String) {
        out.push_str("src_configure() {\n");
        match self.name.as_str() {
            "opencv3" => out.push_str("\tfilter-flags '-march=*' '-mcpu=*' '-mtune=*'\n"),
            "stage" => out.push_str("\tfilter-flags '-std=*'\n"),
            "catkin" => {
                out.push_str("\tlocal mycmakeargs=(\n");
                out.push_str("\t\t-DCMAKE_INSTALL_PREFIX=${D%/}${ROS_PREFIX}\n");
                out.push_str("\t\t-DCMAKE_PREFIX_PATH=${ROS_PREFIX}\n");
                out.push_str("\t\t-DPYTHON_INSTALL_DIR=lib64/python3.5/site-packages\n");
                out.push_str("\t\t-DCATKIN_BUILD_BINARY_PACKAGE=0\n");
                out.push_str("\t)\n");
            }
            _ => {}
        }
        out.push_str("\tcmake-utils_src_configure\n");
        out.push_str("}\n\n");

        if self.name == "catkin" {
            out.push_str("src_compile() {\n");
            out.push_str(&format!(
                "\t${{CC}} ${{FILESDIR}}/ros-python.c -o ${{WORKDIR}}/${{P}}/ros-python-{}",
                self.distro
            ));
            out.push_str(" || die 'could not build ros-python!'\n");
            out.push_str("\tros-cmake_src_compile\n");
            out.push_str("}\n\n");

            out.push_str("src_install() {\n");
            out.push_str("\tcd ${WORKDIR}/${P}\n");
            out.push_str("\tmkdir -p ${D}/usr/bin\n");
            out.push_str(&format!(
                "\tcp ros-python-{} ${{D%/}}/usr/bin || die 'could not install ros-python!'\n",
                self.distro
            ));
            out.push_str("}\n");
        }
    }
}
