// generator.rs -- overlay generation pass

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use log::debug;

use crate::distro::{DistroIndex, ReleasePackage};
use crate::ebuild::Ebuild;
use crate::exception::GenError;
use crate::metadata_xml::MetadataXml;
use crate::pkg_xml::{self, Manifest};
use crate::rosdep::RosdepIndex;

const ORG: &str = "Open Source Robotics Foundation";
const ORG_LICENSE: &str = "BSD";
const KEYWORDS: [&str; 4] = ["x86", "amd64", "arm", "arm64"];
const DESCRIPTION_LIMIT: usize = 80;

fn ok(msg: &str) {
    println!("{}", format!(">>> {}", msg).green());
}

fn warn(msg: &str) {
    println!("{}", format!(" * {}", msg).yellow());
}

fn err(msg: &str) {
    eprintln!("{}", format!(" * {}", msg).red());
}

/// Where everything for one generation pass lives.
pub struct GenConfig<'a> {
    pub distro: &'a DistroIndex,
    pub rosdep: &'a RosdepIndex,
    /// Overlay checkout the ebuilds are written into.
    pub overlay_dir: &'a Path,
    /// Base directory for relative package.xml paths in the index.
    pub manifest_dir: &'a Path,
    pub preserve_existing: bool,
    /// Suppress per-package success lines.
    pub quiet: bool,
}

/// The ebuild plus companion metadata for one package, ready to render.
pub struct Installer {
    pub ebuild: Ebuild,
    pub metadata: MetadataXml,
    pub version: String,
}

impl Installer {
    /// Gather everything the two artifacts need from the distro index and
    /// the package manifest. Manifest problems degrade to defaults; only a
    /// package missing from the index is an error here.
    pub fn new(cfg: &GenConfig, name: &str) -> Result<Self, GenError> {
        let release = cfg.distro.get(name)?;
        let manifest = load_manifest(cfg, name, release);

        let mut ebuild = Ebuild::new(name, &cfg.distro.name);
        ebuild.src_uri = release.src_uri.clone();
        ebuild.has_patches = patch_dir(cfg, name).exists();

        for dep in &release.run_depends {
            ebuild.add_run_depend(dep, cfg.distro.is_internal(dep));
        }
        for dep in &release.build_depends {
            ebuild.add_build_depend(dep, cfg.distro.is_internal(dep));
        }
        for dep in &release.buildtool_depends {
            ebuild.add_build_depend(dep, cfg.distro.is_internal(dep));
        }
        for arch in KEYWORDS {
            ebuild.add_keyword(arch, false);
        }

        if let Some(description) = &manifest.description {
            ebuild.description = clean_description(description);
        }
        match &manifest.homepage {
            Some(homepage) => ebuild.homepage = homepage.clone(),
            None => warn(&format!("no website field for package {}", name)),
        }
        if let Some(license) = &manifest.license {
            ebuild.upstream_license = license.clone();
        }

        let metadata = MetadataXml::from_manifest(&manifest, release);
        Ok(Installer {
            ebuild,
            metadata,
            version: release.version.clone(),
        })
    }

    pub fn ebuild_text(&mut self, rosdep: &RosdepIndex) -> Result<String, GenError> {
        self.ebuild.text(ORG, ORG_LICENSE, rosdep)
    }

    pub fn metadata_text(&self) -> String {
        self.metadata.text()
    }
}

fn load_manifest(cfg: &GenConfig, name: &str, release: &ReleasePackage) -> Manifest {
    if let Some(manifest) = &release.manifest {
        return manifest.clone();
    }
    if let Some(rel_path) = &release.package_xml {
        let path = cfg.manifest_dir.join(rel_path);
        match fs::read_to_string(&path).map_err(GenError::from) {
            Ok(xml) => match pkg_xml::parse_manifest(&xml) {
                Ok(manifest) => return manifest,
                Err(e) => warn(&format!("fetch metadata for package {}: {}", name, e)),
            },
            Err(e) => warn(&format!("fetch metadata for package {}: {}", name, e)),
        }
    }
    Manifest::default()
}

fn clean_description(description: &str) -> String {
    let cleaned: String = description.chars().filter(|c| *c != '`').collect();
    cleaned.chars().take(DESCRIPTION_LIMIT).collect()
}

fn package_dir(cfg: &GenConfig, name: &str) -> PathBuf {
    cfg.overlay_dir
        .join(format!("ros-{}", cfg.distro.name))
        .join(name)
}

fn patch_dir(cfg: &GenConfig, name: &str) -> PathBuf {
    package_dir(cfg, name).join("files")
}

fn ebuild_path(cfg: &GenConfig, name: &str, version: &str) -> PathBuf {
    package_dir(cfg, name).join(format!("{}-{}.ebuild", name, version))
}

/// Generate one package: render both artifacts, then write both, or write
/// nothing at all when either rendering step fails.
pub fn generate_package(cfg: &GenConfig, name: &str) -> Result<PathBuf, GenError> {
    let mut installer = Installer::new(cfg, name)?;
    write_installer(cfg, name, &mut installer)
}

fn write_installer(
    cfg: &GenConfig,
    name: &str,
    installer: &mut Installer,
) -> Result<PathBuf, GenError> {
    let ebuild_text = match installer.ebuild_text(cfg.rosdep) {
        Ok(text) => text,
        Err(e) => {
            err(&format!(
                "Failed to resolve required dependencies for package {}!",
                name
            ));
            for dep in installer.ebuild.unresolved() {
                err(&format!(" unresolved: \"{}\"", dep));
            }
            return Err(e);
        }
    };
    let metadata_text = installer.metadata_text();

    let dir = package_dir(cfg, name);
    fs::create_dir_all(&dir)?;
    let path = ebuild_path(cfg, name, &installer.version);
    fs::write(&path, ebuild_text)?;
    fs::write(dir.join("metadata.xml"), metadata_text)?;
    debug!("wrote {}", path.display());
    Ok(path)
}

/// Outcome of a whole-distro pass.
#[derive(Debug, Default)]
pub struct PassReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Packages that failed dependency resolution, with their unresolved
    /// dependency names.
    pub broken: BTreeMap<String, Vec<String>>,
}

impl PassReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Generate installers for every package in the distribution (or an explicit
/// subset). One broken package never stops the pass.
pub fn generate_all(cfg: &GenConfig, packages: Option<&[String]>) -> PassReport {
    let names: Vec<String> = match packages {
        Some(list) => {
            let mut list: Vec<String> = list.to_vec();
            list.sort();
            list
        }
        None => cfg.distro.package_names().map(String::from).collect(),
    };

    let mut report = PassReport::default();
    let total = names.len() as f64;

    for (i, name) in names.iter().enumerate() {
        let percent = format!("{:.1}", 100.0 * i as f64 / total);

        let release = match cfg.distro.get(name) {
            Ok(release) => release,
            Err(e) => {
                err(&format!("{}%: {}", percent, e));
                report.failed += 1;
                continue;
            }
        };

        if cfg.preserve_existing && ebuild_path(cfg, name, &release.version).exists() {
            if !cfg.quiet {
                ok(&format!(
                    "{}%: Ebuild for package {} up to date, skipping...",
                    percent, name
                ));
            }
            report.succeeded += 1;
            continue;
        }

        let mut installer = match Installer::new(cfg, name) {
            Ok(installer) => installer,
            Err(e) => {
                err(&format!(
                    "{}%: Failed to generate installer for package {}! ({})",
                    percent, name, e
                ));
                report.failed += 1;
                continue;
            }
        };

        match write_installer(cfg, name, &mut installer) {
            Ok(_) => {
                if !cfg.quiet {
                    ok(&format!(
                        "{}%: Successfully generated installer for package '{}'.",
                        percent, name
                    ));
                }
                report.succeeded += 1;
            }
            Err(e) => {
                if let GenError::UnresolvedDependency(_) = e {
                    report
                        .broken
                        .insert(name.clone(), installer.ebuild.unresolved().to_vec());
                }
                err(&format!(
                    "{}%: Failed to generate installer for package {}!",
                    percent, name
                ));
                report.failed += 1;
            }
        }
    }

    println!(
        "------ Generated {} / {} for distro {} ------",
        report.succeeded,
        report.total(),
        cfg.distro.name
    );

    if !report.broken.is_empty() {
        warn("Unresolved:");
        for (pkg, deps) in &report.broken {
            warn(&format!("{}:", pkg));
            warn(&format!("  {:?}", deps));
        }
    }

    report
}
