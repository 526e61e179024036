use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};

use ros_overlay_gen::distro::DistroIndex;
use ros_overlay_gen::generator::{self, GenConfig};
use ros_overlay_gen::rosdep::RosdepIndex;

fn main() {
    let app = create_app();
    let matches = app.get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    if matches.get_flag("verbose") {
        logger.filter_level(log::LevelFilter::Debug);
    } else if matches.get_flag("quiet") {
        logger.filter_level(log::LevelFilter::Error);
    }
    logger.init();

    let result = run_generator(matches);
    process::exit(result);
}

fn create_app() -> Command {
    Command::new("ros-overlay-gen")
        .version("0.1.0")
        .about("Generate Gentoo ebuilds for a ROS distribution")
        .arg(
            Arg::new("distro-index")
                .long("distro-index")
                .help("Path to the distribution index YAML file")
                .required(true),
        )
        .arg(
            Arg::new("rosdep-dir")
                .long("rosdep-dir")
                .help("Directory holding base.yaml, python.yaml and ruby.yaml")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Overlay directory to write ebuilds into")
                .default_value("."),
        )
        .arg(
            Arg::new("preserve-existing")
                .long("preserve-existing")
                .help("Skip packages whose ebuild already exists")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Verbose output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only report failures")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("packages")
                .help("Only generate these packages (defaults to the whole distro)")
                .num_args(0..),
        )
}

fn run_generator(matches: ArgMatches) -> i32 {
    match try_run(&matches) {
        Ok(failed) => {
            if failed == 0 {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("ros-overlay-gen: {:#}", e);
            1
        }
    }
}

fn try_run(matches: &ArgMatches) -> anyhow::Result<usize> {
    let index_path = Path::new(matches.get_one::<String>("distro-index").unwrap());
    let rosdep_dir = Path::new(matches.get_one::<String>("rosdep-dir").unwrap());
    let overlay_dir = Path::new(matches.get_one::<String>("output").unwrap());

    let distro = DistroIndex::load(index_path)
        .with_context(|| format!("loading distro index {}", index_path.display()))?;
    let rosdep = RosdepIndex::load(rosdep_dir)
        .with_context(|| format!("loading rosdep tables from {}", rosdep_dir.display()))?;

    let cfg = GenConfig {
        distro: &distro,
        rosdep: &rosdep,
        overlay_dir,
        manifest_dir: index_path.parent().unwrap_or(Path::new(".")),
        preserve_existing: matches.get_flag("preserve-existing"),
        quiet: matches.get_flag("quiet"),
    };

    let packages: Option<Vec<String>> = matches
        .get_many::<String>("packages")
        .map(|values| values.cloned().collect());

    let report = generator::generate_all(&cfg, packages.as_deref());
    Ok(report.failed)
}
