// lib.rs -- Gentoo overlay generator for ROS distributions

pub mod distro;
pub mod ebuild;
pub mod exception;
pub mod generator;
pub mod license;
pub mod metadata_xml;
pub mod pkg_xml;
pub mod rosdep;
