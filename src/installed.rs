//! Installed package discovery from Composer's `vendor/composer/installed.json`.

use crate::orchestrator::PackageDescriptor;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PACKAGE_TYPE: &str = "library";

/// Composer 2 wraps the package list in an object; Composer 1 writes a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledFile {
    Composer2 { packages: Vec<InstalledPackage> },
    Composer1(Vec<InstalledPackage>),
}

#[derive(Debug, Deserialize)]
struct InstalledPackage {
    name: String,
    #[serde(rename = "type", default = "default_package_type")]
    package_type: String,
    /// Relative to `vendor/composer`. Outer `None` when the key is absent,
    /// inner `None` when it is `null` (packages without files).
    #[serde(rename = "install-path", default, deserialize_with = "present")]
    install_path: Option<Option<String>>,
}

/// Only called when the key exists, so a `null` value stays distinguishable
/// from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn default_package_type() -> String {
    DEFAULT_PACKAGE_TYPE.to_string()
}

/// Location of the installed package manifest inside a vendor directory
pub fn manifest_path(vendor_dir: &Path) -> PathBuf {
    vendor_dir.join("composer").join("installed.json")
}

/// Read every installed package from the vendor directory's manifest
pub fn load(vendor_dir: &Path) -> Result<Vec<PackageDescriptor>> {
    let manifest = manifest_path(vendor_dir);
    let content = fs::read_to_string(&manifest)
        .with_context(|| format!("Failed to read {}", manifest.display()))?;

    parse(vendor_dir, &content).with_context(|| format!("Failed to parse {}", manifest.display()))
}

/// Parse manifest content, resolving install paths against `vendor_dir`
pub fn parse(vendor_dir: &Path, content: &str) -> Result<Vec<PackageDescriptor>> {
    let installed: InstalledFile = serde_json::from_str(content)?;

    let descriptors = match installed {
        InstalledFile::Composer2 { packages } => packages
            .into_iter()
            .map(|p| {
                let install_path = match p.install_path {
                    Some(Some(relative)) => {
                        Some(canonical_or_joined(&vendor_dir.join("composer").join(relative)))
                    }
                    Some(None) => None,
                    None => Some(canonical_or_joined(&vendor_dir.join(&p.name))),
                };
                PackageDescriptor::new(p.name, p.package_type, install_path)
            })
            .collect(),
        InstalledFile::Composer1(packages) => packages
            .into_iter()
            .map(|p| {
                let install_path = canonical_or_joined(&vendor_dir.join(&p.name));
                PackageDescriptor::new(p.name, p.package_type, Some(install_path))
            })
            .collect(),
    };

    Ok(descriptors)
}

fn canonical_or_joined(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Find a package by name
pub fn find<'a>(packages: &'a [PackageDescriptor], name: &str) -> Option<&'a PackageDescriptor> {
    packages.iter().find(|p| p.name == name)
}
