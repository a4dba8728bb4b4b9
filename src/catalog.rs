//! Cleanup rule catalog loading and lookup from rules.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// Embed the TOML file directly in the binary at compile time
const RULES_TOML: &str = include_str!("../rules.toml");

/// Structure to deserialize the rule table from TOML
#[derive(Debug, Deserialize)]
struct CatalogConfig {
    #[serde(default)]
    global: Vec<String>,
    #[serde(default)]
    packages: HashMap<String, PackageEntry>,
}

/// A package entry is either a plain pattern list or a table composed of
/// generated sublists followed by literal patterns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PackageEntry {
    Patterns(Vec<String>),
    Composite(CompositeEntry),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompositeEntry {
    #[serde(default)]
    prefixed: Vec<PrefixedNames>,
    #[serde(default)]
    locales: Vec<LocaleExclusion>,
    #[serde(default)]
    patterns: Vec<String>,
}

/// A fixed list of names placed under a common directory, e.g. the locale
/// folders of a package's translation tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixedNames {
    pub base: String,
    pub names: Vec<String>,
}

impl PrefixedNames {
    /// Produces `{base}/{name}` for each name, in order.
    pub fn patterns(&self) -> Vec<String> {
        self.names
            .iter()
            .map(|name| format!("{}/{}", self.base, name))
            .collect()
    }
}

/// Removes every two-letter locale file under `base` except those listed in
/// `keep`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocaleExclusion {
    pub base: String,
    pub extension: String,
    #[serde(default)]
    pub keep: Vec<String>,
}

impl LocaleExclusion {
    /// For every code in `aa..=zz` not in the keep-list, yields
    /// `{base}/{code}.{ext}` followed by `{base}/{code}_*.{ext}`.
    pub fn patterns(&self) -> Vec<String> {
        all_lowercase_pairs()
            .filter(|code| !self.keep.iter().any(|kept| kept == code))
            .flat_map(|code| {
                [
                    format!("{}/{}.{}", self.base, code, self.extension),
                    format!("{}/{}_*.{}", self.base, code, self.extension),
                ]
            })
            .collect()
    }
}

/// Every lowercase ASCII pair from `aa` to `zz`, in lexicographic order.
pub fn all_lowercase_pairs() -> impl Iterator<Item = String> {
    ('a'..='z').flat_map(|first| ('a'..='z').map(move |second| format!("{first}{second}")))
}

impl PackageEntry {
    fn into_patterns(self) -> Vec<String> {
        match self {
            PackageEntry::Patterns(patterns) => patterns,
            PackageEntry::Composite(entry) => {
                let mut patterns = Vec::new();
                for block in &entry.prefixed {
                    patterns.extend(block.patterns());
                }
                for block in &entry.locales {
                    patterns.extend(block.patterns());
                }
                patterns.extend(entry.patterns);
                patterns
            }
        }
    }
}

/// Immutable table of cleanup patterns: one global list applied to every
/// package, plus extra lists keyed by package name (`vendor/name`).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    global: Vec<String>,
    packages: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Load the catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(RULES_TOML).context("Failed to parse built-in rules TOML")
    }

    /// Load a catalog from a TOML file on disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse rules file {}", path.display()))
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(content)?;

        let packages = config
            .packages
            .into_iter()
            .map(|(name, entry)| (name, entry.into_patterns()))
            .collect();

        Ok(Catalog {
            global: config.global,
            packages,
        })
    }

    /// Patterns applied to every non-metapackage
    pub fn global_rules(&self) -> &[String] {
        &self.global
    }

    /// All package-specific pattern lists, keyed by package name
    pub fn package_rules(&self) -> &HashMap<String, Vec<String>> {
        &self.packages
    }

    /// Package-specific patterns, empty when the package has no entry
    pub fn rules_for(&self, package: &str) -> &[String] {
        self.packages.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Layer another catalog on top of this one.
    ///
    /// Global patterns are appended unless already present; package patterns
    /// are appended to the existing list for that package.
    pub fn merge(&mut self, other: Catalog) {
        for pattern in other.global {
            if !self.global.contains(&pattern) {
                self.global.push(pattern);
            }
        }

        for (name, patterns) in other.packages {
            let existing = self.packages.entry(name).or_default();
            for pattern in patterns {
                if !existing.contains(&pattern) {
                    existing.push(pattern);
                }
            }
        }
    }
}
