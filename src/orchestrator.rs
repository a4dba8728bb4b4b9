//! Batch and per-package cleanup passes driven by host lifecycle events.

use crate::catalog::Catalog;
use crate::executor::{clean_into, CleanOptions, CleanupResult, DryRunLedger};
use crate::report::{Reporter, PLUGIN_NAME};

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Packages of this type have no files of their own
pub const METAPACKAGE_TYPE: &str = "metapackage";

/// Per-package savings at or below this are not reported at normal verbosity
pub const REPORT_THRESHOLD_BYTES: u64 = 32 * 1024;

/// An installed package as described by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// `vendor/name`
    pub name: String,
    pub package_type: String,
    /// `None` when the host cannot tell where the package lives
    pub install_path: Option<PathBuf>,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        package_type: impl Into<String>,
        install_path: Option<PathBuf>,
    ) -> Self {
        PackageDescriptor {
            name: name.into(),
            package_type: package_type.into(),
            install_path,
        }
    }

    pub fn is_metapackage(&self) -> bool {
        self.package_type == METAPACKAGE_TYPE
    }
}

/// A single package event delivered by the host
#[derive(Debug, Clone)]
pub enum PackageOperation {
    Install(PackageDescriptor),
    Update {
        initial: PackageDescriptor,
        target: PackageDescriptor,
    },
    Uninstall(PackageDescriptor),
}

impl PackageOperation {
    /// The package whose files are on disk after the operation
    pub fn installed_package(&self) -> Option<&PackageDescriptor> {
        match self {
            PackageOperation::Install(package) => Some(package),
            PackageOperation::Update { target, .. } => Some(target),
            PackageOperation::Uninstall(_) => None,
        }
    }
}

/// Applies the catalog to installed packages
pub struct Cleanup<'a> {
    catalog: &'a Catalog,
    options: CleanOptions,
}

impl<'a> Cleanup<'a> {
    pub fn new(catalog: &'a Catalog, options: CleanOptions) -> Self {
        Cleanup { catalog, options }
    }

    /// Hook for "dependency graph fully materialized": clean every package
    /// and print one summary line.
    pub fn on_post_autoload_dump(
        &self,
        packages: &[PackageDescriptor],
        reporter: &mut dyn Reporter,
    ) -> CleanupResult {
        let start_time = Instant::now();
        let mut total = CleanupResult::default();

        for package in packages {
            if let Some(result) = self.clean_package(package, reporter) {
                total += result;
            }
        }

        reporter.info(&format!(
            "{}: Cleanup done in {:.3} seconds ({} Kb saved, {} files deleted){}",
            PLUGIN_NAME,
            start_time.elapsed().as_secs_f64(),
            total.kilobytes_freed(),
            total.files_removed,
            if self.options.dry_run { " [dry run]" } else { "" }
        ));

        total
    }

    /// Hook for "a single package was installed or updated". Small savings
    /// are only reported at elevated verbosity.
    ///
    /// Returns `None` when nothing was attempted.
    pub fn on_post_package_event(
        &self,
        operation: &PackageOperation,
        reporter: &mut dyn Reporter,
    ) -> Option<CleanupResult> {
        let package = operation.installed_package()?;
        let result = self.clean_package(package, reporter)?;

        if result.bytes_freed > REPORT_THRESHOLD_BYTES || reporter.verbosity().is_elevated() {
            reporter.info(&format!(
                "    ↳ Cleanup done: {} Kb saved",
                result.kilobytes_freed()
            ));
        }

        Some(result)
    }

    /// Global rules first, then the package's own rules. Metapackages are
    /// skipped without touching the filesystem.
    fn clean_package(
        &self,
        package: &PackageDescriptor,
        reporter: &mut dyn Reporter,
    ) -> Option<CleanupResult> {
        if package.is_metapackage() {
            debug!(package = %package.name, "Skipping metapackage");
            return None;
        }

        let root = package.install_path.as_deref().unwrap_or(Path::new(""));

        let mut ledger = DryRunLedger::default();
        let mut result = clean_into(
            root,
            self.catalog.global_rules(),
            self.options,
            &mut ledger,
            reporter,
        );
        result += clean_into(
            root,
            self.catalog.rules_for(&package.name),
            self.options,
            &mut ledger,
            reporter,
        );

        debug!(
            package = %package.name,
            bytes = result.bytes_freed,
            files = result.files_removed,
            "Package cleaned"
        );
        Some(result)
    }
}
