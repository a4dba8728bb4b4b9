//! Composer Cleanup - post-install package pruning
//!
//! After Composer installs or updates packages, this crate removes files that
//! are never loaded at runtime (tests, docs, CI configuration, license texts)
//! from each package's install directory.
//!
//! ## Architecture
//!
//! - [`catalog`]: the rule table, one global pattern list plus per-package lists
//! - [`resolver`]: glob expansion of a pattern under an install root
//! - [`executor`]: measuring and deleting matches with per-path failure isolation
//! - [`orchestrator`]: batch and per-package passes behind the host's two hooks
//! - [`report`]: verbosity levels and the output sink both layers write to
//! - [`installed`]: package discovery from `vendor/composer/installed.json`

pub mod catalog;
pub mod executor;
pub mod installed;
pub mod orchestrator;
pub mod report;
pub mod resolver;

// Re-export commonly used items
pub use catalog::{all_lowercase_pairs, Catalog, LocaleExclusion, PrefixedNames};
pub use executor::{clean, clean_into, CleanOptions, CleanupError, CleanupResult, DryRunLedger};
pub use orchestrator::{
    Cleanup, PackageDescriptor, PackageOperation, METAPACKAGE_TYPE, REPORT_THRESHOLD_BYTES,
};
pub use report::{ConsoleReporter, RecordingReporter, Reporter, Verbosity, PLUGIN_NAME};
pub use resolver::{normalize_pattern, resolve};
