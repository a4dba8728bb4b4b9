use anyhow::{Context, Result};
use clap::Parser;
use composer_cleanup::{
    installed, Catalog, CleanOptions, Cleanup, ConsoleReporter, PackageOperation, Reporter,
    Verbosity, PLUGIN_NAME,
};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Remove tests, docs and CI clutter from installed Composer packages",
    long_about = None
)]
struct Args {
    /// Packages to clean individually (defaults to every installed package)
    packages: Vec<String>,

    /// Composer vendor directory
    #[arg(long, default_value = "vendor")]
    vendor_dir: PathBuf,

    /// Additional rules file, merged over the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Show what would be removed without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Quiet => Level::ERROR,
        Verbosity::Normal | Verbosity::Verbose => Level::WARN,
        Verbosity::VeryVerbose => Level::DEBUG,
        Verbosity::Debug => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(extra_rules: Option<&Path>) -> Result<Catalog> {
    let mut catalog = Catalog::builtin()?;

    if let Some(path) = extra_rules {
        catalog.merge(Catalog::from_file(path)?);
    }

    Ok(catalog)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    init_tracing(verbosity);

    let catalog = load_catalog(args.rules.as_deref())?;
    let packages =
        installed::load(&args.vendor_dir).context("Failed to load installed packages")?;

    let cleanup = Cleanup::new(
        &catalog,
        CleanOptions {
            dry_run: args.dry_run,
        },
    );
    let mut reporter = ConsoleReporter::new(verbosity);

    if args.packages.is_empty() {
        cleanup.on_post_autoload_dump(&packages, &mut reporter);
        return Ok(());
    }

    for name in &args.packages {
        match installed::find(&packages, name) {
            Some(package) => {
                reporter.info(&format!("  - Cleaning {}", package.name));
                let operation = PackageOperation::Install(package.clone());
                cleanup.on_post_package_event(&operation, &mut reporter);
            }
            None => {
                reporter.error(&format!("{}: Package {} is not installed", PLUGIN_NAME, name));
            }
        }
    }

    Ok(())
}
