use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use devtools_simpleview::config::{assemble, load_from_path, Assembly, PatchSetConfig, SkippedSet};
use devtools_simpleview::patch::PatchStatus;
use devtools_simpleview::runner::{RunReport, Runner};
use devtools_simpleview::safety::TargetRoot;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "devtools-simpleview")]
#[command(about = "Patch a DevTools front-end build into the simple view", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the patch catalog to a DevTools output directory
    Apply {
        /// DevTools front-end output directory
        #[arg(short, long)]
        root: PathBuf,

        /// Patch set file, or a directory of .toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Upstream DevTools version, for patch sets with a version_range
        #[arg(short = 'u', long)]
        upstream_version: Option<String>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Exit successfully even when some patches do not apply
        #[arg(long)]
        allow_missing: bool,
    },

    /// Report which patches are applied, pending or not applicable
    Status {
        /// DevTools front-end output directory
        #[arg(short, long)]
        root: PathBuf,

        /// Patch set file, or a directory of .toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Upstream DevTools version, for patch sets with a version_range
        #[arg(short = 'u', long)]
        upstream_version: Option<String>,

        /// Print the status report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the catalog's patches per file
    List {
        /// Patch set file, or a directory of .toml patch sets
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Upstream DevTools version, for patch sets with a version_range
        #[arg(short = 'u', long)]
        upstream_version: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let success = match cli.command {
        Commands::Apply {
            root,
            patches,
            upstream_version,
            dry_run,
            diff,
            json,
            allow_missing,
        } => cmd_apply(ApplyArgs {
            root,
            patches,
            upstream_version,
            dry_run,
            diff,
            json,
            allow_missing,
        })?,

        Commands::Status {
            root,
            patches,
            upstream_version,
            json,
        } => cmd_status(&root, patches.as_deref(), upstream_version.as_deref(), json)?,

        Commands::List {
            patches,
            upstream_version,
        } => cmd_list(patches.as_deref(), upstream_version.as_deref())?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Helper: Collect the .toml patch sets named by `--patches`.
///
/// A file is used as-is; a directory contributes its top-level `*.toml`
/// files in name order.
fn discover_patch_files(patches: &Path) -> Result<Vec<PathBuf>> {
    if patches.is_file() {
        return Ok(vec![patches.to_path_buf()]);
    }
    if !patches.is_dir() {
        anyhow::bail!("patch set path does not exist: {}", patches.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(patches).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("no .toml patch sets found in {}", patches.display());
    }
    Ok(files)
}

/// Helper: Load patch sets and assemble the catalog.
fn load_catalog(patches: Option<&Path>, upstream_version: Option<&str>) -> Result<Assembly> {
    let mut sets: Vec<PatchSetConfig> = Vec::new();
    if let Some(patches) = patches {
        for file in discover_patch_files(patches)? {
            tracing::debug!(path = %file.display(), "loading patch set");
            sets.push(load_from_path(&file)?);
        }
    }
    Ok(assemble(&sets, upstream_version)?)
}

fn print_skipped_sets(skipped: &[SkippedSet]) {
    for set in skipped {
        println!("{} patch set {}: {}", "⊘".cyan(), set.name, set.reason.dimmed());
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &str, original: &str, modified: &str) {
    println!("\n{}", format!("--- {file} (original)").dimmed());
    println!("{}", format!("+++ {file} (patched)").dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    upstream_version: Option<&'a str>,
    builtin: bool,
    skipped_sets: &'a [SkippedSet],
    #[serde(flatten)]
    run: &'a RunReport,
}

struct ApplyArgs {
    root: PathBuf,
    patches: Option<PathBuf>,
    upstream_version: Option<String>,
    dry_run: bool,
    diff: bool,
    json: bool,
    allow_missing: bool,
}

fn run_catalog(
    root: &Path,
    patches: Option<&Path>,
    upstream_version: Option<&str>,
    dry_run: bool,
) -> Result<(Assembly, RunReport)> {
    let assembly = load_catalog(patches, upstream_version)?;
    let root = TargetRoot::new(root)
        .with_context(|| format!("invalid DevTools root {}", root.display()))?;
    let report = Runner::new(&assembly.catalog, root).dry_run(dry_run).run()?;
    Ok((assembly, report))
}

fn cmd_apply(args: ApplyArgs) -> Result<bool> {
    let upstream_version = args.upstream_version.as_deref();
    let (assembly, report) = run_catalog(
        &args.root,
        args.patches.as_deref(),
        upstream_version,
        args.dry_run,
    )?;

    let tolerated = report.not_applied().next().is_none() || args.allow_missing;
    let success = tolerated && report.missing_files().next().is_none();

    if args.json {
        let json = JsonReport {
            upstream_version,
            builtin: assembly.builtin,
            skipped_sets: &assembly.skipped,
            run: &report,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(success);
    }

    println!("DevTools root: {}", report.root.display());
    if let Some(version) = upstream_version {
        println!("Upstream version: {}", version);
    }
    if args.dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }
    println!();
    print_skipped_sets(&assembly.skipped);

    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_not_applied = 0;
    let mut total_skipped = 0;

    for run in &report.files {
        let Some(file_report) = &run.report else {
            eprintln!("{} {}: file not found", "✗".red(), run.file);
            eprintln!("  Expected at: {}", run.path.display());
            continue;
        };

        println!("{}", run.file.bold());
        for patch in &file_report.patches {
            match &patch.status {
                PatchStatus::Applied => {
                    let verb = if args.dry_run { "Would apply" } else { "Applied" };
                    println!("  {} {}: {}", "✓".green(), patch.id, verb);
                    total_applied += 1;
                }
                PatchStatus::AlreadyApplied => {
                    println!("  {} {}: Already applied", "⊙".yellow(), patch.id);
                    total_already_applied += 1;
                }
                PatchStatus::NotApplied { reason } => {
                    eprintln!("  {} {}: Not applicable", "✗".red(), patch.id);
                    eprintln!("    {}", reason);
                    eprintln!("    Upstream may have changed; refresh the patch's anchor");
                    total_not_applied += 1;
                }
                PatchStatus::Skipped { missing } => {
                    println!(
                        "  {} {}: Skipped (requires {})",
                        "⊘".cyan(),
                        patch.id,
                        missing.join(", ")
                    );
                    total_skipped += 1;
                }
            }
        }

        if args.diff && file_report.changed {
            if let Some(original) = &run.original {
                display_diff(&run.file, original, &file_report.text);
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already applied",
        format!("{}", total_already_applied).yellow()
    );
    println!("  {} not applicable", format!("{}", total_not_applied).red());
    println!("  {} skipped", format!("{}", total_skipped).cyan());
    println!(
        "  {} missing files",
        format!("{}", report.missing_files().count()).red()
    );

    Ok(success)
}

fn cmd_status(
    root: &Path,
    patches: Option<&Path>,
    upstream_version: Option<&str>,
    json: bool,
) -> Result<bool> {
    // Read-only: compute results without touching the root
    let (assembly, report) = run_catalog(root, patches, upstream_version, true)?;

    if json {
        let json = JsonReport {
            upstream_version,
            builtin: assembly.builtin,
            skipped_sets: &assembly.skipped,
            run: &report,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(true);
    }

    println!("{}", "Patch Status Report".bold());
    println!("DevTools root: {}", report.root.display());
    println!();
    print_skipped_sets(&assembly.skipped);

    let mut applied = Vec::new();
    let mut pending = Vec::new();
    let mut not_applicable = Vec::new();

    for run in &report.files {
        let Some(file_report) = &run.report else {
            not_applicable.push((run.file.clone(), "file not found".to_string()));
            continue;
        };
        for patch in &file_report.patches {
            let label = format!("{} ({})", patch.id, run.file);
            match &patch.status {
                PatchStatus::AlreadyApplied => applied.push(label),
                PatchStatus::Applied => pending.push(label),
                status => not_applicable.push((label, status.to_string())),
            }
        }
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} patches)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for id in &applied {
            println!("  - {}", id);
        }
        println!();
    }

    if !pending.is_empty() {
        println!(
            "{} {} ({} patches)",
            "⊙".yellow(),
            "PENDING".yellow().bold(),
            pending.len()
        );
        for id in &pending {
            println!("  - {}", id);
        }
        println!();
    }

    if !not_applicable.is_empty() {
        println!(
            "{} {} ({} patches)",
            "✗".red(),
            "NOT APPLICABLE".red().bold(),
            not_applicable.len()
        );
        for (id, reason) in &not_applicable {
            println!("  - {} ({})", id, reason.dimmed());
        }
        println!();
    }

    Ok(true)
}

fn cmd_list(patches: Option<&Path>, upstream_version: Option<&str>) -> Result<bool> {
    let assembly = load_catalog(patches, upstream_version)?;
    print_skipped_sets(&assembly.skipped);

    for file in assembly.catalog.files() {
        println!("{}", file.bold());
        for patch in assembly.catalog.patches_for(file) {
            let mut line = format!("  {}", patch.id());
            if !patch.description().is_empty() {
                line.push_str(&format!(" - {}", patch.description()));
            }
            if !patch.dependencies().is_empty() {
                line.push_str(&format!(
                    " {}",
                    format!("(requires {})", patch.dependencies().join(", ")).dimmed()
                ));
            }
            println!("{}", line);
        }
    }
    println!();
    println!("{} patches", assembly.catalog.len());
    Ok(true)
}
