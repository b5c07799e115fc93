use crate::cleanup::{BlockClosing, CleanupReport, Pipeline};
use crate::config::CleanupConfig;
use crate::context::Context;
use anyhow::{Context as AnyhowContext, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options of the `clean` command
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub files: Vec<PathBuf>,
    /// Clean a copy at this path instead of the input (single input only)
    pub output: Option<PathBuf>,
    pub strict_blocks: bool,
    pub fmt: bool,
    pub dry_run: bool,
}

/// Handles the 'clean' command - runs the cleanup pipeline over generated files
pub struct CleanCommand;

impl CleanCommand {
    /// Execute the clean command
    pub fn execute(ctx: &Context, config: &CleanupConfig, options: &CleanOptions) -> Result<()> {
        if options.files.is_empty() {
            anyhow::bail!("No input files given");
        }

        if options.output.is_some() && options.files.len() != 1 {
            anyhow::bail!("--output requires exactly one input file");
        }

        let closing = if options.strict_blocks {
            BlockClosing::TopLevelBrace
        } else {
            config.block_closing
        };
        let pipeline = Pipeline::new(&*ctx.fs, closing);

        if options.dry_run {
            return Self::preview(ctx, &pipeline, &options.files);
        }

        let format = options.fmt || config.format.enabled;
        let total = options.files.len();

        ctx.output.section("Cleaning generated configuration");

        for (index, input) in options.files.iter().enumerate() {
            let target = Self::prepare_target(ctx, input, options.output.as_deref())?;

            ctx.output.blank();
            ctx.output.key_value_highlight(
                &format!("[{}/{}] File", index + 1, total),
                &target.display().to_string(),
            );

            let report = pipeline
                .run(&target)
                .with_context(|| format!("Failed to clean {}", target.display()))?;
            Self::print_report(ctx, &report);

            if format {
                Self::format_file(ctx, config, &target)?;
            }
        }

        ctx.output.blank();
        ctx.output.success(&format!(
            "Cleaned {} file{}",
            total,
            if total == 1 { "" } else { "s" }
        ));

        Ok(())
    }

    /// Print cleaned documents without touching the files
    fn preview(ctx: &Context, pipeline: &Pipeline, files: &[PathBuf]) -> Result<()> {
        for file in files {
            let content = ctx.fs.read_to_string(file)?;
            let (cleaned, report) = pipeline.clean_text(&content);

            info!(
                file = %file.display(),
                lines = report.lines_removed(),
                stanzas = report.stanzas_removed,
                "Dry run"
            );
            ctx.output.raw(&cleaned);
        }

        Ok(())
    }

    /// Resolve the file the pipeline rewrites; with `output` the input is
    /// copied there first and left untouched
    fn prepare_target(ctx: &Context, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        if !ctx.fs.is_file(input) {
            anyhow::bail!("File not found: {}", input.display());
        }

        let Some(output) = output else {
            return Ok(input.to_path_buf());
        };

        let content = ctx.fs.read_to_string(input)?;
        ctx.fs
            .write(output, &content)
            .with_context(|| format!("Failed to create output file {}", output.display()))?;

        Ok(output.to_path_buf())
    }

    fn print_report(ctx: &Context, report: &CleanupReport) {
        if report.is_clean() {
            ctx.output.dimmed("  Nothing to remove");
            return;
        }

        ctx.output
            .key_value("Global defaults", &report.global_removed.to_string());
        ctx.output
            .key_value("Type rules", &report.block_removed.to_string());
        ctx.output
            .key_value("Correlated fields", &report.correlated_removed.to_string());
        ctx.output
            .key_value("Empty stanzas", &report.stanzas_removed.to_string());
    }

    /// Run the configured formatter on a cleaned file. Formatter failures are
    /// reported but do not fail the run.
    fn format_file(ctx: &Context, config: &CleanupConfig, file: &Path) -> Result<()> {
        let (program, mut args) = config.format.argv()?;

        let (working_dir, file_name) = match (file.parent(), file.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                (parent.to_path_buf(), name.to_string_lossy().to_string())
            }
            _ => (PathBuf::from("."), file.to_string_lossy().to_string()),
        };
        args.push(file_name);

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        match ctx.command.execute(&program, &arg_refs, &working_dir) {
            Ok(output) if output.status.success() => {
                ctx.output.dimmed(&format!("  Formatted with {}", config.format.command));
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(program = %program, stderr = %stderr.trim(), "Formatter failed");
                ctx.output.warning(&format!(
                    "{} failed on {}: {}",
                    config.format.command,
                    file.display(),
                    stderr.trim()
                ));
            }
            Err(e) => {
                warn!(program = %program, error = %e, "Formatter could not run");
                ctx.output
                    .warning(&format!("Could not run {}: {}", config.format.command, e));
            }
        }

        Ok(())
    }
}
