//! Terminal rendering of generation results.
//!
//! Successful runs list the written files and any unsupported features that
//! were let through; failed runs list every marker and strict-check
//! diagnostic before the CLI exits non-zero.

use std::path::PathBuf;

use colored::Colorize;

use crate::codegen::UnsupportedMarker;
use crate::errors::GeneratorError;

/// Outcome of a successful [`crate::output::generate_and_write`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub markers: Vec<UnsupportedMarker>,
    /// Whether the markers were written into the source.
    pub markers_emitted: bool,
    pub entities: usize,
    pub operations: usize,
    /// Library built in artifact mode.
    pub artifact: Option<PathBuf>,
}

impl GenerationReport {
    /// Formats the report for terminal output.
    ///
    /// - The summary line is **green**
    /// - Written files are dimmed
    /// - Unsupported features are **yellow**
    pub fn render(&self) -> String {
        let mut output = format!(
            "{}\n",
            format!(
                "Generated {} entities ({} operations) in {}",
                self.entities,
                self.operations,
                self.output_dir.display()
            )
            .green()
            .bold()
        );

        for file in &self.files {
            output.push_str(&format!("  {}\n", file.display().to_string().dimmed()));
        }

        if let Some(artifact) = &self.artifact {
            output.push_str(&format!("{} {}\n", "Artifact:".bold(), artifact.display()));
        }

        if !self.markers.is_empty() {
            let heading = if self.markers_emitted {
                format!("{} unsupported feature(s) emitted as compile errors", self.markers.len())
            } else {
                format!("{} unsupported feature(s) left out", self.markers.len())
            };
            output.push('\n');
            output.push_str(&format!("{}\n", heading.yellow().bold()));
            output.push_str(&render_markers(&self.markers));
        }

        output
    }
}

fn render_markers(markers: &[UnsupportedMarker]) -> String {
    markers
        .iter()
        .map(|m| {
            format!(
                "  {} {}\n",
                format!("{}.{}", m.entity, m.feature).yellow(),
                m.description
            )
        })
        .collect()
}

/// Formats a generation failure, including every marker and diagnostic.
pub fn render_failure(error: &GeneratorError) -> String {
    let mut output = format!("{} {}\n", "error:".red().bold(), error);

    match error {
        GeneratorError::UnsupportedFeatures { markers, .. } => {
            output.push_str(&render_markers(markers));
            output.push_str(&format!(
                "{}\n",
                "Nothing was written. Use --force to emit with markers, or --skip-unsupported to leave them out."
                    .dimmed()
            ));
        }
        GeneratorError::StrictCheckFailed { diagnostics, .. } => {
            for diagnostic in diagnostics {
                output.push_str(&format!("  {}\n", diagnostic.red()));
            }
        }
        _ => {}
    }

    output
}
