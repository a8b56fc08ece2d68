//! Command handlers for the CLI
//!
//! Each handler runs one subcommand end to end and returns a process exit
//! code: 0 on success, 2 when content is rejected by the platform gate,
//! 1 on any error.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::analysis::service::AnalysisService;
use crate::analysis::types::{ContentKind, ExtractedContent};
use crate::analysis::validation::validate_content;
use crate::cli::commands::{AnalyzeArgs, ValidateArgs};
use crate::cli::output::OutputFormatter;
use crate::config::ArchlensConfig;

/// Handles the `analyze` subcommand
pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let content = match read_content(&args.input, args.kind) {
        Ok(content) => content,
        Err(message) => {
            eprintln!("{}", message);
            return 1;
        }
    };

    let mut config = match ArchlensConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.llm_timeout_secs = timeout;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return 1;
    }

    debug!("Effective configuration:\n{}", config);

    let service = match AnalysisService::new(&config).await {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let outcome = match service.analyze(&content).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = match formatter.format_outcome(&outcome) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error formatting output: {}", e);
            return 1;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("Error writing output to {}: {}", path.display(), e);
                return 1;
            }
            if !quiet {
                println!("Output written to {}", path.display());
            }
        }
        None => println!("{}", rendered),
    }

    if outcome.is_rejected() {
        2
    } else {
        0
    }
}

/// Handles the `validate` subcommand
pub async fn handle_validate(args: &ValidateArgs) -> i32 {
    let content = match read_content(&args.input, args.kind) {
        Ok(content) => content,
        Err(message) => {
            eprintln!("{}", message);
            return 1;
        }
    };

    let verdict = validate_content(&content);

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_verdict(&verdict) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("Error formatting output: {}", e);
            return 1;
        }
    }

    if verdict.is_supported_platform {
        0
    } else {
        2
    }
}

/// Reads an input file into extracted content for the pipeline.
///
/// The content kind defaults to the file extension when not overridden.
fn read_content(input: &Path, kind: Option<ContentKind>) -> Result<ExtractedContent, String> {
    let text = fs::read_to_string(input)
        .map_err(|e| format!("Error: cannot read {}: {}", input.display(), e))?;

    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let kind = kind.unwrap_or_else(|| {
        input
            .extension()
            .map(|ext| ContentKind::from_extension(&ext.to_string_lossy()))
            .unwrap_or(ContentKind::Unknown)
    });

    Ok(ExtractedContent::new(kind, text, filename))
}
