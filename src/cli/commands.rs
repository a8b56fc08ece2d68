use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

use crate::analysis::types::ContentKind;

/// AI-assisted architecture diagram analysis
#[derive(Parser, Debug)]
#[command(
    name = "archlens",
    about = "AI-assisted architecture diagram analysis",
    version,
    author,
    long_about = "archlens analyzes text extracted from architecture diagrams to identify \
                  platform services, their categories, and the relationships between them. \
                  It combines fast pattern heuristics with LLM calls over multiple providers \
                  (Ollama, OpenAI, Anthropic, Gemini, Groq, xAI)."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose output - enable debug logging"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze extracted diagram content",
        long_about = "Reads text extracted from an architecture diagram and produces the \
                      detected components, relationships, and confidence scores.\n\n\
                      Exit codes: 0 on success, 2 when the content is rejected as a \
                      foreign platform, 1 on any error.\n\n\
                      Examples:\n  \
                      archlens analyze diagram.txt\n  \
                      archlens analyze diagram.txt --format json\n  \
                      archlens analyze extracted.txt --kind image --provider ollama"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Check content against the platform gate only",
        long_about = "Runs only the platform validation step and prints the verdict, \
                      without any detection or LLM calls.\n\n\
                      Exit codes: 0 when accepted, 2 when rejected, 1 on any error.\n\n\
                      Examples:\n  \
                      archlens validate diagram.txt\n  \
                      archlens validate sketch.txt --kind image --format json"
    )]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "FILE", help = "File containing the extracted diagram text")]
    pub input: PathBuf,

    #[arg(
        long,
        value_parser = parse_content_kind,
        help = "Kind of source document the text came from (defaults to the file extension)"
    )]
    pub kind: Option<ContentKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "LLM provider to use (defaults to ARCHLENS_PROVIDER or ollama)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name to use (provider-specific, e.g. 'qwen2.5-coder:7b' for Ollama)"
    )]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "LLM request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE", help = "File containing the extracted diagram text")]
    pub input: PathBuf,

    #[arg(
        long,
        value_parser = parse_content_kind,
        help = "Kind of source document the text came from (defaults to the file extension)"
    )]
    pub kind: Option<ContentKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    AdapterKind::from_lower_str(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "Invalid provider: {}. Valid options: ollama, openai, anthropic, gemini, xai, groq",
            s
        )
    })
}

fn parse_content_kind(s: &str) -> Result<ContentKind, String> {
    match s.to_lowercase().as_str() {
        "image" => Ok(ContentKind::Image),
        "xml" => Ok(ContentKind::Xml),
        "svg" => Ok(ContentKind::Svg),
        "pdf" => Ok(ContentKind::Pdf),
        "text" => Ok(ContentKind::Text),
        _ => Err(format!(
            "Invalid content kind: {}. Valid options: image, xml, svg, pdf, text",
            s
        )),
    }
}
