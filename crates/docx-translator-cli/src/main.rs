//! PDF to DOCX CLI - convert a PDF to Word and optionally translate it.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docx_translator_core::{
    AppConfig, ConversionPipeline, ConversionRequest, LanguageCatalog, SourceLang,
    TranslatorBackend, translator::Progress,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendOption {
    Google,
    Openai,
}

impl From<BackendOption> for TranslatorBackend {
    fn from(opt: BackendOption) -> Self {
        match opt {
            BackendOption::Google => Self::Google,
            BackendOption::Openai => Self::OpenAi,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf2docx-translate")]
#[command(author, version, about = "Convert PDF documents to Word, optionally translated", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Input PDF file
    #[arg(required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Output base name (default: input file name); .docx/.pdf is stripped
    #[arg(short, long)]
    output: Option<String>,

    /// Directory for the result (default: the input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// First page to convert (1-based)
    #[arg(long)]
    start: Option<u32>,

    /// Last page to convert (1-based)
    #[arg(long)]
    end: Option<u32>,

    /// Let the converter use several processes
    #[arg(long)]
    multi_processing: bool,

    /// Translate the converted document
    #[arg(long)]
    translate: bool,

    /// Target language code or name (default from config: zh-TW)
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Source language code, or "auto"
    #[arg(short = 's', long)]
    source: Option<SourceLang>,

    /// Render the translated document to PDF
    #[arg(long)]
    to_pdf: bool,

    /// Translation backend
    #[arg(long, value_enum)]
    backend: Option<BackendOption>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// pdf2docx executable
    #[arg(long)]
    pdf2docx_bin: Option<PathBuf>,

    /// LibreOffice executable
    #[arg(long)]
    soffice_bin: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the supported target languages and exit
    #[arg(long)]
    list_languages: bool,
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(source) = &args.source {
        config.source_lang = source.clone();
    }
    if let Some(backend) = args.backend {
        config.translator.backend = backend.into();
    }
    if config.translator.backend == TranslatorBackend::OpenAi {
        if let Some(api_base) = &args.api_base {
            config.translator.api_base = Some(api_base.clone());
        }
        if let Some(api_key) = &args.api_key {
            config.translator.api_key = Some(api_key.clone());
        }
        if let Some(model) = &args.model {
            config.translator.model.clone_from(model);
        }
    }
    if let Some(program) = &args.pdf2docx_bin {
        config.converter.program.clone_from(program);
    }
    if let Some(program) = &args.soffice_bin {
        config.renderer.program.clone_from(program);
    }
}

// CLI output is intentional
#[allow(clippy::print_stdout)]
fn print_languages(catalog: &LanguageCatalog) {
    for option in catalog.options() {
        println!("{:<8} {}", option.code, option.name);
    }
}

/// Whether writing `output` would replace the file being converted
fn overwrites_input(input: &Path, output: &Path) -> bool {
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    }
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let catalog = LanguageCatalog::google();
    if args.list_languages {
        print_languages(&catalog);
        return Ok(());
    }

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::load_layered(Some(config_path.as_path())).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    apply_overrides(&mut config, &args);

    let target = match &args.target {
        Some(target) => catalog.resolve(target)?,
        None => config.default_target_lang.clone(),
    };

    let input = args
        .input
        .as_deref()
        .context("An input PDF is required")?;
    info!("Loading PDF: {}", input.display());
    let pdf = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    let request = ConversionRequest {
        upload_name: input.file_name().map(|n| n.to_string_lossy().into_owned()),
        output_name: args.output.clone(),
        start_page: args.start,
        end_page: args.end,
        multi_processing: args.multi_processing,
        translate: args.translate,
        source: config.source_lang.clone(),
        to_pdf: args.to_pdf,
        ..ConversionRequest::new(pdf, target)
    };

    let pipeline =
        ConversionPipeline::from_config(&config).context("Failed to initialize translator")?;

    let pb = if args.translate {
        progress_bar()
    } else {
        ProgressBar::hidden()
    };
    let report_progress = |done: usize, total: usize| {
        pb.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        pb.set_position(u64::try_from(done).unwrap_or(u64::MAX));
    };
    let progress = args.translate.then_some(&report_progress as Progress<'_>);
    let output = pipeline
        .run(request, progress)
        .await
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    pb.finish_and_clear();

    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let output_path = out_dir.join(&output.file_name);
    if overwrites_input(input, &output_path) {
        anyhow::bail!(
            "Refusing to overwrite the input {}; pass --output or --out-dir",
            input.display()
        );
    }

    // Save output
    tokio::fs::write(&output_path, &output.bytes)
        .await
        .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Saved to: {}", output_path.display());
    }

    Ok(())
}
