use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use consent_editor_core::{
    EditorConfig, EditorSession, HeadlessPlatform, ImportFile, Importer, TableSpec, sanitize,
};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "Consent editor - sanitize, preview and export consent content", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Editor configuration (.json or .toml)
    #[arg(long, global = true, env = "CONSENT_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sanitized fragment of a markup file (`-` for stdin)
    Sanitize { input: PathBuf },
    /// Write the live-preview document for a markup file
    Preview {
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the downloadable document for a markup file
    Export {
        input: PathBuf,

        /// Document title (defaults to the configured export title)
        #[arg(long)]
        title: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import an .html/.htm or .txt file and print the sanitized fragment
    Import { file: PathBuf },
    /// Print the markup for a table, e.g. `3x2`
    Table {
        dimensions: String,

        /// Add a header row
        #[arg(long)]
        header: bool,
    },
    /// Write the effective configuration to a .json or .toml file
    WriteConfig { path: PathBuf },
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    run(cli.command, config)
}

fn run(command: Commands, config: EditorConfig) -> Result<()> {
    match command {
        Commands::Sanitize { input } => {
            let markup = read_input(&input)?;
            println!("{}", sanitize(&markup).trim());
        }
        Commands::Preview { input, out } => {
            let session = load_session(config, &input)?;
            write_output(out.as_deref(), &session.artifacts().preview)?;
        }
        Commands::Export { input, title, out } => {
            let mut config = config;
            if let Some(title) = title {
                config.export_title = title;
            }
            let session = load_session(config, &input)?;
            write_output(out.as_deref(), &session.export_document())?;
        }
        Commands::Import { file } => {
            let bytes = std::fs::read(&file).into_diagnostic()?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let importer = Importer::new(config.pdf_mode);
            let mut session = EditorSession::new(config, HeadlessPlatform::new());
            session.import(&importer, &ImportFile::new(name, bytes))?;
            println!("{}", session.artifacts().fragment);
        }
        Commands::Table { dimensions, header } => {
            let mut spec = TableSpec::parse_dimensions(&dimensions, &config.table)?;
            spec.header = header;
            println!("{}", spec.to_html());
        }
        Commands::WriteConfig { path } => {
            config.save(&path)?;
            tracing::info!(path = %path.display(), "wrote configuration");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Ok(EditorConfig::load(path)?)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn load_session(config: EditorConfig, input: &Path) -> Result<EditorSession> {
    let markup = read_input(input)?;
    Ok(EditorSession::with_content(
        config,
        HeadlessPlatform::new(),
        &markup,
    ))
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut markup = String::new();
        std::io::stdin()
            .read_to_string(&mut markup)
            .into_diagnostic()?;
        return Ok(markup);
    }
    if !input.exists() {
        return Err(miette::miette!("Input file not found: {}", input.display()));
    }
    std::fs::read_to_string(input).into_diagnostic()
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).into_diagnostic()?;
                }
            }
            std::fs::write(path, contents).into_diagnostic()?;
            tracing::info!(path = %path.display(), bytes = contents.len(), "wrote document");
        }
        None => println!("{contents}"),
    }
    Ok(())
}

fn init_tracing() {
    let default = if cfg!(debug_assertions) { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
