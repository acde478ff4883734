use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pandocify_config::Config;
use pandocify_engine::{Dialect, Pipeline, PipelineConfig, Splitter, io};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pandocify")]
#[command(version, about = "Convert Markua and Leanpub manuscripts to Pandoc Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    pandocify --manuscript ./manuscript build           Build the full book
    pandocify split build/book.html                     Update build/full-book.json
    pandocify lectures build/book.html build/lectures   One file per lecture
    pandocify detect manuscript/chapter1.md             Show a file's dialect
    pandocify init ./manuscript                         Write a default config file")]
struct Cli {
    /// Config file (defaults to ~/.config/pandocify/config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Manuscript directory; uses default settings instead of a config file
    #[arg(short, long, value_name = "DIR", global = true)]
    manuscript: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every manifest chapter and join them into one document
    Build {
        /// Output file (defaults to <build>/full-pandoc-markdown.md)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write each converted chapter as NN-<name> into this directory
        #[arg(long, value_name = "DIR")]
        chapters_dir: Option<PathBuf>,
    },
    /// Split an annotated document into sections and merge them into book metadata
    Split {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Metadata file (defaults to <build>/full-book.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Split an annotated document into one file per lecture
    Lectures {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
    },
    /// Convert every *.md file in the manuscript directory in place
    Migrate,
    /// Print the dialect a file is detected as
    Detect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Write a config file with default settings for a manuscript directory
    Init {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match &cli.command {
        Command::Build {
            output,
            chapters_dir,
        } => build(&resolve_config(&cli)?, output.as_deref(), chapters_dir.as_deref()),
        Command::Split { input, output } => split(&resolve_config(&cli)?, input, output.as_deref()),
        Command::Lectures { input, out_dir } => {
            let config = resolve_config(&cli)?;
            let written = io::write_lecture_files(input, out_dir, &splitter(&config))?;
            log::info!("Wrote {} lecture files to {}", written.len(), out_dir.display());
            Ok(())
        }
        Command::Migrate => migrate(&resolve_config(&cli)?),
        Command::Init { dir } => init(cli.config.as_deref(), dir),
        Command::Detect { file } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", Dialect::detect(&text));
            Ok(())
        }
    }
}

/// `--manuscript` wins, then `--config`, then the default config file.
fn resolve_config(cli: &Cli) -> Result<Config> {
    if let Some(manuscript) = &cli.manuscript {
        let config = Config::new(manuscript);
        io::validate_manuscript_dir(&config.manuscript_path)?;
        return Ok(config);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let loaded = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let config = match loaded {
        Some(config) => config,
        None => bail!(
            "No manuscript given and no config file at {}\nUsage: pandocify --manuscript <DIR> <COMMAND>",
            config_path.display()
        ),
    };

    if let Err(e) = io::validate_manuscript_dir(&config.manuscript_path) {
        bail!(
            "Manuscript path '{}' from config file '{}' is invalid: {e}",
            config.manuscript_path.display(),
            config_path.display()
        );
    }
    log::debug!("Using config file {}", config_path.display());
    Ok(config)
}

fn pipeline(config: &Config) -> Pipeline {
    Pipeline::new(PipelineConfig::new(config.resources_path()))
}

fn splitter(config: &Config) -> Splitter {
    Splitter::new().dedent(config.dedent_lecture_lines)
}

fn build(config: &Config, output: Option<&Path>, chapters_dir: Option<&Path>) -> Result<()> {
    let files = io::read_manifest(&config.manifest_path())?;
    let chapters = io::convert_chapters(&config.manuscript_path, files, &pipeline(config))?;

    if let Some(dir) = chapters_dir {
        io::write_chapters(&chapters, dir)?;
        log::info!("Wrote {} chapters to {}", chapters.len(), dir.display());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.build_dir().join("full-pandoc-markdown.md"));
    write_output(&output, &io::join_chapters(&chapters))?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

fn split(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.build_dir().join("full-book.json"));
    let book = io::split_into_metadata(input, &output, &splitter(config))?;
    println!(
        "{} sections, {} lectures",
        book.sections.len(),
        book.lecture_counts().iter().sum::<usize>()
    );
    Ok(())
}

fn migrate(config: &Config) -> Result<()> {
    let pattern = config.manuscript_path.join("*.md");
    let pipeline = pipeline(config);
    let mut changed = 0;

    for entry in glob::glob(&pattern.to_string_lossy()).context("Invalid manuscript path")? {
        let path = entry?;
        if io::migrate_file(&path, &pipeline)? {
            log::info!("Migrated {}", path.display());
            changed += 1;
        } else {
            log::debug!("Unchanged {}", path.display());
        }
    }

    println!("Migrated {changed} files");
    Ok(())
}

/// Save default settings to `config_path`, or the default config location
fn init(config_path: Option<&Path>, manuscript: &Path) -> Result<()> {
    io::validate_manuscript_dir(manuscript)?;
    let manuscript = fs::canonicalize(manuscript)
        .with_context(|| format!("Failed to resolve {}", manuscript.display()))?;
    let config = Config::new(manuscript);

    match config_path {
        Some(path) => config.save_to_path(path)?,
        None => config.save()?,
    }
    println!(
        "Wrote config for {} to {}",
        config.manuscript_path.display(),
        config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::config_path)
            .display()
    );
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
