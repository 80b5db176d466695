use clap::{Args, Parser, Subcommand};
use image_chain::config::{self, ImageProfile, Settings};
use image_chain::imaging::{Operation, OutputFormat};
use image_chain::{ImageManager, ImageOperations, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("IMAGE_CHAIN_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("IMAGE_CHAIN_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "image-chain")]
#[command(about = "Chainable image transformations with suffixed outputs and thumbnails")]
#[command(long_about = "\
Chainable image transformations with suffixed outputs and thumbnails

Operations run in the order given. With suffixes on, each operation adds a
token to the output name:

  image-chain process photos/a.jpg --op sepia --op resize=100x100 --format png
  → photos/a_sep_100x100.png

Operations:
  resize=WxH[:crop|max|stretch]   crop=WxH          flip[=horizontal|vertical|none]
  brightness=N   hue=DEG   saturate=N   opacity=N   lightness=N
  sepia  grayscale  black-white  kodachrome  polaroid  invert
  gaussian-blur  bokeh-blur  box-blur  glow  vignette  oil-paint  pixelate
  auto-orient

A profile (--profile NAME) also writes one thumbnail per configured size
into <output>/<NAME>/<W>x<H>/.

Run 'image-chain gen-config' to generate a documented image-chain.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Settings file (missing file means stock defaults)
    #[arg(long, default_value = "image-chain.toml", global = true)]
    config: PathBuf,

    /// Log every step and written file
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that build a chain.
#[derive(Args, Clone)]
struct ChainArgs {
    /// Source image
    input: PathBuf,

    /// Operation to append, repeatable (e.g. --op sepia --op resize=200x100)
    #[arg(long = "op", value_name = "OP")]
    ops: Vec<Operation>,

    /// Output folder (defaults to the source folder)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file name to derive from (defaults to the source file name)
    #[arg(long)]
    name: Option<String>,

    /// Output format (defaults to the source extension's format)
    #[arg(short, long)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply operations and save the result
    Process {
        #[command(flatten)]
        chain: ChainArgs,

        /// Leave operation suffixes out of the output name
        #[arg(long)]
        no_suffixes: bool,

        /// Also write the thumbnails of this profile
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print where `process` would write, without touching disk
    Locate {
        #[command(flatten)]
        chain: ChainArgs,
    },
    /// Delete an image and its profile thumbnails
    Delete {
        /// Image to delete
        path: PathBuf,

        /// Profile whose thumbnails to delete as well, repeatable
        #[arg(long, conflicts_with = "all_profiles")]
        profile: Vec<String>,

        /// Delete thumbnails of every configured profile
        #[arg(long)]
        all_profiles: bool,
    },
    /// List configured profiles
    Profiles,
    /// Print a stock image-chain.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Process {
            chain,
            no_suffixes,
            profile,
        } => {
            let manager = load_manager(&cli.config)?;
            let (ops, folder, name, format) = resolve_chain(&manager, &chain)?;
            let saved = ops.save(&folder, &name, format, !no_suffixes, profile.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else {
                output::print_save_output(&saved);
            }
        }
        Command::Locate { chain } => {
            let manager = load_manager(&cli.config)?;
            let (ops, folder, name, format) = resolve_chain(&manager, &chain)?;
            let location = ops.simulate_location(folder, &name, format)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&location)?);
            } else {
                output::print_location(&location);
            }
        }
        Command::Delete {
            path,
            profile,
            all_profiles,
        } => {
            let manager = load_manager(&cli.config)?;
            let profiles = selected_profiles(&manager, &profile, all_profiles)?;
            let report = manager.delete_path(&with_folder(&path), profiles.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_delete_output(&report);
            }
        }
        Command::Profiles => {
            let manager = load_manager(&cli.config)?;
            let profiles = &manager.settings().profiles;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(profiles)?);
            } else {
                output::print_profiles(profiles);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load settings, size the thread pool and build the manager.
fn load_manager(path: &Path) -> Result<ImageManager, config::ConfigError> {
    let settings = config::load_settings(path)?;
    init_thread_pool(&settings.processing);
    Ok(ImageManager::new(settings))
}

/// Build the chain and work out where its output goes.
fn resolve_chain(
    manager: &ImageManager,
    args: &ChainArgs,
) -> Result<(ImageOperations, PathBuf, String, OutputFormat), Box<dyn std::error::Error>> {
    let ops = args
        .ops
        .iter()
        .fold(manager.for_path(&with_folder(&args.input))?, |chain, op| {
            chain.then(*op)
        });

    let folder = args
        .output
        .clone()
        .unwrap_or_else(|| ops.source_folder().to_path_buf());
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| ops.source_file_name().to_string());
    let format = args
        .format
        .or_else(|| format_from_name(&args.input))
        .unwrap_or(OutputFormat::Png);
    Ok((ops, folder, name, format))
}

/// Bare file names refer to the current directory.
fn with_folder(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}

fn format_from_name(path: &Path) -> Option<OutputFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(OutputFormat::from_extension)
}

/// Profiles named on the command line, all profiles, or none.
fn selected_profiles(
    manager: &ImageManager,
    names: &[String],
    all: bool,
) -> Result<Option<Vec<ImageProfile>>, Box<dyn std::error::Error>> {
    let settings: &Settings = manager.settings();
    if all {
        return Ok(Some(settings.profiles.clone()));
    }
    if names.is_empty() {
        return Ok(None);
    }
    let profiles = names
        .iter()
        .map(|name| manager.profile(name).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(profiles))
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "image_chain=debug" } else { "image_chain=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
