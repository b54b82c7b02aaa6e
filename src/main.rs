use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tile_grid::GridRequest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilekit::app::{self, DEFAULT_TEXT_FILE};
use tilekit::assets::AssetLoader;
use tilekit::error::ToolError;
use tilekit::models::ResizeFilter;
use tilekit::services::{write_text, ResizeMode, ResizeRequest};

#[derive(Parser)]
#[command(name = "tilekit", version)]
#[command(about = "Split images into tiles, extract text and colours, resize")]
struct Cli {
    /// Config file (overrides TILEKIT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an image into a zip archive of PNG tiles
    Split {
        /// Input image (png, jpg, jpeg, bmp, tif, tiff, webp)
        input: PathBuf,

        /// Number of tile rows
        #[arg(short, long, default_value_t = 1)]
        rows: u32,

        /// Number of tile columns
        #[arg(short, long, default_value_t = 1)]
        cols: u32,

        /// Output archive or directory (default: <stem>_split_<R>x<C>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract text with Tesseract
    Ocr {
        input: PathBuf,

        /// Write the text to a file instead of stdout
        /// (a directory gets extracted_text.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tesseract language, e.g. "eng" or "eng+deu"
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Print the dominant colours
    Palette {
        input: PathBuf,

        /// Number of colours (default from config)
        #[arg(short = 'n', long)]
        colors: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a resized copy
    Resize {
        input: PathBuf,

        #[arg(short = 'W', long)]
        width: Option<u32>,

        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Stretch to exactly WxH instead of fitting inside the box
        #[arg(long)]
        exact: bool,

        /// Resampling filter (default from config)
        #[arg(long, value_enum)]
        filter: Option<ResizeFilter>,

        /// Output file or directory (default: <stem>_<W>x<H>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the embedded default config.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_file = cli
        .config
        .or_else(|| std::env::var("TILEKIT_CONFIG").ok().map(PathBuf::from));
    let loader = AssetLoader::new(config_file);

    let result = match cli.command {
        Some(Commands::Split {
            input,
            rows,
            cols,
            output,
        }) => {
            init_tracing(false);
            run_split_command(&loader, &input, GridRequest::new(rows, cols), output).await
        }
        Some(Commands::Ocr {
            input,
            output,
            lang,
        }) => {
            init_tracing(true);
            run_ocr_command(&loader, &input, output, lang.as_deref()).await
        }
        Some(Commands::Palette {
            input,
            colors,
            json,
        }) => {
            init_tracing(true);
            run_palette_command(&loader, &input, colors, json).await
        }
        Some(Commands::Resize {
            input,
            width,
            height,
            exact,
            filter,
            output,
        }) => {
            init_tracing(false);
            let request = ResizeRequest {
                width,
                height,
                mode: if exact {
                    ResizeMode::Exact
                } else {
                    ResizeMode::Fit
                },
                filter,
            };
            run_resize_command(&loader, &input, request, output).await
        }
        Some(Commands::Init { force, list }) => {
            init_tracing(true);
            run_init_command(&loader, force, list)
        }
        None => {
            run_status_command(&loader);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<ToolError>().map_or(1, ToolError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "tilekit=warn" } else { "tilekit=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    if quiet {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_split_command(
    loader: &AssetLoader,
    input: &Path,
    request: GridRequest,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let state = app::create_app_state(loader);
    let path = state
        .split_to_file(input, request, output.as_deref())
        .await?;
    println!("Wrote {} ({} tiles)", path.display(), request.tile_count());
    Ok(())
}

async fn run_ocr_command(
    loader: &AssetLoader,
    input: &Path,
    output: Option<PathBuf>,
    lang: Option<&str>,
) -> anyhow::Result<()> {
    let state = app::create_app_state(loader);
    let text = state.extract_text(input, lang).await?;

    match output {
        Some(path) => {
            let path = app::output_path(Some(&path), DEFAULT_TEXT_FILE);
            write_text(&path, &text).await?;
            println!("Wrote {} ({} characters)", path.display(), text.chars().count());
        }
        None => print!("{text}"),
    }
    Ok(())
}

async fn run_palette_command(
    loader: &AssetLoader,
    input: &Path,
    colors: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let state = app::create_app_state(loader);
    let palette = state.palette(input, colors).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&palette)?);
        return Ok(());
    }
    for color in &palette {
        println!(
            "{}  rgb({:3}, {:3}, {:3})  {:5.1}%",
            color.hex,
            color.rgb[0],
            color.rgb[1],
            color.rgb[2],
            color.share * 100.0
        );
    }
    Ok(())
}

async fn run_resize_command(
    loader: &AssetLoader,
    input: &Path,
    request: ResizeRequest,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let state = app::create_app_state(loader);
    let path = state
        .resize_to_file(input, request, output.as_deref())
        .await?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Extract the embedded config
fn run_init_command(loader: &AssetLoader, force: bool, list: bool) -> anyhow::Result<()> {
    if list {
        println!("Embedded assets:\n");
        for f in AssetLoader::list_embedded() {
            println!("  {f}");
        }
        return Ok(());
    }

    let report = loader.init(force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command(loader: &AssetLoader) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_file = std::env::var("TILEKIT_CONFIG").ok();
    let tesseract_cmd = std::env::var("TESSERACT_CMD").ok();
    let rust_log = std::env::var("RUST_LOG").ok();

    println!("Tilekit v{VERSION}");
    println!("Image tiles, text, palettes and resizing\n");

    println!("Environment Variables:");
    println!(
        "  TILEKIT_CONFIG = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  TESSERACT_CMD  = {}",
        tesseract_cmd.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  RUST_LOG       = {}",
        rust_log.as_deref().unwrap_or("(not set)")
    );

    println!("\nConfig:  {}", loader.config_source());

    println!("\nCommands:");
    println!("  tilekit split     Split an image into a zip of tiles");
    println!("  tilekit ocr       Extract text with Tesseract");
    println!("  tilekit palette   Print the dominant colours");
    println!("  tilekit resize    Write a resized copy");
    println!("  tilekit init      Write the default config.yaml");
    println!("\nRun 'tilekit --help' for more details.");
}
