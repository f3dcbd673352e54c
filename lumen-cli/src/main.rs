//! Lumen CLI
//!
//! Renders a design snapshot to SVG or PNG, or inspects the live scene.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use lumen_common::FetchOptions;
use lumen_export::{ExportOptions, export_svg, rasterize};
use lumen_model::Design;
use lumen_scene::{Stage, StageOptions};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Export a design to SVG on stdout
    lumen export design.json

    # Export to a file and a 2x PNG
    lumen export design.json -o out.svg --png out.png --scale 2

    # Dump the live scene after all content has loaded
    lumen scene design.json

    # List the elements of a vector-source layer
    lumen elements design.json logo
"#)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a design to a standalone SVG document
    Export(ExportArgs),
    /// Mount a design on a live stage and print its scene graph as JSON
    Scene(SceneArgs),
    /// Print the element list of a vector-source layer as JSON
    Elements(ElementsArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Design snapshot (JSON)
    #[arg(value_name = "DESIGN")]
    design: PathBuf,

    /// Never fetch http(s) sources
    #[arg(long)]
    offline: bool,

    /// Link images by source instead of inlining them
    #[arg(long)]
    no_embed: bool,

    /// Leave the canvas background unpainted
    #[arg(long)]
    no_background: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Write the SVG here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also rasterize to a PNG file
    #[arg(long, value_name = "FILE")]
    png: Option<PathBuf>,

    /// Pixel scale for --png
    #[arg(long, default_value = "1.0")]
    scale: f32,
}

#[derive(Args, Debug)]
struct SceneArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Seconds to wait for external content
    #[arg(long, default_value = "30")]
    timeout: u64,
}

#[derive(Args, Debug)]
struct ElementsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Layer id
    #[arg(value_name = "LAYER")]
    layer: String,

    /// Seconds to wait for the document to load
    #[arg(long, default_value = "30")]
    timeout: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Export(args) => run_export(&args),
        Command::Scene(args) => run_scene(&args),
        Command::Elements(args) => run_elements(&args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read a design and resolve relative sources against its directory.
fn load_design(args: &SourceArgs) -> Result<(Design, FetchOptions)> {
    let text = fs::read_to_string(&args.design)
        .with_context(|| format!("cannot read {}", args.design.display()))?;
    let design = Design::from_json(&text)
        .with_context(|| format!("{} is not a valid design", args.design.display()))?;
    let fetch = FetchOptions {
        allow_remote: !args.offline,
        base_dir: args.design.parent().map(Path::to_path_buf),
        ..FetchOptions::default()
    };
    Ok((design, fetch))
}

fn mount(args: &SourceArgs) -> Result<Stage> {
    let (design, fetch) = load_design(args)?;
    let mut stage = Stage::new(StageOptions {
        fetch,
        embed_images: !args.no_embed,
        include_background: !args.no_background,
    });
    stage.mount(design);
    Ok(stage)
}

fn settle(stage: &mut Stage, seconds: u64) {
    if !stage.wait_for_loads(Duration::from_secs(seconds)) {
        eprintln!(
            "{} {} source(s) still loading after {seconds}s",
            "warning:".yellow().bold(),
            stage.pending_loads()
        );
    }
}

fn run_export(args: &ExportArgs) -> Result<()> {
    let (design, fetch) = load_design(&args.source)?;
    let export = export_svg(
        &design,
        &ExportOptions {
            fetch,
            embed_images: !args.source.no_embed,
            include_background: !args.source.no_background,
        },
    );

    match &args.output {
        Some(path) => {
            fs::write(path, &export.markup)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!(
                "{} {} ({}x{}, {} layers, {} definitions)",
                "saved".green().bold(),
                path.display(),
                export.width,
                export.height,
                export.layers.len(),
                export.resource_count
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(export.markup.as_bytes())?;
            writeln!(stdout)?;
        }
    }

    if let Some(path) = &args.png {
        let png = rasterize(&export, args.scale)?;
        fs::write(path, png).with_context(|| format!("cannot write {}", path.display()))?;
        eprintln!("{} {}", "saved".green().bold(), path.display());
    }
    Ok(())
}

fn run_scene(args: &SceneArgs) -> Result<()> {
    let mut stage = mount(&args.source)?;
    settle(&mut stage, args.timeout);
    let Some(snapshot) = stage.snapshot() else {
        bail!("scene has no root");
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_elements(args: &ElementsArgs) -> Result<()> {
    let mut stage = mount(&args.source)?;
    settle(&mut stage, args.timeout);
    let elements = stage
        .vector_elements(&args.layer)
        .with_context(|| format!("layer '{}'", args.layer))?;
    println!("{}", serde_json::to_string_pretty(&elements)?);
    Ok(())
}
