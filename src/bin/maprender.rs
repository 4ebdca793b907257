use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maprender::{
    EncodeOpts, ImageEncoding, MapRenderer, RendererOpts, Rgba8, SceneDef, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "maprender", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene file to a single image.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Background color as RRGGBB or RRGGBBAA; overrides the scene file.
    #[arg(long)]
    background: Option<String>,

    /// Device pixels per viewport pixel.
    #[arg(long, default_value_t = 1.0)]
    density: f64,

    /// Write JPEG instead of PNG.
    #[arg(long, default_value_t = false)]
    jpeg: bool,

    /// Fit the viewport to the scene's data, keeping the scene's pixel size (or 512x512).
    #[arg(long, default_value_t = false)]
    fit: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let def = SceneDef::from_path(&args.in_path)?;
    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let scene = def.build(assets_root)?;

    let viewport = if args.fit {
        let extent = scene
            .extent
            .context("--fit needs at least one feature with extent")?;
        let (w, h) = scene
            .viewport
            .map(|v| (v.width, v.height))
            .unwrap_or((512.0, 512.0));
        Viewport::fit(extent, w, h)?
    } else {
        scene
            .viewport
            .context("scene has no viewport; pass --fit to derive one")?
    };

    let background = match args.background.as_deref() {
        Some(hex) => Some(Rgba8::from_hex(hex)?),
        None => scene.background,
    };
    let opts = EncodeOpts {
        background,
        pixel_density: args.density,
        format: if args.jpeg {
            ImageEncoding::jpeg()
        } else {
            ImageEncoding::Png
        },
    };

    let mut renderer = MapRenderer::new(RendererOpts::from_env())?.with_bitmaps(scene.bitmaps);
    let bytes = renderer.try_render_to_encoded_image(&viewport, &scene.layers, &opts)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
