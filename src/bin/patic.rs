use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use patic_animator::{Animator, AnimatorOptions, ExportFormat, FieldDocument};

#[derive(Parser, Debug)]
#[command(name = "patic", version, about = "Render phase fields with p-atic order-parameter glyphs")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Preview(PreviewArgs),
    /// Export every frame as a GIF or MP4 (`mp4` requires `ffmpeg` on PATH).
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct Input {
    /// Field JSON document: `{"shape": [nt, ny, nx], "re": [...], "im": [...]}`.
    #[arg(long)]
    field: PathBuf,

    /// Display options JSON document.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Glyph degree p (1 = director, 2 = nematic, 3+ = polygon).
    #[arg(long)]
    p: u32,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: Input,

    /// Frame index (0-based); clamps to the last frame.
    #[arg(long)]
    frame: Option<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    #[command(flatten)]
    input: Input,

    /// Output container: gif or mp4.
    #[arg(long, default_value = "gif")]
    format: String,

    /// Directory receiving `PAA_<timestamp>.<ext>`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Animate(args) => cmd_animate(args),
    }
}

fn load(input: &Input) -> anyhow::Result<Animator> {
    let doc: FieldDocument = read_json(&input.field)?;
    let field = doc.into_field()?;
    let mut animator = Animator::new(input.p, Some(field), None, None)?;
    if let Some(path) = &input.options {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        let options = AnimatorOptions::from_json(&text)
            .with_context(|| format!("parse options '{}'", path.display()))?;
        animator.apply_options(&options)?;
    }
    Ok(animator)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse '{}'", path.display()))
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let animator = load(&args.input)?;
    let frame = animator.preview_png(args.frame, &args.out)?;
    eprintln!("wrote frame {} to {}", frame.index.0, args.out.display());
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let format: ExportFormat = args.format.parse()?;
    let animator = load(&args.input)?;
    let path = animator.animate(format, &args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
