use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "inkframe", version)]
struct Cli {
    /// Engine config JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the procedural grunge mask as a PNG.
    Texture(TextureArgs),
    /// Replay a scripted drawing session and write every annotated frame.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct TextureArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the texture side length.
    #[arg(long)]
    size: Option<u32>,

    /// Override the texture seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Session script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Directory receiving `frame_<n>.png` and `display.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => inkframe::EngineConfig::from_path(path)?,
        None => inkframe::EngineConfig::default(),
    }
    .with_env_overrides();

    match cli.cmd {
        Command::Texture(args) => cmd_texture(args, config),
        Command::Replay(args) => cmd_replay(args, config),
    }
}

fn cmd_texture(args: TextureArgs, mut config: inkframe::EngineConfig) -> anyhow::Result<()> {
    if let Some(size) = args.size {
        config.grunge_texture_size = size;
    }
    if let Some(seed) = args.seed {
        config.texture_seed = seed;
    }
    config.validate()?;

    let texture = inkframe::GrungeTexture::generate(config.texture_params());
    let blob = inkframe::encode_png(&texture.to_surface())?;
    write_file(&args.out, blob.bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_replay(args: ReplayArgs, config: inkframe::EngineConfig) -> anyhow::Result<()> {
    let script = inkframe::session::ReplayScript::from_path(&args.script)?;
    let outcome = inkframe::session::replay(&script, config)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (frame, blob) in outcome.store.iter() {
        let path = args.out_dir.join(format!("frame_{}.png", frame.0));
        write_file(&path, blob.bytes())?;
    }
    let display = inkframe::encode_png(&outcome.display)?;
    write_file(&args.out_dir.join("display.png"), display.bytes())?;

    eprintln!(
        "replayed {} strokes, {} annotated frames -> {}",
        outcome.strokes_committed,
        outcome.store.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
