use inkframe::{EngineConfig, Raster, session};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let script = session::ReplayScript::from_json_str(include_str!("../tests/data/session.json"))?;
    let out = session::replay(&script, EngineConfig::default())?;

    for (frame, blob) in out.store.iter() {
        println!("frame {}: {} bytes", frame.0, blob.len());
    }
    let inked = out
        .display
        .pixels()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count();
    println!("final display: {inked} non-transparent pixels");
    Ok(())
}
