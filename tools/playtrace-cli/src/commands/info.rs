//! Show an exported session's metadata.

use std::path::PathBuf;

use playtrace_export_engine::export::{
    load_meta, KEYS_FILENAME, SCREENS_FILENAME, VIDEO_FILENAME,
};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let meta = load_meta(&path)?;

    println!("Session: {}", path.display());
    println!("  Created: {}", meta.created);
    println!("  Items: {}", meta.items);
    println!("  Duration: {:.2}s", meta.duration_secs);
    println!("  Average rate: {:.2} fps", meta.average_fps);
    println!("  Frame size: {}x{}", meta.frame.width, meta.frame.height);
    println!("  Key order: {}", meta.key_order.join(", "));
    println!();

    for artifact in [SCREENS_FILENAME, KEYS_FILENAME, VIDEO_FILENAME] {
        let file = path.join(artifact);
        match std::fs::metadata(&file) {
            Ok(stat) => println!("  {artifact}: {} bytes", stat.len()),
            Err(_) => println!("  {artifact}: missing"),
        }
    }

    Ok(())
}
