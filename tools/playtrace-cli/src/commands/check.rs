//! Check system capabilities for recording and export.

use playtrace_export_engine::video::ffmpeg_available;

pub fn run() -> anyhow::Result<()> {
    println!("Playtrace capability check");
    println!();

    let ffmpeg = ffmpeg_available();
    println!(
        "  ffmpeg (video export): {}",
        if ffmpeg { "found" } else { "NOT FOUND" }
    );

    #[cfg(target_os = "linux")]
    {
        use playtrace_capture_engine::backend::evdev::EvdevKeySource;
        let keyboard = EvdevKeySource::is_supported();
        println!(
            "  evdev keyboard hook: {}",
            if keyboard {
                "available"
            } else {
                "unavailable (stub fallback will capture nothing)"
            }
        );
    }

    #[cfg(not(target_os = "linux"))]
    println!("  keyboard hook: no backend for this platform (stub fallback)");

    println!("  frame grabber: none built in — plug a FrameSource or use --synthetic");
    println!();

    if ffmpeg {
        println!("Ready to record (with a frame source).");
    } else {
        println!("Install ffmpeg to enable session export.");
    }

    Ok(())
}
