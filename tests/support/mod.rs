#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Locate a parseable TTF/OTF so tests can construct a real engine.
pub fn find_system_font() -> Option<PathBuf> {
    for root in ["/usr/share/fonts", "/usr/local/share/fonts"] {
        for entry in walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("ttf") | Some("otf"))
                && let Ok(bytes) = std::fs::read(path)
                && fontdue::Font::from_bytes(bytes.as_slice(), fontdue::FontSettings::default())
                    .is_ok()
            {
                return Some(path.to_path_buf());
            }
        }
    }
    None
}

pub fn ffmpeg_tools_available() -> bool {
    let ok = |bin: &str| {
        Command::new(bin)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    };
    ok("ffmpeg") && ok("ffprobe")
}
