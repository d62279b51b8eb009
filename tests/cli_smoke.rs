mod support;

use std::path::PathBuf;
use std::process::Command;

fn bin() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_scenecast")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "scenecast.exe"
            } else {
                "scenecast"
            });
            p
        })
}

#[test]
fn plan_prints_timeline_json() {
    let Some(font) = support::find_system_font() else {
        eprintln!("skipping: no system font found");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    let project_path = dir.path().join("project.json");
    let project = serde_json::json!({
        "scenes": [
            { "index": 1, "text": "ten words of narration text for the first scene here" },
            { "index": 2, "text": "short one" }
        ],
        "config": {
            "canvas": { "width": 64, "height": 36 },
            "fps": 10,
            "font": { "path": font },
            "transition": { "kind": "none", "duration_sec": 0.0 }
        }
    });
    std::fs::write(&project_path, serde_json::to_vec_pretty(&project).unwrap()).unwrap();

    let out = Command::new(bin())
        .args(["plan", "--in"])
        .arg(&project_path)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "plan failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("total_duration_sec"));
    assert!(stdout.contains("\"scene\":1"));
}

#[test]
fn missing_project_file_fails_with_context() {
    let out = Command::new(bin())
        .args(["plan", "--in", "does/not/exist.json"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("open project"));
}

#[test]
fn unknown_transition_in_project_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let project_path = dir.path().join("project.json");
    let project = serde_json::json!({
        "scenes": [ { "index": 1, "text": "hello world" } ],
        "config": { "transition": { "kind": "wipe" } }
    });
    std::fs::write(&project_path, serde_json::to_vec_pretty(&project).unwrap()).unwrap();

    let out = Command::new(bin())
        .args(["plan", "--in"])
        .arg(&project_path)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown transition kind"));
}
