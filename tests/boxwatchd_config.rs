use std::sync::Mutex;

use tempfile::NamedTempFile;

use boxwatch::config::BoxwatchConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "BOXWATCH_CONFIG",
        "BOXWATCH_CAMERA_URL",
        "BOXWATCH_REPORT_URL",
        "BOXWATCH_DETECTOR_CMD",
        "BOXWATCH_WORKSPACE_DIR",
        "BOXWATCH_CONF_THRESHOLD",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "url": "http://192.168.240.108:5000/capture",
            "timeout_secs": 3
        },
        "report": {
            "url": "https://validation.example/rest/api/post",
            "timeout_secs": 8
        },
        "detector": {
            "cmd": "python detect.py --weights best.pt",
            "conf_threshold": 0.4
        },
        "workspace_dir": "inspection_runs",
        "intervals": {
            "preview_ms": 250,
            "footer_ms": 2000
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("BOXWATCH_CONFIG", file.path());
    std::env::set_var("BOXWATCH_CAMERA_URL", "stub://bench_camera");
    std::env::set_var("BOXWATCH_CONF_THRESHOLD", "0.25");

    let cfg = BoxwatchConfig::load().expect("load config");

    // Env wins over file.
    assert_eq!(cfg.camera.url, "stub://bench_camera");
    assert_eq!(cfg.detector.conf_threshold, 0.25);
    // File wins over defaults.
    assert_eq!(cfg.camera.timeout.as_secs(), 3);
    assert_eq!(
        cfg.report.url.as_deref(),
        Some("https://validation.example/rest/api/post")
    );
    assert_eq!(cfg.report.timeout.as_secs(), 8);
    assert_eq!(cfg.detector.cmd, "python detect.py --weights best.pt");
    assert_eq!(cfg.workspace_dir.to_str().unwrap(), "inspection_runs");
    assert_eq!(cfg.preview_interval.as_millis(), 250);
    assert_eq!(cfg.footer_interval.as_millis(), 2000);

    clear_env();
}

#[test]
fn defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = BoxwatchConfig::load().expect("load defaults");

    assert_eq!(cfg.camera.url, "stub://bench_camera");
    assert_eq!(cfg.camera.timeout.as_secs(), 5);
    assert!(cfg.report.url.is_none());
    assert_eq!(cfg.detector.cmd, "stub://box_oracle");
    assert_eq!(cfg.detector.conf_threshold, 0.25);
    assert_eq!(cfg.preview_interval.as_millis(), 100);
    assert_eq!(cfg.footer_interval.as_millis(), 1000);

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("BOXWATCH_CAMERA_URL", "rtsp://camera-1");
    assert!(BoxwatchConfig::load().is_err());
    clear_env();

    std::env::set_var("BOXWATCH_CONF_THRESHOLD", "1.5");
    assert!(BoxwatchConfig::load().is_err());
    clear_env();

    std::env::set_var("BOXWATCH_CONF_THRESHOLD", "not a number");
    assert!(BoxwatchConfig::load().is_err());
    clear_env();
}
