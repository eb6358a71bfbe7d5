use std::time::{Duration, Instant};

use holo::core::{AppConfig, FrameLimiter};
use holo::platform::WindowState;

#[test]
fn test_default_config_is_the_demo_setup() {
    let config = AppConfig::default();

    assert_eq!(config.app_name, "holo");
    assert_eq!((config.window.x, config.window.y), (100, 100));
    assert_eq!(config.window.width, 960);
    assert_eq!(config.window.height, 540);
    assert_eq!(config.window.title, "Test");
    assert_eq!(config.window.state, WindowState::Normal);
    assert!(config.device.prefer_standard_clip_space);
    assert!(config.device.prefer_zero_to_one_depth_range);
    assert!(!config.device.prefer_vertical_sync);
    assert_eq!(config.device.depth_format, None);
    assert_eq!(config.target_fps, 60);
}

#[test]
fn test_partial_ron_fills_in_defaults() {
    let parsed: AppConfig = ron::from_str(r#"(app_name: "demo", target_fps: 144)"#).unwrap();

    assert_eq!(parsed.app_name, "demo");
    assert_eq!(parsed.target_fps, 144);
    assert_eq!(parsed.window.width, 960);
    assert!(parsed.device.prefer_standard_clip_space);
}

#[test]
fn test_nested_window_override() {
    let parsed: AppConfig =
        ron::from_str(r#"(window: (title: "mine", width: 320, height: 200, state: Hidden))"#)
            .unwrap();

    assert_eq!(parsed.window.title, "mine");
    assert_eq!(parsed.window.width, 320);
    assert_eq!(parsed.window.height, 200);
    assert_eq!(parsed.window.state, WindowState::Hidden);
    // Fields the file leaves out come from the window defaults.
    assert_eq!((parsed.window.x, parsed.window.y), (100, 100));
}

#[test]
fn test_load_or_default_handles_missing_file() {
    let config = AppConfig::load_or_default("definitely-not-here.ron");
    assert_eq!(config.app_name, "holo");
}

#[test]
fn test_load_or_default_survives_garbage() {
    let path = std::env::temp_dir().join("holo-config-garbage-test.ron");
    std::fs::write(&path, "not ron at all").unwrap();

    let config = AppConfig::load_or_default(&path);
    assert_eq!(config.app_name, "holo");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_uncapped_limiter_never_sleeps() {
    let mut limiter = FrameLimiter::from_fps(0);
    let start = Instant::now();
    for _ in 0..100 {
        limiter.wait();
    }
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn test_limiter_spends_the_frame_budget() {
    // 5ms per frame; two waits must take at least roughly two budgets.
    let mut limiter = FrameLimiter::from_fps(200);
    limiter.wait();

    let start = Instant::now();
    limiter.wait();
    limiter.wait();
    assert!(start.elapsed() >= Duration::from_millis(8));
}
