//! End-to-end tests that drive the `lr` binary.
//!
//! Every run gets its own HOME and database so no user config or totals leak
//! in.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

fn lr_binary() -> String {
    env!("CARGO_BIN_EXE_lr").to_string()
}

fn lr(home: &Path) -> Command {
    let mut cmd = Command::new(lr_binary());
    cmd.env("HOME", home)
        .env("LR_DATABASE_PATH", home.join("lr.db"))
        .env("LR_TICK_INTERVAL_MS", "20")
        .env("LR_BELL", "false")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lr");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for lr")
}

/// Feeds stdin lines one at a time, pausing after each for the given time.
fn run_with_script(mut cmd: Command, script: &[(&str, Duration)]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lr");
    let mut stdin = child.stdin.take().expect("stdin is piped");
    for (line, wait) in script {
        writeln!(stdin, "{line}").expect("failed to write stdin");
        stdin.flush().expect("failed to flush stdin");
        thread::sleep(*wait);
    }
    drop(stdin);
    child.wait_with_output().expect("failed to wait for lr")
}

fn today_json(home: &Path) -> serde_json::Value {
    let output = lr(home).args(["today", "--json"]).output().unwrap();
    assert!(
        output.status.success(),
        "lr today should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn resolve_prints_canonical_id() {
    let temp = TempDir::new().unwrap();
    let output = lr(temp.path())
        .args(["resolve", "https://www.youtube.com/shorts/dQw4w9WgXcQ"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "dQw4w9WgXcQ\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n"
    );
}

#[test]
fn resolve_rejects_invalid_reference() {
    let temp = TempDir::new().unwrap();
    let output = lr(temp.path()).args(["resolve", "not a url"]).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Please enter a valid YouTube link or 11-character video ID."),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn fresh_day_starts_at_zero() {
    let temp = TempDir::new().unwrap();
    let today = today_json(temp.path());

    assert_eq!(today["learning_seconds"], 0);
    assert_eq!(today["rest_seconds"], 0);
    assert!(today["day"].is_string());
    assert!(temp.path().join("lr.db").exists());
}

#[test]
fn learn_stops_on_command() {
    let temp = TempDir::new().unwrap();
    let mut cmd = lr(temp.path());
    cmd.args(["learn", "--minutes", "1"]);
    let output = run_with_stdin(cmd, "stop\n");

    assert!(
        output.status.success(),
        "lr learn should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Learning session stopped."), "stdout: {stdout}");

    let today = today_json(temp.path());
    assert_eq!(today["rest_seconds"], 0);
    assert!(today["learning_seconds"].as_u64().unwrap() < 60);
}

#[test]
fn video_rest_credits_full_duration() {
    let temp = TempDir::new().unwrap();
    let output = lr(temp.path())
        .args(["rest", "--video", "https://youtu.be/dQw4w9WgXcQ", "--duration", "1"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "lr rest --video should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("00:01 credited to rest."), "stdout: {stdout}");

    let today = today_json(temp.path());
    assert_eq!(today["rest_seconds"], 1);
    assert_eq!(today["learning_seconds"], 0);
}

#[test]
fn video_rest_rejects_invalid_reference() {
    let temp = TempDir::new().unwrap();
    let output = lr(temp.path())
        .args(["rest", "--video", "not a url", "--duration", "10"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Please enter a valid YouTube link or 11-character video ID."),
        "unexpected stderr: {stderr}"
    );
    assert_eq!(today_json(temp.path())["rest_seconds"], 0);
}

#[test]
fn reset_zeroes_today() {
    let temp = TempDir::new().unwrap();
    let output = lr(temp.path())
        .args(["rest", "--video", "dQw4w9WgXcQ", "--duration", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(today_json(temp.path())["rest_seconds"], 1);

    let output = lr(temp.path()).arg("reset").output().unwrap();
    assert!(output.status.success());
    assert_eq!(today_json(temp.path())["rest_seconds"], 0);
}

#[test]
fn plain_rest_stops_on_command() {
    let temp = TempDir::new().unwrap();
    let mut cmd = lr(temp.path());
    cmd.args(["rest", "--minutes", "1"]);
    let output = run_with_stdin(cmd, "stop\n");

    assert!(
        output.status.success(),
        "lr rest should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rest for 01:00."), "stdout: {stdout}");
    assert!(stdout.contains("Rest stopped."), "stdout: {stdout}");

    let today = today_json(temp.path());
    assert_eq!(today["learning_seconds"], 0);
    assert!(today["rest_seconds"].as_u64().unwrap() < 60);
}

#[test]
fn video_rest_excludes_paused_time() {
    let temp = TempDir::new().unwrap();
    let mut cmd = lr(temp.path());
    cmd.args(["rest", "--video", "dQw4w9WgXcQ", "--duration", "100"]);
    let output = run_with_script(
        cmd,
        &[
            ("pause", Duration::from_millis(3000)),
            ("play", Duration::from_millis(1200)),
            ("stop", Duration::ZERO),
        ],
    );

    assert!(
        output.status.success(),
        "lr rest --video should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("credited to rest."), "stdout: {stdout}");

    // Roughly 1.2s of playback; the 3s pause must not count.
    let rest = today_json(temp.path())["rest_seconds"].as_u64().unwrap();
    assert!((1..=3).contains(&rest), "rest_seconds = {rest}");
}
