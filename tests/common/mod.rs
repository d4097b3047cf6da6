#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

impl CmdResult {
    /// First stdout line parsed as JSON.
    pub fn json(&self) -> Value {
        let line = self.stdout.lines().next().unwrap_or_default();
        serde_json::from_str(line).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({e}); log at {}\n{}",
                self.log_path.display(),
                self.stdout
            )
        })
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_mero") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "mero.exe" } else { "mero" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve mero binary path for integration test"),
    }
}

/// Isolated home directory with a local settings file and a bookmark file.
pub struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create sandbox dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root().join("settings.json")
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.root().join("bookmarks.json")
    }

    pub fn write_bookmarks(&self, forest: &Value) {
        fs::write(self.bookmarks_path(), forest.to_string()).expect("write bookmarks");
    }

    pub fn stored_settings(&self) -> Value {
        let raw = fs::read_to_string(self.settings_path()).expect("read settings");
        serde_json::from_str(&raw).expect("parse settings")
    }

    /// Run `mero --json --settings <..> [--bookmarks <..>] args...`.
    pub fn run(&self, case_name: &str, args: &[&str]) -> CmdResult {
        let settings = self.settings_path().to_string_lossy().to_string();
        let bookmarks = self.bookmarks_path().to_string_lossy().to_string();
        let mut full: Vec<&str> = vec!["--json", "--settings", &settings];
        if self.bookmarks_path().exists() {
            full.extend(["--bookmarks", &bookmarks]);
        }
        full.extend_from_slice(args);
        run_cli_case_in(self.root(), case_name, &full)
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    let home = tempfile::tempdir().expect("create temp home");
    run_cli_case_in(home.path(), case_name, args)
}

fn run_cli_case_in(home: &Path, case_name: &str, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("mero-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home)
        .env("MERO_LOG", "debug")
        .env("RUST_BACKTRACE", "1");
    for var in [
        "MERO_SETTINGS_FILE",
        "MERO_SYNC_FILE",
        "MERO_BOOKMARKS_FILE",
        "MERO_OUTPUT_FORMAT",
        "MERO_SAVE_DEBOUNCE_MS",
        "MERO_TEST_FOLDER_COUNT",
        "MERO_TICK_INTERVAL_MS",
    ] {
        command.env_remove(var);
    }
    let output = command.output().expect("execute mero command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
