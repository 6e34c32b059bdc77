use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct CclRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl CclRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A scratch directory the binary runs in.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// Write `body` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, body).expect("write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).expect("read file")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.root).join(relative).exists()
    }
}

pub fn run_ccltc<I, S>(workspace: &Workspace, args: I, label: &str) -> CclRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_ccltc_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_ccltc_with_env<I, S, E, K, V>(
    workspace: &Workspace,
    args: I,
    env_vars: E,
    label: &str,
) -> CclRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccltc"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("CCLTC_") {
            cmd.env_remove(&key);
        }
    }
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_BACKTRACE", "1");

    let start = Instant::now();
    let output = cmd.output().expect("run ccltc");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    CclRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// The JSON document in `output`, skipping any log lines before it.
pub fn extract_json_payload(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    output.trim().to_string()
}

pub fn parse_json(output: &str) -> serde_json::Value {
    serde_json::from_str(&extract_json_payload(output)).expect("valid JSON payload")
}
