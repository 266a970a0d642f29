use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use url::Url;

/// A file-backed store and an isolated home directory for one test.
pub struct Sandbox {
    pub dir: TempDir,
    pub store_url: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("store");
        std::fs::create_dir_all(dir.path().join("home")).unwrap();
        let store_url = Url::from_directory_path(&store_path)
            .expect("Failed to convert path to file URL")
            .to_string();
        Self { dir, store_url }
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Write a file inside the sandbox and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Run the CLI against this sandbox's store.
    pub fn run(&self, args: &[&str]) -> Output {
        run_cli_with_env(args, &self.home(), Some(&self.store_url))
    }

    /// Run the CLI and expect success, returning stdout.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Store a record through the CLI and return its key.
    pub fn put(&self, domain: &str, key: &str, body: &str) -> String {
        let file = self.write(&format!("{}.json", key.replace('/', "_")), body);
        let stdout = self.run_success(&["put", domain, file.to_str().unwrap(), "--key", key]);
        stdout.lines().next().unwrap_or_default().to_string()
    }
}

/// Run the CLI binary with a custom HOME so no user config leaks in.
pub fn run_cli_with_env(args: &[&str], home: &Path, store_url: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vitrine"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env_remove("VITRINE_STORE");
    cmd.env_remove("VITRINE_STORE_TOKEN");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    if let Some(url) = store_url {
        cmd.env("VITRINE_STORE", url);
    }
    cmd.output().expect("Failed to execute CLI")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
