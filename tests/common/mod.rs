#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

pub const CATALOG: &str = "product_catalog.csv";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Writes the single-relation catalog `111 -> 222` used by most tests.
    pub fn write_default_catalog(&self) -> PathBuf {
        self.write(CATALOG, "barcode,child_barcode,description\n111,222,case of 12\n")
    }

    /// `barcode-families reconcile` rooted in this workspace.
    pub fn reconcile(&self) -> Command {
        let mut cmd = Command::cargo_bin("barcode-families").expect("binary exists");
        cmd.arg("reconcile").arg("--dir").arg(self.path());
        cmd
    }

    pub fn exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// Every file name left in the workspace, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("list workspace")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Reads a CSV report, header row included.
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open report");
    reader
        .records()
        .map(|record| {
            record
                .expect("report record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
