//! Project discovery: design system files, component examples, steering
//! documents and the project name.
//!
//! Paths returned by [`auto_detect_files`] are relative to the project root so
//! they can be persisted in the gem config and shown back to the user.

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

const DESIGN_SYSTEM_DIRS: &[&str] = &[
    "design-system",
    "docs/design-system",
    "design",
    "styles/design-system",
];

const COMPONENT_DIRS: &[&str] = &["src/components", "components", "src/ui", "ui"];

const COMPONENT_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];

const MAX_COMPONENT_EXAMPLES: usize = 5;

const STEERING_DIRS: &[&str] = &["steering", ".kiro/steering", "power/steering"];

static REPO_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[/:]([^/:]+?)(?:\.git)?/?$").expect("valid repo name regex")
});

/// Files found by scanning conventional project locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedFiles {
    pub design_system_files: Vec<String>,
    pub codebase_examples: Vec<String>,
}

/// Scan conventional locations for design-system docs and component examples.
///
/// Every `*.md` under the design-system directories is collected. Component
/// examples come from the first component directory that contains any
/// script files, capped at five.
pub fn auto_detect_files(root: &Path) -> DetectedFiles {
    let mut detected = DetectedFiles::default();

    for dir in DESIGN_SYSTEM_DIRS {
        for name in list_files(&root.join(dir), |ext| ext == "md") {
            detected.design_system_files.push(format!("{dir}/{name}"));
        }
    }

    for dir in COMPONENT_DIRS {
        let files = list_files(&root.join(dir), |ext| COMPONENT_EXTENSIONS.contains(&ext));
        if files.is_empty() {
            continue;
        }
        detected.codebase_examples = files
            .into_iter()
            .take(MAX_COMPONENT_EXAMPLES)
            .map(|name| format!("{dir}/{name}"))
            .collect();
        break;
    }

    debug!(
        design_system = detected.design_system_files.len(),
        examples = detected.codebase_examples.len(),
        "Auto-detected project files"
    );
    detected
}

/// Sorted file names in `dir` whose extension passes `keep`. Missing dirs yield nothing.
fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| {
            let path = entry.path();
            let ext = path.extension()?.to_str()?.to_string();
            keep(&ext).then(|| entry.file_name().to_string_lossy().into_owned())
        })
        .collect();
    names.sort();
    names
}

/// Project name from `package.json`, then the git remote, then `"Project"`.
pub fn project_name(root: &Path) -> String {
    if let Some(name) = package_json_name(root) {
        return name;
    }
    if let Some(name) = git_remote_name(root) {
        return name;
    }
    "Project".to_string()
}

fn package_json_name(root: &Path) -> Option<String> {
    #[derive(Deserialize)]
    struct PackageJson {
        name: Option<String>,
    }

    let content = std::fs::read_to_string(root.join("package.json")).ok()?;
    let pkg: PackageJson = serde_json::from_str(&content).ok()?;
    pkg.name.filter(|n| !n.is_empty())
}

fn git_remote_name(root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .current_dir(root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    repo_name_from_url(String::from_utf8_lossy(&output.stdout).trim())
}

/// Repository name from a remote URL (`https://host/org/repo.git`, `git@host:org/repo`).
pub fn repo_name_from_url(url: &str) -> Option<String> {
    REPO_NAME_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Concatenate every steering markdown file as `## <file> (from <dir>)` sections.
pub fn read_steering(root: &Path) -> String {
    let mut content = String::new();
    for dir in STEERING_DIRS {
        let steering_dir = root.join(dir);
        for name in list_files(&steering_dir, |ext| ext == "md") {
            match std::fs::read_to_string(steering_dir.join(&name)) {
                Ok(text) => content.push_str(&format!(
                    "\n\n## {name} (from {})\n\n{text}",
                    steering_dir.display()
                )),
                Err(e) => debug!("Skipping steering file {name}: {e}"),
            }
        }
    }
    content
}

/// Read each file as a markdown section. Fenced sections wrap the body in a code block.
///
/// Unreadable files are logged and skipped.
pub fn read_file_sections(root: &Path, files: &[String], fenced: bool) -> String {
    let mut content = String::new();
    for file in files {
        let path = resolve(root, file);
        match std::fs::read_to_string(&path) {
            Ok(text) if fenced => content.push_str(&format!("\n\n## {file}\n\n```\n{text}\n```")),
            Ok(text) => content.push_str(&format!("\n\n## {file}\n\n{text}")),
            Err(e) => tracing::warn!("Could not read {file}: {e}"),
        }
    }
    content
}

fn resolve(root: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
