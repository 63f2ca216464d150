//! Case file loader.
//!
//! Finds and parses declarative case files from disk and turns them into
//! runnable engine cases.

use crate::engine::{Callback, Callbacks, Case, CaseArgs};
use crate::env::interpolate_env;
use crate::schema::{CaseFile, CaseSpec, StoreRule};
use crate::store::Store;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for case-file loading operations.
#[derive(Debug)]
pub enum LoadError {
    /// Failed to read the file.
    Io(std::io::Error),
    /// Failed to parse YAML.
    Yaml(serde_yaml::Error),
    /// Failed to parse TOML.
    Toml(toml::de::Error),
    /// Unsupported file extension.
    UnsupportedFormat(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read file: {e}"),
            LoadError::Yaml(e) => write!(f, "invalid YAML: {e}"),
            LoadError::Toml(e) => write!(f, "invalid TOML: {e}"),
            LoadError::UnsupportedFormat(ext) => {
                write!(
                    f,
                    "unsupported file format: {ext} (expected .yaml, .yml, or .toml)"
                )
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Load a case file from a path.
pub fn load_case_file(path: &Path) -> Result<CaseFile, LoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let contents = std::fs::read_to_string(path).map_err(LoadError::Io)?;

    match ext {
        "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(LoadError::Yaml),
        "toml" => toml::from_str(&contents).map_err(LoadError::Toml),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Find all case files under a path, or return the single file.
pub fn find_case_files(path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    collect_case_files_recursive(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_case_files_recursive(
    dir: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_case_files_recursive(&path, files)?;
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && (ext == "yaml" || ext == "yml" || ext == "toml")
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Turn a parsed case file into runnable engine cases.
///
/// Literal arguments (`config` and `args`) go through `${VAR}` environment
/// interpolation; dynamic tokens are left alone since they are store keys,
/// not values.
pub fn build_cases(file: CaseFile) -> Result<Vec<Case>, String> {
    file.cases.into_iter().map(build_case).collect()
}

fn build_case(spec: CaseSpec) -> Result<Case, String> {
    let interpolate = |values: Vec<String>| -> Result<Vec<String>, String> {
        values
            .into_iter()
            .map(|v| interpolate_env(&v).map_err(|e| format!("case \"{}\": {e}", spec.name)))
            .collect()
    };

    let args = CaseArgs {
        config: interpolate(spec.config.clone())?,
        args: interpolate(spec.args.clone())?,
        dynamic: spec.dynamic_args.clone(),
        interactive: spec.interactive.clone(),
    };

    let mut callbacks = Callbacks::new();
    for rule in &spec.store {
        callbacks.insert(rule.key.clone(), store_rule_callback(rule.clone()));
    }

    Ok(Case {
        name: spec.name,
        binary: spec.binary,
        find_binary: spec.find_binary,
        args,
        assert: spec.assert,
        callbacks,
        wait_before_run: Duration::from_millis(spec.wait_before_run_ms),
        parallel: spec.parallel,
    })
}

/// Compile a declarative store rule into an engine callback that decodes the
/// command's JSON output and persists the value found at the rule's pointer.
fn store_rule_callback(rule: StoreRule) -> Callback {
    Box::new(move |output: &[u8], key: &str, store: &Store| {
        let decoded: serde_json::Value =
            serde_json::from_slice(output).map_err(|e| format!("invalid JSON output: {e}"))?;
        let value = decoded
            .pointer(&rule.pointer)
            .ok_or_else(|| format!("no value at pointer \"{}\"", rule.pointer))?;
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        store.set(key, text);
        Ok(())
    })
}
