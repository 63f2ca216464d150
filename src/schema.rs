//! Schema definitions for cmdsuite case files.
//!
//! Case files are written in YAML or TOML and validated against these types
//! before being handed to the engine.

use crate::assert::Assertions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root document for a case file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaseFile {
    /// Schema version (must match crate major version).
    pub version: u32,

    /// The cases defined in this file, run in declaration order.
    pub cases: Vec<CaseSpec>,
}

/// A single declarative case.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaseSpec {
    /// Unique name for this case.
    pub name: String,

    /// Relative or full path of the binary, or a bare file name when
    /// `find_binary` is set.
    pub binary: String,

    /// Locate `binary` by name, searching the working directory's subtree
    /// and then each parent directory.
    #[serde(default)]
    pub find_binary: bool,

    /// Positional arguments and flags. `${VAR}` references are interpolated
    /// from the environment at load time.
    #[serde(default)]
    pub args: Vec<String>,

    /// Configuration arguments prepended before `args`.
    #[serde(default)]
    pub config: Vec<String>,

    /// Store keys resolved against the suite store at run time. Flag-like
    /// and `strip_`-prefixed tokens pass through literally.
    #[serde(default)]
    pub dynamic_args: Vec<String>,

    /// Lines fed to the command's standard input.
    #[serde(default)]
    pub interactive: Vec<String>,

    /// Extra cooldown after this case, in milliseconds.
    #[serde(default)]
    pub wait_before_run_ms: u64,

    /// Run concurrently with sibling parallel cases.
    #[serde(default)]
    pub parallel: bool,

    /// Expected outcome.
    #[serde(default)]
    pub assert: Assertions,

    /// Values extracted from the command's JSON output into the store.
    #[serde(default)]
    pub store: Vec<StoreRule>,
}

/// Extract one value from JSON standard output into the store.
///
/// The declarative counterpart of a programmatic callback: the output is
/// decoded as JSON and the value at `pointer` is stored under `key`, where
/// later cases can pick it up as a dynamic argument or assertion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreRule {
    /// Store key to write. Must be unique across the whole suite.
    pub key: String,

    /// JSON pointer into the decoded output (e.g. `/message`).
    pub pointer: String,
}

/// Generate the JSON Schema for case files.
pub fn generate_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(CaseFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_case_file() {
        let yaml = r#"
version: 1
cases:
  - name: simple
    binary: echo
    args: ["hello"]
"#;
        let file: CaseFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.version, 1);
        assert_eq!(file.cases.len(), 1);
        assert_eq!(file.cases[0].name, "simple");
        assert_eq!(file.cases[0].binary, "echo");
        assert!(!file.cases[0].parallel);
    }

    #[test]
    fn parse_full_case() {
        let yaml = r#"
version: 1
cases:
  - name: deploy and verify
    binary: mycli
    find_binary: true
    config: ["--config", "cloud.yaml"]
    args: ["deployment", "create"]
    dynamic_args: ["deployment_id", "--track"]
    interactive: ["y"]
    parallel: true
    wait_before_run_ms: 250
    assert:
      can_error_with_message: ["resource already exists"]
      must:
        output: ["created"]
        pattern: ['id-\d+']
        dynamic: ["deployment_id"]
      not:
        errors: ["panic"]
    store:
      - key: deployment_id
        pointer: /id
"#;
        let file: CaseFile = serde_yaml::from_str(yaml).unwrap();
        let case = &file.cases[0];
        assert!(case.find_binary);
        assert_eq!(case.config, ["--config", "cloud.yaml"]);
        assert_eq!(case.dynamic_args, ["deployment_id", "--track"]);
        assert_eq!(case.wait_before_run_ms, 250);
        assert_eq!(case.assert.must.output, ["created"]);
        assert_eq!(case.assert.not.errors, ["panic"]);
        assert_eq!(case.store[0].key, "deployment_id");
        assert_eq!(case.store[0].pointer, "/id");
    }

    #[test]
    fn parse_strict_assertions() {
        let yaml = r#"
version: 1
cases:
  - name: strict echo
    binary: echo
    args: ["hello"]
    assert:
      must:
        strict: true
        output: ["hello\n"]
"#;
        let file: CaseFile = serde_yaml::from_str(yaml).unwrap();
        assert!(file.cases[0].assert.must.strict);
        assert_eq!(file.cases[0].assert.must.output, ["hello\n"]);
    }

    #[test]
    fn schema_mentions_top_level_types() {
        let schema = serde_json::to_string(&generate_schema()).unwrap();
        assert!(schema.contains("CaseFile"));
        assert!(schema.contains("CaseSpec"));
        assert!(schema.contains("StoreRule"));
    }
}
