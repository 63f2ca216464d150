//! Declarative assertions applied to captured command output.

use crate::error::PrefixedError;
use crate::store::Store;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Post-run assertions for one case: `must` rules that have to hold and
/// `not` rules that have to fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Assertions {
    /// Expect the command to exit with an error.
    pub want_err: bool,

    /// Tolerate any exit status. Useful for commands whose outcome depends
    /// on external factors while the output is still asserted.
    pub can_error: bool,

    /// Known failure states: a partial stderr match against any entry passes
    /// the whole case and skips every remaining check.
    pub can_error_with_message: Vec<String>,

    /// Rules that must match.
    pub must: Rules,

    /// Rules that must not match.
    pub not: Rules,
}

/// One direction of assertion rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Rules {
    /// Standard-output fragments. With `strict`, each entry must equal the
    /// whole output exactly.
    pub output: Vec<String>,

    /// Standard-error fragments.
    pub errors: Vec<String>,

    /// Store keys whose values must appear in standard output. A key that
    /// was never stored is compared literally, so literal and dynamic
    /// expectations share this list.
    pub dynamic: Vec<String>,

    /// Regex patterns matched against standard output. Evaluated only under
    /// `must`; entries under `not` are ignored.
    pub pattern: Vec<String>,

    /// Compare `output` entries by exact equality instead of containment.
    pub strict: bool,
}

impl Assertions {
    /// Judge captured output against the rules.
    ///
    /// `command_line` is the redacted rendering of the executed command,
    /// embedded in diagnostics. Check failures accumulate into one aggregate
    /// tagged `assertion`; only a `can_error_with_message` stderr match
    /// short-circuits, and it short-circuits to a pass.
    pub fn ensure(
        &self,
        stdout: &[u8],
        stderr: &[u8],
        exec_err: Option<&str>,
        store: &Store,
        command_line: &str,
    ) -> Result<(), PrefixedError> {
        let out = String::from_utf8_lossy(stdout);
        let errout = String::from_utf8_lossy(stderr);

        // An unexpected error state fails immediately, unless some form of
        // failure is tolerated.
        if (exec_err.is_some() != self.want_err)
            && !self.can_error
            && self.can_error_with_message.is_empty()
        {
            let mut err = PrefixedError::new("assertion");
            err.push(format!(
                "command: \"{command_line}\"\nerror = {}, want_err = {}, stderr = \"{errout}\"",
                exec_err.unwrap_or("<none>"),
                self.want_err,
            ));
            return Err(err);
        }

        // A known failure passes the case with no further checks.
        for known in &self.can_error_with_message {
            if errout.contains(known.as_str()) {
                return Ok(());
            }
        }

        let mut err = PrefixedError::new("assertion");
        self.check_must_output(&out, &mut err);
        self.check_patterns(&out, &mut err);
        self.check_must_errors(&errout, &mut err);
        self.check_dynamic(&out, store, &mut err);
        self.check_must_not(&out, &errout, &mut err);
        err.into_result()
    }

    fn check_must_output(&self, out: &str, err: &mut PrefixedError) {
        for want in &self.must.output {
            if self.must.strict && out != want.as_str() {
                err.push(format!(
                    "must find: strict match got \"{out}\" want \"{want}\""
                ));
            }
            if !self.must.strict && !out.contains(want.as_str()) {
                err.push(format!(
                    "must find: didn't find \"{want}\" in standard output: \"{out}\""
                ));
            }
        }
    }

    fn check_patterns(&self, out: &str, err: &mut PrefixedError) {
        for pattern in &self.must.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(out) {
                        err.push(format!(
                            "must find pattern: couldn't match pattern \"{pattern}\" to standard output: \"{out}\""
                        ));
                    }
                }
                Err(_) => err.push(format!(
                    "must find pattern: match pattern \"{pattern}\" did not compile"
                )),
            }
        }
    }

    fn check_must_errors(&self, errout: &str, err: &mut PrefixedError) {
        for want in &self.must.errors {
            if !errout.contains(want.as_str()) {
                err.push(format!(
                    "must find errors: didn't find \"{want}\" in standard error: \"{errout}\""
                ));
            }
        }
    }

    fn check_dynamic(&self, out: &str, store: &Store, err: &mut PrefixedError) {
        for key in &self.must.dynamic {
            // A key that was never stored is compared literally, on purpose.
            let value = store.get(key).unwrap_or_else(|| key.clone());
            if !out.contains(&value) {
                err.push(format!(
                    "must find values from dynamic storage: didn't find key \"{key}\" with value \"{value}\" in standard output: \"{out}\""
                ));
            }
        }
    }

    fn check_must_not(&self, out: &str, errout: &str, err: &mut PrefixedError) {
        for unwanted in &self.not.output {
            if self.not.strict && out == unwanted.as_str() {
                err.push(format!(
                    "must not find: strict match got \"{out}\" must not \"{unwanted}\""
                ));
            }
            if !self.not.strict && out.contains(unwanted.as_str()) {
                err.push(format!(
                    "must not find: found \"{unwanted}\" in standard output: \"{out}\""
                ));
            }
        }
        for unwanted in &self.not.errors {
            if errout.contains(unwanted.as_str()) {
                err.push(format!(
                    "must not find: found \"{unwanted}\" in standard error: \"{errout}\""
                ));
            }
        }
    }
}

/// Replace the value of any `--pass`-style flag (space- or `=`-separated)
/// with a fixed marker before the command line reaches logs or diagnostics.
///
/// This is a textual substitution on the rendered command line; the actual
/// argument vector is never mutated.
pub fn redact_password_flag(command_line: &str) -> String {
    let re = Regex::new(r"(?m)--pass?[ =]([^ ]+)").expect("redaction pattern compiles");
    re.replace_all(command_line, "--pass [REDACTED]").into_owned()
}
