//! Case orchestration.
//!
//! Drives each case through dynamic-argument resolution, binary location,
//! process execution, assertion, and store callbacks, and collects one
//! result per case.

use crate::args;
use crate::assert::{Assertions, redact_password_flag};
use crate::error::PrefixedError;
use crate::locate;
use crate::process;
use crate::store::{self, Store};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Base unit for the randomized cooldown between cases.
const COOLDOWN_PERIOD: Duration = Duration::from_millis(100);

/// A callback run after a case completes. It receives the captured standard
/// output, the store key it is registered under, and the store, and usually
/// decodes structured output to persist a derived value.
pub type Callback = Box<dyn Fn(&[u8], &str, &Store) -> Result<(), String> + Send + Sync>;

/// Storage-key to callback registrations for one case.
///
/// Keys must be unique across the whole suite; the store has no scoping.
#[derive(Default)]
pub struct Callbacks {
    entries: HashMap<String, Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single registration.
    pub fn single(key: impl Into<String>, callback: Callback) -> Self {
        let mut callbacks = Self::new();
        callbacks.insert(key, callback);
        callbacks
    }

    /// Register `callback` under `key`.
    pub fn insert(&mut self, key: impl Into<String>, callback: Callback) {
        self.entries.insert(key.into(), callback);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every registered callback against the captured output, writing
    /// results into the store. Failures are collected; none aborts the
    /// others.
    pub fn run(&self, output: &[u8], store: &Store) -> Result<(), PrefixedError> {
        let mut err = PrefixedError::new("callback");
        for (key, callback) in &self.entries {
            if let Err(e) = callback(output, key, store) {
                err.push(format!("key \"{key}\": {e}"));
            }
        }
        err.into_result()
    }
}

/// Arguments for one case. The spawned argument vector is config, then args,
/// then resolved dynamic arguments, in that fixed order.
#[derive(Debug, Clone, Default)]
pub struct CaseArgs {
    /// Positional arguments and flags.
    pub args: Vec<String>,

    /// Configuration arguments, prepended before `args`. Not required; a
    /// convenient way to keep command configuration separate.
    pub config: Vec<String>,

    /// Store keys resolved to values right before the process is spawned.
    /// Flag-like and `strip_`-prefixed tokens pass through literally.
    pub dynamic: Vec<String>,

    /// Lines fed to the command's standard input, newline-terminated.
    pub interactive: Vec<String>,
}

/// One declarative unit of work: a binary invocation plus its expected
/// outcome.
#[derive(Default)]
pub struct Case {
    /// Case name, used in reporting.
    pub name: String,

    /// Relative or full path of the binary to run.
    pub binary: String,

    /// When set, `binary` is a bare file name located by searching the
    /// current directory's subtree and then each parent. Meant for build
    /// artifacts that live somewhere inside the project tree.
    pub find_binary: bool,

    pub args: CaseArgs,

    pub assert: Assertions,

    /// Post-run callbacks keyed by the store key they populate.
    pub callbacks: Callbacks,

    /// Extra delay added to this case's cooldown.
    pub wait_before_run: Duration,

    /// Run concurrently with sibling parallel cases.
    pub parallel: bool,
}

/// Outcome of one case.
#[derive(Debug, serde::Serialize)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub failures: Vec<String>,
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Outcome of a whole suite run, one entry per case in declaration order.
#[derive(Debug, serde::Serialize)]
pub struct SuiteReport {
    pub cases: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run `cases` against the process-wide shared store.
pub fn execute_tests(cases: &[Case]) -> SuiteReport {
    execute_tests_with_store(cases, store::shared())
}

/// Run `cases` against an explicit store.
///
/// Sequential cases run one after another on the calling thread, in
/// declaration order. Cases marked parallel run concurrently with each other
/// on scoped threads once the sequential ones have finished. Results come
/// back in declaration order regardless.
pub fn execute_tests_with_store(cases: &[Case], store: &Store) -> SuiteReport {
    let (sequential, parallel): (Vec<_>, Vec<_>) = cases
        .iter()
        .enumerate()
        .partition(|(_, case)| !case.parallel);

    let mut indexed: Vec<(usize, CaseResult)> = Vec::with_capacity(cases.len());

    for (index, case) in sequential {
        indexed.push((index, run_case(index, case, store)));
    }

    if !parallel.is_empty() {
        thread::scope(|s| {
            let handles: Vec<_> = parallel
                .into_iter()
                .map(|(index, case)| (index, case, s.spawn(move || run_case(index, case, store))))
                .collect();
            for (index, case, handle) in handles {
                // A panicking case fails alone; siblings keep their results.
                let result = handle.join().unwrap_or_else(|_| CaseResult {
                    name: case.name.clone(),
                    passed: false,
                    duration: Duration::ZERO,
                    failures: vec![format!("[case {index}]: case panicked")],
                });
                indexed.push((index, result));
            }
        });
    }

    indexed.sort_by_key(|(index, _)| *index);
    SuiteReport {
        cases: indexed.into_iter().map(|(_, result)| result).collect(),
    }
}

fn run_case(index: usize, case: &Case, store: &Store) -> CaseResult {
    let start = Instant::now();
    let err = execute_case(index, case, store);
    let duration = start.elapsed();

    // Always delay after the case so that rapid process spawns don't choke
    // the machine the suite runs on.
    cooldown(case.wait_before_run);

    CaseResult {
        name: case.name.clone(),
        passed: err.is_empty(),
        duration,
        failures: err.causes().to_vec(),
    }
}

fn execute_case(index: usize, case: &Case, store: &Store) -> PrefixedError {
    let mut err = PrefixedError::new(format!("[case {index}]"));

    let dynamic = match args::resolve_dynamic_args(&case.args.dynamic, store) {
        Ok(dynamic) => dynamic,
        Err(e) => {
            err.push(e);
            return err;
        }
    };

    if case.binary.is_empty() {
        err.push("binary not set, please set a binary name");
        return err;
    }

    let binary = if case.find_binary {
        match locate::find_binary_path(Path::new("."), &case.binary) {
            Ok(found) => found.display().to_string(),
            Err(e) => {
                err.push(e.to_string());
                return err;
            }
        }
    } else {
        case.binary.clone()
    };

    let mut argv = case.args.config.clone();
    argv.extend(case.args.args.iter().cloned());
    argv.extend(dynamic);

    let result = match process::run_command(
        &binary,
        &argv,
        &case.args.interactive,
        case.assert.want_err,
    ) {
        Ok(result) => result,
        Err(e) => {
            err.push(e.to_string());
            return err;
        }
    };

    let mut rendered = vec![binary];
    rendered.extend(argv);
    let rendered = redact_password_flag(&rendered.join(" "));

    if let Err(e) = case.assert.ensure(
        &result.stdout,
        &result.stderr,
        result.error.as_deref(),
        store,
        &rendered,
    ) {
        err.append(e);
    }

    // Callbacks populate the store at run time for later cases.
    if let Err(e) = case.callbacks.run(&result.stdout, store) {
        err.append(e);
    }

    err
}

fn cooldown(extra: Duration) {
    let factor: u32 = rand::thread_rng().gen_range(1..=9);
    thread::sleep(COOLDOWN_PERIOD * factor + extra);
}
