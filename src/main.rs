use clap::{Parser, Subcommand, ValueEnum};
use cmdsuite::engine::{self, SuiteReport};
use cmdsuite::{loader, schema, store};
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with checkmarks
    #[default]
    Human,
    /// Machine-readable JSON output
    Json,
}

#[derive(Parser)]
#[command(name = "cmdsuite")]
#[command(about = "A declarative end-to-end test harness for command-line binaries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute case files
    Run {
        /// Path to case files (file or directory)
        path: PathBuf,
        /// Output format
        #[arg(short, long, default_value = "human")]
        output: OutputFormat,
        /// Filter cases by name (substring match)
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Validate case files without running them
    Validate {
        /// Path to case files (file or directory)
        path: PathBuf,
    },
    /// Scaffold a new case file
    Init {
        /// Output path for the new case file
        #[arg(default_value = "tests/example.yaml")]
        path: PathBuf,
    },
    /// Output the case-file schema (for machine consumers)
    Schema,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            path,
            output,
            filter,
        } => run(&path, output, filter.as_deref()),
        Command::Validate { path } => validate(&path),
        Command::Init { path } => init(&path),
        Command::Schema => {
            let schema = schema::generate_schema();
            let json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");
            println!("{json}");
        }
    }
}

fn run(path: &PathBuf, output: OutputFormat, filter: Option<&str>) {
    let case_files = match loader::find_case_files(path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error finding case files: {e}");
            std::process::exit(1);
        }
    };

    if case_files.is_empty() {
        eprintln!("No case files found at: {}", path.display());
        std::process::exit(1);
    }

    // One store for the whole run, so values chained between cases survive
    // file boundaries. Files run one after another in path order.
    let suite_store = store::shared();

    let mut file_results: Vec<(PathBuf, Result<SuiteReport, String>)> = Vec::new();
    for file_path in case_files {
        let result = loader::load_case_file(&file_path)
            .map_err(|e| e.to_string())
            .and_then(loader::build_cases)
            .map(|cases| {
                let selected: Vec<_> = cases
                    .into_iter()
                    .filter(|c| filter.map(|f| c.name.contains(f)).unwrap_or(true))
                    .collect();
                engine::execute_tests_with_store(&selected, suite_store)
            });
        file_results.push((file_path, result));
    }

    let mut total_passed = 0;
    let mut total_failed = 0;
    let mut json_results = Vec::new();

    for (file_path, result) in &file_results {
        match result {
            Err(e) => {
                // stderr in both modes; JSON stdout stays parseable.
                eprintln!("✗ Failed to load {}: {e}", file_path.display());
                total_failed += 1;
            }
            Ok(report) => {
                total_passed += report.passed();
                total_failed += report.failed();

                match output {
                    OutputFormat::Human => {
                        println!("\n{}", file_path.display());
                        for case in &report.cases {
                            if case.passed {
                                println!("  ✓ {} ({:.2?})", case.name, case.duration);
                            } else {
                                println!("  ✗ {} ({:.2?})", case.name, case.duration);
                                for failure in &case.failures {
                                    for line in failure.lines() {
                                        println!("    {line}");
                                    }
                                }
                            }
                        }
                    }
                    OutputFormat::Json => {
                        json_results.push(serde_json::json!({
                            "file": file_path.display().to_string(),
                            "cases": report.cases,
                        }));
                    }
                }
            }
        }
    }

    match output {
        OutputFormat::Human => {
            println!("\n{total_passed} passed, {total_failed} failed");
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "passed": total_passed,
                "failed": total_failed,
                "results": json_results,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).expect("Failed to serialize")
            );
        }
    }

    if total_failed > 0 {
        std::process::exit(1);
    }
}

fn validate(path: &PathBuf) {
    let case_files = match loader::find_case_files(path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error finding case files: {e}");
            std::process::exit(1);
        }
    };

    if case_files.is_empty() {
        eprintln!("No case files found at: {}", path.display());
        std::process::exit(1);
    }

    let mut errors = 0;
    for file_path in &case_files {
        match loader::load_case_file(file_path) {
            Ok(file) => {
                println!("✓ {} ({} cases)", file_path.display(), file.cases.len());
            }
            Err(e) => {
                eprintln!("✗ {}: {e}", file_path.display());
                errors += 1;
            }
        }
    }

    if errors > 0 {
        eprintln!("\n{errors} file(s) failed validation");
        std::process::exit(1);
    }
    println!("\nAll {} file(s) valid", case_files.len());
}

fn init(path: &PathBuf) {
    let template = r#"version: 1

cases:
  - name: example_case
    binary: echo
    args: ["hello", "world"]
    assert:
      must:
        output: ["hello"]

  # Chain a value from one command into the next:
  # - name: store_message
  #   binary: echo
  #   args: ['{"message":"hi"}']
  #   store:
  #     - key: message
  #       pointer: /message
  # - name: replay_message
  #   binary: echo
  #   dynamic_args: ["message"]
  #   assert:
  #     must:
  #       strict: true
  #       output: ["hi\n"]
"#;
    if path.exists() {
        eprintln!("Error: file already exists: {}", path.display());
        std::process::exit(1);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
        && let Err(e) = fs::create_dir_all(parent)
    {
        eprintln!("Error creating directory: {e}");
        std::process::exit(1);
    }
    if let Err(e) = fs::write(path, template) {
        eprintln!("Error writing file: {e}");
        std::process::exit(1);
    }
    println!("Created: {}", path.display());
}
