//! End-to-end suite runs against real system binaries.

use cmdsuite::assert::{Assertions, Rules};
use cmdsuite::engine::{Callbacks, Case, CaseArgs, execute_tests_with_store};
use cmdsuite::store::Store;

fn case(name: &str, binary: &str) -> Case {
    Case {
        name: name.to_string(),
        binary: binary.to_string(),
        ..Case::default()
    }
}

#[test]
fn listing_files_with_assertions() {
    let store = Store::new();
    let mut listing = case("ls finds the manifest", "ls");
    listing.args = CaseArgs {
        args: vec!["-1".to_string()],
        ..CaseArgs::default()
    };
    listing.assert = Assertions {
        must: Rules {
            output: vec!["Cargo.toml".to_string()],
            ..Rules::default()
        },
        not: Rules {
            output: vec!["no_such_file_here.xyz".to_string()],
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[listing], &store);
    assert!(
        report.all_passed(),
        "failures: {:?}",
        report.cases[0].failures
    );
}

#[test]
fn expected_failure_with_message_check() {
    let store = Store::new();
    let mut missing = case("ls on a missing path", "ls");
    missing.args = CaseArgs {
        args: vec!["definitely_not_a_real_path_0451".to_string()],
        ..CaseArgs::default()
    };
    missing.assert = Assertions {
        can_error: true,
        must: Rules {
            errors: vec!["No such file or directory".to_string()],
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[missing], &store);
    assert!(
        report.all_passed(),
        "failures: {:?}",
        report.cases[0].failures
    );
}

#[test]
fn known_failure_short_circuits_remaining_assertions() {
    let store = Store::new();
    let mut flaky = case("known failure", "sh");
    flaky.args = CaseArgs {
        args: vec![
            "-c".to_string(),
            "echo 'resource already exists' >&2; exit 1".to_string(),
        ],
        ..CaseArgs::default()
    };
    // The must rule below would fail, but the recognized error message wins.
    flaky.assert = Assertions {
        can_error_with_message: vec!["resource already exists".to_string()],
        must: Rules {
            output: vec!["never printed".to_string()],
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[flaky], &store);
    assert!(
        report.all_passed(),
        "failures: {:?}",
        report.cases[0].failures
    );
}

#[test]
fn json_output_chains_into_a_later_case() {
    let store = Store::new();

    let mut producer = case("decode service response", "echo");
    producer.args = CaseArgs {
        args: vec![r#"{"message":"You Know, for Search."}"#.to_string()],
        ..CaseArgs::default()
    };
    producer.callbacks = Callbacks::single(
        "service_message",
        Box::new(|out: &[u8], key: &str, store: &Store| {
            let decoded: serde_json::Value =
                serde_json::from_slice(out).map_err(|e| e.to_string())?;
            let message = decoded
                .pointer("/message")
                .and_then(|v| v.as_str())
                .ok_or("missing message field")?;
            store.set(key, message);
            Ok(())
        }),
    );

    let mut consumer = case("replay decoded message", "echo");
    consumer.args = CaseArgs {
        dynamic: vec!["service_message".to_string()],
        ..CaseArgs::default()
    };
    consumer.assert = Assertions {
        must: Rules {
            output: vec!["You Know, for Search.\n".to_string()],
            strict: true,
            dynamic: vec!["service_message".to_string()],
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[producer, consumer], &store);
    assert!(
        report.all_passed(),
        "failures: {:?} {:?}",
        report.cases[0].failures,
        report.cases[1].failures
    );
    assert_eq!(
        store.get("service_message"),
        Some("You Know, for Search.".to_string())
    );
}

#[test]
fn interactive_input_reaches_the_command() {
    let store = Store::new();
    let mut cat = case("cat echoes stdin", "cat");
    cat.args = CaseArgs {
        interactive: vec!["first line".to_string(), "second line".to_string()],
        ..CaseArgs::default()
    };
    cat.assert = Assertions {
        must: Rules {
            output: vec!["first line\nsecond line\n".to_string()],
            strict: true,
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[cat], &store);
    assert!(
        report.all_passed(),
        "failures: {:?}",
        report.cases[0].failures
    );
}

#[test]
fn parallel_cases_run_and_report_in_order() {
    let store = Store::new();
    let cases: Vec<Case> = (0..4)
        .map(|i| {
            let text = format!("worker-{i}");
            Case {
                name: text.clone(),
                binary: "echo".to_string(),
                parallel: true,
                args: CaseArgs {
                    args: vec![text.clone()],
                    ..CaseArgs::default()
                },
                assert: Assertions {
                    must: Rules {
                        output: vec![text],
                        ..Rules::default()
                    },
                    ..Assertions::default()
                },
                ..Case::default()
            }
        })
        .collect();

    let report = execute_tests_with_store(&cases, &store);
    assert!(report.all_passed());
    for (i, result) in report.cases.iter().enumerate() {
        assert_eq!(result.name, format!("worker-{i}"));
    }
}

#[test]
fn pattern_assertions_match_real_output() {
    let store = Store::new();
    let mut versioned = case("pattern on echo", "echo");
    versioned.args = CaseArgs {
        args: vec!["release id-4217 ready".to_string()],
        ..CaseArgs::default()
    };
    versioned.assert = Assertions {
        must: Rules {
            pattern: vec![r"id-\d+".to_string()],
            ..Rules::default()
        },
        not: Rules {
            output: vec!["error".to_string()],
            ..Rules::default()
        },
        ..Assertions::default()
    };

    let report = execute_tests_with_store(&[versioned], &store);
    assert!(
        report.all_passed(),
        "failures: {:?}",
        report.cases[0].failures
    );
}
