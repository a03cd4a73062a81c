mod common;

use std::process::Output;
use std::sync::Arc;

use serde_json::Value;

use common::{StubLlm, TestEnv, FLU_NOTE_JSON};

async fn run(env: &Arc<TestEnv>, args: &[&str]) -> Output {
    let env = env.clone();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        env.run(&args)
    })
    .await
    .expect("join blocking command")
}

async fn run_with_stdin(env: &Arc<TestEnv>, args: &[&str], input: &str) -> Output {
    let env = env.clone();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let input = input.to_string();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        env.run_with_stdin(&args, &input)
    })
    .await
    .expect("join blocking command")
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} should succeed\nstdout:\n{}\nstderr:\n{}",
        what,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn demo_analysis_is_saved_and_exportable() {
    let stub = StubLlm::replying(FLU_NOTE_JSON).await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run(&env, &["analyze", "--demo", "--json"]).await;
    assert_success(&output, "analyze --demo");
    let note: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(note["patientInfo"]["name"], "Sarah Ahmed");
    assert_eq!(note["medications"].as_array().unwrap().len(), 2);
    assert_eq!(stub.calls(), 1);

    let list = run(&env, &["history", "list"]).await;
    assert_success(&list, "history list");
    let listing = String::from_utf8_lossy(&list.stdout);
    assert!(listing.contains("Viral infection (Influenza)"));
    assert!(listing.contains("Doctor: Good morning"));

    let id = listing
        .lines()
        .nth(2)
        .and_then(|line| line.split_whitespace().next())
        .expect("first listed id")
        .to_string();

    let export = run(&env, &["export", &id[..8], "--format", "md"]).await;
    assert_success(&export, "export");
    let markdown = String::from_utf8_lossy(&export.stdout);
    assert!(markdown.contains("# Medical Consultation Notes"));
    assert!(markdown.contains("Drug Interaction Alert"));

    let out_dir = tempfile::tempdir().unwrap();
    let out_arg = out_dir.path().to_string_lossy().to_string();
    let to_dir = run(&env, &["export", &id, "--format", "json", "--output", &out_arg]).await;
    assert_success(&to_dir, "export to directory");
    let written: Vec<String> = std::fs::read_dir(out_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("prescription_Sarah_Ahmed_"));
    assert!(written[0].ends_with(".json"));

    let stats = run(&env, &["history", "stats"]).await;
    assert!(String::from_utf8_lossy(&stats.stdout).contains("Time saved: 30 min"));

    let delete = run(&env, &["history", "delete", &id]).await;
    assert_success(&delete, "history delete");
    let after = run(&env, &["history", "list"]).await;
    assert!(String::from_utf8_lossy(&after.stdout).contains("No consultations found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn no_save_leaves_history_empty() {
    let stub = StubLlm::replying(FLU_NOTE_JSON).await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run(
        &env,
        &[
            "analyze",
            "Doctor: how are you? Patient: I have had a cough for a week.",
            "--no-save",
        ],
    )
    .await;
    assert_success(&output, "analyze --no-save");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Viral infection (Influenza)"));

    let list = run(&env, &["history", "list"]).await;
    assert!(String::from_utf8_lossy(&list.stdout).contains("No consultations found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_reply_still_succeeds_with_warning() {
    let stub = StubLlm::replying("I cannot produce JSON today.").await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run(&env, &["analyze", "--demo", "--no-save"]).await;
    assert_success(&output, "analyze with malformed reply");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Unable to analyze - please retry"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not be parsed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_failure_is_an_error_and_not_saved() {
    let stub = StubLlm::failing(axum::http::StatusCode::UNAUTHORIZED).await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run(&env, &["analyze", "--demo"]).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to analyze consultation"));

    let list = run(&env, &["history", "list"]).await;
    assert!(String::from_utf8_lossy(&list.stdout).contains("No consultations found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn dictated_lines_are_joined_and_analyzed() {
    let stub = StubLlm::replying(FLU_NOTE_JSON).await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run_with_stdin(
        &env,
        &["dictate", "--no-save"],
        "Doctor: what brings you in today?\nPatient: fever and headache since Monday.\n",
    )
    .await;
    assert_success(&output, "dictate");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Sarah Ahmed"));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn short_dictation_makes_no_model_call() {
    let stub = StubLlm::replying(FLU_NOTE_JSON).await;
    let env = Arc::new(TestEnv::new());
    env.use_stub_provider(&stub);

    let output = run_with_stdin(&env, &["dictate"], "hello\n").await;
    assert!(!output.status.success());
    assert_eq!(stub.calls(), 0);
}
