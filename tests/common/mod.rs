use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

/// A well-formed model reply for the built-in demo consultation.
#[allow(dead_code)]
pub const FLU_NOTE_JSON: &str = r#"{
  "patientInfo": {"name": "Sarah Ahmed", "age": "28", "gender": "Female"},
  "symptoms": ["Severe headache", "High fever (102°F)", "Body aches", "Nausea", "Scratchy throat"],
  "diagnosis": "Viral infection (Influenza)",
  "medications": [
    {"name": "Paracetamol", "dosage": "500mg", "frequency": "Three times daily after meals", "duration": "5 days"},
    {"name": "Antiemetic", "dosage": "As prescribed", "frequency": "Twice daily", "duration": "3 days"}
  ],
  "instructions": "Rest well, drink at least 8 glasses of water daily. Return if fever persists beyond 3 days."
}"#;

#[allow(dead_code)]
pub fn run_soapnote(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
    runtime: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
            runtime: tempfile::tempdir().expect("create temporary XDG runtime dir"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_soapnote"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env("XDG_RUNTIME_DIR", self.runtime.path())
            .env_remove("SOAPNOTE_API_KEY")
            .env_remove("GROQ_API_KEY")
            .env_remove("SOAPNOTE_BIND")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute soapnote binary")
    }

    #[allow(dead_code)]
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn soapnote binary");

        child
            .stdin
            .take()
            .expect("child stdin")
            .write_all(input.as_bytes())
            .expect("write child stdin");

        child.wait_with_output().expect("wait for soapnote binary")
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }

    /// Point the `openai` provider at a local stub.
    #[allow(dead_code)]
    pub fn use_stub_provider(&self, stub: &StubLlm) {
        self.write_config(&format!(
            "[llm]\nprovider = \"openai\"\napi_key = \"test-key\"\nmodel = \"stub-model\"\nendpoint = \"{}\"\nmax_retries = 0\ntimeout_secs = 5\n",
            stub.endpoint()
        ));
    }
}

/// Local stand-in for an OpenAI-compatible `/chat/completions` API.
#[allow(dead_code)]
pub struct StubLlm {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
#[derive(Clone)]
struct StubState {
    status: StatusCode,
    content: String,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl StubLlm {
    /// Answer every completion with `content` as the assistant message.
    pub async fn replying(content: &str) -> Self {
        Self::start(StatusCode::OK, content).await
    }

    /// Answer every completion with an error status.
    pub async fn failing(status: StatusCode) -> Self {
        Self::start(status, "").await
    }

    async fn start(status: StatusCode, content: &str) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = StubState {
            status,
            content: content.to_string(),
            calls: calls.clone(),
        };

        let app = Router::new()
            .route("/chat/completions", post(complete))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, calls }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
async fn complete(
    State(state): State<StubState>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);

    if !state.status.is_success() {
        return (
            state.status,
            Json(json!({"error": {"message": "Invalid API Key"}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-stub",
            "model": request["model"],
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": state.content},
                "finish_reason": "stop"
            }]
        })),
    )
}
