// Config loading tests

use interview_coach::{Config, InterviewType, OrchestratorConfig};
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_from_toml() {
    let file = write_config(
        r#"
[server]
bind = "0.0.0.0"
port = 8080

[credentials]
endpoint = "https://coach.example/api/get-signed-url"

[agents]
default = "agent-default"
market = "agent-market"

[upstream]
api_key = "secret"
signed_url_endpoint = "https://upstream.example/signed"

[animation]
cadence_ms = 150
"#,
    );

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.server.bind, "0.0.0.0");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.credentials.endpoint, "https://coach.example/api/get-signed-url");
    assert_eq!(cfg.agents.resolve(InterviewType::Market), "agent-market");
    assert_eq!(cfg.agents.resolve(InterviewType::Corporate), "agent-default");
    assert_eq!(cfg.upstream.api_key.as_deref(), Some("secret"));
    assert_eq!(cfg.animation.cadence(), Duration::from_millis(150));
    // Sections left out keep their defaults
    assert_eq!(cfg.media.width, 1280);
    assert_eq!(cfg.service.name, "interview-coach");
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");

    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(cfg.server.port, 3000);
    assert!(cfg.upstream.api_key.is_none());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let file = write_config(
        r#"
[credentials]
endpoint = "http://127.0.0.1:3000/api/get-signed-url"
request_timeout_secs = 10
"#,
    );

    std::env::set_var("INTERVIEW_COACH__CREDENTIALS__REQUEST_TIMEOUT_SECS", "3");
    let cfg = Config::load(file.path().to_str().unwrap());
    std::env::remove_var("INTERVIEW_COACH__CREDENTIALS__REQUEST_TIMEOUT_SECS");
    let cfg = cfg.unwrap();

    assert_eq!(cfg.credentials.endpoint, "http://127.0.0.1:3000/api/get-signed-url");
    assert_eq!(cfg.credentials.request_timeout(), Duration::from_secs(3));
}

#[test]
#[serial]
fn test_orchestrator_config_from_file() {
    let file = write_config(
        r#"
[agents]
corporate = "agent-corp"

[media]
width = 1920
height = 1080
frame_rate = 60
settle_delay_ms = 500
"#,
    );

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();
    let orch = OrchestratorConfig::from_config(&cfg, InterviewType::Corporate);

    assert_eq!(orch.interview_type, InterviewType::Corporate);
    assert_eq!(orch.agents.resolve(InterviewType::Corporate), "agent-corp");
    assert_eq!(orch.settle_delay, Duration::from_millis(500));
    assert_eq!(orch.animation_cadence, Duration::from_millis(200));

    let video = orch.media_constraints.video.unwrap();
    assert_eq!(video.ideal_width, 1920);
    assert_eq!(video.ideal_frame_rate, 60);
    assert!(orch.media_constraints.audio);
}

#[test]
#[serial]
fn test_partial_sections_fill_defaults() {
    let file = write_config(
        r#"
[server]
port = 8080

[upstream]
api_key = "k"

[agents]
market = "agent-market"
"#,
    );

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.bind, "127.0.0.1");
    assert_eq!(cfg.upstream.api_key.as_deref(), Some("k"));
    assert_eq!(
        cfg.upstream.signed_url_endpoint,
        "https://api.elevenlabs.io/v1/convai/conversation/get_signed_url"
    );
    assert_eq!(cfg.service.name, "interview-coach");
    assert_eq!(cfg.animation.cadence(), Duration::from_millis(200));
    assert_eq!(cfg.agents.resolve(InterviewType::Corporate), "default_agent_id");
}

#[test]
#[serial]
fn test_upstream_key_from_environment_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");

    std::env::set_var("INTERVIEW_COACH__UPSTREAM__API_KEY", "env-key");
    let cfg = Config::load(path.to_str().unwrap());
    std::env::remove_var("INTERVIEW_COACH__UPSTREAM__API_KEY");
    let cfg = cfg.unwrap();

    assert_eq!(cfg.upstream.api_key.as_deref(), Some("env-key"));
    assert_eq!(
        cfg.upstream.signed_url_endpoint,
        "https://api.elevenlabs.io/v1/convai/conversation/get_signed_url"
    );
}
