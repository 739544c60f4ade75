//! End-to-end tests for the tool bridge.
//!
//! In-process tests drive [`fanout::bridge::run_bridge`] with byte buffers;
//! the subprocess tests spawn the `fanout-host` binary and talk to it over
//! stdin/stdout. Every provider endpoint is a local `wiremock` server.

use std::process::Stdio;
use std::time::Duration;

use fanout::bridge::run_bridge;
use fanout::{HostConfig, build_tools};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DDG_HTML: &str = r#"<html><body>
<div class="result results_links web-result">
  <a class="result__a" href="https://www.rust-lang.org/">Rust</a>
  <div class="result__snippet">A language empowering everyone.</div>
</div>
<div class="result results_links web-result">
  <a class="result__a" href="https://doc.rust-lang.org/book/">The Book</a>
  <div class="result__snippet">Learn Rust.</div>
</div>
</body></html>"#;

async fn mock_ddg() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ddg/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DDG_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ddg/ia"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"RelatedTopics": []}"#))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> HostConfig {
    let mut config = HostConfig::default();
    config.search.duckduckgo.html_endpoint = format!("{}/ddg/html/", server.uri());
    config.search.duckduckgo.instant_answer_endpoint = format!("{}/ddg/ia", server.uri());
    config.search.google.endpoint = format!("{}/google", server.uri());
    config.search.bing.endpoint = format!("{}/bing", server.uri());
    config
}

async fn exchange(config: &HostConfig, input: &str) -> Vec<Value> {
    let tools = build_tools(config).expect("config builds in test");
    let mut out: Vec<u8> = Vec::new();
    run_bridge(&tools, input.as_bytes(), &mut out)
        .await
        .expect("bridge runs in test");
    String::from_utf8(out)
        .expect("utf8 in test")
        .lines()
        .map(|l| serde_json::from_str(l).expect("response is JSON in test"))
        .collect()
}

#[tokio::test]
async fn web_search_over_bridge() {
    let server = mock_ddg().await;
    let responses = exchange(
        &config_for(&server),
        r#"{"id": "s1", "tool": "web_search", "args": {"query": "rust", "num_results": 1}}"#,
    )
    .await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "s1");
    assert_eq!(responses[0]["ok"], true);
    let content = responses[0]["content"].as_str().unwrap_or_default();
    assert!(content.contains("Web Search Results for: 'rust'"));
    assert!(content.contains("1. **Rust**"));
    assert!(!content.contains("2. **"));
    assert!(content.contains("Provider used: DuckDuckGo (1 results)"));
}

#[tokio::test]
async fn research_topic_over_bridge() {
    let server = mock_ddg().await;
    let responses = exchange(
        &config_for(&server),
        r#"{"id": 1, "tool": "research_topic", "args": {"topic": "rust", "depth": "standard"}}"#,
    )
    .await;

    let content = responses[0]["content"].as_str().unwrap_or_default();
    assert_eq!(responses[0]["ok"], true);
    assert!(content.contains("Research Depth: Standard"));
    assert!(content.contains("Search Queries: 3"));
    // Every sub-query gets the same two pages, so only the first section keeps them.
    assert!(content.contains("Total Sources Found: 2"));
    assert!(content.contains("## Search Topic 3:"));
    assert!(content.contains("already appears above"));
}

#[tokio::test]
async fn caller_errors_and_status_in_one_session() {
    let server = mock_ddg().await;
    let input = [
        r#"{"id": 1, "tool": "web_search", "args": {"query": "rust", "num_results": 500}}"#,
        r#"{"id": 2, "tool": "research_topic", "args": {"topic": "rust", "depth": "huge"}}"#,
        r#"{"id": 3, "tool": "web_search", "args": {"query": "rust", "provider": "bing"}}"#,
        r#"{"id": 4, "tool": "search_status"}"#,
        "{broken",
    ]
    .join("\n");
    let responses = exchange(&config_for(&server), &input).await;
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["error"]["code"], "TOOL_VALIDATION");
    assert_eq!(responses[1]["error"]["code"], "TOOL_VALIDATION");

    // An unconfigured explicit provider is reported, not raised.
    assert_eq!(responses[2]["ok"], true);
    let failed = responses[2]["content"].as_str().unwrap_or_default();
    assert!(failed.contains("providers tried: [Bing: missing credentials]"));

    let status = responses[3]["content"].as_str().unwrap_or_default();
    assert!(status.contains("Summary: 1/3 providers available"));

    assert_eq!(responses[4]["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn output_bound_truncates() {
    let server = mock_ddg().await;
    let mut config = config_for(&server);
    config.tools.max_output_bytes = 40;
    let responses = exchange(
        &config,
        r#"{"id": 1, "tool": "web_search", "args": {"query": "rust"}}"#,
    )
    .await;
    assert_eq!(responses[0]["truncated"], true);
    let content = responses[0]["content"].as_str().unwrap_or_default();
    assert!(content.ends_with("[output truncated at 40 bytes]"));
}

#[tokio::test]
async fn binary_serves_requests_until_eof() {
    let server = mock_ddg().await;
    let dir = tempfile::tempdir().expect("tempdir in test");
    let config_path = dir.path().join("fanout.toml");
    std::fs::write(
        &config_path,
        format!(
            "[search.duckduckgo]\nhtml_endpoint = \"{uri}/ddg/html/\"\ninstant_answer_endpoint = \"{uri}/ddg/ia\"\n",
            uri = server.uri()
        ),
    )
    .expect("write config in test");

    let mut child = Command::new(env!("CARGO_BIN_EXE_fanout-host"))
        .env("FANOUT_CONFIG", &config_path)
        .env_remove("GOOGLE_SEARCH_API_KEY")
        .env_remove("GOOGLE_SEARCH_ENGINE_ID")
        .env_remove("BING_SEARCH_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn fanout-host in test");

    let mut stdin = child.stdin.take().expect("stdin piped in test");
    let stdout = child.stdout.take().expect("stdout piped in test");
    let mut lines = BufReader::new(stdout).lines();

    stdin
        .write_all(b"{\"id\": \"a\", \"tool\": \"list_tools\"}\n{\"id\": \"b\", \"tool\": \"web_search\", \"args\": {\"query\": \"rust\"}}\n")
        .await
        .expect("write requests in test");
    stdin.flush().await.expect("flush in test");
    drop(stdin);

    let mut responses = Vec::new();
    while let Some(line) = tokio::time::timeout(Duration::from_secs(30), lines.next_line())
        .await
        .expect("response before timeout in test")
        .expect("read stdout in test")
    {
        responses.push(serde_json::from_str::<Value>(&line).expect("JSON line in test"));
    }

    let status = child.wait().await.expect("child exits in test");
    assert!(status.success());

    assert_eq!(responses.len(), 2);
    let names: Vec<&str> = responses[0]["content"]
        .as_array()
        .map(|a| a.iter().filter_map(|s| s["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["research_topic", "search_status", "web_search"]);

    assert_eq!(responses[1]["id"], "b");
    let content = responses[1]["content"].as_str().unwrap_or_default();
    assert!(content.contains("https://www.rust-lang.org/"));
}

#[tokio::test]
async fn binary_rejects_unreadable_config() {
    let dir = tempfile::tempdir().expect("tempdir in test");
    let output = Command::new(env!("CARGO_BIN_EXE_fanout-host"))
        .env("FANOUT_CONFIG", dir.path().join("missing.toml"))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .expect("run fanout-host in test");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
