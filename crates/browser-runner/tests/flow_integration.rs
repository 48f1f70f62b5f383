//! Integration tests for the HTTP flow runner
//!
//! Runs flows against a minimal in-process HTTP server built on `tokio::net::TcpListener`.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use a11ylens_browser_runner::{BrowserRunnerConfig, HttpFlowRunner};
use a11ylens_core::detector::{BrowserDetector, BrowserFlowConfig, FlowAction, FlowStepConfig};
use a11ylens_core::error::DetectorError;
use a11ylens_core::types::Impact;

const HOME: &str = r#"<!doctype html>
<html lang="en">
<head><title>Shop</title></head>
<body>
  <img src="/hero.png">
  <a href="/products">Products</a>
  <form action="/search" method="get">
    <label for="q">Search</label>
    <input id="q" name="q">
    <button type="submit">Search</button>
  </form>
</body>
</html>"#;

const PRODUCTS: &str = r#"<!doctype html>
<html lang="en">
<head><title>Products</title></head>
<body><a href="/cart"></a></body>
</html>"#;

const LOGIN: &str = r#"<!doctype html>
<html lang="en">
<head><title>Login</title></head>
<body>
  <form method="post" action="/login">
    <label>User <input name="user"></label>
    <button>Sign in</button>
  </form>
</body>
</html>"#;

const CLEAN: &str = r#"<!doctype html><html lang="en"><head><title>Done</title></head><body><p>ok</p></body></html>"#;

struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn route(method: &str, path: &str) -> (u16, &'static str) {
    let path_only = path.split('?').next().unwrap_or(path);
    match (method, path_only) {
        ("GET", "/") => (200, HOME),
        ("GET", "/products") => (200, PRODUCTS),
        ("GET", "/search") => (200, CLEAN),
        ("GET", "/login") => (200, LOGIN),
        ("POST", "/login") => (200, CLEAN),
        _ => (404, "<html><body>not found</body></html>"),
    }
}

async fn handle(mut stream: TcpStream, requests: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_owned();
    let path = request_line.next().unwrap_or_default().to_owned();
    requests
        .lock()
        .unwrap()
        .push(format!("{method} {path} {body}").trim_end().to_owned());

    let (status, page) = route(&method, &path);
    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{page}",
        if status == 200 { "OK" } else { "Not Found" },
        page.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn spawn_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle(stream, Arc::clone(&log)));
        }
    });

    TestServer { addr, requests }
}

fn fast_config() -> BrowserRunnerConfig {
    BrowserRunnerConfig {
        settle_ms: 0,
        type_settle_ms: 0,
        wait_ms: 10,
        navigation_timeout_ms: 5_000,
        interaction_timeout_ms: 5_000,
        probe_timeout_ms: 2_000,
        ..BrowserRunnerConfig::default()
    }
}

fn step(name: &str, action: FlowAction) -> FlowStepConfig {
    FlowStepConfig {
        name: name.to_owned(),
        action: Some(action),
        ..FlowStepConfig::default()
    }
}

#[tokio::test]
async fn test_empty_flow_audits_landing_page() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();

    let result = runner
        .scan_browser_flow("job_flow_1", &BrowserFlowConfig::new(server.url("/")))
        .await
        .unwrap();

    assert_eq!(result.steps().len(), 1);
    let landing = &result.steps()[0];
    assert_eq!(landing.name, "landing");
    assert_eq!(landing.action, Some(FlowAction::Navigate));
    assert_eq!(landing.url, server.url("/"));
    assert!(landing.capture_path.is_none());

    assert_eq!(result.issues().len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.id, "dom-1-1");
    assert_eq!(issue.title, "image-alt");
    assert_eq!(issue.impact, Impact::Critical);
    assert_eq!(issue.selector(), Some("html > body > img"));
    assert!(issue.file_path().is_none());
}

#[tokio::test]
async fn test_multi_step_flow_follows_links_and_submits_typed_values() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();

    let mut to_products = step("open products", FlowAction::Click);
    to_products.selector = Some("a[href='/products']".to_owned());
    let mut back_home = step("home again", FlowAction::Navigate);
    back_home.url = Some("/".to_owned());
    let mut type_query = step("type query", FlowAction::Type);
    type_query.selector = Some("#q".to_owned());
    type_query.value = Some("shoes".to_owned());
    let mut submit = step("submit search", FlowAction::Click);
    submit.selector = Some("button[type=submit]".to_owned());

    let config = BrowserFlowConfig::new(server.url("/"))
        .with_step(FlowStepConfig {
            name: "home".to_owned(),
            ..FlowStepConfig::default()
        })
        .with_step(to_products)
        .with_step(back_home)
        .with_step(type_query)
        .with_step(submit)
        .with_step(step("pause", FlowAction::Wait));

    let result = runner.scan_browser_flow("job_flow_2", &config).await.unwrap();

    let names: Vec<&str> = result.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["home", "open products", "home again", "type query", "submit search", "pause"]
    );
    assert_eq!(result.steps()[1].url, server.url("/products"));
    assert_eq!(result.steps()[1].issues[0].title, "link-name");
    assert_eq!(result.steps()[4].url, server.url("/search?q=shoes"));
    assert!(result.steps()[4].issues.is_empty());
    assert_eq!(result.steps()[5].action, Some(FlowAction::Wait));

    let flattened: usize = result.steps().iter().map(|s| s.issues.len()).sum();
    assert_eq!(result.issues().len(), flattened);
    let ids: HashSet<&str> = result.issues().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids.len(), result.issues().len());
    assert!(result.issues().iter().all(|i| i.selector().is_some()));

    assert!(server.requests().iter().any(|r| r == "GET /search?q=shoes"));
}

#[tokio::test]
async fn test_post_form_sends_typed_values() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();

    let mut type_user = step("type user", FlowAction::Type);
    type_user.selector = Some("input[name=user]".to_owned());
    type_user.value = Some("ada".to_owned());
    let mut sign_in = step("sign in", FlowAction::Click);
    sign_in.selector = Some("form button".to_owned());

    let mut open = step("login", FlowAction::Navigate);
    open.url = Some("/login".to_owned());
    let config = BrowserFlowConfig::new(server.url("/"))
        .with_step(open)
        .with_step(type_user)
        .with_step(sign_in);

    let result = runner.scan_browser_flow("job_flow_3", &config).await.unwrap();
    assert_eq!(result.steps().len(), 3);
    assert_eq!(result.steps()[2].url, server.url("/login"));
    assert!(server.requests().iter().any(|r| r == "POST /login user=ada"));
}

#[tokio::test]
async fn test_http_error_fails_the_whole_flow() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();

    let mut missing = step("missing page", FlowAction::Navigate);
    missing.url = Some("/does-not-exist".to_owned());
    let config = BrowserFlowConfig::new(server.url("/"))
        .with_step(step("home", FlowAction::Navigate))
        .with_step(missing);

    let err = runner
        .scan_browser_flow("job_flow_4", &config)
        .await
        .unwrap_err();
    match err {
        DetectorError::StepFailed { step, reason } => {
            assert_eq!(step, "missing page");
            assert!(reason.contains("404"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_click_on_missing_selector_fails() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();

    let mut click = step("buy", FlowAction::Click);
    click.selector = Some("#buy-now".to_owned());
    let config = BrowserFlowConfig::new(server.url("/"))
        .with_step(step("home", FlowAction::Navigate))
        .with_step(click);

    let err = runner
        .scan_browser_flow("job_flow_5", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, DetectorError::StepFailed { ref step, .. } if step == "buy"));
}

#[tokio::test]
async fn test_probe_reachable_and_unreachable() {
    let server = spawn_server().await;
    let runner = HttpFlowRunner::new(fast_config()).unwrap();
    runner.probe(&server.url("/")).await.unwrap();
    // 404도 응답이므로 도달 가능
    runner.probe(&server.url("/nowhere")).await.unwrap();

    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);
    let err = runner
        .probe(&format!("http://{closed_addr}/"))
        .await
        .unwrap_err();
    assert!(matches!(err, DetectorError::Unreachable { .. }));
}

#[tokio::test]
async fn test_captures_are_written_per_step() {
    let server = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = BrowserRunnerConfig {
        capture_dir: Some(dir.path().to_path_buf()),
        ..fast_config()
    };
    let runner = HttpFlowRunner::new(config).unwrap();

    let mut products = step("product list", FlowAction::Navigate);
    products.url = Some("/products".to_owned());
    let flow = BrowserFlowConfig::new(server.url("/"))
        .with_step(step("home", FlowAction::Navigate))
        .with_step(products);

    let result = runner.scan_browser_flow("job_flow_6", &flow).await.unwrap();
    assert_eq!(
        result.steps()[1].capture_path.as_deref(),
        Some("/captures/job_flow_6/step_2_product_list.html")
    );
    let saved = std::fs::read_to_string(
        dir.path().join("job_flow_6").join("step_2_product_list.html"),
    )
    .unwrap();
    assert_eq!(saved, PRODUCTS);
}
