#![deny(clippy::all, clippy::pedantic)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;

#[test]
fn list_prints_posts_as_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/posts").query_param("userId", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":1,"title":"Post 1","body":"b","userId":1}]"#);
    });

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("postdeck-cli"));
    let assert = cmd
        .env("POSTDECK_API_URL", server.url("/posts"))
        .args(["list", "--user-id", "1"])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"title\": \"Post 1\""));
    mock.assert();
}

#[test]
fn delete_reports_success_and_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("DELETE").path("/posts/1");
        then.status(200).body("{}");
    });
    server.mock(|when, then| {
        when.method("DELETE").path("/posts/999");
        then.status(404).body("{}");
    });

    Command::new(assert_cmd::cargo::cargo_bin!("postdeck-cli"))
        .args(["--api-url", &server.url("/posts"), "delete", "1"])
        .assert()
        .success()
        .stdout(contains("deleted"));

    Command::new(assert_cmd::cargo::cargo_bin!("postdeck-cli"))
        .args(["--api-url", &server.url("/posts"), "delete", "999"])
        .assert()
        .failure()
        .stderr(contains("404"));
}

#[test]
fn invalid_api_url_fails_fast() {
    Command::new(assert_cmd::cargo::cargo_bin!("postdeck-cli"))
        .env("POSTDECK_API_URL", "ftp://example.com/posts")
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("Url"));
}

#[test]
fn render_prints_page_for_filter() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/posts").query_param("userId", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":5,"title":"Rendered Post","body":"b","userId":2}]"#);
    });

    Command::new(assert_cmd::cargo::cargo_bin!("postdeck"))
        .env_remove("POSTDECK_CONFIG_FILE")
        .args([
            "render",
            "--user-id",
            "2",
            "--remote-base-url",
            &server.url("/posts"),
        ])
        .assert()
        .success()
        .stdout(contains("Rendered Post"))
        .stdout(contains("<!DOCTYPE html>"));
    mock.assert();
}

#[test]
fn render_shows_error_message_when_remote_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(503);
    });

    Command::new(assert_cmd::cargo::cargo_bin!("postdeck"))
        .args(["render", "--remote-base-url", &server.url("/posts")])
        .assert()
        .success()
        .stdout(contains("Error loading posts!"));
}

#[test]
fn serve_listens_before_the_first_listing_resolves() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200)
            .header("content-type", "application/json")
            .delay(Duration::from_secs(30))
            .body("[]");
    });

    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("free port")
        .port();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("postdeck"))
        .env_remove("POSTDECK_CONFIG_FILE")
        .args([
            "serve",
            "--server-port",
            &port.to_string(),
            "--remote-base-url",
            &server.url("/posts"),
            "--log-level",
            "error",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn server");

    let status_line = health_status_line(port, Duration::from_secs(10));
    let _ = child.kill();
    let _ = child.wait();

    let status_line = status_line.expect("server answered while the listing was pending");
    assert!(status_line.contains("204"), "{status_line}");
}

fn health_status_line(port: u16, within: Duration) -> Option<String> {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)) {
            stream.set_read_timeout(Some(Duration::from_secs(2))).ok()?;
            stream
                .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .ok()?;
            let mut response = String::new();
            stream.read_to_string(&mut response).ok()?;
            return response.lines().next().map(str::to_string);
        }
        thread::sleep(Duration::from_millis(50));
    }
    None
}
