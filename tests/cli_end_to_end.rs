#![deny(clippy::all, clippy::pedantic)]

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

const LIST_BODY: &str = r#"{"message":"Posts fetched successfully!","posts":[
    {"_id":"1","title":"First","content":"hello","imagePath":"http://localhost:3000/images/first.png"},
    {"_id":"2","title":"Second","content":"world","imagePath":""}
]}"#;

fn postboard(server: &MockServer) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("postboard"));
    cmd.env_remove("POSTBOARD_CONFIG_FILE")
        .env("RUST_LOG", "warn")
        .arg("--base-url")
        .arg(server.base_url());
    cmd
}

fn mock_list(server: &MockServer) {
    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(200)
            .header("content-type", "application/json")
            .body(LIST_BODY);
    });
}

fn image_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("tmp file");
    file.write_all(&[0x89, b'P', b'N', b'G']).expect("write image");
    file
}

#[test]
fn list_renders_every_post() {
    let server = MockServer::start();
    mock_list(&server);

    postboard(&server)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("[1] First"))
        .stdout(contains("image: http://localhost:3000/images/first.png"))
        .stdout(contains("[2] Second"));
}

#[test]
fn list_shows_empty_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"message":"ok","posts":[]}"#);
    });

    postboard(&server)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No posts added yet!"));
}

#[test]
fn base_url_can_come_from_environment() {
    let server = MockServer::start();
    mock_list(&server);

    Command::new(assert_cmd::cargo::cargo_bin!("postboard"))
        .env_remove("POSTBOARD_CONFIG_FILE")
        .env("POSTBOARD__API__BASE_URL", server.base_url())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("[1] First"));
}

#[test]
fn get_prints_raw_record() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/posts/2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"2","title":"Second","content":"world","imagePath":""}"#);
    });

    let assert = postboard(&server).arg("get").arg("2").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"_id\": \"2\""));
    mock.assert();
}

#[test]
fn add_uploads_image_and_prints_confirmed_post() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/api/posts")
            .body_includes("Content-Disposition: form-data; name=\"title\"\r\n\r\nT\r\n")
            .body_includes("Content-Disposition: form-data; name=\"content\"\r\n\r\nC\r\n")
            .body_includes("Content-Disposition: form-data; name=\"image\"; filename=\"T\"")
            .body_includes("Content-Type: image/png");
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"message":"Post added successfully","post":{"id":"9","imagePath":"/img/9.png"}}"#);
    });
    let image = image_file();

    let assert = postboard(&server)
        .arg("add")
        .arg("--title")
        .arg("T")
        .arg("--content")
        .arg("C")
        .arg("--image")
        .arg(image.path())
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"id\": \"9\""));
    assert!(output.contains("\"imagePath\": \"/img/9.png\""));
    mock.assert();
}

#[test]
fn add_with_missing_image_fails_before_upload() {
    let server = MockServer::start();

    postboard(&server)
        .arg("add")
        .arg("--title")
        .arg("T")
        .arg("--content")
        .arg("C")
        .arg("--image")
        .arg("/definitely/not/here.png")
        .assert()
        .failure()
        .stderr(contains("failed to read image file"));
}

#[test]
fn update_without_image_keeps_stored_path() {
    let server = MockServer::start();
    mock_list(&server);
    server.mock(|when, then| {
        when.method("GET").path("/api/posts/1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"_id":"1","title":"First","content":"hello","imagePath":"http://localhost:3000/images/first.png"}"#);
    });
    let put = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/posts/1")
            .json_body_includes(r#"{"id":"1","title":"First!","imagePath":"http://localhost:3000/images/first.png"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"message":"Update successful!"}"#);
    });

    postboard(&server)
        .arg("update")
        .arg("1")
        .arg("--title")
        .arg("First!")
        .arg("--content")
        .arg("hello again")
        .assert()
        .success()
        .stdout(contains("\"title\": \"First!\""));
    put.assert();
}

#[test]
fn delete_prints_remaining_posts() {
    let server = MockServer::start();
    mock_list(&server);
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/api/posts/1");
        then.status(200).body(r#"{"message":"Post deleted!"}"#);
    });

    let assert = postboard(&server)
        .arg("delete")
        .arg("1")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(!output.contains("[1] First"));
    assert!(output.contains("[2] Second"));
    delete.assert();
}

#[test]
fn server_errors_fail_the_command() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(500).body("database down");
    });

    postboard(&server)
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("database down"));
}

#[test]
fn invalid_base_url_fails_fast() {
    Command::new(assert_cmd::cargo::cargo_bin!("postboard"))
        .env_remove("POSTBOARD_CONFIG_FILE")
        .arg("--base-url")
        .arg("ftp://example.com")
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("api.base_url"));
}

#[test]
fn base_url_with_path_fails_fast() {
    Command::new(assert_cmd::cargo::cargo_bin!("postboard"))
        .env_remove("POSTBOARD_CONFIG_FILE")
        .arg("--base-url")
        .arg("http://localhost:3000/blog")
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("must be an origin without a path"));
}
