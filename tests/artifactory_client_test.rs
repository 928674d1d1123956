//! HTTP contract tests for `ArtifactoryClient` against a mock server.

use std::sync::Arc;
use std::time::Duration;

use artifactory_vfs::{
    ArtifactContext, ArtifactoryClient, ArtifactoryConfig, Credentials, FileInfo, RemoteStore,
    RepoPath, ScopeStack, StoreError, VfsError,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "generic-local";

fn test_config(server: &MockServer, credentials: Credentials) -> ArtifactoryConfig {
    let mut config = ArtifactoryConfig::new(
        &format!("{}/artifactory", server.uri()),
        REPO,
        credentials,
    );
    config.timeout_secs = 5;
    config.max_retries = 2;
    config
}

fn test_client(server: &MockServer) -> ArtifactoryClient {
    ArtifactoryClient::new(test_config(server, Credentials::Anonymous))
        .unwrap()
        .with_backoff(Duration::from_millis(1))
}

fn list_body(entries: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "uri": "http://localhost/artifactory/api/storage/generic-local/x",
        "created": "2024-01-15T10:00:00.000Z",
        "files": entries,
    }))
}

// ── list ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_immediate_children() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/repo/build-1"))
        .and(query_param("deep", "0"))
        .and(query_param("listFolders", "1"))
        .respond_with(list_body(serde_json::json!([
            {"uri": "/a.txt", "size": 10, "lastModified": "2024-01-15T10:30:00.000Z", "folder": false},
            {"uri": "/b", "size": -1, "lastModified": "2024-01-15T10:30:00.000Z", "folder": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let children = client.list(&RepoPath::new("repo/build-1")).await.unwrap();

    assert_eq!(
        children,
        vec![
            FileInfo::file("repo/build-1/a.txt", 10, 1_705_314_600_000),
            FileInfo::directory("repo/build-1/b", 1_705_314_600_000),
        ]
    );
}

#[tokio::test]
async fn list_sends_basic_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/dir"))
        .and(header("Authorization", "Basic Y2k6c2VjcmV0"))
        .respond_with(list_body(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(
        &server,
        Credentials::Basic {
            username: "ci".to_string(),
            password: "secret".to_string(),
        },
    );
    let client = ArtifactoryClient::new(config).unwrap();
    assert!(client.list(&RepoPath::new("dir")).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/dir"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/dir"))
        .respond_with(list_body(serde_json::json!([
            {"uri": "/f", "size": 3, "lastModified": "2024-01-15T10:30:00.000Z", "folder": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let children = client.list(&RepoPath::new("dir")).await.unwrap();
    assert_eq!(children.len(), 1);
}

#[tokio::test]
async fn list_does_not_retry_auth_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/dir"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.list(&RepoPath::new("dir")).await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized));
}

#[tokio::test]
async fn list_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/dir"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.list(&RepoPath::new("dir")).await.unwrap_err();
    assert!(matches!(err, StoreError::Server(500, _)));
}

// ── item info ────────────────────────────────────────────────────────

#[tokio::test]
async fn file_info_answers_single_path_queries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/repo/build-1/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "repo": "generic-local",
            "path": "/repo/build-1/a.txt",
            "lastModified": "2024-01-15T10:30:00.000Z",
            "size": "10",
            "downloadUri": "http://localhost/artifactory/generic-local/repo/build-1/a.txt"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let file = RepoPath::new("repo/build-1/a.txt");
    assert!(client.is_file(&file).await.unwrap());
    assert!(!client.is_folder(&file).await.unwrap());
    assert_eq!(client.size(&file).await.unwrap(), 10);
    assert_eq!(client.last_modified(&file).await.unwrap(), 1_705_314_600_000);
}

#[tokio::test]
async fn folder_info_is_a_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/repo/build-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "repo": "generic-local",
            "path": "/repo/build-1",
            "children": [{"uri": "/a.txt", "folder": false}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let dir = RepoPath::new("repo/build-1");
    assert!(client.is_folder(&dir).await.unwrap());
    assert!(!client.is_file(&dir).await.unwrap());
}

#[tokio::test]
async fn missing_item_is_neither_file_nor_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let missing = RepoPath::new("nope");
    assert!(!client.is_folder(&missing).await.unwrap());
    assert!(!client.is_file(&missing).await.unwrap());
    assert!(matches!(
        client.size(&missing).await,
        Err(StoreError::NotFound(_))
    ));
}

// ── download ─────────────────────────────────────────────────────────

#[tokio::test]
async fn download_verifies_checksum() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/generic-local/repo/log.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Checksum-Sha1", "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
                .set_body_bytes(b"hello".to_vec()),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let content = client.download(&RepoPath::new("repo/log.txt")).await.unwrap();
    assert_eq!(content, b"hello");
}

#[tokio::test]
async fn download_rejects_corrupt_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/generic-local/repo/log.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Checksum-Sha1", "0000000000000000000000000000000000000000")
                .set_body_bytes(b"hello".to_vec()),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .download(&RepoPath::new("repo/log.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ChecksumMismatch { .. }));
}

// ── end to end through the cache ─────────────────────────────────────

#[tokio::test]
async fn scoped_walk_costs_one_listing_per_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/repo/build-1"))
        .and(query_param("deep", "0"))
        .respond_with(list_body(serde_json::json!([
            {"uri": "/a.txt", "size": 10, "lastModified": "2024-01-15T10:30:00.000Z", "folder": false},
            {"uri": "/b", "size": -1, "lastModified": "2024-01-15T10:30:00.000Z", "folder": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/generic-local/repo/build-1/b"))
        .and(query_param("deep", "0"))
        .respond_with(list_body(serde_json::json!([
            {"uri": "/c.txt", "size": 20, "lastModified": "2024-01-15T10:30:00.000Z", "folder": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, Credentials::Anonymous);
    let context = ArtifactContext::new(config, Arc::new(test_client(&server)));
    let root = context.path("repo/build-1");

    let paths = Arc::clone(&context);
    let (files, sizes) = root
        .run(&ScopeStack::new(), |scope| async move {
            let mut files = Vec::new();
            let mut sizes = 0;
            let mut pending = vec![paths.path("repo/build-1")];
            while let Some(dir) = pending.pop() {
                for child in dir.list(&scope).await {
                    if child.is_directory(&scope).await {
                        pending.push(child);
                    } else {
                        sizes += child.length(&scope).await;
                        files.push(child.key().to_string());
                    }
                }
            }
            Ok::<_, VfsError>((files, sizes))
        })
        .await
        .unwrap();

    let mut files = files;
    files.sort();
    assert_eq!(files, vec!["repo/build-1/a.txt", "repo/build-1/b/c.txt"]);
    assert_eq!(sizes, 30);
    // MockServer verifies the `expect(1)` counts on drop
}
