use pulse_core::Item;
use pulse_github::{GitHubClient, RepoRef};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issue(number: u64, pull_request: bool) -> Value {
    let mut value = json!({
        "number": number,
        "title": format!("Item {number}"),
        "body": null,
        "user": { "login": "octocat" },
        "created_at": "2024-03-01T10:00:00Z",
        "html_url": format!("https://github.com/octo/demo/issues/{number}"),
        "comments": 0,
    });
    if pull_request {
        value["pull_request"] = json!({ "url": "https://api.github.com/repos/octo/demo/pulls/1" });
    }
    value
}

fn page(start: u64, count: u64) -> Value {
    Value::Array((start..start + count).map(|n| issue(n, n % 2 == 0)).collect())
}

fn repo() -> RepoRef {
    "octo/demo".parse().unwrap()
}

async fn mount_page(server: &MockServer, number: &str, body: Value, status: u16) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues"))
        .and(query_param("page", number))
        .and(query_param("state", "all"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn paginates_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page(1, 25), 200).await;
    mount_page(&server, "2", page(26, 25), 200).await;
    mount_page(&server, "3", json!([]), 200).await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let outcome = client.fetch_issues(&repo()).await.unwrap();

    assert_eq!(outcome.items.len(), 50);
    assert_eq!(outcome.pages_requested, 3);
    assert!(outcome.halted_by.is_none());
    assert_eq!(outcome.items[0].number, 1);
    assert_eq!(outcome.items[49].number, 50);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn failing_page_keeps_earlier_items() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page(1, 25), 200).await;
    mount_page(&server, "2", json!({ "message": "API rate limit exceeded" }), 403).await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let outcome = client.fetch_issues(&repo()).await.unwrap();

    assert_eq!(outcome.items.len(), 25);
    assert_eq!(outcome.pages_requested, 2);
    assert_eq!(outcome.halted_by, Some(403));
    assert!(outcome.is_partial());
}

#[tokio::test]
async fn failing_first_page_is_a_total_failure() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({ "message": "Not Found" }), 404).await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let outcome = client.fetch_issues(&repo()).await.unwrap();

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages_requested, 1);
    assert!(outcome.is_total_failure());
}

#[tokio::test]
async fn sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues"))
        .and(header("authorization", "Bearer ghp_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new("ghp_secret", &server.uri()).unwrap();
    let outcome = client.fetch_issues(&repo()).await.unwrap();
    assert!(outcome.items.is_empty());
    assert!(outcome.halted_by.is_none());
}

#[tokio::test]
async fn pull_requests_are_told_apart_from_issues() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page(1, 2), 200).await;
    mount_page(&server, "2", json!([]), 200).await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let outcome = client.fetch_issues(&repo()).await.unwrap();

    assert_eq!(outcome.items[0].kind().to_string(), "Issue");
    assert_eq!(outcome.items[1].kind().to_string(), "PR");
}

#[tokio::test]
async fn missing_comments_degrade_to_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues/7/comments"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues/8/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "body": "First!" },
            { "body": null },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let mut items: Vec<Item> = vec![
        serde_json::from_value(issue(7, false)).unwrap(),
        serde_json::from_value(issue(8, true)).unwrap(),
    ];
    client.attach_comments(&repo(), &mut items).await;

    assert!(items[0].comments.is_empty());
    assert_eq!(items[1].comments, vec!["First!".to_string(), String::new()]);
}

#[tokio::test]
async fn single_issue_fetch_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue(42, false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/issues/43"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let item = client.fetch_issue(&repo(), 42).await.unwrap();
    assert_eq!(item.number, 42);

    let err = client.fetch_issue(&repo(), 43).await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn posted_reply_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/issues/5/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    client
        .post_comment(&repo(), 5, "abcdefghij", 4)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["body"], "abcd");
}

#[tokio::test]
async fn failed_reply_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/issues/6/comments"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "Bad Gateway" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new("ghp_test", &server.uri()).unwrap();
    let result = client.post_comment(&repo(), 6, "reply", 65536).await;
    assert!(result.is_err());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
