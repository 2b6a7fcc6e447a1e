use snp500_api::{Client, Error};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn fetch_page_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("sp500_page.html");

    Mock::given(method("GET"))
        .and(path("/wiki/List_of_SP_500_companies"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let url = format!("{}/wiki/List_of_SP_500_companies", mock_server.uri());
    let client = Client::with_url(&url);
    let html = client.fetch_page().await.unwrap();
    assert_eq!(html, body);
}

#[tokio::test]
async fn fetch_page_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = Client::with_url(&format!("{}/missing", mock_server.uri()));
    let err = client.fetch_page().await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn fetch_page_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = Client::with_url(&mock_server.uri());
    let result = client.fetch_page().await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 503, .. })));
}

#[tokio::test]
async fn fetch_page_unreachable_host() {
    let client = Client::with_url("http://127.0.0.1:1/")
        .with_timeout(std::time::Duration::from_secs(2));
    let result = client.fetch_page().await;
    assert!(matches!(result, Err(Error::RequestFailed)));
}
