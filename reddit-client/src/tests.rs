#[cfg(test)]
mod tests {
    use crate::{extract_comments, listing_children, normalize_post, FetchRequest, ListingFetcher, RedditApiClient};
    use scraper_core::{FetchError, ScraperSettings, SourceType};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    struct CannedResponse {
        status_line: &'static str,
        headers: Vec<(&'static str, String)>,
        body: String,
        delay: Duration,
    }

    impl CannedResponse {
        fn json(body: &str) -> Self {
            Self {
                status_line: "200 OK",
                headers: vec![("Content-Type", "application/json".to_string())],
                body: body.to_string(),
                delay: Duration::ZERO,
            }
        }

        fn status(status_line: &'static str) -> Self {
            Self {
                status_line,
                headers: Vec::new(),
                body: String::new(),
                delay: Duration::ZERO,
            }
        }
    }

    /// Serves one canned response on a random local port and reports the raw
    /// request text it received.
    async fn serve_once(response: CannedResponse) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = vec![0u8; 8192];
            let mut received = Vec::new();
            loop {
                let read = socket.read(&mut buffer).await.unwrap_or(0);
                received.extend_from_slice(&buffer[..read]);
                if read == 0 || received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let _ = request_tx.send(String::from_utf8_lossy(&received).to_string());

            tokio::time::sleep(response.delay).await;

            let mut raw = format!("HTTP/1.1 {}\r\n", response.status_line);
            for (name, value) in &response.headers {
                raw.push_str(&format!("{}: {}\r\n", name, value));
            }
            raw.push_str(&format!(
                "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.body.len(),
                response.body
            ));
            let _ = socket.write_all(raw.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        (format!("http://{}", address), request_rx)
    }

    fn client_for(base_url: &str, timeout_secs: u64) -> RedditApiClient {
        let settings = ScraperSettings {
            base_url: base_url.to_string(),
            user_agent: "reddit-scraper-test/1.0".to_string(),
            request_timeout_secs: timeout_secs,
            ..ScraperSettings::default()
        };
        RedditApiClient::new(&settings).unwrap()
    }

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {"id": "p1", "title": "First", "author": "alice", "subreddit": "rust", "created_utc": 1609459200}},
                {"kind": "t3", "data": {"id": "p2", "title": "Second", "author": "bob", "subreddit": "rust", "created_utc": 1609459260}}
            ]
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_returns_parsed_body_unchanged() {
        let (base, request_rx) = serve_once(CannedResponse::json(LISTING)).await;
        let client = client_for(&base, 5);

        let request = FetchRequest::ChannelListing {
            channel: "rust".to_string(),
            sort: scraper_core::SortMode::New,
            time_window: scraper_core::TimeWindow::Day,
            limit: 2,
        };
        let body = client.fetch(&request).await.unwrap();
        let expected: serde_json::Value = serde_json::from_str(LISTING).unwrap();
        assert_eq!(body, expected);

        let children = listing_children(&body);
        let posts: Vec<_> = children
            .iter()
            .map(|child| normalize_post(child, SourceType::Subreddit, "rust"))
            .collect();
        assert_eq!(posts[0].id, "p1");
        assert_eq!(posts[1].title, "Second");

        let raw_request = request_rx.await.unwrap();
        assert!(raw_request.starts_with("GET /r/rust/new.json?limit=2&raw_json=1 HTTP/1.1"));
        assert!(raw_request
            .to_ascii_lowercase()
            .contains("user-agent: reddit-scraper-test/1.0"));
    }

    #[tokio::test]
    async fn test_non_success_status_carries_code() {
        let (base, _request_rx) = serve_once(CannedResponse::status("404 Not Found")).await;
        let client = client_for(&base, 5);

        let result = client.fetch(&FetchRequest::comments("rust", "p1", 10)).await;
        match result {
            Err(FetchError::Status {
                status_code, url, ..
            }) => {
                assert_eq!(status_code, 404);
                assert!(url.contains("/r/rust/comments/p1.json"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after_header() {
        let mut response = CannedResponse::status("429 Too Many Requests");
        response.headers.push(("Retry-After", "12".to_string()));
        let (base, _request_rx) = serve_once(response).await;
        let client = client_for(&base, 5);

        let result = client.fetch(&FetchRequest::comments("rust", "p1", 10)).await;
        assert!(matches!(
            result,
            Err(FetchError::Status {
                status_code: 429,
                retry_after: Some(12),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let (base, _request_rx) = serve_once(CannedResponse::json("<html>blocked</html>")).await;
        let client = client_for(&base, 5);

        let result = client.fetch(&FetchRequest::comments("rust", "p1", 10)).await;
        assert!(matches!(result, Err(FetchError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let mut response = CannedResponse::json(LISTING);
        response.delay = Duration::from_secs(3);
        let (base, _request_rx) = serve_once(response).await;
        let client = client_for(&base, 1);

        let result = client.fetch(&FetchRequest::comments("rust", "p1", 10)).await;
        assert!(matches!(
            result,
            Err(FetchError::Timeout { seconds: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", address), 2);
        let result = client.fetch(&FetchRequest::comments("rust", "p1", 10)).await;
        assert!(matches!(result, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_comment_tree_end_to_end() {
        let body = r#"[
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "p1", "author": "alice"}}]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"id": "c1", "author": "alice", "body": "op here", "replies": {
                    "kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {"id": "c2", "author": "bob", "body": "reply", "replies": ""}}
                    ]}
                }}},
                {"kind": "more", "data": {"children": ["c9"]}}
            ]}}
        ]"#;
        let (base, _request_rx) = serve_once(CannedResponse::json(body)).await;
        let client = client_for(&base, 5);

        let response = client
            .fetch(&FetchRequest::comments("rust", "p1", 10))
            .await
            .unwrap();
        let comments = extract_comments(&response, "p1", "alice", 10);
        assert_eq!(comments.len(), 2);
        assert!(comments[0].is_submitter);
        assert_eq!(comments[1].id, "c2");
        assert!(!comments[1].is_submitter);
    }

    #[test]
    fn test_client_exposes_settings() {
        let client = client_for("https://www.reddit.com", 30);
        assert_eq!(client.user_agent(), "reddit-scraper-test/1.0");
        assert_eq!(client.base_url().as_str(), "https://www.reddit.com/");
    }
}
