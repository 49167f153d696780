//! Live server lifecycle tests
//!
//! Real sockets on ephemeral loopback ports, driven with reqwest.

#[cfg(test)]
mod tests {
    use crate::common::{ContentDir, config};
    use std::time::{Duration, Instant};
    use stubhttp::config::{BodySource, TlsConfig, validate_address};
    use stubhttp::server::{LifecycleState, ShutdownReason, StubServer};
    use stubhttp::utils::error::LifecycleError;

    const STOP_DEADLINE: Duration = Duration::from_secs(15);
    /// Well under actix's 5 second keep-alive, so an idle connection holding shutdown shows up
    const PROMPT_STOP: Duration = Duration::from_secs(3);

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(STOP_DEADLINE)
            .build()
            .unwrap()
    }

    // ==================== Count-triggered shutdown ====================

    #[actix_web::test]
    async fn test_stops_after_configured_count() {
        let server = StubServer::new(
            config()
                .with_count(3)
                .with_body(BodySource::Literal("live".to_string())),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        assert_eq!(bound.lifecycle(), LifecycleState::Listening);
        let addr = bound.local_addrs()[0];
        let state = bound.state();
        let serving = actix_web::rt::spawn(bound.serve());

        let client = client();
        for i in 0..3 {
            let res = client
                .get(format!("http://{}/req/{}", addr, i))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), 200);
            assert_eq!(res.text().await.unwrap(), "live");
        }

        let result = tokio::time::timeout(STOP_DEADLINE, serving)
            .await
            .expect("server should stop on its own")
            .unwrap();
        assert!(result.is_ok(), "{:?}", result.err());
        assert_eq!(state.accountant.served(), 3);

        assert!(client.get(format!("http://{}/", addr)).send().await.is_err());
    }

    /// A pooled client keeps its connection around; the last counted response must close it
    #[actix_web::test]
    async fn test_pooled_client_does_not_hold_shutdown() {
        let server = StubServer::new(
            config()
                .with_count(1)
                .with_body(BodySource::Literal("live".to_string())),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let serving = actix_web::rt::spawn(bound.serve());

        let client = client();
        let started = Instant::now();
        let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["connection"], "close");
        assert_eq!(res.text().await.unwrap(), "live");

        let result = tokio::time::timeout(STOP_DEADLINE, serving).await.unwrap().unwrap();
        assert!(result.is_ok(), "{:?}", result.err());
        assert!(
            started.elapsed() < PROMPT_STOP,
            "shutdown took {:?}",
            started.elapsed()
        );
    }

    /// A second request on the same keep-alive socket must never be served past the count
    #[actix_web::test]
    async fn test_keep_alive_socket_closed_at_threshold() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let server = StubServer::new(
            config()
                .with_count(1)
                .with_body(BodySource::Literal("live".to_string())),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let state = bound.state();
        let serving = actix_web::rt::spawn(bound.serve());

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: keep-alive\r\n\r\n")
            .await
            .unwrap();

        let mut raw = Vec::new();
        tokio::time::timeout(PROMPT_STOP, stream.read_to_end(&mut raw))
            .await
            .expect("server should close the connection")
            .unwrap();
        let text = String::from_utf8_lossy(&raw).to_ascii_lowercase();
        assert!(text.starts_with("http/1.1 200 ok"), "{}", text);
        assert!(text.contains("connection: close"), "{}", text);
        assert!(text.ends_with("live"), "{}", text);

        // the socket is gone, so nothing further can be served on it
        let _ = stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        let result = tokio::time::timeout(STOP_DEADLINE, serving).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert_eq!(state.accountant.served(), 1);
    }

    #[actix_web::test]
    async fn test_external_signal_stops_server() {
        let server = StubServer::new(config()).unwrap();
        let signal = server.shutdown_signal();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let serving = actix_web::rt::spawn(bound.serve());

        let res = client()
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        assert!(signal.trigger(ShutdownReason::Terminate));
        let result = tokio::time::timeout(STOP_DEADLINE, serving)
            .await
            .expect("server should stop after the signal")
            .unwrap();
        assert!(result.is_ok());
    }

    // ==================== Wire behavior ====================

    /// The wire length always matches a literal body, whatever was configured
    #[actix_web::test]
    async fn test_wire_content_length_for_literal_body() {
        let server = StubServer::new(
            config()
                .with_count(1)
                .with_header("Content-Length: 99")
                .with_body(BodySource::Literal("abc".to_string())),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let serving = actix_web::rt::spawn(bound.serve());

        let res = client()
            .post(format!("http://{}/upload", addr))
            .body("ignored")
            .send()
            .await
            .unwrap();
        assert_eq!(res.content_length(), Some(3));
        assert_eq!(res.text().await.unwrap(), "abc");

        let result = tokio::time::timeout(STOP_DEADLINE, serving).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    /// File bodies stream in chunks but still announce their full length
    #[actix_web::test]
    async fn test_wire_content_length_for_file_bodies() {
        let large = "x".repeat(150_000);
        let content = ContentDir::new(&[("large.bin", large.as_str()), ("site/page.html", "<p>hi</p>")]);

        let server = StubServer::new(
            config()
                .with_count(2)
                .with_body(BodySource::Path(content.join("large.bin"))),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let serving = actix_web::rt::spawn(bound.serve());

        let client = client();
        let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
        assert_eq!(res.content_length(), Some(150_000));
        assert_eq!(res.bytes().await.unwrap().len(), 150_000);
        let res = client.head(format!("http://{}/", addr)).send().await.unwrap();
        assert_eq!(res.headers()["content-length"], "150000");

        let result = tokio::time::timeout(STOP_DEADLINE, serving).await.unwrap().unwrap();
        assert!(result.is_ok());

        let server = StubServer::new(
            config()
                .with_count(1)
                .with_body(BodySource::Path(content.join("site"))),
        )
        .unwrap();
        let bound = server.bind().unwrap();
        let addr = bound.local_addrs()[0];
        let serving = actix_web::rt::spawn(bound.serve());

        let res = client.get(format!("http://{}/page.html", addr)).send().await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(res.content_length(), Some(9));
        assert_eq!(res.text().await.unwrap(), "<p>hi</p>");

        let result = tokio::time::timeout(STOP_DEADLINE, serving).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    // ==================== Startup failures ====================

    #[actix_web::test]
    async fn test_bind_conflict_is_a_lifecycle_error() {
        let first = StubServer::new(config()).unwrap().bind().unwrap();
        let port = first.local_addrs()[0].port();

        let address = validate_address(&format!("127.0.0.1:{}", port)).unwrap();
        let second = StubServer::new(stubhttp::StubConfig::new(address)).unwrap();
        let err = second.bind().err().unwrap();
        assert!(matches!(err, LifecycleError::Bind { .. }), "{}", err);
        drop(first);
    }

    #[actix_web::test]
    async fn test_out_of_range_port_fails_at_bind() {
        let address = validate_address("127.0.0.1:70000").unwrap();
        let server = StubServer::new(stubhttp::StubConfig::new(address)).unwrap();
        assert!(matches!(
            server.bind().err().unwrap(),
            LifecycleError::Bind { .. }
        ));
    }

    #[actix_web::test]
    async fn test_missing_tls_files_fail_at_bind() {
        let server = StubServer::new(config().with_tls(TlsConfig {
            cert_file: "/nonexistent/stubhttp/cert.pem".into(),
            key_file: "/nonexistent/stubhttp/key.pem".into(),
        }))
        .unwrap();
        assert!(matches!(
            server.bind().err().unwrap(),
            LifecycleError::Tls(_)
        ));
    }
}
