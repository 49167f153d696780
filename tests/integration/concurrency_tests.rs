//! Concurrent accounting tests
//!
//! Many simultaneous requests against a threshold must produce an exact count and exactly one
//! shutdown request.

#[cfg(test)]
mod tests {
    use crate::common::{StubFixture, config};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use futures::future::join_all;
    use std::sync::Arc;
    use stubhttp::server::accounting::RequestAccountant;
    use stubhttp::server::shutdown;
    use stubhttp::server::{ShutdownReason, create_app};

    #[actix_web::test]
    async fn test_concurrent_requests_signal_exactly_once() {
        const REQUESTS: u64 = 200;
        const THRESHOLD: u64 = 50;

        let mut fixture = StubFixture::new(config().with_count(THRESHOLD));
        let app = test::init_service(create_app(fixture.state.clone())).await;

        let responses = join_all((0..REQUESTS).map(|i| {
            let req = test::TestRequest::get()
                .uri(&format!("/req/{}", i))
                .to_request();
            test::call_service(&app, req)
        }))
        .await;

        assert!(responses.iter().all(|res| res.status() == StatusCode::OK));
        assert_eq!(fixture.served(), REQUESTS);
        assert_eq!(
            fixture.listener.try_wait(),
            Some(ShutdownReason::ThresholdReached(THRESHOLD))
        );
        assert_eq!(fixture.listener.try_wait(), None);
    }

    /// Worker threads hammer one accountant; the threshold is crossed once, never skipped
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_accountant_across_worker_threads() {
        const TASKS: u64 = 32;
        const PER_TASK: u64 = 250;

        let (signal, mut listener) = shutdown::channel();
        let accountant = Arc::new(RequestAccountant::new(TASKS * PER_TASK / 2, signal));

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let accountant = Arc::clone(&accountant);
                tokio::spawn(async move {
                    for _ in 0..PER_TASK {
                        accountant.record();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(accountant.served(), TASKS * PER_TASK);
        assert!(accountant.threshold_reached());
        assert_eq!(
            listener.wait().await,
            Some(ShutdownReason::ThresholdReached(TASKS * PER_TASK / 2))
        );
        assert_eq!(listener.try_wait(), None);
    }
}
