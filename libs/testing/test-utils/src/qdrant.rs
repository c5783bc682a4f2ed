//! Qdrant test infrastructure.
//!
//! `TestQdrant` starts a throwaway Qdrant container and exposes its gRPC URL.

use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::qdrant::Qdrant;

/// Running Qdrant container.
///
/// The container is stopped and removed when this value is dropped.
///
/// ```no_run
/// use test_utils::TestQdrant;
///
/// # async fn example() {
/// let qdrant = TestQdrant::new().await;
/// let url = qdrant.url(); // gRPC endpoint, e.g. http://127.0.0.1:49153
/// # }
/// ```
pub struct TestQdrant {
    #[allow(dead_code)]
    container: ContainerAsync<Qdrant>,
    url: String,
}

impl TestQdrant {
    pub async fn new() -> Self {
        let container = Qdrant::default()
            .with_tag("v1.15.1")
            .start()
            .await
            .expect("Failed to start Qdrant container");

        let host_port = container
            .get_host_port_ipv4(6334)
            .await
            .expect("Failed to get Qdrant gRPC port");

        let url = format!("http://127.0.0.1:{}", host_port);

        tracing::info!(port = host_port, "Test Qdrant ready");

        Self { container, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TestQdrant {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Qdrant container");
    }
}
