//! gRPC server setup with health check and reflection.

use std::net::SocketAddr;

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tracing::info;

use crate::pb::{diary_service_server::DiaryServiceServer, FILE_DESCRIPTOR_SET};
use crate::service::DiaryServiceImpl;

/// Run the gRPC server on the given address.
///
/// Registers the DiaryService alongside health check and reflection
/// endpoints, then serves until the process exits.
pub async fn run_server(
    addr: SocketAddr,
    service: DiaryServiceImpl,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Starting gRPC server on {}", addr);

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<DiaryServiceServer<DiaryServiceImpl>>()
        .await;

    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    info!("gRPC server ready on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(reflection_service)
        .add_service(DiaryServiceServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}

/// Run the gRPC server with graceful shutdown support.
///
/// Accepts a shutdown signal future that, when resolved, triggers graceful
/// shutdown.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    service: DiaryServiceImpl,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!("Starting gRPC server on {} (with graceful shutdown)", addr);

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<DiaryServiceServer<DiaryServiceImpl>>()
        .await;

    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    info!("gRPC server ready on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(reflection_service)
        .add_service(DiaryServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal)
        .await?;

    info!("gRPC server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use daybook_embeddings::MockEmbedder;
    use daybook_llm::MockChat;
    use daybook_merge::MergeOptions;

    #[tokio::test]
    async fn test_server_starts_and_shuts_down() {
        let service = DiaryServiceImpl::new(
            Arc::new(MockChat::new()),
            Arc::new(MockEmbedder::new(2)),
            MergeOptions::default(),
        );

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            run_server_with_shutdown(addr, service, async {
                rx.await.ok();
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(()).ok();

        let result = timeout(Duration::from_secs(5), server_handle).await;
        assert!(result.is_ok());
    }
}
