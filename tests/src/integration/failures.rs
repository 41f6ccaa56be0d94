//! # Failure Tests
//!
//! Stores going away and requests being refused. There is no rollback:
//! shards written before a failure stay where they are.

#[cfg(test)]
mod tests {
    use shared_wire::{
        listing_unavailable, remove_failed, upload_failed, upload_rejected, LISTING_HEADER,
        UPLOAD_SUCCESSFUL,
    };
    use ts_01_shard_store::ShardStoreApi;
    use ts_03_coordinator::{CoordinatorConfig, FanOutMode};

    use crate::harness::Cluster;

    const PHOTO: &[u8] = b"123456789";

    fn sequential() -> CoordinatorConfig {
        CoordinatorConfig::with_fan_out(FanOutMode::Sequential)
    }

    // =============================================================================
    // UNREACHABLE STORES
    // =============================================================================

    /// Parallel upload attempts every shard, so the reachable stores keep theirs
    #[tokio::test]
    async fn test_parallel_upload_with_store_down() {
        let mut cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        cluster.stop_store(1).await;
        let mut session = cluster.connect().await.unwrap();

        let status = session.upload("photo.jpg", PHOTO).await.unwrap();
        assert_eq!(status, upload_failed("photo.jpg"));

        assert_eq!(cluster.store(0).blob("photo.jpg_part1").unwrap(), b"123");
        assert_eq!(cluster.store(2).blob("photo.jpg_part3").unwrap(), b"789");

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_sequential_upload_stops_at_failed_store() {
        let mut cluster = Cluster::start(sequential()).await.unwrap();
        cluster.stop_store(1).await;
        let mut session = cluster.connect().await.unwrap();

        let status = session.upload("photo.jpg", PHOTO).await.unwrap();
        assert_eq!(status, upload_failed("photo.jpg"));

        // Shard 0 was written before the failure; shard 2 was never attempted
        assert_eq!(cluster.store(0).blob("photo.jpg_part1").unwrap(), b"123");
        assert!(cluster.store(2).keys().is_empty());

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_sequential_upload_first_store_down_writes_nothing() {
        let mut cluster = Cluster::start(sequential()).await.unwrap();
        cluster.stop_store(0).await;
        let mut session = cluster.connect().await.unwrap();

        session.upload("photo.jpg", PHOTO).await.unwrap();
        assert!(cluster.store(1).keys().is_empty());
        assert!(cluster.store(2).keys().is_empty());

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    /// A partial file is never returned
    #[tokio::test]
    async fn test_download_with_store_down_is_not_found() {
        for config in [CoordinatorConfig::default(), sequential()] {
            let mut cluster = Cluster::start(config).await.unwrap();
            let mut session = cluster.connect().await.unwrap();
            session.upload("photo.jpg", PHOTO).await.unwrap();

            cluster.stop_store(2).await;
            assert_eq!(session.download("photo.jpg").await.unwrap(), None);

            session.exit().await.unwrap();
            cluster.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_list_marks_unreachable_store() {
        let mut cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();
        session.upload("photo.jpg", PHOTO).await.unwrap();

        cluster.stop_store(1).await;
        let lines = session.list().await.unwrap();
        assert_eq!(
            lines,
            vec![
                LISTING_HEADER.to_string(),
                "Sub-server 1:".to_string(),
                " - photo.jpg_part1".to_string(),
                listing_unavailable(2),
                "Sub-server 3:".to_string(),
                " - photo.jpg_part3".to_string(),
            ]
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    /// Remove visits every store even in sequential mode
    #[tokio::test]
    async fn test_remove_with_store_down_reports_failure() {
        for config in [CoordinatorConfig::default(), sequential()] {
            let mut cluster = Cluster::start(config).await.unwrap();
            let mut session = cluster.connect().await.unwrap();
            session.upload("photo.jpg", PHOTO).await.unwrap();

            cluster.stop_store(0).await;
            let status = session.remove("photo.jpg").await.unwrap();
            assert_eq!(status, remove_failed("photo.jpg"));
            assert!(cluster.store(1).keys().is_empty());
            assert!(cluster.store(2).keys().is_empty());

            session.exit().await.unwrap();
            cluster.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_remove_missing_file_reports_failure() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        let status = session.remove("ghost.bin").await.unwrap();
        assert_eq!(status, remove_failed("ghost.bin"));

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    // =============================================================================
    // REFUSED UPLOADS
    // =============================================================================

    #[tokio::test]
    async fn test_empty_upload_rejected_session_continues() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        assert_eq!(session.upload("empty", b"").await.unwrap(), upload_rejected(0));
        assert_eq!(session.upload("x", b"xyz").await.unwrap(), UPLOAD_SUCCESSFUL);
        assert_eq!(cluster.store(0).keys(), vec!["x_part1"]);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_oversized_upload_closes_session() {
        let config = CoordinatorConfig {
            max_file_size: 8,
            ..CoordinatorConfig::default()
        };
        let cluster = Cluster::start(config).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        // The body is never read, so closing may reset the connection before
        // the reply is seen
        if let Ok(status) = session.upload("big", PHOTO).await {
            assert_eq!(status, upload_rejected(9));
        }
        assert!(session.list().await.is_err());
        for i in 0..3 {
            assert!(cluster.store(i).keys().is_empty());
        }

        // Other sessions are unaffected
        let mut other = cluster.connect().await.unwrap();
        assert_eq!(other.upload("small", b"12345678").await.unwrap(), UPLOAD_SUCCESSFUL);

        other.exit().await.unwrap();
        cluster.shutdown().await;
    }

    /// A store answering with a shard no acceptable file could produce
    #[tokio::test]
    async fn test_oversized_stored_shard_reads_as_not_found() {
        let config = CoordinatorConfig {
            max_file_size: 8,
            ..CoordinatorConfig::default()
        };
        let cluster = Cluster::start(config).await.unwrap();
        cluster.store(0).service.store("big_part1", b"12".to_vec()).unwrap();
        cluster.store(1).service.store("big_part2", b"34".to_vec()).unwrap();
        cluster
            .store(2)
            .service
            .store("big_part3", b"56789".to_vec())
            .unwrap();

        let mut session = cluster.connect().await.unwrap();
        assert_eq!(session.download("big").await.unwrap(), None);

        cluster.store(2).service.store("big_part3", b"5678".to_vec()).unwrap();
        assert_eq!(
            session.download("big").await.unwrap().as_deref(),
            Some(&b"12345678"[..])
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }
}
