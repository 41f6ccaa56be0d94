//! # Client Flow Tests
//!
//! Happy-path flows from a `ClientSession` through the coordinator to three
//! real shard stores.
//!
//! ## Flows Tested:
//!
//! 1. **Upload**: a file is split into three contiguous shards, one per store
//! 2. **Download**: the shards are read back and concatenated in index order
//! 3. **List**: one section per store, keys in lexicographic order
//! 4. **Remove**: every shard is deleted, then the file reads as missing

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_wire::{remove_succeeded, INVALID_COMMAND, LISTING_HEADER, UPLOAD_SUCCESSFUL};
    use tokio::time::timeout;
    use ts_03_coordinator::{CoordinatorConfig, FanOutMode};

    use crate::harness::Cluster;

    const PHOTO: &[u8] = b"123456789";

    // =============================================================================
    // UPLOAD / DOWNLOAD
    // =============================================================================

    /// The nine-byte photo lands as three 3-byte shards
    #[tokio::test]
    async fn test_photo_shards_land_on_each_store() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        let status = session.upload("photo.jpg", PHOTO).await.unwrap();
        assert_eq!(status, UPLOAD_SUCCESSFUL);

        assert_eq!(cluster.store(0).blob("photo.jpg_part1").unwrap(), b"123");
        assert_eq!(cluster.store(1).blob("photo.jpg_part2").unwrap(), b"456");
        assert_eq!(cluster.store(2).blob("photo.jpg_part3").unwrap(), b"789");

        // Each store only holds its own shard
        assert_eq!(cluster.store(0).keys(), vec!["photo.jpg_part1"]);
        assert_eq!(cluster.store(1).keys(), vec!["photo.jpg_part2"]);
        assert_eq!(cluster.store(2).keys(), vec!["photo.jpg_part3"]);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_photo_round_trip() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("photo.jpg", PHOTO).await.unwrap();
        let restored = session.download("photo.jpg").await.unwrap();
        assert_eq!(restored.as_deref(), Some(PHOTO));

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    /// Remainder bytes all go to the last shard
    #[tokio::test]
    async fn test_remainder_goes_to_last_store() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("ten.bin", b"0123456789").await.unwrap();
        assert_eq!(cluster.store(0).blob("ten.bin_part1").unwrap(), b"012");
        assert_eq!(cluster.store(1).blob("ten.bin_part2").unwrap(), b"345");
        assert_eq!(cluster.store(2).blob("ten.bin_part3").unwrap(), b"6789");

        session.upload("two.bin", b"ab").await.unwrap();
        assert_eq!(cluster.store(0).blob("two.bin_part1").unwrap(), b"");
        assert_eq!(cluster.store(1).blob("two.bin_part2").unwrap(), b"");
        assert_eq!(cluster.store(2).blob("two.bin_part3").unwrap(), b"ab");
        assert_eq!(
            session.download("two.bin").await.unwrap().as_deref(),
            Some(&b"ab"[..])
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_second_upload_overwrites() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("doc.txt", b"first version").await.unwrap();
        session.upload("doc.txt", b"second").await.unwrap();

        assert_eq!(
            session.download("doc.txt").await.unwrap().as_deref(),
            Some(&b"second"[..])
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_download_missing_file_is_none() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        assert_eq!(session.download("ghost.bin").await.unwrap(), None);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_sequential_mode_round_trip() {
        let config = CoordinatorConfig::with_fan_out(FanOutMode::Sequential);
        let cluster = Cluster::start(config).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        assert_eq!(
            session.upload("seq.bin", b"sequential").await.unwrap(),
            UPLOAD_SUCCESSFUL
        );
        assert_eq!(
            session.download("seq.bin").await.unwrap().as_deref(),
            Some(&b"sequential"[..])
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    // =============================================================================
    // LIST / REMOVE
    // =============================================================================

    #[tokio::test]
    async fn test_list_shows_every_store() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("b.txt", b"bbbbbb").await.unwrap();
        session.upload("a.txt", b"aaa").await.unwrap();

        let lines = session.list().await.unwrap();
        assert_eq!(
            lines,
            vec![
                LISTING_HEADER,
                "Sub-server 1:",
                " - a.txt_part1",
                " - b.txt_part1",
                "Sub-server 2:",
                " - a.txt_part2",
                " - b.txt_part2",
                "Sub-server 3:",
                " - a.txt_part3",
                " - b.txt_part3",
            ]
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_empty_cluster() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        assert_eq!(
            session.list().await.unwrap(),
            vec![LISTING_HEADER, "Sub-server 1:", "Sub-server 2:", "Sub-server 3:"]
        );

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_remove_deletes_every_shard() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("photo.jpg", PHOTO).await.unwrap();
        let status = session.remove("photo.jpg").await.unwrap();
        assert_eq!(status, remove_succeeded("photo.jpg"));

        for i in 0..3 {
            assert!(cluster.store(i).keys().is_empty());
        }
        assert_eq!(session.download("photo.jpg").await.unwrap(), None);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    // =============================================================================
    // SESSION HANDLING
    // =============================================================================

    #[tokio::test]
    async fn test_invalid_command_keeps_session_open() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        assert_eq!(session.send_raw("frobnicate").await.unwrap(), INVALID_COMMAND);
        assert_eq!(session.upload("x", b"xyz").await.unwrap(), UPLOAD_SUCCESSFUL);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_command_tokens_are_case_insensitive() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        session.upload("x", b"xyz").await.unwrap();
        // "LS" is answered with a listing, not "Invalid command"
        assert_eq!(session.send_raw("LS").await.unwrap(), LISTING_HEADER);

        cluster.shutdown().await;
    }

    /// Sessions are independent; each sees the others' completed uploads
    #[tokio::test]
    async fn test_concurrent_sessions() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let mut session = cluster.connect().await.unwrap();
            handles.push(tokio::spawn(async move {
                let name = format!("file-{}.bin", i);
                let bytes = vec![i as u8; 100 + i];
                assert_eq!(session.upload(&name, &bytes).await.unwrap(), UPLOAD_SUCCESSFUL);
                assert_eq!(session.download(&name).await.unwrap(), Some(bytes));
                session.exit().await.unwrap();
            }));
        }

        for handle in handles {
            timeout(Duration::from_secs(10), handle)
                .await
                .expect("session timed out")
                .unwrap();
        }

        let mut session = cluster.connect().await.unwrap();
        let lines = session.list().await.unwrap();
        assert_eq!(lines.iter().filter(|l| l.starts_with(" - ")).count(), 24);

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }
}
