//! # Durability Tests
//!
//! File-backed stores keep their shards across a full cluster restart.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use shared_wire::UPLOAD_SUCCESSFUL;
    use ts_01_shard_store::FileBackedBlobStore;
    use ts_03_coordinator::CoordinatorConfig;

    use crate::harness::Cluster;

    /// Open the three data files, waiting for a previous run to drop its locks.
    async fn open_stores(dir: &Path) -> Vec<FileBackedBlobStore> {
        let mut stores = Vec::new();
        for i in 1..=3 {
            let path = dir.join(format!("store-{}.bin", i));
            let mut attempts = 0;
            let store = loop {
                match FileBackedBlobStore::open(&path) {
                    Ok(store) => break store,
                    Err(_) if attempts < 50 => {
                        attempts += 1;
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }
                    Err(e) => panic!("cannot open {}: {}", path.display(), e),
                }
            };
            stores.push(store);
        }
        stores
    }

    async fn start_cluster(dir: &Path) -> Cluster<FileBackedBlobStore> {
        let mut stores = open_stores(dir).await.into_iter();
        Cluster::start_with(CoordinatorConfig::default(), |_| stores.next().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_files_survive_restart() {
        let dir = tempfile::tempdir().unwrap();

        let cluster = start_cluster(dir.path()).await;
        let mut session = cluster.connect().await.unwrap();
        assert_eq!(
            session.upload("photo.jpg", b"123456789").await.unwrap(),
            UPLOAD_SUCCESSFUL
        );
        assert_eq!(
            session.upload("notes.txt", b"durable notes").await.unwrap(),
            UPLOAD_SUCCESSFUL
        );
        session.exit().await.unwrap();
        cluster.shutdown().await;

        let cluster = start_cluster(dir.path()).await;
        assert_eq!(
            cluster.store(1).keys(),
            vec!["notes.txt_part2", "photo.jpg_part2"]
        );

        let mut session = cluster.connect().await.unwrap();
        assert_eq!(
            session.download("photo.jpg").await.unwrap().as_deref(),
            Some(&b"123456789"[..])
        );
        assert_eq!(
            session.download("notes.txt").await.unwrap().as_deref(),
            Some(&b"durable notes"[..])
        );
        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_remove_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let cluster = start_cluster(dir.path()).await;
        let mut session = cluster.connect().await.unwrap();
        session.upload("photo.jpg", b"123456789").await.unwrap();
        session.remove("photo.jpg").await.unwrap();
        session.exit().await.unwrap();
        cluster.shutdown().await;

        let cluster = start_cluster(dir.path()).await;
        let mut session = cluster.connect().await.unwrap();
        assert_eq!(session.download("photo.jpg").await.unwrap(), None);
        session.exit().await.unwrap();
        cluster.shutdown().await;
    }
}
