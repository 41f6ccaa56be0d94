//! # Round-Trip Tests
//!
//! Random file contents and sizes through the whole stack. Sizes cluster
//! around multiples of three so every remainder case is hit.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_wire::UPLOAD_SUCCESSFUL;
    use ts_02_shard_router::shard_sizes;
    use ts_03_coordinator::{CoordinatorConfig, FanOutMode};

    use crate::harness::Cluster;

    fn random_file(rng: &mut StdRng, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rng.fill(&mut bytes[..]);
        bytes
    }

    async fn round_trip_many(config: CoordinatorConfig, seed: u64) {
        let cluster = Cluster::start(config).await.unwrap();
        let mut session = cluster.connect().await.unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut sizes: Vec<usize> = (1..=12).collect();
        sizes.extend((0..20).map(|_| rng.gen_range(13..200_000)));

        for (i, len) in sizes.into_iter().enumerate() {
            let name = format!("random-{}.bin", i);
            let bytes = random_file(&mut rng, len);

            assert_eq!(session.upload(&name, &bytes).await.unwrap(), UPLOAD_SUCCESSFUL);

            let expected = shard_sizes(len);
            for (store, expected_len) in expected.iter().enumerate() {
                let key = format!("{}_part{}", name, store + 1);
                assert_eq!(cluster.store(store).blob(&key).unwrap().len(), *expected_len);
            }

            assert_eq!(
                session.download(&name).await.unwrap(),
                Some(bytes),
                "round trip failed for {} bytes",
                len
            );
        }

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_random_round_trips_parallel() {
        round_trip_many(CoordinatorConfig::default(), 7).await;
    }

    #[tokio::test]
    async fn test_random_round_trips_sequential() {
        round_trip_many(CoordinatorConfig::with_fan_out(FanOutMode::Sequential), 11).await;
    }

    #[tokio::test]
    async fn test_binary_names_and_contents() {
        let cluster = Cluster::start(CoordinatorConfig::default()).await.unwrap();
        let mut session = cluster.connect().await.unwrap();

        let bytes: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        for name in ["spaces in name.txt", "ünïcödé.bin", "dir/like/path"] {
            assert_eq!(session.upload(name, &bytes).await.unwrap(), UPLOAD_SUCCESSFUL);
            assert_eq!(session.download(name).await.unwrap().as_deref(), Some(&bytes[..]));
        }

        session.exit().await.unwrap();
        cluster.shutdown().await;
    }
}
