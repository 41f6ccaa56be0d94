//! # Coordinator Service
//!
//! Fans each whole-file operation out to the three shard stores and folds
//! the per-shard results back into one report.
//!
//! ## Fan-out
//!
//! - `Parallel`: the three calls run concurrently via `join_all`; every
//!   shard is attempted.
//! - `Sequential`: index order 0, 1, 2. Upload and download stop at the first
//!   failed shard; list and remove always visit all three stores.
//!
//! Nothing is rolled back. A failed upload may leave some shards written and
//! a failed remove may leave some shards deleted.

use crate::domain::{
    CoordinatorConfig, DownloadOutcome, FanOutMode, OperationReport, ShardClientError, ShardOp,
    ShardReport, StoreListing,
};
use crate::ports::{CoordinatorApi, ShardStoreClient};
use async_trait::async_trait;
use futures::future::join_all;
use shared_wire::DeleteStatus;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use ts_02_shard_router::{
    reassemble, split, ShardIndex, ShardPlacement, ShardRouter, StoreAddress, SHARD_COUNT,
};
use ts_telemetry::{time_histogram, SHARD_OPS, SHARD_OP_DURATION};

/// The Coordinator service.
pub struct Coordinator<C: ShardStoreClient> {
    router: Arc<ShardRouter>,
    clients: [C; SHARD_COUNT],
    config: CoordinatorConfig,
}

impl<C: ShardStoreClient> Coordinator<C> {
    /// Build a coordinator with one client per routed store.
    ///
    /// `connect` is called once per store address, in store order.
    pub fn new<F>(router: Arc<ShardRouter>, config: CoordinatorConfig, connect: F) -> Self
    where
        F: Fn(&StoreAddress) -> C,
    {
        let stores = router.stores();
        let clients = std::array::from_fn(|i| connect(&stores[i]));
        info!(
            "[ts-03] Coordinator ready ({:?} fan-out, stores: {})",
            config.fan_out,
            stores
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            router,
            clients,
            config,
        }
    }

    /// Routing table in use.
    pub fn router(&self) -> &ShardRouter {
        &self.router
    }

    /// Store clients in store order.
    pub fn clients(&self) -> &[C; SHARD_COUNT] {
        &self.clients
    }

    fn client_for(&self, index: ShardIndex) -> &C {
        &self.clients[self.router.route_shard(index).store_index]
    }

    /// Run `call` for every shard index according to the fan-out mode.
    ///
    /// Results come back in index order. With `fail_fast`, sequential mode
    /// stops after the first result for which `failed` holds.
    async fn fan_out<T, F, Fut, P>(&self, fail_fast: bool, call: F, failed: P) -> Vec<T>
    where
        F: Fn(ShardIndex) -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        match self.config.fan_out {
            FanOutMode::Parallel => join_all(ShardIndex::ALL.into_iter().map(&call)).await,
            FanOutMode::Sequential => {
                let mut results = Vec::with_capacity(SHARD_COUNT);
                for index in ShardIndex::ALL {
                    let result = call(index).await;
                    let stop = fail_fast && failed(&result);
                    results.push(result);
                    if stop {
                        debug!(shard = index.get(), "[ts-03] Stopping sequential fan-out");
                        break;
                    }
                }
                results
            }
        }
    }

    /// Apply the shard timeout and record metrics for one shard call.
    async fn timed<T, Fut>(
        &self,
        op: ShardOp,
        address: &StoreAddress,
        call: Fut,
    ) -> Result<T, ShardClientError>
    where
        Fut: Future<Output = Result<T, ShardClientError>>,
    {
        let _timer = time_histogram!(SHARD_OP_DURATION, op.as_str());

        let result = match self.config.shard_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| {
                    Err(ShardClientError::Timeout {
                        address: address.to_string(),
                        op: op.as_str(),
                    })
                }),
            None => call.await,
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        SHARD_OPS.with_label_values(&[op.as_str(), outcome]).inc();
        result
    }

    fn report(
        &self,
        op: ShardOp,
        placement: &ShardPlacement,
        error: Option<ShardClientError>,
    ) -> ShardReport {
        if let Some(e) = &error {
            warn!(
                shard = placement.index.get(),
                store = %placement.address,
                key = %placement.key,
                error = %e,
                "[ts-03] Shard {} failed",
                op.as_str()
            );
        }
        ShardReport {
            index: placement.index,
            key: placement.key.clone(),
            address: placement.address.clone(),
            failure: error.map(|e| e.to_string()),
        }
    }

    async fn store_shard(&self, placement: &ShardPlacement, data: &[u8]) -> ShardReport {
        let client = self.client_for(placement.index);
        let result = self
            .timed(
                ShardOp::Store,
                &placement.address,
                client.store(&placement.key, data),
            )
            .await;
        self.report(ShardOp::Store, placement, result.err())
    }

    async fn retrieve_shard(&self, placement: &ShardPlacement) -> (ShardReport, Vec<u8>) {
        let client = self.client_for(placement.index);
        match self
            .timed(
                ShardOp::Retrieve,
                &placement.address,
                client.retrieve(&placement.key),
            )
            .await
        {
            Ok(bytes) => (self.report(ShardOp::Retrieve, placement, None), bytes),
            Err(e) => (self.report(ShardOp::Retrieve, placement, Some(e)), Vec::new()),
        }
    }

    async fn remove_shard(&self, placement: &ShardPlacement) -> ShardReport {
        let client = self.client_for(placement.index);
        let result = self
            .timed(
                ShardOp::Remove,
                &placement.address,
                client.delete(&placement.key),
            )
            .await
            .and_then(|status| match status {
                DeleteStatus::Deleted => Ok(()),
                status => Err(ShardClientError::DeleteRejected {
                    key: placement.key.clone(),
                    status,
                }),
            });
        self.report(ShardOp::Remove, placement, result.err())
    }

    async fn list_store(&self, index: ShardIndex) -> StoreListing {
        let target = self.router.route_shard(index);
        let client = &self.clients[target.store_index];
        let keys = match self
            .timed(ShardOp::List, target.address, client.list_keys())
            .await
        {
            Ok(keys) => Some(keys),
            Err(e) => {
                warn!(store = %target.address, error = %e, "[ts-03] Store unavailable for ls");
                None
            }
        };
        StoreListing {
            ordinal: target.store_index + 1,
            address: target.address.clone(),
            keys,
        }
    }
}

#[async_trait]
impl<C: ShardStoreClient> CoordinatorApi for Coordinator<C> {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> OperationReport {
        let placements = self.router.placements(file_name);
        let parts = split(bytes);

        let shards = self
            .fan_out(
                true,
                |index| self.store_shard(&placements[index.get()], parts[index.get()]),
                |report: &ShardReport| !report.is_success(),
            )
            .await;

        let report = OperationReport {
            op: ShardOp::Store,
            shards,
        };
        if report.is_success() {
            info!(file = %file_name, bytes = bytes.len(), "[ts-03] 📤 Upload complete");
        } else {
            warn!(
                file = %file_name,
                failed = ?report.failed_indices(),
                "[ts-03] Upload failed"
            );
        }
        report
    }

    async fn download(&self, file_name: &str) -> DownloadOutcome {
        let placements = self.router.placements(file_name);

        let results = self
            .fan_out(
                true,
                |index| self.retrieve_shard(&placements[index.get()]),
                |(report, _): &(ShardReport, Vec<u8>)| !report.is_success(),
            )
            .await;

        let (shards, parts): (Vec<_>, Vec<_>) = results.into_iter().unzip();
        let report = OperationReport {
            op: ShardOp::Retrieve,
            shards,
        };

        let total: u64 = parts.iter().map(|part| part.len() as u64).sum();
        // Every shard empty is indistinguishable from a missing file
        let data = if !report.is_success() || total == 0 {
            None
        } else if total > self.config.max_file_size {
            warn!(
                file = %file_name,
                bytes = total,
                max = self.config.max_file_size,
                "[ts-03] Stored shards exceed the file size limit, refusing download"
            );
            None
        } else {
            Some(reassemble(parts))
        };

        match &data {
            Some(bytes) => {
                info!(file = %file_name, bytes = bytes.len(), "[ts-03] 📥 Download complete")
            }
            None => debug!(file = %file_name, "[ts-03] Download found nothing"),
        }

        DownloadOutcome { data, report }
    }

    async fn list(&self) -> Vec<StoreListing> {
        self.fan_out(false, |index| self.list_store(index), |_: &StoreListing| false)
            .await
    }

    async fn remove(&self, file_name: &str) -> OperationReport {
        let placements = self.router.placements(file_name);

        let shards = self
            .fan_out(
                false,
                |index| self.remove_shard(&placements[index.get()]),
                |report: &ShardReport| !report.is_success(),
            )
            .await;

        let report = OperationReport {
            op: ShardOp::Remove,
            shards,
        };
        if report.is_success() {
            info!(file = %file_name, "[ts-03] 🗑️  Remove complete");
        } else {
            warn!(
                file = %file_name,
                failed = ?report.failed_indices(),
                "[ts-03] Remove incomplete"
            );
        }
        report
    }

    fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}
