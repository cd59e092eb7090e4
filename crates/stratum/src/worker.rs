//! # Generation Worker
//!
//! Runs the pipeline on a dedicated thread.
//!
//! ```text
//!   caller                         worker thread
//!   ──────                         ─────────────
//!   submit(request) ──requests──►  pipeline.process()
//!   recv()          ◄──results───  CompletedGroup
//! ```
//!
//! Only requests and results cross the boundary; the pipeline lives on the
//! worker. Requests are processed one at a time, in submission order, each
//! to completion.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use stratum_meshing::{MergeStrategy, RawMesh};
use stratum_procedural::{CoordinateWarp, VoxelClassifier};

use crate::error::{StratumError, StratumResult};
use crate::pipeline::{GenerationRequest, GenerationResult, Pipeline};
use crate::queue::WorkQueue;

/// A processed request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedGroup {
    /// The request as submitted.
    pub request: GenerationRequest,
    /// Its per-chunk meshes.
    pub result: GenerationResult,
}

/// One merged mesh per chunk group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupMesh {
    /// The group's request.
    pub request: GenerationRequest,
    /// All chunk meshes of the group, merged.
    pub mesh: RawMesh,
}

/// Drains `queue` on the calling thread, merging each group's chunk meshes
/// with `strategy`. Groups come back in queue order.
///
/// # Errors
///
/// The first request that fails validation; later requests stay queued.
pub fn finish_level_generation<W: CoordinateWarp, C: VoxelClassifier>(
    pipeline: &Pipeline<W, C>,
    queue: &mut WorkQueue,
    strategy: MergeStrategy,
) -> StratumResult<Vec<GroupMesh>> {
    let mut groups = Vec::with_capacity(queue.len());
    while let Some(request) = queue.pop() {
        let result = pipeline.process(&request)?;
        groups.push(GroupMesh {
            request,
            mesh: result.merge(strategy),
        });
    }
    tracing::info!(groups = groups.len(), "finished level generation");
    Ok(groups)
}

/// Background generation thread.
pub struct GenerationWorker {
    /// Request channel; dropped to stop the thread.
    requests: Option<Sender<GenerationRequest>>,
    /// Result channel.
    results: Receiver<StratumResult<CompletedGroup>>,
    /// Worker thread handle.
    handle: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    /// Moves `pipeline` onto a new thread and starts serving requests.
    ///
    /// # Errors
    ///
    /// [`StratumError::Io`] if the thread cannot be spawned.
    pub fn spawn<W, C>(pipeline: Pipeline<W, C>) -> StratumResult<Self>
    where
        W: CoordinateWarp + Send + 'static,
        C: VoxelClassifier + Send + 'static,
    {
        let (request_tx, request_rx) = unbounded::<GenerationRequest>();
        let (result_tx, result_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("stratum-generation".into())
            .spawn(move || Self::worker_loop(&pipeline, &request_rx, &result_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Serves requests until the request channel closes or nobody is
    /// listening for results.
    fn worker_loop<W: CoordinateWarp, C: VoxelClassifier>(
        pipeline: &Pipeline<W, C>,
        requests: &Receiver<GenerationRequest>,
        results: &Sender<StratumResult<CompletedGroup>>,
    ) {
        tracing::debug!("generation worker started");
        for request in requests {
            let outcome = pipeline
                .process(&request)
                .map(|result| CompletedGroup { request, result });
            if results.send(outcome).is_err() {
                break;
            }
        }
        tracing::debug!("generation worker stopped");
    }

    /// Queues a request.
    ///
    /// # Errors
    ///
    /// [`StratumError::WorkerDisconnected`] if the worker has stopped.
    pub fn submit(&self, request: GenerationRequest) -> StratumResult<()> {
        self.requests
            .as_ref()
            .ok_or(StratumError::WorkerDisconnected)?
            .send(request)
            .map_err(|_| StratumError::WorkerDisconnected)
    }

    /// Blocks for the next result.
    ///
    /// # Errors
    ///
    /// The request's own validation error, or
    /// [`StratumError::WorkerDisconnected`] if the worker has stopped with
    /// nothing left to deliver.
    pub fn recv(&self) -> StratumResult<CompletedGroup> {
        self.results
            .recv()
            .map_err(|_| StratumError::WorkerDisconnected)?
    }

    /// The next result if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<StratumResult<CompletedGroup>> {
        self.results.try_recv().ok()
    }

    /// Background form of [`finish_level_generation`]: hands the queue to
    /// the worker one request at a time and collects one merged mesh per
    /// group in queue order.
    ///
    /// Results of earlier [`submit`](Self::submit) calls must be received
    /// first.
    ///
    /// # Errors
    ///
    /// The first failed request, or
    /// [`StratumError::WorkerDisconnected`]. Later requests stay queued.
    pub fn finish_level_generation(
        &self,
        queue: &mut WorkQueue,
        strategy: MergeStrategy,
    ) -> StratumResult<Vec<GroupMesh>> {
        let mut groups = Vec::with_capacity(queue.len());
        while let Some(request) = queue.pop() {
            self.submit(request)?;
            let completed = self.recv()?;
            groups.push(GroupMesh {
                request: completed.request,
                mesh: completed.result.merge(strategy),
            });
        }
        tracing::info!(groups = groups.len(), "finished level generation");
        Ok(groups)
    }

    /// Stops accepting requests and waits for queued ones to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("generation worker panicked");
            }
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
