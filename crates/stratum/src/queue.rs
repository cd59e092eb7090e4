//! # Work Queue
//!
//! Chunk groups waiting to be generated, nearest to the origin first.

use std::collections::VecDeque;

use stratum_core::IVec3;

use crate::config::GenerationConfig;
use crate::pipeline::GenerationRequest;

/// FIFO of generation requests.
#[derive(Clone, Debug, Default)]
pub struct WorkQueue {
    /// Pending requests, front is next.
    items: VecDeque<GenerationRequest>,
}

impl WorkQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The startup queue: `group_counts` groups laid out from
    /// [`GenerationConfig::base_offset`] in steps of `group_size`, sorted
    /// by distance from the origin.
    #[must_use]
    pub fn initial(config: &GenerationConfig) -> Self {
        let base = config.base_offset();
        let [gx, gy, gz] = config.group_counts;
        let step = config.group_size;

        let mut requests = Vec::with_capacity(gx * gy * gz);
        for z in 0..gz {
            for y in 0..gy {
                for x in 0..gx {
                    let coords = base
                        + IVec3::new(
                            (x * step[0]) as i32,
                            (y * step[1]) as i32,
                            (z * step[2]) as i32,
                        );
                    requests.push(GenerationRequest::new(config.chunk_size, step, coords));
                }
            }
        }

        Self::from_requests(requests)
    }

    /// Builds a queue from `requests`, sorted nearest-first. Equal
    /// distances keep their input order.
    #[must_use]
    pub fn from_requests(requests: impl IntoIterator<Item = GenerationRequest>) -> Self {
        let mut requests: Vec<GenerationRequest> = requests.into_iter().collect();
        requests.sort_by(|a, b| a.distance_from_origin().total_cmp(&b.distance_from_origin()));
        Self {
            items: requests.into(),
        }
    }

    /// Appends a request behind everything already queued.
    pub fn push(&mut self, request: GenerationRequest) {
        self.items.push_back(request);
    }

    /// Takes the next request.
    pub fn pop(&mut self) -> Option<GenerationRequest> {
        self.items.pop_front()
    }

    /// Pending request count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pending requests, next first.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationRequest> {
        self.items.iter()
    }
}

impl Iterator for WorkQueue {
    type Item = GenerationRequest;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}
