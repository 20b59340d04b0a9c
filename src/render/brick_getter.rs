//! The brick-getter task: pops `requestTodo`, fetches without holding any
//! lock, and moves completed bricks to `requestDone`.
//!
//! Grounded on spec.md §4.8.5 and `GLVolumePool.cpp`'s
//! `brickGetterFunc`/`requestBricksFromGetterThread`. Runs as a plain OS
//! thread (matching the original's dedicated worker) rather than a tokio
//! task, since `IoDataset::get_brick` is a synchronous, potentially
//! blocking call into I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::io::dataset::IoDataset;
use crate::render::request_queue::{CompletedBrick, RequestQueue};

/// How long the getter sleeps between polls when `requestTodo` is empty.
const IDLE_POLL: Duration = Duration::from_millis(20);

/// Runs until `interrupt` is set. Intended to be spawned via
/// `std::thread::spawn` by the owning render session.
pub fn run(dataset: Arc<dyn IoDataset>, queue: Arc<RequestQueue>, interrupt: Arc<AtomicBool>) {
    while !interrupt.load(Ordering::Relaxed) {
        let Some(request) = queue.pop_todo() else {
            std::thread::sleep(IDLE_POLL);
            continue;
        };
        match dataset.get_brick(request.brick_key) {
            Ok(payload) => {
                if queue.is_wanted(&request) {
                    queue.push_done(CompletedBrick { request, payload });
                } else {
                    log::debug!("(brick-getter) discarding wasted request for {:?}: no longer wanted", request.brick_key);
                }
            }
            Err(err) => {
                log::warn!("(brick-getter) fetch for {:?} failed: {err}", request.brick_key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dataset::BrickKey;
    use crate::io::dummy::DummyDataset;
    use crate::render::request_queue::BrickRequest;

    #[test]
    fn fetches_enqueued_requests_until_interrupted() {
        let dataset: Arc<dyn IoDataset> = Arc::new(DummyDataset::new());
        let queue = Arc::new(RequestQueue::new());
        let interrupt = Arc::new(AtomicBool::new(false));

        queue.enqueue(BrickRequest {
            vector_id: 0,
            brick_key: BrickKey { modality: 0, timestep: 0, lod: 3, brick: 0 },
        });

        let worker_queue = queue.clone();
        let worker_interrupt = interrupt.clone();
        let handle = std::thread::spawn(move || run(dataset, worker_queue, worker_interrupt));

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            if !queue.drain_done().is_empty() {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "brick-getter did not complete the request in time");
            std::thread::sleep(Duration::from_millis(5));
        }

        interrupt.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn abandoned_request_is_discarded_instead_of_pushed_done() {
        let dataset: Arc<dyn IoDataset> = Arc::new(DummyDataset::new());
        let queue = Arc::new(RequestQueue::new());
        let interrupt = Arc::new(AtomicBool::new(false));

        let request = BrickRequest {
            vector_id: 0,
            brick_key: BrickKey { modality: 0, timestep: 0, lod: 3, brick: 0 },
        };
        queue.enqueue(request);
        queue.abandon(&request);

        let worker_queue = queue.clone();
        let worker_interrupt = interrupt.clone();
        let handle = std::thread::spawn(move || run(dataset, worker_queue, worker_interrupt));

        std::thread::sleep(Duration::from_millis(100));
        interrupt.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert!(queue.drain_done().is_empty());
    }
}
