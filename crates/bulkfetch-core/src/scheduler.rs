//! Bounded worker pool over a manifest.
//!
//! Keeps up to `concurrency` records in flight at once; each thread pulls the
//! next record from a shared queue until it is empty. Every record yields
//! exactly one outcome, returned in manifest order.

use crate::fetch::RecordWorker;
use crate::manifest::ManifestRecord;
use crate::outcome::Outcome;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread;

/// Runs `worker` over every record with at most `concurrency` calls in flight.
///
/// A panic inside `worker.process` is contained to its record and reported
/// as `worker.failed(record)`; sibling records are unaffected.
pub fn run_pool<W: RecordWorker>(
    records: &[ManifestRecord],
    concurrency: usize,
    worker: &W,
) -> Vec<Outcome> {
    let count = records.len();
    if count == 0 {
        return Vec::new();
    }
    let num_workers = concurrency.max(1).min(count);
    let work: Mutex<VecDeque<usize>> = Mutex::new((0..count).collect());
    let (tx, rx) = mpsc::channel::<(usize, Outcome)>();

    tracing::info!(records = count, workers = num_workers, "starting worker pool");

    thread::scope(|scope| {
        for worker_id in 0..num_workers {
            let work = &work;
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn_scoped(scope, move || loop {
                    let next = work.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some(index) = next else {
                        break;
                    };
                    let record = &records[index];
                    tracing::info!(
                        worker = worker_id,
                        path = %record.local_path.display(),
                        "processing"
                    );
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.process(record)))
                        .unwrap_or_else(|_| {
                            tracing::error!(line = record.line, url = %record.source_url, "worker panicked");
                            worker.failed(record)
                        });
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                });
            if let Err(e) = spawned {
                // Remaining threads drain the queue.
                tracing::warn!(worker = worker_id, error = %e, "could not spawn worker thread");
            }
        }
    });
    drop(tx);

    let mut slots: Vec<Option<Outcome>> = vec![None; count];
    for (index, outcome) in rx {
        slots[index] = Some(outcome);
    }
    slots
        .into_iter()
        .zip(records)
        .map(|(slot, record)| slot.unwrap_or_else(|| worker.failed(record)))
        .collect()
}
