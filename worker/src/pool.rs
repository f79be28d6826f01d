use std::{panic, thread};

use log::debug;
use model::ModelAccess;

use crate::{
    TopicChooser, WorkerConfig, WorkerMetrics,
    corpus::{Document, split_balanced},
    update,
};

/// Runs the configured number of sweeps with one thread per worker.
///
/// Each worker owns its backend value (a borrowed `LocalModel` or a
/// `PsModel` over its own trainer) and a contiguous, disjoint shard of
/// the corpus; all contention happens inside the count tables. The model
/// must already be seeded: setup is a barrier this driver assumes, it
/// does not re-check it.
///
/// # Panics
/// If the number of models or choosers differs from the configured worker
/// count, or if a worker thread panics (the panic is propagated).
pub fn run_sweeps<M, C>(
    cfg: &WorkerConfig,
    docs: &mut [Document],
    models: Vec<M>,
    choosers: Vec<C>,
) -> WorkerMetrics
where
    M: ModelAccess + Send,
    C: TopicChooser + Send,
{
    assert_eq!(models.len(), cfg.workers(), "one model per worker");
    assert_eq!(choosers.len(), cfg.workers(), "one chooser per worker");

    let shards = split_balanced(docs, cfg.workers());
    let mut merged = WorkerMetrics::default();

    thread::scope(|s| {
        let handles: Vec<_> = models
            .into_iter()
            .zip(choosers)
            .zip(shards)
            .enumerate()
            .map(|(worker_id, ((model, mut chooser), shard))| {
                s.spawn(move || {
                    let mut metrics = WorkerMetrics::default();

                    for _ in 0..cfg.sweeps() {
                        for doc in shard.iter_mut() {
                            for token in &mut doc.tokens {
                                let next = chooser.choose(token.word, token.topic, &model);
                                if update::move_token(&model, token.word, token.topic, next) {
                                    token.topic = next;
                                    metrics.bump_move();
                                }
                                metrics.bump_token();
                            }
                        }
                        metrics.bump_sweep();
                    }

                    debug!(worker_id = worker_id, tokens = metrics.tokens; "worker finished");
                    metrics
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(metrics) => merged.merge(&metrics),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
    });

    merged
}
