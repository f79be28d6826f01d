//! Full seed-then-sweep runs in both deployment modes. After every
//! worker joins, the run is quiescent: token totals must be conserved
//! and the summary invariant must hold exactly.

use std::num::NonZeroUsize;

use model::{LocalModel, ModelAccess, ModelMeta, PsModel, PsTableGroup, Trainer};
use rand::{SeedableRng, rngs::StdRng};
use worker::{RoundRobin, WorkerConfig, corpus, run_sweeps, update};

fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn meta() -> ModelMeta {
    ModelMeta::new(nz(40), nz(5), nz(8), nz(32)).with_shards(nz(3))
}

fn corpus_fixture(meta: &ModelMeta) -> Vec<corpus::Document> {
    let mut rng = StdRng::seed_from_u64(1234);
    corpus::synthetic(meta, 60, 12, &mut rng)
}

fn assert_quiescent<M: ModelAccess>(model: &M, meta: &ModelMeta, total_tokens: i64, num_docs: i64) {
    let mut derived = vec![0i64; meta.num_topics()];
    for word in 0..meta.vocab_size() {
        let row = model.word_topic_row(word);
        for (topic, total) in derived.iter_mut().enumerate() {
            *total += i64::from(row.get(topic));
        }
    }

    let summary = model.summary_row().to_vec();
    assert_eq!(summary, derived, "summary row must match word-topic totals");
    assert_eq!(summary.iter().sum::<i64>(), total_tokens);

    let docs_counted: i64 = model.doc_length_row().iter().map(i64::from).sum();
    assert_eq!(docs_counted, num_docs);
}

#[test]
fn local_mode_preserves_counts_across_sweeps() {
    let meta = meta();
    let cfg = WorkerConfig::new(nz(4), 3);
    let mut docs = corpus_fixture(&meta);
    let total_tokens: i64 = docs.iter().map(|d| d.len() as i64).sum();
    let num_docs = docs.len() as i64;

    let model = LocalModel::cold(&meta);
    update::seed_corpus(&model, &meta, &docs);
    update::tally_topic_frequency(&model, &meta);

    let models: Vec<&LocalModel> = (0..cfg.workers()).map(|_| &model).collect();
    let choosers = vec![RoundRobin::new(meta.num_topics()); cfg.workers()];
    let metrics = run_sweeps(&cfg, &mut docs, models, choosers);

    assert_eq!(metrics.tokens, (total_tokens * 3) as u64);
    assert_quiescent(&model, &meta, total_tokens, num_docs);
}

#[test]
fn ps_mode_preserves_counts_across_sweeps() {
    let meta = meta();
    let cfg = WorkerConfig::new(nz(4), 3);
    let mut docs = corpus_fixture(&meta);
    let total_tokens: i64 = docs.iter().map(|d| d.len() as i64).sum();
    let num_docs = docs.len() as i64;

    let group = PsTableGroup::init(&meta, None).unwrap();
    let seeder = group.trainer();
    let seed_model = PsModel::new(&seeder);
    update::seed_corpus(&seed_model, &meta, &docs);
    update::tally_topic_frequency(&seed_model, &meta);

    let trainers: Vec<Trainer> = (0..cfg.workers()).map(|_| group.trainer()).collect();
    let models: Vec<PsModel> = trainers.iter().map(PsModel::new).collect();
    let choosers = vec![RoundRobin::new(meta.num_topics()); cfg.workers()];
    let metrics = run_sweeps(&cfg, &mut docs, models, choosers);

    assert_eq!(metrics.tokens, (total_tokens * 3) as u64);
    assert_quiescent(&seed_model, &meta, total_tokens, num_docs);
}

#[test]
fn both_modes_agree_on_final_assignments() {
    let meta = meta();
    let cfg = WorkerConfig::new(nz(2), 2);

    // Same corpus, same deterministic chooser: the two backends must land
    // on identical word-topic tables.
    let mut local_docs = corpus_fixture(&meta);
    let mut ps_docs = local_docs.clone();

    let local = LocalModel::cold(&meta);
    update::seed_corpus(&local, &meta, &local_docs);
    let models: Vec<&LocalModel> = (0..cfg.workers()).map(|_| &local).collect();
    let choosers = vec![RoundRobin::new(meta.num_topics()); cfg.workers()];
    run_sweeps(&cfg, &mut local_docs, models, choosers);

    let group = PsTableGroup::init(&meta, None).unwrap();
    let seeder = group.trainer();
    update::seed_corpus(&PsModel::new(&seeder), &meta, &ps_docs);
    let trainers: Vec<Trainer> = (0..cfg.workers()).map(|_| group.trainer()).collect();
    let models: Vec<PsModel> = trainers.iter().map(PsModel::new).collect();
    let choosers = vec![RoundRobin::new(meta.num_topics()); cfg.workers()];
    run_sweeps(&cfg, &mut ps_docs, models, choosers);

    let ps_model = PsModel::new(&seeder);
    for word in 0..meta.vocab_size() {
        assert_eq!(
            local.word_topic_row(word).to_vec(),
            ps_model.word_topic_row(word).to_vec(),
            "word {word}"
        );
    }
    assert_eq!(local.summary_row().to_vec(), ps_model.summary_row().to_vec());
}
