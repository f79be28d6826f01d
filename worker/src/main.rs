use std::{env, fs, num::NonZeroUsize};

use anyhow::Context;
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};

use model::{LocalModel, ModelAccess, ModelMeta, PsModel, PsTableGroup, Trainer};
use worker::{LeastLoaded, WorkerConfig, WorkerMetrics, corpus, run_sweeps, update};

const DEFAULT_VOCAB: usize = 500;
const DEFAULT_TOPICS: usize = 16;
const DEFAULT_DOCS: usize = 200;
const DEFAULT_MAX_DOC_LEN: usize = 30;
const RNG_SEED: u64 = 42;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let meta = load_meta()?;
    let workers = NonZeroUsize::new(env_usize("WORKERS", 4)?).context("WORKERS must be nonzero")?;
    let cfg = WorkerConfig::new(workers, env_usize("SWEEPS", 2)?);

    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let mut docs = corpus::synthetic(&meta, DEFAULT_DOCS, DEFAULT_MAX_DOC_LEN, &mut rng);
    let tokens: usize = docs.iter().map(|d| d.len()).sum();
    info!(docs = docs.len(), tokens = tokens; "synthesized corpus");

    let mode = env::var("MODE").unwrap_or_else(|_| "local".to_string());
    let metrics = match mode.as_str() {
        "local" => run_local(&cfg, &meta, &mut docs),
        "ps" => run_ps(&cfg, &meta, &mut docs)?,
        other => anyhow::bail!("unknown MODE `{other}`, expected `local` or `ps`"),
    };

    info!(tokens = metrics.tokens, moves = metrics.moves; "run complete");
    Ok(())
}

/// Reads the model dimensions from the file named by `MODEL_META`, or
/// falls back to built-in defaults.
fn load_meta() -> anyhow::Result<ModelMeta> {
    match env::var("MODEL_META") {
        Ok(path) => {
            let file = fs::File::open(&path).with_context(|| format!("opening {path}"))?;
            let meta = serde_json::from_reader(file).with_context(|| format!("parsing {path}"))?;
            Ok(meta)
        }
        Err(_) => {
            let nz = |n| NonZeroUsize::new(n).context("meta dimensions must be nonzero");
            Ok(ModelMeta::new(
                nz(DEFAULT_VOCAB)?,
                nz(DEFAULT_TOPICS)?,
                nz(16)?,
                nz(64)?,
            )
            .with_shards(nz(4)?))
        }
    }
}

fn env_usize(name: &str, default: usize) -> anyhow::Result<usize> {
    match env::var(name) {
        Ok(value) => value.parse().with_context(|| format!("parsing {name}={value}")),
        Err(_) => Ok(default),
    }
}

fn run_local(cfg: &WorkerConfig, meta: &ModelMeta, docs: &mut [corpus::Document]) -> WorkerMetrics {
    info!(workers = cfg.workers(); "running against the local model");
    let model = LocalModel::cold(meta);
    update::seed_corpus(&model, meta, docs);
    update::tally_topic_frequency(&model, meta);

    let models: Vec<&LocalModel> = (0..cfg.workers()).map(|_| &model).collect();
    let choosers = vec![LeastLoaded::new(meta.num_topics()); cfg.workers()];
    let metrics = run_sweeps(cfg, docs, models, choosers);

    report(&model, meta);
    metrics
}

fn run_ps(
    cfg: &WorkerConfig,
    meta: &ModelMeta,
    docs: &mut [corpus::Document],
) -> anyhow::Result<WorkerMetrics> {
    info!(workers = cfg.workers(), shards = meta.shards().get(); "running against the parameter server");
    let group = PsTableGroup::init(meta, None)?;

    let seeder = group.trainer();
    let seed_model = PsModel::new(&seeder);
    update::seed_corpus(&seed_model, meta, docs);
    update::tally_topic_frequency(&seed_model, meta);

    let trainers: Vec<Trainer> = (0..cfg.workers()).map(|_| group.trainer()).collect();
    let models: Vec<PsModel> = trainers.iter().map(PsModel::new).collect();
    let choosers = vec![LeastLoaded::new(meta.num_topics()); cfg.workers()];
    let metrics = run_sweeps(cfg, docs, models, choosers);

    report(&seed_model, meta);
    Ok(metrics)
}

/// Quiescent check: the summary row must equal the per-topic totals of
/// the word-topic table once every worker has joined.
fn report<M: ModelAccess>(model: &M, meta: &ModelMeta) {
    let mut derived = vec![0i64; meta.num_topics()];
    for word in 0..meta.vocab_size() {
        let row = model.word_topic_row(word);
        for (topic, total) in derived.iter_mut().enumerate() {
            *total += i64::from(row.get(topic));
        }
    }

    let summary = model.summary_row().to_vec();
    let assigned: i64 = summary.iter().sum();
    if summary == derived {
        info!(assigned = assigned; "summary invariant holds");
    } else {
        warn!("summary row drifted from word-topic totals");
    }
}
