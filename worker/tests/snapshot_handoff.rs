//! A trained local model dumped to a snapshot must warm-start either
//! backend into the exact same state.

use std::{io::Cursor, num::NonZeroUsize};

use model::{
    LocalModel, ModelAccess, ModelMeta, PsModel, PsTableGroup, SnapshotSource, SnapshotWriter,
};
use rand::{SeedableRng, rngs::StdRng};
use worker::{corpus, update};

fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn snapshot_round_trips_through_both_backends() {
    let meta = ModelMeta::new(nz(25), nz(4), nz(8), nz(32)).with_shards(nz(2));

    // Produce a nontrivial model state.
    let mut rng = StdRng::seed_from_u64(99);
    let docs = corpus::synthetic(&meta, 40, 8, &mut rng);
    let source_model = LocalModel::cold(&meta);
    update::seed_corpus(&source_model, &meta, &docs);

    // Dump it row by row.
    let mut writer = SnapshotWriter::new(Vec::new(), meta.num_topics()).unwrap();
    for word in 0..meta.vocab_size() {
        writer.write_row(word, source_model.word_topic_row(word)).unwrap();
    }
    let bytes = writer.finish().unwrap();

    // Warm-start the local backend.
    let local = LocalModel::warm(&meta, Cursor::new(&bytes)).unwrap();

    // Warm-start the parameter-server backend from the same bytes.
    let mut source = SnapshotSource::new(Cursor::new(&bytes)).unwrap();
    let group = PsTableGroup::init(&meta, Some(&mut source)).unwrap();
    let trainer = group.trainer();
    let ps = PsModel::new(&trainer);

    for word in 0..meta.vocab_size() {
        let expected = source_model.word_topic_row(word).to_vec();
        assert_eq!(local.word_topic_row(word).to_vec(), expected, "word {word}");
        assert_eq!(ps.word_topic_row(word).to_vec(), expected, "word {word}");
    }
    assert_eq!(local.summary_row().to_vec(), source_model.summary_row().to_vec());
    assert_eq!(ps.summary_row().to_vec(), source_model.summary_row().to_vec());
}

#[test]
fn warm_start_scenario_single_word() {
    let meta = ModelMeta::new(nz(8), nz(2), nz(4), nz(8));

    let mut writer = SnapshotWriter::new(Vec::new(), 2).unwrap();
    writer.write_entries(5, &[(1, 7)]).unwrap();
    let bytes = writer.finish().unwrap();

    let local = LocalModel::warm(&meta, Cursor::new(bytes)).unwrap();
    assert_eq!(local.word_topic_row(5).get(1), 7);
    assert_eq!(local.summary_row().to_vec(), [0, 7]);
}
