//! Serialized model snapshots for warm starts.
//!
//! A word-topic snapshot is a flat header followed by sparse per-word
//! records, iterated once, sequentially, key by key. The summary row has
//! its own dense format for deployments that persist it independently.
//! Scalars and count arrays are host-order, cast in and out with bytemuck
//! like the rest of the pipeline's dumps.

use std::io::{self, Read, Write};

use counttable::{LoadRow, Row, RowSource};

use crate::{ModelErr, Result};

const WORD_TOPIC_MAGIC: u32 = u32::from_le_bytes(*b"WTCS");
const SUMMARY_MAGIC: u32 = u32::from_le_bytes(*b"SMRY");
const VERSION: u32 = 1;

/// One decoded snapshot record: a word id plus its nonzero
/// `(topic, count)` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTopicRecord {
    pub word_id: usize,
    pub entries: Vec<(usize, i32)>,
}

/// Streaming reader over a word-topic snapshot.
#[derive(Debug)]
pub struct SnapshotReader<R: Read> {
    inner: R,
    num_topics: usize,
}

impl<R: Read> SnapshotReader<R> {
    /// Validates the header and positions the reader at the first record.
    pub fn new(mut inner: R) -> Result<Self> {
        let num_topics = read_header(&mut inner, WORD_TOPIC_MAGIC)?;
        Ok(Self { inner, num_topics })
    }

    /// Topic count the snapshot was produced with.
    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Decodes the next record, or `None` at a clean end of stream.
    ///
    /// # Errors
    /// A record truncated mid-way is an I/O error; a record naming a topic
    /// outside the snapshot's own topic count is a format error.
    pub fn next_record(&mut self) -> Result<Option<WordTopicRecord>> {
        let Some(word_id) = read_u32_or_eof(&mut self.inner)? else {
            return Ok(None);
        };
        let word_id = word_id as usize;

        let nnz = read_u32(&mut self.inner)? as usize;
        let mut raw = vec![0u32; nnz * 2];
        self.inner.read_exact(bytemuck::cast_slice_mut(&mut raw))?;

        let mut entries = Vec::with_capacity(nnz);
        for pair in raw.chunks_exact(2) {
            let topic = pair[0] as usize;
            if topic >= self.num_topics {
                return Err(ModelErr::SnapshotColumnOutOfRange {
                    key: word_id,
                    column: topic,
                    bound: self.num_topics,
                });
            }
            entries.push((topic, pair[1] as i32));
        }

        Ok(Some(WordTopicRecord { word_id, entries }))
    }
}

/// Sequential writer producing the word-topic snapshot format.
pub struct SnapshotWriter<W: Write> {
    inner: W,
    num_topics: usize,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(mut inner: W, num_topics: usize) -> io::Result<Self> {
        let header = [WORD_TOPIC_MAGIC, VERSION, num_topics as u32];
        inner.write_all(bytemuck::cast_slice(&header))?;
        Ok(Self { inner, num_topics })
    }

    /// Appends one sparse record.
    pub fn write_entries(&mut self, word_id: usize, entries: &[(usize, i32)]) -> io::Result<()> {
        let mut raw = Vec::with_capacity(2 + entries.len() * 2);
        raw.push(word_id as u32);
        raw.push(entries.len() as u32);
        for &(topic, count) in entries {
            debug_assert!(topic < self.num_topics);
            raw.push(topic as u32);
            raw.push(count as u32);
        }
        self.inner.write_all(bytemuck::cast_slice(&raw))
    }

    /// Appends one row, sparse-encoding its nonzero counters.
    pub fn write_row(&mut self, word_id: usize, row: &Row<i32>) -> io::Result<()> {
        let entries: Vec<_> = row
            .iter()
            .enumerate()
            .filter(|&(_, count)| count != 0)
            .collect();
        self.write_entries(word_id, &entries)
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes the summary row as an independent dense snapshot.
pub fn write_summary<W: Write>(mut inner: W, counts: &[i64]) -> io::Result<()> {
    let header = [SUMMARY_MAGIC, VERSION, counts.len() as u32];
    inner.write_all(bytemuck::cast_slice(&header))?;
    inner.write_all(bytemuck::cast_slice(counts))?;
    inner.flush()
}

/// Reads an independent summary snapshot back.
pub fn read_summary<R: Read>(mut inner: R) -> Result<Vec<i64>> {
    let num_topics = read_header(&mut inner, SUMMARY_MAGIC)?;
    let mut counts = vec![0i64; num_topics];
    inner.read_exact(bytemuck::cast_slice_mut(&mut counts))?;
    Ok(counts)
}

/// Adapter exposing a word-topic snapshot as a streaming bulk-load source
/// for the distributed table service.
pub struct SnapshotSource<R: Read> {
    reader: SnapshotReader<R>,
}

impl<R: Read> SnapshotSource<R> {
    pub fn new(inner: R) -> Result<Self> {
        Ok(Self {
            reader: SnapshotReader::new(inner)?,
        })
    }

    pub fn num_topics(&self) -> usize {
        self.reader.num_topics()
    }
}

impl<R: Read> RowSource for SnapshotSource<R> {
    fn next_row(&mut self) -> io::Result<Option<LoadRow>> {
        let record = self.reader.next_record().map_err(io::Error::from)?;
        Ok(record.map(|r| LoadRow {
            key: r.word_id,
            entries: r
                .entries
                .into_iter()
                .map(|(topic, count)| (topic, i64::from(count)))
                .collect(),
        }))
    }
}

fn read_header<R: Read>(inner: &mut R, magic: u32) -> Result<usize> {
    let mut header = [0u32; 3];
    inner.read_exact(bytemuck::cast_slice_mut(&mut header))?;

    if header[0] != magic {
        return Err(ModelErr::BadMagic {
            found: header[0],
            expected: magic,
        });
    }
    if header[1] != VERSION {
        return Err(ModelErr::BadVersion { found: header[1] });
    }

    Ok(header[2] as usize)
}

fn read_u32<R: Read>(inner: &mut R) -> io::Result<u32> {
    let mut value = [0u32; 1];
    inner.read_exact(bytemuck::cast_slice_mut(&mut value))?;
    Ok(value[0])
}

/// Reads one u32, distinguishing a clean end of stream from a truncated
/// record.
fn read_u32_or_eof<R: Read>(inner: &mut R) -> io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;

    while filled < buf.len() {
        let n = inner.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        filled += n;
    }

    Ok(Some(u32::from_ne_bytes(buf)))
}
