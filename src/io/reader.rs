/*! Parallel corpus reader

Reads two aligned line-oriented files in lock-step and yields [Batch]es of sentence pairs.

If one file is shorter than the other, iteration stops at the end of the shorter one:
the tail of the longer file is discarded and no error is raised.
!*/
use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
};

use log::warn;

use crate::error::Error;

/// Aligned source/target lines, `sources[i]` being translated by `targets[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

impl Batch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            sources: Vec::with_capacity(capacity),
            targets: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate on `(source, target)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources
            .iter()
            .zip(self.targets.iter())
            .map(|(s, t)| (s.as_str(), t.as_str()))
    }
}

/// Batched lock-step reader over two line streams.
///
/// Not restartable: build a new reader to read the files again.
#[derive(Debug)]
pub struct ParallelReader<R: BufRead = BufReader<File>> {
    sources: Lines<R>,
    targets: Lines<R>,
    batch_size: usize,
    exhausted: bool,
}

impl ParallelReader<BufReader<File>> {
    /// Open `source` and `target` files.
    pub fn from_paths(source: &Path, target: &Path, batch_size: usize) -> Result<Self, Error> {
        let sources = BufReader::new(File::open(source)?);
        let targets = BufReader::new(File::open(target)?);
        Self::new(sources, targets, batch_size)
    }
}

impl<R: BufRead> ParallelReader<R> {
    pub fn new(sources: R, targets: R, batch_size: usize) -> Result<Self, Error> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be positive".to_string()));
        }
        Ok(Self {
            sources: sources.lines(),
            targets: targets.lines(),
            batch_size,
            exhausted: false,
        })
    }

    /// Get the next aligned pair, `None` once either stream is over.
    ///
    /// [BufRead::lines] strips both `\n` and `\r\n` terminators.
    fn next_pair(&mut self) -> Option<Result<(String, String), Error>> {
        if self.exhausted {
            return None;
        }
        match (self.sources.next(), self.targets.next()) {
            (Some(Ok(s)), Some(Ok(t))) => Some(Ok((s, t))),
            (Some(Err(e)), _) | (_, Some(Err(e))) => {
                self.exhausted = true;
                Some(Err(Error::Io(e)))
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("source and target files have different line counts, discarding the longer file's tail");
                self.exhausted = true;
                None
            }
            (None, None) => {
                self.exhausted = true;
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for ParallelReader<R> {
    type Item = Result<Batch, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Batch::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.next_pair() {
                Some(Ok((s, t))) => {
                    batch.sources.push(s);
                    batch.targets.push(t);
                }
                Some(Err(e)) => return Some(Err(e)),
                None => break,
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use tempfile::tempdir;

    use super::*;

    fn lines(prefix: &str, nb: usize) -> Vec<String> {
        (0..nb).map(|i| format!("{} sentence {}", prefix, i)).collect()
    }

    fn cursor(lines: &[String]) -> Cursor<Vec<u8>> {
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        Cursor::new(content.into_bytes())
    }

    #[test]
    fn batches_roundtrip() {
        let sources = lines("english", 23);
        let targets = lines("deutsch", 23);
        let reader = ParallelReader::new(cursor(&sources), cursor(&targets), 5).unwrap();

        let batches: Vec<Batch> = reader.map(Result::unwrap).collect();
        assert_eq!(batches.len(), 5); // ceil(23/5)
        assert!(batches[..4].iter().all(|b| b.len() == 5));
        assert_eq!(batches[4].len(), 3);

        let read_sources: Vec<String> = batches.iter().flat_map(|b| b.sources.clone()).collect();
        let read_targets: Vec<String> = batches.iter().flat_map(|b| b.targets.clone()).collect();
        assert_eq!(read_sources, sources);
        assert_eq!(read_targets, targets);
    }

    #[test]
    fn exact_multiple() {
        let sources = lines("en", 10);
        let targets = lines("de", 10);
        let mut reader = ParallelReader::new(cursor(&sources), cursor(&targets), 5).unwrap();

        assert_eq!(reader.next().unwrap().unwrap().len(), 5);
        assert_eq!(reader.next().unwrap().unwrap().len(), 5);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test_log::test]
    fn truncates_to_shorter() {
        let sources = lines("en", 12);
        let targets = lines("de", 7);
        let reader = ParallelReader::new(cursor(&sources), cursor(&targets), 4).unwrap();

        let pairs: Vec<(String, String)> = reader
            .map(Result::unwrap)
            .flat_map(|b| b.sources.into_iter().zip(b.targets))
            .collect();
        assert_eq!(pairs.len(), 7);
        assert_eq!(pairs[6], ("en sentence 6".to_string(), "de sentence 6".to_string()));
    }

    #[test_log::test]
    fn truncates_to_shorter_source() {
        let sources = lines("en", 5);
        let targets = lines("de", 9);
        let reader = ParallelReader::new(cursor(&sources), cursor(&targets), 2).unwrap();

        let batches: Vec<Batch> = reader.map(Result::unwrap).collect();
        assert_eq!(batches.iter().map(Batch::len).collect::<Vec<_>>(), vec![2, 2, 1]);
        let last = batches.last().unwrap();
        assert_eq!(last.sources, vec!["en sentence 4".to_string()]);
        assert_eq!(last.targets, vec!["de sentence 4".to_string()]);
    }

    #[test]
    fn empty_files() {
        let reader = ParallelReader::new(cursor(&[]), cursor(&[]), 3).unwrap();
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn zero_batch_size() {
        assert!(ParallelReader::new(cursor(&[]), cursor(&[]), 0).is_err());
    }

    #[test]
    fn strips_crlf() {
        let sources = Cursor::new(b"hello\r\nworld".to_vec());
        let targets = Cursor::new(b"hallo\r\nwelt\r\n".to_vec());
        let mut reader = ParallelReader::new(sources, targets, 10).unwrap();

        let batch = reader.next().unwrap().unwrap();
        assert_eq!(
            batch.pairs().collect::<Vec<_>>(),
            vec![("hello", "hallo"), ("world", "welt")]
        );
    }

    #[test]
    fn from_paths() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("train.en-de.en");
        let tgt_path = dir.path().join("train.en-de.de");
        let mut src = File::create(&src_path).unwrap();
        let mut tgt = File::create(&tgt_path).unwrap();
        writeln!(src, "good morning\ngood night").unwrap();
        writeln!(tgt, "guten Morgen\ngute Nacht").unwrap();

        let reader = ParallelReader::from_paths(&src_path, &tgt_path, 1).unwrap();
        let batches: Vec<Batch> = reader.map(Result::unwrap).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].targets, vec!["gute Nacht".to_string()]);
    }
}
