// ============================================================
// Layer 4 - Corpus Loader
// ============================================================
// Reads one plain-text split file and turns it into token ids.
//
// Tokenisation rule (applied per line):
//   "the cat  sat"  ->  ["the", "cat", "sat", "<eos>"]
//   ""              ->  ["<eos>"]
//
// Whitespace splitting uses str::split_whitespace, i.e. any run of
// Unicode whitespace separates tokens and empty fields vanish.
//
// Two passes over the file:
//   Pass 1 - add every token to the shared VocabularyIndex and
//            count tokens
//   Pass 2 - re-read the file and write each token's id into a
//            buffer allocated with exactly that count
//
// Reading twice costs I/O but keeps the output buffer exact.
//
// File layout:
//   <dir>/<prefix>train.txt
//   <dir>/<prefix>valid.txt
//   <dir>/<prefix>test.txt

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

use crate::domain::{
    corpus::{Split, DEFAULT_EOS},
    sequence::TokenSequence,
    traits::CorpusSource,
    vocabulary::VocabularyIndex,
};

/// Loads `<dir>/<prefix><split>.txt` files.
/// Implements the CorpusSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    /// Directory holding the split files
    dir:    PathBuf,
    /// File name prefix, e.g. "ptb."
    prefix: String,
    /// Marker appended after every line
    eos:    String,
}

impl CorpusLoader {
    /// Create a loader with the default `<eos>` marker
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir:    dir.into(),
            prefix: prefix.into(),
            eos:    DEFAULT_EOS.to_string(),
        }
    }

    /// Use a different end-of-sequence marker
    pub fn with_eos(mut self, eos: impl Into<String>) -> Self {
        self.eos = eos.into();
        self
    }

    /// Full path of a split file
    pub fn split_path(&self, split: Split) -> PathBuf {
        self.dir.join(split.file_name(&self.prefix))
    }

    /// Tokenise the file at `path` into ids, growing `vocab`.
    pub fn tokenize_file(&self, path: &Path, vocab: &mut VocabularyIndex) -> Result<TokenSequence> {
        // Fail before any reading if the file is missing
        if !path.exists() {
            return Err(anyhow!(io::Error::new(
                io::ErrorKind::NotFound,
                format!("corpus file '{}' not found", path.display()),
            )));
        }

        // ── Pass 1: populate the vocabulary ──────────────────────────────────
        let mut token_count = 0usize;
        for line in open_lines(path)? {
            let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
            for token in tokenize_line(&line, &self.eos) {
                vocab.add_word(token);
                token_count += 1;
            }
        }

        // ── Pass 2: map tokens to ids ─────────────────────────────────────────
        let mut ids = Vec::with_capacity(token_count);
        for line in open_lines(path)? {
            let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
            for token in tokenize_line(&line, &self.eos) {
                let id = vocab.id_of(token).ok_or_else(|| {
                    anyhow!(
                        "token '{}' appeared in '{}' after the vocabulary pass",
                        token,
                        path.display()
                    )
                })?;
                ids.push(id);
            }
        }

        // The file changed between passes if the counts disagree
        if ids.len() != token_count {
            return Err(anyhow!(
                "'{}' yielded {} tokens on the first pass but {} on the second",
                path.display(),
                token_count,
                ids.len()
            ));
        }

        tracing::debug!(
            "Tokenised '{}': {} tokens, vocabulary now {}",
            path.display(),
            ids.len(),
            vocab.size()
        );
        Ok(TokenSequence::new(ids))
    }
}

impl CorpusSource for CorpusLoader {
    fn load_split(&self, split: Split, vocab: &mut VocabularyIndex) -> Result<TokenSequence> {
        let path = self.split_path(split);
        let seq = self
            .tokenize_file(&path, vocab)
            .with_context(|| format!("Loading {} split", split))?;
        tracing::info!("Loaded {} split: {} tokens", split, seq.len());
        Ok(seq)
    }
}

/// Split a line on whitespace and append the end-of-sequence marker.
pub fn tokenize_line<'a>(line: &'a str, eos: &'a str) -> impl Iterator<Item = &'a str> {
    line.split_whitespace().chain(std::iter::once(eos))
}

fn open_lines(path: &Path) -> Result<io::Lines<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    Ok(BufReader::new(file).lines())
}
