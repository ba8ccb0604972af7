// ============================================================
// Layer 3 - Corpus Domain Types
// ============================================================
// A corpus is three token sequences (train / valid / test) that
// share ONE vocabulary, so an id means the same word in every
// split. The loader in Layer 4 builds it; the application layer
// owns it and hands it out read-only.

use std::fmt;

use crate::domain::{sequence::TokenSequence, vocabulary::VocabularyIndex};

/// Default end-of-sequence marker appended after every line
pub const DEFAULT_EOS: &str = "<eos>";

/// One of the three corpus files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    /// Load order. Train goes first so its words get the lowest ids.
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test  => "test",
        }
    }

    /// File name for this split, e.g. `ptb.` + `train` + `.txt`
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}{}.txt", prefix, self.as_str())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything produced by one loading session.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub vocab: VocabularyIndex,
    pub train: TokenSequence,
    pub valid: TokenSequence,
    pub test:  TokenSequence,
}

impl Corpus {
    pub fn split(&self, split: Split) -> &TokenSequence {
        match split {
            Split::Train => &self.train,
            Split::Valid => &self.valid,
            Split::Test  => &self.test,
        }
    }

    /// Output dimension of the model
    pub fn ntokens(&self) -> usize {
        self.vocab.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file_names() {
        assert_eq!(Split::Train.file_name("ptb."), "ptb.train.txt");
        assert_eq!(Split::Valid.file_name(""), "valid.txt");
        assert_eq!(Split::Test.to_string(), "test");
    }

    #[test]
    fn test_corpus_split_accessor() {
        let corpus = Corpus {
            vocab: VocabularyIndex::from_tokens(["a", "b"]).unwrap(),
            train: TokenSequence::new(vec![0, 1]),
            valid: TokenSequence::new(vec![1]),
            test:  TokenSequence::new(vec![]),
        };
        assert_eq!(corpus.split(Split::Valid).ids(), &[1]);
        assert!(corpus.split(Split::Test).is_empty());
        assert_eq!(corpus.ntokens(), 2);
    }
}
