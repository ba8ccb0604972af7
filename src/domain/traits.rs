// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits rather
// than against the concrete text-file loader, so another corpus
// layout (one directory per split, a compressed archive, ...)
// only needs a new implementation.

use anyhow::Result;

use crate::domain::{
    corpus::{Corpus, Split},
    sequence::TokenSequence,
    vocabulary::VocabularyIndex,
};

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Anything that can turn a split into token ids.
///
/// Implementations:
///   - CorpusLoader -> `<dir>/<prefix><split>.txt` plain text files
pub trait CorpusSource {
    /// Tokenise one split, adding any new words to `vocab`.
    fn load_split(&self, split: Split, vocab: &mut VocabularyIndex) -> Result<TokenSequence>;

    /// Load train, valid and test in that order with one shared
    /// vocabulary.
    fn load_corpus(&self) -> Result<Corpus> {
        let mut vocab = VocabularyIndex::new();
        let train = self.load_split(Split::Train, &mut vocab)?;
        let valid = self.load_split(Split::Valid, &mut vocab)?;
        let test  = self.load_split(Split::Test, &mut vocab)?;
        Ok(Corpus { vocab, train, valid, test })
    }
}
