// ============================================================
// Layer 6 - Vocabulary Store
// ============================================================
// Persists the VocabularyIndex built during training as a JSON
// list of tokens in id order:
//
//   ["the", "cat", "<eos>", ...]      → id 0, 1, 2, ...
//
// `evaluate` reloads the corpus and compares the fresh vocabulary
// with this file, so a changed corpus is caught before weights of
// the wrong output size are loaded.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::vocabulary::VocabularyIndex;

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("vocab.json")
    }

    pub fn save(&self, vocab: &VocabularyIndex) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        fs::write(&path, serde_json::to_string(vocab)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;
        tracing::info!("Vocabulary of {} tokens saved to '{}'", vocab.size(), path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<VocabularyIndex> {
        let path = self.path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
        let tokens: Vec<String> = serde_json::from_str(&json)
            .with_context(|| format!("Invalid vocabulary file '{}'", path.display()))?;
        VocabularyIndex::from_tokens(tokens)
    }

    /// Fail unless `fresh` assigns exactly the saved ids.
    pub fn verify(&self, fresh: &VocabularyIndex) -> Result<()> {
        let saved = self.load()?;
        if saved.size() != fresh.size() {
            bail!(
                "vocabulary size changed: checkpoint has {} tokens, corpus now has {}",
                saved.size(),
                fresh.size()
            );
        }
        if let Some((id, (a, b))) = saved
            .tokens()
            .iter()
            .zip(fresh.tokens())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            bail!("vocabulary mismatch at id {}: saved '{}', corpus '{}'", id, a, b);
        }
        Ok(())
    }
}
