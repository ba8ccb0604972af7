// ============================================================
// Layer 3 - VocabularyIndex
// ============================================================
// Assigns dense integer ids to word tokens in the order they
// are first seen:
//
//   add_word("the")  -> 0
//   add_word("cat")  -> 1
//   add_word("the")  -> 0   (already known, nothing changes)
//
// The mapping is append-only. Ids are never removed or
// renumbered, so ids handed out while loading the train split
// stay valid for the valid and test splits.
//
// Not synchronised: one loading session populates it from a
// single thread, then it is only read.

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Integer id of a token inside a [`VocabularyIndex`].
pub type TokenId = u32;

/// Bidirectional token <-> id mapping with first-seen ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct VocabularyIndex {
    /// Reverse lookup: `idx2word[id]` is the token for `id`
    idx2word: Vec<String>,
    /// Forward lookup
    word2idx: HashMap<String, TokenId>,
}

impl VocabularyIndex {
    /// Create an empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vocabulary from tokens listed in id order.
    ///
    /// Fails if the list contains the same token twice, since that
    /// would break the one-id-per-token invariant.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            let token = token.into();
            if vocab.word2idx.contains_key(&token) {
                bail!("duplicate token '{}' in vocabulary list", token);
            }
            vocab.add_word(token);
        }
        Ok(vocab)
    }

    /// Return the id of `token`, assigning the next free id if it
    /// has not been seen before.
    pub fn add_word(&mut self, token: impl Into<String> + AsRef<str>) -> TokenId {
        if let Some(&id) = self.word2idx.get(token.as_ref()) {
            return id;
        }
        let id = self.idx2word.len() as TokenId;
        let token: String = token.into();
        self.word2idx.insert(token.clone(), id);
        self.idx2word.push(token);
        id
    }

    /// Look up an id without touching the mapping
    pub fn id_of(&self, token: &str) -> Option<TokenId> {
        self.word2idx.get(token).copied()
    }

    /// Reverse lookup
    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.idx2word.get(id as usize).map(String::as_str)
    }

    /// Number of distinct tokens seen so far
    pub fn size(&self) -> usize {
        self.idx2word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx2word.is_empty()
    }

    /// All tokens, indexed by id
    pub fn tokens(&self) -> &[String] {
        &self.idx2word
    }
}

// Serialised form is just the id-ordered token list; the forward
// map is rebuilt on load and a repeated token is an error.
impl TryFrom<Vec<String>> for VocabularyIndex {
    type Error = anyhow::Error;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        Self::from_tokens(tokens)
    }
}

impl From<VocabularyIndex> for Vec<String> {
    fn from(vocab: VocabularyIndex) -> Self {
        vocab.idx2word
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_token_same_id() {
        let mut v = VocabularyIndex::new();
        let a = v.add_word("hello");
        let b = v.add_word("hello");
        assert_eq!(a, b);
        assert_eq!(v.size(), 1);
    }

    #[test]
    fn test_ids_are_contiguous_in_first_seen_order() {
        let mut v = VocabularyIndex::new();
        let ids: Vec<TokenId> = ["x", "y", "x", "z", "y", "w"]
            .iter()
            .map(|t| v.add_word(*t))
            .collect();
        assert_eq!(ids, vec![0, 1, 0, 2, 1, 3]);
        // size() counts distinct tokens only
        assert_eq!(v.size(), 4);
    }

    #[test]
    fn test_reverse_lookup_round_trip() {
        let words = ["the", "cat", "sat", "on", "the", "mat", "<eos>"];
        let mut v = VocabularyIndex::new();
        for w in words {
            v.add_word(w);
        }
        for id in 0..v.size() as TokenId {
            let token = v.token(id).unwrap();
            assert_eq!(v.id_of(token), Some(id));
        }
        assert_eq!(v.token(1), Some("cat"));
        assert_eq!(v.token(v.size() as TokenId), None);
    }

    #[test]
    fn test_id_of_does_not_insert() {
        let v = VocabularyIndex::new();
        assert_eq!(v.id_of("missing"), None);
        assert!(v.is_empty());
    }

    #[test]
    fn test_from_tokens_rejects_duplicates() {
        assert!(VocabularyIndex::from_tokens(["a", "b", "a"]).is_err());
        let v = VocabularyIndex::from_tokens(["a", "b"]).unwrap();
        assert_eq!(v.id_of("b"), Some(1));
    }

    #[test]
    fn test_serde_uses_token_list() {
        let v = VocabularyIndex::from_tokens(["a", "<eos>", "b"]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"["a","<eos>","b"]"#);
        let back: VocabularyIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let err = serde_json::from_str::<VocabularyIndex>(r#"["a","a"]"#).unwrap_err();
        assert!(err.to_string().contains("duplicate token 'a'"));
        // ids must not shift when a later token follows the repeat
        assert!(serde_json::from_str::<VocabularyIndex>(r#"["a","a","b"]"#).is_err());
    }
}
