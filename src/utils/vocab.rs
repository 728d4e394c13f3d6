//! Token vocabulary used to turn decoder ids back into InChI text.
//!
//! The vocabulary is stored as JSON, either `{"stoi": {"C": 0, ...}}` or a flat
//! `{"C": 0, ...}` map. Ids must be dense (`0..len`) and the three special
//! tokens `<sos>`, `<eos>` and `<pad>` must be present.

use crate::core::constants::{EOS_TOKEN, PAD_TOKEN, SOS_TOKEN};
use crate::core::errors::{InchiError, InchiResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum VocabularyFile {
    Wrapped { stoi: HashMap<String, usize> },
    Flat(HashMap<String, usize>),
}

/// Bidirectional token/id mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    stoi: HashMap<String, usize>,
    itos: Vec<String>,
    sos_id: usize,
    eos_id: usize,
    pad_id: usize,
}

impl Vocabulary {
    /// Builds a vocabulary from a token-to-id map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when ids are not dense, are duplicated, or a
    /// special token is missing.
    pub fn from_stoi(stoi: HashMap<String, usize>) -> InchiResult<Self> {
        let mut itos: Vec<Option<String>> = vec![None; stoi.len()];
        for (token, &id) in &stoi {
            let slot = itos.get_mut(id).ok_or_else(|| {
                InchiError::invalid_input(format!(
                    "token '{token}' has id {id}, outside 0..{}",
                    stoi.len()
                ))
            })?;
            if let Some(existing) = slot {
                return Err(InchiError::invalid_input(format!(
                    "tokens '{existing}' and '{token}' share id {id}"
                )));
            }
            *slot = Some(token.clone());
        }
        // Dense ids and no duplicates means every slot is filled.
        let itos: Vec<String> = itos.into_iter().flatten().collect();

        let special = |token: &str| {
            stoi.get(token).copied().ok_or_else(|| {
                InchiError::invalid_input(format!("vocabulary is missing special token {token}"))
            })
        };
        let sos_id = special(SOS_TOKEN)?;
        let eos_id = special(EOS_TOKEN)?;
        let pad_id = special(PAD_TOKEN)?;

        Ok(Self {
            stoi,
            itos,
            sos_id,
            eos_id,
            pad_id,
        })
    }

    /// Parses a vocabulary from its JSON representation.
    pub fn from_json_str(json: &str) -> InchiResult<Self> {
        let stoi = match serde_json::from_str::<VocabularyFile>(json)? {
            VocabularyFile::Wrapped { stoi } => stoi,
            VocabularyFile::Flat(stoi) => stoi,
        };
        Self::from_stoi(stoi)
    }

    /// Reads a vocabulary JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> InchiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            InchiError::invalid_input(format!(
                "Failed to read vocabulary from '{}': {e}",
                path.display()
            ))
        })?;
        let vocab = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), tokens = vocab.len(), "loaded vocabulary");
        Ok(vocab)
    }

    /// Number of tokens, including the special ones.
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// Whether the vocabulary has no tokens. Never true for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    /// Token text for an id.
    pub fn token(&self, id: usize) -> Option<&str> {
        self.itos.get(id).map(String::as_str)
    }

    /// Id for a token.
    pub fn id(&self, token: &str) -> Option<usize> {
        self.stoi.get(token).copied()
    }

    pub fn sos_id(&self) -> usize {
        self.sos_id
    }

    pub fn eos_id(&self) -> usize {
        self.eos_id
    }

    pub fn pad_id(&self) -> usize {
        self.pad_id
    }

    /// Concatenates token texts up to (not including) the first `<eos>` or
    /// `<pad>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an id outside the vocabulary.
    pub fn predict_caption(&self, sequence: &[usize]) -> InchiResult<String> {
        let mut caption = String::new();
        for &id in sequence {
            if id == self.eos_id || id == self.pad_id {
                break;
            }
            let token = self.token(id).ok_or_else(|| {
                InchiError::invalid_input(format!(
                    "token id {id} is outside the vocabulary of {} tokens",
                    self.len()
                ))
            })?;
            caption.push_str(token);
        }
        Ok(caption)
    }

    /// Applies [`Self::predict_caption`] to every sequence of a batch.
    pub fn predict_captions(&self, sequences: &[Vec<usize>]) -> InchiResult<Vec<String>> {
        sequences
            .iter()
            .map(|sequence| self.predict_caption(sequence))
            .collect()
    }
}
