//! Word-chain rules.
//!
//! A submission is accepted when it is a known place, has not been
//! played yet this game, and (after the first move) starts with the
//! letter the previous word ended with. Checks run in that order and the
//! first failure wins.

use std::collections::HashSet;

use crate::{Dictionary, PlaceInfo};

/// Why a submission was rejected. The `Display` text is what the player
/// sees in the `ERROR` message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("Invalid place name!")]
    InvalidPlace,

    #[error("Place already used!")]
    AlreadyUsed,

    /// Carries the required letter, upper-cased.
    #[error("Must start with '{0}'!")]
    WrongLetter(String),
}

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWord {
    /// The dictionary entry that matched.
    pub place: PlaceInfo,
    /// Lower-cased form, as stored in the used-word set.
    pub key: String,
    /// The submission with surrounding whitespace removed.
    pub submitted: String,
}

/// The letter the next word must start with, lower-cased. `None` before
/// the first accepted word.
pub fn required_letter(last_word: &str) -> Option<char> {
    let last = last_word.chars().next_back()?;
    last.to_lowercase().next()
}

/// Whether `word` begins with `letter`, ignoring case.
///
/// Only the first char of each lower-cased form is compared, so a
/// capital that lower-cases to several chars (`'İ'` → `"i\u{307}"`)
/// still counts as its base letter.
pub fn starts_with_letter(word: &str, letter: char) -> bool {
    let first = word.chars().next().and_then(|c| c.to_lowercase().next());
    first.is_some() && first == letter.to_lowercase().next()
}

/// Applies the chain rules against a dictionary.
pub struct WordValidator<'a> {
    dictionary: &'a dyn Dictionary,
}

impl<'a> WordValidator<'a> {
    pub fn new(dictionary: &'a dyn Dictionary) -> Self {
        Self { dictionary }
    }

    /// Dictionary membership only.
    pub fn validate(&self, word: &str) -> Option<PlaceInfo> {
        self.dictionary.lookup(word.trim())
    }

    /// Runs every rule against `word`.
    pub fn check_submission(
        &self,
        word: &str,
        used: &HashSet<String>,
        last_word: &str,
    ) -> Result<AcceptedWord, RuleViolation> {
        let submitted = word.trim();
        let key = submitted.to_lowercase();

        let place = self.validate(submitted).ok_or(RuleViolation::InvalidPlace)?;

        if used.contains(&key) {
            return Err(RuleViolation::AlreadyUsed);
        }

        if let Some(letter) = required_letter(last_word) {
            if !starts_with_letter(submitted, letter) {
                return Err(RuleViolation::WrongLetter(letter.to_uppercase().collect()));
            }
        }

        Ok(AcceptedWord {
            place,
            key,
            submitted: submitted.to_string(),
        })
    }
}
