//! Server-driven player.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::rules::required_letter;
use crate::{Dictionary, PlaceInfo};

/// Letter a bot plays when it opens the game.
pub const OPENING_LETTER: char = 'a';

/// Picks a move for a bot from the shared dictionary.
#[derive(Clone)]
pub struct BotAgent {
    dictionary: Arc<dyn Dictionary>,
}

impl BotAgent {
    pub fn new(dictionary: Arc<dyn Dictionary>) -> Self {
        Self { dictionary }
    }

    /// An unused place starting with the letter `last_word` ends with,
    /// or `None` when the bot has nothing to say.
    pub fn get_move(&self, last_word: &str, used: &HashSet<String>) -> Option<PlaceInfo> {
        let letter = required_letter(last_word).unwrap_or(OPENING_LETTER);
        let choice = self.dictionary.find_unused_starting_with(letter, used);
        match &choice {
            Some(place) => debug!(%letter, word = %place.name, "bot found a word"),
            None => debug!(%letter, "bot has no word"),
        }
        choice
    }
}
