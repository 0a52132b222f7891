//! Turn order and rounds.

use geochain_protocol::PlayerId;

/// What [`TurnScheduler::remove`] did to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The player was not in the order.
    NotPresent,
    /// Someone other than the current player left; the current player
    /// keeps the turn.
    Other,
    /// The current player left; the index now points at their successor.
    Current,
    /// The order is now empty.
    Emptied,
}

/// The ordered seats at the table, whose turn it is, and the round count.
///
/// The scheduler knows nothing about lives. [`advance`](Self::advance)
/// takes a predicate so the room can say who is still in the game.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    order: Vec<PlayerId>,
    index: usize,
    round: u32,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            index: 0,
            round: 1,
        }
    }
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a player at the end of the order.
    pub fn push(&mut self, player_id: PlayerId) {
        self.order.push(player_id);
    }

    /// Unseats a player, keeping the index on the same person when
    /// someone else leaves.
    pub fn remove(&mut self, player_id: PlayerId) -> Removal {
        let Some(removed) = self.order.iter().position(|id| *id == player_id) else {
            return Removal::NotPresent;
        };
        self.order.remove(removed);

        if self.order.is_empty() {
            self.index = 0;
            return Removal::Emptied;
        }
        if self.index > removed {
            self.index -= 1;
            Removal::Other
        } else if self.index == removed {
            self.index %= self.order.len();
            Removal::Current
        } else {
            Removal::Other
        }
    }

    /// Back to the first seat, round 1.
    pub fn reset(&mut self) {
        self.index = 0;
        self.round = 1;
    }

    /// Whose turn it is, if anyone is seated.
    pub fn current(&self) -> Option<PlayerId> {
        self.order.get(self.index).copied()
    }

    /// Moves to the next seat whose player satisfies `is_alive`, wrapping
    /// around the table. Each wrap to the first seat starts a new round.
    ///
    /// Returns `None` when a full lap finds nobody; the index is then
    /// back where it started.
    pub fn advance(&mut self, is_alive: impl Fn(PlayerId) -> bool) -> Option<PlayerId> {
        let seats = self.order.len();
        for _ in 0..seats {
            self.index = (self.index + 1) % seats;
            if self.index == 0 {
                self.round += 1;
            }
            let candidate = self.order[self.index];
            if is_alive(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
