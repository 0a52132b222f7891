//! The room state machine.
//!
//! [`RoomEngine`] owns one game's state and applies commands to it one at
//! a time. It performs no I/O: every method returns the [`Effect`]s the
//! caller must carry out (deliver a message, arm a bot timer, report
//! results). The room actor in [`crate::room`] is that caller.
//!
//! ```text
//! Waiting ──StartGame──▶ Playing ──elimination──▶ Ended
//!    ▲                      │                        │
//!    └──── everyone left ───┴──────── StartGame ─────┘ (restart)
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use geochain_protocol::{
    ClientMessage, GameMode, GameSnapshot, GameState, MoveRecord, PlayerId, PlayerKind, PlayerView,
    RoomId, ServerMessage,
};
use geochain_stats::GameResult;
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::rules::{AcceptedWord, WordValidator};
use crate::turn::Removal;
use crate::{BotAgent, Dictionary, RoomConfig, TurnScheduler, scoring};

// ---------------------------------------------------------------------------
// Commands and effects
// ---------------------------------------------------------------------------

/// A game command from a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartGame {
        mode: Option<String>,
        settings: BTreeMap<String, i64>,
    },
    AddBot,
    SubmitWord {
        word: String,
    },
    /// Raised by the room's own timer when a bot's turn delay runs out.
    /// Clients cannot send this.
    BotMove,
    GetStatus,
    Unrecognized(String),
}

impl Action {
    /// The room-level action for a client message. `JOIN_ROOM` is handled
    /// by the session, not a room, and maps to `None`.
    pub fn from_client(message: ClientMessage) -> Option<Self> {
        match message {
            ClientMessage::StartGame { mode, settings } => Some(Self::StartGame { mode, settings }),
            ClientMessage::AddBot => Some(Self::AddBot),
            ClientMessage::SubmitWord { word } => Some(Self::SubmitWord { word }),
            ClientMessage::GetStatus => Some(Self::GetStatus),
            ClientMessage::Unrecognized(kind) => Some(Self::Unrecognized(kind)),
            ClientMessage::JoinRoom { .. } => None,
        }
    }
}

/// Work the engine asks its owner to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver to every human in the room.
    Broadcast(ServerMessage),
    /// Deliver to one human.
    Send { to: PlayerId, message: ServerMessage },
    /// Raise [`Action::BotMove`] for `bot` after `delay`.
    ScheduleBot { bot: PlayerId, delay: Duration },
    /// Forget every pending bot timer.
    CancelBots,
    /// Hand finished-game results to the stats recorder.
    RecordResults(Vec<GameResult>),
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Participant {
    id: PlayerId,
    name: String,
    kind: PlayerKind,
    score: u32,
    lives: u32,
    is_turn: bool,
    most_used: BTreeMap<String, u32>,
}

impl Participant {
    fn new(id: PlayerId, name: String, kind: PlayerKind, lives: u32) -> Self {
        Self {
            id,
            name,
            kind,
            score: 0,
            lives,
            is_turn: false,
            most_used: BTreeMap::new(),
        }
    }

    fn is_alive(&self) -> bool {
        self.lives > 0
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            score: self.score,
            lives: self.lives,
            is_turn: self.is_turn,
            most_used_places: self.most_used.clone(),
        }
    }
}

fn bot_name() -> String {
    format!("Bot-{:04x}", rand::rng().random_range(0..=u16::MAX))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One room's game state and rules.
pub struct RoomEngine {
    room_id: RoomId,
    config: RoomConfig,
    dictionary: Arc<dyn Dictionary>,
    bot: BotAgent,
    players: HashMap<PlayerId, Participant>,
    turns: TurnScheduler,
    state: GameState,
    /// Lower-cased accepted words.
    used_words: HashSet<String>,
    last_word: String,
    history: Vec<MoveRecord>,
    mode: GameMode,
    settings: BTreeMap<String, i64>,
    turn_started: Instant,
    results_reported: bool,
    effects: Vec<Effect>,
}

impl RoomEngine {
    pub fn new(room_id: RoomId, config: RoomConfig, dictionary: Arc<dyn Dictionary>) -> Self {
        Self {
            room_id,
            config,
            bot: BotAgent::new(Arc::clone(&dictionary)),
            dictionary,
            players: HashMap::new(),
            turns: TurnScheduler::new(),
            state: GameState::Waiting,
            used_words: HashSet::new(),
            last_word: String::new(),
            history: Vec::new(),
            mode: GameMode::Classic,
            settings: BTreeMap::new(),
            turn_started: Instant::now(),
            results_reported: false,
            effects: Vec::new(),
        }
    }

    // -- Queries ----------------------------------------------------------

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn human_count(&self) -> usize {
        self.players.values().filter(|p| p.kind == PlayerKind::Human).count()
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.turns.current()
    }

    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    /// The full client-facing projection.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.iter().map(|(id, p)| (*id, p.view())).collect(),
            state: self.state,
            last_word: self.last_word.clone(),
            turn_order: self.turns.order().to_vec(),
            current_turn: self.turns.current(),
            history: self.history.clone(),
            round: self.turns.round(),
            mode: self.mode,
            settings: self.settings.clone(),
        }
    }

    // -- Membership -------------------------------------------------------

    /// Seats a human at the end of the turn order. The current turn is
    /// untouched, even mid-game.
    pub fn join(&mut self, player_id: PlayerId, name: impl Into<String>) -> Vec<Effect> {
        if self.contains(player_id) {
            debug!(room_id = %self.room_id, %player_id, "duplicate join ignored");
            return Vec::new();
        }
        let name = name.into();
        let lives = self.config.lives_for(self.mode);
        info!(room_id = %self.room_id, %player_id, %name, "player joined");
        self.players
            .insert(player_id, Participant::new(player_id, name, PlayerKind::Human, lives));
        self.turns.push(player_id);
        self.broadcast_state();
        self.take_effects()
    }

    /// Removes a participant and repairs the turn.
    pub fn leave(&mut self, player_id: PlayerId) -> Vec<Effect> {
        if self.players.remove(&player_id).is_none() {
            return Vec::new();
        }
        info!(room_id = %self.room_id, %player_id, remaining = self.players.len(), "player left");

        let removal = self.turns.remove(player_id);
        if removal == Removal::Emptied {
            self.state = GameState::Waiting;
        }

        if self.state == GameState::Playing {
            self.check_game_over();
        }

        if self.state == GameState::Playing && removal == Removal::Current {
            self.turn_started = Instant::now();
            let successor_alive = self
                .turns
                .current()
                .and_then(|id| self.players.get(&id))
                .is_some_and(Participant::is_alive);
            if successor_alive {
                self.set_turn_flag(true);
            } else {
                self.advance_turn();
            }
            self.schedule_bot_if_due(self.config.bot_turn_delay);
        }

        self.broadcast_state();
        self.take_effects()
    }

    // -- Commands ---------------------------------------------------------

    /// Applies one command from `player_id`.
    pub fn dispatch(&mut self, player_id: PlayerId, action: Action) -> Vec<Effect> {
        if !self.contains(player_id) {
            debug!(room_id = %self.room_id, %player_id, ?action, "command from non-member ignored");
            return Vec::new();
        }

        match action {
            Action::StartGame { mode, settings } => self.start_game(mode.as_deref(), settings),
            Action::AddBot => self.add_bot(),
            Action::SubmitWord { word } => self.submit_word(player_id, &word),
            Action::BotMove => self.bot_move(player_id),
            Action::GetStatus => {
                let snapshot = self.snapshot();
                self.effects.push(Effect::Send {
                    to: player_id,
                    message: ServerMessage::GameState(snapshot),
                });
            }
            Action::Unrecognized(kind) => {
                debug!(room_id = %self.room_id, %player_id, %kind, "unrecognized command ignored");
            }
        }
        self.take_effects()
    }

    fn start_game(&mut self, mode: Option<&str>, settings: BTreeMap<String, i64>) {
        if self.players.is_empty() {
            return;
        }

        self.mode = match mode.filter(|m| !m.trim().is_empty()) {
            None => GameMode::Classic,
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(room_id = %self.room_id, mode = %name, "unknown game mode, playing classic");
                GameMode::Classic
            }),
        };
        self.settings = settings;
        self.state = GameState::Playing;
        self.turns.reset();
        self.used_words.clear();
        self.last_word.clear();
        self.history.clear();
        self.turn_started = Instant::now();
        self.results_reported = false;

        let lives = self.config.lives_for(self.mode);
        for player in self.players.values_mut() {
            player.lives = lives;
            player.score = 0;
            player.is_turn = false;
        }
        self.set_turn_flag(true);

        info!(
            room_id = %self.room_id,
            mode = %self.mode,
            players = self.players.len(),
            "game started"
        );

        self.effects.push(Effect::CancelBots);
        self.broadcast_state();
        self.schedule_bot_if_due(self.config.bot_start_delay);
    }

    fn add_bot(&mut self) {
        let id = PlayerId::next();
        let name = bot_name();
        let lives = self.config.lives_for(self.mode);
        info!(room_id = %self.room_id, bot = %id, %name, "bot added");
        self.players.insert(id, Participant::new(id, name, PlayerKind::Bot, lives));
        self.turns.push(id);
        self.broadcast_state();
    }

    fn submit_word(&mut self, player_id: PlayerId, word: &str) {
        if !self.is_turn_of(player_id) {
            debug!(room_id = %self.room_id, %player_id, "submission out of turn ignored");
            return;
        }
        self.resolve_turn(player_id, word);
    }

    fn bot_move(&mut self, bot: PlayerId) {
        if !self.is_turn_of(bot) {
            debug!(room_id = %self.room_id, %bot, "stale bot move dropped");
            return;
        }
        match self.bot.get_move(&self.last_word, &self.used_words) {
            Some(place) => self.resolve_turn(bot, &place.name),
            None => self.reject(bot, None),
        }
    }

    fn is_turn_of(&self, player_id: PlayerId) -> bool {
        self.state == GameState::Playing && self.turns.current() == Some(player_id)
    }

    fn resolve_turn(&mut self, player_id: PlayerId, word: &str) {
        let verdict = WordValidator::new(self.dictionary.as_ref()).check_submission(
            word,
            &self.used_words,
            &self.last_word,
        );
        match verdict {
            Ok(accepted) => self.accept(player_id, accepted),
            Err(violation) => {
                debug!(room_id = %self.room_id, %player_id, %word, %violation, "submission rejected");
                self.reject(player_id, Some(violation.to_string()));
            }
        }
    }

    fn accept(&mut self, player_id: PlayerId, accepted: AcceptedWord) {
        let points = scoring::points_for(self.mode, &accepted.submitted, self.turn_started.elapsed());
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };

        player.is_turn = false;
        *player.most_used.entry(accepted.key.clone()).or_default() += 1;
        player.score += points;
        let record = MoveRecord {
            player_id,
            player_name: player.name.clone(),
            word: accepted.place.name.clone(),
            category: accepted.place.category,
            timestamp: unix_now(),
        };

        debug!(room_id = %self.room_id, %player_id, word = %record.word, points, "word accepted");
        self.used_words.insert(accepted.key);
        self.last_word = accepted.place.name;
        self.history.push(record);

        self.advance_turn();
        self.broadcast_state();
        self.schedule_bot_if_due(self.config.bot_turn_delay);
    }

    /// The failure path: a life lost, a private error for humans, and the
    /// turn moves on.
    fn reject(&mut self, player_id: PlayerId, message: Option<String>) {
        let mode = self.mode;
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        player.lives = match mode {
            GameMode::SuddenDeath => 0,
            GameMode::Classic | GameMode::PointRush => player.lives.saturating_sub(1),
        };
        let lives = player.lives;
        let is_human = player.kind == PlayerKind::Human;

        debug!(room_id = %self.room_id, %player_id, lives, "life lost");
        if let (Some(message), true) = (message, is_human) {
            self.effects.push(Effect::Send {
                to: player_id,
                message: ServerMessage::error(message),
            });
        }

        self.advance_turn();
        self.check_game_over();
        self.broadcast_state();
        self.schedule_bot_if_due(self.config.bot_turn_delay);
    }

    // -- Turn bookkeeping -------------------------------------------------

    fn set_turn_flag(&mut self, value: bool) {
        if let Some(player) = self.turns.current().and_then(|id| self.players.get_mut(&id)) {
            player.is_turn = value;
        }
    }

    /// Passes the turn to the next player with lives, or ends the game
    /// when there is none.
    fn advance_turn(&mut self) {
        self.set_turn_flag(false);
        self.turn_started = Instant::now();

        let players = &self.players;
        let next = self
            .turns
            .advance(|id| players.get(&id).is_some_and(Participant::is_alive));

        match next {
            Some(_) => self.set_turn_flag(true),
            None => {
                self.state = GameState::Ended;
                self.check_game_over();
            }
        }
    }

    /// Ends the game if elimination is reached. With two or more players
    /// the game ends once at most one has lives left, and that player (if
    /// any) wins. A solo player plays on until their last life is gone and
    /// then loses with no winner.
    fn check_game_over(&mut self) -> bool {
        let total = self.players.len();
        let alive: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.is_alive())
            .map(|p| p.id)
            .collect();

        let winner = match (total, alive.len()) {
            (0, _) => {
                self.state = GameState::Ended;
                return true;
            }
            (t, a) if t > 1 && a <= 1 => alive.first().copied(),
            (1, 0) => None,
            _ => return false,
        };

        self.state = GameState::Ended;
        if self.results_reported {
            return true;
        }
        self.results_reported = true;

        let winner_name = winner.and_then(|id| self.players.get(&id)).map(|p| p.name.clone());
        info!(room_id = %self.room_id, winner = ?winner_name, "game over");

        let results: Vec<GameResult> = self
            .players
            .values()
            .filter(|p| p.kind == PlayerKind::Human)
            .map(|p| GameResult::new(p.name.clone(), p.score, Some(p.id) == winner))
            .collect();
        if !results.is_empty() {
            self.effects.push(Effect::RecordResults(results));
        }
        true
    }

    fn schedule_bot_if_due(&mut self, delay: Duration) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(current) = self.turns.current() else {
            return;
        };
        if self.players.get(&current).is_some_and(|p| p.kind == PlayerKind::Bot) {
            self.effects.push(Effect::ScheduleBot { bot: current, delay });
        }
    }

    fn broadcast_state(&mut self) {
        let snapshot = self.snapshot();
        self.effects.push(Effect::Broadcast(ServerMessage::GameState(snapshot)));
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlaceDictionary, PlaceInfo};

    fn engine(words: &[(&str, &str)]) -> RoomEngine {
        let dict = PlaceDictionary::from_places(words.iter().map(|(n, c)| PlaceInfo::new(*n, *c)));
        RoomEngine::new(RoomId::new("test"), RoomConfig::default(), Arc::new(dict))
    }

    fn start(engine: &mut RoomEngine, by: PlayerId, mode: &str) -> Vec<Effect> {
        engine.dispatch(
            by,
            Action::StartGame {
                mode: Some(mode.into()),
                settings: BTreeMap::new(),
            },
        )
    }

    fn submit(engine: &mut RoomEngine, by: PlayerId, word: &str) -> Vec<Effect> {
        engine.dispatch(by, Action::SubmitWord { word: word.into() })
    }

    fn last_snapshot(effects: &[Effect]) -> GameSnapshot {
        effects
            .iter()
            .rev()
            .find_map(|e| match e {
                Effect::Broadcast(ServerMessage::GameState(s)) => Some(s.clone()),
                _ => None,
            })
            .expect("a GAME_STATE broadcast")
    }

    fn has_error(effects: &[Effect], to: PlayerId, text: &str) -> bool {
        effects.iter().any(|e| {
            matches!(e, Effect::Send { to: t, message: ServerMessage::Error { message } }
                if *t == to && message == text)
        })
    }

    #[test]
    fn test_action_from_client_excludes_join_room() {
        let msg = ClientMessage::JoinRoom {
            room_id: RoomId::new("x"),
        };
        assert_eq!(Action::from_client(msg), None);
        assert_eq!(Action::from_client(ClientMessage::AddBot), Some(Action::AddBot));
    }

    #[test]
    fn test_join_broadcasts_waiting_state() {
        let mut e = engine(&[]);
        let p = PlayerId::next();
        let effects = e.join(p, "alice");

        let snap = last_snapshot(&effects);
        assert_eq!(snap.state, GameState::Waiting);
        assert_eq!(snap.turn_order, vec![p]);
        assert_eq!(snap.players[&p].lives, 3);
        assert_eq!(snap.round, 1);
    }

    #[test]
    fn test_start_with_no_players_is_impossible_from_outside() {
        let mut e = engine(&[]);
        let stranger = PlayerId::next();
        assert!(start(&mut e, stranger, "CLASSIC").is_empty());
        assert_eq!(e.state(), GameState::Waiting);
    }

    #[test]
    fn test_start_game_marks_first_player() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "a");
        e.join(b, "b");

        let effects = start(&mut e, b, "");
        let snap = last_snapshot(&effects);

        assert_eq!(snap.state, GameState::Playing);
        assert_eq!(snap.mode, GameMode::Classic);
        assert_eq!(snap.current_turn, Some(a));
        assert!(snap.players[&a].is_turn);
        assert!(!snap.players[&b].is_turn);
        assert!(effects.contains(&Effect::CancelBots));
    }

    #[test]
    fn test_unknown_mode_plays_classic() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        start(&mut e, a, "BLITZ");
        assert_eq!(e.mode(), GameMode::Classic);
        assert_eq!(e.state(), GameState::Playing);
    }

    #[test]
    fn test_out_of_turn_submission_ignored() {
        let mut e = engine(&[("India", "Country")]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "a");
        e.join(b, "b");
        start(&mut e, a, "CLASSIC");

        assert!(submit(&mut e, b, "India").is_empty());
        assert!(e.used_words().is_empty());
    }

    #[test]
    fn test_submission_before_start_ignored() {
        let mut e = engine(&[("India", "Country")]);
        let a = PlayerId::next();
        e.join(a, "a");
        assert!(submit(&mut e, a, "India").is_empty());
    }

    #[test]
    fn test_accept_records_move_and_passes_turn() {
        let mut e = engine(&[("India", "Country")]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "alice");
        e.join(b, "bob");
        start(&mut e, a, "CLASSIC");

        let snap = last_snapshot(&submit(&mut e, a, " india "));

        assert_eq!(snap.last_word, "India");
        assert_eq!(snap.current_turn, Some(b));
        assert_eq!(snap.players[&a].score, 10);
        assert_eq!(snap.players[&a].most_used_places["india"], 1);
        assert_eq!(snap.history.len(), 1);
        assert_eq!(snap.history[0].player_name, "alice");
        assert_eq!(snap.history[0].category, "Country");
        assert!(e.used_words().contains("india"));
    }

    #[test]
    fn test_wrong_letter_costs_life_and_sends_private_error() {
        let mut e = engine(&[("India", "Country"), ("Mali", "Country")]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "a");
        e.join(b, "b");
        start(&mut e, a, "CLASSIC");
        submit(&mut e, a, "India");

        let effects = submit(&mut e, b, "Mali");

        assert!(has_error(&effects, b, "Must start with 'A'!"));
        assert!(!has_error(&effects, a, "Must start with 'A'!"));
        let snap = last_snapshot(&effects);
        assert_eq!(snap.players[&b].lives, 2);
        assert_eq!(snap.current_turn, Some(a));
        assert_eq!(snap.round, 2);
    }

    #[test]
    fn test_sudden_death_failure_zeroes_lives() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        let c = PlayerId::next();
        e.join(a, "a");
        e.join(b, "b");
        e.join(c, "c");
        start(&mut e, a, "SUDDEN_DEATH");

        let snap = last_snapshot(&submit(&mut e, a, "Nowhere"));
        assert_eq!(snap.players[&a].lives, 0);
        assert_eq!(snap.state, GameState::Playing);
        assert_eq!(snap.current_turn, Some(b));
    }

    #[test]
    fn test_advance_skips_eliminated_player() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        let c = PlayerId::next();
        e.join(a, "a");
        e.join(b, "b");
        e.join(c, "c");
        start(&mut e, a, "SUDDEN_DEATH");

        submit(&mut e, a, "x"); // a out, b's turn
        let snap = last_snapshot(&submit(&mut e, b, "x")); // b out, c alone

        assert_eq!(snap.state, GameState::Ended);
        assert_eq!(snap.players[&c].lives, 1);
    }

    #[test]
    fn test_results_reported_once_with_winner() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "alice");
        e.join(b, "bob");
        start(&mut e, a, "SUDDEN_DEATH");

        let effects = submit(&mut e, a, "x");
        let reports: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::RecordResults(r) => Some(r.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(reports.len(), 1);
        let results = &reports[0];
        assert!(results.contains(&GameResult::new("bob", 0, true)));
        assert!(results.contains(&GameResult::new("alice", 0, false)));
        assert_eq!(e.state(), GameState::Ended);
    }

    #[test]
    fn test_bots_are_not_reported() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "alice");
        e.dispatch(a, Action::AddBot);
        start(&mut e, a, "SUDDEN_DEATH");

        let effects = submit(&mut e, a, "x");
        let results = effects.iter().find_map(|e| match e {
            Effect::RecordResults(r) => Some(r.clone()),
            _ => None,
        });
        assert_eq!(results, Some(vec![GameResult::new("alice", 0, false)]));
    }

    #[test]
    fn test_add_bot_gets_generated_name() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        let snap = last_snapshot(&e.dispatch(a, Action::AddBot));

        let bot = snap.turn_order[1];
        let view = &snap.players[&bot];
        assert_eq!(view.kind, PlayerKind::Bot);
        assert!(view.name.starts_with("Bot-"));
        assert_eq!(view.name.len(), 8);
        assert_eq!(e.human_count(), 1);
        assert_eq!(e.player_count(), 2);
    }

    #[test]
    fn test_bot_in_first_seat_is_scheduled_with_start_delay() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "a");
        e.dispatch(a, Action::AddBot);
        e.join(b, "b");
        e.leave(a);
        let bot = e.snapshot().turn_order[0];

        let effects = start(&mut e, b, "CLASSIC");
        assert!(effects.contains(&Effect::ScheduleBot {
            bot,
            delay: Duration::from_secs(1)
        }));
    }

    #[test]
    fn test_human_in_first_seat_schedules_nothing() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        e.dispatch(a, Action::AddBot);

        let effects = start(&mut e, a, "CLASSIC");
        assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleBot { .. })));
    }

    #[test]
    fn test_stale_bot_move_is_noop() {
        let mut e = engine(&[("Angola", "Country")]);
        let a = PlayerId::next();
        e.join(a, "a");
        e.dispatch(a, Action::AddBot);
        start(&mut e, a, "CLASSIC");
        let bot = e.snapshot().turn_order[1];

        assert!(e.dispatch(bot, Action::BotMove).is_empty());
    }

    #[test]
    fn test_get_status_is_private() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        let effects = e.dispatch(a, Action::GetStatus);

        assert_eq!(effects.len(), 1);
        assert!(matches!(&effects[0], Effect::Send { to, message: ServerMessage::GameState(_) } if *to == a));
    }

    #[test]
    fn test_unrecognized_is_noop() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        assert!(e.dispatch(a, Action::Unrecognized("DANCE".into())).is_empty());
    }

    #[test]
    fn test_mid_game_joiner_waits_for_their_turn() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        let b = PlayerId::next();
        e.join(a, "a");
        start(&mut e, a, "SUDDEN_DEATH");

        let snap = last_snapshot(&e.join(b, "b"));
        assert_eq!(snap.current_turn, Some(a));
        assert_eq!(snap.players[&b].lives, 1);
        assert!(!snap.players[&b].is_turn);
    }

    #[test]
    fn test_last_player_leaving_resets_to_waiting() {
        let mut e = engine(&[]);
        let a = PlayerId::next();
        e.join(a, "a");
        start(&mut e, a, "CLASSIC");

        let snap = last_snapshot(&e.leave(a));
        assert_eq!(snap.state, GameState::Waiting);
        assert_eq!(snap.current_turn, None);
    }

    #[test]
    fn test_leave_unknown_player_is_noop() {
        let mut e = engine(&[]);
        assert!(e.leave(PlayerId::next()).is_empty());
    }
}
