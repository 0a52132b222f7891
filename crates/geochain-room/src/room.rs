//! Room actor: an isolated Tokio task that owns one [`RoomEngine`].
//!
//! Every command for a room, from any connection, goes through one
//! bounded channel into one task. Bot turns come from a delay queue the
//! same task owns, so a bot's move and a human's submission can never
//! interleave. Nothing outside the task touches room state; callers get
//! snapshots back.
//!
//! A room stops itself once the last human is gone, whether they left or
//! were dropped. Commands still queued behind that point fail with
//! [`RoomError::Unavailable`].

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use geochain_protocol::{GameSnapshot, GameState, PlayerId, RoomId, ServerMessage};
use geochain_stats::{GameResult, StatsRecorder};
use geochain_timer::{DelayConfig, DelayQueue};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{Action, Dictionary, Effect, RoomConfig, RoomEngine, RoomError};

/// Channel sender for delivering outbound messages to one connection.
///
/// Always bounded: the room uses `try_send`, and a full buffer means the
/// connection is too slow and gets dropped from the room.
pub type PlayerSender = mpsc::Sender<ServerMessage>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<RoomInfo, RoomError>>,
    },
    /// Fire-and-forget game command.
    Action { player_id: PlayerId, action: Action },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}

/// Room metadata (not the game state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: GameState,
    /// Humans and bots.
    pub player_count: usize,
    pub human_count: usize,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Whether the actor task has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Whether both handles talk to the same actor. A room id can outlive
    /// its actor and be reused by a new one.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Seats a human. Everything the room says to them afterwards arrives
    /// on `sender`, starting with a `GAME_STATE`.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            player_id,
            name,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a player and reports what the room looks like afterwards.
    pub async fn leave(&self, player_id: PlayerId) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    /// Leaves and reports whether the room stopped because no humans are
    /// left. A player the room already dropped for backpressure is gone
    /// either way.
    pub async fn vacate(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        match self.leave(player_id).await {
            Ok(info) => Ok(info.human_count == 0),
            Err(RoomError::NotInRoom(..)) => Ok(false),
            Err(RoomError::Unavailable(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Queues a game command.
    pub async fn send_action(&self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { player_id, action })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// The current `GAME_STATE` payload.
    pub async fn snapshot(&self) -> Result<GameSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Tells the room to stop. Pending bot timers are dropped with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The actor state. Runs inside its own Tokio task.
struct RoomActor {
    room_id: RoomId,
    engine: RoomEngine,
    /// Outbound channels, humans only.
    senders: HashMap<PlayerId, PlayerSender>,
    timers: DelayQueue<PlayerId>,
    stats: Arc<dyn StatsRecorder>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Set by the first successful join.
    seated: bool,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room_id = %self.room_id, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                bot = self.timers.next_due() => {
                    let effects = self.engine.dispatch(bot, Action::BotMove);
                    self.apply(effects);
                }
            }

            if self.seated && self.engine.human_count() == 0 {
                debug!(room_id = %self.room_id, bots = self.engine.player_count(), "no humans left");
                break;
            }
        }

        let dropped = self.timers.clear();
        info!(
            room_id = %self.room_id,
            dropped_timers = dropped,
            bot_moves = self.timers.metrics().total_fired,
            "room actor stopped"
        );
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                sender,
                reply,
            } => {
                if self.engine.contains(player_id) {
                    let _ = reply.send(Err(RoomError::AlreadyInRoom(player_id, self.room_id.clone())));
                    return;
                }
                self.senders.insert(player_id, sender);
                self.seated = true;
                let effects = self.engine.join(player_id, name);
                self.apply(effects);
                let _ = reply.send(Ok(()));
            }
            RoomCommand::Leave { player_id, reply } => {
                if !self.engine.contains(player_id) {
                    let _ = reply.send(Err(RoomError::NotInRoom(player_id, self.room_id.clone())));
                    return;
                }
                self.senders.remove(&player_id);
                let effects = self.engine.leave(player_id);
                self.apply(effects);
                let _ = reply.send(Ok(self.info()));
            }
            RoomCommand::Action { player_id, action } => {
                let effects = self.engine.dispatch(player_id, action);
                self.apply(effects);
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            // handled in `run`
            RoomCommand::Shutdown => {}
        }
    }

    /// Carries out engine effects. Dropping a slow participant feeds the
    /// resulting `leave` effects back into the same queue.
    fn apply(&mut self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Broadcast(message) => {
                    let recipients: Vec<PlayerId> = self.senders.keys().copied().collect();
                    for player_id in recipients {
                        if !self.deliver(player_id, message.clone()) {
                            queue.extend(self.drop_participant(player_id));
                        }
                    }
                }
                Effect::Send { to, message } => {
                    if !self.deliver(to, message) {
                        queue.extend(self.drop_participant(to));
                    }
                }
                Effect::ScheduleBot { bot, delay } => {
                    debug!(room_id = %self.room_id, %bot, ?delay, "bot move scheduled");
                    self.timers.schedule(delay, bot);
                }
                Effect::CancelBots => {
                    self.timers.clear();
                }
                Effect::RecordResults(results) => self.record(results),
            }
        }
    }

    /// `false` when the participant should be dropped. Players without a
    /// sender (bots, or someone already dropped) count as delivered.
    fn deliver(&self, player_id: PlayerId, message: ServerMessage) -> bool {
        let Some(sender) = self.senders.get(&player_id) else {
            return true;
        };
        match sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(room_id = %self.room_id, %player_id, "outbound buffer full, dropping player");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(room_id = %self.room_id, %player_id, "outbound channel closed, dropping player");
                false
            }
        }
    }

    /// Removing the sender closes the channel, which tells the
    /// connection's writer to hang up.
    fn drop_participant(&mut self, player_id: PlayerId) -> Vec<Effect> {
        self.senders.remove(&player_id);
        self.engine.leave(player_id)
    }

    fn record(&self, results: Vec<GameResult>) {
        let stats = Arc::clone(&self.stats);
        let room_id = self.room_id.clone();
        tokio::task::spawn_blocking(move || {
            for result in &results {
                if let Err(error) = stats.record_game_result(result) {
                    warn!(%room_id, player = %result.player_name, %error, "failed to record game result");
                }
            }
        });
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.engine.state(),
            player_count: self.engine.player_count(),
            human_count: self.engine.human_count(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    dictionary: Arc<dyn Dictionary>,
    stats: Arc<dyn StatsRecorder>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let timers = DelayQueue::new(DelayConfig::with_jitter(config.bot_jitter));

    let actor = RoomActor {
        room_id: room_id.clone(),
        engine: RoomEngine::new(room_id.clone(), config, dictionary),
        senders: HashMap::new(),
        timers,
        stats,
        receiver: rx,
        seated: false,
    };

    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}
