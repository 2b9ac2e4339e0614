//! Room aggregate: membership, readiness, phase transitions and the match it
//! hosts.
//!
//! Every mutation returns the [`RoomEvent`]s that room members must be told
//! about; delivery is the caller's concern.

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use super::{
    error::RoomError,
    game_state::{GameState, PowerUp, PowerUpEffect, Score, Side},
    physics::{self, PhysicsEvent},
    settings::{Settings, SettingsPatch},
    value_object::{ChatText, ConnectionId, Direction, Nickname, RoomId, Timestamp},
};

/// Chat entries kept per room; the oldest is evicted first
pub const CHAT_CAPACITY: usize = 50;

/// Coarse lifecycle state of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Running,
    Paused,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Finished => "finished",
        }
    }
}

/// One of the two authoritative player positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    /// Player 1 drives the left paddle, player 2 the right one.
    pub fn side(self) -> Side {
        match self {
            Slot::Player1 => Side::Left,
            Slot::Player2 => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Slot),
    Spectator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub connection: ConnectionId,
    pub nickname: Nickname,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub player1: bool,
    pub player2: bool,
}

impl Readiness {
    fn set(&mut self, slot: Slot, ready: bool) {
        match slot {
            Slot::Player1 => self.player1 = ready,
            Slot::Player2 => self.player2 = ready,
        }
    }

    pub fn both(&self) -> bool {
        self.player1 && self.player2
    }
}

/// Wins per slot inside one room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomScoreboard {
    pub player1_wins: u32,
    pub player2_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub nickname: Nickname,
    pub text: ChatText,
    pub timestamp: Timestamp,
}

/// Nicknames currently seated and watching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub player1: Option<Nickname>,
    pub player2: Option<Nickname>,
    pub spectators: Vec<Nickname>,
}

/// Outcome of a match ended by brick depletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Winner { slot: Slot, nickname: Nickname },
    Draw,
    Cooperative { score: u32 },
}

impl MatchResult {
    /// Nickname to credit on the global scoreboard, if any
    pub fn global_winner(&self) -> Option<&Nickname> {
        match self {
            MatchResult::Winner { nickname, .. } => Some(nickname),
            MatchResult::Draw | MatchResult::Cooperative { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Hit,
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Something room members must be told about
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    MembershipChanged,
    StateSnapshot,
    PhaseChanged(Phase),
    MatchOver(MatchResult),
    SettingsChanged,
    Feedback(Feedback),
    PowerUpSpawned(PowerUp),
    PowerUpApplied(PowerUpEffect),
    PowerUpExpired(PowerUpEffect),
    Notice { text: String, severity: Severity },
}

/// Result of a member leaving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub role: Role,
    pub nickname: Nickname,
    /// The room dropped back to waiting because a match could not continue
    pub forced_waiting: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub player1: Option<Member>,
    pub player2: Option<Member>,
    pub spectators: Vec<Member>,
    pub readiness: Readiness,
    pub phase: Phase,
    pub settings: Settings,
    pub game: GameState,
    pub scoreboard: RoomScoreboard,
    pub chat: VecDeque<ChatEntry>,
    #[serde(skip)]
    closed: bool,
}

impl Room {
    /// Create a waiting room with freshly laid bricks.
    pub fn new(id: RoomId, settings: Settings, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            player1: None,
            player2: None,
            spectators: Vec::new(),
            readiness: Readiness::default(),
            phase: Phase::Waiting,
            game: GameState::new(&settings),
            settings,
            scoreboard: RoomScoreboard::default(),
            chat: VecDeque::with_capacity(CHAT_CAPACITY),
            closed: false,
        }
    }

    /// Number of filled player slots (0-2)
    pub fn occupancy(&self) -> usize {
        usize::from(self.player1.is_some()) + usize::from(self.player2.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0 && self.spectators.is_empty()
    }

    /// Mark the room as removed from the registry; later joins must retry.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn slot(&self, slot: Slot) -> Option<&Member> {
        match slot {
            Slot::Player1 => self.player1.as_ref(),
            Slot::Player2 => self.player2.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Member> {
        match slot {
            Slot::Player1 => &mut self.player1,
            Slot::Player2 => &mut self.player2,
        }
    }

    pub fn role_of(&self, connection: &ConnectionId) -> Option<Role> {
        for slot in [Slot::Player1, Slot::Player2] {
            if self.slot(slot).is_some_and(|m| &m.connection == connection) {
                return Some(Role::Player(slot));
            }
        }
        self.spectators
            .iter()
            .any(|m| &m.connection == connection)
            .then_some(Role::Spectator)
    }

    pub fn nickname_of(&self, connection: &ConnectionId) -> Option<&Nickname> {
        self.player1
            .iter()
            .chain(self.player2.iter())
            .chain(self.spectators.iter())
            .find(|m| &m.connection == connection)
            .map(|m| &m.nickname)
    }

    /// Every connection in the room, players first
    pub fn member_connections(&self) -> Vec<ConnectionId> {
        self.player1
            .iter()
            .chain(self.player2.iter())
            .chain(self.spectators.iter())
            .map(|m| m.connection.clone())
            .collect()
    }

    pub fn membership(&self) -> Membership {
        Membership {
            player1: self.player1.as_ref().map(|m| m.nickname.clone()),
            player2: self.player2.as_ref().map(|m| m.nickname.clone()),
            spectators: self.spectators.iter().map(|m| m.nickname.clone()).collect(),
        }
    }

    /// Seat the connection in the first free slot, else as a spectator.
    ///
    /// The assignment is the same for every game mode and is never revisited
    /// while the member stays.
    pub fn join(&mut self, connection: ConnectionId, nickname: Nickname) -> Result<Role, RoomError> {
        if self.closed {
            return Err(RoomError::Closed);
        }
        if self.role_of(&connection).is_some() {
            return Err(RoomError::AlreadyMember(connection.to_string()));
        }

        let member = Member {
            connection,
            nickname,
        };
        let role = if self.player1.is_none() {
            self.player1 = Some(member);
            Role::Player(Slot::Player1)
        } else if self.player2.is_none() {
            self.player2 = Some(member);
            Role::Player(Slot::Player2)
        } else {
            self.spectators.push(member);
            Role::Spectator
        };
        Ok(role)
    }

    /// Vacate the connection's seat. A non-empty room falls back to waiting.
    pub fn leave(&mut self, connection: &ConnectionId) -> Result<Departure, RoomError> {
        let role = self
            .role_of(connection)
            .ok_or_else(|| RoomError::NotAMember(connection.to_string()))?;

        let member = match role {
            Role::Player(slot) => {
                self.readiness.set(slot, false);
                self.slot_mut(slot).take()
            }
            Role::Spectator => {
                let index = self
                    .spectators
                    .iter()
                    .position(|m| &m.connection == connection);
                index.map(|i| self.spectators.remove(i))
            }
        }
        .ok_or_else(|| RoomError::NotAMember(connection.to_string()))?;

        let forced_waiting = !self.is_empty() && self.phase != Phase::Waiting;
        if forced_waiting {
            self.phase = Phase::Waiting;
        }

        Ok(Departure {
            role,
            nickname: member.nickname,
            forced_waiting,
        })
    }

    fn player_slot(&self, connection: &ConnectionId) -> Result<Slot, RoomError> {
        match self.role_of(connection) {
            Some(Role::Player(slot)) => Ok(slot),
            Some(Role::Spectator) => Err(RoomError::Unauthorized(connection.to_string())),
            None => Err(RoomError::NotAMember(connection.to_string())),
        }
    }

    /// Mark `slot` ready; starts the match once both seated players are ready.
    pub fn set_ready(
        &mut self,
        connection: &ConnectionId,
        slot: Slot,
    ) -> Result<Vec<RoomEvent>, RoomError> {
        if self.player_slot(connection)? != slot {
            return Err(RoomError::Unauthorized(connection.to_string()));
        }
        if self.phase != Phase::Waiting {
            return Err(RoomError::InvalidPhase(self.phase.as_str()));
        }

        self.readiness.set(slot, true);

        let both_seated = self.player1.is_some() && self.player2.is_some();
        if both_seated && self.readiness.both() {
            Ok(self.start())
        } else {
            Ok(Vec::new())
        }
    }

    fn start(&mut self) -> Vec<RoomEvent> {
        self.phase = Phase::Running;
        self.game = GameState::new(&self.settings);
        tracing::info!("Room '{}' started a {} match", self.id, self.settings.game_mode.as_str());
        vec![
            RoomEvent::PhaseChanged(Phase::Running),
            RoomEvent::Notice {
                text: "Game Started!".to_string(),
                severity: Severity::Success,
            },
            RoomEvent::StateSnapshot,
        ]
    }

    /// Either player flips between running and paused.
    pub fn toggle_pause(&mut self, connection: &ConnectionId) -> Result<Vec<RoomEvent>, RoomError> {
        self.player_slot(connection)?;
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => return Err(RoomError::InvalidPhase(other.as_str())),
        };
        Ok(vec![RoomEvent::PhaseChanged(self.phase)])
    }

    /// Step the paddle owned by the connection's slot.
    pub fn move_paddle(
        &mut self,
        connection: &ConnectionId,
        side: Side,
        direction: Direction,
    ) -> Result<Vec<RoomEvent>, RoomError> {
        if self.player_slot(connection)?.side() != side {
            return Err(RoomError::Unauthorized(connection.to_string()));
        }
        self.game.move_paddle(side, direction);
        Ok(vec![RoomEvent::StateSnapshot])
    }

    /// Apply a partial settings update while waiting.
    ///
    /// The pre-match state is rebuilt so bricks, paddle heights and the score
    /// shape follow the new settings.
    pub fn update_settings(
        &mut self,
        connection: &ConnectionId,
        patch: &SettingsPatch,
    ) -> Result<Vec<RoomEvent>, RoomError> {
        self.player_slot(connection)?;
        if self.phase != Phase::Waiting {
            return Err(RoomError::InvalidPhase(self.phase.as_str()));
        }
        self.settings = self.settings.merged(patch)?;
        self.game = GameState::new(&self.settings);
        Ok(vec![RoomEvent::SettingsChanged, RoomEvent::StateSnapshot])
    }

    /// Return a finished (or idle) room to waiting for a rematch.
    pub fn request_replay(&mut self, connection: &ConnectionId) -> Result<Vec<RoomEvent>, RoomError> {
        self.player_slot(connection)?;
        if matches!(self.phase, Phase::Running | Phase::Paused) {
            return Err(RoomError::InvalidPhase(self.phase.as_str()));
        }
        self.readiness = Readiness::default();
        self.game = GameState::new(&self.settings);
        self.phase = Phase::Waiting;
        Ok(vec![RoomEvent::PhaseChanged(Phase::Waiting), RoomEvent::StateSnapshot])
    }

    /// Append to the bounded chat log.
    pub fn add_chat(
        &mut self,
        connection: &ConnectionId,
        text: ChatText,
        timestamp: Timestamp,
    ) -> Result<ChatEntry, RoomError> {
        let nickname = self
            .nickname_of(connection)
            .cloned()
            .ok_or_else(|| RoomError::NotAMember(connection.to_string()))?;
        let entry = ChatEntry {
            nickname,
            text,
            timestamp,
        };
        if self.chat.len() == CHAT_CAPACITY {
            self.chat.pop_front();
        }
        self.chat.push_back(entry.clone());
        Ok(entry)
    }

    /// Run one scheduler tick.
    ///
    /// Paused rooms only re-announce the pause; waiting and finished rooms do
    /// nothing.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt_ms: u64, rng: &mut R) -> Vec<RoomEvent> {
        match self.phase {
            Phase::Paused => return vec![RoomEvent::PhaseChanged(Phase::Paused)],
            Phase::Running => {}
            Phase::Waiting | Phase::Finished => return Vec::new(),
        }

        let outcome = physics::step(&mut self.game, &self.settings, dt_ms, rng);

        let mut events = Vec::new();
        for event in outcome.events {
            match event {
                PhysicsEvent::PaddleHit(_) => events.push(RoomEvent::Feedback(Feedback::Hit)),
                PhysicsEvent::PowerUpSpawned(power_up) => {
                    events.push(RoomEvent::PowerUpSpawned(power_up))
                }
                PhysicsEvent::PowerUpApplied(effect) => {
                    events.push(RoomEvent::Feedback(Feedback::PowerUp));
                    events.push(RoomEvent::PowerUpApplied(effect));
                }
                PhysicsEvent::PowerUpExpired(effect) => {
                    events.push(RoomEvent::PowerUpExpired(effect))
                }
                PhysicsEvent::BrickBroken { .. } | PhysicsEvent::BallReset => {}
            }
        }
        events.push(RoomEvent::StateSnapshot);

        if outcome.bricks_remaining == 0 {
            let result = self.finish();
            events.push(RoomEvent::PhaseChanged(Phase::Finished));
            events.push(RoomEvent::MatchOver(result));
        }
        events
    }

    /// Close the match and credit the room scoreboard.
    fn finish(&mut self) -> MatchResult {
        self.phase = Phase::Finished;

        let result = match self.game.score {
            Score::Cooperative { shared } => MatchResult::Cooperative { score: shared },
            Score::Classic { left, right } | Score::Team { left, right } => {
                let winner = match left.cmp(&right) {
                    std::cmp::Ordering::Greater => Some(Slot::Player1),
                    std::cmp::Ordering::Less => Some(Slot::Player2),
                    std::cmp::Ordering::Equal => None,
                };
                match winner.and_then(|slot| self.slot(slot).map(|m| (slot, m.nickname.clone()))) {
                    Some((slot, nickname)) => MatchResult::Winner { slot, nickname },
                    None => MatchResult::Draw,
                }
            }
        };

        if let MatchResult::Winner { slot, .. } = &result {
            match slot {
                Slot::Player1 => self.scoreboard.player1_wins += 1,
                Slot::Player2 => self.scoreboard.player2_wins += 1,
            }
        }
        tracing::info!("Room '{}' finished: {:?}", self.id, result);
        result
    }
}
