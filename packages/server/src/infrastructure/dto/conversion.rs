//! Conversion logic between DTOs and domain models.

use brickrally_shared::time::{timestamp_to_rfc3339, timestamp_to_time_of_day};

use crate::domain::{
    ChatEntry, MatchResult, Membership, PowerUpEffect, Role, Room, RoomScoreboard, RoomSummary,
    Side, Slot,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl From<dto::SlotDto> for Slot {
    fn from(slot: dto::SlotDto) -> Self {
        match slot {
            dto::SlotDto::Player1 => Slot::Player1,
            dto::SlotDto::Player2 => Slot::Player2,
        }
    }
}

impl From<dto::SideDto> for Side {
    fn from(side: dto::SideDto) -> Self {
        match side {
            dto::SideDto::Left => Side::Left,
            dto::SideDto::Right => Side::Right,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Role> for dto::RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::Player(Slot::Player1) => dto::RoleDto::Player1,
            Role::Player(Slot::Player2) => dto::RoleDto::Player2,
            Role::Spectator => dto::RoleDto::Spectator,
        }
    }
}

impl From<RoomSummary> for dto::RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            room_id: summary.room_id.into_string(),
            occupancy: summary.occupancy,
        }
    }
}

impl From<ChatEntry> for dto::ChatEntryDto {
    fn from(entry: ChatEntry) -> Self {
        let timestamp = entry.timestamp.value();
        Self {
            nickname: entry.nickname.into_string(),
            text: entry.text.as_str().to_string(),
            timestamp,
            time: timestamp_to_time_of_day(timestamp),
        }
    }
}

impl From<Membership> for dto::ServerMessage {
    fn from(membership: Membership) -> Self {
        dto::ServerMessage::Membership {
            player1: membership.player1.map(|n| n.into_string()),
            player2: membership.player2.map(|n| n.into_string()),
            spectators: membership
                .spectators
                .into_iter()
                .map(|n| n.into_string())
                .collect(),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        let membership = room.membership();
        Self {
            room_id: room.id.as_str().to_string(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            phase: room.phase,
            occupancy: room.occupancy(),
            settings: room.settings,
            players: http::PlayersDto {
                player1: membership.player1.map(|n| n.into_string()),
                player2: membership.player2.map(|n| n.into_string()),
            },
            spectators: membership
                .spectators
                .into_iter()
                .map(|n| n.into_string())
                .collect(),
            scoreboard: room.scoreboard,
        }
    }
}

/// Build the `match-over` frame, including its human-readable line.
pub fn match_over_message(result: &MatchResult, scoreboard: RoomScoreboard) -> dto::ServerMessage {
    let (outcome, winner, score, message) = match result {
        MatchResult::Winner { nickname, .. } => (
            dto::OutcomeDto::Winner,
            Some(nickname.as_str().to_string()),
            None,
            format!("{nickname} wins!"),
        ),
        MatchResult::Draw => (dto::OutcomeDto::Draw, None, None, "It's a draw!".to_string()),
        MatchResult::Cooperative { score } => (
            dto::OutcomeDto::Cooperative,
            None,
            Some(*score),
            format!("All bricks cleared! Team score: {score}"),
        ),
    };
    dto::ServerMessage::MatchOver {
        outcome,
        winner,
        score,
        message,
        room_scoreboard: scoreboard,
    }
}

pub fn power_up_applied_message(effect: PowerUpEffect) -> dto::ServerMessage {
    dto::ServerMessage::PowerUpApplied {
        kind: effect.kind,
        side: effect.target,
        height: effect.height,
    }
}

pub fn power_up_expired_message(effect: PowerUpEffect) -> dto::ServerMessage {
    dto::ServerMessage::PowerUpExpired {
        kind: effect.kind,
        side: effect.target,
        height: effect.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatText, Nickname, PowerUpKind, Timestamp};

    #[test]
    fn test_chat_entry_to_dto_carries_time_label() {
        // given:
        let entry = ChatEntry {
            nickname: Nickname::new("alice".to_string()).unwrap(),
            text: ChatText::new("hello".to_string()).unwrap(),
            timestamp: Timestamp::new(3_723_000),
        };

        // when:
        let dto: dto::ChatEntryDto = entry.into();

        // then:
        assert_eq!(dto.nickname, "alice");
        assert_eq!(dto.text, "hello");
        assert_eq!(dto.timestamp, 3_723_000);
        assert_eq!(dto.time, "01:02:03");
    }

    #[test]
    fn test_role_to_dto() {
        assert_eq!(
            dto::RoleDto::from(Role::Player(Slot::Player2)),
            dto::RoleDto::Player2
        );
        assert_eq!(dto::RoleDto::from(Role::Spectator), dto::RoleDto::Spectator);
    }

    #[test]
    fn test_match_over_message_by_outcome() {
        // given:
        let board = RoomScoreboard {
            player1_wins: 1,
            player2_wins: 0,
        };
        let winner = MatchResult::Winner {
            slot: Slot::Player1,
            nickname: Nickname::new("alice".to_string()).unwrap(),
        };

        // when:
        let won = serde_json::to_value(match_over_message(&winner, board)).unwrap();
        let draw = serde_json::to_value(match_over_message(&MatchResult::Draw, board)).unwrap();
        let coop = serde_json::to_value(match_over_message(
            &MatchResult::Cooperative { score: 42 },
            board,
        ))
        .unwrap();

        // then:
        assert_eq!(won["type"], "match-over");
        assert_eq!(won["winner"], "alice");
        assert_eq!(won["message"], "alice wins!");
        assert_eq!(won["roomScoreboard"]["player1Wins"], 1);
        assert_eq!(draw["outcome"], "draw");
        assert!(draw["winner"].is_null());
        assert_eq!(coop["outcome"], "cooperative");
        assert_eq!(coop["score"], 42);
    }

    #[test]
    fn test_power_up_effect_messages() {
        // given:
        let effect = PowerUpEffect {
            kind: PowerUpKind::PaddleShrink,
            target: Some(Side::Right),
            height: Some(70.0),
        };

        // when:
        let applied = serde_json::to_value(power_up_applied_message(effect)).unwrap();
        let expired = serde_json::to_value(power_up_expired_message(PowerUpEffect {
            height: Some(100.0),
            ..effect
        }))
        .unwrap();

        // then:
        assert_eq!(
            applied,
            serde_json::json!({"type": "power-up-applied", "kind": "paddleShrink", "side": "right", "height": 70.0})
        );
        assert_eq!(expired["type"], "power-up-expired");
        assert_eq!(expired["height"], 100.0);
    }
}
