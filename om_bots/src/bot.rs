//! Decision logic of a single bot, independent of the socket.

use old_maid::{
    entities::{RoomId, SeatIndex},
    messages::{ClientMessage, DrawRequest, GameOver, JoinRequest, ServerEvent, StateUpdate},
};
use rand::Rng;

/// What the bot wants done after seeing an event.
#[derive(Debug, PartialEq)]
pub enum Reaction {
    Ignore,
    /// Send this message to the server.
    Send(ClientMessage),
    Finished(GameOver),
    /// The server rejected one of our frames.
    Rejected(String),
}

/// Per-match view of a bot.
#[derive(Debug, Default)]
pub struct Bot {
    pub nickname: String,
    seat: Option<SeatIndex>,
    room_id: Option<RoomId>,
    /// Turns taken in the current match
    pub draws: usize,
}

impl Bot {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    pub fn join_message(&self) -> ClientMessage {
        ClientMessage::JoinGame(JoinRequest::Named {
            nickname: Some(self.nickname.clone()),
        })
    }

    /// Forget the previous match before queueing again.
    pub fn reset(&mut self) {
        self.seat = None;
        self.room_id = None;
        self.draws = 0;
    }

    pub fn react<R: Rng + ?Sized>(&mut self, frame: &str, rng: &mut R) -> Reaction {
        let Ok(event) = serde_json::from_str::<ServerEvent>(frame) else {
            return Reaction::Ignore;
        };

        match event {
            ServerEvent::GameStart(start) => {
                self.seat = Some(start.my_index);
                self.room_id = Some(start.room_id);
                Reaction::Ignore
            }
            ServerEvent::StateUpdate(update) => self.on_state(&update, rng),
            ServerEvent::GameOver(over) => Reaction::Finished(over),
            ServerEvent::Error(error) => Reaction::Rejected(error.message),
            _ => Reaction::Ignore,
        }
    }

    fn on_state<R: Rng + ?Sized>(&mut self, update: &StateUpdate, rng: &mut R) -> Reaction {
        let (Some(seat), Some(room_id)) = (self.seat, self.room_id.as_ref()) else {
            return Reaction::Ignore;
        };
        if update.turn_index != seat {
            return Reaction::Ignore;
        }

        // Random card from the next clockwise holder.
        let counts = &update.player_counts;
        let target = next_holder(counts, seat);
        let card_index = target
            .map(|t| counts[t])
            .filter(|&count| count > 0)
            .map(|count| rng.random_range(0..count) as i64);

        self.draws += 1;
        Reaction::Send(ClientMessage::DrawCard(DrawRequest {
            room_id: room_id.clone(),
            target_index: target.map(|t| t as i64),
            card_index,
        }))
    }
}

/// First seat clockwise after `seat` with cards left.
fn next_holder(counts: &[usize], seat: SeatIndex) -> Option<SeatIndex> {
    let seats = counts.len();
    (1..seats)
        .map(|offset| (seat + offset) % seats)
        .find(|&s| counts[s] > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use old_maid::messages::OutcomeKind;
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;

    fn started(seat: u64) -> Bot {
        let mut bot = Bot::new("bot_1");
        let start = json!({
            "event": "game_start",
            "data": {"roomID": "room_x", "myIndex": seat, "players": [], "hand": []}
        });
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(bot.react(&start.to_string(), &mut rng), Reaction::Ignore);
        bot
    }

    fn state(turn: u64, counts: [u64; 4]) -> String {
        json!({
            "event": "state_update",
            "data": {"turnIndex": turn, "playerCounts": counts, "myHand": []}
        })
        .to_string()
    }

    #[test]
    fn test_draws_on_own_turn_from_next_holder() {
        let mut bot = started(1);
        let mut rng = StdRng::seed_from_u64(3);

        let Reaction::Send(ClientMessage::DrawCard(request)) =
            bot.react(&state(1, [4, 3, 0, 2]), &mut rng)
        else {
            panic!("expected a draw");
        };
        assert_eq!(request.room_id, RoomId::from("room_x"));
        assert_eq!(request.target(), Some(3));
        assert!(request.card().unwrap() < 2);
        assert_eq!(bot.draws, 1);
    }

    #[test]
    fn test_draw_goes_out_in_wire_shape() {
        let mut bot = started(0);
        let mut rng = StdRng::seed_from_u64(3);
        let Reaction::Send(message) = bot.react(&state(0, [1, 0, 0, 1]), &mut rng) else {
            panic!("expected a draw");
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "event": "draw_card",
                "data": {"roomID": "room_x", "targetIndex": 3, "cardIndex": 0}
            })
        );
    }

    #[test]
    fn test_join_message_wire_shape() {
        let bot = Bot::new("bot_9");
        assert_eq!(
            serde_json::to_value(bot.join_message()).unwrap(),
            json!({"event": "join_game", "data": {"nickname": "bot_9"}})
        );
    }

    #[test]
    fn test_waits_for_other_turns() {
        let mut bot = started(0);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(bot.react(&state(2, [1, 1, 1, 1]), &mut rng), Reaction::Ignore);
        assert_eq!(bot.draws, 0);
    }

    #[test]
    fn test_state_before_start_is_ignored() {
        let mut bot = Bot::new("late");
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(bot.react(&state(0, [1, 1, 1, 1]), &mut rng), Reaction::Ignore);
    }

    #[test]
    fn test_game_over_and_errors_surface() {
        let mut bot = started(0);
        let mut rng = StdRng::seed_from_u64(3);
        let over = json!({"event": "game_over", "data": {"loser": "bot_2", "outcome": "loser"}});
        let Reaction::Finished(result) = bot.react(&over.to_string(), &mut rng) else {
            panic!("expected game over");
        };
        assert_eq!(result.outcome, OutcomeKind::Loser);
        assert_eq!(result.loser.unwrap().as_str(), "bot_2");

        let error = json!({"event": "error", "data": {"message": "Invalid message format"}});
        assert_eq!(
            bot.react(&error.to_string(), &mut rng),
            Reaction::Rejected("Invalid message format".to_string())
        );
        assert_eq!(bot.react("garbage", &mut rng), Reaction::Ignore);
    }

    #[test]
    fn test_reset_forgets_seat() {
        let mut bot = started(0);
        bot.reset();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(bot.react(&state(0, [1, 1, 1, 1]), &mut rng), Reaction::Ignore);
    }
}
