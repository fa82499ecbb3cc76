//! Applies adapter commands to a running game.
//!
//! Runs on the game loop thread. Game events are kept in one bounded backlog,
//! numbered in arrival order, and every client has its own read position in it:
//! a client polling with `observe` sees everything that happened since its
//! previous poll (on its first poll, everything still retained), independent of
//! what other clients have read. The backlog drops the oldest events first.

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::engine::{Game, InputOutcome};
use crate::protocol::{create_ack, create_error, AckResult, ErrorCode, ServerMessage};
use crate::runtime::{ClientCommand, InboundCommand};
use crate::types::GameEvent;

pub const DEFAULT_EVENT_BACKLOG: usize = 1024;

#[derive(Debug)]
pub struct Dispatcher {
    backlog: VecDeque<GameEvent>,
    /// Sequence number of `backlog[0]`
    first_seq: u64,
    capacity: usize,
    /// Next unread sequence number per client
    cursors: HashMap<usize, u64>,
    applied: u32,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BACKLOG)
    }
}

impl Dispatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            backlog: VecDeque::new(),
            first_seq: 0,
            capacity: capacity.max(1),
            cursors: HashMap::new(),
            applied: 0,
        }
    }

    /// Commands applied so far
    pub fn applied(&self) -> u32 {
        self.applied
    }

    /// Events currently retained
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Retained events `client_id` has not observed yet
    pub fn unread(&self, client_id: usize) -> usize {
        (self.next_seq() - self.cursor(client_id)) as usize
    }

    fn next_seq(&self) -> u64 {
        self.first_seq + self.backlog.len() as u64
    }

    fn cursor(&self, client_id: usize) -> u64 {
        self.cursors
            .get(&client_id)
            .copied()
            .unwrap_or(self.first_seq)
            .max(self.first_seq)
    }

    /// Move the game's pending events into the backlog
    pub fn collect(&mut self, game: &mut Game) {
        let mut dropped = false;
        for event in game.take_events() {
            if self.backlog.len() == self.capacity {
                self.backlog.pop_front();
                self.first_seq += 1;
                dropped = true;
            }
            self.backlog.push_back(event);
        }
        if dropped {
            // A cursor at or before the oldest event reads the same as no cursor.
            let first = self.first_seq;
            self.cursors.retain(|_, seq| *seq > first);
        }
    }

    /// Events `client_id` has not seen, advancing its read position
    fn observe(&mut self, client_id: usize) -> Vec<GameEvent> {
        let skip = (self.cursor(client_id) - self.first_seq) as usize;
        let events = self.backlog.iter().skip(skip).copied().collect();
        self.cursors.insert(client_id, self.next_seq());
        events
    }

    /// Forget every retained event and read position
    fn clear(&mut self) {
        self.first_seq = self.next_seq();
        self.backlog.clear();
        self.cursors.clear();
    }

    /// Apply one command and build the reply for the sending client
    pub fn apply(&mut self, game: &mut Game, cmd: &InboundCommand) -> ServerMessage {
        self.collect(game);
        self.applied = self.applied.wrapping_add(1);
        debug!(
            "[Adapter] client {} seq {}: {:?}",
            cmd.client_id, cmd.seq, cmd.command
        );

        let reply = match cmd.command {
            ClientCommand::Select(c) => outcome_reply(cmd.seq, game.select(c)),
            ClientCommand::Tap(pos) => outcome_reply(cmd.seq, game.tap_world(pos)),
            ClientCommand::Restart(seed) => {
                if game.restart(seed) {
                    self.clear();
                    create_ack(cmd.seq, AckResult::Restarted)
                } else {
                    create_error(cmd.seq, ErrorCode::Busy, "a turn is in progress")
                }
            }
            ClientCommand::Observe => ServerMessage::Observation {
                seq: cmd.seq,
                snapshot: game.snapshot(),
                events: self.observe(cmd.client_id),
            },
        };

        self.collect(game);
        reply
    }
}

fn outcome_reply(seq: u64, outcome: InputOutcome) -> ServerMessage {
    let result = match outcome {
        InputOutcome::Busy => {
            return create_error(seq, ErrorCode::Busy, "a turn is in progress");
        }
        InputOutcome::Ignored => AckResult::Ignored,
        InputOutcome::Selected(_) => AckResult::Selected,
        InputOutcome::Deselected(_) => AckResult::Deselected,
        InputOutcome::MoveStarted { .. } => AckResult::MoveStarted,
    };
    create_ack(seq, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, StageTimings};
    use crate::types::Coord;

    fn game(timings: StageTimings) -> Game {
        let config = GameConfig {
            timings,
            ..GameConfig::default()
        };
        Game::new(config).unwrap()
    }

    fn cmd(seq: u64, command: ClientCommand) -> InboundCommand {
        cmd_from(1, seq, command)
    }

    fn cmd_from(client_id: usize, seq: u64, command: ClientCommand) -> InboundCommand {
        InboundCommand {
            client_id,
            seq,
            command,
        }
    }

    fn observed(reply: ServerMessage) -> Vec<GameEvent> {
        match reply {
            ServerMessage::Observation { events, .. } => events,
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[test]
    fn test_select_acks_with_outcome() {
        let mut g = game(StageTimings::instant());
        let mut d = Dispatcher::default();

        let reply = d.apply(&mut g, &cmd(1, ClientCommand::Select(Coord::new(0, 0))));
        assert_eq!(reply, create_ack(1, AckResult::Selected));
        let reply = d.apply(&mut g, &cmd(2, ClientCommand::Select(Coord::new(-1, 0))));
        assert_eq!(reply, create_ack(2, AckResult::Ignored));
        assert_eq!(d.applied(), 2);
    }

    #[test]
    fn test_observe_returns_events_since_last_poll() {
        let mut g = game(StageTimings::instant());
        let mut d = Dispatcher::default();
        d.apply(&mut g, &cmd(1, ClientCommand::Select(Coord::new(0, 0))));
        d.apply(&mut g, &cmd(2, ClientCommand::Select(Coord::new(1, 0))));

        let ServerMessage::Observation { seq, snapshot, events } =
            d.apply(&mut g, &cmd(3, ClientCommand::Observe))
        else {
            panic!("expected observation");
        };
        assert_eq!(seq, 3);
        assert_eq!(snapshot.stats.moves, 1);
        assert!(matches!(events.last(), Some(GameEvent::TurnFinished { .. })));
        assert_eq!(d.unread(1), 0);

        let again = observed(d.apply(&mut g, &cmd(4, ClientCommand::Observe)));
        assert!(again.is_empty());
    }

    #[test]
    fn test_each_client_reads_the_backlog_independently() {
        let mut g = game(StageTimings::instant());
        let mut d = Dispatcher::default();
        d.apply(&mut g, &cmd_from(1, 1, ClientCommand::Select(Coord::new(0, 0))));

        let first = observed(d.apply(&mut g, &cmd_from(1, 2, ClientCommand::Observe)));
        let second = observed(d.apply(&mut g, &cmd_from(2, 1, ClientCommand::Observe)));
        assert_eq!(first, vec![GameEvent::Selected { at: Coord::new(0, 0) }]);
        assert_eq!(first, second);

        d.apply(&mut g, &cmd_from(1, 3, ClientCommand::Select(Coord::new(0, 0))));
        assert_eq!(d.unread(1), 1);
        assert_eq!(d.unread(2), 1);
        let second = observed(d.apply(&mut g, &cmd_from(2, 2, ClientCommand::Observe)));
        assert_eq!(second, vec![GameEvent::Deselected { at: Coord::new(0, 0) }]);
        assert_eq!(d.unread(1), 1);
        assert_eq!(d.unread(2), 0);
    }

    #[test]
    fn test_restart_clears_every_read_position() {
        let mut g = game(StageTimings::instant());
        let mut d = Dispatcher::default();
        d.apply(&mut g, &cmd_from(1, 1, ClientCommand::Select(Coord::new(0, 0))));
        d.apply(&mut g, &cmd_from(2, 1, ClientCommand::Observe));

        let reply = d.apply(&mut g, &cmd_from(1, 2, ClientCommand::Restart(Some(5))));
        assert_eq!(reply, create_ack(2, AckResult::Restarted));
        assert_eq!(d.backlog_len(), 0);
        assert_eq!(d.unread(1), 0);
        assert_eq!(d.unread(2), 0);

        d.apply(&mut g, &cmd_from(1, 3, ClientCommand::Select(Coord::new(2, 2))));
        assert_eq!(d.unread(2), 1);
    }

    #[test]
    fn test_busy_game_rejects_commands() {
        let mut g = game(StageTimings::default());
        let mut d = Dispatcher::default();
        d.apply(&mut g, &cmd(1, ClientCommand::Select(Coord::new(0, 0))));
        d.apply(&mut g, &cmd(2, ClientCommand::Select(Coord::new(1, 0))));
        assert!(g.is_busy());

        let reply = d.apply(&mut g, &cmd(3, ClientCommand::Select(Coord::new(2, 2))));
        assert!(matches!(reply, ServerMessage::Error { code: ErrorCode::Busy, .. }));
        let reply = d.apply(&mut g, &cmd(4, ClientCommand::Restart(None)));
        assert!(matches!(reply, ServerMessage::Error { code: ErrorCode::Busy, .. }));
    }

    #[test]
    fn test_backlog_is_bounded() {
        let mut g = game(StageTimings::instant());
        let mut d = Dispatcher::new(2);
        d.apply(&mut g, &cmd_from(2, 1, ClientCommand::Observe));
        for seq in 0..6 {
            d.apply(&mut g, &cmd(seq, ClientCommand::Select(Coord::new(3, 3))));
        }
        assert_eq!(d.backlog_len(), 2);
        assert_eq!(d.unread(2), 2);
        let events = observed(d.apply(&mut g, &cmd_from(2, 2, ClientCommand::Observe)));
        assert_eq!(events.len(), 2);
    }
}
