//! Game facade - board, selection and the in-flight turn
//!
//! The host feeds input through [`Game::select`] / [`Game::tap_world`] and
//! advances time with [`Game::tick`]. Events accumulate until the host drains
//! them with [`Game::take_events`].

use log::{debug, info};

use crate::core::{Board, BoardSnapshot, ConfigError, GameConfig, ObserverId};
use crate::pipeline::{MovePipeline, TurnSummary};
use crate::selection::{SelectOutcome, Selection, SelectionMachine};
use crate::types::{Coord, Gem, GameEvent, Stage, Stats, WorldPos};

/// What happened to one piece of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Empty or out-of-bounds cell
    Ignored,
    /// A turn is still playing out
    Busy,
    Selected(Coord),
    Deselected(Coord),
    MoveStarted { from: Coord, to: Coord },
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    selection: SelectionMachine,
    pipeline: Option<MovePipeline>,
    wait_ms: u32,
    events: Vec<GameEvent>,
    stats: Stats,
    last_turn: Option<TurnSummary>,
}

impl Game {
    /// Validate `config` and build a populated board
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(&config.board)?;
        Ok(Self::with_board(config, board))
    }

    /// Start from an existing board (scripted layouts)
    pub fn with_board(config: GameConfig, board: Board) -> Self {
        let selection = SelectionMachine::new(config.rules.require_adjacent);
        Self {
            config,
            board,
            selection,
            pipeline: None,
            wait_ms: 0,
            events: Vec::new(),
            stats: Stats::default(),
            last_turn: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> Selection {
        self.selection.state()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn is_busy(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Stage the in-flight turn runs next, `Idle` when no turn is in flight
    pub fn stage(&self) -> Stage {
        self.pipeline
            .as_ref()
            .map(|p| p.stage())
            .unwrap_or(Stage::Idle)
    }

    /// Time left before the next stage may run
    pub fn pending_wait_ms(&self) -> u32 {
        self.wait_ms
    }

    /// Summary of the most recently finished turn
    pub fn last_turn(&self) -> Option<TurnSummary> {
        self.last_turn
    }

    /// Input at a world position
    pub fn tap_world(&mut self, pos: WorldPos) -> InputOutcome {
        let c = self.board.world_to_grid(pos);
        self.select(c)
    }

    /// Input at a grid coordinate
    pub fn select(&mut self, c: Coord) -> InputOutcome {
        if self.is_busy() {
            debug!("[Game] input at ({}, {}) rejected, turn in flight", c.x, c.y);
            return InputOutcome::Busy;
        }

        match self.selection.on_input(c, &self.board) {
            SelectOutcome::Ignored => InputOutcome::Ignored,
            SelectOutcome::Selected(at) => {
                self.events.push(GameEvent::Selected { at });
                InputOutcome::Selected(at)
            }
            SelectOutcome::Deselected(at) => {
                self.events.push(GameEvent::Deselected { at });
                InputOutcome::Deselected(at)
            }
            SelectOutcome::Reselected { from, to } => {
                self.events.push(GameEvent::Deselected { at: from });
                self.events.push(GameEvent::Selected { at: to });
                InputOutcome::Selected(to)
            }
            SelectOutcome::Move { from, to } => {
                debug!(
                    "[Game] move ({}, {}) -> ({}, {})",
                    from.x, from.y, to.x, to.y
                );
                self.pipeline = Some(MovePipeline::new(from, to));
                self.wait_ms = 0;
                self.advance();
                InputOutcome::MoveStarted { from, to }
            }
        }
    }

    /// Advance the in-flight turn by `elapsed_ms`
    ///
    /// Returns true when at least one stage ran.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.pipeline.is_none() {
            return false;
        }
        self.wait_ms = self.wait_ms.saturating_sub(elapsed_ms);
        self.advance()
    }

    /// Run the in-flight turn to completion, ignoring stage waits
    pub fn finish_turn(&mut self) -> Option<TurnSummary> {
        self.pipeline.as_ref()?;
        while self.pipeline.is_some() {
            self.wait_ms = 0;
            self.advance();
        }
        self.last_turn
    }

    /// Run stages until one asks for a wait or the turn ends
    fn advance(&mut self) -> bool {
        let mut ran = false;
        while self.wait_ms == 0 {
            let Some(pipeline) = self.pipeline.as_mut() else {
                break;
            };
            let step = pipeline.step(
                &mut self.board,
                &self.config.rules,
                &self.config.timings,
                &mut self.events,
            );
            ran = true;
            self.wait_ms = step.wait_ms;

            if pipeline.is_finished() {
                let summary = pipeline.summary();
                self.complete(summary);
            }
        }
        ran
    }

    fn complete(&mut self, summary: TurnSummary) {
        self.pipeline = None;
        self.wait_ms = 0;
        self.selection.reset();

        self.stats.moves += 1;
        self.stats.matches += summary.matched_passes;
        self.stats.gems_cleared += summary.gems_cleared;
        self.stats.cascades += summary.cascades();
        self.last_turn = Some(summary);

        info!(
            "[Game] turn {} finished: {} passes, {} gems cleared{}",
            self.stats.moves,
            summary.matched_passes,
            summary.gems_cleared,
            if summary.reverted { ", reverted" } else { "" }
        );
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild the board and clear stats
    ///
    /// `None` reuses the configured seed. Rejected (false) while a turn is in
    /// flight.
    pub fn restart(&mut self, seed: Option<u32>) -> bool {
        if self.is_busy() {
            return false;
        }
        let seed = seed.unwrap_or(self.config.board.seed);
        self.board.reset(seed);
        self.selection.reset();
        self.stats = Stats::default();
        self.last_turn = None;
        self.events.clear();
        info!("[Game] restarted with seed {}", seed);
        true
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(Coord, Option<&Gem>) + 'static,
    ) -> ObserverId {
        self.board.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.board.unsubscribe(id)
    }

    /// Fill a snapshot, reusing its allocation
    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.fill_from(&self.board);
        out.selected = self.selection.state().coord();
        out.stage = self.stage();
        out.busy = self.is_busy();
        out.stats = self.stats;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut snap = BoardSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }
}
