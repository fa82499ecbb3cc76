//! Move pipeline - one turn as an explicit stage machine
//!
//! `Swapping → Matching → Exploding → Falling → Refilling → (Matching …) → Idle`
//!
//! Each call to [`MovePipeline::step`] runs exactly one stage against the board,
//! appends that stage's events, and returns how long the host should let the
//! stage play before calling `step` again. Those waits are the suspension points
//! of a turn; nothing else yields.
//!
//! A swap that finds no match still counts as a move. With
//! [`TurnPolicy::revert_unmatched_swaps`] the pair is swapped back in an extra
//! `Reverting` stage. With [`TurnPolicy::chain_cascades`] the pipeline goes back
//! to `Matching` after every refill until a pass finds nothing or
//! `max_cascades` passes have run.

use std::collections::BTreeSet;

use log::debug;

use crate::core::{Board, StageTimings, TurnPolicy};
use crate::types::{Coord, GameEvent, Stage};

/// What one `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub ran: Stage,
    pub next: Stage,
    pub wait_ms: u32,
}

/// Totals for a finished (or in-flight) turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnSummary {
    /// Matching passes that found at least one run
    pub matched_passes: u32,
    pub gems_cleared: u32,
    pub reverted: bool,
}

impl TurnSummary {
    pub fn matched(&self) -> bool {
        self.matched_passes > 0
    }

    /// Matching passes after the first that found runs
    pub fn cascades(&self) -> u32 {
        self.matched_passes.saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub struct MovePipeline {
    stage: Stage,
    a: Coord,
    b: Coord,
    matches: BTreeSet<Coord>,
    passes: u32,
    summary: TurnSummary,
}

impl MovePipeline {
    /// A turn swapping `a` and `b`, positioned before its first stage
    pub fn new(a: Coord, b: Coord) -> Self {
        Self {
            stage: Stage::Swapping,
            a,
            b,
            matches: BTreeSet::new(),
            passes: 0,
            summary: TurnSummary::default(),
        }
    }

    /// Stage the next `step` will run (`Idle` once the turn is over)
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pair(&self) -> (Coord, Coord) {
        (self.a, self.b)
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Idle
    }

    pub fn summary(&self) -> TurnSummary {
        self.summary
    }

    /// Run the current stage
    pub fn step(
        &mut self,
        board: &mut Board,
        policy: &TurnPolicy,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> StepResult {
        let ran = self.stage;
        let (next, wait_ms) = match ran {
            Stage::Idle => (Stage::Idle, 0),
            Stage::Swapping => self.swap(board, timings, events),
            Stage::Matching => self.find(board, policy, events),
            Stage::Exploding => self.explode(board, timings, events),
            Stage::Falling => self.fall(board, timings, events),
            Stage::Refilling => self.refill(board, policy, timings, events),
            Stage::Reverting => self.revert(board, timings, events),
        };

        if ran != Stage::Idle {
            debug!(
                "[Pipeline] {} -> {} (wait {}ms)",
                ran.as_str(),
                next.as_str(),
                wait_ms
            );
        }

        if next == Stage::Idle && ran != Stage::Idle {
            events.push(GameEvent::TurnFinished {
                matched: self.summary.matched(),
                cascades: self.summary.cascades(),
            });
        }

        self.stage = next;
        StepResult { ran, next, wait_ms }
    }

    fn swap(
        &mut self,
        board: &mut Board,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        let (a, b) = (self.a, self.b);
        events.push(GameEvent::SwapStarted { a, b });
        board.swap(a, b);
        events.push(GameEvent::SwapFinished { a, b });
        (Stage::Matching, timings.swap_ms)
    }

    fn find(
        &mut self,
        board: &mut Board,
        policy: &TurnPolicy,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        self.matches = board.find_matches();
        self.passes += 1;

        if self.matches.is_empty() {
            // Only the player's own swap gets no-match feedback; a quiet board
            // after a cascade is the normal end of a turn.
            if self.passes == 1 {
                events.push(GameEvent::NoMatch);
                if policy.revert_unmatched_swaps {
                    return (Stage::Reverting, 0);
                }
            }
            return (Stage::Idle, 0);
        }

        events.push(GameEvent::MatchFound {
            count: self.matches.len() as u32,
            cascade: self.passes - 1,
        });
        self.summary.matched_passes += 1;
        (Stage::Exploding, 0)
    }

    fn explode(
        &mut self,
        board: &mut Board,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        events.push(GameEvent::Pop);
        let matches = std::mem::take(&mut self.matches);
        let removed = board.explode(matches);
        for &(at, gem) in &removed {
            events.push(GameEvent::Exploded { at, gem });
        }
        self.summary.gems_cleared += removed.len() as u32;
        (Stage::Falling, step_wait(timings.explode_step_ms, removed.len()))
    }

    fn fall(
        &mut self,
        board: &mut Board,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        let falls = board.collapse();
        for f in &falls {
            events.push(GameEvent::Fell {
                gem: f.gem,
                from: f.from,
                to: f.to,
            });
        }
        (Stage::Refilling, step_wait(timings.fall_step_ms, falls.len()))
    }

    fn refill(
        &mut self,
        board: &mut Board,
        policy: &TurnPolicy,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        let spawned = board.refill();
        for &(at, gem) in &spawned {
            events.push(GameEvent::Refilled { at, gem });
        }
        let next = if policy.chain_cascades && self.passes < policy.max_cascades {
            Stage::Matching
        } else {
            Stage::Idle
        };
        (next, step_wait(timings.refill_step_ms, spawned.len()))
    }

    fn revert(
        &mut self,
        board: &mut Board,
        timings: &StageTimings,
        events: &mut Vec<GameEvent>,
    ) -> (Stage, u32) {
        let (a, b) = (self.a, self.b);
        board.swap(a, b);
        self.summary.reverted = true;
        events.push(GameEvent::SwapReverted { a, b });
        (Stage::Idle, timings.swap_ms)
    }
}

/// `per_step` for each of `steps`, saturating at `u32::MAX`
fn step_wait(per_step: u32, steps: usize) -> u32 {
    per_step.saturating_mul(u32::try_from(steps).unwrap_or(u32::MAX))
}
