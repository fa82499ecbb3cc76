//! Terminal match-3 runner (default binary).
//!
//! Crossterm for keyboard and mouse input and a framebuffer renderer that only
//! writes changed cells. The game loop owns the [`Game`]; when the TCP adapter
//! is enabled it applies remote commands once per tick.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use log::{info, warn};

use gem_crush::adapter::Adapter;
use gem_crush::cli::{load_config, parse_game_args};
use gem_crush::core::{BoardSnapshot, GameConfig};
use gem_crush::engine::{Game, InputOutcome};
use gem_crush::input::{translate_event, BoardCursor, InputCommand, Tap};
use gem_crush::term::{AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, Viewport};
use gem_crush::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&parse_game_args(&args)?)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// `env_logger` with a `warn` default; `GEM_CRUSH_LOG_PATH` sends output to a file
fn init_logging() -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Ok(path) = std::env::var("GEM_CRUSH_LOG_PATH") {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to open log file {}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

struct App {
    game: Game,
    cursor: BoardCursor,
    view: GameView,
    snap: BoardSnapshot,
    adapter: Option<Adapter>,
}

fn run(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    let game = Game::new(config)?;
    let cursor = BoardCursor::new(game.board().width(), game.board().height());

    // The game stays playable from the keyboard if the port is taken.
    let adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!("[Adapter] not started: {:#}", e);
            None
        }
    };
    if let Some(a) = &adapter {
        info!("[Adapter] accepting clients on {}", a.local_addr());
    }

    let mut app = App {
        game,
        cursor,
        view: GameView::default(),
        snap: BoardSnapshot::default(),
        adapter,
    };
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        app.game.snapshot_into(&mut app.snap);
        let status = app.adapter.as_ref().map(|a| AdapterStatusView {
            port: a.local_addr().port(),
            commands: a.commands_applied(),
        });
        app.view.render_into_with_adapter(
            &app.snap,
            Some(app.cursor.coord()),
            status.as_ref(),
            viewport,
            &mut fb,
        );
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            let ev = event::read()?;
            if let Event::Resize(..) = ev {
                term.invalidate();
            }
            match translate_event(&ev) {
                Some(InputCommand::Quit) => return Ok(()),
                Some(InputCommand::Action(action)) => app.on_action(action),
                Some(InputCommand::Tap(tap)) => app.on_tap(tap, viewport),
                None => {}
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
            app.game.tick(elapsed_ms);

            match app.adapter.as_mut() {
                Some(adapter) => {
                    adapter.serve(&mut app.game);
                }
                None => {
                    app.game.take_events();
                }
            }
        }
    }
}

impl App {
    fn on_action(&mut self, action: GameAction) {
        match action {
            GameAction::Select => {
                self.game.select(self.cursor.coord());
            }
            GameAction::Restart => {
                let seed = self.game.board().seed().wrapping_add(1);
                self.game.restart(Some(seed));
            }
            other => {
                self.cursor.apply(other);
            }
        }
    }

    /// Mouse press: through world space, the same path any pointer input takes
    fn on_tap(&mut self, tap: Tap, viewport: Viewport) {
        let Some(pos) = self.view.screen_to_world(
            &self.snap,
            &self.game.config().board,
            viewport,
            tap.column,
            tap.row,
        ) else {
            return;
        };
        match self.game.tap_world(pos) {
            InputOutcome::Selected(c) | InputOutcome::Deselected(c) => self.cursor.move_to(c),
            InputOutcome::MoveStarted { to, .. } => self.cursor.move_to(to),
            InputOutcome::Ignored | InputOutcome::Busy => {}
        }
    }
}
