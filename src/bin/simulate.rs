//! Headless simulator: seeded random play with instant stages.
//!
//! ```text
//! gem-crush-sim --seed 7 --turns 50
//! ```

use anyhow::Result;
use log::warn;

use gem_crush::cli::{load_config, parse_sim_args};
use gem_crush::core::StageTimings;
use gem_crush::engine::Game;
use gem_crush::sim::{play_turn, RandomPlayer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_sim_args(&args)?;
    let mut config = load_config(&args.game)?;
    config.timings = StageTimings::instant();

    let seed = config.board.seed;
    let mut game = Game::new(config)?;
    // Offset so the player's choices are not the board's gem stream.
    let mut player = RandomPlayer::new(seed.wrapping_add(0x9E37_79B9));

    println!(
        "seed {}  board {}x{}  turns {}",
        seed,
        game.board().width(),
        game.board().height(),
        args.turns
    );
    print!("{}", game.snapshot().to_text());

    for _ in 0..args.turns {
        let Some(report) = play_turn(&mut game, &mut player) else {
            warn!("[Sim] no move could be started, stopping");
            break;
        };
        let s = report.summary;
        println!(
            "turn {:>3}  ({},{})<->({},{})  {:<8}  cleared {:>3}  cascades {}{}",
            report.turn,
            report.from.x,
            report.from.y,
            report.to.x,
            report.to.y,
            if s.matched() { "match" } else { "no-match" },
            s.gems_cleared,
            s.cascades(),
            if s.reverted { "  reverted" } else { "" }
        );
    }

    let stats = game.stats();
    println!();
    print!("{}", game.snapshot().to_text());
    println!(
        "moves {}  matches {}  gems cleared {}  cascades {}",
        stats.moves, stats.matches, stats.gems_cleared, stats.cascades
    );
    Ok(())
}
