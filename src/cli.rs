//! Command line arguments and config layering for the binaries.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::core::GameConfig;

/// Turns played by the simulator when `--turns` is absent
pub const DEFAULT_SIM_TURNS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameArgs {
    pub config: Option<PathBuf>,
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimArgs {
    pub game: GameArgs,
    pub turns: u32,
}

/// `gem-crush [--config <path>] [--seed <n>]`
pub fn parse_game_args(args: &[String]) -> Result<GameArgs> {
    parse(args, false).map(|(game, _)| game)
}

/// `gem-crush-sim [--config <path>] [--seed <n>] [--turns <n>]`
pub fn parse_sim_args(args: &[String]) -> Result<SimArgs> {
    let (game, turns) = parse(args, true)?;
    Ok(SimArgs {
        game,
        turns: turns.unwrap_or(DEFAULT_SIM_TURNS),
    })
}

fn parse(args: &[String], allow_turns: bool) -> Result<(GameArgs, Option<u32>)> {
    let mut game = GameArgs::default();
    let mut turns = None;

    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "--seed" | "--turns" => {
                if flag == "--turns" && !allow_turns {
                    return Err(anyhow!("unknown argument: {}", flag));
                }
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for {}", flag))?;
                match flag {
                    "--config" => game.config = Some(PathBuf::from(v)),
                    "--seed" => {
                        game.seed = Some(
                            v.parse::<u32>()
                                .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                        )
                    }
                    _ => {
                        turns = Some(
                            v.parse::<u32>()
                                .map_err(|_| anyhow!("invalid --turns value: {}", v))?,
                        )
                    }
                }
            }
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok((game, turns))
}

/// Defaults, then the `--config` file, then `GEM_CRUSH_*` variables, then `--seed`
pub fn load_config(args: &GameArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    config
        .apply_env()
        .context("applying environment overrides")?;
    if let Some(seed) = args.seed {
        config.board.seed = seed;
    }
    config.validate()?;
    Ok(config)
}
