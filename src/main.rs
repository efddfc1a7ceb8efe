use anyhow::Result;
use clap::{CommandFactory, Parser};
use wordseg::app::{
    Verbosity, run_dibs_command, run_eval_command, run_gold_command, run_prep_command,
    run_puddle_command, run_tp_command,
};
use wordseg::cli::{Cli, Commands};
use wordseg::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity {
        quiet: cli.quiet,
        level: cli.verbose,
    };

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "wordseg", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(phone) = cli.phone_sep {
        config.separator.phone = phone;
    }
    if let Some(syllable) = cli.syllable_sep {
        config.separator.syllable = syllable;
    }
    if let Some(word) = cli.word_sep {
        config.separator.word = word;
    }

    match cli.command {
        Commands::Prep {
            io,
            unit,
            tolerant,
            gold,
        } => {
            config.validate()?;
            run_prep_command(
                &config,
                io.input.as_deref(),
                io.output.as_deref(),
                unit,
                tolerant,
                gold.as_deref(),
                verbosity,
            )?;
        }
        Commands::Gold { io } => {
            config.validate()?;
            run_gold_command(&config, io.input.as_deref(), io.output.as_deref())?;
        }
        Commands::Tp {
            io,
            threshold,
            dependency,
        } => {
            if let Some(t) = threshold {
                config.tp.threshold = t;
            }
            if let Some(d) = dependency {
                config.tp.dependency = d;
            }
            config.validate()?;
            run_tp_command(&config, io.input.as_deref(), io.output.as_deref(), verbosity)?;
        }
        Commands::Puddle {
            io,
            window,
            by_frequency,
            train,
            folding,
        } => {
            if let Some(w) = window {
                config.puddle.window = w;
            }
            if by_frequency {
                config.puddle.by_frequency = true;
            }
            if let Some(n) = folding.nfolds {
                config.folding.nfolds = n;
            }
            if let Some(j) = folding.njobs {
                config.folding.njobs = j;
            }
            config.validate()?;
            run_puddle_command(
                &config,
                io.input.as_deref(),
                io.output.as_deref(),
                train.as_deref(),
                verbosity,
            )?;
        }
        Commands::Dibs {
            io,
            train,
            kind,
            threshold,
            pwb,
            unit,
        } => {
            if let Some(k) = kind {
                config.dibs.kind = k;
            }
            if let Some(t) = threshold {
                config.dibs.threshold = t;
            }
            if pwb.is_some() {
                config.dibs.pwb = pwb;
            }
            if let Some(u) = unit {
                config.dibs.unit = u;
            }
            config.validate()?;
            run_dibs_command(
                &config,
                io.input.as_deref(),
                io.output.as_deref(),
                &train,
                verbosity,
            )?;
        }
        Commands::Eval {
            hypothesis,
            gold,
            json,
            output,
        } => {
            run_eval_command(&hypothesis, &gold, json, output.as_deref())?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/wordseg/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}
