use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrolldeck")]
#[command(author, version, about)]
#[command(long_about = "A scroll and slide presentation engine.\n\n\
    Slides reveal word by word as they come into view, with chapter\n\
    navigation, keyboard, wheel and swipe input.\n\n\
    Examples:\n  \
    scrolldeck talk.md                 Present as a slide deck (fullscreen)\n  \
    scrolldeck talk.md --windowed      Present in a window\n  \
    scrolldeck talk.md --scroll        Present as one scrolling page\n  \
    scrolldeck inspect talk.md --json  Dump the segmented slides")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long)]
    pub slide: Option<usize>,

    /// Present as a vertically scrolling page instead of a slide deck
    #[arg(long)]
    pub scroll: bool,

    /// Disable transitions and staggered reveals
    #[arg(long)]
    pub reduced_motion: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a deck is split, segmented and scheduled
    Inspect {
        /// Deck file to inspect
        file: PathBuf,

        /// Print machine-readable JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.mode, timing.settle_ms, input.wheel_cooldown_ms)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Inspect { file, json }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::inspect::run(&file, json)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("scrolldeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(crate::app::RunOptions {
                        file,
                        windowed: self.windowed,
                        start_slide: self.slide,
                        scroll: self.scroll,
                        reduced_motion: self.reduced_motion,
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_presentation_flags() {
        let cli = Cli::parse_from([
            "scrolldeck",
            "talk.md",
            "--scroll",
            "--slide",
            "3",
            "--windowed",
            "--reduced-motion",
            "-vv",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("talk.md")));
        assert!(cli.scroll);
        assert!(cli.windowed);
        assert!(cli.reduced_motion);
        assert_eq!(cli.slide, Some(3));
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_inspect_subcommand() {
        let cli = Cli::parse_from(["scrolldeck", "inspect", "talk.md", "--json"]);
        match cli.command {
            Some(Commands::Inspect { file, json }) => {
                assert_eq!(file, PathBuf::from("talk.md"));
                assert!(json);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn parses_config_set() {
        let cli = Cli::parse_from(["scrolldeck", "config", "set", "defaults.mode", "scroll"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Set { .. }
            })
        ));
    }
}
