use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hazri", version, author, about = "Attendance planner for college lectures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Lecture counts; anything left out falls back to the last saved values.
#[derive(Args, Debug, Clone, Default)]
pub struct CountArgs {
    /// Lectures conducted so far
    #[arg(short, long)]
    pub conducted: Option<u32>,
    /// Lectures attended so far
    #[arg(short, long)]
    pub attended: Option<u32>,
    /// Conducted lectures where attendance was not taken
    #[arg(short = 'n', long)]
    pub no_attendance: Option<u32>,
    /// Target percentage (defaults to the configured target)
    #[arg(short, long)]
    pub target: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub counts: CountArgs,
    /// Division whose timetable to plan against
    #[arg(short, long)]
    pub division: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Current percentage, lectures needed and lectures you can miss
    Calc {
        #[command(flatten)]
        counts: CountArgs,
        /// Remember these counts for next time
        #[arg(long)]
        save: bool,
    },
    /// Recommended lectures to attend for one strategy mode
    Plan {
        #[command(flatten)]
        args: PlanArgs,
        /// Strategy mode: easy, medium or hard
        #[arg(short, long)]
        mode: Option<String>,
        /// Show at most this many recommended lectures
        #[arg(long, default_value = "15")]
        limit: usize,
    },
    /// Compare easy, medium and hard side by side
    Compare {
        #[command(flatten)]
        args: PlanArgs,
    },
    /// What-if: attend or skip the next N lectures
    Simulate {
        #[command(flatten)]
        counts: CountArgs,
        /// Attend the next N lectures
        #[arg(long, conflicts_with = "skip")]
        attend: Option<u32>,
        /// Skip the next N lectures
        #[arg(long)]
        skip: Option<u32>,
    },
    /// Show a division's weekly timetable
    Timetable {
        /// Division to show (defaults to the configured one)
        #[arg(short, long)]
        division: Option<String>,
        /// List lectures for the next N teaching days instead of the grid
        #[arg(long)]
        upcoming: Option<usize>,
        /// Check every faculty code against the faculty directory
        #[arg(long)]
        check: bool,
    },
    /// List available divisions by section
    Divisions,
    /// Settings wizard (division, target, mode, teaching end)
    Settings {
        /// Reset settings to defaults before opening the wizard
        #[arg(long)]
        reset: bool,
    },
    /// Answer a JSON request the way the web API does
    Api {
        #[command(subcommand)]
        route: ApiCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApiCommands {
    /// POST /api/attendance/calculate
    Calculate {
        /// JSON body file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// POST /api/recommendation
    Recommend {
        /// JSON body file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// GET /api/attendance/history
    History,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_counts_and_mode() {
        let cli = Cli::try_parse_from([
            "hazri", "plan", "-c", "100", "-a", "60", "-t", "75", "--mode", "hard", "-d", "6B21",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Plan { args, mode, limit }) => {
                assert_eq!(args.counts.conducted, Some(100));
                assert_eq!(args.counts.attended, Some(60));
                assert_eq!(args.counts.target, Some(75.0));
                assert_eq!(args.division.as_deref(), Some("6B21"));
                assert_eq!(mode.as_deref(), Some("hard"));
                assert_eq!(limit, 15);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn simulate_takes_one_direction() {
        assert!(Cli::try_parse_from(["hazri", "simulate", "--attend", "3", "--skip", "2"]).is_err());
        assert!(Cli::try_parse_from(["hazri", "simulate", "--skip", "2"]).is_ok());
    }

    #[test]
    fn no_subcommand_opens_dashboard() {
        let cli = Cli::try_parse_from(["hazri"]).unwrap();
        assert!(cli.command.is_none());
    }
}
