use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::store::HabitFilter;

#[derive(Parser)]
#[command(
    name = "hb",
    about = concat!("habita v", env!("CARGO_PKG_VERSION"), " - build good habits, one day at a time"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the active profile's habits
    List(ListArgs),
    /// Add a habit
    Add(AddArgs),
    /// Mark a habit complete for today
    Done(DoneArgs),
    /// Edit a habit's name, target, or category
    Edit(EditArgs),
    /// Delete one habit, or all of them
    Delete(DeleteArgs),
    /// Show habit statistics for the active profile
    Stats,
    /// Show completions over the last seven days
    History,
    /// List habits grouped by category
    Categories,
    /// Export the active profile's habits to a text file
    Export,
    /// Seed five sample habits
    Demo,
    /// Profile management
    Profile(ProfileCmd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for HabitFilter {
    fn from(filter: FilterArg) -> HabitFilter {
        match filter {
            FilterArg::All => HabitFilter::All,
            FilterArg::Active => HabitFilter::Active,
            FilterArg::Completed => HabitFilter::Completed,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by weekly status
    #[arg(long, value_enum, default_value = "all")]
    pub filter: FilterArg,
}

#[derive(Args)]
pub struct AddArgs {
    /// Habit name
    pub name: String,
    /// Weekly target (1-7 times per week)
    #[arg(short, long, default_value_t = 7)]
    pub target: u32,
    /// Category bucket
    #[arg(short, long, default_value = "General")]
    pub category: String,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Habit number as shown by `hb list`
    pub number: usize,
}

#[derive(Args)]
pub struct EditArgs {
    /// Habit number as shown by `hb list`
    pub number: usize,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New weekly target (1-7)
    #[arg(short, long)]
    pub target: Option<u32>,
    /// New category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Habit number as shown by `hb list`
    pub number: Option<usize>,
    /// Delete every habit of the active profile
    #[arg(long, conflicts_with = "number")]
    pub all: bool,
}

#[derive(Args)]
pub struct ProfileCmd {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,
    /// Create a profile and make it active
    Create {
        /// Profile name
        name: String,
    },
    /// Switch the active profile
    Switch {
        /// Profile name
        name: String,
    },
    /// Delete a profile (the last one cannot be deleted)
    Delete {
        /// Profile name
        name: String,
    },
}
