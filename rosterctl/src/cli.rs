use clap::{Args, Parser, Subcommand};
use roster_model::{UserId, ViewMode};
use std::path::PathBuf;

/// Manage users of a remote directory from the terminal
#[derive(Parser, Debug)]
#[command(name = "rosterctl", version)]
#[command(about = "Administer users of a reqres-style directory service")]
pub struct Cli {
    /// Configuration file (defaults to ./roster.toml when present)
    #[arg(long, global = true, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted session and preferences
    #[arg(long, global = true, env = "ROSTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long, env = "ROSTER_EMAIL")]
        email: String,

        /// Read from `ROSTER_PASSWORD` when not given
        #[arg(long, env = "ROSTER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Show who is signed in and until when
    Status,
    /// List, inspect and edit users
    #[command(subcommand)]
    Users(UsersCommand),
    /// Switch between light and dark theme
    Theme,
    /// Choose how `users list` lays out its output
    View {
        /// `table` or `card`
        mode: ViewMode,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List one page of users
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Only show users whose name or email contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single user
    Show { id: UserId },
    /// Create a user
    Create(UserFields),
    /// Update a user; omitted fields keep their current value
    Update {
        id: UserId,

        #[command(flatten)]
        fields: UserUpdate,
    },
    /// Delete a user
    Delete { id: UserId },
}

#[derive(Debug, Args)]
pub struct UserFields {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Absolute URL of the avatar image
    #[arg(long)]
    pub avatar: String,
}

#[derive(Debug, Args)]
pub struct UserUpdate {
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn is_complete(&self) -> bool {
        self.email.is_some()
            && self.first_name.is_some()
            && self.last_name.is_some()
            && self.avatar.is_some()
    }
}
