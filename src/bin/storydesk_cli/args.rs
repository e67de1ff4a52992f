//! Command-line surface for `storydesk-cli`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use storydesk::application::posts::DeletePolicy;
use storydesk::config::GlobalOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "storydesk-cli",
    version,
    about = "Storydesk content admin CLI",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regions
    Regions(EntityArgs),
    /// Countries (each belongs to a region)
    Countries(EntityArgs),
    /// Sectors
    Sectors(EntityArgs),
    /// Sub-sectors (each belongs to a sector)
    SubSectors(EntityArgs),
    /// Signal categories
    Signals(EntityArgs),
    /// Signal sub-categories
    SubSignals(EntityArgs),
    /// Companies
    Companies(EntityArgs),
    /// Content sources
    Sources(EntityArgs),
    /// Themes
    Themes(EntityArgs),
    /// Market data points
    MarketData(EntityArgs),
    /// Query refiners
    QueryRefiners(EntityArgs),
    /// Clarification guidance
    ClarificationGuidance(EntityArgs),
    /// User records
    Users(EntityArgs),
    /// Contexts (raw records; see `stories` for post order)
    Contexts(EntityArgs),
    /// Posts, kept in step with the contexts that list them
    Posts(PostsArgs),
    /// Ordered post lists of contexts
    Stories(StoriesArgs),
    /// Sign-in and account management
    Auth(AuthArgs),
    /// Reference collections used for tagging
    MasterData(MasterDataArgs),
}

#[derive(Parser, Debug)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub action: EntityCmd,
}

#[derive(Subcommand, Debug)]
pub enum EntityCmd {
    /// List records page by page
    List(ListArgs),
    /// Show one record
    Get { id: String },
    /// Create a record from JSON
    Create(PayloadArgs),
    /// Merge JSON fields into an existing record and save it
    Update {
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Delete a record
    Delete { id: String },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Page size (defaults to `pagination.default_limit`)
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
    /// Fetch every page and print the whole collection
    #[arg(long, conflicts_with_all = ["page", "limit", "search"])]
    pub all: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PayloadArgs {
    /// Inline JSON record
    #[arg(long)]
    pub data: Option<String>,
    /// File containing the JSON record (takes precedence over --data)
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// List posts
    List(ListArgs),
    /// Show one post
    Get { id: String },
    /// Create or update a post and link it into contexts
    Save {
        #[command(flatten)]
        payload: PayloadArgs,
        /// Context ids to link the post into (comma separated)
        #[arg(long, value_delimiter = ',')]
        contexts: Vec<String>,
        /// Show the post in the contexts' container view
        #[arg(long)]
        include_in_container: bool,
    },
    /// Contexts currently listing a post
    Contexts { id: String },
    /// Delete a post
    Delete {
        id: String,
        /// Override `sync.delete_policy`
        #[arg(long)]
        policy: Option<DeletePolicyArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DeletePolicyArg {
    Detach,
    Orphan,
}

impl From<DeletePolicyArg> for DeletePolicy {
    fn from(value: DeletePolicyArg) -> Self {
        match value {
            DeletePolicyArg::Detach => DeletePolicy::Detach,
            DeletePolicyArg::Orphan => DeletePolicy::Orphan,
        }
    }
}

#[derive(Parser, Debug)]
pub struct StoriesArgs {
    #[command(subcommand)]
    pub action: StoriesCmd,
}

#[derive(Subcommand, Debug)]
pub enum StoriesCmd {
    /// Show a context's posts in order
    View {
        context_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set a new post order; every current post must be listed once
    Reorder {
        context_id: String,
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<String>,
    },
    /// Show a post in the container view
    Include { context_id: String, post_id: String },
    /// Hide a post from the container view
    Exclude { context_id: String, post_id: String },
}

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthCmd,
}

#[derive(Subcommand, Debug)]
pub enum AuthCmd {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session without its token
    Status,
    /// Fetch the signed-in account
    Account,
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Ask for a password reset mail
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct PasswordArgs {
    /// File containing the password (takes precedence over env)
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Password from env (CLI flag intentionally disabled to avoid shell history leaks)
    #[arg(hide = true, env = "STORYDESK_PASSWORD")]
    pub password_env: Option<String>,
}

#[derive(Parser, Debug)]
pub struct MasterDataArgs {
    #[command(subcommand)]
    pub action: MasterDataCmd,
}

#[derive(Subcommand, Debug)]
pub enum MasterDataCmd {
    /// Record counts per reference collection
    Summary,
    /// Every reference collection in full
    Dump,
}
