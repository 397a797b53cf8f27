use clap::{Parser, Subcommand, ValueEnum};
use vvc::model::{ContentKind, PostStatus};

#[derive(Parser, Debug)]
#[command(name = "vvc")]
#[command(version)]
#[command(about = "Hide posts and pages from anonymous visitors", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Post,
    Page,
}

impl From<KindArg> for ContentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Post => ContentKind::Post,
            KindArg::Page => ContentKind::Page,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Publish,
    Draft,
    Pending,
    Private,
    Trash,
}

impl From<StatusArg> for PostStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Publish => PostStatus::Publish,
            StatusArg::Draft => PostStatus::Draft,
            StatusArg::Pending => PostStatus::Pending,
            StatusArg::Private => PostStatus::Private,
            StatusArg::Trash => PostStatus::Trash,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the site directory
    Init,

    /// Add a post or page to the site
    Add {
        kind: KindArg,

        /// URL slug (a single path segment)
        slug: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Parent page id (pages only)
        #[arg(short, long)]
        parent: Option<u64>,

        #[arg(short, long, value_enum, default_value = "publish")]
        status: StatusArg,
    },

    /// List items with their visitor visibility
    #[command(alias = "ls")]
    List,

    /// Show one or more items to visitors
    Show {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Hide one or more items from visitors
    Hide {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Replay a front-end request and print what the visitor would get
    Check {
        /// Request URI, e.g. /about/ or /?page_id=3
        uri: String,

        /// Make the request as a logged-in user
        #[arg(long)]
        logged_in: bool,
    },

    /// Print the cached set of hidden pages
    HiddenPages,

    /// Backfill hidden flags on published items that have none
    Activate,

    /// Remove every visibility flag
    Uninstall,

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., site-url)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
