//! Command-line surface for `postdeck-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "postdeck-cli", version, about = "Headless client for the remote post resource", long_about = None)]
pub struct Cli {
    /// Collection URL of the post resource, e.g. <https://jsonplaceholder.typicode.com/posts>
    #[arg(long, env = "POSTDECK_API_URL")]
    pub api_url: Option<String>,

    /// Abort requests that take longer than this many seconds
    #[arg(long, env = "POSTDECK_TIMEOUT_SECONDS")]
    pub timeout_seconds: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List posts, optionally for a single user
    List {
        #[arg(long, allow_hyphen_values = true)]
        user_id: Option<String>,
    },
    /// Fetch one post
    Get { id: String },
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        user_id: String,
    },
    /// Replace every field of a post
    Replace {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        user_id: String,
    },
    /// Change some fields of a post
    Patch {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        user_id: Option<i64>,
    },
    /// Delete a post
    Delete { id: String },
}
