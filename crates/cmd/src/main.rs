// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use cmd::commands::{
    cat_command, list_command, mkdir_command, mv_command, put_command, rm_command, rows_command,
    stat_command, write_at_command,
};
use cmd::common::open_filesystem;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bfs")]
struct Cli {
    /// YAML configuration file (defaults to $BFS_CONFIG, then the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file
    Cat {
        /// Path as container/key
        path: String,
        /// Start reading at this byte offset
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Create or replace a file from stdin or --content
    Put {
        path: String,
        #[arg(short, long)]
        content: Option<String>,
        /// Create missing parent directories
        #[arg(short, long)]
        parents: bool,
    },
    /// Overwrite bytes of an existing file at an offset
    WriteAt {
        path: String,
        offset: u64,
        data: String,
    },
    /// List a directory
    Ls {
        path: String,
    },
    /// Show file or directory metadata
    Stat {
        path: String,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parents; existing directories are not an error
        #[arg(short, long)]
        parents: bool,
    },
    /// Remove a file, or a whole tree with -r
    Rm {
        path: String,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Move a file or directory within a container
    Mv {
        source: String,
        dest: String,
    },
    /// Print a file row by row (lines, or JSON elements for *.json)
    Rows {
        path: String,
    },
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut content = Vec::new();
    _ = std::io::stdin()
        .read_to_end(&mut content)
        .map_err(|e| anyhow!("Failed to read stdin: {}", e))?;
    Ok(content)
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let fs = open_filesystem(cli.config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Cat { path, offset } => cat_command(&fs, &path, offset, &mut out).await,
        Commands::Put {
            path,
            content,
            parents,
        } => {
            let content = match content {
                Some(text) => text.into_bytes(),
                None => read_stdin()?,
            };
            put_command(&fs, &path, &content, parents).await
        }
        Commands::WriteAt { path, offset, data } => {
            let size = write_at_command(&fs, &path, offset, data.as_bytes()).await?;
            writeln!(out, "{}", size).map_err(|e| anyhow!("Failed to write to stdout: {}", e))
        }
        Commands::Ls { path } => list_command(&fs, &path, &mut out).await,
        Commands::Stat { path } => stat_command(&fs, &path, &mut out).await,
        Commands::Mkdir { path, parents } => mkdir_command(&fs, &path, parents).await,
        Commands::Rm { path, recursive } => rm_command(&fs, &path, recursive).await,
        Commands::Mv { source, dest } => mv_command(&fs, &source, &dest).await,
        Commands::Rows { path } => rows_command(&fs, &path, &mut out).await.map(|_| ()),
    }
}
