use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tunesync::{
    cli::{self, Services},
    config::{self, Config},
    error,
    management::DEFAULT_PAGE_LIMIT,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sync artists, their albums and tracks into the local catalog
    Sync(SyncOptions),

    /// Show an artist as the upstream catalog reports it
    Lookup(LookupOptions),

    /// Manage playlists
    #[command(subcommand)]
    Playlist(PlaylistCommand),

    /// Read or delete single tracks
    #[command(subcommand)]
    Track(TrackCommand),

    /// Serve the HTTP API
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SyncOptions {
    /// Spotify artist ids
    #[clap(required = true, num_args = 1..)]
    pub artist_ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LookupOptions {
    /// Spotify artist id
    pub artist_id: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlaylistCommand {
    /// Create an empty playlist
    Create {
        name: String,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        owner: String,
        /// Hide the playlist from other users
        #[clap(long)]
        private: bool,
    },

    /// Append a track to a playlist
    Add {
        playlist_id: String,
        track_id: String,
        #[clap(long)]
        owner: String,
    },

    /// Remove a track from a playlist
    Remove {
        playlist_id: String,
        track_id: String,
        #[clap(long)]
        owner: String,
    },

    /// Delete a playlist
    Delete {
        playlist_id: String,
        #[clap(long)]
        owner: String,
    },

    /// List the live playlists of an owner, newest first
    List {
        #[clap(long)]
        owner: String,
        #[clap(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
        #[clap(long, default_value_t = 0)]
        skip: usize,
    },

    /// Show a playlist's metadata
    Show { slug: String },

    /// List a page of a playlist's tracks in playlist order
    Tracks {
        slug: String,
        #[clap(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
        #[clap(long, default_value_t = 0)]
        skip: usize,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TrackCommand {
    /// Show a track and count it as played
    Show { track_id: String },

    /// Soft delete a track
    Delete { track_id: String },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
    {
        error!("Cannot initialize logging. Err: {}", e);
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let services = match Services::from_config(config).await {
        Ok(services) => services,
        Err(e) => error!("Cannot open catalog. Err: {}", e),
    };

    match cli.command {
        Command::Sync(opt) => cli::sync(&services, opt.artist_ids).await,
        Command::Lookup(opt) => cli::lookup(&services, opt.artist_id).await,
        Command::Playlist(cmd) => match cmd {
            PlaylistCommand::Create {
                name,
                description,
                owner,
                private,
            } => cli::create_playlist(&services, name, description, owner, private).await,
            PlaylistCommand::Add {
                playlist_id,
                track_id,
                owner,
            } => cli::add_playlist_track(&services, playlist_id, track_id, owner).await,
            PlaylistCommand::Remove {
                playlist_id,
                track_id,
                owner,
            } => cli::remove_playlist_track(&services, playlist_id, track_id, owner).await,
            PlaylistCommand::Delete { playlist_id, owner } => {
                cli::delete_playlist(&services, playlist_id, owner).await
            }
            PlaylistCommand::List { owner, limit, skip } => {
                cli::list_playlists(&services, owner, limit, skip).await
            }
            PlaylistCommand::Show { slug } => cli::show_playlist(&services, slug).await,
            PlaylistCommand::Tracks { slug, limit, skip } => {
                cli::list_playlist_tracks(&services, slug, limit, skip).await
            }
        },
        Command::Track(cmd) => match cmd {
            TrackCommand::Show { track_id } => cli::show_track(&services, track_id).await,
            TrackCommand::Delete { track_id } => cli::delete_track(&services, track_id).await,
        },
        Command::Serve => cli::serve(services).await,
        Command::Completions(_) => {}
    }
}
