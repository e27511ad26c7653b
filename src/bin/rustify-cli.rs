use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rustify::config::parse_scopes;
use rustify::{ClientConfig, ResourceKind, Spotify, Token};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rustify-cli")]
#[command(about = "Command-line client for the Spotify Web API", long_about = None)]
struct Cli {
    /// Application client ID
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    client_id: String,

    /// Application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Redirect URI registered for the app
    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// Space separated OAuth scopes
    #[arg(long, env = "SPOTIFY_SCOPES", default_value = "")]
    scopes: String,

    /// Override the API host (e.g. a local mock server)
    #[arg(long, env = "SPOTIFY_BASE_URL")]
    base_url: Option<String>,

    /// JSON file holding a user token, read at start and rewritten on exit
    #[arg(long, env = "SPOTIFY_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URL a user visits to authorize the app
    AuthorizeUrl {
        /// Value echoed back on the redirect
        #[arg(long)]
        state: Option<String>,

        /// Always show the consent dialog
        #[arg(long)]
        show_dialog: bool,
    },
    /// Trade an authorization code (or the full redirect URL) for a user token
    Exchange {
        code_or_url: String,

        /// Expected state when a redirect URL is given
        #[arg(long)]
        state: Option<String>,
    },
    /// Show a track
    Track { id_or_url: String },
    /// Show an album with its track list
    Album { id_or_url: String },
    /// Show an artist and their top tracks
    Artist {
        id_or_url: String,

        /// Market for top tracks
        #[arg(long, default_value = "US")]
        country: String,
    },
    /// Search the catalog
    Search {
        query: String,

        #[arg(short, long, value_enum, default_value_t = SearchType::Track)]
        r#type: SearchType,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// List the entries of a playlist
    Playlist { id_or_url: String },
    /// Append tracks to a playlist
    AddTracks {
        playlist: String,

        /// Track ids, URIs or links
        #[arg(required = true)]
        tracks: Vec<String>,

        /// Insert at this index instead of appending
        #[arg(long)]
        position: Option<usize>,
    },
    /// List playback devices
    Devices,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SearchType {
    Track,
    Album,
    Artist,
    Playlist,
}

impl From<SearchType> for ResourceKind {
    fn from(t: SearchType) -> Self {
        match t {
            SearchType::Track => ResourceKind::Track,
            SearchType::Album => ResourceKind::Album,
            SearchType::Artist => ResourceKind::Artist,
            SearchType::Playlist => ResourceKind::Playlist,
        }
    }
}

fn load_token(path: &Path) -> Result<Option<Token>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn save_token(path: &Path, token: &Token) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(token)?)?;
    info!("Saved token to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rustify=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(&cli.client_id, &cli.client_secret).with_scopes(parse_scopes(&cli.scopes));
    if let Some(redirect_uri) = &cli.redirect_uri {
        config = config.with_redirect_uri(redirect_uri);
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }

    let token = match &cli.token_file {
        Some(path) => load_token(path)?,
        None => None,
    };
    let spotify = match token {
        Some(token) => Spotify::with_token(config, token)?,
        None => Spotify::new(config)?,
    };

    execute(&cli, &spotify).await
}

/// Run the command, then persist the user token even when the command failed.
async fn execute(cli: &Cli, spotify: &Spotify) -> Result<(), Box<dyn std::error::Error>> {
    let result = run(cli, spotify).await;
    if let Some(path) = &cli.token_file {
        if let Some(token) = spotify.token().await {
            if token.refresh_token.is_some() {
                if let Err(err) = save_token(path, &token) {
                    if result.is_ok() {
                        return Err(err);
                    }
                    warn!("Could not save token to {}: {}", path.display(), err);
                }
            }
        }
    }
    result
}

async fn run(cli: &Cli, spotify: &Spotify) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::AuthorizeUrl { state, show_dialog } => {
            let mut oauth = spotify.oauth()?.with_show_dialog(*show_dialog);
            if let Some(state) = state {
                oauth = oauth.with_state(state);
            }
            for scope in oauth.unknown_scopes() {
                eprintln!("warning: unknown scope {}", scope);
            }
            println!("{}", oauth);
        }
        Commands::Exchange { code_or_url, state } => {
            let code = if code_or_url.starts_with("http://") || code_or_url.starts_with("https://") {
                let mut oauth = spotify.oauth()?;
                if let Some(state) = state {
                    oauth = oauth.with_state(state);
                }
                oauth.parse_callback(code_or_url)?
            } else {
                code_or_url.clone()
            };
            let token = spotify.exchange_code(&code, None).await?;
            println!("Authorized, scopes: {}", token.scopes.iter().cloned().collect::<Vec<_>>().join(" "));
            if cli.token_file.is_none() {
                println!("{}", serde_json::to_string_pretty(&token)?);
            }
        }
        Commands::Track { id_or_url } => {
            let track = spotify.track(id_or_url, None).await?;
            println!("{} - {}", track.artists_string(", "), track.name);
            if let Some(album) = &track.album {
                println!("   Album: {}", album.name);
            }
            println!("   Duration: {}", track.duration_formatted());
            println!("   URI: {}", track.uri);
        }
        Commands::Album { id_or_url } => {
            let album = spotify.album(id_or_url, None).await?;
            println!("{} - {} ({})", album.artists_string(", "), album.name, album.release_date);
            for track in album.all_tracks(spotify).await? {
                println!(
                    "{:>2}. {} [{}]",
                    track.track_number,
                    track.name,
                    track.duration_formatted()
                );
            }
        }
        Commands::Artist { id_or_url, country } => {
            let artist = spotify.artist(id_or_url).await?;
            println!("{}", artist.name);
            if !artist.genres.is_empty() {
                println!("   Genres: {}", artist.genres.join(", "));
            }
            if let Some(followers) = &artist.followers {
                println!("   Followers: {}", followers.total);
            }
            println!("   Top tracks:");
            for (i, track) in artist.top_tracks(spotify, country).await?.iter().enumerate() {
                println!("   {}. {}", i + 1, track.name);
            }
        }
        Commands::Search { query, r#type, limit } => {
            println!("Searching for '{}'...", query);
            let results = spotify
                .search(query, &[(*r#type).into()], *limit, 0, None)
                .await?;
            for (i, track) in results.tracks.iter().flat_map(|p| &p.items).enumerate() {
                println!("{}. {} - {} ({})", i + 1, track.artists_string(", "), track.name, track.id);
            }
            for (i, album) in results.albums.iter().flat_map(|p| &p.items).enumerate() {
                println!("{}. {} - {} ({})", i + 1, album.artists_string(", "), album.name, album.id);
            }
            for (i, artist) in results.artists.iter().flat_map(|p| &p.items).enumerate() {
                println!("{}. {} ({})", i + 1, artist.name, artist.id);
            }
            for (i, playlist) in results.playlists.iter().flat_map(|p| &p.items).enumerate() {
                println!("{}. {} by {} ({})", i + 1, playlist.name, playlist.owner.name(), playlist.id);
            }
        }
        Commands::Playlist { id_or_url } => {
            let playlist = spotify.playlist(id_or_url, None).await?;
            println!("{} by {} ({} tracks)", playlist.name, playlist.owner.name(), playlist.total_tracks());
            let mut entries = playlist.tracks(spotify)?;
            let mut index = 0;
            while let Some(entry) = entries.next().await? {
                index += 1;
                match entry.track {
                    Some(track) => println!("{:>3}. {} - {}", index, track.artists_string(", "), track.name),
                    None => println!("{:>3}. (unavailable)", index),
                }
            }
        }
        Commands::AddTracks {
            playlist,
            tracks,
            position,
        } => {
            match spotify.add_tracks(playlist, tracks, *position).await? {
                Some(snapshot) => println!("Added {} tracks, snapshot {}", tracks.len(), snapshot),
                None => println!("Added {} tracks", tracks.len()),
            }
        }
        Commands::Devices => {
            for device in spotify.devices().await? {
                println!(
                    "{} {} [{}] {}",
                    if device.is_active { "*" } else { " " },
                    device.name,
                    device.type_,
                    device.id.as_deref().unwrap_or("?")
                );
            }
        }
    }

    Ok(())
}
