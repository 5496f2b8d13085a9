use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use setlist::config::{Config, DEFAULT_CONFIG_FILE};
use setlist::{Gateway, PlaylistService, PlaylistStore, RodioEngine, Track};

#[derive(Parser)]
#[command(version, about = "Organize local audio files into named playlists")]
struct Args {
    /// Config file with the playlist location
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "SETLIST_CONFIG")]
    config: PathBuf,

    /// Use this playlist document instead of the configured one
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List saved playlists
    List,
    /// Print the tracks of a playlist
    Show { name: String },
    /// Save files as a playlist, replacing any playlist with the same name
    Save {
        name: String,
        /// Event label for every track
        #[arg(short, long, default_value = "")]
        event: String,
        #[arg(short, long, default_value_t = 1.0)]
        volume: f64,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Play one file until it ends
    Play {
        file: PathBuf,
        #[arg(short, long, default_value_t = 1.0)]
        volume: f64,
    },
}

/// INITIALISES APP
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let store_path = match args.store {
        Some(path) => path,
        None => Config::load_or_init(&args.config)
            .playlist_path()
            .context("could not prepare playlist directory")?,
    };
    info!(store = %store_path.display(), "using playlist store");

    let mut service = PlaylistService::new(
        PlaylistStore::new(store_path),
        Gateway::new(RodioEngine::new()),
    );

    match args.command {
        Command::List => {
            for name in service.playlist_names()? {
                println!("{}", name);
            }
        }
        Command::Show { name } => {
            let tracks = service
                .load_playlist(&name)
                .with_context(|| format!("could not load playlist {:?}", name))?;
            for track in tracks {
                println!(
                    "{:>3}  {:<20}  {:<30}  {:>4.0}%  {}",
                    track.sequence,
                    track.event,
                    track.name,
                    track.volume * 100.0,
                    track.file_path
                );
            }
        }
        Command::Save {
            name,
            event,
            volume,
            files,
        } => {
            let tracks: Vec<Track> = files
                .iter()
                .zip(1..)
                .map(|(path, sequence)| Track::from_path(sequence, event.as_str(), path, volume))
                .collect();
            service
                .save_playlist(&name, &tracks)
                .with_context(|| format!("could not save playlist {:?}", name))?;
            println!("saved {} tracks to {:?}", tracks.len(), name);
        }
        Command::Play { file, volume } => {
            service.play_track(&file, volume)?;
            main_loop(&service);
            service.stop_playback();
        }
    }

    Ok(())
}

/// WAITS FOR THE TRACK TO END
fn main_loop(service: &PlaylistService<RodioEngine>) {
    while !service.playback_finished() {
        thread::sleep(Duration::from_millis(100));
    }
}
