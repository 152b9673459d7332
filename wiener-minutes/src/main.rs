use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wiener_minutes::board::render;
use wiener_minutes::cache::{CacheConfig, CachedSource};
use wiener_minutes::domain::{Diva, Station};
use wiener_minutes::monitor::{
    DepartureSource, MockMonitorClient, MonitorClient, MonitorConfig, NetworkError,
};
use wiener_minutes::poller::{BoardSnapshot, ConfigError, PollConfig, Poller};
use wiener_minutes::stations::{
    Favorites, FileStore, KeyValueStore, StationDirectory, StationError,
};

/// Number of matches listed by a station search.
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

/// Startup settings, read from `WM_*` environment variables.
#[derive(Debug)]
struct Settings {
    monitor: MonitorConfig,
    poll: PollConfig,
    stations_path: String,
    favorites_path: String,
    mock_dir: Option<String>,
    initial_station: Option<String>,
}

impl Settings {
    fn from_env() -> Result<Self, ConfigError> {
        let mut monitor = MonitorConfig::new();
        if let Some(url) = env_var("WM_BASE_URL") {
            monitor = monitor.with_base_url(url);
        }
        if let Some(relay) = env_var("WM_RELAY_URL") {
            monitor = monitor.with_relay(relay);
        }
        if let Some(raw) = env_var("WM_TIMEOUT_SECS") {
            let secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "WM_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            monitor = monitor.with_timeout(secs);
        }

        let poll = match env_var("WM_REFRESH_SECS") {
            Some(raw) => PollConfig::from_secs_str("WM_REFRESH_SECS", &raw)?,
            None => PollConfig::default(),
        };

        Ok(Self {
            monitor,
            poll,
            stations_path: env_var("WM_STATIONS").unwrap_or_else(|| "data/stations.json".into()),
            favorites_path: env_var("WM_FAVORITES").unwrap_or_else(|| "favorites.json".into()),
            mock_dir: env_var("WM_MOCK_DIR"),
            initial_station: env_var("WM_STATION"),
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Select(String),
    Refresh,
    Filter(String),
    ToggleFavorite,
    Search(String),
    Clear,
    Quit,
    Help,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head {
            "" => return None,
            "r" if rest.is_empty() => Command::Refresh,
            "f" => Command::Filter(rest.to_string()),
            "*" if rest.is_empty() => Command::ToggleFavorite,
            "s" => Command::Search(rest.to_string()),
            "x" if rest.is_empty() => Command::Clear,
            "q" if rest.is_empty() => Command::Quit,
            "?" | "h" if rest.is_empty() => Command::Help,
            _ => Command::Select(line.to_string()),
        };
        Some(command)
    }
}

const HELP: &str = "\
commands:
  <diva> | <name>  select a station
  r                refresh now
  f <text>         filter by line (f alone clears)
  *                toggle favorite for the current station
  s <text>         search stations (s alone lists favorites)
  x                clear the selection and filter
  q                quit";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wiener_minutes=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exiting");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let settings = Settings::from_env()?;

    let directory = StationDirectory::load(&settings.stations_path)?;
    let favorites = Favorites::load(FileStore::new(&settings.favorites_path))?;

    match &settings.mock_dir {
        Some(dir) => {
            info!(dir = %dir, "serving mock monitor data");
            let client = MockMonitorClient::new(dir)?;
            let stations = client.available_stations();
            serve(client, &settings, &directory, favorites, stations).await
        }
        None => {
            let client = MonitorClient::new(settings.monitor.clone())?;
            serve(client, &settings, &directory, favorites, Vec::new()).await
        }
    }
}

async fn serve<S: DepartureSource>(
    source: S,
    settings: &Settings,
    directory: &StationDirectory,
    favorites: Favorites<FileStore>,
    mock_stations: Vec<Diva>,
) -> Result<(), AppError> {
    let source = CachedSource::new(source, &CacheConfig::default());
    let poller = Poller::new(source, &settings.poll);

    let (filter, filter_rx) = watch::channel(String::new());
    let display = tokio::spawn(show_board(poller.subscribe(), filter_rx));

    let mut session = Session {
        poller,
        directory,
        favorites,
        filter,
        mock_stations,
    };
    session.print_help();

    if let Some(query) = &settings.initial_station {
        match directory.resolve(query) {
            Ok(station) => session.select(station),
            Err(e) => warn!(error = %e, "ignoring WM_STATION"),
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if session.handle(command) == Flow::Quit {
            break;
        }
    }

    drop(session);
    display.abort();
    info!("bye");
    Ok(())
}

/// Whether the input loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive state: the poller plus everything the commands act on.
struct Session<'a, S, K> {
    poller: Poller<S>,
    directory: &'a StationDirectory,
    favorites: Favorites<K>,
    /// Line filter shown by the display task.
    filter: watch::Sender<String>,
    /// Stations served in mock mode, listed in the help text.
    mock_stations: Vec<Diva>,
}

impl<S: DepartureSource, K: KeyValueStore> Session<'_, S, K> {
    /// Switch stations. The line filter only applies to the station it was
    /// set for, so an actual change clears it.
    fn select(&self, station: Station) {
        if self.poller.select(Some(station)).is_some() {
            self.filter.send_replace(String::new());
        }
    }

    fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Select(query) => match self.directory.resolve(&query) {
                Ok(station) => self.select(station),
                Err(e) => println!("{e}"),
            },
            Command::Refresh => {
                if self.poller.refresh().is_none() {
                    println!("no station selected");
                }
            }
            Command::Filter(text) => {
                self.filter.send_replace(text);
            }
            Command::ToggleFavorite => match self.poller.station() {
                Some(station) => match self.favorites.toggle(station.diva) {
                    Ok(true) => println!("added {} to favorites", station.name),
                    Ok(false) => println!("removed {} from favorites", station.name),
                    Err(e) => warn!(error = %e, "failed to save favorites"),
                },
                None => println!("no station selected"),
            },
            Command::Search(term) => {
                let matches = self
                    .directory
                    .search(&term, self.favorites.list(), SEARCH_LIMIT);
                if matches.is_empty() {
                    println!("no matching stations");
                }
                for station in matches {
                    let star = if self.favorites.contains(station.diva) { "*" } else { " " };
                    println!("{star} {:>10}  {}", station.diva, station.name);
                }
            }
            Command::Clear => {
                self.poller.select(None);
                self.filter.send_replace(String::new());
            }
            Command::Help => self.print_help(),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn print_help(&self) {
        println!("{HELP}");
        if !self.mock_stations.is_empty() {
            let ids: Vec<String> = self.mock_stations.iter().map(Diva::to_string).collect();
            println!("mock stations: {}", ids.join(", "));
        }
    }
}

/// Print the board whenever it or the line filter changes.
async fn show_board(
    mut board: watch::Receiver<BoardSnapshot>,
    mut filter: watch::Receiver<String>,
) {
    loop {
        let text = {
            let snapshot = board.borrow_and_update();
            let filter = filter.borrow_and_update();
            render(&snapshot, &filter)
        };
        println!("\n{text}");

        tokio::select! {
            changed = board.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = filter.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
