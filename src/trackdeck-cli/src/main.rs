use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rest_gateway::{RestGateway, RestGatewayConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;
use trackdeck_core::validation::normalize_genres;
use trackdeck_core::{
    init_logging, AppDirs, AudioUpload, BrowseConfig, CollectionController, Config, CreateError,
    CreateWorkflow, DeleteWorkflow, FetchOutcome, MemoryGateway, PlaybackCoordinator, Query,
    QueryState, SortKey, Track, TrackForm, TrackGateway, TrackId, WorkflowContext,
};
use trackdeck_ui::{run_ui, UiContext};

#[derive(Debug, Parser)]
#[command(name = "trackdeck", version, about = "Terminal client for a track catalog")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Track service base URL (takes precedence over config)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    /// Use a built-in in-memory catalog instead of the track service
    #[arg(long, global = true)]
    demo: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of tracks
    List(ListCommand),
    /// Print the genres known to the service
    Genres,
    /// Create a track, optionally uploading an MP3
    Create(CreateCommand),
    /// Delete a track by id
    Delete(DeleteCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Title,
    Artist,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Title => SortKey::Title,
            SortArg::Artist => SortKey::Artist,
        }
    }
}

#[derive(Debug, Parser, Clone)]
struct ListCommand {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Page size (defaults to browse.page_size)
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
    /// Case-insensitive match on title, artist or album
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    artist: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct CreateCommand {
    #[arg(long)]
    title: String,
    #[arg(long)]
    artist: String,
    #[arg(long)]
    album: String,
    /// Repeat for several genres
    #[arg(long = "genre", value_name = "GENRE")]
    genres: Vec<String>,
    #[arg(long, value_name = "URL")]
    cover: Option<String>,
    /// MP3 file to upload once the track exists
    #[arg(long, value_name = "PATH")]
    audio: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
struct DeleteCommand {
    id: String,
    /// Confirm the deletion
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Error)]
enum CommandError {
    #[error("refusing to delete {0} without --yes")]
    DeleteNotConfirmed(String),
    #[error("invalid --base-url: {0}")]
    BaseUrl(String),
}

impl ListCommand {
    /// Starting query: browse defaults overridden by the flags given.
    fn query_state(&self, browse: &BrowseConfig) -> QueryState {
        let mut query = Query::first_page(self.limit.unwrap_or(browse.page_size))
            .with_page(self.page)
            .with_sort(self.sort.map(SortKey::from).unwrap_or(browse.default_sort));
        for (filter, value) in [
            (&mut query.search, &self.search),
            (&mut query.genre, &self.genre),
            (&mut query.artist, &self.artist),
        ] {
            if let Some(value) = value {
                *filter = value.trim().to_string();
            }
        }
        QueryState::from_query(query, Duration::from_millis(browse.search_debounce_ms))
    }
}

impl CreateCommand {
    fn form(&self) -> TrackForm {
        TrackForm {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            genres: normalize_genres(&self.genres),
            cover_image: self.cover.clone().unwrap_or_default(),
        }
    }
}

/// Everything a one-shot command needs.
struct Session {
    collection: Arc<CollectionController>,
    playback: Arc<PlaybackCoordinator>,
}

impl Session {
    fn new(gateway: Arc<dyn TrackGateway>, query: QueryState) -> Self {
        Self {
            collection: Arc::new(CollectionController::new(gateway, query)),
            playback: Arc::new(PlaybackCoordinator::new()),
        }
    }

    fn workflows(&self) -> WorkflowContext {
        WorkflowContext::new(self.collection.clone(), self.playback.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (dirs, mut config) = load_config(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.gateway.base_url = base_url.clone();
        config
            .validate()
            .map_err(|e| CommandError::BaseUrl(e.to_string()))?;
    }
    if cli.command.is_none() {
        config.logging.stdout = false;
    }
    let _logging = init_logging(&config.logging, &dirs)?;

    let (gateway, source) = build_gateway(&config, cli.demo)?;
    tracing::info!(
        gateway = gateway.id(),
        source = %source,
        config_dir = %dirs.config_dir().display(),
        "starting trackdeck"
    );

    let runtime = Runtime::new().context("failed to start async runtime")?;
    let query = match &cli.command {
        Some(Command::List(list)) => list.query_state(&config.browse),
        _ => config.browse.query_state(),
    };
    let session = Session::new(gateway, query);

    match cli.command {
        None => {
            run_ui(UiContext {
                collection: session.collection,
                playback: session.playback,
                runtime: runtime.handle().clone(),
                audio: trackdeck_audio::default_engine(),
                source,
            })?;
        }
        Some(command) => {
            let output = runtime.block_on(run_command(&session, command))?;
            print!("{output}");
        }
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<(AppDirs, Config)> {
    match path {
        Some(path) => {
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let dirs = AppDirs::from_root(root);
            dirs.ensure_exists()?;
            let config = Config::load_from(path)?;
            Ok((dirs, config))
        }
        None => {
            let dirs = AppDirs::discover()?;
            let config = Config::load_or_default(&dirs)?;
            Ok((dirs, config))
        }
    }
}

fn build_gateway(config: &Config, demo: bool) -> Result<(Arc<dyn TrackGateway>, String)> {
    if demo {
        return Ok((Arc::new(MemoryGateway::demo()), "demo".to_string()));
    }
    let gateway = RestGateway::new(RestGatewayConfig::from(&config.gateway))?;
    let source = gateway.base_url().to_string();
    Ok((Arc::new(gateway), source))
}

async fn run_command(session: &Session, command: Command) -> Result<String> {
    match command {
        Command::List(_) => list_tracks(session).await,
        Command::Genres => {
            let genres = session.collection.gateway().genres().await?;
            if genres.is_empty() {
                return Ok("No genres.\n".to_string());
            }
            Ok(genres.iter().map(|g| format!("{g}\n")).collect())
        }
        Command::Create(create) => create_track(session, &create).await,
        Command::Delete(delete) => delete_track(session, delete).await,
    }
}

/// Fetches the session's starting query. A page past the end falls back to the last page.
async fn list_tracks(session: &Session) -> Result<String> {
    let collection = &session.collection;
    if let FetchOutcome::Failed(err) = collection.refresh().await {
        return Err(err.into());
    }

    let snapshot = collection.snapshot();
    let mut out = String::new();
    if snapshot.tracks().is_empty() {
        out.push_str("No tracks found.\n");
    }
    for track in snapshot.tracks() {
        out.push_str(&describe(track));
        out.push('\n');
    }
    out.push_str(&snapshot.page_label());
    out.push('\n');
    Ok(out)
}

async fn create_track(session: &Session, create: &CreateCommand) -> Result<String> {
    let audio = create
        .audio
        .as_deref()
        .map(AudioUpload::from_path)
        .transpose()?;
    let workflow = CreateWorkflow::new(session.workflows());
    match workflow.submit(&create.form(), audio).await {
        Ok(track) => Ok(format!("Created {}\n", describe(&track))),
        Err(CreateError::Invalid(errors)) => {
            let lines: Vec<String> = errors
                .0
                .iter()
                .map(|e| format!("  {}: {}", e.field.label(), e.message))
                .collect();
            anyhow::bail!("track not created:\n{}", lines.join("\n"))
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete_track(session: &Session, delete: DeleteCommand) -> Result<String> {
    if !delete.yes {
        return Err(CommandError::DeleteNotConfirmed(delete.id).into());
    }
    let workflow = DeleteWorkflow::new(session.workflows());
    workflow.request(TrackId::new(delete.id));
    let id = workflow.confirm().await?;
    Ok(format!("Deleted {id}\n"))
}

fn describe(track: &Track) -> String {
    let audio = if track.has_audio() { "♪" } else { " " };
    format!(
        "{audio} [{}] {} - {} ({}) {}",
        track.id,
        track.title,
        track.artist,
        track.album,
        track.genres.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_session() -> Session {
        Session::new(
            Arc::new(MemoryGateway::demo()),
            BrowseConfig::default().query_state(),
        )
    }

    fn list_command() -> ListCommand {
        ListCommand {
            page: 1,
            limit: None,
            sort: None,
            search: None,
            genre: None,
            artist: None,
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["trackdeck", "list", "--sort", "artist", "--demo"])
            .expect("parses");
        assert!(cli.demo);
        match cli.command {
            Some(Command::List(list)) => assert_eq!(list.sort, Some(SortArg::Artist)),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn list_flags_override_browse_config() {
        let list = ListCommand {
            page: 0,
            limit: Some(0),
            sort: Some(SortArg::Artist),
            genre: Some(" Jazz ".into()),
            ..list_command()
        };
        let state = list.query_state(&BrowseConfig::default());
        let query = state.query();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);
        assert_eq!(query.sort, SortKey::Artist);
        assert_eq!(query.genre, "Jazz");
        assert_eq!(query.search, "");
    }

    #[test]
    fn create_collects_repeated_genres() {
        let cli = Cli::try_parse_from([
            "trackdeck", "create", "--title", "T", "--artist", "A", "--album", "B", "--genre",
            "Rock", "--genre", " Rock ", "--genre", "Jazz",
        ])
        .expect("parses");
        let Some(Command::Create(create)) = cli.command else {
            panic!("expected create");
        };
        let form = create.form();
        assert_eq!(form.genres, vec!["Rock".to_string(), "Jazz".to_string()]);
        assert_eq!(form.cover_image, "");
    }

    #[tokio::test]
    async fn list_filters_demo_catalog() {
        let list = ListCommand {
            artist: Some("Radiohead".into()),
            ..list_command()
        };
        let session = Session::new(
            Arc::new(MemoryGateway::demo()),
            list.query_state(&BrowseConfig::default()),
        );
        let out = list_tracks(&session).await.expect("list");
        assert!(out.contains("Paranoid Android"));
        assert!(out.contains("Karma Police"));
        assert!(!out.contains("Heroes"));
        assert!(out.ends_with("Page 1 of 1\n"));
    }

    #[tokio::test]
    async fn list_past_the_end_shows_last_page() {
        let list = ListCommand {
            page: 9,
            limit: Some(5),
            ..list_command()
        };
        let session = Session::new(
            Arc::new(MemoryGateway::demo()),
            list.query_state(&BrowseConfig::default()),
        );
        let out = list_tracks(&session).await.expect("list");
        assert!(out.ends_with("Page 3 of 3\n"), "{out}");
    }

    #[tokio::test]
    async fn create_reports_field_errors() {
        let session = demo_session();
        let create = CreateCommand {
            title: " ".into(),
            artist: "A".into(),
            album: "B".into(),
            genres: vec![],
            cover: None,
            audio: None,
        };
        let err = create_track(&session, &create)
            .await
            .expect_err("invalid form");
        let message = err.to_string();
        assert!(message.contains("Title is required"), "{message}");
        assert!(message.contains("At least one genre required"), "{message}");
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let session = demo_session();
        let err = delete_track(
            &session,
            DeleteCommand {
                id: "1".into(),
                yes: false,
            },
        )
        .await
        .expect_err("unconfirmed");
        assert!(err.to_string().contains("--yes"));

        let out = delete_track(
            &session,
            DeleteCommand {
                id: "1".into(),
                yes: true,
            },
        )
        .await
        .expect("deleted");
        assert_eq!(out, "Deleted 1\n");
        assert!(session.collection.find(&TrackId::new("1")).is_none());
    }
}
