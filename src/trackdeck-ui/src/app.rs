use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use trackdeck_audio::AudioEngine;
use trackdeck_core::{
    CollectionController, CollectionSnapshot, CreateError, CreateWorkflow, DeleteError,
    DeleteWorkflow, EditError, EditOutcome, EditWorkflow, ErrorSurface, GatewayError,
    GatewayResult, LoadStatus, PlaybackCoordinator, Track, TrackId, WorkflowContext,
};

use crate::form::{FormMode, FormState, InputField};
use crate::help::HelpContent;
use crate::player::AudioPlayer;

const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 18;
const HELP_WIDTH: u16 = 70;
const HELP_HEIGHT: u16 = 80;
const FORM_WIDTH: u16 = 70;
const FORM_HEIGHT: u16 = 70;
const TICK_RATE: Duration = Duration::from_millis(50);

/// Collaborators the terminal browser drives.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub collection: Arc<CollectionController>,
    pub playback: Arc<PlaybackCoordinator>,
    /// Runtime that executes gateway calls; the draw loop itself stays synchronous.
    pub runtime: Handle,
    /// Plays the track the coordinator marks as playing.
    pub audio: Arc<dyn AudioEngine>,
    /// Shown in the header, e.g. the base URL or "demo".
    pub source: String,
}

#[derive(Debug, Error)]
pub enum UiError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, UiError> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

pub fn run_ui(context: UiContext) -> Result<(), UiError> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(context);
    app.start();

    loop {
        app.drain_events();
        app.tick();
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
    }

    tracing::info!("terminal UI closed");
    Ok(())
}

/// Results of background work, delivered back to the draw loop.
#[derive(Debug)]
enum TaskEvent {
    Genres(GatewayResult<Vec<String>>),
    Created(Result<Track, CreateError>),
    Edited(Result<EditOutcome, EditError>),
    Deleted(Result<TrackId, DeleteError>),
}

#[derive(Debug)]
enum Overlay {
    None,
    Help,
    Form(Box<FormState>),
    /// `confirming` is set once the user said yes, so repeated keys do not resend.
    ConfirmDelete { track: Track, confirming: bool },
}

struct App {
    ctx: UiContext,
    create: CreateWorkflow,
    edit: EditWorkflow,
    delete: Arc<DeleteWorkflow>,
    player: AudioPlayer,
    events_tx: UnboundedSender<TaskEvent>,
    events_rx: UnboundedReceiver<TaskEvent>,
    snapshot: CollectionSnapshot,
    selected: usize,
    genres: Vec<String>,
    searching: bool,
    search_input: String,
    overlay: Overlay,
    status: Option<String>,
    help: HelpContent,
}

impl App {
    fn new(ctx: UiContext) -> Self {
        let workflows = WorkflowContext::new(ctx.collection.clone(), ctx.playback.clone());
        let (events_tx, events_rx) = unbounded_channel();
        let snapshot = ctx.collection.snapshot();
        let search_input = snapshot.query.search.clone();
        let player = AudioPlayer::new(
            ctx.audio.clone(),
            ctx.playback.clone(),
            ctx.collection.gateway().clone(),
            ctx.runtime.clone(),
        );
        Self {
            create: CreateWorkflow::new(workflows.clone()),
            edit: EditWorkflow::new(workflows.clone()),
            delete: Arc::new(DeleteWorkflow::new(workflows)),
            player,
            ctx,
            events_tx,
            events_rx,
            snapshot,
            selected: 0,
            genres: Vec::new(),
            searching: false,
            search_input,
            overlay: Overlay::None,
            status: None,
            help: HelpContent::new(),
        }
    }

    fn start(&self) {
        self.refresh();
        self.load_genres();
    }

    fn refresh(&self) {
        let collection = self.ctx.collection.clone();
        self.ctx.runtime.spawn(async move {
            collection.refresh().await;
        });
    }

    fn load_genres(&self) {
        let gateway = self.ctx.collection.gateway().clone();
        let tx = self.events_tx.clone();
        self.ctx.runtime.spawn(async move {
            let _ = tx.send(TaskEvent::Genres(gateway.genres().await));
        });
    }

    /// Runs a controller operation in the background; the next frame picks up its state.
    fn spawn_query<F, Fut>(&self, op: F)
    where
        F: FnOnce(Arc<CollectionController>) -> Fut,
        Fut: std::future::Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let fut = op(self.ctx.collection.clone());
        self.ctx.runtime.spawn(fut);
    }

    fn tick(&mut self) {
        self.snapshot = self.ctx.collection.snapshot();
        let len = self.snapshot.tracks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        let search_due = self
            .ctx
            .collection
            .search_deadline()
            .is_some_and(|deadline| deadline <= Instant::now());
        if search_due {
            self.spawn_query(|c| async move { c.poll_search().await });
        }
        if let Some(message) = self.player.sync() {
            self.status = Some(message);
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Genres(Ok(genres)) => self.genres = genres,
            TaskEvent::Genres(Err(err)) => {
                err.log("genres");
                self.status = Some(format!("Genres unavailable: {err}"));
            }
            TaskEvent::Created(result) => match result {
                Ok(track) => {
                    self.close_form();
                    self.status = Some(format!("Created '{}'", track.title));
                    self.load_genres();
                }
                Err(CreateError::Upload { track, source }) => {
                    self.close_form();
                    self.status = Some(format!(
                        "Created '{}' without audio: {source}. Edit it to retry the upload.",
                        track.title
                    ));
                }
                Err(CreateError::Invalid(errors)) => self.with_form(|f| f.reject_fields(errors)),
                Err(CreateError::AudioFile(err)) => {
                    self.with_form(|f| f.reject_file(err.to_string()))
                }
                Err(CreateError::Create(err)) => self.reject_gateway(err),
            },
            TaskEvent::Edited(result) => match result {
                Ok(EditOutcome::Unchanged) => {
                    self.close_form();
                    self.status = Some("No changes".into());
                }
                Ok(EditOutcome::Saved(track)) => {
                    self.close_form();
                    self.status = Some(format!("Saved '{}'", track.title));
                    self.load_genres();
                }
                Err(EditError::Audio { track, source }) => {
                    let message = format!("Saved '{}' but the audio change failed", track.title);
                    self.with_form(|f| f.reject_file(format!("{message}: {source}")));
                }
                Err(EditError::Invalid(errors)) => self.with_form(|f| f.reject_fields(errors)),
                Err(EditError::AudioFile(err)) => {
                    self.with_form(|f| f.reject_file(err.to_string()))
                }
                Err(EditError::Update(err)) => {
                    if err.requires_refresh() {
                        self.close_form();
                        self.status = Some("That track no longer exists".into());
                    } else {
                        self.reject_gateway(err);
                    }
                }
            },
            // Another confirm already owns this deletion and reports its own outcome.
            TaskEvent::Deleted(Err(DeleteError::InFlight)) => {}
            TaskEvent::Deleted(result) => {
                self.overlay = Overlay::None;
                self.status = Some(match result {
                    Ok(_) => "Track deleted".to_string(),
                    Err(err) => format!("Delete failed: {err}"),
                });
            }
        }
    }

    fn reject_gateway(&mut self, err: GatewayError) {
        match err.surface() {
            ErrorSurface::FileControl => self.with_form(|f| f.reject_file(err.to_string())),
            ErrorSurface::Field | ErrorSurface::Notification => {
                self.with_form(|f| f.reject(err.to_string()))
            }
        }
    }

    fn with_form(&mut self, f: impl FnOnce(&mut FormState)) {
        if let Overlay::Form(form) = &mut self.overlay {
            f(form);
        }
    }

    fn close_form(&mut self) {
        if matches!(self.overlay, Overlay::Form(_)) {
            self.overlay = Overlay::None;
        }
    }

    fn selected_track(&self) -> Option<&Track> {
        self.snapshot.tracks().get(self.selected)
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match &self.overlay {
            Overlay::Help => {
                if matches!(
                    key.code,
                    KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')
                ) {
                    self.overlay = Overlay::None;
                }
                return false;
            }
            Overlay::Form(_) => {
                self.handle_form_key(key);
                return false;
            }
            Overlay::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                return false;
            }
            Overlay::None => {}
        }

        if self.searching {
            self.handle_search_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('?') => self.overlay = Overlay::Help,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('n') | KeyCode::Right => {
                self.spawn_query(|c| async move { c.next_page().await })
            }
            KeyCode::Char('p') | KeyCode::Left => {
                self.spawn_query(|c| async move { c.previous_page().await })
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('s') => {
                let sort = self.snapshot.query.sort.toggled();
                self.spawn_query(move |c| async move { c.set_sort(sort).await });
            }
            KeyCode::Char('g') => {
                let genre = next_genre(&self.genres, &self.snapshot.query.genre);
                self.spawn_query(move |c| async move { c.set_genre(genre).await });
            }
            KeyCode::Char('a') => {
                let artist = if self.snapshot.query.artist.is_empty() {
                    self.selected_track().map(|t| t.artist.clone())
                } else {
                    Some(String::new())
                };
                if let Some(artist) = artist {
                    self.spawn_query(move |c| async move { c.set_artist(artist).await });
                }
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('x') => {
                self.ctx.collection.dismiss_error();
                self.status = None;
            }
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Char('c') => self.overlay = Overlay::Form(Box::new(FormState::create())),
            KeyCode::Char('e') => {
                if let Some(track) = self.selected_track() {
                    self.overlay = Overlay::Form(Box::new(FormState::edit(track)));
                }
            }
            KeyCode::Char('d') => self.request_delete(),
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.searching = false,
            KeyCode::Enter => {
                self.searching = false;
                self.spawn_query(|c| async move { c.flush_search().await });
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.ctx.collection.input_search(self.search_input.clone());
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.ctx.collection.input_search(self.search_input.clone());
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Overlay::Form(form) = &mut self.overlay else {
            return;
        };
        if form.is_submitting() {
            return;
        }
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.toggle_remove_audio();
            }
            KeyCode::Char(c) => form.input(c),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Overlay::Form(form) = &mut self.overlay else {
            return;
        };
        form.begin_submit();
        let tx = self.events_tx.clone();
        let track_form = form.track_form();

        match form.mode().clone() {
            FormMode::Create => {
                let audio = match form.audio_upload() {
                    Ok(audio) => audio,
                    Err(err) => return form.reject_file(err.to_string()),
                };
                let workflow = self.create.clone();
                self.ctx.runtime.spawn(async move {
                    let result = workflow.submit(&track_form, audio).await;
                    let _ = tx.send(TaskEvent::Created(result));
                });
            }
            FormMode::Edit(original) => {
                let audio = match form.audio_change() {
                    Ok(audio) => audio,
                    Err(err) => return form.reject_file(err.to_string()),
                };
                let workflow = self.edit.clone();
                self.ctx.runtime.spawn(async move {
                    let result = workflow.submit(&original, &track_form, audio).await;
                    let _ = tx.send(TaskEvent::Edited(result));
                });
            }
        }
    }

    fn request_delete(&mut self) {
        let Some(track) = self.selected_track().cloned() else {
            return;
        };
        if self.delete.request(track.id.clone()) {
            self.overlay = Overlay::ConfirmDelete {
                track,
                confirming: false,
            };
        } else {
            self.status = Some("A delete is already in progress".into());
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Overlay::ConfirmDelete { confirming, .. } = &mut self.overlay else {
            return;
        };
        if *confirming || self.delete.is_deleting() {
            return;
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                *confirming = true;
                let workflow = self.delete.clone();
                let tx = self.events_tx.clone();
                self.ctx.runtime.spawn(async move {
                    let result = workflow.confirm().await;
                    let _ = tx.send(TaskEvent::Deleted(result));
                });
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.delete.cancel();
                self.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    fn toggle_playback(&mut self) {
        let Some(track) = self.selected_track().cloned() else {
            return;
        };
        match self.ctx.playback.toggle(&track) {
            Ok(true) => {
                if let Err(message) = self.player.start(&track) {
                    self.ctx.playback.pause(&track.id);
                    self.status = Some(message);
                }
            }
            Ok(false) => {}
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.snapshot.tracks().len();
        if len == 0 {
            return;
        }
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.size();
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let message = format!(
                "Resize terminal to at least {MIN_WIDTH}x{MIN_HEIGHT} (current: {}x{})",
                area.width, area.height
            );
            let paragraph = Paragraph::new(message)
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Trackdeck").borders(Borders::ALL));
            frame.render_widget(paragraph, area);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, layout[0]);
        self.render_tracks(frame, layout[1]);
        self.render_footer(frame, layout[2]);

        match &self.overlay {
            Overlay::None => {}
            Overlay::Help => self.render_help(frame, area),
            Overlay::Form(form) => render_form(frame, area, form),
            Overlay::ConfirmDelete { track, confirming } => render_confirm(
                frame,
                area,
                track,
                *confirming || self.delete.is_deleting(),
            ),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let query = &self.snapshot.query;
        let search = match (&self.snapshot.pending_search, self.searching) {
            (_, true) => format!("/{}▏", self.search_input),
            (Some(pending), false) => format!("{pending}…"),
            (None, false) => query.search.clone(),
        };
        let filter = |label: &str, value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                format!("  {label}: {value}")
            }
        };
        let line = Line::from(vec![
            Span::styled(
                "Trackdeck ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("▸ "),
            Span::styled(self.ctx.source.clone(), Style::default().fg(Color::Green)),
            Span::raw(format!("  Sort: {}", query.sort.as_param())),
            Span::raw(filter("Genre", &query.genre)),
            Span::raw(filter("Artist", &query.artist)),
            Span::raw(filter("Search", &search)),
        ]);
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title("Collection"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_tracks(&self, frame: &mut Frame, area: Rect) {
        let playing = self.ctx.playback.playing();
        let items: Vec<ListItem> = self
            .snapshot
            .tracks()
            .iter()
            .map(|track| {
                let marker = if playing.as_ref() == Some(&track.id) {
                    "▶ "
                } else if track.has_audio() {
                    "♪ "
                } else {
                    "  "
                };
                ListItem::new(format!(
                    "{marker}{} — {} ({}) [{}]",
                    track.title,
                    track.artist,
                    track.album,
                    track.genres.join(", ")
                ))
            })
            .collect();

        let status = match self.snapshot.status {
            LoadStatus::Idle => "",
            LoadStatus::Loading => " · loading…",
            LoadStatus::Ready => "",
            LoadStatus::Error => " · stale",
        };
        let title = format!("{}{status}", self.snapshot.page_label());

        if items.is_empty() && self.snapshot.status == LoadStatus::Ready {
            let empty = Paragraph::new("No tracks match the current filters.")
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, area);
            return;
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(err) = &self.snapshot.error {
            Line::from(vec![
                Span::styled(format!("{err}"), Style::default().fg(Color::Red)),
                Span::raw("  (x to dismiss)"),
            ])
        } else if let Some(status) = &self.status {
            Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            let playing = self
                .ctx
                .playback
                .playing()
                .and_then(|id| self.snapshot.tracks().iter().find(|t| t.id == id).cloned());
            let loading = self.player.loading().is_some();
            match playing {
                Some(track) if loading => {
                    Line::from(format!("⏵  Loading {} — {}…", track.title, track.artist))
                }
                Some(track) => Line::from(format!("⏵  {} — {}", track.title, track.artist)),
                None => Line::from(Span::styled(
                    "⏵  Not playing   ? for help",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            }
        };
        let footer =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(footer, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(HELP_WIDTH, HELP_HEIGHT, area);
        let help = Paragraph::new(self.help.text())
            .block(
                Block::default()
                    .title("Help (press ? to close)")
                    .borders(Borders::ALL),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(Clear, popup_area);
        frame.render_widget(help, popup_area);
    }
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormState) {
    let popup_area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);
    let mut lines = Vec::new();
    for field in InputField::ALL {
        let focused = form.focus() == field;
        let label_style = if focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut value = form.value(field).to_string();
        if field == InputField::AudioPath && form.removes_audio() {
            value = "(remove current audio)".into();
        }
        let cursor = if focused { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", field.label()), label_style),
            Span::raw(format!("{value}{cursor}")),
        ]));
        if let Some(error) = form.field_error(field) {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));
    if let Some(notice) = form.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    let hint = if form.is_submitting() {
        "Saving…"
    } else if matches!(form.mode(), FormMode::Edit(_)) {
        "Enter: save  Tab: next field  Ctrl+R: remove audio  Esc: cancel"
    } else {
        "Enter: create  Tab: next field  Esc: cancel"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().add_modifier(Modifier::DIM),
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title(form.heading()).borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn render_confirm(frame: &mut Frame, area: Rect, track: &Track, deleting: bool) {
    let popup_area = centered_rect(50, 20, area);
    let prompt = if deleting {
        "Deleting…".to_string()
    } else {
        format!("Delete '{}' by {}? (y/n)", track.title, track.artist)
    };
    let paragraph = Paragraph::new(prompt)
        .block(Block::default().title("Confirm delete").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

/// Cycles "" → first genre → … → last genre → "".
fn next_genre(genres: &[String], current: &str) -> String {
    if current.is_empty() {
        return genres.first().cloned().unwrap_or_default();
    }
    genres
        .iter()
        .position(|g| g == current)
        .and_then(|idx| genres.get(idx + 1))
        .cloned()
        .unwrap_or_default()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}
