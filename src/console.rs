//! Line-oriented command console driving the browser state.
//!
//! Each input line maps to one dispatch call on `BrowserState`; after every
//! command the current view model is printed as plain text. Enrichment results
//! arriving on the bus are applied between commands.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::sync::broadcast::{error::TryRecvError, Receiver, Sender};

use crate::browser::browser_state::BrowserState;
use crate::browser::view_model::{
    AlbumPane, BrowserViewModel, ConditionBadge, DetailPane, COVER_UNAVAILABLE_MESSAGE, LOADING_DETAILS_MESSAGE,
    NO_ALBUM_SELECTED_MESSAGE, NO_ARTISTS_MESSAGE, NO_ARTIST_SELECTED_MESSAGE,
};
use crate::collection::collection_store::{CollectionStore, ALL_FOLDERS};
use crate::collection::record::RecordId;
use crate::protocol::{EnrichmentMessage, Message};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const WAIT_LIMIT: Duration = Duration::from_secs(30);

const HELP_TEXT: &str = "\
Commands:
  folder <name|all>   filter by collection folder
  search [text]       filter the artist list by name
  artist [name]       select an artist; no name (or \"\") selects the blank artist
  album <id>          select an album by its [id]
  wait                wait for album details to finish loading
  show                print the current view
  help                print this help
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Folder(String),
    Search(String),
    Artist(String),
    Album(RecordId),
    Wait,
    Show,
    Help,
    Quit,
}

/// Parses one input line. Arguments are the rest of the line, trimmed.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let trimmed = line.trim();
    let (verb, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    let require_argument = |name: &str| -> Result<String, String> {
        if argument.is_empty() {
            Err(format!("'{name}' needs an argument"))
        } else {
            Ok(argument.to_string())
        }
    };

    match verb.to_ascii_lowercase().as_str() {
        "folder" => require_argument("folder").map(ConsoleCommand::Folder),
        "search" => Ok(ConsoleCommand::Search(argument.to_string())),
        "artist" => Ok(ConsoleCommand::Artist(unquote(argument).to_string())),
        "album" => require_argument("album")?
            .parse::<RecordId>()
            .map(ConsoleCommand::Album)
            .map_err(|_| format!("'{argument}' is not an album id")),
        "wait" => Ok(ConsoleCommand::Wait),
        "show" | "" => Ok(ConsoleCommand::Show),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(format!("Unknown command '{other}'. Type 'help'.")),
    }
}

/// Strips one pair of surrounding double quotes, so `""` names the blank artist.
fn unquote(argument: &str) -> &str {
    argument
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(argument)
}

fn artist_display_name(artist: &str) -> &str {
    if artist.is_empty() {
        "\"\""
    } else {
        artist
    }
}

fn condition_line(name: &str, badge: &ConditionBadge) -> String {
    match badge.category.css_class() {
        "" => format!("  {name}: {}", badge.label),
        class => format!("  {name}: {} [{class}]", badge.label),
    }
}

/// Renders a view model as indented plain text.
pub fn render_view(view: &BrowserViewModel) -> String {
    let mut lines = Vec::new();

    let mut folder_names = vec![if view.folder == ALL_FOLDERS {
        format!("[{ALL_FOLDERS}]")
    } else {
        ALL_FOLDERS.to_string()
    }];
    folder_names.extend(view.folders.iter().map(|folder| {
        if folder.selected {
            format!("[{}]", folder.name)
        } else {
            folder.name.clone()
        }
    }));
    if view.folder != ALL_FOLDERS && !view.folders.iter().any(|folder| folder.selected) {
        folder_names.push(format!("[{}]", view.folder));
    }
    lines.push(format!("Folders: {}", folder_names.join(", ")));
    lines.push(view.record_count.clone());
    lines.push(format!("Focus: {:?}", view.active_pane));

    if view.search_term.is_empty() {
        lines.push("Artists:".to_string());
    } else {
        lines.push(format!("Artists (search: {}):", view.search_term));
    }
    if view.artists.is_empty() {
        lines.push(format!("  {NO_ARTISTS_MESSAGE}"));
    }
    for row in &view.artists {
        let marker = if row.selected { '*' } else { ' ' };
        lines.push(format!(
            "  {marker} {} ({})",
            artist_display_name(&row.artist),
            row.album_count
        ));
    }

    lines.push("Albums:".to_string());
    match &view.albums {
        AlbumPane::NoArtistSelected => lines.push(format!("  {NO_ARTIST_SELECTED_MESSAGE}")),
        AlbumPane::Albums(cards) => {
            for card in cards {
                let marker = if card.selected { '*' } else { ' ' };
                lines.push(format!(
                    "  {marker} [{}] {} ({} • {})",
                    card.record_id, card.title, card.year, card.label
                ));
            }
        }
    }

    lines.push("Details:".to_string());
    match &view.detail {
        DetailPane::NoAlbumSelected => lines.push(format!("  {NO_ALBUM_SELECTED_MESSAGE}")),
        DetailPane::Loading { title, .. } => {
            lines.push(format!("  {title}"));
            lines.push(format!("  {LOADING_DETAILS_MESSAGE}"));
        }
        DetailPane::Ready(detail) => {
            lines.push(format!(
                "  {} by {}",
                detail.title,
                artist_display_name(&detail.artist)
            ));
            lines.push(format!(
                "  Cover: {}",
                detail
                    .image_url
                    .as_deref()
                    .unwrap_or(COVER_UNAVAILABLE_MESSAGE)
            ));
            if let Some(url) = &detail.reference_page_url {
                lines.push(format!("  Wikipedia: {url}"));
            }
            if let Some(url) = &detail.catalog_page_url {
                lines.push(format!("  Discogs: {url}"));
            }
            lines.push(format!("  Label: {}", detail.label));
            lines.push(format!("  Released: {}", detail.released));
            lines.push(format!("  Format: {}", detail.format));
            lines.push(format!("  Catalog #: {}", detail.catalog_number));
            lines.push(format!("  Folder: {}", detail.folder));
            lines.push(condition_line("Media Condition", &detail.media_condition));
            lines.push(condition_line("Sleeve Condition", &detail.sleeve_condition));
            lines.push(format!("  Date Added: {}", detail.date_added));
            if let Some(notes) = &detail.notes {
                lines.push(format!("  Notes: {notes}"));
            }
            for (header, value) in &detail.additional_columns {
                lines.push(format!("  {header}: {value}"));
            }
        }
    }

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Owns the browser state for one console session.
pub struct ConsoleHost<'a> {
    store: &'a CollectionStore,
    state: BrowserState,
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
}

impl<'a> ConsoleHost<'a> {
    pub fn new(
        store: &'a CollectionStore,
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
    ) -> Self {
        Self {
            store,
            state: BrowserState::new(),
            bus_consumer,
            bus_producer,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn view_model(&self) -> BrowserViewModel {
        self.state.view_model(self.store)
    }

    fn handle_bus_message(&mut self, message: Message) {
        if let Message::Enrichment(EnrichmentMessage::Resolved {
            request_id,
            record_id,
            result,
        }) = message
        {
            self.state.on_enrichment_result(request_id, record_id, result);
        }
    }

    /// Applies every queued bus message without blocking.
    pub fn apply_bus_messages_nonblocking(&mut self) {
        loop {
            match self.bus_consumer.try_recv() {
                Ok(message) => self.handle_bus_message(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Console lagged on control bus, skipped {} message(s)", skipped);
                }
            }
        }
    }

    fn wait_for_enrichment(&mut self) {
        let deadline = Instant::now() + WAIT_LIMIT;
        while self.state.pending_request_id().is_some() && Instant::now() < deadline {
            std::thread::sleep(WAIT_POLL_INTERVAL);
            self.apply_bus_messages_nonblocking();
        }
    }

    /// Executes one command. Returns `false` when the session should end.
    pub fn dispatch(&mut self, command: ConsoleCommand) -> bool {
        debug!("Console: {:?}", command);
        match command {
            ConsoleCommand::Folder(folder) => self.state.on_folder_change(&folder),
            ConsoleCommand::Search(term) => self.state.on_search_change(&term),
            ConsoleCommand::Artist(artist) => {
                self.state.on_artist_select(self.store, &artist);
            }
            ConsoleCommand::Album(record_id) => {
                if let Some(ticket) = self.state.on_album_select(self.store, record_id) {
                    let _ = self
                        .bus_producer
                        .send(Message::Enrichment(EnrichmentMessage::Resolve(ticket)));
                }
            }
            ConsoleCommand::Wait => self.wait_for_enrichment(),
            ConsoleCommand::Show | ConsoleCommand::Help => {}
            ConsoleCommand::Quit => return false,
        }
        true
    }

    /// Reads commands until end of input or `quit`.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> std::io::Result<()> {
        writeln!(output, "{}", render_view(&self.view_model()))?;
        for line in input.lines() {
            let line = line?;
            self.apply_bus_messages_nonblocking();
            match parse_command(&line) {
                Ok(ConsoleCommand::Help) => writeln!(output, "{HELP_TEXT}")?,
                Ok(command) => {
                    if !self.dispatch(command) {
                        break;
                    }
                    writeln!(output, "{}", render_view(&self.view_model()))?;
                }
                Err(message) => writeln!(output, "{message}")?,
            }
            output.flush()?;
        }
        Ok(())
    }
}
