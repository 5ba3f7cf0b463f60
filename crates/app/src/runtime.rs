//! Terminal event loop
//!
//! One task drives everything: keyboard events from crossterm's async
//! stream and hub events from the network are interleaved through
//! `tokio::select!`, with a redraw after each handled event. Input
//! handling and redraws therefore never run concurrently; inbound
//! messages are just another branch of the same loop.

use std::io::{self, Stdout};
use std::path::PathBuf;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use partyline_net::frame::KIND_CHAT;
use partyline_net::{Hub, HubEvent};

use crate::app::App;
use crate::commands::{self, Command};
use crate::input::{InputEffect, InputState, KeyInput};
use crate::ui;

/// Runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Network error: {0}")]
    Net(#[from] partyline_net::Error),
}

/// The terminal event loop and everything it coordinates.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
    hub: Hub,
    hub_events: mpsc::Receiver<HubEvent>,
    app: App,
    input: InputState,
    contacts_path: PathBuf,
}

impl Runtime {
    /// Take over the terminal (raw mode, alternate screen) and size the
    /// display buffer and input line to it.
    pub fn new(
        hub: Hub,
        hub_events: mpsc::Receiver<HubEvent>,
        mut app: App,
        contacts_path: PathBuf,
    ) -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        app.set_capacity(ui::pane_height(size.height));
        let input = InputState::new(ui::input_width(size.width));

        Ok(Self {
            terminal,
            events: EventStream::new(),
            hub,
            hub_events,
            app,
            input,
            contacts_path,
        })
    }

    /// Run until quit, then persist contacts and close every session.
    /// Interrupt (Ctrl-C arrives as a key event in raw mode) takes the
    /// same cleanup path.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        loop {
            self.draw()?;

            tokio::select! {
                maybe_event = self.events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await?;
                        }
                        Some(Ok(Event::Resize(cols, rows))) => {
                            self.app.set_capacity(ui::pane_height(rows));
                            self.input.set_max_width(ui::input_width(cols));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                    }
                }
                event = self.hub_events.recv() => {
                    match event {
                        Some(event) => self.app.handle_hub_event(event),
                        None => break,
                    }
                }
            }

            if self.app.should_quit() {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<(), RuntimeError> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.app.quit();
            return Ok(());
        }

        let key = match key.code {
            KeyCode::Char(c) => KeyInput::Char(c),
            KeyCode::Enter => KeyInput::Enter,
            KeyCode::Backspace => KeyInput::Backspace,
            KeyCode::Esc => {
                self.app.quit();
                return Ok(());
            }
            _ => return Ok(()),
        };

        if let InputEffect::Submitted(line) = self.input.handle_key(key) {
            self.dispatch(commands::parse(&line)).await?;
        }
        Ok(())
    }

    /// Apply one parsed command. Bad arguments become display lines;
    /// nothing here takes the hub down.
    async fn dispatch(&mut self, command: Command) -> Result<(), RuntimeError> {
        match command {
            Command::Add { number, name } => match self.app.contacts_mut().add(&number, &name) {
                Ok(()) => self.app.push_line(format!("Added {name} <{number}>")),
                Err(e) => self.app.push_line(e.to_string()),
            },
            Command::Del { target } => match self.app.contacts_mut().remove(&target) {
                Some(removed) => {
                    self.app.reselect_after_remove(&removed);
                    self.app
                        .push_line(format!("Removed {} <{}>", removed.name, removed.number));
                }
                None => self
                    .app
                    .push_line(format!("{target} not found in contacts.")),
            },
            Command::Send { name } => {
                if self.app.select(&name) {
                    self.app.push_line(format!("Sending to {name}"));
                } else {
                    self.app.push_line(format!("{name} not found in contacts."));
                }
            }
            Command::List => {
                let listing: Vec<String> = self
                    .app
                    .contacts()
                    .iter()
                    .map(|c| format!("{} <{}>", c.name, c.number))
                    .collect();
                if listing.is_empty() {
                    self.app.push_line("No contacts.");
                }
                for line in listing {
                    self.app.push_line(line);
                }
            }
            Command::Quit => self.app.quit(),
            Command::Say { text } => match self.app.compose_outbound(&text) {
                Some(message) => {
                    let delivered = self.hub.broadcast(KIND_CHAT, &message.to_payload()).await?;
                    if delivered == 0 {
                        self.app.push_line("No attached sessions.");
                    } else {
                        self.app.push_line(format!(">>> {text}"));
                    }
                }
                None => self
                    .app
                    .push_line("No destination selected. Use /send NAME."),
            },
            Command::Unknown { input } => self.app.push_line(format!("Unknown command: {input}")),
            Command::InvalidArgs { usage } => self.app.push_line(usage),
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<(), RuntimeError> {
        self.terminal.draw(|frame| {
            ui::render(frame, &self.app, &self.input);
        })?;
        Ok(())
    }

    /// Persist contacts and close all sessions; also runs on interrupt.
    fn shutdown(&mut self) {
        if let Err(e) = self.app.contacts().save(&self.contacts_path) {
            warn!(error = %e, "Failed to save contacts");
        }
        self.hub.shutdown();
        info!("Runtime stopped");
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    }
}
