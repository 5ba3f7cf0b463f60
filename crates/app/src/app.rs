//! Application state
//!
//! Owns the contact directory, the bounded display buffer, and the
//! currently selected destination. Pure state transitions, no I/O: the
//! runtime feeds it hub events and command results and renders from it.

use std::collections::VecDeque;

use partyline_core::{Contact, ContactDirectory};
use partyline_net::{HubEvent, RoutedMessage};

/// Hub-facing application state.
pub struct App {
    contacts: ContactDirectory,
    lines: VecDeque<String>,
    capacity: usize,
    selected: Option<Contact>,
    attached: usize,
    should_quit: bool,
}

impl App {
    /// Build the app around a loaded directory. The first contact is
    /// the initial destination; `capacity` is the visible pane height.
    pub fn new(contacts: ContactDirectory, capacity: usize) -> Self {
        let selected = contacts.first().cloned();
        Self {
            contacts,
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            selected,
            attached: 0,
            should_quit: false,
        }
    }

    /// Append a display line, evicting the oldest beyond capacity.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Track the visible pane height; re-evicts if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Fold a hub event into the display state.
    pub fn handle_hub_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { label, .. } => {
                self.attached += 1;
                self.push_line(format!("Client connected ({label})"));
            }
            HubEvent::Disconnected { label, .. } => {
                self.attached = self.attached.saturating_sub(1);
                self.push_line(format!("Client disconnected ({label})"));
            }
            HubEvent::Message { message, .. } => {
                let who = self
                    .contacts
                    .lookup_by_number(&message.sender)
                    .unwrap_or(&message.sender)
                    .to_string();
                self.push_line(format!("From {who}: {}", message.body));
            }
        }
    }

    /// Address plain input text to the selected destination, producing
    /// the outbound chat payload. `None` when nothing is selected.
    pub fn compose_outbound(&self, body: &str) -> Option<RoutedMessage> {
        self.selected
            .as_ref()
            .map(|c| RoutedMessage::new(c.number.clone(), body))
    }

    /// Select a destination by display name.
    pub fn select(&mut self, name: &str) -> bool {
        match self.contacts.lookup_by_name(name) {
            Some(number) => {
                self.selected = Some(Contact {
                    number: number.to_string(),
                    name: name.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Drop the selection if the removed contact was selected, falling
    /// back to the first remaining entry.
    pub fn reselect_after_remove(&mut self, removed: &Contact) {
        if self.selected.as_ref().map(|c| c.number.as_str()) == Some(removed.number.as_str()) {
            self.selected = self.contacts.first().cloned();
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn selected(&self) -> Option<&Contact> {
        self.selected.as_ref()
    }

    pub fn attached(&self) -> usize {
        self.attached
    }

    pub fn contacts(&self) -> &ContactDirectory {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactDirectory {
        &mut self.contacts
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
