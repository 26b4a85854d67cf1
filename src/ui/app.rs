//! Interactive session controller.
//!
//! Owns the [`AppState`] and the question input, translates key presses into
//! state transitions, and runs the network calls as background tasks whose
//! results come back through the event channel.

use crate::answer::AnswerSource;
use crate::error::{RequestError, VerseError};
use crate::model::Answer;
use crate::navigation::Navigator;
use crate::state::{Activation, AppState, QueryTicket, VerseTicket};
use crate::verse::VerseSource;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    AnswerReady {
        ticket: QueryTicket,
        result: Result<Answer, RequestError>,
    },
    VerseReady {
        ticket: VerseTicket,
        result: Result<String, VerseError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    References,
}

/// Services the controller talks to.
#[derive(Clone)]
pub struct Services {
    pub answers: Arc<dyn AnswerSource>,
    pub verses: Arc<dyn VerseSource>,
    pub navigator: Arc<dyn Navigator>,
}

pub struct App {
    pub state: AppState,
    pub input: Input,
    pub focus: Focus,
    pub return_url: String,
    pub answer_scroll: u16,
    pub modal_scroll: u16,
    pub tick: usize,
    /// One-line message shown in the status bar until the next key press.
    pub notice: Option<String>,
    pub should_quit: bool,
    services: Services,
    tx: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        services: Services,
        tx: UnboundedSender<AppEvent>,
        return_url: String,
        initial_question: Option<String>,
    ) -> Self {
        let input = match initial_question {
            Some(question) => Input::default().with_value(question),
            None => Input::default(),
        };

        Self {
            state: AppState::new(),
            input,
            focus: Focus::Input,
            return_url,
            answer_scroll: 0,
            modal_scroll: 0,
            tick: 0,
            notice: None,
            should_quit: false,
            services,
            tx,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.tick = self.tick.wrapping_add(1),
            AppEvent::AnswerReady { ticket, result } => {
                if let Err(e) = &result {
                    warn!(error = %e, "Question failed");
                }
                if self.state.resolve_query(&ticket, result) {
                    self.answer_scroll = 0;
                    if self.state.selected().is_none() {
                        self.focus = Focus::Input;
                    }
                }
            }
            AppEvent::VerseReady { ticket, result } => {
                if let Err(e) = &result {
                    warn!(title = %ticket.title, error = %e, "Verse lookup failed");
                }
                if self.state.resolve_verse(&ticket, result) {
                    self.modal_scroll = 0;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.state.is_modal_open() || self.state.is_verse_pending() {
            self.handle_modal_key(key);
            return;
        }

        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.go_back();
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::PageDown => self.answer_scroll = self.answer_scroll.saturating_add(5),
            KeyCode::PageUp => self.answer_scroll = self.answer_scroll.saturating_sub(5),
            _ => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::References => self.handle_references_key(key),
            },
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.state.close_modal();
                self.modal_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.modal_scroll = self.modal_scroll.saturating_add(1)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.modal_scroll = self.modal_scroll.saturating_sub(1)
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => self.should_quit = true,
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
    }

    fn handle_references_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.state.select_prev(),
            KeyCode::Enter => {
                if let Some(index) = self.state.selected() {
                    self.activate(index);
                }
            }
            KeyCode::Esc => self.focus = Focus::Input,
            _ => {}
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.state.selected().is_some() => Focus::References,
            _ => Focus::Input,
        };
    }

    /// Send the current input as a question. Blank input does nothing.
    pub fn submit(&mut self) {
        let Some(ticket) = self.state.submit(self.input.value()) else {
            return;
        };
        info!(question = %ticket.question, "Asking");
        self.answer_scroll = 0;

        let answers = Arc::clone(&self.services.answers);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = answers.ask(&ticket.question).await;
            let _ = tx.send(AppEvent::AnswerReady { ticket, result });
        });
    }

    /// Activate the reference at `index`: verses are looked up, everything
    /// else is opened in the browser.
    pub fn activate(&mut self, index: usize) {
        match self.state.activate(index) {
            Some(Activation::LookupVerse(ticket)) => {
                let verses = Arc::clone(&self.services.verses);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = verses.lookup(&ticket.title).await;
                    let _ = tx.send(AppEvent::VerseReady { ticket, result });
                });
            }
            Some(Activation::OpenLink(link)) => {
                if let Err(e) = self.services.navigator.navigate(&link) {
                    warn!(error = %e, "Could not open link");
                    self.notice = Some(format!("Could not open link: {}", link));
                } else {
                    self.notice = Some(format!("Opened {}", link));
                }
            }
            None => {}
        }
    }

    /// Go to the return page and end the session.
    pub fn go_back(&mut self) {
        match self.services.navigator.navigate(&self.return_url) {
            Ok(()) => self.should_quit = true,
            Err(e) => {
                warn!(error = %e, "Could not open return page");
                self.notice = Some(format!("Could not open {}", self.return_url));
            }
        }
    }
}
