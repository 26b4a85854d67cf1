//! Query state machine and verse modal.
//!
//! All UI-visible state lives in [`AppState`] and changes only through the
//! transition methods below, so the rules can be tested without a terminal.
//!
//! Network work is represented by tickets. A ticket carries the sequence
//! number that was current when the request started; a result whose ticket is
//! no longer the latest is dropped, so only the most recent query (or verse
//! lookup) can ever reach the screen.

use crate::error::{RequestError, VerseError};
use crate::model::{Answer, Reference, ReferenceKind, SelectedVerse};
use tracing::debug;

/// Where the current query is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryPhase {
    #[default]
    Idle,
    Loading,
    Answered(Answer),
    Failed(String),
}

/// The verse dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerseModal {
    #[default]
    Closed,
    Open(SelectedVerse),
    /// The lookup failed; the error is shown in place of the verse text.
    Failed { title: String, message: String },
}

/// Handle for an in-flight Answer Client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    pub question: String,
}

/// Handle for an in-flight Verse Lookup Client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseTicket {
    seq: u64,
    pub title: String,
}

/// What activating a reference asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    LookupVerse(VerseTicket),
    OpenLink(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    phase: QueryPhase,
    asked: Option<String>,
    query_seq: u64,
    verse_seq: u64,
    pending_verse: Option<u64>,
    modal: VerseModal,
    selected: Option<usize>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &QueryPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, QueryPhase::Loading)
    }

    pub fn answer(&self) -> Option<&Answer> {
        match &self.phase {
            QueryPhase::Answered(answer) => Some(answer),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            QueryPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The question whose result is (or will be) on screen.
    pub fn asked(&self) -> Option<&str> {
        self.asked.as_deref()
    }

    pub fn modal(&self) -> &VerseModal {
        &self.modal
    }

    pub fn is_modal_open(&self) -> bool {
        !matches!(self.modal, VerseModal::Closed)
    }

    pub fn is_verse_pending(&self) -> bool {
        self.pending_verse.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[cfg(test)]
    pub fn selected_reference(&self) -> Option<&Reference> {
        let index = self.selected?;
        self.answer()?.references.get(index)
    }

    /// Start a new query.
    ///
    /// Blank input is ignored and leaves the state untouched. Otherwise the
    /// previous answer and error are cleared, any pending verse lookup is
    /// abandoned and the state enters `Loading`. The ticket carries the
    /// question exactly as typed; only the on-screen title is trimmed.
    pub fn submit(&mut self, question: &str) -> Option<QueryTicket> {
        if question.trim().is_empty() {
            return None;
        }

        self.query_seq += 1;
        self.phase = QueryPhase::Loading;
        self.asked = Some(question.trim().to_string());
        self.selected = None;
        self.pending_verse = None;
        self.modal = VerseModal::Closed;

        debug!(seq = self.query_seq, "Query submitted");
        Some(QueryTicket {
            seq: self.query_seq,
            question: question.to_string(),
        })
    }

    /// Apply the outcome of a query. Returns `false` when the ticket is stale
    /// and the result was discarded.
    pub fn resolve_query(
        &mut self,
        ticket: &QueryTicket,
        result: Result<Answer, RequestError>,
    ) -> bool {
        if ticket.seq != self.query_seq || !self.is_loading() {
            debug!(
                seq = ticket.seq,
                latest = self.query_seq,
                "Discarding stale answer"
            );
            return false;
        }

        self.phase = match result {
            Ok(answer) => {
                self.selected = if answer.references.is_empty() {
                    None
                } else {
                    Some(0)
                };
                QueryPhase::Answered(answer)
            }
            Err(e) => QueryPhase::Failed(e.to_string()),
        };
        true
    }

    pub fn select_next(&mut self) {
        let count = self.reference_count();
        if count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < count => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.reference_count() == 0 {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    fn reference_count(&self) -> usize {
        self.answer().map_or(0, |a| a.references.len())
    }

    /// Activate the reference at `index`.
    ///
    /// Verses start a lookup; every other kind is followed as a link.
    pub fn activate(&mut self, index: usize) -> Option<Activation> {
        let reference = self.answer()?.references.get(index)?.clone();
        self.selected = Some(index);

        match reference.kind {
            ReferenceKind::Verse => {
                self.verse_seq += 1;
                self.pending_verse = Some(self.verse_seq);
                debug!(seq = self.verse_seq, title = %reference.title, "Verse lookup started");
                Some(Activation::LookupVerse(VerseTicket {
                    seq: self.verse_seq,
                    title: reference.title,
                }))
            }
            ReferenceKind::Book | ReferenceKind::Commentary | ReferenceKind::Article => {
                Some(Activation::OpenLink(reference.link))
            }
        }
    }

    /// Apply the outcome of a verse lookup. Returns `false` when the ticket is
    /// stale and the result was discarded.
    pub fn resolve_verse(&mut self, ticket: &VerseTicket, result: Result<String, VerseError>) -> bool {
        if self.pending_verse != Some(ticket.seq) {
            debug!(seq = ticket.seq, "Discarding stale verse");
            return false;
        }

        self.pending_verse = None;
        self.modal = match result {
            Ok(content) => VerseModal::Open(SelectedVerse {
                title: ticket.title.clone(),
                content,
            }),
            Err(e) => VerseModal::Failed {
                title: ticket.title.clone(),
                message: e.to_string(),
            },
        };
        true
    }

    /// Dismiss the verse modal and abandon any lookup still in flight.
    pub fn close_modal(&mut self) {
        self.modal = VerseModal::Closed;
        self.pending_verse = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(kind: ReferenceKind, title: &str) -> Reference {
        Reference {
            kind,
            title: title.to_string(),
            link: format!("https://example.com/{}", title.replace(' ', "-")),
            description: None,
        }
    }

    fn answer() -> Answer {
        Answer {
            text: "Grace abounds.".to_string(),
            references: vec![
                reference(ReferenceKind::Verse, "Romans 5:20"),
                reference(ReferenceKind::Book, "Grace Walk"),
                reference(ReferenceKind::Commentary, "Romans Commentary"),
                reference(ReferenceKind::Article, "On Grace"),
                reference(ReferenceKind::Verse, "John 1:17"),
            ],
        }
    }

    fn answered() -> AppState {
        let mut state = AppState::new();
        let ticket = state.submit("What is grace?").unwrap();
        assert!(state.resolve_query(&ticket, Ok(answer())));
        state
    }

    #[test]
    fn test_blank_question_is_ignored() {
        let mut state = AppState::new();
        assert!(state.submit("").is_none());
        assert!(state.submit("  \n\t ").is_none());
        assert_eq!(state.phase(), &QueryPhase::Idle);

        let mut state = answered();
        assert!(state.submit("   ").is_none());
        assert!(state.answer().is_some());
        assert_eq!(state.asked(), Some("What is grace?"));

        let mut failed = AppState::new();
        let ticket = failed.submit("q").unwrap();
        failed.resolve_query(&ticket, Err(RequestError::Empty));
        assert!(failed.submit(" ").is_none());
        assert!(failed.error().is_some());
    }

    #[test]
    fn test_submit_enters_loading_and_clears_previous_result() {
        let mut state = answered();
        let ticket = state.submit("  Who is Jesus?  ").unwrap();
        assert_eq!(ticket.question, "  Who is Jesus?  ");
        assert_eq!(state.asked(), Some("Who is Jesus?"));
        assert!(state.is_loading());
        assert!(state.answer().is_none());
        assert!(state.error().is_none());
        assert!(state.selected().is_none());

        state.resolve_query(&ticket, Err(RequestError::Network("offline".into())));
        let ticket = state.submit("again").unwrap();
        assert!(state.error().is_none());
        assert!(state.is_loading());
        state.resolve_query(&ticket, Ok(answer()));
        assert!(state.answer().is_some());
    }

    #[test]
    fn test_failure_stores_message_verbatim() {
        let mut state = AppState::new();
        let ticket = state.submit("q").unwrap();
        let err = RequestError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        let expected = err.to_string();
        assert!(state.resolve_query(&ticket, Err(err)));
        assert_eq!(state.error(), Some(expected.as_str()));
        assert!(state.answer().is_none());
    }

    #[test]
    fn test_empty_references_answer() {
        let mut state = AppState::new();
        let ticket = state.submit("q").unwrap();
        let empty = Answer {
            text: "Just this.".to_string(),
            references: vec![],
        };
        assert!(state.resolve_query(&ticket, Ok(empty)));
        assert_eq!(state.answer().unwrap().references.len(), 0);
        assert!(state.selected().is_none());
        assert!(state.activate(0).is_none());
        state.select_next();
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_only_latest_query_is_displayed() {
        let mut state = AppState::new();
        let first = state.submit("first").unwrap();
        let second = state.submit("second").unwrap();

        // Second resolves first, then the slow first response arrives.
        assert!(state.resolve_query(&second, Ok(answer())));
        let stale = Answer {
            text: "stale".to_string(),
            references: vec![],
        };
        assert!(!state.resolve_query(&first, Ok(stale)));
        assert_eq!(state.answer().unwrap().text, "Grace abounds.");
        assert_eq!(state.asked(), Some("second"));
    }

    #[test]
    fn test_stale_failure_does_not_clobber_loading() {
        let mut state = AppState::new();
        let first = state.submit("first").unwrap();
        let _second = state.submit("second").unwrap();
        assert!(!state.resolve_query(&first, Err(RequestError::Empty)));
        assert!(state.is_loading());
    }

    #[test]
    fn test_result_applies_once() {
        let mut state = AppState::new();
        let ticket = state.submit("q").unwrap();
        assert!(state.resolve_query(&ticket, Ok(answer())));
        assert!(!state.resolve_query(&ticket, Err(RequestError::Empty)));
        assert!(state.answer().is_some());
    }

    #[test]
    fn test_verse_activation_requests_lookup() {
        let mut state = answered();
        match state.activate(0) {
            Some(Activation::LookupVerse(ticket)) => assert_eq!(ticket.title, "Romans 5:20"),
            other => panic!("expected verse lookup, got {:?}", other),
        }
        assert!(state.is_verse_pending());
        assert!(!state.is_modal_open());
    }

    #[test]
    fn test_non_verse_activation_follows_link() {
        let mut state = answered();
        for index in 1..=3 {
            match state.activate(index) {
                Some(Activation::OpenLink(link)) => assert!(link.starts_with("https://example.com/")),
                other => panic!("expected link, got {:?}", other),
            }
        }
        assert!(!state.is_verse_pending());
    }

    #[test]
    fn test_verse_resolution_opens_modal() {
        let mut state = answered();
        let Some(Activation::LookupVerse(ticket)) = state.activate(0) else {
            panic!("expected verse lookup");
        };
        assert!(state.resolve_verse(&ticket, Ok("Where sin increased...".to_string())));
        assert_eq!(
            state.modal(),
            &VerseModal::Open(SelectedVerse {
                title: "Romans 5:20".to_string(),
                content: "Where sin increased...".to_string(),
            })
        );
        assert!(!state.is_verse_pending());
    }

    #[test]
    fn test_verse_failure_is_shown_in_modal() {
        let mut state = answered();
        let Some(Activation::LookupVerse(ticket)) = state.activate(0) else {
            panic!("expected verse lookup");
        };
        state.resolve_verse(&ticket, Err(VerseError::Status(502)));
        assert_eq!(
            state.modal(),
            &VerseModal::Failed {
                title: "Romans 5:20".to_string(),
                message: "The verse service returned 502.".to_string(),
            }
        );
    }

    #[test]
    fn test_close_then_reopen_shows_new_verse() {
        let mut state = answered();
        let Some(Activation::LookupVerse(first)) = state.activate(0) else {
            panic!("expected verse lookup");
        };
        state.resolve_verse(&first, Ok("first text".to_string()));
        state.close_modal();
        assert_eq!(state.modal(), &VerseModal::Closed);

        let Some(Activation::LookupVerse(second)) = state.activate(4) else {
            panic!("expected verse lookup");
        };
        state.resolve_verse(&second, Ok("second text".to_string()));
        match state.modal() {
            VerseModal::Open(verse) => {
                assert_eq!(verse.title, "John 1:17");
                assert_eq!(verse.content, "second text");
            }
            other => panic!("expected open modal, got {:?}", other),
        }
    }

    #[test]
    fn test_only_latest_verse_lookup_opens() {
        let mut state = answered();
        let Some(Activation::LookupVerse(first)) = state.activate(0) else {
            panic!("expected verse lookup");
        };
        let Some(Activation::LookupVerse(second)) = state.activate(4) else {
            panic!("expected verse lookup");
        };
        assert!(!state.resolve_verse(&first, Ok("old".to_string())));
        assert!(!state.is_modal_open());
        assert!(state.resolve_verse(&second, Ok("new".to_string())));
    }

    #[test]
    fn test_new_query_abandons_pending_verse() {
        let mut state = answered();
        let Some(Activation::LookupVerse(ticket)) = state.activate(0) else {
            panic!("expected verse lookup");
        };
        state.submit("another question").unwrap();
        assert!(!state.resolve_verse(&ticket, Ok("late".to_string())));
        assert!(!state.is_modal_open());
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut state = answered();
        assert_eq!(state.selected(), Some(0));
        state.select_prev();
        assert_eq!(state.selected(), Some(0));
        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.selected(), Some(4));
        assert_eq!(state.selected_reference().unwrap().title, "John 1:17");
    }
}
