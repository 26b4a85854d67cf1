//! Answer and reference types shared by the clients, the state machine and
//! the UI.

use crate::error::RequestError;
use serde::{Deserialize, Deserializer, Serialize};

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Verse,
    Book,
    Commentary,
    Article,
}

impl ReferenceKind {
    /// Glyph shown next to the reference in the list.
    pub fn icon(self) -> &'static str {
        match self {
            ReferenceKind::Verse => "📖",
            ReferenceKind::Book => "🎓",
            ReferenceKind::Commentary => "💬",
            ReferenceKind::Article => "🔗",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReferenceKind::Verse => "verse",
            ReferenceKind::Book => "book",
            ReferenceKind::Commentary => "commentary",
            ReferenceKind::Article => "article",
        }
    }
}

/// A citation returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub title: String,
    pub link: String,
    #[serde(
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

/// The generated response to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(alias = "answer")]
    pub text: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// Verse currently shown in the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedVerse {
    pub title: String,
    pub content: String,
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Parse the raw completion text of an answer backend.
///
/// Models occasionally wrap the JSON in a Markdown fence or add a sentence
/// around it, so the outermost `{ ... }` span is extracted first.
pub fn parse_answer(raw: &str) -> Result<Answer, RequestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RequestError::Empty);
    }

    let json = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(RequestError::Parse(
                "the response did not contain a JSON object".to_string(),
            ))
        }
    };

    let answer: Answer =
        serde_json::from_str(json).map_err(|e| RequestError::Parse(e.to_string()))?;

    if answer.text.trim().is_empty() {
        return Err(RequestError::Empty);
    }

    Ok(answer)
}
