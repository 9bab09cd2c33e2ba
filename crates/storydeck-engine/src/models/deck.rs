use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Invalid deck document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A page-deck document: an ordered sequence of pages under `data.pages`.
///
/// This is the preview side's typed view and is only parsed on demand from
/// a complete, valid document. The live sync path never builds a `Deck`; it
/// works on raw text so that mid-keystroke invalidity cannot break it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub data: DeckData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// One page of the deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Visual theming for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl Deck {
    /// Parse a complete deck document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DeckError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Number of pages in the deck.
    pub fn page_count(&self) -> usize {
        self.data.pages.len()
    }

    /// The page at `index`, if any.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.data.pages.get(index)
    }
}

impl Page {
    /// Display name for lists: the title when present, else the id.
    pub fn display_name(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.id,
        }
    }
}
