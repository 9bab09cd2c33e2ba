pub mod deck;

pub use deck::{Deck, DeckData, DeckError, Page, Theme};
