// Purpose: the fixed keyboard layout and input translation

pub mod router;
pub mod table;

pub use router::{InputEvent, InputRouter, VoiceAction};
pub use table::{KeyColor, NoteDefinition, KEY_COUNT, NOTES};
