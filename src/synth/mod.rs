// Purpose: voice management, envelope scheduling, master bus
// This layer sits above the audio host and turns note requests into nodes

pub mod envelope;
pub mod master;
pub mod registry;
pub mod settings;
pub mod voice;

pub use envelope::Envelope;
pub use master::MasterBus;
pub use registry::VoiceRegistry;
pub use settings::SynthSettings;
pub use voice::{Voice, VoiceId, VoiceState};
