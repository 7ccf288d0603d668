// Messaging - UI intents and the lock-free click channel to the audio thread

pub mod channels;
pub mod command;
