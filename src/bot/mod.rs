/// Admin broadcast fan-out
pub mod broadcast;
/// Command handlers and the update dispatcher
pub mod commands;
/// Message, media and confession relay
pub mod relay;
/// Send primitives over the Telegram Bot API
pub mod transport;
