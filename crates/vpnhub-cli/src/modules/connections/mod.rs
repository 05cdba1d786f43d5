mod actions;
pub(crate) mod args;

pub(crate) use actions::{handle_connect, handle_disconnect, handle_status};
