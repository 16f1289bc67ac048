mod play;
mod preset;

pub use play::handle_play_command;
pub use preset::handle_preset_command;
