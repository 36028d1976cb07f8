pub mod commands;
pub mod dispatch;
pub mod status;
