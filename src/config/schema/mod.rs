mod core;
mod funnel;

pub use core::Config;
pub use funnel::{ExposeSpec, ExposeTarget};
