pub mod schema;

pub use schema::{Config, ExposeSpec, ExposeTarget};
