pub mod registry;

pub use registry::ExtensionRegistry;
