pub mod loader;

pub use loader::{Asset, Loader};
