//! Utility functions and helpers.

pub mod browser;
pub mod credentials;
pub mod input;
pub mod settings;

pub use browser::{open_url, Presentation};
pub use credentials::Credentials;
pub use input::{InputProvider, InteractiveInput, NonInteractiveInput};
pub use settings::{get_env_var, Settings};
