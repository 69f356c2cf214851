pub mod loader;
pub mod template;
pub mod types;

pub use loader::ConfigLoader;
pub use template::{CommandTemplate, TemplateVars};
pub use types::AppConfig;
