pub mod content_block;
pub mod incident;
pub mod settings;

pub use content_block::*;
pub use incident::*;
pub use settings::*;
