mod settings;
mod variant;

pub use settings::*;
pub use variant::*;
