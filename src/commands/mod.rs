pub mod analytics;
pub mod profile;
pub mod trades;

pub use analytics::*;
pub use profile::*;
pub use trades::*;
