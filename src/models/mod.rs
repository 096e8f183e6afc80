pub mod profile;
pub mod trade;

pub use profile::*;
pub use trade::*;
