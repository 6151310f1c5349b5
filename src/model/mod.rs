pub mod config;
pub mod habit;
pub mod profile;

pub use config::*;
pub use habit::*;
pub use profile::*;
