pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod graphic;
pub mod output;
pub mod segment;
pub mod session;
pub mod status;
pub mod style;
pub mod upload;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use graphic::{Graphic, MapGeometry};
pub use session::MapSession;
