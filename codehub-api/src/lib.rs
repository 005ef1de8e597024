mod client;
mod control_plane;
mod error;

pub use client::Client;
pub use control_plane::ControlPlane;
pub use error::{ApiError, Result};
