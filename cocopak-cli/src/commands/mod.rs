//! Command implementations for the cocopak CLI.

pub mod info;
pub mod pack;
pub mod unpack;

pub use info::cmd_info;
pub use pack::{cmd_gzip, cmd_zip};
pub use unpack::cmd_unzip;
