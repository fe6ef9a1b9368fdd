pub mod client;
pub mod constants;
pub mod data;
pub mod dimensions;
pub mod structs;
pub mod sync;

pub use client::*;
pub use data::*;
pub use structs::*;
