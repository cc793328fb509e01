#![warn(clippy::pedantic)]

pub mod empty_list;
pub mod log;
mod pagination;
mod service;
mod settings;

pub use pagination::*;
pub use service::*;
pub use settings::*;
