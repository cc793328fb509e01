#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod filter;
mod name;
mod search;
mod service;
mod training;
mod user;

pub use error::*;
pub use exercise::*;
pub use filter::*;
pub use name::*;
pub use search::*;
pub use service::*;
pub use training::*;
pub use user::*;
