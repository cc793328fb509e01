#![warn(clippy::pedantic)]

use gym_tracker_domain as domain;

#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod rest;
pub mod single_flight;

/// Persistent state of the current login.
pub trait SessionStore {
    fn read_access_token(&self) -> Option<String>;
    #[allow(clippy::missing_errors_doc)]
    fn write_access_token(&self, access_token: &str) -> Result<(), String>;
    fn read_user(&self) -> Option<domain::User>;
    #[allow(clippy::missing_errors_doc)]
    fn write_user(&self, user: &domain::User) -> Result<(), String>;
    fn clear(&self);
}
