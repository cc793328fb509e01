use std::collections::VecDeque;

use gloo_storage::{LocalStorage as GlooLocalStorage, Storage as GlooStorage, errors::StorageError};
use gym_tracker_domain as domain;
use gym_tracker_web_app::{Settings, SettingsRepository, log};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

use crate::{SessionStore, rest};

#[derive(Clone, Copy, Default)]
pub struct LocalStorage;

#[derive(AsRefStr, Clone, Copy)]
enum Key {
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "log")]
    Log,
    #[strum(serialize = "access_token")]
    AccessToken,
    #[strum(serialize = "user_data")]
    User,
}

fn get<T: DeserializeOwned>(key: Key) -> Result<Option<T>, StorageError> {
    match GlooLocalStorage::get(key.as_ref()) {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::KeyNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn set<T: Serialize>(key: Key, value: T) -> Result<(), StorageError> {
    GlooLocalStorage::set(key.as_ref(), value)
}

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        get(Key::Settings)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        set(Key::Settings, settings).map_err(|err| err.to_string())
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        get(Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        set(Key::Log, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

impl SessionStore for LocalStorage {
    fn read_access_token(&self) -> Option<String> {
        get::<String>(Key::AccessToken).ok().flatten()
    }

    fn write_access_token(&self, access_token: &str) -> Result<(), String> {
        set(Key::AccessToken, access_token).map_err(|err| err.to_string())
    }

    fn read_user(&self) -> Option<domain::User> {
        get::<rest::User>(Key::User).ok().flatten().map(Into::into)
    }

    fn write_user(&self, user: &domain::User) -> Result<(), String> {
        set(Key::User, rest::User::from(user.clone())).map_err(|err| err.to_string())
    }

    fn clear(&self) {
        GlooLocalStorage::delete(Key::AccessToken.as_ref());
        GlooLocalStorage::delete(Key::User.as_ref());
    }
}
