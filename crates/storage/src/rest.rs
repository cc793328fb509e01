//! REST
//!
//! Repository implementations on top of the gym tracker backend. All requests except those to
//! `/auth/*` carry the access token of the current session. A request rejected with 401 triggers
//! one token refresh and is then retried once. Refreshes of concurrent requests are coalesced.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures_util::{
    future::{self, Either},
    pin_mut,
};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use gym_tracker_domain as domain;
use gym_tracker_web_app::Settings;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use web_sys::{AbortController, AbortSignal};

use crate::{SessionStore, single_flight::SingleFlight};

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Copy, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

pub struct REST<S: SendRequest, T: SessionStore> {
    pub sender: S,
    pub session: T,
    settings: Settings,
    refresh: SingleFlight<Result<String, RefreshError>>,
}

impl<T: SessionStore> REST<GlooNetSendRequest, T> {
    #[must_use]
    pub fn new(settings: Settings, session: T) -> Self {
        Self::with_sender(GlooNetSendRequest, settings, session)
    }
}

impl<S: SendRequest, T: SessionStore> REST<S, T> {
    #[must_use]
    pub fn with_sender(sender: S, settings: Settings, session: T) -> Self {
        Self {
            sender,
            session,
            settings,
            refresh: SingleFlight::new(),
        }
    }

    async fn fetch<R>(&self, method: Method, path: &str) -> Result<R, domain::StorageError>
    where
        R: 'static + for<'de> Deserialize<'de>,
    {
        let response = self.fetch_response(method, path).await?;
        response.json::<R>().await.map_err(|err| {
            domain::StorageError::Other(format!("deserialization failed: {err}").into())
        })
    }

    async fn fetch_no_content(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(), domain::StorageError> {
        self.fetch_response(method, path).await.map(|_| ())
    }

    async fn fetch_response(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Response, domain::StorageError> {
        if is_auth_endpoint(path) {
            return check(self.send(&method, path, None).await?).await;
        }

        let access_token = self.session.read_access_token();
        let response = self.send(&method, path, access_token.as_deref()).await?;

        if response.status() == 401 {
            debug!("access token rejected for {path}");
            let access_token = self.refresh_access_token().await?;
            return check(self.send(&method, path, Some(&access_token)).await?).await;
        }

        check(response).await
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        access_token: Option<&str>,
    ) -> Result<Response, domain::StorageError> {
        let controller = AbortController::new().ok();
        let signal = controller.as_ref().map(AbortController::signal);
        let request = self.request(method, path, access_token, signal.as_ref())?;

        let response = self.sender.send_request(request);
        let timeout = TimeoutFuture::new(
            u32::try_from(self.settings.request_timeout().as_millis()).unwrap_or(u32::MAX),
        );
        pin_mut!(response, timeout);

        match future::select(response, timeout).await {
            Either::Left((result, _)) => result.map_err(|err| {
                debug!("failed to send request to {path}: {err}");
                domain::StorageError::NoConnection
            }),
            Either::Right(((), _)) => {
                if let Some(controller) = controller {
                    controller.abort();
                }
                Err(domain::StorageError::Timeout)
            }
        }
    }

    fn request(
        &self,
        method: &Method,
        path: &str,
        access_token: Option<&str>,
        signal: Option<&AbortSignal>,
    ) -> Result<Request, domain::StorageError> {
        let url = self.settings.endpoint(path);
        let mut builder = match method {
            Method::Get => Request::get(&url),
            Method::Post(_) => Request::post(&url),
            Method::Delete => Request::delete(&url),
        }
        .abort_signal(signal);
        if let Some(access_token) = access_token {
            builder = builder.header("Authorization", &format!("Bearer {access_token}"));
        }
        match method {
            Method::Post(body) => builder.json(body),
            Method::Get | Method::Delete => builder.build(),
        }
        .map_err(|err| domain::StorageError::Other(err.into()))
    }

    async fn refresh_access_token(&self) -> Result<String, domain::StorageError> {
        self.refresh
            .run(move || async move {
                let result = self.request_access_token().await;
                if result.is_err() {
                    self.session.clear();
                }
                result
            })
            .await
            .map_err(|err| {
                debug!("failed to refresh access token: {err}");
                domain::StorageError::Auth
            })
    }

    async fn request_access_token(&self) -> Result<String, RefreshError> {
        let access_token = self
            .session
            .read_access_token()
            .ok_or(RefreshError::NoToken)?;
        let method = Method::Post(json!({ "accessToken": access_token }));
        let response = self
            .send(&method, "/auth/refresh", None)
            .await
            .map_err(|err| RefreshError::Failed(err.to_string()))?;
        let response: RefreshResponse = check(response)
            .await
            .map_err(|err| RefreshError::Failed(err.to_string()))?
            .json()
            .await
            .map_err(|err| RefreshError::Failed(err.to_string()))?;
        self.session
            .write_access_token(&response.access_token)
            .map_err(RefreshError::Failed)?;
        Ok(response.access_token)
    }

    async fn authenticate(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<domain::User, domain::ReadError> {
        let response: AuthResponse = self.fetch(Method::Post(body), path).await?;
        let access_token = response
            .access_token()
            .ok_or_else(|| domain::ReadError::Other("missing access token".into()))?;
        let user = domain::User::from(response.user.clone());
        self.session
            .write_access_token(access_token)
            .map_err(|err| domain::ReadError::Other(err.into()))?;
        self.session
            .write_user(&user)
            .map_err(|err| domain::ReadError::Other(err.into()))?;
        Ok(user)
    }
}

impl<S: SendRequest, T: SessionStore> domain::TrainingRepository for REST<S, T> {
    async fn read_trainings(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<domain::TrainingPage, domain::ReadError> {
        let response: TrainingsResponse = self
            .fetch(
                Method::Get,
                &format!("/trainings?limit={limit}&offset={offset}"),
            )
            .await?;
        Ok(response.into())
    }

    async fn create_training(
        &self,
        training: domain::CreateTraining,
    ) -> Result<domain::Training, domain::CreateError> {
        let body = serde_json::to_value(CreateTraining::from(training))
            .map_err(|err| domain::CreateError::Other(err.into()))?;
        let training: Training = self.fetch(Method::Post(body), "/trainings").await?;
        Ok(training.into())
    }

    async fn delete_training(
        &self,
        id: domain::TrainingID,
    ) -> Result<domain::TrainingID, domain::DeleteError> {
        self.fetch_no_content(Method::Delete, &format!("/trainings/{id}"))
            .await?;
        Ok(id)
    }
}

impl<S: SendRequest, T: SessionStore> domain::ExerciseRepository for REST<S, T> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let exercises: Vec<Exercise> = self.fetch(Method::Get, "/exercises").await?;
        Ok(exercises.into_iter().map(Into::into).collect())
    }

    async fn read_unique_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let exercises: Vec<Exercise> = self.fetch(Method::Get, "/exercises?uniq=true").await?;
        Ok(exercises.into_iter().map(Into::into).collect())
    }
}

impl<S: SendRequest, T: SessionStore> domain::AuthRepository for REST<S, T> {
    async fn login(
        &self,
        credentials: domain::Credentials,
    ) -> Result<domain::User, domain::ReadError> {
        self.authenticate(
            "/auth/login",
            json!({ "email": credentials.email, "password": credentials.password }),
        )
        .await
    }

    async fn register(
        &self,
        registration: domain::Registration,
    ) -> Result<domain::User, domain::ReadError> {
        self.authenticate(
            "/auth/register",
            json!({
                "email": registration.email,
                "password": registration.password,
                "name": registration.name,
            }),
        )
        .await
    }

    async fn login_with_google(
        &self,
        google_token: &str,
    ) -> Result<domain::User, domain::ReadError> {
        self.authenticate("/auth/google", json!({ "token": google_token }))
            .await
    }

    async fn logout(&self) -> Result<(), domain::DeleteError> {
        if let Err(err) = self
            .fetch_no_content(Method::Post(json!({})), "/auth/logout")
            .await
        {
            debug!("failed to log out on server: {err}");
        }
        self.session.clear();
        Ok(())
    }

    async fn read_user(&self) -> Result<domain::User, domain::ReadError> {
        match (self.session.read_access_token(), self.session.read_user()) {
            (Some(_), Some(user)) => Ok(user),
            _ => Err(domain::ReadError::Storage(domain::StorageError::NoSession)),
        }
    }
}

enum Method {
    Get,
    Post(serde_json::Value),
    Delete,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
enum RefreshError {
    #[error("no access token")]
    NoToken,
    #[error("{0}")]
    Failed(String),
}

fn is_auth_endpoint(path: &str) -> bool {
    path.starts_with("/auth/")
}

async fn check(response: Response) -> Result<Response, domain::StorageError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(domain::StorageError::Http {
        status,
        message: error_message(status, &response.status_text(), &body),
    })
}

/// Prefers the `message` of a JSON error body, then the raw body, then the status line.
fn error_message(status: u16, status_text: &str, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
    {
        return message;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    format!("{status} {status_text}").trim_end().to_string()
}

/// Groups exercises referencing the same superset into one entry at the position of the first
/// member.
fn group_supersets(
    entries: Vec<ExerciseEntry<Exercise>>,
) -> Vec<domain::ExerciseEntry<domain::Exercise>> {
    let mut result: Vec<domain::ExerciseEntry<domain::Exercise>> = vec![];
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        match entry {
            ExerciseEntry::Superset(exercises) => result.push(domain::ExerciseEntry::Superset(
                exercises.into_iter().map(Into::into).collect(),
            )),
            ExerciseEntry::Single(exercise) => match exercise.superset_id.clone() {
                Some(superset_id) => {
                    if let Some(&position) = positions.get(&superset_id) {
                        if let Some(domain::ExerciseEntry::Superset(members)) =
                            result.get_mut(position)
                        {
                            members.push(exercise.into());
                        }
                    } else {
                        positions.insert(superset_id, result.len());
                        result.push(domain::ExerciseEntry::Superset(vec![exercise.into()]));
                    }
                }
                None => result.push(domain::ExerciseEntry::Single(exercise.into())),
            },
        }
    }

    result
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<User> for domain::User {
    fn from(value: User) -> Self {
        domain::User {
            id: value.id.into(),
            email: value.email,
            name: value.name,
            avatar: value.avatar,
        }
    }
}

impl From<domain::User> for User {
    fn from(value: domain::User) -> Self {
        User {
            id: value.id.to_string(),
            email: value.email,
            name: value.name,
            avatar: value.avatar,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    user: User,
    access_token: Option<String>,
    tokens: Option<Tokens>,
}

impl AuthResponse {
    fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or_else(|| self.tokens.as_ref().map(|tokens| tokens.access_token.as_str()))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Tokens {
    access_token: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub per_side: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_id: Option<String>,
}

impl From<Exercise> for domain::Exercise {
    fn from(value: Exercise) -> Self {
        domain::Exercise {
            id: value.id.into(),
            name: value.name,
            repetitions: value.repetitions,
            sets: value.sets,
            weight: value.weight.unwrap_or(0.0),
            per_side: value.per_side,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ExerciseDraft {
    name: String,
    repetitions: u32,
    sets: u32,
    weight: f32,
    per_side: bool,
}

impl From<domain::ExerciseDraft> for ExerciseDraft {
    fn from(value: domain::ExerciseDraft) -> Self {
        ExerciseDraft {
            name: value.name,
            repetitions: value.repetitions,
            sets: value.sets,
            weight: value.weight,
            per_side: value.per_side,
        }
    }
}

/// A single exercise is encoded as object, a superset as array of objects.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum ExerciseEntry<E> {
    Superset(Vec<E>),
    Single(E),
}

impl From<domain::ExerciseEntry<domain::ExerciseDraft>> for ExerciseEntry<ExerciseDraft> {
    fn from(value: domain::ExerciseEntry<domain::ExerciseDraft>) -> Self {
        match value {
            domain::ExerciseEntry::Single(exercise) => ExerciseEntry::Single(exercise.into()),
            domain::ExerciseEntry::Superset(exercises) => {
                ExerciseEntry::Superset(exercises.into_iter().map(Into::into).collect())
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct CreateTraining {
    kind: String,
    date: DateTime<Utc>,
    exercises: Vec<ExerciseEntry<ExerciseDraft>>,
}

impl From<domain::CreateTraining> for CreateTraining {
    fn from(value: domain::CreateTraining) -> Self {
        CreateTraining {
            kind: value.kind.to_lowercase(),
            date: value.date,
            exercises: value.exercises.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Training {
    id: String,
    kind: String,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    exercises: Option<Vec<ExerciseEntry<Exercise>>>,
}

impl From<Training> for domain::Training {
    fn from(value: Training) -> Self {
        domain::Training {
            id: value.id.into(),
            kind: value.kind,
            date: value.date,
            created_at: value.created_at,
            updated_at: value.updated_at,
            exercises: group_supersets(value.exercises.unwrap_or_default()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TrainingsResponse {
    trainings: Vec<Training>,
    total_count: u32,
    has_more: bool,
    current_page: u32,
    total_pages: u32,
    limit: u32,
    offset: u32,
}

impl From<TrainingsResponse> for domain::TrainingPage {
    fn from(value: TrainingsResponse) -> Self {
        domain::TrainingPage {
            trainings: value.trainings.into_iter().map(Into::into).collect(),
            total_count: value.total_count,
            has_more: value.has_more,
            current_page: value.current_page,
            total_pages: value.total_pages,
            limit: value.limit,
            offset: value.offset,
        }
    }
}
