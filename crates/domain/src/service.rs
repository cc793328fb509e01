use log::{debug, error};

use crate::{
    AuthRepository, AuthService, CreateError, CreateTraining, Credentials, DeleteError, Exercise,
    ExerciseRepository, ExerciseService, ReadError, Registration, Training, TrainingID,
    TrainingPage, TrainingRepository, TrainingService, User,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(storage) if storage.is_network() => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: TrainingRepository> TrainingService for Service<R> {
    async fn get_trainings(&self, limit: u32, offset: u32) -> Result<TrainingPage, ReadError> {
        log_on_error!(
            self.repository.read_trainings(limit, offset),
            ReadError,
            "get",
            "trainings"
        )
    }

    async fn create_training(&self, training: CreateTraining) -> Result<Training, CreateError> {
        log_on_error!(
            self.repository.create_training(training),
            CreateError,
            "create",
            "training"
        )
    }

    async fn delete_training(&self, id: TrainingID) -> Result<TrainingID, DeleteError> {
        log_on_error!(
            self.repository.delete_training(id),
            DeleteError,
            "delete",
            "training"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_unique_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_unique_exercises(),
            ReadError,
            "get",
            "unique exercises"
        )
    }
}

impl<R: AuthRepository> AuthService for Service<R> {
    async fn login(&self, credentials: Credentials) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.login(credentials),
            ReadError,
            "log in",
            "user"
        )
    }

    async fn register(&self, registration: Registration) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.register(registration),
            ReadError,
            "register",
            "user"
        )
    }

    async fn login_with_google(&self, google_token: &str) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.login_with_google(google_token),
            ReadError,
            "log in",
            "google user"
        )
    }

    async fn logout(&self) -> Result<(), DeleteError> {
        log_on_error!(self.repository.logout(), DeleteError, "log out", "user")
    }

    async fn get_user(&self) -> Result<User, ReadError> {
        self.repository.read_user().await
    }
}
