use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};

use crate::{
    CreateError, DeleteError, Exercise, ExerciseDraft, ExerciseEntry, Name, NameError, ReadError,
    Searchable, ValidationError, Value, flatten,
};

#[allow(async_fn_in_trait)]
pub trait TrainingService {
    async fn get_trainings(&self, limit: u32, offset: u32) -> Result<TrainingPage, ReadError>;
    async fn create_training(&self, training: CreateTraining) -> Result<Training, CreateError>;
    async fn delete_training(&self, id: TrainingID) -> Result<TrainingID, DeleteError>;

    fn validate_kind(&self, kind: &str) -> Result<Name, ValidationError> {
        Name::new(kind).map_err(|err| match err {
            NameError::Empty => ValidationError::Empty("Kind"),
            NameError::TooLong(len) => ValidationError::TooLong {
                field: "Kind",
                len,
                max: Name::MAX_LEN,
            },
        })
    }

    fn validate_training(
        &self,
        kind: &str,
        date: DateTime<Utc>,
        exercises: Vec<ExerciseEntry<ExerciseDraft>>,
    ) -> Result<CreateTraining, ValidationError> {
        CreateTraining::new(self.validate_kind(kind)?, date, exercises)
    }
}

#[allow(async_fn_in_trait)]
pub trait TrainingRepository {
    async fn read_trainings(&self, limit: u32, offset: u32) -> Result<TrainingPage, ReadError>;
    async fn create_training(&self, training: CreateTraining) -> Result<Training, CreateError>;
    async fn delete_training(&self, id: TrainingID) -> Result<TrainingID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Training {
    pub id: TrainingID,
    /// Workout category, lower-cased by the backend on creation.
    pub kind: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub exercises: Vec<ExerciseEntry<Exercise>>,
}

impl Training {
    /// All exercises in order, including the members of supersets.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        flatten(&self.exercises)
    }

    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.to_lowercase() == kind.to_lowercase()
    }
}

impl Searchable for Training {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => Some(self.id.as_str().into()),
            "kind" => Some(self.kind.as_str().into()),
            "exercises" => Some(Value::List(
                self.exercises.iter().map(Value::from).collect(),
            )),
            _ => None,
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrainingID(String);

impl From<String> for TrainingID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TrainingID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Training as submitted for creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTraining {
    pub kind: Name,
    pub date: DateTime<Utc>,
    pub exercises: Vec<ExerciseEntry<ExerciseDraft>>,
}

impl CreateTraining {
    pub fn new(
        kind: Name,
        date: DateTime<Utc>,
        exercises: Vec<ExerciseEntry<ExerciseDraft>>,
    ) -> Result<Self, ValidationError> {
        if exercises.is_empty() {
            return Err(ValidationError::Empty("Exercises"));
        }
        if exercises.iter().any(|e| e.exercises().is_empty()) {
            return Err(ValidationError::Empty("Superset"));
        }
        Ok(Self {
            kind,
            date,
            exercises,
        })
    }
}

/// One page of trainings together with the position of the page in the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPage {
    pub trainings: Vec<Training>,
    pub total_count: u32,
    pub has_more: bool,
    pub current_page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub offset: u32,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{StorageError, search_in_object};

    struct Validator;

    impl TrainingService for Validator {
        async fn get_trainings(&self, _: u32, _: u32) -> Result<TrainingPage, ReadError> {
            Err(ReadError::Storage(StorageError::NoConnection))
        }

        async fn create_training(&self, _: CreateTraining) -> Result<Training, CreateError> {
            Err(CreateError::Other("unsupported".into()))
        }

        async fn delete_training(&self, id: TrainingID) -> Result<TrainingID, DeleteError> {
            Ok(id)
        }
    }

    fn draft(name: &str) -> ExerciseDraft {
        ExerciseDraft {
            name: name.to_string(),
            repetitions: 8,
            sets: 4,
            weight: 60.0,
            per_side: false,
        }
    }

    fn exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: name.to_string(),
            repetitions: 8,
            sets: 4,
            weight: 60.0,
            per_side: false,
        }
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn training() -> Training {
        Training {
            id: "t1".into(),
            kind: "верх".to_string(),
            date: date(),
            created_at: date(),
            updated_at: date(),
            exercises: vec![
                ExerciseEntry::Single(exercise("e1", "Жим лежачи")),
                ExerciseEntry::Superset(vec![exercise("e2", "Тяга"), exercise("e3", "Розводка")]),
            ],
        }
    }

    #[rstest]
    #[case("Верх", Ok(Name::new("Верх").unwrap()))]
    #[case("  Низ ", Ok(Name::new("Низ").unwrap()))]
    #[case("", Err(ValidationError::Empty("Kind")))]
    #[case("   ", Err(ValidationError::Empty("Kind")))]
    #[case(&"я".repeat(101), Err(ValidationError::TooLong { field: "Kind", len: 101, max: 100 }))]
    fn test_validate_kind(#[case] kind: &str, #[case] expected: Result<Name, ValidationError>) {
        assert_eq!(Validator.validate_kind(kind), expected);
    }

    #[test]
    fn test_validate_training() {
        assert_eq!(
            Validator.validate_training("", date(), vec![ExerciseEntry::Single(draft("Тяга"))]),
            Err(ValidationError::Empty("Kind"))
        );
        assert_eq!(
            Validator.validate_training("Верх", date(), vec![]),
            Err(ValidationError::Empty("Exercises"))
        );
        assert_eq!(
            Validator.validate_training("Верх", date(), vec![ExerciseEntry::Superset(vec![])]),
            Err(ValidationError::Empty("Superset"))
        );
        assert_eq!(
            Validator.validate_training(
                " Верх ",
                date(),
                vec![
                    ExerciseEntry::Single(draft("Жим лежачи")),
                    ExerciseEntry::Superset(vec![draft("Тяга"), draft("Розводка")])
                ]
            ),
            Ok(CreateTraining {
                kind: Name::new("Верх").unwrap(),
                date: date(),
                exercises: vec![
                    ExerciseEntry::Single(draft("Жим лежачи")),
                    ExerciseEntry::Superset(vec![draft("Тяга"), draft("Розводка")])
                ]
            })
        );
    }

    #[test]
    fn test_training_exercises() {
        assert_eq!(
            training()
                .exercises()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>(),
            vec!["e1", "e2", "e3"]
        );
    }

    #[rstest]
    #[case("верх", true)]
    #[case("Верх", true)]
    #[case("ВЕРХ", true)]
    #[case("низ", false)]
    #[case("вер", false)]
    fn test_training_is_kind(#[case] kind: &str, #[case] expected: bool) {
        assert_eq!(training().is_kind(kind), expected);
    }

    #[rstest]
    #[case(&["kind"], "ВЕР", true)]
    #[case(&["exercises"], "розв", true)]
    #[case(&["exercises"], "60", true)]
    #[case(&["kind"], "тяга", false)]
    #[case(&["date"], "2025", false)]
    fn test_training_search_fields(
        #[case] fields: &[&str],
        #[case] query: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(search_in_object(&training(), fields, query), expected);
    }
}
