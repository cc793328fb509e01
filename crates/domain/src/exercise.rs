use derive_more::{Deref, Display};

use crate::{Name, ReadError, Searchable, ValidationError, Value};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    /// One exercise per distinct name, used for name suggestions.
    async fn get_unique_exercises(&self) -> Result<Vec<Exercise>, ReadError>;

    async fn get_exercise_names(&self) -> Result<Vec<String>, ReadError> {
        Ok(self
            .get_unique_exercises()
            .await?
            .into_iter()
            .map(|e| e.name)
            .collect())
    }

    fn validate_exercise_name(&self, name: &str) -> Result<Name, ValidationError> {
        Ok(Name::new(name)?)
    }

    fn validate_repetitions(&self, repetitions: &str) -> Result<u32, ValidationError> {
        parse_positive_integer(repetitions, "Repetitions")
    }

    fn validate_sets(&self, sets: &str) -> Result<u32, ValidationError> {
        parse_positive_integer(sets, "Sets")
    }

    /// An empty weight means the weight is unspecified.
    fn validate_weight(&self, weight: &str) -> Result<f32, ValidationError> {
        let weight = weight.trim();
        if weight.is_empty() {
            return Ok(0.0);
        }
        match weight.replace(',', ".").parse::<f32>() {
            Ok(parsed_weight) if parsed_weight.is_finite() && parsed_weight >= 0.0 => {
                Ok(parsed_weight)
            }
            _ => Err(ValidationError::NotNonNegativeDecimal("Weight")),
        }
    }

    fn validate_superset(
        &self,
        exercises: Vec<ExerciseDraft>,
    ) -> Result<ExerciseEntry<ExerciseDraft>, ValidationError> {
        if exercises.is_empty() {
            return Err(ValidationError::Empty("Superset"));
        }
        Ok(ExerciseEntry::Superset(exercises))
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_unique_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: String,
    pub repetitions: u32,
    pub sets: u32,
    /// Zero if unspecified.
    pub weight: f32,
    pub per_side: bool,
}

impl Exercise {
    pub const SEARCH_FIELDS: &[&str] = &["name"];
}

impl Searchable for Exercise {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "repetitions" => Some(self.repetitions.into()),
            "sets" => Some(self.sets.into()),
            "weight" => Some(self.weight.into()),
            "per_side" => Some(self.per_side.into()),
            _ => None,
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseID(String);

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Exercise as entered before submission. It has no identity apart from its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub repetitions: u32,
    pub sets: u32,
    pub weight: f32,
    pub per_side: bool,
}

impl ExerciseDraft {
    #[must_use]
    pub fn new(name: Name, repetitions: u32, sets: u32, weight: f32, per_side: bool) -> Self {
        Self {
            name: name.into(),
            repetitions,
            sets,
            weight,
            per_side,
        }
    }
}

impl From<Exercise> for ExerciseDraft {
    fn from(value: Exercise) -> Self {
        Self {
            name: value.name,
            repetitions: value.repetitions,
            sets: value.sets,
            weight: value.weight,
            per_side: value.per_side,
        }
    }
}

/// Entry of a training's exercise list.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseEntry<E> {
    Single(E),
    /// Exercises performed back-to-back.
    Superset(Vec<E>),
}

impl<E> ExerciseEntry<E> {
    #[must_use]
    pub fn exercises(&self) -> &[E] {
        match self {
            ExerciseEntry::Single(exercise) => std::slice::from_ref(exercise),
            ExerciseEntry::Superset(exercises) => exercises,
        }
    }

    #[must_use]
    pub fn is_superset(&self) -> bool {
        matches!(self, ExerciseEntry::Superset(_))
    }

    pub fn map<F, T>(self, mut f: F) -> ExerciseEntry<T>
    where
        F: FnMut(E) -> T,
    {
        match self {
            ExerciseEntry::Single(exercise) => ExerciseEntry::Single(f(exercise)),
            ExerciseEntry::Superset(exercises) => {
                ExerciseEntry::Superset(exercises.into_iter().map(f).collect())
            }
        }
    }
}

/// Iterates over all exercises, descending into supersets.
pub fn flatten<E>(entries: &[ExerciseEntry<E>]) -> impl Iterator<Item = &E> {
    entries.iter().flat_map(ExerciseEntry::exercises)
}

impl<'a> From<&'a Exercise> for Value<'a> {
    fn from(value: &'a Exercise) -> Self {
        Value::Record(
            ["id", "name", "repetitions", "sets", "weight", "per_side"]
                .into_iter()
                .filter_map(|name| value.field(name).map(|v| (name, v)))
                .collect(),
        )
    }
}

impl<'a> From<&'a ExerciseEntry<Exercise>> for Value<'a> {
    fn from(value: &'a ExerciseEntry<Exercise>) -> Self {
        match value {
            ExerciseEntry::Single(exercise) => exercise.into(),
            ExerciseEntry::Superset(exercises) => {
                Value::List(exercises.iter().map(Value::from).collect())
            }
        }
    }
}

fn parse_positive_integer(value: &str, field: &'static str) -> Result<u32, ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(parsed_value) if parsed_value > 0 => Ok(parsed_value),
        _ => Err(ValidationError::NotPositiveInteger(field)),
    }
}
