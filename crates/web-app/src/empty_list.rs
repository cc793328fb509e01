pub const LOADING: &str = "Loading...";
pub const NO_TRAININGS: &str = "No trainings";
pub const NO_TRAININGS_FOUND: &str = "No trainings found";
pub const NO_EXERCISES: &str = "No exercises";
pub const NO_EXERCISES_FOUND: &str = "No exercises found";

/// Message shown instead of an empty training list.
///
/// A selected type alone does not count as a search.
#[must_use]
pub fn empty_training_list(loading: bool, search_query: &str) -> &'static str {
    if loading {
        LOADING
    } else if !search_query.trim().is_empty() {
        NO_TRAININGS_FOUND
    } else {
        NO_TRAININGS
    }
}

/// Message shown instead of an empty exercise list.
#[must_use]
pub fn empty_exercise_list(loading: bool, search_query: &str) -> &'static str {
    if loading {
        LOADING
    } else if !search_query.trim().is_empty() {
        NO_EXERCISES_FOUND
    } else {
        NO_EXERCISES
    }
}
