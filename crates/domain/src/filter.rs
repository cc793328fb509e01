use std::{cell::RefCell, fmt};

use crate::{Training, TrainingID};

/// Category selection of the training list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    #[default]
    All,
    Kind(String),
}

impl TypeFilter {
    pub const ALL_LABEL: &str = "All types";

    #[must_use]
    pub fn matches(&self, training: &Training) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Kind(kind) => training.is_kind(kind),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            TypeFilter::All => Self::ALL_LABEL,
            TypeFilter::Kind(kind) => kind,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Matches the kind or the name of any exercise, including the members of supersets.
#[must_use]
pub fn search_in_training(training: &Training, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    training.kind.to_lowercase().contains(&query)
        || training
            .exercises()
            .any(|e| e.name.to_lowercase().contains(&query))
}

#[must_use]
pub fn filter_trainings_by_type<'a>(
    trainings: impl IntoIterator<Item = &'a Training>,
    selected_type: &TypeFilter,
) -> Vec<&'a Training> {
    trainings
        .into_iter()
        .filter(|t| selected_type.matches(t))
        .collect()
}

/// Returns all trainings if the query is blank.
#[must_use]
pub fn search_trainings<'a>(
    trainings: impl IntoIterator<Item = &'a Training>,
    query: &str,
) -> Vec<&'a Training> {
    if query.trim().is_empty() {
        return trainings.into_iter().collect();
    }
    trainings
        .into_iter()
        .filter(|t| search_in_training(t, query))
        .collect()
}

#[must_use]
pub fn search_and_filter_trainings<'a>(
    trainings: impl IntoIterator<Item = &'a Training>,
    query: &str,
    selected_type: &TypeFilter,
) -> Vec<&'a Training> {
    search_trainings(filter_trainings_by_type(trainings, selected_type), query)
}

/// Distinct kinds in order of first occurrence, compared case-insensitively.
#[must_use]
pub fn kinds<'a>(trainings: impl IntoIterator<Item = &'a Training>) -> Vec<&'a str> {
    let mut seen = vec![];
    let mut kinds = vec![];
    for training in trainings {
        let kind = training.kind.to_lowercase();
        if !seen.contains(&kind) {
            seen.push(kind);
            kinds.push(training.kind.as_str());
        }
    }
    kinds
}

/// Selected category and search query of the training list.
///
/// The filtered view is cached and only recomputed if the trainings, the selected type or the
/// query differ from the previous call.
#[derive(Debug, Default)]
pub struct TrainingFilter {
    selected_type: TypeFilter,
    search_query: String,
    cache: RefCell<Option<Cache>>,
}

#[derive(Debug)]
struct Cache {
    selected_type: TypeFilter,
    search_query: String,
    trainings: Vec<(TrainingID, chrono::DateTime<chrono::Utc>)>,
    indices: Vec<usize>,
    #[cfg(test)]
    computations: usize,
}

impl TrainingFilter {
    #[must_use]
    pub fn new(selected_type: TypeFilter, search_query: &str) -> Self {
        Self {
            selected_type,
            search_query: search_query.to_string(),
            cache: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn selected_type(&self) -> &TypeFilter {
        &self.selected_type
    }

    pub fn set_selected_type(&mut self, selected_type: TypeFilter) {
        self.selected_type = selected_type;
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, search_query: &str) {
        search_query.clone_into(&mut self.search_query);
    }

    /// Resets the selected type and the query at once.
    pub fn clear(&mut self) {
        self.selected_type = TypeFilter::All;
        self.search_query.clear();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.selected_type != TypeFilter::All || !self.search_query.trim().is_empty()
    }

    pub fn filtered<'a>(&self, trainings: &'a [Training]) -> Vec<&'a Training> {
        let mut cache = self.cache.borrow_mut();

        let fresh = cache.as_ref().is_some_and(|c| {
            c.selected_type == self.selected_type
                && c.search_query == self.search_query
                && c.trainings.len() == trainings.len()
                && c.trainings
                    .iter()
                    .zip(trainings)
                    .all(|((id, updated_at), t)| *id == t.id && *updated_at == t.updated_at)
        });

        if !fresh {
            #[cfg(test)]
            let computations = cache.as_ref().map_or(0, |c| c.computations) + 1;
            let query = self.search_query.trim();
            let indices = trainings
                .iter()
                .enumerate()
                .filter(|(_, t)| {
                    self.selected_type.matches(t)
                        && (query.is_empty() || search_in_training(t, query))
                })
                .map(|(i, _)| i)
                .collect();
            *cache = Some(Cache {
                selected_type: self.selected_type.clone(),
                search_query: self.search_query.clone(),
                trainings: trainings
                    .iter()
                    .map(|t| (t.id.clone(), t.updated_at))
                    .collect(),
                indices,
                #[cfg(test)]
                computations,
            });
        }

        cache
            .as_ref()
            .map(|c| c.indices.iter().map(|i| &trainings[*i]).collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn computations(&self) -> usize {
        self.cache.borrow().as_ref().map_or(0, |c| c.computations)
    }
}

impl PartialEq for TrainingFilter {
    fn eq(&self, other: &Self) -> bool {
        self.selected_type == other.selected_type && self.search_query == other.search_query
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{Exercise, ExerciseEntry};

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 18, 30, 0).unwrap()
    }

    fn exercise(name: &str, sets: u32, repetitions: u32, weight: f32, per_side: bool) -> Exercise {
        Exercise {
            id: format!("e-{name}").into(),
            name: name.to_string(),
            repetitions,
            sets,
            weight,
            per_side,
        }
    }

    fn training(id: &str, kind: &str, exercises: Vec<ExerciseEntry<Exercise>>) -> Training {
        Training {
            id: id.into(),
            kind: kind.to_string(),
            date: date(1),
            created_at: date(1),
            updated_at: date(1),
            exercises,
        }
    }

    fn upper_body() -> Training {
        training(
            "1",
            "Верх",
            vec![
                ExerciseEntry::Single(exercise("Жим лежачи", 4, 8, 60.0, false)),
                ExerciseEntry::Superset(vec![
                    exercise("Тяга", 3, 10, 20.0, true),
                    exercise("Розводка", 3, 12, 8.0, true),
                ]),
            ],
        )
    }

    fn trainings() -> Vec<Training> {
        vec![
            upper_body(),
            training(
                "2",
                "Низ",
                vec![ExerciseEntry::Single(exercise("Присідання", 5, 5, 100.0, false))],
            ),
            training(
                "3",
                "Верх",
                vec![ExerciseEntry::Single(exercise("Підтягування", 4, 6, 0.0, false))],
            ),
            training(
                "4",
                "кардіо",
                vec![ExerciseEntry::Superset(vec![
                    exercise("Біг", 1, 1, 0.0, false),
                    exercise("Скакалка", 3, 100, 0.0, false),
                ])],
            ),
            training("5", "Низ", vec![]),
        ]
    }

    fn ids(trainings: &[&Training]) -> Vec<String> {
        trainings.iter().map(|t| t.id.to_string()).collect()
    }

    #[rstest]
    #[case::nested_in_superset("тяга", true)]
    #[case::top_level("жим", true)]
    #[case::no_match("біг", false)]
    #[case::kind("верх", true)]
    #[case::kind_upper_case("ВЕРХ", true)]
    #[case::second_superset_member("РОЗВОД", true)]
    #[case::surrounding_whitespace("  тяга ", true)]
    #[case::empty("", true)]
    fn test_search_in_training(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(search_in_training(&upper_body(), query), expected);
    }

    #[test]
    fn test_search_in_training_without_exercises() {
        let training = training("5", "Низ", vec![]);

        assert!(search_in_training(&training, "низ"));
        assert!(!search_in_training(&training, "присід"));
    }

    #[test]
    fn test_search_in_training_matches_iff_kind_or_any_exercise_matches() {
        for training in trainings() {
            for query in ["тяга", "низ", "а", "ка", "біг", "жим", "x"] {
                let expected = training.kind.to_lowercase().contains(query)
                    || training
                        .exercises
                        .iter()
                        .flat_map(ExerciseEntry::exercises)
                        .any(|e| e.name.to_lowercase().contains(query));
                assert_eq!(search_in_training(&training, query), expected, "{query}");
            }
        }
    }

    #[test]
    fn test_filter_trainings_by_type_all() {
        let trainings = trainings();

        assert_eq!(
            filter_trainings_by_type(&trainings, &TypeFilter::All),
            trainings.iter().collect::<Vec<_>>()
        );
    }

    #[rstest]
    #[case(TypeFilter::Kind("Верх".to_string()), &["1", "3"])]
    #[case(TypeFilter::Kind("верх".to_string()), &["1", "3"])]
    #[case(TypeFilter::Kind("Кардіо".to_string()), &["4"])]
    #[case(TypeFilter::Kind("Ноги".to_string()), &[])]
    fn test_filter_trainings_by_type(#[case] selected_type: TypeFilter, #[case] expected: &[&str]) {
        let trainings = trainings();

        assert_eq!(
            ids(&filter_trainings_by_type(&trainings, &selected_type)),
            expected
        );
    }

    #[test]
    fn test_filter_trainings_by_type_label_is_no_sentinel() {
        let mut trainings = trainings();
        trainings[1].kind = TypeFilter::ALL_LABEL.to_string();

        assert_eq!(
            ids(&filter_trainings_by_type(
                &trainings,
                &TypeFilter::Kind(TypeFilter::ALL_LABEL.to_string())
            )),
            vec!["2"]
        );
    }

    #[test]
    fn test_filter_trainings_by_type_empty() {
        assert!(filter_trainings_by_type(&[], &TypeFilter::All).is_empty());
        assert!(search_and_filter_trainings(&[], "тяга", &TypeFilter::All).is_empty());
    }

    #[rstest]
    #[case("", TypeFilter::All, &["1", "2", "3", "4", "5"])]
    #[case("   ", TypeFilter::Kind("Низ".to_string()), &["2", "5"])]
    #[case("тяга", TypeFilter::All, &["1"])]
    #[case("тяг", TypeFilter::Kind("Верх".to_string()), &["1", "3"])]
    #[case("тяга", TypeFilter::Kind("Низ".to_string()), &[])]
    #[case("ка", TypeFilter::All, &["1", "4"])]
    fn test_search_and_filter_trainings(
        #[case] query: &str,
        #[case] selected_type: TypeFilter,
        #[case] expected: &[&str],
    ) {
        let trainings = trainings();

        assert_eq!(
            ids(&search_and_filter_trainings(&trainings, query, &selected_type)),
            expected
        );
    }

    #[test]
    fn test_search_and_filter_trainings_with_empty_query_is_type_filter() {
        let trainings = trainings();

        for selected_type in [
            TypeFilter::All,
            TypeFilter::Kind("Верх".to_string()),
            TypeFilter::Kind("Низ".to_string()),
        ] {
            assert_eq!(
                search_and_filter_trainings(&trainings, "", &selected_type),
                filter_trainings_by_type(&trainings, &selected_type)
            );
        }
    }

    #[test]
    fn test_search_and_type_filter_commute() {
        let trainings = trainings();

        for query in ["", "тяга", "а", "верх", "при", "біг"] {
            for selected_type in [
                TypeFilter::All,
                TypeFilter::Kind("Верх".to_string()),
                TypeFilter::Kind("КАРДІО".to_string()),
                TypeFilter::Kind("Низ".to_string()),
            ] {
                assert_eq!(
                    search_trainings(filter_trainings_by_type(&trainings, &selected_type), query),
                    filter_trainings_by_type(search_trainings(&trainings, query), &selected_type),
                    "{query} {selected_type}"
                );
            }
        }
    }

    #[test]
    fn test_kinds() {
        let mut trainings = trainings();
        trainings[2].kind = "верх".to_string();

        assert_eq!(kinds(&trainings), vec!["Верх", "Низ", "кардіо"]);
        assert!(kinds(&[]).is_empty());
    }

    #[rstest]
    #[case(TypeFilter::All, "All types")]
    #[case(TypeFilter::Kind("Верх".to_string()), "Верх")]
    fn test_type_filter_display(#[case] selected_type: TypeFilter, #[case] expected: &str) {
        assert_eq!(selected_type.to_string(), expected);
    }

    #[test]
    fn test_training_filter_default() {
        let filter = TrainingFilter::default();

        assert_eq!(filter.selected_type(), &TypeFilter::All);
        assert_eq!(filter.search_query(), "");
        assert!(!filter.is_active());
    }

    #[test]
    fn test_training_filter_filtered() {
        let trainings = trainings();
        let mut filter = TrainingFilter::default();

        assert_eq!(ids(&filter.filtered(&trainings)), ["1", "2", "3", "4", "5"]);

        filter.set_selected_type(TypeFilter::Kind("Верх".to_string()));
        assert!(filter.is_active());
        assert_eq!(ids(&filter.filtered(&trainings)), ["1", "3"]);

        filter.set_search_query("жим");
        assert_eq!(ids(&filter.filtered(&trainings)), ["1"]);

        filter.set_selected_type(TypeFilter::All);
        filter.set_search_query("скакалка");
        assert_eq!(ids(&filter.filtered(&trainings)), ["4"]);
    }

    #[test]
    fn test_training_filter_blank_query_is_inactive() {
        let trainings = trainings();
        let mut filter = TrainingFilter::default();

        filter.set_search_query("   ");

        assert!(!filter.is_active());
        assert_eq!(ids(&filter.filtered(&trainings)), ["1", "2", "3", "4", "5"]);
    }

    #[rstest]
    #[case(TypeFilter::All, "")]
    #[case(TypeFilter::All, "  ЖИМ ")]
    #[case(TypeFilter::Kind("верх".to_string()), "")]
    #[case(TypeFilter::Kind("Верх".to_string()), "тяга")]
    #[case(TypeFilter::Kind("Низ".to_string()), "жим")]
    fn test_training_filter_filtered_matches_search_and_filter(
        #[case] selected_type: TypeFilter,
        #[case] query: &str,
    ) {
        let trainings = trainings();
        let filter = TrainingFilter::new(selected_type.clone(), query);

        assert_eq!(
            ids(&filter.filtered(&trainings)),
            ids(&search_and_filter_trainings(&trainings, query, &selected_type))
        );
    }

    #[test]
    fn test_training_filter_recomputes_only_on_change() {
        let mut trainings = trainings();
        let mut filter = TrainingFilter::new(TypeFilter::Kind("Низ".to_string()), "");

        assert_eq!(ids(&filter.filtered(&trainings)), ["2", "5"]);
        assert_eq!(ids(&filter.filtered(&trainings)), ["2", "5"]);
        assert_eq!(filter.computations(), 1);

        filter.set_search_query("");
        assert_eq!(ids(&filter.filtered(&trainings)), ["2", "5"]);
        assert_eq!(filter.computations(), 1);

        filter.set_search_query("прис");
        assert_eq!(ids(&filter.filtered(&trainings)), ["2"]);
        assert_eq!(filter.computations(), 2);

        trainings.remove(1);
        assert_eq!(ids(&filter.filtered(&trainings)), Vec::<String>::new());
        assert_eq!(filter.computations(), 3);

        trainings.push(training(
            "6",
            "низ",
            vec![ExerciseEntry::Single(exercise("Присідання", 5, 5, 90.0, false))],
        ));
        assert_eq!(ids(&filter.filtered(&trainings)), ["6"]);
        assert_eq!(filter.computations(), 4);

        trainings[3].updated_at = date(2);
        trainings[3].kind = "Низ".to_string();
        assert_eq!(ids(&filter.filtered(&trainings)), ["6"]);
        assert_eq!(filter.computations(), 5);
    }

    #[test]
    fn test_training_filter_clear() {
        let mut filter = TrainingFilter::new(TypeFilter::Kind("Верх".to_string()), "тяга");

        filter.clear();

        assert_eq!(filter, TrainingFilter::default());
        assert!(!filter.is_active());

        filter.clear();

        assert_eq!(filter, TrainingFilter::default());
        assert_eq!(filter.selected_type(), &TypeFilter::All);
        assert_eq!(filter.search_query(), "");
    }
}
