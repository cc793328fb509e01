use std::cell::{Ref, RefCell};

use gym_tracker_domain::{Training, TrainingID, TrainingPage, TrainingService};
use log::debug;

pub const LOAD_ERROR: &str = "Failed to load trainings";
pub const LOAD_MORE_ERROR: &str = "Failed to load more trainings";
pub const DELETE_ERROR: &str = "Failed to delete training";

/// Incrementally loaded list of trainings.
///
/// All methods take `&self`. No borrow of the internal state is held across an `.await`, so
/// calls may interleave on a single-threaded executor.
pub struct Pagination<S> {
    service: S,
    limit: u32,
    state: RefCell<State>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Refreshing,
    LoadingMore,
    Ready { has_more: bool },
    Error(String),
}

struct State {
    trainings: Vec<Training>,
    total_count: u32,
    current_page: u32,
    total_pages: u32,
    has_more: bool,
    refreshing: bool,
    loading_more: bool,
    loaded: bool,
    error: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            trainings: vec![],
            total_count: 0,
            current_page: 1,
            total_pages: 0,
            has_more: true,
            refreshing: false,
            loading_more: false,
            loaded: false,
            error: None,
        }
    }
}

impl State {
    fn apply(&mut self, page: &TrainingPage) {
        self.total_count = page.total_count;
        self.current_page = page.current_page;
        self.total_pages = page.total_pages;
        self.has_more = page.has_more;
        self.loaded = true;
    }
}

impl<S: TrainingService> Pagination<S> {
    pub fn new(service: S, limit: u32) -> Self {
        Self {
            service,
            limit,
            state: RefCell::new(State::default()),
        }
    }

    /// Replaces the list by the first page. Does nothing while a previous refresh is in flight.
    pub async fn refresh(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.refreshing {
                return;
            }
            state.refreshing = true;
            state.error = None;
        }

        let result = self.service.get_trainings(self.limit, 0).await;

        let mut state = self.state.borrow_mut();
        state.refreshing = false;
        match result {
            Ok(page) => {
                state.apply(&page);
                state.trainings = page.trainings;
            }
            Err(err) => {
                debug!("{LOAD_ERROR}: {err}");
                state.error = Some(LOAD_ERROR.to_string());
            }
        }
    }

    /// Appends the next page. Does nothing while a previous call is in flight or if the end of
    /// the list has been reached.
    pub async fn load_more(&self) {
        let offset = {
            let mut state = self.state.borrow_mut();
            if state.loading_more || !state.has_more {
                return;
            }
            state.loading_more = true;
            state.error = None;
            u32::try_from(state.trainings.len()).unwrap_or(u32::MAX)
        };

        let result = self.service.get_trainings(self.limit, offset).await;

        let mut state = self.state.borrow_mut();
        state.loading_more = false;
        match result {
            Ok(page) => {
                state.apply(&page);
                state.trainings.extend(page.trainings);
            }
            Err(err) => {
                debug!("{LOAD_MORE_ERROR}: {err}");
                state.error = Some(LOAD_MORE_ERROR.to_string());
            }
        }
    }

    /// Removes a training that has been deleted elsewhere.
    pub fn remove(&self, id: &TrainingID) {
        let mut state = self.state.borrow_mut();
        let len = state.trainings.len();
        state.trainings.retain(|t| t.id != *id);
        if state.trainings.len() < len {
            state.total_count = state.total_count.saturating_sub(1);
        }
    }

    pub async fn delete(&self, id: TrainingID) {
        self.state.borrow_mut().error = None;
        match self.service.delete_training(id).await {
            Ok(id) => self.remove(&id),
            Err(err) => {
                debug!("{DELETE_ERROR}: {err}");
                self.state.borrow_mut().error = Some(DELETE_ERROR.to_string());
            }
        }
    }

    #[must_use]
    pub fn trainings(&self) -> Ref<'_, [Training]> {
        Ref::map(self.state.borrow(), |state| state.trainings.as_slice())
    }

    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.state.borrow().total_count
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.state.borrow().total_pages
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state.borrow().has_more
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.borrow().refreshing
    }

    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.state.borrow().loading_more
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        let state = self.state.borrow();
        if state.refreshing {
            Status::Refreshing
        } else if state.loading_more {
            Status::LoadingMore
        } else if let Some(error) = &state.error {
            Status::Error(error.clone())
        } else if state.loaded {
            Status::Ready {
                has_more: state.has_more,
            }
        } else {
            Status::Idle
        }
    }
}
