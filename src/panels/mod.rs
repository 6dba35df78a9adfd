use crate::models::Page;
use crate::query::QueryState;

/// The mutually exclusive things a list panel can show.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ListView<T> {
    Loading,
    Empty,
    Items(Vec<T>),
    Error,
}

impl<T: Clone> ListView<T> {
    pub fn from_query(state: &QueryState<Page<T>>) -> Self {
        match state {
            QueryState::Idle | QueryState::Loading => Self::Loading,
            QueryState::Error(_) => Self::Error,
            QueryState::Success(page) if page.results.is_empty() => Self::Empty,
            QueryState::Success(page) => Self::Items(page.results.clone()),
        }
    }
}

pub(crate) const LIST_ERROR_TEXT: &str = "Something bad happens, please refresh the page.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind};

    fn page(results: Vec<u32>) -> Page<u32> {
        Page {
            count: 1,
            results,
            ..Page::default()
        }
    }

    #[test]
    fn test_list_view_states_are_exclusive() {
        assert_eq!(ListView::from_query(&QueryState::Loading), ListView::<u32>::Loading);
        assert_eq!(ListView::from_query(&QueryState::Idle), ListView::<u32>::Loading);

        // `count` can be stale; emptiness follows the results.
        assert_eq!(
            ListView::from_query(&QueryState::Success(page(vec![]))),
            ListView::Empty
        );
        assert_eq!(
            ListView::from_query(&QueryState::Success(page(vec![7]))),
            ListView::Items(vec![7])
        );
    }

    #[test]
    fn test_server_error_maps_to_error_view() {
        let err = ApiError {
            kind: ApiErrorKind::Http,
            message: "Failed to get the pads.".to_string(),
            causes: None,
        };
        assert_eq!(
            ListView::<u32>::from_query(&QueryState::Error(err)),
            ListView::Error
        );
    }
}
