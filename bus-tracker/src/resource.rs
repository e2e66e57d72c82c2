//! Result envelope for continuously refreshed data.

/// A snapshot of cached data together with the state of its refresh.
///
/// The cached data is carried in every state: a refresh that is running or
/// that failed never hides what was already stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T, E> {
    /// A refresh is running; `T` is the data cached so far.
    Progress(T),
    /// The data is up to date.
    Success(T),
    /// The last refresh failed; `data` is the stale cached data.
    Error { error: E, data: T },
}

impl<T, E> Resource<T, E> {
    /// The carried data, whatever the state.
    pub fn data(&self) -> &T {
        match self {
            Resource::Progress(data) | Resource::Success(data) => data,
            Resource::Error { data, .. } => data,
        }
    }

    /// The refresh error, if any.
    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_progress(&self) -> bool {
        matches!(self, Resource::Progress(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error { .. })
    }
}
