use crate::Error;

/// One notification of a watch
///
/// A change carries the previous and the new value. A failure carries the
/// cause and keeps the last good value as `prev`; `next` is then `None`.
#[derive(Debug)]
pub struct WatchResult<T> {
    prev: Option<T>,
    next: Option<T>,
    cause: Option<Error>,
}

impl<T> WatchResult<T> {
    pub(crate) fn succeeded(
        prev: Option<T>,
        next: Option<T>,
    ) -> Self {
        Self {
            prev,
            next,
            cause: None,
        }
    }

    pub(crate) fn failed(
        prev: Option<T>,
        cause: Error,
    ) -> Self {
        Self {
            prev,
            next: None,
            cause: Some(cause),
        }
    }

    /// Value before this notification, `None` on the first observation
    pub fn prev(&self) -> Option<&T> {
        self.prev.as_ref()
    }

    pub fn next(&self) -> Option<&T> {
        self.next.as_ref()
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.cause.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.cause.is_some()
    }

    pub fn into_parts(self) -> (Option<T>, Option<T>, Option<Error>) {
        (self.prev, self.next, self.cause)
    }
}
