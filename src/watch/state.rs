/// Values that carry the store index they were read at
pub trait Indexed {
    fn index(&self) -> u64;
}

/// A fetched value paired with the index of the response it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub index: u64,
}

impl<T> Versioned<T> {
    pub fn new(
        value: T,
        index: u64,
    ) -> Self {
        Self { value, index }
    }
}

impl<T: Indexed> From<T> for Versioned<T> {
    fn from(value: T) -> Self {
        let index = value.index();
        Self { value, index }
    }
}

/// Last value a watch observed and the index to block on next
///
/// Two states are equal only when both value and index are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchState<T> {
    value: Option<T>,
    index: u64,
}

impl<T> Default for WatchState<T> {
    fn default() -> Self {
        Self { value: None, index: 0 }
    }
}

impl<T> WatchState<T> {
    /// Nothing observed yet; the first query does not block
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T> From<Versioned<T>> for WatchState<T> {
    fn from(versioned: Versioned<T>) -> Self {
        Self {
            value: Some(versioned.value),
            index: versioned.index,
        }
    }
}
