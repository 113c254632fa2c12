use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Listing {
    index: u64,
    names: Vec<&'static str>,
}

impl Indexed for Listing {
    fn index(&self) -> u64 {
        self.index
    }
}

#[test]
fn test_initial_state_is_empty_at_index_zero() {
    let state = WatchState::<String>::initial();
    assert_eq!(state.value(), None);
    assert_eq!(state.index(), 0);
}

#[test]
fn test_states_compare_value_and_index() {
    let a = WatchState::from(Versioned::new("v1".to_string(), 5));
    let same = WatchState::from(Versioned::new("v1".to_string(), 5));
    let reindexed = WatchState::from(Versioned::new("v1".to_string(), 6));
    let changed = WatchState::from(Versioned::new("v2".to_string(), 5));

    assert_eq!(a, same);
    assert_ne!(a, reindexed);
    assert_ne!(a, changed);
    assert_ne!(a, WatchState::initial());
}

#[test]
fn test_versioned_from_indexed_value() {
    let listing = Listing {
        index: 12,
        names: vec!["web"],
    };
    let versioned = Versioned::from(listing.clone());
    assert_eq!(versioned.index, 12);
    assert_eq!(versioned.value, listing);

    let state = WatchState::from(versioned);
    assert_eq!(state.index(), 12);
    assert_eq!(state.into_value().map(|l| l.names), Some(vec!["web"]));
}
