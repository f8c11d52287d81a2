use crate::models::{Rating, UserProfile};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod ingest;

static NO_RATINGS: BTreeMap<i64, f64> = BTreeMap::new();

/// Immutable sparse preference matrix: one snapshot of all known ratings.
///
/// Built once from a batch source and never mutated afterwards, so it can be
/// shared across request tasks without locking. Both lookup directions are
/// materialized at construction: item→rating per user, and the users that
/// rated each item. User and item identity is defined purely by appearing in
/// at least one rating.
#[derive(Debug)]
pub struct PreferenceStore {
    by_user: HashMap<i64, BTreeMap<i64, f64>>,
    by_item: HashMap<i64, Vec<i64>>,
    users: Vec<i64>,
    version: u64,
}

impl PreferenceStore {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let mut by_user: HashMap<i64, BTreeMap<i64, f64>> = HashMap::new();
        for row in rows {
            by_user
                .entry(row.user_id)
                .or_default()
                .insert(row.item_id, row.value);
        }

        let mut by_item: HashMap<i64, Vec<i64>> = HashMap::new();
        for (&user, ratings) in &by_user {
            for &item in ratings.keys() {
                by_item.entry(item).or_default().push(user);
            }
        }
        for raters in by_item.values_mut() {
            raters.sort_unstable();
        }

        let mut users: Vec<i64> = by_user.keys().copied().collect();
        users.sort_unstable();

        Self {
            by_user,
            by_item,
            users,
            version: 0,
        }
    }

    /// All (item, rating) pairs for a user. Unknown users get an empty
    /// mapping, not an error.
    pub fn ratings_of(&self, user: i64) -> &BTreeMap<i64, f64> {
        self.by_user.get(&user).unwrap_or(&NO_RATINGS)
    }

    /// Users that rated an item, ascending. Empty for unknown items.
    pub fn users_who_rated(&self, item: i64) -> &[i64] {
        self.by_item.get(&item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every known user, ascending.
    pub fn all_users(&self) -> &[i64] {
        &self.users
    }

    pub fn rating(&self, user: i64, item: i64) -> Option<f64> {
        self.by_user.get(&user).and_then(|r| r.get(&item)).copied()
    }

    pub fn contains_user(&self, user: i64) -> bool {
        self.by_user.contains_key(&user)
    }

    pub fn user_profile(&self, user: i64) -> Option<UserProfile> {
        self.by_user
            .get(&user)
            .map(|ratings| UserProfile::new(user, ratings.clone()))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.by_item.len()
    }

    pub fn rating_count(&self) -> usize {
        self.by_user.values().map(BTreeMap::len).sum()
    }

    /// Snapshot identity assigned by the publishing [`StoreHandle`].
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Process-wide handle to the currently published store snapshot.
///
/// A reload builds a complete new [`PreferenceStore`] and swaps it in here;
/// in-flight requests keep the `Arc` they already took, so no reader ever
/// observes a partially populated store.
#[derive(Debug)]
pub struct StoreHandle {
    current: RwLock<Arc<PreferenceStore>>,
    next_version: AtomicU64,
}

impl StoreHandle {
    pub fn new(mut store: PreferenceStore) -> Self {
        store.version = 1;
        Self {
            current: RwLock::new(Arc::new(store)),
            next_version: AtomicU64::new(1),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<PreferenceStore> {
        self.current.read().clone()
    }

    /// Atomically publishes a fully built snapshot and returns its version.
    pub fn replace(&self, mut store: PreferenceStore) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        store.version = version;
        *self.current.write() = Arc::new(store);
        version
    }
}
