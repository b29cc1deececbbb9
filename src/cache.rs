//! Read-through entity caches keyed by resource name.
//!
//! Caches are populated wholesale from list calls and never expire on their own; mutation
//! paths keep them honest through [`CacheInvalidation`] and [`EntityCache::insert`].

// self
use crate::_prelude::*;

type EntityMap<V> = Arc<RwLock<HashMap<String, V>>>;

/// Entities that can live in an [`EntityCache`].
pub trait Cached {
	/// Fully-qualified resource name used as the cache key.
	fn cache_key(&self) -> &str;
}

/// Contract mutation paths use to drop stale entries.
pub trait CacheInvalidation
where
	Self: Send + Sync,
{
	/// Removes the entry stored under `name`; returns `true` if one existed.
	fn invalidate(&self, name: &str) -> bool;
}

/// Thread-safe map from resource name to entity; clones share storage.
#[derive(Debug)]
pub struct EntityCache<V>(EntityMap<V>);
impl<V> EntityCache<V>
where
	V: Cached + Clone,
{
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self(Default::default())
	}

	/// Returns a clone of the entity stored under `name`.
	pub fn get(&self, name: &str) -> Option<V> {
		self.0.read().get(name).cloned()
	}

	/// Returns `true` when an entity is stored under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.0.read().contains_key(name)
	}

	/// Stores `value` under its own name, replacing any previous entry.
	pub fn insert(&self, value: V) -> Option<V> {
		let key = value.cache_key().to_owned();

		self.0.write().insert(key, value)
	}

	/// Stores every value under a single write lock.
	pub fn extend<I>(&self, values: I)
	where
		I: IntoIterator<Item = V>,
	{
		let mut map = self.0.write();

		for value in values {
			map.insert(value.cache_key().to_owned(), value);
		}
	}

	/// Removes and returns the entity stored under `name`.
	pub fn remove(&self, name: &str) -> Option<V> {
		self.0.write().remove(name)
	}

	/// Number of cached entities.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Drops every cached entity.
	pub fn clear(&self) {
		self.0.write().clear();
	}
}
impl<V> Clone for EntityCache<V> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}
impl<V> Default for EntityCache<V>
where
	V: Cached + Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<V> CacheInvalidation for EntityCache<V>
where
	V: Cached + Clone + Send + Sync,
{
	fn invalidate(&self, name: &str) -> bool {
		self.remove(name).is_some()
	}
}
