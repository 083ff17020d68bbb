use alloc::{rc::Rc, string::String};
use core::num::NonZeroUsize;

use lru::LruCache;

use super::{Error, Query};

const CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Least recently used cache of compiled queries, keyed by expression text.
#[derive(Debug)]
pub struct QueryCache {
    queries: LruCache<String, Rc<Query>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            queries: LruCache::new(CAPACITY),
        }
    }

    /// Fetch the compiled form of `text`, compiling it on a miss.
    ///
    /// Expressions that fail to compile are not cached.
    pub fn get_or_compile(&mut self, text: &str) -> Result<Rc<Query>, Error> {
        if let Some(query) = self.queries.get(text) {
            return Ok(Rc::clone(query));
        }

        let query = Rc::new(Query::compile(text)?);
        tracing::trace!(path = text, "compiled path expression");

        self.queries.put(text.into(), Rc::clone(&query));

        Ok(query)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn hits_share_the_compiled_query() {
        let mut cache = QueryCache::new();

        let first = cache.get_or_compile("//li").unwrap();
        let second = cache.get_or_compile("//li").unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = QueryCache::new();

        assert!(cache.get_or_compile("//li[").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let mut cache = QueryCache::new();
        let first = cache.get_or_compile("/a0").unwrap();

        for i in 1..=CAPACITY.get() {
            cache.get_or_compile(&format!("/a{i}")).unwrap();
        }

        assert_eq!(cache.len(), CAPACITY.get());

        let again = cache.get_or_compile("/a0").unwrap();
        assert!(!Rc::ptr_eq(&first, &again));
    }
}
