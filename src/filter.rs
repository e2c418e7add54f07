use std::fmt;
use std::sync::Arc;

/// A predicate over consumed record keys, values, or headers.
///
/// Filters are cheap to clone and compose with AND semantics via
/// [`Filter::all`]. The default filter admits everything.
pub struct Filter<T: ?Sized> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// A filter that admits every candidate.
    pub fn pass() -> Self {
        Self::new(|_| true)
    }

    pub fn test(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }

    /// ANDs the given filters, short-circuiting on the first rejection.
    /// An empty list composes to [`Filter::pass`].
    pub fn all(filters: impl IntoIterator<Item = Filter<T>>) -> Filter<T>
    where
        T: 'static,
    {
        let filters: Vec<Filter<T>> = filters.into_iter().collect();
        if filters.is_empty() {
            return Self::pass();
        }
        Self::new(move |candidate| filters.iter().all(|f| f.test(candidate)))
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::pass()
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn default_filter_admits_everything() {
        let filter: Filter<i32> = Filter::default();
        assert!(filter.test(&0));
        assert!(filter.test(&-42));
    }

    #[test]
    fn empty_composition_admits_everything() {
        let filter: Filter<String> = Filter::all([]);
        assert!(filter.test(&"anything".to_string()));
    }

    #[test]
    fn composition_requires_every_filter_to_admit() {
        let positive = Filter::new(|n: &i32| *n > 0);
        let even = Filter::new(|n: &i32| n % 2 == 0);
        let both = Filter::all([positive, even]);

        assert!(both.test(&4));
        assert!(!both.test(&3));
        assert!(!both.test(&-2));
    }

    #[test]
    fn composition_short_circuits_on_first_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            Filter::new(move |_: &i32| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        };
        let reject = Filter::new(|_: &i32| false);

        let composed = Filter::all([reject, counted]);
        assert!(!composed.test(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn composition_order_does_not_change_admitted_set() {
        let short = Filter::new(|s: &String| s.len() < 4);
        let vowel = Filter::new(|s: &String| s.starts_with(&['a', 'e', 'i', 'o', 'u'][..]));

        let candidates = ["ab", "abcd", "eff", "xyz", "o"];
        let ab = Filter::all([short.clone(), vowel.clone()]);
        let ba = Filter::all([vowel, short]);

        for candidate in candidates {
            let candidate = candidate.to_string();
            assert_eq!(ab.test(&candidate), ba.test(&candidate));
        }
    }
}
