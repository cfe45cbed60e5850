//! Conditional parallel iteration.
//!
//! Uses rayon when the `parallel` feature is enabled and the engine
//! configuration asks for it at the given collection size.

use ares_core::EngineConfig;

/// Returns true if parallel processing should be used for `count` items.
#[must_use]
pub fn should_parallelize(config: &EngineConfig, count: usize) -> bool {
    cfg!(feature = "parallel") && config.wants_parallel(count)
}

/// Maps a function over items, conditionally using parallel iteration.
///
/// Output order always matches input order.
///
/// Uses parallel iteration when:
/// - The `parallel` feature is enabled
/// - `config.parallel` is true
/// - The collection size reaches `config.parallel_threshold`
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &EngineConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if should_parallelize(config, items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_parallel_map_sequential() {
        let config = EngineConfig::default().with_parallel(false);
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_maybe_parallel_map_preserves_order() {
        let config = EngineConfig::default();
        let items: Vec<u64> = (0..200).collect();
        let results = maybe_parallel_map(&items, &config, |x| x * x);
        assert!(results.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_threshold() {
        let config = EngineConfig::default();
        assert!(!should_parallelize(&config, 1));
        assert!(!should_parallelize(&config.clone().with_parallel(false), 1000));
    }
}
