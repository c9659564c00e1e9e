//! A data-parallel map over a slice on a dedicated rayon pool.
//!
//! Results come back in input order with each item's error captured in
//! place, so one failing item never stops the others.
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::warn;

/// Applies `f` to every item on up to `workers` threads.
pub fn parallel_map<T, R, E, F>(items: &[T], workers: usize, f: F) -> Vec<Result<R, E>>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    parallel_map_with_progress(items, workers, &ProgressBar::hidden(), f)
}

/// [`parallel_map`] that ticks `progress` once per finished item.
pub fn parallel_map_with_progress<T, R, E, F>(
    items: &[T],
    workers: usize,
    progress: &ProgressBar,
    f: F,
) -> Vec<Result<R, E>>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let run = || {
        items
            .par_iter()
            .map(|item| {
                let result = f(item);
                progress.inc(1);
                result
            })
            .collect::<Vec<_>>()
    };

    let workers = workers.clamp(1, items.len().max(1));
    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, "could not build worker pool, using the global one");
            run()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_keep_input_order() {
        let items: Vec<u32> = (0..500).collect();
        for workers in [0, 1, 3, 16] {
            let out = parallel_map(&items, workers, |&x| Ok::<_, ()>(x * 2));
            let out: Vec<u32> = out.into_iter().map(Result::unwrap).collect();
            assert_eq!(out, items.iter().map(|x| x * 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_errors_are_captured_per_item() {
        let items = vec!["1", "two", "3", "", "5"];
        let out = parallel_map(&items, 4, |s| s.parse::<i32>());
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], Ok(1));
        assert!(out[1].is_err());
        assert_eq!(out[2], Ok(3));
        assert!(out[3].is_err());
        assert_eq!(out[4], Ok(5));
    }

    #[test]
    fn test_pool_is_sized_by_workers() {
        let items: Vec<u8> = (0..16).collect();
        let out = parallel_map(&items, 3, |_| Ok::<_, ()>(rayon::current_num_threads()));
        assert!(out.into_iter().all(|n| n == Ok(3)));
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u8> = Vec::new();
        assert!(parallel_map(&items, 8, |&x| Ok::<_, ()>(x)).is_empty());
    }

    #[test]
    fn test_progress_counts_every_item() {
        let items: Vec<u8> = (0..40).collect();
        let pb = ProgressBar::hidden();
        pb.set_length(items.len() as u64);
        parallel_map_with_progress(&items, 4, &pb, |&x| Ok::<_, ()>(x));
        assert_eq!(pb.position(), 40);
    }
}
