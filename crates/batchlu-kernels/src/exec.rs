//! Batch fan-out helpers.

/// Split `buf` into `count` equal per-instance regions.
///
/// A buffer shorter than `count` elements yields empty regions.
pub fn partition<E>(buf: &mut [E], count: usize) -> Vec<&mut [E]> {
    if count == 0 {
        return Vec::new();
    }
    let per = buf.len() / count;
    if per == 0 {
        return (0..count).map(|_| <&mut [E]>::default()).collect();
    }
    buf.chunks_mut(per).take(count).collect()
}

/// Run `f` once per instance, on rayon's pool when `parallel` is set and
/// the `parallel` feature is enabled.
pub fn for_each_instance<X, F>(items: Vec<X>, parallel: bool, f: F)
where
    X: Send,
    F: Fn(X) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            items.into_par_iter().for_each(f);
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    items.into_iter().for_each(f);
}
