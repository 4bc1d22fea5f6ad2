//! Circular index arithmetic and preload window computation
//!
//! `wrap` is the single place modulo arithmetic happens; the scheduler,
//! the session and the cross-category sync all go through it. The preload
//! window is inclusive on both ends: `[center - radius, center + radius]`
//! wrapped into `[0, len)`, each index visited once.

/// Wrap a possibly-negative offset index into `[0, len)`.
///
/// Returns None for an empty list, which has no valid indices.
pub fn wrap(index: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    Some(index.rem_euclid(len) as usize)
}

/// Indices to keep warm around `center`, window order, deduplicated.
///
/// `center` itself is part of the window; on short lists the wrapped
/// window may cover the whole variant list.
pub fn window(center: usize, len: usize, radius: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity(radius * 2 + 1);
    if len == 0 {
        return indices;
    }

    let center = center as i64;
    let radius = radius as i64;
    for offset in -radius..=radius {
        let Some(wrapped) = wrap(center + offset, len) else {
            continue;
        };
        if !indices.contains(&wrapped) {
            indices.push(wrapped);
        }
    }
    indices
}
