//! Operations over several masks at once.

use core::ops::ControlFlow;

use crate::{AffinityMask, Error};

/// Returns the intersection of all given masks.
///
/// # Errors
///
/// Returns [`Error::NoMasks`] for an empty slice and
/// [`Error::WidthMismatch`] if the masks differ in width.
pub fn and_all(masks: &[AffinityMask]) -> Result<AffinityMask, Error> {
    let (first, rest) = masks.split_first().ok_or(Error::NoMasks)?;
    let mut mask = first.clone();
    for other in rest {
        mask.and(other)?;
    }

    Ok(mask)
}

/// Returns the union of all given masks.
///
/// # Errors
///
/// Same as [`and_all`].
pub fn or_all(masks: &[AffinityMask]) -> Result<AffinityMask, Error> {
    let (first, rest) = masks.split_first().ok_or(Error::NoMasks)?;
    let mut mask = first.clone();
    for other in rest {
        mask.or(other)?;
    }

    Ok(mask)
}

/// Calls `f` with every non-empty combination of the given domains.
///
/// Combinations are produced in order of increasing size; within one size
/// they follow the order of `domains` lexicographically, so for `[0, 1, 2]`
/// the sequence is `{0}, {1}, {2}, {0,1}, {0,2}, {1,2}, {0,1,2}`. Duplicate
/// domains are not collapsed and yield repeated masks.
///
/// Width and domains are validated before the first call. Returns
/// [`ControlFlow::Break`] as soon as `f` does, [`ControlFlow::Continue`]
/// otherwise.
pub fn iterate_masks<F, B>(width: usize, domains: &[usize], mut f: F) -> Result<ControlFlow<B>, Error>
where
    F: FnMut(&AffinityMask) -> ControlFlow<B>,
{
    let mut mask = AffinityMask::new(width, domains)?;
    let mut accum = Vec::with_capacity(domains.len());

    for size in 1..=domains.len() {
        if let ControlFlow::Break(b) = combine(&mut mask, &mut accum, domains, size, &mut f) {
            return Ok(ControlFlow::Break(b));
        }
    }

    Ok(ControlFlow::Continue(()))
}

fn combine<F, B>(
    mask: &mut AffinityMask,
    accum: &mut Vec<usize>,
    domains: &[usize],
    size: usize,
    f: &mut F,
) -> ControlFlow<B>
where
    F: FnMut(&AffinityMask) -> ControlFlow<B>,
{
    if accum.len() == size {
        mask.clear();
        for &domain in accum.iter() {
            mask.insert(domain);
        }
        return f(mask);
    }

    let need = size - accum.len();
    for (pos, &domain) in domains.iter().enumerate() {
        if domains.len() - pos < need {
            break;
        }

        accum.push(domain);
        let flow = combine(mask, accum, &domains[pos + 1..], size, f);
        accum.pop();
        flow?;
    }

    ControlFlow::Continue(())
}
