//! Ordered, destructive partitioning of a feature pool by code ranges.
//!
//! Every extraction moves the matching features out of the pool, so a
//! feature claimed by an earlier rule is never seen by a later one. The
//! order in which rules are applied therefore decides both paint layering
//! and street label priority.

use map_common::{Feature, MapResult};

use crate::catalog::{CategoryCatalog, CodeRange};

/// Split `pool` into the features with any code in `range` and the rest.
///
/// Both halves keep the relative order of the input.
pub fn extract(pool: Vec<Feature>, range: CodeRange) -> (Vec<Feature>, Vec<Feature>) {
    pool.into_iter()
        .partition(|f| f.matches_range(range.lower, range.upper))
}

/// Like [`extract`], resolving the range by category name.
pub fn extract_category(
    pool: Vec<Feature>,
    catalog: &CategoryCatalog,
    name: &str,
) -> MapResult<(Vec<Feature>, Vec<Feature>)> {
    let range = catalog.range(name)?;
    Ok(extract(pool, range))
}

/// Apply `ranges` in order. Returns one bucket per range and the leftover.
pub fn partition(pool: Vec<Feature>, ranges: &[CodeRange]) -> (Vec<Vec<Feature>>, Vec<Feature>) {
    let mut rest = pool;
    let mut buckets = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (matched, remainder) = extract(rest, *range);
        buckets.push(matched);
        rest = remainder;
    }
    (buckets, rest)
}

/// Partition by category names.
///
/// All names are resolved before any feature moves, so an unknown name
/// leaves nothing half-partitioned.
pub fn partition_categories<S: AsRef<str>>(
    pool: Vec<Feature>,
    catalog: &CategoryCatalog,
    names: &[S],
) -> MapResult<(Vec<Vec<Feature>>, Vec<Feature>)> {
    let ranges = names
        .iter()
        .map(|n| catalog.range(n.as_ref()))
        .collect::<MapResult<Vec<_>>>()?;
    Ok(partition(pool, &ranges))
}
