use std::collections::BTreeMap;

/// Counts occurrences of each distinct value.
pub fn tally<K, I>(values: I) -> BTreeMap<K, u64>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}
