//! Ordered partitions with previous-row access
//!
//! Group rows by a key, sort each group by an ordering key, then walk each
//! group pairing every row with the row immediately before it in the same
//! group. The first row of a group has no predecessor.

use std::collections::BTreeMap;

/// Rows split into key-ordered groups, each sorted by an ordering key
#[derive(Debug, Clone)]
pub struct OrderedPartitions<K, T> {
    partitions: BTreeMap<K, Vec<T>>,
}

impl<K: Ord, T> OrderedPartitions<K, T> {
    /// Partition `items` by `key` and stable-sort each partition by `order`
    pub fn build<I, F, S, O>(items: I, key: F, order: S) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> K,
        S: Fn(&T) -> O,
        O: Ord,
    {
        let mut partitions: BTreeMap<K, Vec<T>> = BTreeMap::new();
        for item in items {
            partitions.entry(key(&item)).or_default().push(item);
        }
        for rows in partitions.values_mut() {
            rows.sort_by_key(|row| order(row));
        }
        Self { partitions }
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Each partition with a lagged walk over its rows
    pub fn iter(&self) -> impl Iterator<Item = (&K, Lagged<'_, T>)> {
        self.partitions.iter().map(|(k, rows)| (k, lagged(rows)))
    }

    pub fn into_inner(self) -> BTreeMap<K, Vec<T>> {
        self.partitions
    }
}

/// Iterator yielding `(previous, current)` pairs over a slice
#[derive(Debug, Clone)]
pub struct Lagged<'a, T> {
    rows: &'a [T],
    pos: usize,
}

pub fn lagged<T>(rows: &[T]) -> Lagged<'_, T> {
    Lagged { rows, pos: 0 }
}

impl<'a, T> Iterator for Lagged<'a, T> {
    type Item = (Option<&'a T>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rows.get(self.pos)?;
        let previous = self.pos.checked_sub(1).map(|i| &self.rows[i]);
        self.pos += 1;
        Some((previous, current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Lagged<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lagged_pairs() {
        let rows = [1, 2, 3];
        let pairs: Vec<_> = lagged(&rows).collect();
        assert_eq!(pairs, vec![(None, &1), (Some(&1), &2), (Some(&2), &3)]);
        assert_eq!(lagged::<i32>(&[]).count(), 0);
    }

    #[test]
    fn test_partitions_sorted_within_group() {
        let rows = vec![("b", 2021), ("a", 2020), ("b", 2019), ("a", 2018)];
        let parts = OrderedPartitions::build(rows, |r| r.0, |r| r.1);
        assert_eq!(parts.len(), 2);

        let inner = parts.into_inner();
        assert_eq!(inner["a"], vec![("a", 2018), ("a", 2020)]);
        assert_eq!(inner["b"], vec![("b", 2019), ("b", 2021)]);
    }

    #[test]
    fn test_previous_stays_within_partition() {
        let rows = vec![("a", 1), ("b", 2), ("a", 3)];
        let parts = OrderedPartitions::build(rows, |r| r.0, |r| r.1);
        for (key, mut walk) in parts.iter() {
            let (first_prev, _) = walk.next().unwrap();
            assert!(first_prev.is_none(), "partition {key}");
            for (prev, cur) in walk {
                assert_eq!(prev.unwrap().0, cur.0);
            }
        }
    }
}
