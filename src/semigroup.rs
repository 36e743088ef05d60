//! Semigroup trait for associative merges
//!
//! A Semigroup is a type with an associative binary operation. Every piece of
//! data that flows through a stream and has to be aggregated (result batches,
//! statistics summaries, per-repository status flags) merges through this
//! trait, so that an aggregate can be built in any grouping of events.
//!
//! # Mathematical Properties
//!
//! For a type to be a valid Semigroup, the `combine` operation must be associative:
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use limitstream::Semigroup;
//! use std::collections::BTreeSet;
//!
//! // Result batches concatenate
//! let v1 = vec![1, 2, 3];
//! let v2 = vec![4, 5, 6];
//! assert_eq!(v1.combine(v2), vec![1, 2, 3, 4, 5, 6]);
//!
//! // Sets of searched repositories union
//! let a: BTreeSet<_> = ["alpha", "beta"].into_iter().collect();
//! let b: BTreeSet<_> = ["beta", "gamma"].into_iter().collect();
//! assert_eq!(a.combine(b).len(), 3);
//! ```

use std::collections::{BTreeMap, BTreeSet};

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
///
/// # Note on Ownership
///
/// The `combine` method takes `self` by value. Use [`Semigroup::update`] to
/// merge into a value held behind a mutable reference.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    ///
    /// # Examples
    ///
    /// ```
    /// use limitstream::Semigroup;
    ///
    /// let v1 = vec![1, 2];
    /// let v2 = vec![3, 4];
    /// assert_eq!(v1.combine(v2), vec![1, 2, 3, 4]);
    /// ```
    fn combine(self, other: Self) -> Self;

    /// Merge `other` into `self` in place.
    ///
    /// The default implementation moves `self` out through a
    /// [`Monoid::empty`] placeholder; types that can merge without moving
    /// should override it.
    ///
    /// ```
    /// use limitstream::Semigroup;
    ///
    /// let mut acc = vec![1];
    /// acc.update(vec![2, 3]);
    /// assert_eq!(acc, vec![1, 2, 3]);
    /// ```
    fn update(&mut self, other: Self)
    where
        Self: Monoid,
    {
        let current = std::mem::replace(self, Self::empty());
        *self = current.combine(other);
    }
}

/// A `Monoid` is a `Semigroup` with an identity element.
///
/// The identity is the starting value of every aggregation: an empty batch,
/// a statistics summary with nothing counted.
///
/// # Laws
///
/// ```text
/// a.combine(M::empty()) == a           (right identity)
/// M::empty().combine(a) == a           (left identity)
/// ```
pub trait Monoid: Semigroup {
    /// The identity element.
    fn empty() -> Self;
}

/// Fold an iterator of monoids into one value, starting from the identity.
///
/// ```
/// use limitstream::semigroup::fold_all;
///
/// let batches = vec![vec![1], vec![2, 3], vec![]];
/// assert_eq!(fold_all(batches), vec![1, 2, 3]);
/// ```
pub fn fold_all<M, I>(items: I) -> M
where
    M: Monoid,
    I: IntoIterator<Item = M>,
{
    items.into_iter().fold(M::empty(), M::combine)
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }

    #[inline]
    fn update(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }
}

impl<T: Ord> Semigroup for BTreeSet<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }

    #[inline]
    fn update(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<T: Ord> Monoid for BTreeSet<T> {
    fn empty() -> Self {
        BTreeSet::new()
    }
}

// Values under the same key are combined, other keys are carried over.
impl<K: Ord, V: Semigroup> Semigroup for BTreeMap<K, V> {
    fn combine(mut self, other: Self) -> Self {
        for (key, value) in other {
            let merged = match self.remove(&key) {
                Some(existing) => existing.combine(value),
                None => value,
            };
            self.insert(key, merged);
        }
        self
    }
}

impl<K: Ord, V: Semigroup> Monoid for BTreeMap<K, V> {
    fn empty() -> Self {
        BTreeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_semigroup() {
        let v1 = vec![1, 2, 3];
        let v2 = vec![4, 5, 6];
        assert_eq!(v1.combine(v2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_vec_identity() {
        let v = vec![1, 2];
        assert_eq!(v.clone().combine(Vec::empty()), v);
        assert_eq!(Vec::empty().combine(v.clone()), v);
    }

    #[test]
    fn test_set_union() {
        let a: BTreeSet<_> = [1, 2].into_iter().collect();
        let b: BTreeSet<_> = [2, 3].into_iter().collect();
        assert_eq!(a.combine(b), [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn test_map_combines_shared_keys() {
        let a: BTreeMap<_, _> = [("x", vec![1]), ("y", vec![2])].into_iter().collect();
        let b: BTreeMap<_, _> = [("y", vec![3]), ("z", vec![4])].into_iter().collect();

        let merged = a.combine(b);

        assert_eq!(merged["x"], vec![1]);
        assert_eq!(merged["y"], vec![2, 3]);
        assert_eq!(merged["z"], vec![4]);
    }

    #[test]
    fn test_update_through_default_impl() {
        let mut acc: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
        acc.update([("a", vec![1])].into_iter().collect());
        acc.update([("a", vec![2])].into_iter().collect());
        assert_eq!(acc["a"], vec![1, 2]);
    }

    #[test]
    fn test_vec_associativity() {
        let a = vec![1, 2];
        let b = vec![3, 4];
        let c = vec![5, 6];

        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));

        assert_eq!(left, right);
    }

    #[test]
    fn test_fold_all_empty_is_identity() {
        let folded: Vec<i32> = fold_all(Vec::<Vec<i32>>::new());
        assert!(folded.is_empty());
    }
}
