//! Local reductions over a neighbor field.
//!
//! Identities are dropped as soon as folding starts. The self-entry never
//! takes part: the caller supplies the value that stands in for it, which is
//! also the identity element, so a device with no neighbors gets a defined
//! result. To fold the self-entry too, pass it (or combine it into) the
//! default.

use crate::NeighborField;

/// Smallest neighbor value, or `default` if none is smaller.
pub fn min_of<T>(field: &NeighborField<T>, default: T) -> T
where
    T: PartialOrd + Clone,
{
    field.neighbors().fold(default, |acc, (_, v)| {
        if *v < acc {
            v.clone()
        } else {
            acc
        }
    })
}

/// Largest neighbor value, or `default` if none is larger.
pub fn max_of<T>(field: &NeighborField<T>, default: T) -> T
where
    T: PartialOrd + Clone,
{
    field.neighbors().fold(default, |acc, (_, v)| {
        if *v > acc {
            v.clone()
        } else {
            acc
        }
    })
}

/// Reduce neighbor values with `combinator`, starting from `seed`.
///
/// Entry order is unspecified, so `combinator` must be associative and
/// commutative for the result to be well defined.
pub fn fold<T, F>(field: &NeighborField<T>, mut combinator: F, seed: T) -> T
where
    F: FnMut(T, &T) -> T,
{
    field.neighbors().fold(seed, |acc, (_, v)| combinator(acc, v))
}

/// Whether any neighbor value is `true`, or `default`.
pub fn any_of(field: &NeighborField<bool>, default: bool) -> bool {
    default || field.neighbors().any(|(_, &v)| v)
}

/// Whether every neighbor value is `true`, and `default`.
pub fn all_of(field: &NeighborField<bool>, default: bool) -> bool {
    default && field.neighbors().all(|(_, &v)| v)
}
