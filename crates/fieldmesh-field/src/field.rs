//! Neighbor fields.

use std::collections::BTreeMap;

use fieldmesh_topology::DeviceId;

/// Per-round snapshot of one site: every reachable identity's latest value.
///
/// Exactly one entry per identity. The local device's entry is always
/// present; identities out of range are simply absent. Iteration order is an
/// implementation detail: anything folding a field must be order-independent.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborField<T> {
    local_id: DeviceId,
    local: T,
    neighbors: BTreeMap<DeviceId, T>,
}

impl<T> NeighborField<T> {
    /// A field holding only the local entry.
    pub fn new(local_id: DeviceId, local: T) -> Self {
        Self {
            local_id,
            local,
            neighbors: BTreeMap::new(),
        }
    }

    /// Set the entry for `id`. Setting the local id replaces the self-entry.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, id: DeviceId, value: T) -> Option<T> {
        if id == self.local_id {
            return Some(std::mem::replace(&mut self.local, value));
        }
        self.neighbors.insert(id, value)
    }

    /// Drop a neighbor entry. The self-entry cannot be removed.
    pub fn remove(&mut self, id: DeviceId) -> Option<T> {
        self.neighbors.remove(&id)
    }

    /// Identity of the local device.
    pub fn local_id(&self) -> DeviceId {
        self.local_id
    }

    /// The self-entry.
    pub fn local(&self) -> &T {
        &self.local
    }

    /// Entry for any identity, self included.
    pub fn get(&self, id: DeviceId) -> Option<&T> {
        if id == self.local_id {
            Some(&self.local)
        } else {
            self.neighbors.get(&id)
        }
    }

    /// Entries other than the self-entry.
    pub fn neighbors(&self) -> impl Iterator<Item = (DeviceId, &T)> + '_ {
        self.neighbors.iter().map(|(&id, v)| (id, v))
    }

    /// Every entry, self first.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &T)> + '_ {
        std::iter::once((self.local_id, &self.local)).chain(self.neighbors())
    }

    /// Identities present, self first.
    pub fn ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Number of entries, self included.
    pub fn len(&self) -> usize {
        self.neighbors.len() + 1
    }

    /// Never empty: the self-entry is always there.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether only the self-entry is present.
    pub fn is_alone(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Apply `f` to every entry.
    pub fn map<U, F>(&self, mut f: F) -> NeighborField<U>
    where
        F: FnMut(DeviceId, &T) -> U,
    {
        NeighborField {
            local_id: self.local_id,
            local: f(self.local_id, &self.local),
            neighbors: self
                .neighbors
                .iter()
                .map(|(&id, v)| (id, f(id, v)))
                .collect(),
        }
    }

    /// Combine two fields of the same device pointwise.
    ///
    /// Identities present in only one of them are dropped.
    pub fn zip_with<U, V, F>(&self, other: &NeighborField<U>, mut f: F) -> NeighborField<V>
    where
        F: FnMut(&T, &U) -> V,
    {
        NeighborField {
            local_id: self.local_id,
            local: f(&self.local, &other.local),
            neighbors: self
                .neighbors
                .iter()
                .filter_map(|(&id, a)| other.neighbors.get(&id).map(|b| (id, f(a, b))))
                .collect(),
        }
    }
}
