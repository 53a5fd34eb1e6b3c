//! Explicit undirected link graphs.
//!
//! Used when connectivity is dictated rather than derived from positions:
//! line and clique topologies in tests, links that come and go to model
//! churn. Every link carries a physical length, which is what the
//! real-valued distance algorithm adds per hop.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{DeviceId, Result, TopologyError, UNIT_LENGTH};

/// Undirected graph of devices with weighted links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkGraph {
    adjacency: BTreeMap<DeviceId, BTreeMap<DeviceId, f64>>,
}

impl LinkGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// A path `ids[0] - ids[1] - ... - ids[n-1]` with unit-length links.
    pub fn line<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = DeviceId>,
    {
        let ids: Vec<_> = ids.into_iter().collect();
        let mut graph = Self::new();
        for &id in &ids {
            graph.add_device(id);
        }
        for pair in ids.windows(2) {
            if pair[0] != pair[1] {
                graph.insert_link(pair[0], pair[1], UNIT_LENGTH);
            }
        }
        graph
    }

    /// Every pair of distinct devices linked, unit length.
    pub fn complete<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = DeviceId>,
    {
        let ids: BTreeSet<_> = ids.into_iter().collect();
        let mut graph = Self::new();
        for &a in &ids {
            graph.add_device(a);
            for &b in ids.range(..a) {
                graph.insert_link(a, b, UNIT_LENGTH);
            }
        }
        graph
    }

    /// Add an isolated device (no-op if already present).
    pub fn add_device(&mut self, id: DeviceId) {
        self.adjacency.entry(id).or_default();
    }

    /// Link two devices with unit length.
    pub fn link(&mut self, a: DeviceId, b: DeviceId) -> Result<()> {
        self.link_with_length(a, b, UNIT_LENGTH)
    }

    /// Link two devices with the given physical length.
    ///
    /// Relinking an existing pair replaces its length.
    pub fn link_with_length(&mut self, a: DeviceId, b: DeviceId, length: f64) -> Result<()> {
        if a == b {
            return Err(TopologyError::SelfLink(a));
        }
        if !length.is_finite() || length < 0.0 {
            return Err(TopologyError::InvalidLength { a, b, length });
        }
        self.insert_link(a, b, length);
        Ok(())
    }

    fn insert_link(&mut self, a: DeviceId, b: DeviceId, length: f64) {
        self.adjacency.entry(a).or_default().insert(b, length);
        self.adjacency.entry(b).or_default().insert(a, length);
    }

    /// Remove the link between two devices. Returns whether it existed.
    pub fn unlink(&mut self, a: DeviceId, b: DeviceId) -> bool {
        let removed = self
            .adjacency
            .get_mut(&a)
            .map(|n| n.remove(&b).is_some())
            .unwrap_or(false);
        if let Some(n) = self.adjacency.get_mut(&b) {
            n.remove(&a);
        }
        removed
    }

    /// Remove a device and all its links. Returns whether it existed.
    pub fn remove_device(&mut self, id: DeviceId) -> bool {
        match self.adjacency.remove(&id) {
            Some(neighbors) => {
                for other in neighbors.keys() {
                    if let Some(n) = self.adjacency.get_mut(other) {
                        n.remove(&id);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Whether the device is part of the graph.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Whether the two devices are directly linked.
    pub fn are_linked(&self, a: DeviceId, b: DeviceId) -> bool {
        self.length(a, b).is_some()
    }

    /// Length of the link between two devices, if linked.
    pub fn length(&self, a: DeviceId, b: DeviceId) -> Option<f64> {
        self.adjacency.get(&a).and_then(|n| n.get(&b)).copied()
    }

    /// All devices, in identity order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Direct neighbors of a device with link lengths.
    pub fn neighbors(&self, id: DeviceId) -> impl Iterator<Item = (DeviceId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&other, &len)| (other, len)))
    }

    /// Number of devices.
    pub fn device_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// BFS hop distance from the nearest source, for every reachable device.
    ///
    /// Unreachable devices are absent from the result.
    pub fn hop_distances(&self, sources: &[DeviceId]) -> BTreeMap<DeviceId, u32> {
        let mut dist = BTreeMap::new();
        let mut queue = VecDeque::new();

        for &s in sources {
            if self.contains(s) && !dist.contains_key(&s) {
                dist.insert(s, 0);
                queue.push_back(s);
            }
        }

        while let Some(current) = queue.pop_front() {
            let next = dist[&current] + 1;
            for (other, _) in self.neighbors(current) {
                if !dist.contains_key(&other) {
                    dist.insert(other, next);
                    queue.push_back(other);
                }
            }
        }

        dist
    }

    /// Largest hop distance between two mutually reachable devices.
    ///
    /// `None` for an empty graph.
    pub fn hop_diameter(&self) -> Option<u32> {
        self.devices()
            .filter_map(|id| self.hop_distances(&[id]).into_values().max())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(range: std::ops::RangeInclusive<u64>) -> impl Iterator<Item = DeviceId> {
        range.map(DeviceId)
    }

    #[test]
    fn line_links_consecutive_devices() {
        let graph = LinkGraph::line(ids(1..=5));
        assert_eq!(graph.device_count(), 5);
        assert_eq!(graph.link_count(), 4);
        assert!(graph.are_linked(DeviceId(2), DeviceId(3)));
        assert!(!graph.are_linked(DeviceId(1), DeviceId(3)));
    }

    #[test]
    fn complete_links_every_pair() {
        let graph = LinkGraph::complete(ids(1..=4));
        assert_eq!(graph.link_count(), 6);
        for a in ids(1..=4) {
            assert_eq!(graph.neighbors(a).count(), 3);
        }
    }

    #[test]
    fn links_are_symmetric() {
        let mut graph = LinkGraph::new();
        graph.link_with_length(DeviceId(1), DeviceId(2), 2.5).unwrap();
        assert_eq!(graph.length(DeviceId(1), DeviceId(2)), Some(2.5));
        assert_eq!(graph.length(DeviceId(2), DeviceId(1)), Some(2.5));
    }

    #[test]
    fn self_link_rejected() {
        let mut graph = LinkGraph::new();
        assert_eq!(
            graph.link(DeviceId(3), DeviceId(3)),
            Err(TopologyError::SelfLink(DeviceId(3)))
        );
    }

    #[test]
    fn invalid_length_rejected() {
        let mut graph = LinkGraph::new();
        assert!(matches!(
            graph.link_with_length(DeviceId(1), DeviceId(2), f64::NAN),
            Err(TopologyError::InvalidLength { .. })
        ));
        assert!(matches!(
            graph.link_with_length(DeviceId(1), DeviceId(2), -1.0),
            Err(TopologyError::InvalidLength { .. })
        ));
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn unlink_and_remove() {
        let mut graph = LinkGraph::line(ids(1..=3));
        assert!(graph.unlink(DeviceId(1), DeviceId(2)));
        assert!(!graph.unlink(DeviceId(1), DeviceId(2)));

        assert!(graph.remove_device(DeviceId(3)));
        assert!(!graph.contains(DeviceId(3)));
        assert_eq!(graph.neighbors(DeviceId(2)).count(), 0);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn bfs_distances_on_line() {
        let graph = LinkGraph::line(ids(1..=5));
        let dist = graph.hop_distances(&[DeviceId(1)]);
        for (i, id) in ids(1..=5).enumerate() {
            assert_eq!(dist[&id], i as u32);
        }
    }

    #[test]
    fn bfs_uses_nearest_source() {
        let graph = LinkGraph::line(ids(1..=5));
        let dist = graph.hop_distances(&[DeviceId(1), DeviceId(5)]);
        assert_eq!(dist[&DeviceId(3)], 2);
        assert_eq!(dist[&DeviceId(4)], 1);
    }

    #[test]
    fn unreachable_devices_absent() {
        let mut graph = LinkGraph::line(ids(1..=2));
        graph.add_device(DeviceId(9));
        let dist = graph.hop_distances(&[DeviceId(1)]);
        assert!(!dist.contains_key(&DeviceId(9)));
    }

    #[test]
    fn diameter_of_line_and_clique() {
        assert_eq!(LinkGraph::line(ids(1..=5)).hop_diameter(), Some(4));
        assert_eq!(LinkGraph::complete(ids(1..=3)).hop_diameter(), Some(1));
        assert_eq!(LinkGraph::new().hop_diameter(), None);
    }

    proptest! {
        #[test]
        fn linked_devices_differ_by_at_most_one_hop(
            pairs in prop::collection::vec((0u64..16, 0u64..16), 0..40),
        ) {
            let mut graph = LinkGraph::new();
            graph.add_device(DeviceId(0));
            for (a, b) in pairs {
                if a != b {
                    graph.link(DeviceId(a), DeviceId(b)).unwrap();
                }
            }

            let dist = graph.hop_distances(&[DeviceId(0)]);
            prop_assert_eq!(dist.get(&DeviceId(0)), Some(&0));
            for (&id, &d) in &dist {
                for (other, _) in graph.neighbors(id) {
                    let o = dist[&other];
                    prop_assert!(o + 1 >= d && d + 1 >= o);
                }
            }
        }
    }
}
