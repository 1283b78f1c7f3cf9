//! Snowball-sample zone bookkeeping.
//!
//! Conditional estimation holds the outermost wave of a snowball sample
//! fixed. The graph carries each node's wave index, the list of inner
//! nodes eligible for proposals, and `prev_wave_degree`: how many
//! neighbours (ignoring arc direction) a node has in the wave before its
//! own. The degree counts are repaired on every toggle so the sampler can
//! veto deletions that would orphan a node from its recruiting wave.

use super::NodeId;

/// Zone structure attached to a graph for conditional estimation.
#[derive(Clone, Debug)]
pub struct Snowball {
    zones: Vec<u32>,
    max_zone: u32,
    inner_nodes: Vec<NodeId>,
    prev_wave_degree: Vec<u32>,
}

impl Snowball {
    /// Builds the zone structure from one wave index per node.
    ///
    /// `prev_wave_degree` starts at zero; the graph recomputes it from its
    /// arc set when the structure is attached.
    #[must_use]
    pub(crate) fn new(zones: Vec<u32>) -> Self {
        let max_zone = zones.iter().copied().max().unwrap_or(0);
        let inner_nodes = zones
            .iter()
            .enumerate()
            .filter(|&(_, &z)| z < max_zone)
            .map(|(v, _)| v as NodeId)
            .collect();
        let n = zones.len();
        Self {
            zones,
            max_zone,
            inner_nodes,
            prev_wave_degree: vec![0; n],
        }
    }

    /// Returns the wave index of `node`.
    #[must_use]
    pub fn zone(&self, node: NodeId) -> u32 {
        self.zones[node as usize]
    }

    /// Returns the outermost wave index Z.
    #[must_use]
    pub fn max_zone(&self) -> u32 {
        self.max_zone
    }

    /// Returns the nodes with zone strictly below Z, in node order.
    #[must_use]
    pub fn inner_nodes(&self) -> &[NodeId] {
        &self.inner_nodes
    }

    /// Returns how many neighbours of `node` lie in its preceding wave.
    #[must_use]
    pub fn prev_wave_degree(&self, node: NodeId) -> u32 {
        self.prev_wave_degree[node as usize]
    }

    /// Adjusts the preceding-wave degrees for a new undirected adjacency
    /// between `a` and `b`. Called only when the arc being toggled is the
    /// sole connection between the two nodes.
    pub(crate) fn adjacency_created(&mut self, a: NodeId, b: NodeId) {
        self.bump(a, b, 1);
    }

    /// Reverse of [`Self::adjacency_created`].
    pub(crate) fn adjacency_severed(&mut self, a: NodeId, b: NodeId) {
        self.bump(a, b, -1);
    }

    fn bump(&mut self, a: NodeId, b: NodeId, delta: i32) {
        let (za, zb) = (self.zone(a), self.zone(b));
        if za + 1 == zb {
            let slot = &mut self.prev_wave_degree[b as usize];
            *slot = slot.checked_add_signed(delta).unwrap_or(0);
        } else if zb + 1 == za {
            let slot = &mut self.prev_wave_degree[a as usize];
            *slot = slot.checked_add_signed(delta).unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_nodes_exclude_outermost_wave() {
        let snowball = Snowball::new(vec![0, 1, 1, 2, 2]);
        assert_eq!(snowball.max_zone(), 2);
        assert_eq!(snowball.inner_nodes(), &[0, 1, 2]);
    }

    #[test]
    fn degree_bumps_follow_wave_order() {
        let mut snowball = Snowball::new(vec![0, 1, 2]);
        snowball.adjacency_created(0, 1);
        snowball.adjacency_created(2, 1);
        assert_eq!(snowball.prev_wave_degree(1), 1);
        assert_eq!(snowball.prev_wave_degree(2), 1);
        snowball.adjacency_severed(1, 2);
        assert_eq!(snowball.prev_wave_degree(2), 0);
    }

    #[test]
    fn same_wave_adjacency_changes_nothing() {
        let mut snowball = Snowball::new(vec![1, 1, 0]);
        snowball.adjacency_created(0, 1);
        assert_eq!(snowball.prev_wave_degree(0), 0);
        assert_eq!(snowball.prev_wave_degree(1), 0);
    }
}
