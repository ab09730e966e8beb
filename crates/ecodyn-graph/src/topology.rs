//! A multi-compartment, multi-kind labelled directed graph (§ 4.3).
//!
//! Nodes live in named **compartments** (`species`, `nutrients`); each
//! compartment owns a contiguous range of absolute indices and a node's
//! *relative* index within its compartment never changes. Removing a node
//! tombstones it: it is skipped by every iterator and its incident edges are
//! dropped, but every other node's absolute index is untouched.
//!
//! Edges are grouped by **kind** (`trophic`, `competition`, `facilitation`,
//! `interference`, `refuge`) and stored as flat `(src, dst)` pairs over
//! absolute indices — never as a pointer graph (§ 9 design note), so
//! tombstoning is O(edges) rather than requiring a graph rewrite.

use crate::error::{GraphError, Result};
use ndarray::Array2;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;
use tracing::{instrument, trace};

#[derive(Debug, Clone)]
struct Compartment {
    name: String,
    offset: usize,
    alive: Vec<bool>,
}

impl Compartment {
    fn len(&self) -> usize {
        self.alive.len()
    }
}

/// The multi-compartment topology graph.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    compartments: Vec<Compartment>,
    compartment_index: HashMap<String, usize>,
    edges: HashMap<String, Vec<(usize, usize)>>,
}

impl Topology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new compartment of `n` nodes, all initially live. Returns
    /// the absolute index of the compartment's first node.
    #[instrument(level = "trace", skip(self))]
    pub fn add_compartment(&mut self, name: &str, n: usize) -> usize {
        let offset = self.total_nodes();
        self.compartment_index.insert(name.to_string(), self.compartments.len());
        self.compartments.push(Compartment { name: name.to_string(), offset, alive: vec![true; n] });
        trace!(compartment = name, n, offset, "registered compartment");
        offset
    }

    fn total_nodes(&self) -> usize {
        self.compartments.iter().map(Compartment::len).sum()
    }

    fn compartment(&self, name: &str) -> Result<&Compartment> {
        self.compartment_index
            .get(name)
            .map(|&idx| &self.compartments[idx])
            .ok_or_else(|| GraphError::unknown_label(name, &self.compartments()))
    }

    /// The registered compartment names, in registration order.
    #[must_use]
    pub fn compartments(&self) -> Vec<String> {
        self.compartments.iter().map(|c| c.name.clone()).collect()
    }

    /// The registered edge kinds that have at least one edge ever added.
    #[must_use]
    pub fn edge_kinds(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    /// Total number of node slots (live or tombstoned) in `compartment`.
    pub fn n_nodes(&self, compartment: &str) -> Result<usize> {
        Ok(self.compartment(compartment)?.len())
    }

    /// Absolute indices of the live nodes in `compartment`, in relative-index
    /// order.
    pub fn live_node_indices(&self, compartment: &str) -> Result<Vec<usize>> {
        let c = self.compartment(compartment)?;
        Ok((0..c.len()).filter(|&rel| c.alive[rel]).map(|rel| c.offset + rel).collect())
    }

    /// Absolute index of node `rel` within `compartment`.
    pub fn absolute(&self, rel: usize, compartment: &str) -> Result<usize> {
        let c = self.compartment(compartment)?;
        if rel >= c.len() {
            return Err(GraphError::OutOfBounds { index: rel, size: c.len(), axis: "relative index" });
        }
        Ok(c.offset + rel)
    }

    /// Whether the node at absolute index `node` is live (not tombstoned).
    #[must_use]
    pub fn is_live(&self, node: usize) -> bool {
        for c in &self.compartments {
            if node >= c.offset && node < c.offset + c.len() {
                return c.alive[node - c.offset];
            }
        }
        false
    }

    /// Tombstones node `rel` of `compartment`: subsequent `is_live` returns
    /// false, live iterators skip it, and every edge incident to it (either
    /// direction, any kind) is dropped.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(&mut self, rel: usize, compartment: &str) -> Result<()> {
        let abs = self.absolute(rel, compartment)?;
        let idx = self.compartment_index[compartment];
        self.compartments[idx].alive[rel] = false;
        let mut dropped = 0usize;
        for edges in self.edges.values_mut() {
            let before = edges.len();
            edges.retain(|&(s, d)| s != abs && d != abs);
            dropped += before - edges.len();
        }
        trace!(abs, compartment, dropped_edges = dropped, "tombstoned node");
        Ok(())
    }

    /// Adds a directed edge of `kind` between two absolute node indices.
    /// Does not validate liveness: callers add edges from blueprint
    /// expansion before any node can have been tombstoned.
    pub fn add_edge(&mut self, kind: &str, src: usize, dst: usize) {
        self.edges.entry(kind.to_string()).or_default().push((src, dst));
    }

    fn edges_of(&self, kind: &str) -> &[(usize, usize)] {
        self.edges.get(kind).map_or(&[], Vec::as_slice)
    }

    /// Absolute indices of nodes with an edge of `kind` pointing *into*
    /// `node`.
    #[must_use]
    pub fn incoming_indices(&self, node: usize, kind: &str) -> Vec<usize> {
        self.edges_of(kind).iter().filter(|&&(_, d)| d == node).map(|&(s, _)| s).collect()
    }

    /// Absolute indices of nodes `node` has an edge of `kind` pointing *to*.
    #[must_use]
    pub fn outgoing_indices(&self, node: usize, kind: &str) -> Vec<usize> {
        self.edges_of(kind).iter().filter(|&&(s, _)| s == node).map(|&(_, d)| d).collect()
    }

    /// The boolean adjacency matrix of the `kind` edges running from
    /// `src_compartment` to `dst_compartment`.
    ///
    /// `transpose` swaps rows/cols after construction. `prune` drops
    /// tombstoned rows/cols entirely (compacting indices in relative-index
    /// order) instead of leaving them as all-`false`.
    pub fn adjacency_matrix(
        &self,
        src_compartment: &str,
        kind: &str,
        dst_compartment: &str,
        transpose: bool,
        prune: bool,
    ) -> Result<Array2<bool>> {
        let src = self.compartment(src_compartment)?;
        let dst = self.compartment(dst_compartment)?;

        let src_rels: Vec<usize> = if prune {
            (0..src.len()).filter(|&r| src.alive[r]).collect()
        } else {
            (0..src.len()).collect()
        };
        let dst_rels: Vec<usize> = if prune {
            (0..dst.len()).filter(|&r| dst.alive[r]).collect()
        } else {
            (0..dst.len()).collect()
        };

        let mut mat = Array2::from_elem((src_rels.len(), dst_rels.len()), false);
        for &(s, d) in self.edges_of(kind) {
            if s < src.offset || s >= src.offset + src.len() {
                continue;
            }
            if d < dst.offset || d >= dst.offset + dst.len() {
                continue;
            }
            let s_rel = s - src.offset;
            let d_rel = d - dst.offset;
            if let (Some(i), Some(j)) = (
                src_rels.iter().position(|&r| r == s_rel),
                dst_rels.iter().position(|&r| r == d_rel),
            ) {
                mat[[i, j]] = true;
            }
        }

        Ok(if transpose { mat.reversed_axes() } else { mat })
    }

    /// Splits the graph into its weakly-connected components (weak over
    /// *all* edge kinds at once): each returned topology shares this
    /// topology's absolute index space but tombstones every node outside the
    /// one component it represents, and keeps only the edges internal to it.
    #[must_use]
    #[instrument(level = "trace", skip(self))]
    pub fn disconnected_components(&self) -> Vec<Topology> {
        let total = self.total_nodes();
        let mut uf = UnionFind::new(total.max(1));
        for edges in self.edges.values() {
            for &(s, d) in edges {
                uf.union(s, d);
            }
        }

        let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for c in &self.compartments {
            for rel in 0..c.len() {
                if !c.alive[rel] {
                    continue;
                }
                let abs = c.offset + rel;
                by_root.entry(uf.find(abs)).or_default().push(abs);
            }
        }

        let mut components = Vec::with_capacity(by_root.len());
        for members in by_root.values() {
            let member_set: std::collections::HashSet<usize> = members.iter().copied().collect();
            let mut clone = self.clone();
            for c_idx in 0..clone.compartments.len() {
                let (offset, len) = (clone.compartments[c_idx].offset, clone.compartments[c_idx].len());
                for rel in 0..len {
                    let abs = offset + rel;
                    if !member_set.contains(&abs) {
                        clone.compartments[c_idx].alive[rel] = false;
                    }
                }
            }
            for edges in clone.edges.values_mut() {
                edges.retain(|&(s, d)| member_set.contains(&s) && member_set.contains(&d));
            }
            components.push(clone);
        }
        trace!(components = components.len(), "split topology into weakly-connected components");
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Topology {
        // 3 -> 2 -> 1 trophic chain, species compartment only.
        let mut g = Topology::new();
        g.add_compartment("species", 3);
        g.add_edge("trophic", 1, 0);
        g.add_edge("trophic", 2, 1);
        g
    }

    #[test]
    fn remove_node_preserves_other_absolute_indices() {
        let mut g = chain();
        g.remove_node(1, "species").unwrap();
        assert!(!g.is_live(1));
        assert!(g.is_live(0));
        assert!(g.is_live(2));
        // edges touching node 1 are gone
        assert!(g.incoming_indices(1, "trophic").is_empty());
        assert!(g.outgoing_indices(2, "trophic").is_empty());
    }

    #[test]
    fn adjacency_matrix_matches_edges() {
        let g = chain();
        let m = g.adjacency_matrix("species", "trophic", "species", false, false).unwrap();
        assert!(m[[1, 0]]);
        assert!(m[[2, 1]]);
        assert!(!m[[0, 1]]);
    }

    #[test]
    fn adjacency_matrix_prune_compacts_dead_rows() {
        let mut g = chain();
        g.remove_node(1, "species").unwrap();
        let m = g.adjacency_matrix("species", "trophic", "species", false, true).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
    }

    #[test]
    fn disconnected_components_splits_chain_from_isolated_node() {
        let mut g = Topology::new();
        g.add_compartment("species", 4);
        g.add_edge("trophic", 1, 0);
        // node 2 and node 3 are isolated from the 0-1 pair and from each other.
        let comps = g.disconnected_components();
        assert_eq!(comps.len(), 3);
        let sizes: Vec<usize> = comps
            .iter()
            .map(|c| c.live_node_indices("species").unwrap().len())
            .collect();
        assert_eq!(sizes.iter().sum::<usize>(), 4);
    }

    #[test]
    fn incoming_and_outgoing_are_consistent() {
        let g = chain();
        assert_eq!(g.incoming_indices(0, "trophic"), vec![1]);
        assert_eq!(g.outgoing_indices(1, "trophic"), vec![0]);
    }
}
