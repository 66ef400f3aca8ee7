//! Cycle enumeration and topological ordering.
//!
//! Adjacency combines every connection, every `child_by_branch` handle and
//! every backward `loop_target`, de-duplicated and kept in graph insertion
//! order. Handles to absent nodes are ignored.

use std::collections::{BTreeSet, HashMap, VecDeque};

use lf_core::NodeId;

use crate::graph::Graph;

/// One cycle as the ordered list of nodes on it; the edge from the last node
/// back to the first is implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    nodes: Vec<NodeId>,
}

impl Cycle {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// The path with the first node repeated at the end.
    pub fn closed_path(&self) -> Vec<NodeId> {
        let mut path = self.nodes.clone();
        if let Some(first) = self.nodes.first() {
            path.push(first.clone());
        }
        path
    }
}

/// Summary of the loops in a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopComplexity {
    /// Self-loops and two-node loops.
    pub simple: Vec<Cycle>,
    /// Loops through three or more nodes.
    pub nested: Vec<Cycle>,
    pub max_length: usize,
    pub nodes_in_loops: BTreeSet<NodeId>,
}

impl LoopComplexity {
    pub fn total(&self) -> usize {
        self.simple.len() + self.nested.len()
    }
}

/// Read-only structural analysis over a borrowed graph.
pub struct CycleAnalyzer<'g> {
    ids: Vec<&'g NodeId>,
    adjacency: Vec<Vec<usize>>,
}

impl<'g> CycleAnalyzer<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let ids: Vec<&NodeId> = graph.node_ids().collect();
        let index: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut adjacency = vec![Vec::new(); ids.len()];

        let mut link = |from: &NodeId, to: &NodeId| {
            if let (Some(&f), Some(&t)) = (index.get(from), index.get(to)) {
                if !adjacency[f].contains(&t) {
                    adjacency[f].push(t);
                }
            }
        };
        for conn in graph.connections() {
            link(&conn.from, &conn.to);
        }
        for node in graph.nodes() {
            for child in node.children() {
                link(&node.id, child);
            }
            if let Some(target) = node.backward_target() {
                link(&node.id, target);
            }
        }

        Self { ids, adjacency }
    }

    pub fn successors(&self, id: &NodeId) -> Vec<&'g NodeId> {
        self.ids
            .iter()
            .position(|n| *n == id)
            .map(|i| self.adjacency[i].iter().map(|&j| self.ids[j]).collect())
            .unwrap_or_default()
    }

    /// Every cycle met by a depth-first search started from each unvisited
    /// node in turn.
    ///
    /// A cycle is recorded whenever the search reaches a node still on its
    /// stack. Overlapping cycles may be reported more than once.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let n = self.ids.len();
        let mut visited = vec![false; n];
        let mut stack_pos: Vec<Option<usize>> = vec![None; n];
        let mut cycles = Vec::new();

        for root in 0..n {
            if visited[root] {
                continue;
            }
            // (node, next neighbour to look at)
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
            let mut path: Vec<usize> = vec![root];
            visited[root] = true;
            stack_pos[root] = Some(0);

            while let Some(frame) = frames.last_mut() {
                let (node, cursor) = *frame;
                let Some(&next) = self.adjacency[node].get(cursor) else {
                    stack_pos[node] = None;
                    path.pop();
                    frames.pop();
                    continue;
                };
                frame.1 += 1;

                if let Some(pos) = stack_pos[next] {
                    cycles.push(Cycle {
                        nodes: path[pos..].iter().map(|&i| self.ids[i].clone()).collect(),
                    });
                } else if !visited[next] {
                    visited[next] = true;
                    stack_pos[next] = Some(path.len());
                    path.push(next);
                    frames.push((next, 0));
                }
            }
        }
        cycles
    }

    pub fn has_cycles(&self) -> bool {
        self.topological_sort().is_none()
    }

    pub fn is_acyclic(&self) -> bool {
        !self.has_cycles()
    }

    /// Kahn's algorithm. `None` when a cycle leaves some node unordered.
    pub fn topological_sort(&self) -> Option<Vec<NodeId>> {
        let n = self.ids.len();
        let mut in_degree = vec![0usize; n];
        for targets in &self.adjacency {
            for &t in targets {
                in_degree[t] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(self.ids[i].clone());
            for &t in &self.adjacency[i] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    queue.push_back(t);
                }
            }
        }

        (order.len() == n).then_some(order)
    }

    pub fn analyze_loop_complexity(&self) -> LoopComplexity {
        let mut summary = LoopComplexity::default();
        for cycle in self.find_cycles() {
            summary.max_length = summary.max_length.max(cycle.len());
            summary.nodes_in_loops.extend(cycle.nodes.iter().cloned());
            if cycle.len() <= 2 {
                summary.simple.push(cycle);
            } else {
                summary.nested.push(cycle);
            }
        }
        summary
    }
}
