//! Multi-source A* between two docked query points
//!
//! Protocol for one query:
//! 1. `begin` records the literal source and target.
//! 2. `link_target` / `link_source` mark vertices that see the target or
//!    the source (targets first, so source heuristics see their landmark
//!    bounds).
//! 3. `search` runs A* and always sweeps the free list afterwards.

use tracing::trace;

use super::heap::{decrease_key, pop, push};
use super::{state, Graph, LANDMARKS, NIL};
use crate::point::Point;

/// Counters for the most recent search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Vertices whose scratch was written (free-list length)
    pub touched: usize,
    /// Vertices settled by A*
    pub expanded: usize,
    /// Vertices that see the source
    pub source_links: usize,
    /// Vertices that see the target
    pub target_links: usize,
}

impl Graph {
    pub(crate) fn begin(&mut self, source: Point, target: Point) {
        self.source = source;
        self.target = target;
        self.stats = QueryStats::default();
    }

    /// Record `v` on the free list once per query
    #[inline]
    fn touch(&mut self, v: u32) {
        let slot = &mut self.vertices[v as usize];
        if slot.next_free.is_some() {
            return;
        }
        slot.next_free = Some(self.free_head);
        self.free_head = v;
        self.stats.touched += 1;
    }

    /// Landmark-and-L1 lower bound towards the target, inflated
    #[inline]
    fn heuristic(&self, v: u32) -> f64 {
        let slot = &self.vertices[v as usize];
        let mut bound = slot.pos.manhattan(&self.target);
        for k in 0..LANDMARKS {
            bound = bound.max(self.target_landmarks[k] - slot.landmarks[k]);
        }
        self.inflation * bound
    }

    /// Mark `v` as visible from the target
    pub(crate) fn link_target(&mut self, v: u32) {
        if self.vertices[v as usize].state & state::TARGET != 0 {
            return;
        }
        self.vertices[v as usize].state |= state::TARGET;
        self.touch(v);
        self.stats.target_links += 1;

        let slot = &self.vertices[v as usize];
        self.target_components.insert(slot.component);
        let d = slot.pos.manhattan(&self.target);
        for k in 0..LANDMARKS {
            self.target_landmarks[k] = self.target_landmarks[k].min(slot.landmarks[k] + d);
        }
    }

    /// Mark `v` as visible from the source and open it
    pub(crate) fn link_source(&mut self, v: u32) {
        if self.vertices[v as usize].state & state::SOURCE != 0 {
            return;
        }
        let h = self.heuristic(v);
        let source = self.source;
        let slot = &mut self.vertices[v as usize];
        slot.heuristic = h;
        slot.cost = slot.pos.manhattan(&source);
        slot.weight = slot.cost + h;
        slot.state |= state::SOURCE;
        slot.pred = None;
        let component = slot.component;

        self.open = push(&mut self.vertices, self.open, v);
        self.touch(v);
        self.source_components.insert(component);
        self.stats.source_links += 1;
    }

    /// Run A* from the source-linked vertices to any target-linked one.
    ///
    /// Returns the distance between the literal query points and, if found,
    /// the vertex chain from the target side back to the source side.
    pub(crate) fn search(&mut self) -> (f64, Vec<Point>) {
        let mut distance = f64::INFINITY;
        let mut chain = Vec::new();

        let connected = self
            .source_components
            .iter()
            .any(|c| self.target_components.contains(c));

        if connected {
            while self.open != NIL {
                let node = self.open;
                let (cost, pos, flags) = {
                    let slot = &self.vertices[node as usize];
                    (slot.cost, slot.pos, slot.state)
                };

                if flags == state::TARGET | state::SOURCE {
                    distance = cost + pos.manhattan(&self.target);
                    let mut cursor = Some(node);
                    while let Some(v) = cursor {
                        chain.push(self.vertices[v as usize].pos);
                        cursor = self.vertices[v as usize].pred;
                    }
                    break;
                }

                self.vertices[node as usize].state = state::CLOSED;
                self.open = pop(&mut self.vertices, self.open);
                self.stats.expanded += 1;

                for i in 0..self.vertices[node as usize].edges.len() {
                    let u = self.vertices[node as usize].edges[i];
                    let flags = self.vertices[u as usize].state;
                    if flags == state::CLOSED {
                        continue;
                    }
                    let via = cost + pos.manhattan(&self.vertices[u as usize].pos);

                    if flags < state::SOURCE {
                        let h = self.heuristic(u);
                        let slot = &mut self.vertices[u as usize];
                        slot.heuristic = h;
                        slot.state |= state::SOURCE;
                        slot.cost = via;
                        slot.weight = via + h;
                        slot.pred = Some(node);
                        self.open = push(&mut self.vertices, self.open, u);
                        self.touch(u);
                    } else {
                        let slot = &mut self.vertices[u as usize];
                        let weight = via + slot.heuristic;
                        if weight < slot.weight {
                            slot.weight = weight;
                            slot.cost = via;
                            slot.pred = Some(node);
                            self.open = decrease_key(&mut self.vertices, self.open, u);
                        }
                    }
                }
            }
        }

        trace!(
            distance,
            touched = self.stats.touched,
            expanded = self.stats.expanded,
            source_links = self.stats.source_links,
            target_links = self.stats.target_links,
            "search finished"
        );
        self.clear();
        (distance, chain)
    }

    /// Return every touched vertex to its idle state
    pub(crate) fn clear(&mut self) {
        let mut cursor = self.free_head;
        while cursor != NIL {
            let slot = &mut self.vertices[cursor as usize];
            cursor = slot.next_free.unwrap_or(NIL);
            slot.reset_search();
        }
        self.free_head = NIL;
        self.open = NIL;
        self.target_landmarks = [f64::INFINITY; LANDMARKS];
        self.source_components.clear();
        self.target_components.clear();
    }

    pub fn last_query_stats(&self) -> QueryStats {
        self.stats
    }

    /// True when no vertex carries query scratch
    pub fn is_idle(&self) -> bool {
        self.free_head == NIL
            && self.open == NIL
            && self.vertices.iter().all(|v| {
                v.state == 0
                    && v.left == NIL
                    && v.right == NIL
                    && v.parent == NIL
                    && v.next_free.is_none()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a(0,0) - b(0,5) - c(5,5), plus a stray d(5,0) linked only to c
    fn corridor() -> (Graph, [u32; 4]) {
        let mut g = Graph::new(1.0);
        let a = g.add_vertex(Point::new(0.0, 0.0));
        let b = g.add_vertex(Point::new(0.0, 5.0));
        let c = g.add_vertex(Point::new(5.0, 5.0));
        let d = g.add_vertex(Point::new(5.0, 0.0));
        g.link(a, b);
        g.link(b, c);
        g.link(c, d);
        g.finalize();
        (g, [a, b, c, d])
    }

    #[test]
    fn test_search_finds_chain() {
        let (mut g, [a, _, c, _]) = corridor();
        g.begin(Point::new(0.0, -1.0), Point::new(6.0, 5.0));
        g.link_target(c);
        g.link_source(a);
        let (distance, chain) = g.search();

        assert_eq!(distance, 1.0 + 5.0 + 5.0 + 1.0);
        assert_eq!(
            chain,
            vec![Point::new(5.0, 5.0), Point::new(0.0, 5.0), Point::new(0.0, 0.0)]
        );
        assert!(g.is_idle(), "scratch must be swept after a search");

        let stats = g.last_query_stats();
        assert_eq!(stats.source_links, 1);
        assert_eq!(stats.target_links, 1);
        assert!(stats.expanded >= 2);
        assert!(stats.touched >= 3);
    }

    #[test]
    fn test_vertex_linked_to_both_ends() {
        let (mut g, [_, b, _, _]) = corridor();
        g.begin(Point::new(0.0, 7.0), Point::new(0.0, 3.0));
        g.link_target(b);
        g.link_source(b);
        let (distance, chain) = g.search();
        assert_eq!(distance, 4.0);
        assert_eq!(chain, vec![Point::new(0.0, 5.0)]);
        assert!(g.is_idle());
    }

    #[test]
    fn test_disconnected_components_short_circuit() {
        let mut g = Graph::new(1.0);
        let a = g.add_vertex(Point::new(0.0, 0.0));
        let b = g.add_vertex(Point::new(9.0, 9.0));
        g.finalize();

        g.begin(Point::new(0.0, 1.0), Point::new(9.0, 8.0));
        g.link_target(b);
        g.link_source(a);
        let (distance, chain) = g.search();
        assert_eq!(distance, f64::INFINITY);
        assert!(chain.is_empty());
        assert_eq!(g.last_query_stats().expanded, 0);
        assert!(g.is_idle());
    }

    #[test]
    fn test_no_links_is_unreachable() {
        let (mut g, _) = corridor();
        g.begin(Point::new(1.0, 1.0), Point::new(2.0, 2.0));
        let (distance, chain) = g.search();
        assert!(distance.is_infinite());
        assert!(chain.is_empty());
        assert!(g.is_idle());
    }

    #[test]
    fn test_repeated_searches_agree() {
        let (mut g, [a, _, c, d]) = corridor();
        let mut results = Vec::new();
        for _ in 0..3 {
            g.begin(Point::new(0.0, -1.0), Point::new(5.0, -1.0));
            g.link_target(d);
            g.link_target(c);
            g.link_source(a);
            results.push(g.search());
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0].0, 1.0 + 5.0 + 5.0 + 5.0 + 1.0);
    }
}
