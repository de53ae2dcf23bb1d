//! Landmark (ALT) preprocessing
//!
//! Per component: start from the median vertex in (x, y) order, run one
//! Dijkstra per landmark slot and seed each next round from the vertex
//! farthest from every landmark picked so far.

use super::heap::{decrease_key, pop, push};
use super::{Graph, LANDMARKS, NIL};

const OPEN: u8 = 1;
const SETTLED: u8 = 2;

impl Graph {
    pub(crate) fn compute_landmarks(&mut self, mut members: Vec<u32>) {
        if members.is_empty() {
            return;
        }
        members.sort_by(|&a, &b| {
            self.vertices[a as usize]
                .pos
                .cmp_xy(&self.vertices[b as usize].pos)
        });

        let mut seed = members[members.len() >> 1];
        for k in 0..LANDMARKS {
            let last = self.settle_from(seed);

            let mut farthest = 0.0;
            seed = last;
            for &u in &members {
                let v = &mut self.vertices[u as usize];
                v.reset_search();
                v.landmarks[k] = v.weight;
                let nearest = v.landmarks[..=k]
                    .iter()
                    .copied()
                    .fold(f64::INFINITY, f64::min);
                if nearest > farthest {
                    farthest = nearest;
                    seed = u;
                }
            }
        }
    }

    /// Dijkstra from `seed` over its component, leaving distances in
    /// `weight`. Returns the last settled vertex.
    fn settle_from(&mut self, seed: u32) -> u32 {
        let v = &mut self.vertices;
        v[seed as usize].weight = 0.0;
        v[seed as usize].state = OPEN;
        let mut open = seed;
        let mut last = seed;

        while open != NIL {
            let node = open;
            last = node;
            v[node as usize].state = SETTLED;
            open = pop(v, open);

            let base = v[node as usize].weight;
            let pos = v[node as usize].pos;
            for i in 0..v[node as usize].edges.len() {
                let u = v[node as usize].edges[i];
                let slot = &mut v[u as usize];
                if slot.state == SETTLED {
                    continue;
                }
                let d = base + pos.manhattan(&slot.pos);
                if slot.state == 0 {
                    slot.state = OPEN;
                    slot.weight = d;
                    open = push(v, open, u);
                } else if d < slot.weight {
                    slot.weight = d;
                    open = decrease_key(v, open, u);
                }
            }
        }
        last
    }
}
