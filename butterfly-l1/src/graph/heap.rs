//! Intrusive pairing heap over the vertex arena
//!
//! Min-first on `Vertex::weight`. Links live in the vertices themselves:
//! `left` is the first child, `right` the next sibling, and `parent` points
//! at the node's left sibling, or at its actual parent for a first child.
//! Index [`NIL`] is the empty heap; its weight is -inf and it is never
//! written.

use super::{Vertex, NIL};

/// Link two heaps; the smaller root wins (ties go to `b`)
#[inline]
pub(crate) fn merge(v: &mut [Vertex], a: u32, b: u32) -> u32 {
    if a == NIL {
        return b;
    }
    if b == NIL {
        return a;
    }
    let (winner, loser) = if v[a as usize].weight < v[b as usize].weight {
        (a, b)
    } else {
        (b, a)
    };

    let first = v[winner as usize].left;
    v[loser as usize].right = first;
    if first != NIL {
        v[first as usize].parent = loser;
    }
    v[loser as usize].parent = winner;
    v[winner as usize].left = loser;
    v[winner as usize].right = NIL;
    winner
}

/// Insert a detached node, O(1)
#[inline]
pub(crate) fn push(v: &mut [Vertex], root: u32, node: u32) -> u32 {
    merge(v, root, node)
}

/// Remove the root and return the new root (two-pass pairing)
pub(crate) fn pop(v: &mut [Vertex], root: u32) -> u32 {
    if root == NIL {
        return NIL;
    }
    let mut cursor = v[root as usize].left;
    v[root as usize].left = NIL;

    // Pass 1: pair siblings left to right, stacking results via `right`
    let mut stack = NIL;
    while cursor != NIL {
        let a = cursor;
        let b = v[a as usize].right;
        if b == NIL {
            v[a as usize].right = stack;
            stack = a;
            break;
        }
        cursor = v[b as usize].right;
        v[a as usize].right = NIL;
        v[b as usize].right = NIL;
        let m = merge(v, a, b);
        v[m as usize].right = stack;
        stack = m;
    }
    if stack == NIL {
        return NIL;
    }

    // Pass 2: fold the stack (right to left in sibling order)
    let mut result = stack;
    let mut rest = v[result as usize].right;
    v[result as usize].right = NIL;
    while rest != NIL {
        let next = v[rest as usize].right;
        v[rest as usize].right = NIL;
        result = merge(v, result, rest);
        rest = next;
    }
    v[result as usize].parent = NIL;
    result
}

/// Restore heap order after `node`'s weight was lowered
pub(crate) fn decrease_key(v: &mut [Vertex], root: u32, node: u32) -> u32 {
    let q = v[node as usize].parent;
    if q == NIL {
        return root;
    }
    if v[q as usize].left == node && v[q as usize].weight <= v[node as usize].weight {
        return root;
    }

    // Cut node (and its subtree) out of the sibling list
    let r = v[node as usize].right;
    if r != NIL {
        v[r as usize].parent = q;
    }
    if v[q as usize].left == node {
        v[q as usize].left = r;
    } else {
        v[q as usize].right = r;
    }

    if v[root as usize].weight <= v[node as usize].weight {
        // Splice in as the root's first child
        let first = v[root as usize].left;
        if first != NIL {
            v[first as usize].parent = node;
        }
        v[node as usize].right = first;
        v[root as usize].left = node;
        v[node as usize].parent = root;
        root
    } else {
        // Node becomes the root; the old root becomes its first child
        let first = v[node as usize].left;
        v[root as usize].right = first;
        if first != NIL {
            v[first as usize].parent = root;
        }
        v[node as usize].left = root;
        v[root as usize].parent = node;
        v[node as usize].right = NIL;
        v[node as usize].parent = NIL;
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn arena(weights: &[f64]) -> Vec<Vertex> {
        let mut v = vec![Vertex::sentinel()];
        for &w in weights {
            let mut node = Vertex::new(Point::new(0.0, 0.0));
            node.weight = w;
            v.push(node);
        }
        v
    }

    fn drain(v: &mut [Vertex], mut root: u32) -> Vec<f64> {
        let mut out = Vec::new();
        while root != NIL {
            out.push(v[root as usize].weight);
            root = pop(v, root);
        }
        out
    }

    #[test]
    fn test_pops_in_order() {
        let weights = [5.0, 3.0, 9.0, 1.0, 7.0, 3.0, 0.5, 8.0];
        let mut v = arena(&weights);
        let mut root = NIL;
        for id in 1..=weights.len() as u32 {
            root = push(&mut v, root, id);
        }
        assert_eq!(v[root as usize].weight, 0.5);

        let mut expected = weights.to_vec();
        expected.sort_by(f64::total_cmp);
        assert_eq!(drain(&mut v, root), expected);
    }

    #[test]
    fn test_decrease_key_reorders() {
        let mut v = arena(&[4.0, 6.0, 8.0, 10.0, 12.0]);
        let mut root = NIL;
        for id in 1..=5 {
            root = push(&mut v, root, id);
        }
        root = pop(&mut v, root);
        assert_eq!(v[root as usize].weight, 6.0);

        // Deep node becomes the minimum
        v[5].weight = 1.0;
        root = decrease_key(&mut v, root, 5);
        assert_eq!(root, 5);

        // Non-minimal decrease keeps the root
        v[4].weight = 7.0;
        root = decrease_key(&mut v, root, 4);
        assert_eq!(root, 5);

        assert_eq!(drain(&mut v, root), vec![1.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_sentinel_untouched() {
        let mut v = arena(&[2.0, 1.0]);
        let mut root = push(&mut v, NIL, 1);
        root = push(&mut v, root, 2);
        root = pop(&mut v, root);
        root = pop(&mut v, root);
        assert_eq!(root, NIL);
        assert_eq!(pop(&mut v, NIL), NIL);
        let nil = &v[NIL as usize];
        assert_eq!(nil.weight, f64::NEG_INFINITY);
        assert_eq!((nil.left, nil.right, nil.parent), (NIL, NIL, NIL));
    }

    #[test]
    fn test_interleaved_operations_match_sorted_order() {
        let mut rng = StdRng::seed_from_u64(12345);

        for _ in 0..200 {
            let n = 40;
            let weights: Vec<f64> = (0..n).map(|_| f64::from(rng.random_range(0..100u32))).collect();
            let mut v = arena(&weights);
            let mut root = NIL;
            let mut live: Vec<u32> = Vec::new();

            for id in 1..=n as u32 {
                root = push(&mut v, root, id);
                live.push(id);

                let k = live[rng.random_range(0..live.len())];
                v[k as usize].weight -= f64::from(rng.random_range(0..50u32));
                root = decrease_key(&mut v, root, k);

                if rng.random_bool(0.5) {
                    let min = live
                        .iter()
                        .map(|&i| v[i as usize].weight)
                        .fold(f64::INFINITY, f64::min);
                    assert_eq!(v[root as usize].weight, min, "root must hold the minimum");
                    live.retain(|&i| i != root);
                    root = pop(&mut v, root);
                }
            }

            let popped = drain(&mut v, root);
            assert_eq!(popped.len(), live.len());
            assert!(popped.windows(2).all(|w| w[0] <= w[1]), "drain out of order");
        }
    }
}
