//! Self-balancing ordered map (component B).
//!
//! A CLRS red-black tree, arena-allocated: nodes live in a `Vec` and are
//! addressed by index rather than pointer, with index `NIL` (0) reserved
//! to mean "absent child" / "parent of the root".  Per spec §9's design
//! note, the shared NIL slot's fields are never mutated during a fixup —
//! fixup routines that would otherwise need to read or write "the
//! sentinel's parent" as scratch state instead take that state as an
//! explicit local parameter. This is the main generalization relative to
//! the pointer-and-mutated-sentinel design in the teacher's original
//! source (`examples/original_source/st/red_black_tree.h`).

use std::cmp::Ordering;

const NIL: usize = 0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

struct Node<K, V> {
    color: Color,
    key: Option<K>,
    value: Option<V>,
    left: usize,
    right: usize,
    parent: usize,
}

impl<K, V> Node<K, V> {
    fn nil() -> Self {
        Node { color: Color::Black, key: None, value: None, left: NIL, right: NIL, parent: NIL }
    }
}

/// An ordered map keyed on any `Ord` key, backed by a red-black tree.
pub struct RbMap<K, V> {
    nodes: Vec<Node<K, V>>,
    root: usize,
}

impl<K: Ord, V> Default for RbMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> RbMap<K, V> {
    pub fn new() -> Self {
        // nodes[NIL] is the shared sentinel; it is never mutated after creation.
        RbMap { nodes: vec![Node::nil()], root: NIL }
    }

    fn color(&self, n: usize) -> Color {
        self.nodes[n].color
    }

    fn set_color(&mut self, n: usize, c: Color) {
        if n != NIL {
            self.nodes[n].color = c;
        }
    }

    fn key_cmp(&self, n: usize, key: &K) -> Ordering {
        self.nodes[n].key.as_ref().unwrap().cmp(key)
    }

    /// Binary descent. Returns `NIL` if absent.
    fn find_index(&self, key: &K) -> usize {
        let mut cur = self.root;
        while cur != NIL {
            match self.key_cmp(cur, key) {
                Ordering::Equal => return cur,
                Ordering::Greater => cur = self.nodes[cur].left,
                Ordering::Less => cur = self.nodes[cur].right,
            }
        }
        NIL
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let n = self.find_index(key);
        if n == NIL { None } else { self.nodes[n].value.as_ref() }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let n = self.find_index(key);
        if n == NIL { None } else { self.nodes[n].value.as_mut() }
    }

    /// Returns the default/or-inserted value as in `operator[]`: if `key`
    /// is absent, inserts it with `default` first.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let n = self.find_index(&key);
        let n = if n == NIL {
            self.insert_raw(key, default())
        } else {
            n
        };
        self.nodes[n].value.as_mut().unwrap()
    }

    /// Insert `(key, value)`. No-op (silently) if `key` is already present.
    pub fn insert(&mut self, key: K, value: V) {
        if self.find_index(&key) != NIL {
            return;
        }
        self.insert_raw(key, value);
    }

    /// Insert `(key, value)`, overwriting any existing value for `key`
    /// (unlike `insert`, which leaves an existing entry untouched).
    pub fn set(&mut self, key: K, value: V) {
        let n = self.find_index(&key);
        if n == NIL {
            self.insert_raw(key, value);
        } else {
            self.nodes[n].value = Some(value);
        }
    }

    fn push_node(&mut self, color: Color, key: K, value: V, parent: usize) -> usize {
        self.nodes.push(Node { color, key: Some(key), value: Some(value), left: NIL, right: NIL, parent });
        self.nodes.len() - 1
    }

    fn insert_raw(&mut self, key: K, value: V) -> usize {
        let mut y = NIL;
        let mut x = self.root;
        while x != NIL {
            y = x;
            x = match self.key_cmp(x, &key) {
                Ordering::Greater => self.nodes[x].left,
                _ => self.nodes[x].right,
            };
        }
        let z = self.push_node(Color::Red, key, value, y);
        if y == NIL {
            self.root = z;
        } else if self.key_cmp(y, self.nodes[z].key.as_ref().unwrap()) == Ordering::Greater {
            self.nodes[y].left = z;
        } else {
            self.nodes[y].right = z;
        }
        self.insert_fixup(z);
        log::trace!("ordered_map: inserted node at arena slot {z}");
        z
    }

    fn left_rotate(&mut self, x: usize) {
        let y = self.nodes[x].right;
        self.nodes[x].right = self.nodes[y].left;
        if self.nodes[y].left != NIL {
            self.nodes[self.nodes[y].left].parent = x;
        }
        self.nodes[y].parent = self.nodes[x].parent;
        if self.nodes[x].parent == NIL {
            self.root = y;
        } else if x == self.nodes[self.nodes[x].parent].left {
            self.nodes[self.nodes[x].parent].left = y;
        } else {
            self.nodes[self.nodes[x].parent].right = y;
        }
        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn right_rotate(&mut self, x: usize) {
        let y = self.nodes[x].left;
        self.nodes[x].left = self.nodes[y].right;
        if self.nodes[y].right != NIL {
            self.nodes[self.nodes[y].right].parent = x;
        }
        self.nodes[y].parent = self.nodes[x].parent;
        if self.nodes[x].parent == NIL {
            self.root = y;
        } else if x == self.nodes[self.nodes[x].parent].left {
            self.nodes[self.nodes[x].parent].left = y;
        } else {
            self.nodes[self.nodes[x].parent].right = y;
        }
        self.nodes[y].right = x;
        self.nodes[x].parent = y;
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.color(self.nodes[z].parent) == Color::Red {
            let zp = self.nodes[z].parent;
            let zpp = self.nodes[zp].parent;
            if zp == self.nodes[zpp].left {
                let y = self.nodes[zpp].right;
                if self.color(y) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(y, Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    let mut z2 = z;
                    if z2 == self.nodes[zp].right {
                        z2 = zp;
                        self.left_rotate(z2);
                    }
                    let z2p = self.nodes[z2].parent;
                    let z2pp = self.nodes[z2p].parent;
                    self.set_color(z2p, Color::Black);
                    self.set_color(z2pp, Color::Red);
                    self.right_rotate(z2pp);
                    z = z2;
                }
            } else {
                let y = self.nodes[zpp].left;
                if self.color(y) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(y, Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    let mut z2 = z;
                    if z2 == self.nodes[zp].left {
                        z2 = zp;
                        self.right_rotate(z2);
                    }
                    let z2p = self.nodes[z2].parent;
                    let z2pp = self.nodes[z2p].parent;
                    self.set_color(z2p, Color::Black);
                    self.set_color(z2pp, Color::Red);
                    self.left_rotate(z2pp);
                    z = z2;
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    fn minimum(&self, mut n: usize) -> usize {
        while self.nodes[n].left != NIL {
            n = self.nodes[n].left;
        }
        n
    }

    fn successor(&self, n: usize) -> usize {
        if self.nodes[n].right != NIL {
            return self.minimum(self.nodes[n].right);
        }
        let mut cur = n;
        let mut p = self.nodes[cur].parent;
        while p != NIL && cur == self.nodes[p].right {
            cur = p;
            p = self.nodes[p].parent;
        }
        p
    }

    fn transplant(&mut self, u: usize, v: usize) {
        let up = self.nodes[u].parent;
        if up == NIL {
            self.root = v;
        } else if u == self.nodes[up].left {
            self.nodes[up].left = v;
        } else {
            self.nodes[up].right = v;
        }
        if v != NIL {
            self.nodes[v].parent = up;
        }
    }

    /// Remove `key` if present; no-op otherwise.
    pub fn remove(&mut self, key: &K) {
        let z = self.find_index(key);
        if z == NIL {
            return;
        }
        let mut y = z;
        let mut y_original_color = self.color(y);
        let x;
        let x_parent;
        if self.nodes[z].left == NIL {
            x = self.nodes[z].right;
            x_parent = self.nodes[z].parent;
            self.transplant(z, x);
        } else if self.nodes[z].right == NIL {
            x = self.nodes[z].left;
            x_parent = self.nodes[z].parent;
            self.transplant(z, x);
        } else {
            y = self.minimum(self.nodes[z].right);
            y_original_color = self.color(y);
            x = self.nodes[y].right;
            if self.nodes[y].parent == z {
                x_parent = y;
            } else {
                x_parent = self.nodes[y].parent;
                self.transplant(y, self.nodes[y].right);
                self.nodes[y].right = self.nodes[z].right;
                let yr = self.nodes[y].right;
                self.nodes[yr].parent = y;
            }
            self.transplant(z, y);
            self.nodes[y].left = self.nodes[z].left;
            let yl = self.nodes[y].left;
            self.nodes[yl].parent = y;
            self.set_color(y, self.color(z));
        }
        if y_original_color == Color::Black {
            self.remove_fixup(x, x_parent);
        }
        log::trace!("ordered_map: removed node, fixup root {x_parent}");
    }

    fn remove_fixup(&mut self, mut x: usize, mut x_parent: usize) {
        while x != self.root && self.color(x) == Color::Black {
            if x == self.nodes[x_parent].left {
                let mut w = self.nodes[x_parent].right;
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.left_rotate(x_parent);
                    w = self.nodes[x_parent].right;
                }
                if self.color(self.nodes[w].left) == Color::Black
                    && self.color(self.nodes[w].right) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.nodes[x].parent;
                } else {
                    if self.color(self.nodes[w].right) == Color::Black {
                        let wl = self.nodes[w].left;
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.right_rotate(w);
                        w = self.nodes[x_parent].right;
                    }
                    self.set_color(w, self.color(x_parent));
                    self.set_color(x_parent, Color::Black);
                    let wr = self.nodes[w].right;
                    self.set_color(wr, Color::Black);
                    self.left_rotate(x_parent);
                    x = self.root;
                    x_parent = self.nodes[x].parent;
                }
            } else {
                let mut w = self.nodes[x_parent].left;
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.right_rotate(x_parent);
                    w = self.nodes[x_parent].left;
                }
                if self.color(self.nodes[w].left) == Color::Black
                    && self.color(self.nodes[w].right) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.nodes[x].parent;
                } else {
                    if self.color(self.nodes[w].left) == Color::Black {
                        let wr = self.nodes[w].right;
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.left_rotate(w);
                        w = self.nodes[x_parent].left;
                    }
                    self.set_color(w, self.color(x_parent));
                    self.set_color(x_parent, Color::Black);
                    let wl = self.nodes[w].left;
                    self.set_color(wl, Color::Black);
                    self.right_rotate(x_parent);
                    x = self.root;
                    x_parent = self.nodes[x].parent;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Count of entries. Per spec §4.B this is a full in-order walk, not O(1).
    pub fn len(&self) -> usize {
        if self.root == NIL {
            return 0;
        }
        let mut count = 0;
        let mut cur = self.minimum(self.root);
        while cur != NIL {
            count += 1;
            cur = self.successor(cur);
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Ascending-order iterator over `(&K, &V)`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let cur = if self.root == NIL { NIL } else { self.minimum(self.root) };
        Iter { map: self, cur }
    }

}

pub struct Iter<'a, K, V> {
    map: &'a RbMap<K, V>,
    cur: usize,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }
        let node = &self.map.nodes[self.cur];
        let item = (node.key.as_ref().unwrap(), node.value.as_ref().unwrap());
        self.cur = self.map.successor(self.cur);
        Some(item)
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a RbMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_invariants<K: Ord + Clone, V>(map: &RbMap<K, V>) {
        // root is black
        if map.root != NIL {
            assert_eq!(map.color(map.root), Color::Black);
        }
        fn walk<K: Ord, V>(map: &RbMap<K, V>, n: usize) -> usize {
            if n == NIL {
                return 1; // black-height contribution of a NIL leaf
            }
            if map.color(n) == Color::Red {
                assert_eq!(map.color(map.nodes[n].left), Color::Black);
                assert_eq!(map.color(map.nodes[n].right), Color::Black);
            }
            let lh = walk(map, map.nodes[n].left);
            let rh = walk(map, map.nodes[n].right);
            assert_eq!(lh, rh, "black height mismatch");
            lh + (map.color(n) == Color::Black) as usize
        }
        walk(map, map.root);
    }

    #[test]
    fn insert_and_find() {
        let mut m: RbMap<i32, &str> = RbMap::new();
        m.insert(5, "five");
        m.insert(3, "three");
        m.insert(8, "eight");
        assert_eq!(m.get(&5), Some(&"five"));
        assert_eq!(m.get(&3), Some(&"three"));
        assert_eq!(m.get(&99), None);
        check_invariants(&m);
    }

    #[test]
    fn duplicate_insert_ignored() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        m.insert(1, 100);
        m.insert(1, 200);
        assert_eq!(m.get(&1), Some(&100));
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        m.insert(1, 1);
        m.remove(&42);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn ascending_iteration() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        for k in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
            m.insert(k, k);
        }
        let collected: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, (0..10).collect::<Vec<_>>());
        check_invariants(&m);
    }

    #[test]
    fn insert_remove_sequence_preserves_invariants() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        let keys: Vec<i32> = (0..200).map(|i| (i * 37) % 211).collect();
        for &k in &keys {
            m.insert(k, k * 2);
            check_invariants(&m);
        }
        for (i, &k) in keys.iter().enumerate() {
            if i % 3 == 0 {
                m.remove(&k);
                check_invariants(&m);
            }
        }
        let collected: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        let mut sorted = collected.clone();
        sorted.sort_unstable();
        assert_eq!(collected, sorted);
    }

    #[test]
    fn idempotent_remove() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        m.insert(1, 1);
        m.remove(&1);
        m.remove(&1);
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
    }

    #[test]
    fn get_or_insert_with_matches_operator_index() {
        let mut m: RbMap<i32, i32> = RbMap::new();
        *m.get_or_insert_with(1, || 0) += 1;
        *m.get_or_insert_with(1, || 0) += 1;
        assert_eq!(m.get(&1), Some(&2));
    }

    #[test]
    fn randomized_matches_btreemap_reference() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::collections::BTreeMap;

        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut ours: RbMap<i32, i32> = RbMap::new();
        let mut reference: BTreeMap<i32, i32> = BTreeMap::new();
        for _ in 0..10_000 {
            let k: i32 = rng.gen_range(-50_000..50_000);
            let v: i32 = rng.gen();
            ours.insert(k, v);
            reference.entry(k).or_insert(v);
        }
        let ours_seq: Vec<(i32, i32)> = ours.iter().map(|(k, v)| (*k, *v)).collect();
        let ref_seq: Vec<(i32, i32)> = reference.into_iter().collect();
        assert_eq!(ours_seq, ref_seq);
    }
}
