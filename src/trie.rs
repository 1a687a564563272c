//! Red-black-balanced ternary search trie (component C).
//!
//! A ternary search trie whose `lo`/`hi` sibling-branching sub-trees are
//! each independently red-black balanced, per spec §4.C's adapted rules.
//! `eq` edges descend to the next trie depth and are not part of any
//! red-black sub-tree; every node reached by an `eq` edge, plus the
//! overall root, is a *subroot* — the root of its own `lo`/`hi`
//! red-black tree.
//!
//! As in `ordered_map`, nodes live in an arena (`Vec<Node>`) addressed by
//! index, with `NIL = 0` reserved and never mutated — this sidesteps the
//! "restore the sentinel's scratch fields on every exit path" hazard
//! spec §5/§9 call out for the pointer-based original.
//!
//! Every traversal here is iterative (explicit work stack or direct
//! index walk), per spec §4.C / §9: keys can be tens of thousands of
//! code points long and must not risk a stack overflow.

use crate::unicode;

const NIL: usize = 0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

struct Node {
    color: Color,
    subroot: bool,
    end: bool,
    codepoint: u32,
    value: String,
    lo: usize,
    eq: usize,
    hi: usize,
    pa: usize,
}

impl Node {
    fn nil() -> Self {
        Node {
            color: Color::Black,
            subroot: false,
            end: false,
            codepoint: 0,
            value: String::new(),
            lo: NIL,
            eq: NIL,
            hi: NIL,
            pa: NIL,
        }
    }
}

/// Result of an exact-key `search`, distinguishing "not present" from
/// "key was invalid" — neither is surfaced as an `Error` per spec §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Found(String),
    NotFound,
    Invalid,
}

/// A red-black-balanced ternary search trie mapping Unicode keys to
/// string values.
pub struct RbTst {
    nodes: Vec<Node>,
    root: usize,
}

impl Default for RbTst {
    fn default() -> Self {
        Self::new()
    }
}

impl RbTst {
    pub fn new() -> Self {
        RbTst { nodes: vec![Node::nil()], root: NIL }
    }

    fn color(&self, n: usize) -> Color {
        self.nodes[n].color
    }

    fn set_color(&mut self, n: usize, c: Color) {
        if n != NIL {
            self.nodes[n].color = c;
        }
    }

    fn push_node(&mut self, color: Color, subroot: bool, codepoint: u32, pa: usize) -> usize {
        self.nodes.push(Node { color, subroot, codepoint, pa, ..Node::nil() });
        self.nodes.len() - 1
    }

    // ----- rotations within a lo/hi sub-tree (mirrors examples/original_source/rbtrie/rbtrie.h) -----

    /// Left-rotate-like pivot on the `hi` child. Returns the (possibly new) subroot.
    fn rotate_with_hi(&mut self, mut rt: usize, node: usize) -> usize {
        let kid = self.nodes[node].hi;
        self.nodes[node].hi = self.nodes[kid].lo;
        if self.nodes[kid].lo != NIL {
            self.nodes[self.nodes[kid].lo].pa = node;
        }
        self.nodes[kid].pa = self.nodes[node].pa;
        if self.nodes[node].subroot {
            rt = kid;
            self.nodes[kid].subroot = true;
            self.nodes[node].subroot = false;
        } else if node == self.nodes[self.nodes[node].pa].lo {
            self.nodes[self.nodes[node].pa].lo = kid;
        } else {
            self.nodes[self.nodes[node].pa].hi = kid;
        }
        self.nodes[kid].lo = node;
        self.nodes[node].pa = kid;
        rt
    }

    /// Right-rotate-like pivot on the `lo` child.
    fn rotate_with_lo(&mut self, mut rt: usize, node: usize) -> usize {
        let kid = self.nodes[node].lo;
        self.nodes[node].lo = self.nodes[kid].hi;
        if self.nodes[kid].hi != NIL {
            self.nodes[self.nodes[kid].hi].pa = node;
        }
        self.nodes[kid].pa = self.nodes[node].pa;
        if self.nodes[node].subroot {
            rt = kid;
            self.nodes[kid].subroot = true;
            self.nodes[node].subroot = false;
        } else if node == self.nodes[self.nodes[node].pa].lo {
            self.nodes[self.nodes[node].pa].lo = kid;
        } else {
            self.nodes[self.nodes[node].pa].hi = kid;
        }
        self.nodes[kid].hi = node;
        self.nodes[node].pa = kid;
        rt
    }

    /// CLRS transplant restricted to a detached lo/hi sub-tree.
    fn transplant(&mut self, mut rt: usize, dest: usize, node: usize) -> usize {
        if self.nodes[dest].pa == NIL {
            rt = node;
            self.nodes[node].subroot = true;
        } else if dest == self.nodes[self.nodes[dest].pa].lo {
            self.nodes[self.nodes[dest].pa].lo = node;
        } else {
            self.nodes[self.nodes[dest].pa].hi = node;
        }
        self.nodes[node].pa = self.nodes[dest].pa;
        rt
    }

    fn insert_fixup(&mut self, mut rt: usize, mut node: usize) -> usize {
        while self.color(self.nodes[node].pa) == Color::Red {
            let pa = self.nodes[node].pa;
            let gp = self.nodes[pa].pa;
            if pa == self.nodes[gp].lo {
                let uncle = self.nodes[gp].hi;
                if self.color(uncle) == Color::Red {
                    self.set_color(pa, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(gp, Color::Red);
                    node = gp;
                } else {
                    let mut n = node;
                    if n == self.nodes[pa].hi {
                        n = pa;
                        rt = self.rotate_with_hi(rt, n);
                    }
                    let np = self.nodes[n].pa;
                    let ngp = self.nodes[np].pa;
                    self.set_color(np, Color::Black);
                    self.set_color(ngp, Color::Red);
                    rt = self.rotate_with_lo(rt, ngp);
                    node = n;
                }
            } else {
                let uncle = self.nodes[gp].lo;
                if self.color(uncle) == Color::Red {
                    self.set_color(pa, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(gp, Color::Red);
                    node = gp;
                } else {
                    let mut n = node;
                    if n == self.nodes[pa].lo {
                        n = pa;
                        rt = self.rotate_with_lo(rt, n);
                    }
                    let np = self.nodes[n].pa;
                    let ngp = self.nodes[np].pa;
                    self.set_color(np, Color::Black);
                    self.set_color(ngp, Color::Red);
                    rt = self.rotate_with_hi(rt, ngp);
                    node = n;
                }
            }
        }
        self.set_color(rt, Color::Black);
        rt
    }

    fn remove_fixup(&mut self, mut rt: usize, mut node: usize) -> usize {
        while node != rt && self.color(node) == Color::Black {
            if node == self.nodes[self.nodes[node].pa].lo {
                let pa = self.nodes[node].pa;
                let mut sib = self.nodes[pa].hi;
                if self.color(sib) == Color::Red {
                    self.set_color(sib, Color::Black);
                    self.set_color(pa, Color::Red);
                    rt = self.rotate_with_hi(rt, pa);
                    sib = self.nodes[pa].hi;
                }
                if self.color(self.nodes[sib].lo) == Color::Black
                    && self.color(self.nodes[sib].hi) == Color::Black
                {
                    self.set_color(sib, Color::Red);
                    node = pa;
                } else {
                    if self.color(self.nodes[sib].hi) == Color::Black {
                        let sl = self.nodes[sib].lo;
                        self.set_color(sl, Color::Black);
                        self.set_color(sib, Color::Red);
                        rt = self.rotate_with_lo(rt, sib);
                        sib = self.nodes[pa].hi;
                    }
                    self.set_color(sib, self.color(pa));
                    self.set_color(pa, Color::Black);
                    let sh = self.nodes[sib].hi;
                    self.set_color(sh, Color::Black);
                    rt = self.rotate_with_hi(rt, pa);
                    node = rt;
                }
            } else {
                let pa = self.nodes[node].pa;
                let mut sib = self.nodes[pa].lo;
                if self.color(sib) == Color::Red {
                    self.set_color(sib, Color::Black);
                    self.set_color(pa, Color::Red);
                    rt = self.rotate_with_lo(rt, pa);
                    sib = self.nodes[pa].lo;
                }
                if self.color(self.nodes[sib].lo) == Color::Black
                    && self.color(self.nodes[sib].hi) == Color::Black
                {
                    self.set_color(sib, Color::Red);
                    node = pa;
                } else {
                    if self.color(self.nodes[sib].lo) == Color::Black {
                        let sh = self.nodes[sib].hi;
                        self.set_color(sh, Color::Black);
                        self.set_color(sib, Color::Red);
                        rt = self.rotate_with_hi(rt, sib);
                        sib = self.nodes[pa].lo;
                    }
                    self.set_color(sib, self.color(pa));
                    self.set_color(pa, Color::Black);
                    let sl = self.nodes[sib].lo;
                    self.set_color(sl, Color::Black);
                    rt = self.rotate_with_lo(rt, pa);
                    node = rt;
                }
            }
        }
        self.set_color(node, Color::Black);
        rt
    }

    fn minimum(&self, mut n: usize) -> usize {
        while self.nodes[n].lo != NIL {
            n = self.nodes[n].lo;
        }
        n
    }

    /// CLRS-style deletion-plus-fixup of `node` from the detached lo/hi
    /// sub-tree rooted at `rt`.
    fn remove_update(&mut self, mut rt: usize, node: usize) -> usize {
        let mut del = node;
        let mut del_original_color = self.color(del);
        let violation;
        if self.nodes[node].lo == NIL {
            violation = self.nodes[node].hi;
            rt = self.transplant(rt, node, self.nodes[node].hi);
        } else if self.nodes[node].hi == NIL {
            violation = self.nodes[node].lo;
            rt = self.transplant(rt, node, self.nodes[node].lo);
        } else {
            del = self.minimum(self.nodes[node].hi);
            del_original_color = self.color(del);
            violation = self.nodes[del].hi;
            if del != self.nodes[node].hi {
                rt = self.transplant(rt, del, self.nodes[del].hi);
                self.nodes[del].hi = self.nodes[node].hi;
                let dh = self.nodes[del].hi;
                self.nodes[dh].pa = del;
            } else if violation != NIL {
                self.nodes[violation].pa = del;
            }
            rt = self.transplant(rt, node, del);
            self.nodes[del].lo = self.nodes[node].lo;
            let dl = self.nodes[del].lo;
            self.nodes[dl].pa = del;
            self.set_color(del, self.color(node));
        }
        if del_original_color == Color::Black {
            rt = self.remove_fixup(rt, violation);
        }
        rt
    }

    /// Attach a chain of fresh `eq` nodes for the remaining code points,
    /// marking the terminal node as the end of the key.
    fn add_tail(&mut self, mut node: usize, cps: &[u32], mut pos: usize, value: String) -> usize {
        while pos < cps.len() {
            let child = self.push_node(Color::Black, true, cps[pos], node);
            self.nodes[node].eq = child;
            node = child;
            pos += 1;
        }
        self.nodes[node].end = true;
        self.nodes[node].value = value;
        node
    }

    fn insert_update(&mut self, rt: usize, node: usize) {
        if rt == self.root {
            self.root = self.insert_fixup(self.root, node);
            return;
        }
        let pa = self.nodes[rt].pa;
        self.nodes[rt].pa = NIL;
        if self.nodes[pa].lo == rt {
            let new_rt = self.insert_fixup(rt, node);
            self.nodes[pa].lo = new_rt;
            self.nodes[new_rt].pa = pa;
        } else if self.nodes[pa].hi == rt {
            let new_rt = self.insert_fixup(rt, node);
            self.nodes[pa].hi = new_rt;
            self.nodes[new_rt].pa = pa;
        } else {
            let new_rt = self.insert_fixup(rt, node);
            self.nodes[pa].eq = new_rt;
            self.nodes[new_rt].pa = pa;
        }
    }

    /// Insert `(key, value)`; no-op on empty or invalid-UTF-8 keys.
    /// Overwrites `value` if `key` was already present ("last insert wins", per spec §9).
    pub fn insert(&mut self, key: &[u8], value: impl Into<String>) {
        let value = value.into();
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return,
        };
        if self.root == NIL {
            let first = self.push_node(Color::Black, true, cps[0], NIL);
            self.root = first;
            self.add_tail(first, &cps, 1, value);
            log::debug!("trie: first key inserted, bootstrapping root");
            return;
        }
        let mut node = self.root;
        let mut rt = self.root;
        let mut pos = 0;
        loop {
            while cps[pos] != self.nodes[node].codepoint {
                if cps[pos] < self.nodes[node].codepoint {
                    if self.nodes[node].lo != NIL {
                        node = self.nodes[node].lo;
                    } else {
                        let child = self.push_node(Color::Red, false, cps[pos], node);
                        self.nodes[node].lo = child;
                        self.add_tail(child, &cps, pos + 1, value);
                        self.insert_update(rt, child);
                        log::debug!("trie: inserted new lo leaf at depth {pos}");
                        return;
                    }
                } else if self.nodes[node].hi != NIL {
                    node = self.nodes[node].hi;
                } else {
                    let child = self.push_node(Color::Red, false, cps[pos], node);
                    self.nodes[node].hi = child;
                    self.add_tail(child, &cps, pos + 1, value);
                    self.insert_update(rt, child);
                    log::debug!("trie: inserted new hi leaf at depth {pos}");
                    return;
                }
            }
            pos += 1;
            if self.nodes[node].eq != NIL && pos < cps.len() {
                node = self.nodes[node].eq;
                rt = node;
            } else {
                self.add_tail(node, &cps, pos, value);
                return;
            }
        }
    }

    /// Remove `key`; no-op if empty, invalid UTF-8, or not present.
    pub fn remove(&mut self, key: &[u8]) {
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return,
        };
        let mut node = self.root;
        for (pos, &cp) in cps.iter().enumerate() {
            if pos > 0 {
                node = self.nodes[node].eq;
            }
            while node != NIL && self.nodes[node].codepoint != cp {
                node = if cp < self.nodes[node].codepoint { self.nodes[node].lo } else { self.nodes[node].hi };
            }
            if node == NIL {
                return;
            }
        }
        self.nodes[node].end = false;
        loop {
            if node == NIL {
                break;
            }
            let prunable = self.nodes[node].subroot
                && !self.nodes[node].end
                && self.nodes[node].eq == NIL
                && self.nodes[node].lo == NIL
                && self.nodes[node].hi == NIL;
            if !prunable {
                break;
            }
            let pa = self.nodes[node].pa;
            node = pa;
            if node != NIL {
                self.nodes[node].eq = NIL;
            }
        }
        if node == NIL {
            self.root = NIL;
            return;
        }
        if self.nodes[node].end || self.nodes[node].eq != NIL {
            return;
        }
        let mut rt = node;
        while !self.nodes[rt].subroot {
            rt = self.nodes[rt].pa;
        }
        if rt == self.root {
            self.root = self.remove_update(self.root, node);
        } else {
            let pa = self.nodes[rt].pa;
            self.nodes[rt].pa = NIL;
            let new_rt = self.remove_update(rt, node);
            self.nodes[pa].eq = new_rt;
            self.nodes[new_rt].pa = pa;
        }
        log::debug!("trie: removed key, remaining node count {}", self.nodes.len());
    }

    /// Exact lookup. Distinguishes "not present" from "invalid key" per spec §7.
    pub fn search(&self, key: &[u8]) -> SearchResult {
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return SearchResult::Invalid,
        };
        let mut node = self.root;
        for (pos, &cp) in cps.iter().enumerate() {
            while node != NIL && self.nodes[node].codepoint != cp {
                node = if cp < self.nodes[node].codepoint { self.nodes[node].lo } else { self.nodes[node].hi };
            }
            if node == NIL {
                return SearchResult::NotFound;
            }
            if pos + 1 < cps.len() {
                node = self.nodes[node].eq;
            } else if !self.nodes[node].end {
                return SearchResult::NotFound;
            } else {
                return SearchResult::Found(self.nodes[node].value.clone());
            }
        }
        SearchResult::NotFound
    }

    // ----- iterative post-order walk, used by Clear/Count -----

    fn post_order_begin(&self, mut node: usize) -> usize {
        while node != NIL && (self.nodes[node].lo != NIL || self.nodes[node].eq != NIL || self.nodes[node].hi != NIL)
        {
            node = if self.nodes[node].lo != NIL {
                self.nodes[node].lo
            } else if self.nodes[node].eq != NIL {
                self.nodes[node].eq
            } else {
                self.nodes[node].hi
            };
        }
        node
    }

    fn post_order_successor(&self, node: usize) -> usize {
        let pa = self.nodes[node].pa;
        if pa == NIL {
            return NIL;
        }
        if self.nodes[pa].hi == node {
            return pa;
        }
        if self.nodes[pa].eq == node {
            return if self.nodes[pa].hi != NIL { self.post_order_begin(self.nodes[pa].hi) } else { pa };
        }
        if self.nodes[pa].eq != NIL {
            return self.post_order_begin(self.nodes[pa].eq);
        }
        if self.nodes[pa].hi != NIL {
            return self.post_order_begin(self.nodes[pa].hi);
        }
        pa
    }

    /// Number of trie nodes (not number of stored keys). Iterative.
    pub fn count(&self) -> usize {
        if self.root == NIL {
            return 0;
        }
        let mut count = 0;
        let mut cur = self.post_order_begin(self.root);
        while cur != self.root {
            count += 1;
            cur = self.post_order_successor(cur);
        }
        count + 1
    }

    /// Iteratively drop every node, leaving the trie empty.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.root = NIL;
    }

    // ----- iterative in-order walk over a detached lo/eq/hi sub-tree, for prefix enumeration -----

    fn in_order_begin(&self, mut node: usize, buf: &mut Vec<u32>) -> usize {
        while node != NIL && self.nodes[node].lo != NIL {
            node = self.nodes[node].lo;
        }
        if node != NIL {
            buf.push(self.nodes[node].codepoint);
        }
        node
    }

    fn in_order_successor(&self, mut node: usize, buf: &mut Vec<u32>) -> usize {
        if self.nodes[node].eq != NIL {
            return self.in_order_begin(self.nodes[node].eq, buf);
        }
        if self.nodes[node].hi != NIL {
            return self.in_order_begin(self.nodes[node].hi, buf);
        }
        loop {
            if node == NIL {
                buf.clear();
                return NIL;
            }
            let pa = self.nodes[node].pa;
            if pa == NIL {
                buf.clear();
                return NIL;
            }
            if self.nodes[pa].lo == node {
                *buf.last_mut().unwrap() = self.nodes[pa].codepoint;
                return pa;
            }
            if self.nodes[pa].eq == node {
                buf.pop();
                if self.nodes[pa].hi != NIL {
                    buf.pop();
                    return self.in_order_begin(self.nodes[pa].hi, buf);
                }
            }
            node = pa;
        }
    }

    /// Depth-first collection of every `end` key under `node`'s `eq`
    /// sub-tree, with `prefix` as the already-matched leading code points.
    fn collect(&self, node: usize, prefix: &[u32], out: &mut Vec<String>) {
        if node == NIL {
            return;
        }
        // Detach for traversal purposes is unnecessary here: unlike the
        // original pointer design we never need to scribble a sentinel
        // parent, we just stop walking at `node`'s own parent boundary.
        let mut buf: Vec<u32> = prefix.to_vec();
        let mut cur = self.in_order_begin(node, &mut buf);
        // in_order_begin/in_order_successor walk using real `pa` links and
        // will naturally stop once they'd walk above `node` because `node`
        // is a subroot (eq-reached), so its `pa` leads back into the parent
        // chain - guard explicitly instead of mutating it.
        loop {
            if cur == NIL {
                break;
            }
            if self.nodes[cur].end {
                out.push(unicode::to_output_bytes(&buf));
            }
            let next = self.bounded_in_order_successor(node, cur, &mut buf);
            if next == cur {
                break;
            }
            cur = next;
        }
    }

    /// Like `in_order_successor`, but stops (returns NIL) once the walk
    /// would ascend past `boundary`'s own subtree.
    fn bounded_in_order_successor(&self, boundary: usize, node: usize, buf: &mut Vec<u32>) -> usize {
        if self.nodes[node].eq != NIL {
            return self.in_order_begin(self.nodes[node].eq, buf);
        }
        if self.nodes[node].hi != NIL {
            return self.in_order_begin(self.nodes[node].hi, buf);
        }
        let mut cur = node;
        loop {
            if cur == boundary {
                buf.clear();
                return NIL;
            }
            let pa = self.nodes[cur].pa;
            if pa == NIL {
                buf.clear();
                return NIL;
            }
            if self.nodes[pa].lo == cur {
                *buf.last_mut().unwrap() = self.nodes[pa].codepoint;
                return pa;
            }
            if self.nodes[pa].eq == cur {
                buf.pop();
                if self.nodes[pa].hi != NIL {
                    buf.pop();
                    return self.in_order_begin(self.nodes[pa].hi, buf);
                }
            }
            cur = pa;
        }
    }

    /// All stored keys sharing `key` as a prefix (including `key` itself
    /// if it is itself a stored key). Empty on invalid or absent input.
    pub fn prefix_search(&self, key: &[u8]) -> Vec<String> {
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return Vec::new(),
        };
        let mut node = self.root;
        for (pos, &cp) in cps.iter().enumerate() {
            while node != NIL && self.nodes[node].codepoint != cp {
                node = if cp < self.nodes[node].codepoint { self.nodes[node].lo } else { self.nodes[node].hi };
            }
            if node == NIL {
                return Vec::new();
            }
            if pos + 1 < cps.len() {
                node = self.nodes[node].eq;
            }
        }
        let mut out = Vec::new();
        if self.nodes[node].end {
            out.push(unicode::to_output_bytes(&cps));
        }
        self.collect(self.nodes[node].eq, &cps, &mut out);
        out
    }

    /// The k-th (0-indexed) stored key in ascending order, or `None` if
    /// the trie holds fewer than `k + 1` keys.
    pub fn get_kth(&self, mut k: usize) -> Option<String> {
        if self.root == NIL {
            return None;
        }
        let mut buf = Vec::new();
        let mut cur = self.in_order_begin(self.root, &mut buf);
        loop {
            if cur == NIL {
                return None;
            }
            if self.nodes[cur].end {
                if k == 0 {
                    return Some(unicode::to_output_bytes(&buf));
                }
                k -= 1;
            }
            cur = self.in_order_successor(cur, &mut buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(t: &mut RbTst, k: &str, v: &str) {
        t.insert(k.as_bytes(), v);
    }

    #[test]
    fn scenario_prefix_and_exact() {
        let mut t = RbTst::new();
        kv(&mut t, "thử nghiệm", "experiment");
        kv(&mut t, "cây hậu tố", "suffix tree");
        kv(&mut t, "cây nhị phân", "binary tree");
        kv(&mut t, "nhi đồng", "children");
        kv(&mut t, "abcababd", "x");
        kv(&mut t, "abc", "y");
        t.remove(b"abc");

        let mut got = t.prefix_search(b"a");
        got.sort();
        assert_eq!(got, vec!["abcababd".to_string()]);

        assert_eq!(t.search(b"abc"), SearchResult::NotFound);
        assert_eq!(t.search(b"abcababd"), SearchResult::Found("x".to_string()));
        assert_eq!(t.search(b"cây hậu tố"), SearchResult::Found("suffix tree".to_string()));
    }

    #[test]
    fn prefix_search_visits_hi_sibling_of_boundary_subroot() {
        // "abcababd" and "abd" share "ab" as a prefix but diverge at the
        // third code point ('c' vs 'd'); the subroot at that depth is
        // 'c' with 'd' attached as its `hi` sibling, so enumeration must
        // not stop after only the 'c' subtree.
        let mut t = RbTst::new();
        kv(&mut t, "abcababd", "x");
        kv(&mut t, "abd", "y");

        let mut got = t.prefix_search(b"ab");
        got.sort();
        assert_eq!(got, vec!["abcababd".to_string(), "abd".to_string()]);
    }

    #[test]
    fn empty_key_is_noop() {
        let mut t = RbTst::new();
        t.insert(b"", "value");
        assert_eq!(t.count(), 0);
        assert_eq!(t.search(b""), SearchResult::Invalid);
    }

    #[test]
    fn duplicate_insert_overwrites_value() {
        let mut t = RbTst::new();
        kv(&mut t, "dog", "animal-1");
        kv(&mut t, "dog", "animal-2");
        assert_eq!(t.search(b"dog"), SearchResult::Found("animal-2".to_string()));
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let mut t = RbTst::new();
        kv(&mut t, "dog", "animal");
        t.remove(b"cat");
        assert_eq!(t.search(b"dog"), SearchResult::Found("animal".to_string()));
    }

    #[test]
    fn unicode_normalization_equivalence() {
        let mut t = RbTst::new();
        // precomposed e-acute
        t.insert("caf\u{e9}".as_bytes(), "coffee shop");
        // decomposed e + combining acute
        assert_eq!(t.search("cafe\u{0301}".as_bytes()), SearchResult::Found("coffee shop".to_string()));
    }

    #[test]
    fn get_kth_orders_ascending() {
        let mut t = RbTst::new();
        for w in ["banana", "apple", "cherry", "date"] {
            kv(&mut t, w, w);
        }
        let mut words = Vec::new();
        let mut k = 0;
        while let Some(w) = t.get_kth(k) {
            words.push(w);
            k += 1;
        }
        let mut sorted = words.clone();
        sorted.sort();
        assert_eq!(words, sorted);
        assert_eq!(words.len(), 4);
    }

    #[test]
    fn long_key_does_not_overflow_stack() {
        let mut t = RbTst::new();
        let long_key: String = "a".repeat(200_000);
        t.insert(long_key.as_bytes(), "deep");
        assert_eq!(t.search(long_key.as_bytes()), SearchResult::Found("deep".to_string()));
        let prefix = "a".repeat(100);
        assert_eq!(t.prefix_search(prefix.as_bytes()), vec![long_key.clone()]);
        t.remove(long_key.as_bytes());
        assert_eq!(t.search(long_key.as_bytes()), SearchResult::NotFound);
    }

    #[test]
    fn insert_many_then_remove_all() {
        let mut t = RbTst::new();
        let words: Vec<String> = (0..500).map(|i| format!("word{i:04}")).collect();
        for w in &words {
            kv(&mut t, w, w);
        }
        for w in &words {
            assert_eq!(t.search(w.as_bytes()), SearchResult::Found(w.clone()));
        }
        for w in &words {
            t.remove(w.as_bytes());
        }
        assert_eq!(t.count(), 0);
        for w in &words {
            assert_eq!(t.search(w.as_bytes()), SearchResult::NotFound);
        }
    }

    #[test]
    fn clear_empties_trie() {
        let mut t = RbTst::new();
        kv(&mut t, "one", "1");
        kv(&mut t, "two", "2");
        t.clear();
        assert_eq!(t.count(), 0);
        assert_eq!(t.search(b"one"), SearchResult::NotFound);
    }
}
