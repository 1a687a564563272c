//! Generalized online suffix tree, built with Ukkonen's algorithm
//! (component D).
//!
//! Every call to [`SuffixTree::add`] appends one more document's NFD
//! code points (plus a sentinel) to a single shared text buffer and
//! extends the tree incrementally. `find` returns the owning (key,
//! value) pairs for every occurrence of a queried substring, with
//! per-query deduplication so a key with many matching suffixes is
//! reported once.
//!
//! Per-node child dispatch is backed by [`crate::ordered_map::RbMap`]
//! (spec: "D uses B for per-node edge dispatch"). Node links use a
//! tagged enum rather than the sign-encoded integer the source
//! overloads a single field with, and satellites are deduplicated with
//! a per-query visited set rather than a destructive mark-and-restore
//! on the satellite record itself.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::ordered_map::RbMap;
use crate::unicode;

/// Reserved code point appended after every inserted key's code points,
/// forcing every suffix to terminate in an explicit leaf. Not rejected
/// on input; callers must not feed it a literal key containing this
/// code point.
pub const SENTINEL: u32 = 36;

const OO: usize = i32::MAX as usize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NodeLink {
    None,
    Suffix(usize),
    Leaf(usize),
}

struct Node {
    start: usize,
    end: usize,
    link: NodeLink,
    children: RbMap<u32, usize>,
}

struct Satellite {
    data: String,
    key_len: usize,
    key_pos: usize,
}

/// One substring match: the owning stored key and its associated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// A generalized suffix tree over all keys added so far.
pub struct SuffixTree {
    text: Vec<u32>,
    nodes: Vec<Node>,
    satellites: Vec<Satellite>,
    root: usize,
    need_sl: usize,
    remainder: usize,
    active_node: usize,
    active_edge: usize,
    active_length: usize,
}

impl Default for SuffixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixTree {
    pub fn new() -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node { start: usize::MAX, end: usize::MAX, link: NodeLink::None, children: RbMap::new() });
        SuffixTree {
            text: Vec::new(),
            nodes,
            satellites: Vec::new(),
            root: 0,
            need_sl: 0,
            remainder: 0,
            active_node: 0,
            active_edge: 0,
            active_length: 0,
        }
    }

    fn new_node(&mut self, start: usize, end: usize, satellite: Option<usize>) -> usize {
        let link = match satellite {
            Some(idx) => NodeLink::Leaf(idx),
            None => NodeLink::None,
        };
        self.nodes.push(Node { start, end, link, children: RbMap::new() });
        self.nodes.len() - 1
    }

    fn edge_length(&self, node: usize) -> usize {
        if node == self.root {
            // the root carries no incoming edge; treat its length as 0
            // rather than underflow on its placeholder start/end.
            return 0;
        }
        self.nodes[node].end.min(self.text.len()) - self.nodes[node].start
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].end == OO
    }

    fn active_edge_char(&self) -> u32 {
        self.text[self.active_edge]
    }

    fn add_link(&mut self, node: usize) {
        if self.need_sl > 0 {
            self.nodes[self.need_sl].link = NodeLink::Suffix(node);
        }
        self.need_sl = node;
    }

    fn walk_down(&mut self, node: usize) -> bool {
        let len = self.edge_length(node);
        if self.active_length >= len {
            self.active_edge += len;
            self.active_length -= len;
            self.active_node = node;
            true
        } else {
            false
        }
    }

    fn extend(&mut self, c: u32, satellite_idx: usize) {
        self.text.push(c);
        self.need_sl = 0;
        self.remainder += 1;
        while self.remainder > 0 {
            if self.active_length == 0 {
                self.active_edge = self.text.len() - 1;
            }
            let edge_char = self.active_edge_char();
            let existing = self.nodes[self.active_node].children.get(&edge_char).copied();
            match existing {
                None => {
                    let leaf = self.new_node(self.text.len() - 1, OO, Some(satellite_idx));
                    self.nodes[self.active_node].children.set(edge_char, leaf);
                    self.add_link(self.active_node);
                }
                Some(next) => {
                    if self.walk_down(next) {
                        continue;
                    }
                    if self.text[self.nodes[next].start + self.active_length] == c {
                        self.active_length += 1;
                        self.add_link(self.active_node);
                        break;
                    }
                    let next_start = self.nodes[next].start;
                    let split = self.new_node(next_start, next_start + self.active_length, None);
                    self.nodes[self.active_node].children.set(edge_char, split);
                    let leaf = self.new_node(self.text.len() - 1, OO, Some(satellite_idx));
                    self.nodes[split].children.set(c, leaf);
                    self.nodes[next].start += self.active_length;
                    let resumed_char = self.text[self.nodes[next].start];
                    self.nodes[split].children.set(resumed_char, next);
                    self.add_link(split);
                }
            }
            self.remainder -= 1;
            if self.active_node == self.root && self.active_length > 0 {
                self.active_length -= 1;
                self.active_edge = self.text.len() - self.remainder;
            } else {
                self.active_node = match self.nodes[self.active_node].link {
                    NodeLink::Suffix(n) => n,
                    _ => self.root,
                };
            }
        }
    }

    /// Append `(key, value)` as one more document. No-op on empty or
    /// invalid-UTF-8 keys.
    pub fn add(&mut self, key: &[u8], value: impl Into<String>) {
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return,
        };
        let key_pos = self.text.len();
        let satellite_idx = self.satellites.len();
        self.satellites.push(Satellite { data: value.into(), key_len: cps.len(), key_pos });
        for &c in &cps {
            self.extend(c, satellite_idx);
        }
        self.extend(SENTINEL, satellite_idx);
        log::debug!("suffix_tree: added document of {} code points, tree has {} nodes", cps.len(), self.nodes.len());
    }

    /// True iff `substr` occurs somewhere in the concatenated text.
    pub fn contain(&self, substr: &[u32]) -> bool {
        let mut cur_node = self.root;
        let mut cur_len = 0usize;
        for &c in substr {
            if cur_len == self.edge_length(cur_node) {
                match self.nodes[cur_node].children.get(&c) {
                    None => return false,
                    Some(&child) => {
                        cur_node = child;
                        cur_len = 1;
                    }
                }
            } else if c == self.text[self.nodes[cur_node].start + cur_len] {
                cur_len += 1;
            } else {
                return false;
            }
        }
        true
    }

    fn descend(&self, cps: &[u32]) -> Option<usize> {
        let mut cur_node = self.root;
        let mut cur_len = 0usize;
        for &c in cps {
            if cur_len == self.edge_length(cur_node) {
                match self.nodes[cur_node].children.get(&c) {
                    None => return None,
                    Some(&child) => {
                        cur_node = child;
                        cur_len = 1;
                    }
                }
            } else if c == self.text[self.nodes[cur_node].start + cur_len] {
                cur_len += 1;
            } else {
                return None;
            }
        }
        Some(cur_node)
    }

    /// Every (key, value) pair whose key contains `key` as a substring,
    /// deduplicated. Empty on invalid input or no match.
    pub fn find(&self, key: &[u8]) -> Vec<KeyValue> {
        let cps = match unicode::to_codepoints(key) {
            Ok(cps) if !cps.is_empty() => cps,
            _ => return Vec::new(),
        };
        let Some(node) = self.descend(&cps) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        // explicit work stack: Collect must not recurse, per spec's
        // "recursion avoidance" guidance — a dense sub-tree under a
        // short query could be arbitrarily deep.
        let mut stack = vec![node];
        while let Some(cur) = stack.pop() {
            if self.is_leaf(cur) {
                if let NodeLink::Leaf(sat_idx) = self.nodes[cur].link {
                    if seen.insert(sat_idx) {
                        let sat = &self.satellites[sat_idx];
                        let slice = &self.text[sat.key_pos..sat.key_pos + sat.key_len];
                        out.push(KeyValue { key: unicode::to_output_bytes(slice), value: sat.data.clone() });
                    }
                }
                continue;
            }
            for (_, &child) in self.nodes[cur].children.iter() {
                stack.push(child);
            }
        }
        out
    }

    /// Every suffix of the text buffer (debug aid): returns each
    /// root-to-leaf edge-label concatenation as NFC text.
    pub fn list(&self) -> Vec<String> {
        let mut out = Vec::new();
        // (node, prefix-so-far) explicit stack, per spec's recursion-avoidance guidance.
        let mut stack: Vec<(usize, Vec<u32>)> = vec![(self.root, Vec::new())];
        while let Some((node, prefix)) = stack.pop() {
            if self.is_leaf(node) {
                let mut full = prefix.clone();
                full.extend_from_slice(&self.text[self.nodes[node].start..self.text.len()]);
                out.push(unicode::to_output_bytes(&full));
                continue;
            }
            if node != self.root {
                let mut extended = prefix.clone();
                extended.extend_from_slice(&self.text[self.nodes[node].start..self.nodes[node].end]);
                for (_, &child) in self.nodes[node].children.iter() {
                    stack.push((child, extended.clone()));
                }
            } else {
                for (_, &child) in self.nodes[node].children.iter() {
                    stack.push((child, prefix.clone()));
                }
            }
        }
        out
    }

    /// Self-consistency check: every suffix of the text buffer must be `contain`-able.
    pub fn validate(&self) -> bool {
        for start in 0..self.text.len() {
            if !self.contain(&self.text[start..]) {
                return false;
            }
        }
        true
    }

    /// Write `<dir>/<name>.text`, `.sate`, `.tree`. Returns `false` on
    /// any I/O failure or if `dir` exists as a non-directory.
    pub fn serialize(&self, dir: &Path, name: &str) -> bool {
        if dir.exists() && !dir.is_dir() {
            return false;
        }
        if !dir.exists() && std::fs::create_dir_all(dir).is_err() {
            return false;
        }
        match self.try_serialize(dir, name) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("suffix_tree: serialize failed: {e}");
                false
            }
        }
    }

    fn try_serialize(&self, dir: &Path, name: &str) -> std::io::Result<()> {
        let mut text_file = std::fs::File::create(dir.join(format!("{name}.text")))?;
        text_file.write_all(&(self.text.len() as i32).to_le_bytes())?;
        for &cp in &self.text {
            text_file.write_all(&cp.to_le_bytes())?;
        }

        let mut sate_file = std::fs::File::create(dir.join(format!("{name}.sate")))?;
        sate_file.write_all(&(self.satellites.len() as i32).to_le_bytes())?;
        for sat in &self.satellites {
            let bytes = sat.data.as_bytes();
            sate_file.write_all(&(bytes.len() as i32).to_le_bytes())?;
            sate_file.write_all(bytes)?;
            sate_file.write_all(&(sat.key_len as i32).to_le_bytes())?;
            sate_file.write_all(&(sat.key_pos as i32).to_le_bytes())?;
        }

        let mut tree_file = std::fs::File::create(dir.join(format!("{name}.tree")))?;
        tree_file.write_all(&(self.root as i32).to_le_bytes())?;
        tree_file.write_all(&(self.need_sl as i32).to_le_bytes())?;
        tree_file.write_all(&(self.remainder as i32).to_le_bytes())?;
        tree_file.write_all(&(self.active_node as i32).to_le_bytes())?;
        tree_file.write_all(&(self.active_edge as i32).to_le_bytes())?;
        tree_file.write_all(&(self.active_length as i32).to_le_bytes())?;
        tree_file.write_all(&(self.nodes.len() as i32).to_le_bytes())?;
        for node in &self.nodes {
            tree_file.write_all(&(node.start as i32).to_le_bytes())?;
            let end_word = if node.end == OO { i32::MAX } else { node.end as i32 };
            tree_file.write_all(&end_word.to_le_bytes())?;
            let link_word: i32 = match node.link {
                NodeLink::None => 0,
                NodeLink::Suffix(n) => n as i32,
                NodeLink::Leaf(idx) => -(idx as i32),
            };
            tree_file.write_all(&link_word.to_le_bytes())?;
            tree_file.write_all(&(node.children.len() as i32).to_le_bytes())?;
            for (&cp, &child) in node.children.iter() {
                tree_file.write_all(&cp.to_le_bytes())?;
                tree_file.write_all(&(child as i32).to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Replace the tree's state by reading `<dir>/<name>.text/.sate/.tree`.
    /// Returns `false` if any file is missing, unreadable, or malformed.
    pub fn deserialize(dir: &Path, name: &str) -> Option<Self> {
        if !dir.is_dir() {
            return None;
        }
        match Self::try_deserialize(dir, name) {
            Ok(tree) => Some(tree),
            Err(e) => {
                log::warn!("suffix_tree: deserialize failed: {e}");
                None
            }
        }
    }

    fn try_deserialize(dir: &Path, name: &str) -> std::io::Result<Self> {
        let mut text_file = std::fs::File::open(dir.join(format!("{name}.text")))?;
        let text_size = read_i32(&mut text_file)? as usize;
        let mut text = Vec::with_capacity(text_size);
        for _ in 0..text_size {
            text.push(read_u32(&mut text_file)?);
        }

        let mut sate_file = std::fs::File::open(dir.join(format!("{name}.sate")))?;
        let sat_cnt = read_i32(&mut sate_file)? as usize;
        let mut satellites = Vec::with_capacity(sat_cnt);
        for _ in 0..sat_cnt {
            let data_size = read_i32(&mut sate_file)? as usize;
            let mut buf = vec![0u8; data_size];
            sate_file.read_exact(&mut buf)?;
            let data = String::from_utf8(buf).map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf8"))?;
            let key_len = read_i32(&mut sate_file)? as usize;
            let key_pos = read_i32(&mut sate_file)? as usize;
            satellites.push(Satellite { data, key_len, key_pos });
        }

        let mut tree_file = std::fs::File::open(dir.join(format!("{name}.tree")))?;
        let root = read_i32(&mut tree_file)? as usize;
        let need_sl = read_i32(&mut tree_file)? as usize;
        let remainder = read_i32(&mut tree_file)? as usize;
        let active_node = read_i32(&mut tree_file)? as usize;
        let active_edge = read_i32(&mut tree_file)? as usize;
        let active_length = read_i32(&mut tree_file)? as usize;
        // treeSize on disk is authoritative, superseding any prior capacity guess.
        let tree_size = read_i32(&mut tree_file)? as usize;
        let mut nodes = Vec::with_capacity(tree_size);
        for _ in 0..tree_size {
            let start = read_i32(&mut tree_file)? as usize;
            let end_word = read_i32(&mut tree_file)?;
            let end = if end_word == i32::MAX { OO } else { end_word as usize };
            let link_word = read_i32(&mut tree_file)?;
            let link = if end == OO {
                NodeLink::Leaf((-link_word) as usize)
            } else if link_word > 0 {
                NodeLink::Suffix(link_word as usize)
            } else {
                NodeLink::None
            };
            let map_size = read_i32(&mut tree_file)? as usize;
            let mut children = RbMap::new();
            for _ in 0..map_size {
                let cp = read_u32(&mut tree_file)?;
                let child = read_i32(&mut tree_file)? as usize;
                children.set(cp, child);
            }
            nodes.push(Node { start, end, link, children });
        }

        Ok(SuffixTree { text, nodes, satellites, root, need_sl, remainder, active_node, active_edge, active_length })
    }
}

fn read_i32(r: &mut impl Read) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u32(r: &mut impl Read) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_substring_search() {
        let mut t = SuffixTree::new();
        t.add("thử nghiệm".as_bytes(), "experiment");
        t.add("cây hậu tố".as_bytes(), "suffix tree");

        let cps = unicode::to_codepoints("nghiệm".as_bytes()).unwrap();
        assert!(t.contain(&cps));

        let mut found = t.find("nghiệm".as_bytes());
        found.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(found, vec![KeyValue { key: "thử nghiệm".to_string(), value: "experiment".to_string() }]);

        let mut found = t.find("cây".as_bytes());
        found.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|kv| kv.key == "thử nghiệm" && kv.value == "experiment"));
        assert!(found.iter().any(|kv| kv.key == "cây hậu tố" && kv.value == "suffix tree"));
    }

    #[test]
    fn scenario_validate() {
        let mut t = SuffixTree::new();
        t.add(b"banana", "fruit-1");
        t.add(b"ananas", "fruit-2");
        assert!(t.validate());
    }

    #[test]
    fn find_is_deduplicated_per_key() {
        let mut t = SuffixTree::new();
        t.add(b"banana", "fruit");
        // "ana" occurs twice inside "banana" — exactly one KeyValue back.
        let found = t.find(b"ana");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "banana");
    }

    #[test]
    fn persistence_round_trip() {
        let mut t = SuffixTree::new();
        t.add("thử nghiệm".as_bytes(), "experiment");
        t.add("cây hậu tố".as_bytes(), "suffix tree");

        let dir = tempfile::tempdir().unwrap();
        assert!(t.serialize(dir.path(), "idx"));

        let reloaded = SuffixTree::deserialize(dir.path(), "idx").unwrap();
        let mut found = reloaded.find("nghiệm".as_bytes());
        found.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(found, vec![KeyValue { key: "thử nghiệm".to_string(), value: "experiment".to_string() }]);
        assert!(reloaded.validate());
    }

    #[test]
    fn empty_and_invalid_keys_are_noop() {
        let mut t = SuffixTree::new();
        t.add(b"", "nope");
        let bad = [0xffu8, 0xfe];
        t.add(&bad, "nope");
        assert_eq!(t.nodes.len(), 1);
        assert!(t.find(b"").is_empty());
    }

    #[test]
    fn deserialize_missing_directory_fails() {
        let missing = Path::new("/nonexistent/path/for/lexitrie/tests");
        assert!(SuffixTree::deserialize(missing, "idx").is_none());
    }
}
