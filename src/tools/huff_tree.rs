//! Word-keyed adaptive Huffman tree.
//!
//! The tree starts with three nodes: a root whose left child is the NYT
//! leaf (the growth site for the next unseen word) and whose right child
//! is the NCW leaf (the escape code announcing an inline raw word).
//! Every sighting of a word bumps weights from its leaf up to the root,
//! exchanging nodes along the way so frequent words drift toward short
//! paths.  Encoder and decoder run the identical update, which is the
//! whole trick: the two trees stay bit-for-bit interchangeable.
//!
//! Nodes live in a flat arena and refer to each other by slot index, so
//! an exchange is a handful of index updates and nothing is ever freed.

use bit_vec::BitVec;
use std::collections::HashMap;

/// arena slot of the root node
const ROOT: usize = 0;

/// Role of an arena slot.  A NYT slot turns into `Internal` in place
/// when a new word grows the tree.
#[derive(Clone,Debug,PartialEq)]
pub enum NodeKind {
    Internal,
    /// leaf carrying one word of the alphabet
    Word(String),
    /// not-yet-transmitted leaf, the insertion site for the next new word
    Nyt,
    /// new-code-word escape leaf
    Ncw
}

/// Children and parent are arena indices.  The key is a tie-breaker for
/// picking exchange partners within a weight block, it never changes
/// after the node is created.
struct Node {
    weight: u64,
    key: u64,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    kind: NodeKind
}

/// The code tree plus the word-to-leaf index used during encoding.
pub struct HuffTree {
    nodes: Vec<Node>,
    index: HashMap<String,usize>,
    nyt: usize,
    ncw: usize,
    next_key: u64
}

impl HuffTree {
    pub fn new() -> Self {
        let root = Node { weight: 0, key: 3, parent: None, left: Some(1), right: Some(2), kind: NodeKind::Internal };
        let nyt = Node { weight: 0, key: 1, parent: Some(ROOT), left: None, right: None, kind: NodeKind::Nyt };
        let ncw = Node { weight: 0, key: 2, parent: Some(ROOT), left: None, right: None, kind: NodeKind::Ncw };
        Self {
            nodes: vec![root,nyt,ncw],
            index: HashMap::new(),
            nyt: 1,
            ncw: 2,
            next_key: 4
        }
    }
    pub fn root(&self) -> usize {
        ROOT
    }
    pub fn nyt(&self) -> usize {
        self.nyt
    }
    pub fn ncw(&self) -> usize {
        self.ncw
    }
    pub fn is_leaf(&self,ix: usize) -> bool {
        self.nodes[ix].left.is_none()
    }
    /// child on the 0 (left) or 1 (right) side, `None` if `ix` is a leaf
    pub fn child(&self,ix: usize,right: bool) -> Option<usize> {
        match right {
            true => self.nodes[ix].right,
            false => self.nodes[ix].left
        }
    }
    /// the word at a leaf, `None` for every other kind of node
    pub fn word(&self,ix: usize) -> Option<&str> {
        match &self.nodes[ix].kind {
            NodeKind::Word(word) => Some(word),
            _ => None
        }
    }
    pub fn lookup(&self,word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }
    /// bit path from the root down to `ix`, 0 selecting the left child
    pub fn path_to(&self,ix: usize) -> BitVec {
        let mut rev: Vec<bool> = Vec::new();
        let mut curs = ix;
        while let Some(parent) = self.nodes[curs].parent {
            rev.push(self.nodes[parent].right == Some(curs));
            curs = parent;
        }
        let mut path = BitVec::with_capacity(rev.len());
        for bit in rev.iter().rev() {
            path.push(*bit);
        }
        path
    }
    /// Bump the weight of `ix` and of every ancestor by one.  Before each
    /// bump the visited node trades places with the highest-key member of
    /// its weight block, unless the two share a root path (trading a node
    /// into its own subtree would cut the tree apart).
    pub fn increment(&mut self,mut ix: usize) {
        loop {
            let leader = self.block_leader(ix);
            if leader != ix && !self.on_root_path(leader,ix) && !self.on_root_path(ix,leader) {
                self.exchange(ix,leader);
            }
            self.nodes[ix].weight += 1;
            match self.nodes[ix].parent {
                Some(parent) => ix = parent,
                None => break
            }
        }
    }
    /// Grow the tree at the NYT leaf: the leaf becomes internal, a fresh
    /// NYT goes into its left slot and the new word leaf into its right.
    /// The word leaf takes the smaller of the two fresh keys.
    pub fn insert(&mut self,word: &str) {
        let site = self.nyt;
        let word_slot = self.nodes.len();
        self.nodes.push(Node {
            weight: 0,
            key: self.next_key,
            parent: Some(site),
            left: None,
            right: None,
            kind: NodeKind::Word(word.to_string())
        });
        let nyt_slot = self.nodes.len();
        self.nodes.push(Node {
            weight: 0,
            key: self.next_key + 1,
            parent: Some(site),
            left: None,
            right: None,
            kind: NodeKind::Nyt
        });
        self.next_key += 2;
        self.nodes[site].kind = NodeKind::Internal;
        self.nodes[site].left = Some(nyt_slot);
        self.nodes[site].right = Some(word_slot);
        self.nyt = nyt_slot;
        self.index.insert(word.to_string(),word_slot);
        self.increment(word_slot);
    }
    /// highest-key node among all nodes whose weight matches `ix`
    fn block_leader(&self,ix: usize) -> usize {
        let weight = self.nodes[ix].weight;
        let mut leader = ix;
        for (slot,node) in self.nodes.iter().enumerate() {
            if node.weight == weight && node.key > self.nodes[leader].key {
                leader = slot;
            }
        }
        leader
    }
    /// true if `anc` lies on the path from `ix` up to the root
    fn on_root_path(&self,anc: usize,ix: usize) -> bool {
        let mut curs = self.nodes[ix].parent;
        while let Some(up) = curs {
            if up == anc {
                return true;
            }
            curs = self.nodes[up].parent;
        }
        false
    }
    /// Exchange the tree positions of two non-root nodes.  Weight and key
    /// travel with the node, only the link indices are rewritten.
    fn exchange(&mut self,a: usize,b: usize) {
        let (Some(pa),Some(pb)) = (self.nodes[a].parent,self.nodes[b].parent) else {
            return;
        };
        let a_right = self.nodes[pa].right == Some(a);
        let b_right = self.nodes[pb].right == Some(b);
        self.set_child(pa,a_right,b);
        self.set_child(pb,b_right,a);
        self.nodes[a].parent = Some(pb);
        self.nodes[b].parent = Some(pa);
    }
    fn set_child(&mut self,parent: usize,right: bool,child: usize) {
        match right {
            true => self.nodes[parent].right = Some(child),
            false => self.nodes[parent].left = Some(child)
        }
    }
}

#[cfg(test)]
impl HuffTree {
    /// Panics if any structural property of the tree is broken.
    pub fn check_invariants(&self) {
        use std::collections::HashSet;
        let mut keys = HashSet::new();
        let mut nyt_count = 0;
        let mut ncw_count = 0;
        for (slot,node) in self.nodes.iter().enumerate() {
            assert!(keys.insert(node.key),"duplicate key {}",node.key);
            match (&node.kind,node.left,node.right) {
                (NodeKind::Internal,Some(left),Some(right)) => {
                    assert_eq!(node.weight,self.nodes[left].weight + self.nodes[right].weight,
                        "weight additivity broken at slot {}",slot);
                    assert_eq!(self.nodes[left].parent,Some(slot));
                    assert_eq!(self.nodes[right].parent,Some(slot));
                },
                (NodeKind::Internal,_,_) => panic!("internal node without two children"),
                (_,None,None) => {},
                _ => panic!("leaf with children")
            }
            match node.kind {
                NodeKind::Nyt => nyt_count += 1,
                NodeKind::Ncw => ncw_count += 1,
                _ => {}
            }
        }
        assert_eq!(nyt_count,1,"expected exactly one NYT leaf");
        assert_eq!(ncw_count,1,"expected exactly one NCW leaf");
        for (word,slot) in self.index.iter() {
            assert_eq!(self.word(*slot),Some(word.as_str()));
            let mut curs = ROOT;
            for bit in self.path_to(*slot).iter() {
                curs = self.child(curs,bit).expect("path walks off the tree");
            }
            assert_eq!(curs,*slot,"word {:?} not reachable by its own path",word);
        }
    }
}

#[cfg(test)]
fn path_bits(tree: &HuffTree,ix: usize) -> Vec<bool> {
    tree.path_to(ix).iter().collect()
}

#[test]
fn initial_layout() {
    let tree = HuffTree::new();
    assert_eq!(path_bits(&tree,tree.nyt()),vec![false]);
    assert_eq!(path_bits(&tree,tree.ncw()),vec![true]);
    tree.check_invariants();
}

#[test]
fn first_insert_reshapes_left_subtree() {
    let mut tree = HuffTree::new();
    tree.insert("hi");
    tree.check_invariants();
    let leaf = tree.lookup("hi").expect("missing leaf");
    // the fresh NYT outranks the new leaf within the zero-weight block,
    // so the two trade places and the word comes out on the left
    assert_eq!(path_bits(&tree,leaf),vec![false,false]);
    // the escape leaf stays on the root's right slot
    assert_eq!(path_bits(&tree,tree.ncw()),vec![true]);
}

#[test]
fn invariants_hold_while_growing() {
    let mut tree = HuffTree::new();
    for word in ["we","like","words","we","we","like"] {
        match tree.lookup(word) {
            Some(leaf) => tree.increment(leaf),
            None => tree.insert(word)
        };
        tree.check_invariants();
    }
    let we = tree.lookup("we").expect("missing leaf");
    let words = tree.lookup("words").expect("missing leaf");
    assert!(path_bits(&tree,we).len() <= path_bits(&tree,words).len());
}

#[test]
fn mirrored_updates_stay_identical() {
    let mut one = HuffTree::new();
    let mut two = HuffTree::new();
    let sighting = ["a","b","a","c","c","a","b","d","a"];
    for word in sighting {
        for tree in [&mut one,&mut two] {
            match tree.lookup(word) {
                Some(leaf) => tree.increment(leaf),
                None => tree.insert(word)
            };
        }
    }
    for word in ["a","b","c","d"] {
        let p1 = one.lookup(word).map(|ix| one.path_to(ix));
        let p2 = two.lookup(word).map(|ix| two.path_to(ix));
        assert_eq!(p1,p2,"trees diverged at {:?}",word);
    }
    assert_eq!(one.path_to(one.nyt()),two.path_to(two.nyt()));
}
