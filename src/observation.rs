use std::collections::{HashMap, HashSet};

use crate::automaton::{Automaton, StateId};
use crate::partition::{BlockId, Partition};

/// Which transitions feed into an [`ObservationTrie`], mirroring the three
/// rounds of the refinement loop.
pub enum Relevance<'a> {
    /// Initial round: every transition is relevant.
    All,
    /// Cut round: a transition is relevant iff at least one argument lies
    /// in `witness`.
    Cut { witness: &'a HashSet<StateId> },
    /// Refinement round: a transition is relevant iff at least one argument
    /// lies in `witness` and none lies in `exclude` — the complementary
    /// half already covered by the sibling refinement pass in the same
    /// loop iteration.
    Refine {
        witness: &'a HashSet<StateId>,
        exclude: &'a HashSet<StateId>,
    },
}

impl Relevance<'_> {
    fn accepts(&self, args: &[StateId]) -> bool {
        match self {
            Relevance::All => true,
            Relevance::Cut { witness } => args.iter().any(|a| witness.contains(a)),
            Relevance::Refine { witness, exclude } => {
                args.iter().any(|a| witness.contains(a)) && !args.iter().any(|a| exclude.contains(a))
            }
        }
    }
}

struct Node {
    children: HashMap<BlockId, usize>,
    states: HashSet<StateId>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            states: HashSet::new(),
        }
    }
}

/// A short-lived, per-round trie recording, for every relevant transition,
/// the path of its arguments' current R-blocks under its symbol.
///
/// Keyed at the root by symbol; depth equals the arity of that symbol;
/// edges at depth k are labelled by the R-block id of the k-th argument.
/// Discarded after the round that built it (arena-allocated, bulk-freed
/// with the trie itself).
///
/// # Invariants
/// * Every node along a relevant transition's path — the per-symbol root,
///   every intermediate argument-edge node, and the leaf — accumulates
///   that transition's result state, so a depth-first walk yields a
///   witness group at *every* node, not just at leaves.
pub struct ObservationTrie {
    roots: HashMap<String, usize>,
    arena: Vec<Node>,
}

impl ObservationTrie {
    /// Builds a trie from `automaton`'s transitions, filtered by
    /// `relevance`, keyed by each argument's current block in `r`.
    #[must_use]
    pub fn build(automaton: &Automaton, r: &Partition, relevance: &Relevance<'_>) -> Self {
        let mut trie = Self {
            roots: HashMap::new(),
            arena: Vec::new(),
        };

        for transition in automaton.transitions() {
            if !relevance.accepts(&transition.args) {
                continue;
            }

            let root_idx = match trie.roots.get(&transition.symbol) {
                Some(&idx) => idx,
                None => {
                    let idx = trie.push_node();
                    trie.roots.insert(transition.symbol.clone(), idx);
                    idx
                }
            };
            trie.arena[root_idx].states.insert(transition.result);

            let mut cur = root_idx;
            for &arg in &transition.args {
                let block = r.block_of(arg);
                let next = match trie.arena[cur].children.get(&block) {
                    Some(&idx) => idx,
                    None => {
                        let idx = trie.push_node();
                        trie.arena[cur].children.insert(block, idx);
                        idx
                    }
                };
                trie.arena[next].states.insert(transition.result);
                cur = next;
            }
        }

        trie
    }

    fn push_node(&mut self) -> usize {
        let idx = self.arena.len();
        self.arena.push(Node::new());
        idx
    }

    /// Walks every node of the trie depth-first — per-symbol roots down
    /// through every internal node to the leaves — and separates `r` by
    /// each node's aggregated state set, forwarding every renaming to
    /// `on_split` immediately, before visiting the next node, so callers
    /// never act on a stale block-id. `on_split` receives the
    /// already-updated partition alongside the renaming, since consumers
    /// (see [`crate::BlockSelector::on_r_split`]) need it to resolve which
    /// ids the renaming superseded.
    pub fn refine(&self, r: &mut Partition, mut on_split: impl FnMut(&Partition, &HashMap<BlockId, BlockId>)) {
        for &root in self.roots.values() {
            self.visit(root, r, &mut on_split);
        }
    }

    fn visit(&self, idx: usize, r: &mut Partition, on_split: &mut impl FnMut(&Partition, &HashMap<BlockId, BlockId>)) {
        let node = &self.arena[idx];
        if !node.states.is_empty() {
            let renames = r.separate(&node.states);
            on_split(r, &renames);
        }

        let children: Vec<usize> = node.children.values().copied().collect();
        for child in children {
            self.visit(child, r, on_split);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Node as Tree;

    fn set(states: impl IntoIterator<Item = StateId>) -> HashSet<StateId> {
        states.into_iter().collect()
    }

    #[test]
    fn all_relevance_accepts_everything() {
        assert!(Relevance::All.accepts(&[]));
        assert!(Relevance::All.accepts(&[0, 1]));
    }

    #[test]
    fn cut_relevance_requires_touching_witness() {
        let witness = set([2]);
        let relevance = Relevance::Cut { witness: &witness };
        assert!(relevance.accepts(&[1, 2]));
        assert!(!relevance.accepts(&[0, 1]));
    }

    #[test]
    fn refine_relevance_excludes_mixed_transitions() {
        let witness = set([2]);
        let exclude = set([5]);
        let relevance = Relevance::Refine {
            witness: &witness,
            exclude: &exclude,
        };
        assert!(relevance.accepts(&[2, 3]));
        assert!(!relevance.accepts(&[2, 5]));
        assert!(!relevance.accepts(&[3, 4]));
    }

    #[test]
    fn build_groups_by_symbol_then_child_blocks() {
        let mut a = Automaton::new();
        // f(a, b): leaves 0=a, 1=b, root 2=f.
        a.add_tree(&Tree::new("f", vec![Tree::leaf("a"), Tree::leaf("b")]));
        let r = Partition::new(a.num_states());

        let trie = ObservationTrie::build(&a, &r, &Relevance::All);
        assert_eq!(trie.roots.len(), 3); // "a", "b", "f" each get their own root.

        let f_root = trie.roots[&"f".to_string()];
        assert_eq!(trie.arena[f_root].states, set([2]));
        assert_eq!(trie.arena[f_root].children.len(), 1); // one path: (block(0), block(1))
    }

    #[test]
    fn refine_separates_leaves_by_symbol() {
        let mut a = Automaton::new();
        a.add_tree(&Tree::leaf("a"));
        a.add_tree(&Tree::leaf("b"));
        let mut r = Partition::new(a.num_states());

        let trie = ObservationTrie::build(&a, &r, &Relevance::All);
        let mut touched = Vec::new();
        trie.refine(&mut r, |_, renames| touched.push(renames.clone()));

        assert_eq!(r.num_blocks(), 2);
        assert_ne!(r.block_of(0), r.block_of(1));
        assert!(!touched.is_empty());
    }

    #[test]
    fn internal_nodes_are_separated_even_with_identical_subtrees() {
        let mut a = Automaton::new();
        // g(f(a)) vs g(f(b)): the f-nodes must separate even though both
        // have arity 1 and the same symbol, because their single child's
        // block differs.
        a.add_tree(&Tree::new("g", vec![Tree::new("f", vec![Tree::leaf("a")])]));
        a.add_tree(&Tree::new("g", vec![Tree::new("f", vec![Tree::leaf("b")])]));
        let mut r = Partition::new(a.num_states());

        // Round 1: separate leaves "a" vs "b".
        let trie = ObservationTrie::build(&a, &r, &Relevance::All);
        trie.refine(&mut r, |_, _| {});
        assert_eq!(r.num_blocks(), 2);

        // Round 2: rebuild against the now-refined R; the f-nodes' children
        // blocks differ, so they must separate too.
        let trie = ObservationTrie::build(&a, &r, &Relevance::All);
        trie.refine(&mut r, |_, _| {});

        let f_of_a = 1; // state ids: 0=a,1=f(a),2=g(f(a)),3=b,4=f(b),5=g(f(b))
        let f_of_b = 4;
        assert_ne!(r.block_of(f_of_a), r.block_of(f_of_b));
    }
}
