use std::collections::{HashMap, HashSet};

use crate::partition::{BlockId, Partition};

/// Tracks, for every P-block, which R-blocks currently partition it, and
/// exposes a smaller-half splitter.
///
/// Block-ids shift under compaction (see [`Partition::separate`]), and a
/// single `separate` call can mix a genuine split (the untouched remainder
/// keeps its old id) with a compaction-driven renumbering (an id is fully
/// superseded and its old meaning migrates elsewhere) — sometimes both in
/// the same renaming map, when more than one block empties in one call.
/// [`BlockSelector::on_r_split`] disambiguates the two using `Partition`'s
/// current block count plus the shape of the renaming map itself, rather
/// than guessing from the map alone.
#[derive(Debug)]
pub struct BlockSelector {
    p_children: HashMap<BlockId, HashSet<BlockId>>,
    r_parent: HashMap<BlockId, BlockId>,
    candidates: HashSet<BlockId>,
}

impl BlockSelector {
    /// Initializes bookkeeping for the trivial P=R={Q} starting point: one
    /// P-block (id 0) with one R-child (id 0), matching `Partition::new`.
    #[must_use]
    pub fn new(n_states: usize) -> Self {
        let mut p_children = HashMap::new();
        let mut r_parent = HashMap::new();
        if n_states > 0 {
            p_children.insert(0, HashSet::from([0]));
            r_parent.insert(0, 0);
        } else {
            p_children.insert(0, HashSet::new());
        }
        Self {
            p_children,
            r_parent,
            candidates: HashSet::new(),
        }
    }

    /// The R-blocks currently tracked as children of `p_block`.
    #[must_use]
    pub fn r_children_of(&self, p_block: BlockId) -> Option<&HashSet<BlockId>> {
        self.p_children.get(&p_block)
    }

    /// The P-block currently containing `r_block`.
    #[must_use]
    pub fn p_parent_of(&self, r_block: BlockId) -> Option<BlockId> {
        self.r_parent.get(&r_block).copied()
    }

    /// Picks any P-block with at least two R-children, paired with the
    /// smallest of its R-children by state count (ties broken by id).
    /// Returning the smaller half is what gives the algorithm its
    /// complexity bound; any other tie-break would still be correct.
    #[must_use]
    pub fn select(&self, r: &Partition) -> Option<(BlockId, BlockId)> {
        let &p_block = self.candidates.iter().next()?;
        let children = self.p_children.get(&p_block)?;
        let r_block = *children
            .iter()
            .min_by_key(|&&rb| (r.states_of(rb).len(), rb))
            .expect("a candidate always has at least two children");
        Some((p_block, r_block))
    }

    /// Called after `P.separate` has just cut `cut_r_block` out into its
    /// own new P-block. Given `select`'s contract, `cut_r_block`'s states
    /// are always a proper, non-empty subset of their P-parent's states, so
    /// this call always produces exactly one split, never a compaction.
    pub fn on_p_cut(&mut self, renaming: &HashMap<BlockId, BlockId>, cut_r_block: BlockId) {
        debug_assert_eq!(
            renaming.len(),
            1,
            "cutting P by one R-block's states is always a proper subset split"
        );
        let Some((&new_p, &old_p)) = renaming.iter().next() else {
            return;
        };

        if let Some(children) = self.p_children.get_mut(&old_p) {
            children.remove(&cut_r_block);
        }
        self.p_children.insert(new_p, HashSet::from([cut_r_block]));
        self.r_parent.insert(cut_r_block, new_p);

        self.refresh_candidate(old_p);
        self.refresh_candidate(new_p);
    }

    /// Called after `R.separate` has just produced `renaming`. Every new
    /// R-block inherits the P-parent of the id it continues the lineage
    /// of; ids fully superseded by compaction (rather than genuinely split
    /// off, with their old id still alive) have their bookkeeping migrated
    /// rather than duplicated.
    pub fn on_r_split(&mut self, r: &Partition, renaming: &HashMap<BlockId, BlockId>) {
        let keys: HashSet<BlockId> = renaming.keys().copied().collect();
        let num_blocks = r.num_blocks();

        // Snapshot what each entry means before mutating: the same id can
        // appear as both a stale "old" value and a fresh "new" key within
        // one renaming map, so removals and insertions must be computed
        // against the pre-call state, then applied removals-first.
        let mut removals: Vec<(BlockId, BlockId)> = Vec::new();
        let mut insertions: Vec<(BlockId, BlockId)> = Vec::new();

        for (&new_id, &old_id) in renaming {
            let superseded = old_id >= num_blocks || keys.contains(&old_id);
            let Some(&p_parent) = self.r_parent.get(&old_id) else {
                continue;
            };
            if superseded {
                removals.push((p_parent, old_id));
            }
            insertions.push((p_parent, new_id));
        }

        for &(p_parent, old_id) in &removals {
            self.r_parent.remove(&old_id);
            if let Some(children) = self.p_children.get_mut(&p_parent) {
                children.remove(&old_id);
            }
        }
        for &(p_parent, new_id) in &insertions {
            self.r_parent.insert(new_id, p_parent);
            self.p_children.entry(p_parent).or_default().insert(new_id);
        }

        let touched: HashSet<BlockId> = removals.iter().chain(&insertions).map(|&(p, _)| p).collect();
        for p_block in touched {
            self.refresh_candidate(p_block);
        }
    }

    fn refresh_candidate(&mut self, p_block: BlockId) {
        let count = self.p_children.get(&p_block).map_or(0, HashSet::len);
        if count >= 2 {
            self.candidates.insert(p_block);
        } else {
            self.candidates.remove(&p_block);
        }
    }
}
