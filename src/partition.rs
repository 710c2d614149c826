use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::automaton::StateId;

/// Identifier of a block (equivalence class). Block-ids always form a
/// contiguous range `[0, num_blocks())` — see `Partition`'s compaction
/// invariant.
pub type BlockId = usize;

/// A mutable equivalence relation over `[0, n)` states.
///
/// # Invariants
/// * I1: every state belongs to exactly one block.
/// * I3: the union of all blocks is exactly `[0, n)`.
/// * I4: block-ids form the contiguous range `[0, num_blocks())`. When a
///   block empties out, the highest-numbered block is renumbered into the
///   vacated slot so the range stays contiguous; see [`Partition::separate`].
#[derive(Clone, Debug)]
pub struct Partition {
    block_of: Vec<BlockId>,
    states_of: Vec<HashSet<StateId>>,
}

impl Partition {
    /// Constructs the trivial partition over `n` states: one block
    /// containing everything (or, for `n == 0`, one empty block — an empty
    /// automaton still yields a single trivial block).
    #[must_use]
    pub fn new(n_states: usize) -> Self {
        Self {
            block_of: vec![0; n_states],
            states_of: vec![(0..n_states).collect()],
        }
    }

    /// The block containing `state`.
    #[must_use]
    pub fn block_of(&self, state: StateId) -> BlockId {
        self.block_of[state]
    }

    /// The states in `block`.
    #[must_use]
    pub fn states_of(&self, block: BlockId) -> &HashSet<StateId> {
        &self.states_of[block]
    }

    /// Number of blocks currently in this partition.
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.states_of.len()
    }

    /// For every state `w` in `witnesses`, removes it from its current
    /// block and places it in a fresh block shared with the other witnesses
    /// from the same source block — i.e. every touched block `B` becomes
    /// `(B ∩ witnesses, B ∖ witnesses)`. When `B ∖ witnesses` is empty the
    /// "split" is really just a renaming: the source empties and is
    /// compacted away so block-ids stay contiguous (I4).
    ///
    /// Returns the renumbering this call performed, as a map from a
    /// resulting block-id to the id it continues the lineage of: either the
    /// source block a fresh split-off block was carved out of, or (when
    /// compaction relocates a block to fill a vacated slot) the id that
    /// block used to have. Blocks untouched by this call — neither split
    /// nor renumbered — have no entry. Callers (see [`crate::BlockSelector`])
    /// must apply this map to any block-id they cache, since it is the only
    /// record of ids that moved.
    pub fn separate(&mut self, witnesses: &HashSet<StateId>) -> HashMap<BlockId, BlockId> {
        let by_source: HashMap<BlockId, Vec<StateId>> =
            witnesses.iter().copied().into_group_map_by(|&w| self.block_of(w));

        let mut renames: HashMap<BlockId, BlockId> = HashMap::new();
        let mut emptied: Vec<BlockId> = Vec::new();

        for (source, members) in by_source {
            let new_id = self.states_of.len();
            self.states_of.push(HashSet::new());
            for &w in &members {
                self.states_of[source].remove(&w);
                self.states_of[new_id].insert(w);
                self.block_of[w] = new_id;
            }
            renames.insert(new_id, source);

            if self.states_of[source].is_empty() {
                emptied.push(source);
            }
        }

        // Compact highest-index vacancies first so each compaction's notion
        // of "the current last block" is never one we've already relocated.
        emptied.sort_unstable_by(|a, b| b.cmp(a));
        for empty_slot in emptied {
            self.compact(empty_slot, &mut renames);
        }

        renames
    }

    /// Relocates the highest-numbered block into the vacated `empty_slot`,
    /// keeping block-ids contiguous (I4), and folds the renumbering into
    /// `renames` so it carries the relocated block's lineage forward.
    fn compact(&mut self, empty_slot: BlockId, renames: &mut HashMap<BlockId, BlockId>) {
        debug_assert!(self.states_of[empty_slot].is_empty());

        let last = self.states_of.len() - 1;
        if last == empty_slot {
            self.states_of.pop();
            return;
        }

        let relocated = self.states_of.pop().expect("just checked last != empty_slot");
        for &s in &relocated {
            self.block_of[s] = empty_slot;
        }
        self.states_of[empty_slot] = relocated;

        match renames.remove(&last) {
            // `last` was itself freshly split off in this call: keep its
            // lineage (parent = whatever source it split from), just under
            // its new id.
            Some(parent) => {
                renames.insert(empty_slot, parent);
            }
            // `last` was untouched before this relocation: its former id
            // *is* its lineage.
            None => {
                renames.insert(empty_slot, last);
            }
        }
    }
}
