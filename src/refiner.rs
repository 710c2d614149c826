use log::debug;

use crate::automaton::Automaton;
use crate::observation::{ObservationTrie, Relevance};
use crate::partition::Partition;
use crate::selector::BlockSelector;

/// Runs backward bisimulation minimization to completion and returns the
/// coarsest partition (P = R at the fixpoint). Per-iteration diagnostics
/// are logged at `debug!`/`trace!`; use [`minimize_backward_with`] to
/// observe them programmatically instead.
#[must_use]
pub fn minimize_backward(automaton: &Automaton) -> Partition {
    minimize_backward_with(automaton, |_, _, _| {})
}

/// Runs backward bisimulation minimization, invoking `on_iteration(i, &P,
/// &R)` once after the initial round (`i == 0`) and once after every
/// subsequent loop iteration. The core never fails: an empty automaton
/// terminates immediately with one trivial block.
pub fn minimize_backward_with(
    automaton: &Automaton,
    mut on_iteration: impl FnMut(usize, &Partition, &Partition),
) -> Partition {
    let n = automaton.num_states();
    let mut p = Partition::new(n);
    let mut r = Partition::new(n);
    let mut selector = BlockSelector::new(n);

    let initial_trie = ObservationTrie::build(automaton, &r, &Relevance::All);
    initial_trie.refine(&mut r, |r, renaming| selector.on_r_split(r, renaming));
    debug!("init: |P|={} |R|={}", p.num_blocks(), r.num_blocks());
    on_iteration(0, &p, &r);

    let mut iteration = 0;
    while let Some((s, b)) = selector.select(&r) {
        iteration += 1;

        // Cut P by B: B's states are always a proper, non-empty subset of
        // S's, so this never triggers compaction (see BlockSelector::on_p_cut).
        let b_states = r.states_of(b).clone();
        let p_renaming = p.separate(&b_states);
        selector.on_p_cut(&p_renaming, b);

        // S's old id now holds exactly S\B; B itself is unchanged.
        let s_minus_b = p.states_of(s).clone();

        debug!(
            "iteration {iteration}: splitting P-block {s} on R-block {b} ({} states); |P|={} |R|={}",
            b_states.len(),
            p.num_blocks(),
            r.num_blocks()
        );

        // Refine R by B: every transition touching B is relevant here, with
        // no exclusion — the exclusion only applies to the S\B pass below.
        let by_b = ObservationTrie::build(automaton, &r, &Relevance::Cut { witness: &b_states });
        by_b.refine(&mut r, |r, renaming| selector.on_r_split(r, renaming));

        // Refine R by S\B, excluding transitions that also touch B.
        let by_not_b = ObservationTrie::build(
            automaton,
            &r,
            &Relevance::Refine {
                witness: &s_minus_b,
                exclude: &b_states,
            },
        );
        by_not_b.refine(&mut r, |r, renaming| selector.on_r_split(r, renaming));

        debug!("iteration {iteration} done: |P|={} |R|={}", p.num_blocks(), r.num_blocks());
        on_iteration(iteration, &p, &r);
    }

    debug_assert_eq!(p.num_blocks(), r.num_blocks(), "fixpoint requires |P| = |R|");
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Node as Tree;

    fn blocks_as_sets(partition: &Partition) -> Vec<std::collections::HashSet<usize>> {
        (0..partition.num_blocks()).map(|b| partition.states_of(b).clone()).collect()
    }

    fn assert_same_partition(got: &Partition, expected: &[&[usize]]) {
        let mut got_sets = blocks_as_sets(got);
        got_sets.sort_by_key(|s| s.iter().min().copied().unwrap_or(0));
        let mut want_sets: Vec<std::collections::HashSet<usize>> =
            expected.iter().map(|s| s.iter().copied().collect()).collect();
        want_sets.sort_by_key(|s| s.iter().min().copied().unwrap_or(0));
        assert_eq!(got_sets, want_sets);
    }

    #[test]
    fn empty_automaton_terminates_trivially() {
        let a = Automaton::new();
        let p = minimize_backward(&a);
        assert_eq!(p.num_blocks(), 1);
    }

    #[test]
    fn single_leaf_one_block() {
        let mut a = Automaton::new();
        a.add_tree(&Tree::leaf("a"));
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0]]);
    }

    #[test]
    fn two_identical_leaves_merge_but_root_stays_alone() {
        let mut a = Automaton::new();
        a.add_tree(&Tree::new("f", vec![Tree::leaf("a"), Tree::leaf("a")]));
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0, 1], &[2]]);
    }

    #[test]
    fn distinguishable_leaves_stay_singletons() {
        let mut a = Automaton::new();
        a.add_tree(&Tree::new("f", vec![Tree::leaf("a"), Tree::leaf("b")]));
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0], &[1], &[2]]);
    }

    #[test]
    fn two_trees_sharing_structure_merge_across_trees() {
        let mut a = Automaton::new();
        a.add_tree(&Tree::new("f", vec![Tree::leaf("a")]));
        a.add_tree(&Tree::new("f", vec![Tree::leaf("a")]));
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0, 2], &[1, 3]]);
    }

    #[test]
    fn context_sensitive_distinction_yields_all_singletons() {
        let mut a = Automaton::new();
        // g(f(a)): 0=a,1=f(a),2=g(f(a))
        a.add_tree(&Tree::new("g", vec![Tree::new("f", vec![Tree::leaf("a")])]));
        // g(f(b)): 3=b,4=f(b),5=g(f(b))
        a.add_tree(&Tree::new("g", vec![Tree::new("f", vec![Tree::leaf("b")])]));
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0], &[1], &[2], &[3], &[4], &[5]]);
    }

    #[test]
    fn forced_merging_by_shared_contexts_still_separates_leaves() {
        use crate::automaton::Transition;

        // a()->0, b()->1, f(0)->2, f(1)->2: both leaves lead to the same
        // result under f, but backward bisimulation must still separate
        // them since they're reached by different leaf symbols.
        let a = Automaton::from_transitions(
            3,
            vec![
                Transition {
                    symbol: "a".into(),
                    args: vec![],
                    result: 0,
                },
                Transition {
                    symbol: "b".into(),
                    args: vec![],
                    result: 1,
                },
                Transition {
                    symbol: "f".into(),
                    args: vec![0],
                    result: 2,
                },
                Transition {
                    symbol: "f".into(),
                    args: vec![1],
                    result: 2,
                },
            ],
        );
        let p = minimize_backward(&a);
        assert_same_partition(&p, &[&[0], &[1], &[2]]);
    }
}
