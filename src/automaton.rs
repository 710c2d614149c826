use std::collections::HashSet;

/// Identifier of a state. States are assigned in post-order during tree
/// ingestion and are stable for the lifetime of the [`Automaton`].
pub type StateId = usize;

/// Identifier of a transition. Stable for the lifetime of the [`Automaton`].
pub type TransitionId = usize;

/// A tree to be ingested by [`Automaton::add_tree`]. Built by the parser
/// (see [`crate::parser`]) or directly by a caller that already has a tree
/// in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// The symbol at this node. Its arity is simply `children.len()`.
    pub label: String,
    /// Children in left-to-right order; these become the transition's
    /// argument states in the same order.
    pub children: Vec<Node>,
}

impl Node {
    /// Constructs a leaf node (arity 0).
    #[must_use]
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Constructs an internal node with the given children.
    #[must_use]
    pub fn new(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// A transition `f(q_1, ..., q_r) -> q`: symbol `f` applied to argument
/// states `args`, producing result state `result`.
///
/// # Invariants
/// * `args.len()` is the arity of `symbol` at this occurrence (not globally
///   typed; the same symbol may occur with different arities).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The ranked symbol driving this transition.
    pub symbol: String,
    /// Argument (child) states, in order.
    pub args: Vec<StateId>,
    /// Result (parent) state.
    pub result: StateId,
}

impl Transition {
    /// Arity of this transition occurrence.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// Immutable, post-build bottom-up tree automaton: a flat table of
/// [`Transition`]s plus a reverse index from state to the transitions in
/// which it appears as an argument.
///
/// Built either via [`Automaton::add_tree`] (append-only, one fresh state
/// per node — always `N = total transitions`) or, for automata that share
/// result states across transitions (genuine nondeterminism, not just a
/// forest of independently-ingested trees), via
/// [`Automaton::from_transitions`]. Read-only from then on.
pub struct Automaton {
    num_states: usize,
    transitions: Vec<Transition>,
    /// `transitions_with_arg[s]` = transition indices in which `s` appears
    /// anywhere among the argument states (never as the result state; see
    /// `DESIGN.md` for why the reverse index is arguments-only).
    transitions_with_arg: Vec<HashSet<TransitionId>>,
}

impl Automaton {
    /// Constructs an empty automaton.
    #[must_use]
    pub fn new() -> Self {
        Self {
            num_states: 0,
            transitions: Vec::new(),
            transitions_with_arg: Vec::new(),
        }
    }

    /// Total number of states `N`. States occupy `[0, num_states())`.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    fn fresh_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.transitions_with_arg.push(HashSet::new());
        id
    }

    /// Ingests `tree`, emitting one state per node in post-order and one
    /// transition per node (symbol = node label, args = child states in
    /// order, result = the node's own freshly assigned state). Returns the
    /// root's state.
    pub fn add_tree(&mut self, tree: &Node) -> StateId {
        let args: Vec<StateId> = tree.children.iter().map(|child| self.add_tree(child)).collect();

        // Reserve the result state's id up front so transitions stays
        // indexed in lockstep with transitions_with_arg, and so the
        // transition we push already knows its own result id.
        let result = self.fresh_state();
        let transition_id = self.transitions.len();

        for &arg in &args {
            self.transitions_with_arg[arg].insert(transition_id);
        }

        self.transitions.push(Transition {
            symbol: tree.label.clone(),
            args,
            result,
        });

        result
    }

    /// Builds an automaton directly from a flat transition table, for
    /// automata not expressible as a forest of independently-ingested
    /// trees — in particular, several transitions sharing one result
    /// state. `num_states` must exceed every state id that appears in
    /// `transitions`, whether as an argument or as a result.
    #[must_use]
    pub fn from_transitions(num_states: usize, transitions: Vec<Transition>) -> Self {
        let mut transitions_with_arg = vec![HashSet::new(); num_states];
        for (transition_id, transition) in transitions.iter().enumerate() {
            for &arg in &transition.args {
                transitions_with_arg[arg].insert(transition_id);
            }
        }
        Self {
            num_states,
            transitions,
            transitions_with_arg,
        }
    }

    /// Ordered access to transitions by index.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the set of transition indices in which `state` appears as an
    /// argument (never as a result).
    #[must_use]
    pub fn transitions_with_arg(&self, state: StateId) -> &HashSet<TransitionId> {
        &self.transitions_with_arg[state]
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}
