//! Backward bisimulation minimization of bottom-up tree automata.
//!
//! The core (`automaton`, `partition`, `observation`, `selector`, `refiner`)
//! implements the Högberg–Maletti–May partition-refinement algorithm and
//! never fails. The surrounding `parser` module and the `tbismin` binary
//! turn a directory of indented-text tree files into an `Automaton` and
//! report the result.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![warn(missing_docs)]

mod error;
pub use self::error::Error;

mod automaton;
pub use self::automaton::{Automaton, Node, StateId, Transition, TransitionId};

mod partition;
pub use self::partition::{BlockId, Partition};

mod observation;
pub use self::observation::{ObservationTrie, Relevance};

mod selector;
pub use self::selector::BlockSelector;

mod refiner;
pub use self::refiner::{minimize_backward, minimize_backward_with};

pub mod parser;
