//! Deterministic snake grid world plus a tabular Q-learning agent.
//!
//! The board ([`Board`]) runs the two-green/one-red apple rules with a
//! directional vision sensor; [`State`] quantizes that vision into a packed
//! integer key; [`QTable`] and [`Trainer`] learn an action-value function
//! over those keys with an epsilon-greedy policy. Everything is
//! single-threaded and reproducible from one seed.

pub mod game;
pub mod model;
pub mod pos;
pub mod qtable;
pub mod trainer;
pub mod vision;

pub use game::{Board, BoardSnapshot, Dir, Outcome};
pub use pos::Pos;
pub use qtable::QTable;
pub use trainer::{Hyperparams, TrainReport, Trainer};
pub use vision::State;
