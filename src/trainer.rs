//! Episodic Q-learning over the grid world: epsilon-greedy rollouts, reward
//! shaping toward the nearest green apple, and greedy evaluation runs at the
//! end.

use crate::game::{Board, Dir, Outcome};
use crate::qtable::QTable;
use crate::vision::State;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

pub const REWARD_GREEN: f32 = 50.0;
pub const REWARD_RED: f32 = -30.0;
pub const REWARD_COLLISION: f32 = -100.0;
pub const REWARD_PROGRESS: f32 = 5.0;
pub const REWARD_STEP: f32 = -0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparams {
    pub grid: i32,
    pub alpha: f32,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    pub epsilon_decay: f32,
    pub episodes: u32,
    /// Step cap per episode; a capped episode is truncated, not terminal.
    pub max_steps: u32,
    pub eval_episodes: u32,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            grid: 10,
            alpha: 0.6,
            gamma: 0.85,
            epsilon_start: 0.9,
            epsilon_end: 0.001,
            epsilon_decay: 0.995,
            episodes: 20_000,
            max_steps: 10_000,
            eval_episodes: 5,
        }
    }
}

/// What a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub episodes: u32,
    pub best_length: usize,
    pub states_seen: usize,
    pub final_epsilon: f32,
    /// Final snake length of each greedy evaluation episode.
    pub eval_lengths: Vec<usize>,
}

/// Shaped reward for one transition.
pub fn reward(outcome: Outcome, before: &State, after: &State) -> f32 {
    match outcome {
        Outcome::Ok => {
            if after.nearest_green_dist > 0
                && after.nearest_green_dist < before.nearest_green_dist
            {
                REWARD_PROGRESS
            } else {
                REWARD_STEP
            }
        }
        Outcome::Collision => REWARD_COLLISION,
        Outcome::RedApple => REWARD_RED,
        Outcome::GreenApple => REWARD_GREEN,
    }
}

/// One-step update: Q(s,a) += alpha * (target - Q(s,a)), with target = r on
/// terminal transitions and r + gamma * max_a' Q(s',a') otherwise.
pub fn q_update(
    table: &mut QTable,
    key: u64,
    action: usize,
    r: f32,
    next_key: u64,
    done: bool,
    alpha: f32,
    gamma: f32,
) {
    let target = if done {
        r
    } else {
        r + gamma * table.max_value(next_key)
    };
    let q = table.values_mut(key);
    q[action] += alpha * (target - q[action]);
}

/// Policy RNG derived from the run seed. The board seeds directly from the
/// seed itself, so one seed fixes both streams.
pub fn policy_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15)
}

pub struct Trainer {
    pub params: Hyperparams,
    pub table: QTable,
    board: Board,
    rng: SmallRng,
    epsilon: f32,
}

impl Trainer {
    pub fn new(params: Hyperparams, seed: u64) -> Self {
        let board = Board::new(params.grid, seed);
        let epsilon = params.epsilon_start;
        Self {
            rng: policy_rng(seed),
            table: QTable::new(),
            board,
            epsilon,
            params,
        }
    }

    pub fn train(&mut self) -> TrainReport {
        let mut best_length = 0;
        for episode in 0..self.params.episodes {
            if episode % 100 == 0 {
                println!("episode {episode} / {}", self.params.episodes);
            }
            self.run_episode(self.epsilon);
            best_length = best_length.max(self.board.snake.len());
            if episode % 1000 == 0 {
                println!("  best snake length so far: {best_length}");
            }
            self.epsilon = (self.epsilon * self.params.epsilon_decay).max(self.params.epsilon_end);
        }

        let eval_lengths = self.evaluate();
        TrainReport {
            episodes: self.params.episodes,
            best_length,
            states_seen: self.table.len(),
            final_epsilon: self.epsilon,
            eval_lengths,
        }
    }

    fn run_episode(&mut self, epsilon: f32) {
        self.board.reset(self.params.grid);
        let mut state = State::from_vision(&self.board.vision());
        let mut steps = 0;
        while !self.board.game_over && steps < self.params.max_steps {
            let key = state.pack();
            let action = self.table.choose_action(key, epsilon, &mut self.rng);
            self.board.change_heading(Dir::ALL[action]);
            let outcome = self.board.step();
            let next = State::from_vision(&self.board.vision());
            let r = reward(outcome, &state, &next);
            let alpha = self.params.alpha;
            let gamma = self.params.gamma;
            q_update(
                &mut self.table,
                key,
                action,
                r,
                next.pack(),
                self.board.game_over,
                alpha,
                gamma,
            );
            state = next;
            steps += 1;
        }
    }

    /// Greedy rollouts with exploration off, reporting the final snake
    /// length of each.
    pub fn evaluate(&mut self) -> Vec<usize> {
        (0..self.params.eval_episodes)
            .map(|_| {
                self.board.reset(self.params.grid);
                let mut state = State::from_vision(&self.board.vision());
                let mut steps = 0;
                while !self.board.game_over && steps < self.params.max_steps {
                    let action = self.table.choose_action(state.pack(), 0.0, &mut self.rng);
                    self.board.change_heading(Dir::ALL[action]);
                    self.board.step();
                    state = State::from_vision(&self.board.vision());
                    steps += 1;
                }
                self.board.snake.len()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_green_dist(dist: u8) -> State {
        State {
            danger: [0; 4],
            green: [0; 4],
            red: [0; 4],
            nearest_green_dir: if dist > 0 { 1 } else { 0 },
            nearest_green_dist: dist,
        }
    }

    #[test]
    fn reward_table() {
        let far = state_with_green_dist(3);
        let near = state_with_green_dist(2);
        let none = state_with_green_dist(0);

        assert_eq!(reward(Outcome::Ok, &far, &near), REWARD_PROGRESS);
        assert_eq!(reward(Outcome::Ok, &near, &far), REWARD_STEP);
        assert_eq!(reward(Outcome::Ok, &near, &near), REWARD_STEP);
        // Losing sight of the green is not progress.
        assert_eq!(reward(Outcome::Ok, &far, &none), REWARD_STEP);
        assert_eq!(reward(Outcome::Ok, &none, &near), REWARD_STEP);
        assert_eq!(reward(Outcome::Collision, &far, &near), REWARD_COLLISION);
        assert_eq!(reward(Outcome::RedApple, &far, &near), REWARD_RED);
        assert_eq!(reward(Outcome::GreenApple, &far, &near), REWARD_GREEN);
    }

    #[test]
    fn terminal_update_ignores_the_next_state() {
        let mut table = QTable::new();
        table.values_mut(1)[2] = 10.0;
        table.values_mut(9)[0] = 1000.0;
        q_update(&mut table, 1, 2, -100.0, 9, true, 0.5, 0.85);
        assert_eq!(table.values(1)[2], -45.0);
    }

    #[test]
    fn non_terminal_update_bootstraps_from_the_next_state() {
        let mut table = QTable::new();
        table.values_mut(9)[3] = 10.0;
        q_update(&mut table, 1, 0, 2.0, 9, false, 0.5, 0.5);
        // target = 2 + 0.5 * 10 = 7; q = 0 + 0.5 * 7
        assert_eq!(table.values(1)[0], 3.5);
    }

    #[test]
    fn epsilon_decays_to_the_floor() {
        let params = Hyperparams {
            grid: 5,
            episodes: 40,
            max_steps: 50,
            epsilon_start: 0.5,
            epsilon_decay: 0.5,
            epsilon_end: 0.2,
            eval_episodes: 0,
            ..Default::default()
        };
        let mut trainer = Trainer::new(params, 3);
        let report = trainer.train();
        assert_eq!(report.final_epsilon, 0.2);
    }

    #[test]
    fn short_run_produces_a_report() {
        let params = Hyperparams {
            grid: 5,
            episodes: 30,
            max_steps: 200,
            eval_episodes: 3,
            ..Default::default()
        };
        let mut trainer = Trainer::new(params, 11);
        let report = trainer.train();
        assert_eq!(report.episodes, 30);
        assert!(report.best_length >= 1);
        assert!(report.states_seen > 0);
        assert_eq!(report.eval_lengths.len(), 3);
        for len in report.eval_lengths {
            assert!(len >= 1);
        }
    }

    #[test]
    fn same_seed_trains_identically() {
        let params = Hyperparams {
            grid: 5,
            episodes: 20,
            max_steps: 100,
            eval_episodes: 2,
            ..Default::default()
        };
        let a = Trainer::new(params.clone(), 21).train();
        let b = Trainer::new(params, 21).train();
        assert_eq!(a.best_length, b.best_length);
        assert_eq!(a.states_seen, b.states_seen);
        assert_eq!(a.eval_lengths, b.eval_lengths);
    }
}
