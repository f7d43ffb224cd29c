use crate::pos::Pos;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Action order. Vision scans and the Q-value slots use the same order.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    // Cycle used when the initial heading points into a wall or the body.
    fn rotated(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Up => "UP",
            Dir::Down => "DOWN",
            Dir::Left => "LEFT",
            Dir::Right => "RIGHT",
        }
    }

    /// Unrecognized names map to `None`, the "no direction" sentinel.
    pub fn from_name(s: &str) -> Option<Dir> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Some(Dir::Up),
            "DOWN" => Some(Dir::Down),
            "LEFT" => Some(Dir::Left),
            "RIGHT" => Some(Dir::Right),
            _ => None,
        }
    }
}

/// Result of one engine tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Ok,
    Collision,
    RedApple,
    GreenApple,
}

/// Board state in host-friendly shapes.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub snake: Vec<(i32, i32)>,
    pub greens: Vec<(i32, i32)>,
    pub red: (i32, i32),
    pub heading: &'static str,
    pub game_over: bool,
}

/// The grid world: a snake, two green apples that grow it and one red apple
/// that shrinks it. Walls are solid; running into them or the body ends the
/// game.
pub struct Board {
    pub grid: i32,
    /// Head at the front.
    pub snake: VecDeque<Pos>,
    pub greens: Vec<Pos>,
    pub red: Pos,
    pub heading: Dir,
    pub game_over: bool,
    rng: SmallRng,
}

impl Board {
    pub fn new(grid: i32, seed: u64) -> Self {
        let mut board = Self {
            grid,
            snake: VecDeque::new(),
            greens: Vec::new(),
            red: Pos::new(-1, -1),
            heading: Dir::Up,
            game_over: false,
            rng: SmallRng::seed_from_u64(seed),
        };
        board.reset(grid);
        board
    }

    /// Rebuild the board from scratch. Precondition: the grid is large enough
    /// that every placement loop can succeed (a 3-cell snake plus 3 apples).
    pub fn reset(&mut self, grid: i32) {
        self.grid = grid;
        self.snake.clear();
        self.greens.clear();
        self.red = Pos::new(-1, -1);
        self.game_over = false;

        // Two greens, then the red, then the snake; each draw rejects
        // everything placed so far.
        for _ in 0..2 {
            loop {
                let p = self.random_cell();
                if !self.greens.contains(&p) {
                    self.greens.push(p);
                    break;
                }
            }
        }
        loop {
            let p = self.random_cell();
            if !self.greens.contains(&p) {
                self.red = p;
                break;
            }
        }

        loop {
            let p = self.random_cell();
            if !self.greens.contains(&p) && p != self.red {
                self.snake.push_back(p);
                break;
            }
        }
        // Grow two segments by a random walk from the tail.
        for _ in 0..2 {
            let prev = *self.snake.back().unwrap();
            loop {
                let (dx, dy) = Dir::ALL[self.rng.gen_range(0..4)].delta();
                let p = prev.offset(dx, dy);
                if self.in_bounds(p)
                    && !self.snake_contains(p)
                    && !self.greens.contains(&p)
                    && p != self.red
                {
                    self.snake.push_back(p);
                    break;
                }
            }
        }

        // Face away from the neck; if that runs into a wall or the body,
        // rotate until a safe heading comes up.
        self.heading = self.neck_dir().map(Dir::opposite).unwrap_or(Dir::Up);
        let head = *self.snake.front().unwrap();
        loop {
            let (dx, dy) = self.heading.delta();
            let next = head.offset(dx, dy);
            if self.in_bounds(next) && !self.snake_contains(next) {
                break;
            }
            self.heading = self.heading.rotated();
        }
    }

    pub fn snake_contains(&self, p: Pos) -> bool {
        self.snake.iter().any(|&s| s == p)
    }

    fn in_bounds(&self, p: Pos) -> bool {
        p.x >= 0 && p.x < self.grid && p.y >= 0 && p.y < self.grid
    }

    fn random_cell(&mut self) -> Pos {
        Pos::new(
            self.rng.gen_range(0..self.grid),
            self.rng.gen_range(0..self.grid),
        )
    }

    /// Direction from the head to its second segment, `None` for a length-1
    /// snake.
    pub fn neck_dir(&self) -> Option<Dir> {
        if self.snake.len() < 2 {
            return None;
        }
        let head = self.snake[0];
        let neck = self.snake[1];
        Dir::ALL.into_iter().find(|d| {
            let (dx, dy) = d.delta();
            head.offset(dx, dy) == neck
        })
    }

    /// Advance one cell along the current heading and resolve what the head
    /// ran into. A finished board stays untouched and keeps reporting
    /// `Collision`.
    pub fn step(&mut self) -> Outcome {
        if self.game_over {
            return Outcome::Collision;
        }

        let head = *self.snake.front().unwrap();
        let (dx, dy) = self.heading.delta();
        let next = head.offset(dx, dy);

        // Wall or self
        if !self.in_bounds(next) || self.snake_contains(next) {
            self.game_over = true;
            return Outcome::Collision;
        }

        // Green apple: grow, then respawn one green somewhere free.
        if let Some(i) = self.greens.iter().position(|&g| g == next) {
            self.greens.remove(i);
            self.snake.push_front(next);
            if self.snake.len() != (self.grid * self.grid) as usize {
                loop {
                    let p = self.random_cell();
                    if !self.snake_contains(p) && !self.greens.contains(&p) && p != self.red {
                        self.greens.push(p);
                        break;
                    }
                }
            }
            return Outcome::GreenApple;
        }

        // Red apple: shrink, or end the game when there is nothing left to
        // shrink. The respawn draw runs against the not-yet-shrunk body.
        if next == self.red {
            if self.snake.len() == 1 {
                self.game_over = true;
                return Outcome::RedApple;
            }
            loop {
                let p = self.random_cell();
                if !self.snake_contains(p) && !self.greens.contains(&p) {
                    self.red = p;
                    break;
                }
            }
            self.snake.push_front(next);
            self.snake.pop_back();
            self.snake.pop_back();
            return Outcome::RedApple;
        }

        self.snake.push_front(next);
        self.snake.pop_back();
        Outcome::Ok
    }

    /// Commit a new heading unless it points straight back into the neck.
    /// Takes effect on the next `step`.
    pub fn change_heading(&mut self, dir: Dir) {
        if self.neck_dir() != Some(dir) {
            self.heading = dir;
        }
    }

    /// String boundary for hosts: unknown names are silently dropped.
    pub fn change_heading_str(&mut self, name: &str) {
        if let Some(dir) = Dir::from_name(name) {
            self.change_heading(dir);
        }
    }

    /// Scan outward from the head in Up, Right, Down, Left order. One symbol
    /// per cell ('S' body, 'G' green, 'R' red, '0' empty), 'W' terminating at
    /// the wall.
    pub fn vision(&self) -> [String; 4] {
        let head = *self.snake.front().unwrap();
        Dir::ALL.map(|d| {
            let (dx, dy) = d.delta();
            let mut scan = String::new();
            let mut p = head;
            loop {
                p = p.offset(dx, dy);
                if !self.in_bounds(p) {
                    scan.push('W');
                    break;
                }
                if self.snake_contains(p) {
                    scan.push('S');
                } else if self.greens.contains(&p) {
                    scan.push('G');
                } else if self.red == p {
                    scan.push('R');
                } else {
                    scan.push('0');
                }
            }
            scan
        })
    }

    /// The four scans laid out as a cross around the head, for terminal
    /// output.
    pub fn vision_lines(&self) -> Vec<String> {
        let [up, right, down, left] = self.vision();
        let pad = " ".repeat(left.len());
        let mut lines = Vec::new();
        for ch in up.chars().rev() {
            lines.push(format!("{pad}{ch}"));
        }
        let left_rev: String = left.chars().rev().collect();
        lines.push(format!("{left_rev}H{right}"));
        for ch in down.chars() {
            lines.push(format!("{pad}{ch}"));
        }
        lines
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            snake: self.snake.iter().map(|p| (p.x, p.y)).collect(),
            greens: self.greens.iter().map(|p| (p.x, p.y)).collect(),
            red: (self.red.x, self.red.y),
            heading: self.heading.as_str(),
            game_over: self.game_over,
        }
    }
}
