//! Quantizes the raw head vision into the compact state the agent learns
//! over: one distance bucket per symbol per direction, packed into a single
//! integer key.

use std::hash::{Hash, Hasher};

/// Distance bucket for the first occurrence of `target` in a scan string:
/// 0 absent, 1 adjacent, 2 within 2-3 cells, 3 within 4-7, 4 beyond.
pub fn bucket(scan: &str, target: char) -> u8 {
    match scan.find(target) {
        None => 0,
        Some(0) => 1,
        Some(i) if i <= 2 => 2,
        Some(i) if i <= 6 => 3,
        Some(_) => 4,
    }
}

/// Quantized sensory snapshot. Direction indices follow the action order
/// (Up, Right, Down, Left). Identity is the packed key alone;
/// `nearest_green_dist` feeds reward shaping and is not part of it.
#[derive(Clone, Copy, Debug)]
pub struct State {
    pub danger: [u8; 4],
    pub green: [u8; 4],
    pub red: [u8; 4],
    /// 0 none, 1..=4 for Up/Right/Down/Left.
    pub nearest_green_dir: u8,
    /// Bucket of the nearest green, 0 when none is in sight.
    pub nearest_green_dist: u8,
}

impl State {
    pub fn from_vision(vision: &[String; 4]) -> Self {
        let mut danger = [0u8; 4];
        let mut green = [0u8; 4];
        let mut red = [0u8; 4];
        for i in 0..4 {
            let body = bucket(&vision[i], 'S');
            let wall = bucket(&vision[i], 'W');
            danger[i] = body.min(wall);
            green[i] = bucket(&vision[i], 'G');
            red[i] = bucket(&vision[i], 'R');
        }

        // First direction that improves on the running best wins; the scan
        // does not continue to look for a strictly nearer green after that.
        let mut nearest_green_dir = 0u8;
        let mut nearest_green_dist = u8::MAX;
        for (i, &g) in green.iter().enumerate() {
            if g > 0 && g < nearest_green_dist {
                nearest_green_dist = g;
                nearest_green_dir = i as u8 + 1;
                break;
            }
        }
        if nearest_green_dir == 0 {
            nearest_green_dist = 0;
        }

        Self {
            danger,
            green,
            red,
            nearest_green_dir,
            nearest_green_dist,
        }
    }

    /// 13 fields, 4 bits each, fixed order: danger x4, green x4, red x4,
    /// nearest-green direction. 52 bits, so distinct bucket tuples can never
    /// collide.
    pub fn pack(&self) -> u64 {
        let fields = self
            .danger
            .iter()
            .chain(self.green.iter())
            .chain(self.red.iter())
            .chain(std::iter::once(&self.nearest_green_dir));
        let mut key = 0u64;
        for &v in fields {
            key = (key << 4) | u64::from(v & 0xF);
        }
        key
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.pack() == other.pack()
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pack().hash(state);
    }
}
