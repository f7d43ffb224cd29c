//! Flat-text model summary on disk. Only the run configuration and the
//! table size are written; the learned Q-values themselves are not
//! persisted.
//!
//! ```text
//! grid 10
//! alpha 0.6 gamma 0.85 epsilon 0.001
//! qsize 1234
//! ```

use anyhow::{Context, Result, anyhow, ensure};
use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub grid: i32,
    pub alpha: f32,
    pub gamma: f32,
    pub epsilon: f32,
    pub qsize: usize,
}

pub fn save_model(path: &Path, model: &ModelSummary) -> Result<()> {
    let text = format!(
        "grid {}\nalpha {} gamma {} epsilon {}\nqsize {}\n",
        model.grid, model.alpha, model.gamma, model.epsilon, model.qsize
    );
    fs::write(path, text).with_context(|| format!("cannot open {}", path.display()))
}

pub fn load_model(path: &Path) -> Result<ModelSummary> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut tokens = text.split_whitespace();
    Ok(ModelSummary {
        grid: field(&mut tokens, "grid")?,
        alpha: field(&mut tokens, "alpha")?,
        gamma: field(&mut tokens, "gamma")?,
        epsilon: field(&mut tokens, "epsilon")?,
        qsize: field(&mut tokens, "qsize")?,
    })
}

fn field<T: FromStr>(tokens: &mut SplitWhitespace, name: &str) -> Result<T> {
    ensure!(
        tokens.next() == Some(name),
        "malformed model file: expected \"{name}\""
    );
    tokens
        .next()
        .ok_or_else(|| anyhow!("truncated model file after \"{name}\""))?
        .parse()
        .map_err(|_| anyhow!("bad value for \"{name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ModelSummary {
        ModelSummary {
            grid: 10,
            alpha: 0.6,
            gamma: 0.85,
            epsilon: 0.001,
            qsize: 4321,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = std::env::temp_dir().join("slither-model-roundtrip.txt");
        save_model(&path, &summary()).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, summary());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("slither-model-does-not-exist.txt");
        assert!(load_model(&path).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("slither-model-malformed.txt");
        std::fs::write(&path, "grid ten\n").unwrap();
        assert!(load_model(&path).is_err());
        std::fs::write(&path, "size 10\n").unwrap();
        assert!(load_model(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
