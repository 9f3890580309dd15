use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::Level;

pub const BASE_TARGET: u8 = 5;
/// Extra targets unlocked every ten levels, in unlock order.
pub const EXTRA_TARGET_POOL: [u8; 5] = [6, 4, 7, 3, 8];

/// Winning fruit totals for a level, ascending and without duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets(Vec<u8>);

impl Targets {
    pub fn contains(&self, total: u8) -> bool {
        self.0.binary_search(&total).is_ok()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins the targets with a custom separator, e.g. `"4 or 5 or 6"`.
    pub fn join(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(", "))
    }
}

pub fn targets_for_level(level: Level) -> Targets {
    let extra = ((level.get() - 1) / 10) as usize;
    let mut values = Vec::with_capacity(1 + EXTRA_TARGET_POOL.len());
    values.push(BASE_TARGET);
    values.extend(EXTRA_TARGET_POOL.iter().take(extra));
    values.sort_unstable();
    Targets(values)
}
