use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const MIN_FRUIT_COUNT: u8 = 1;
pub const MAX_FRUIT_COUNT: u8 = 5;
pub const FRUIT_KINDS: usize = 4;

/// Kind of fruit printed on a card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FruitType {
    Strawberry,
    Banana,
    Lime,
    Plum,
}

impl FruitType {
    pub const ALL: [FruitType; FRUIT_KINDS] = [
        FruitType::Strawberry,
        FruitType::Banana,
        FruitType::Lime,
        FruitType::Plum,
    ];

    /// Stable bucket index used when tallying the board.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            FruitType::Strawberry => 0,
            FruitType::Banana => 1,
            FruitType::Lime => 2,
            FruitType::Plum => 3,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FruitType::Strawberry => "🍓",
            FruitType::Banana => "🍌",
            FruitType::Lime => "🍏",
            FruitType::Plum => "🍇",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FruitType::Strawberry => "strawberry",
            FruitType::Banana => "banana",
            FruitType::Lime => "lime",
            FruitType::Plum => "plum",
        }
    }
}

impl fmt::Display for FruitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque per-card identifier. Issued by a [`CardGenerator`] and never reused by it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CardId(u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// A face-up card: one fruit kind shown `count` times.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub fruit: FruitType,
    pub count: u8,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.fruit.icon(), self.count)
    }
}

/// Produces fresh cards with uniformly drawn fruit and count.
///
/// A scripted queue of faces can be loaded up front; those faces are dealt first
/// (still with fresh ids) before falling back to the RNG.
pub struct CardGenerator {
    rng: StdRng,
    next_id: u64,
    script: VecDeque<(FruitType, u8)>,
}

impl CardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
            script: VecDeque::new(),
        }
    }

    /// Queues `faces` to be dealt before random generation. Counts must be 1..=5.
    pub fn with_script(
        mut self,
        faces: impl IntoIterator<Item = (FruitType, u8)>,
    ) -> Result<Self, GameError> {
        for (fruit, count) in faces {
            if !(MIN_FRUIT_COUNT..=MAX_FRUIT_COUNT).contains(&count) {
                return Err(GameError::InvalidConfiguration(
                    "scripted card counts must be between 1 and 5",
                ));
            }
            self.script.push_back((fruit, count));
        }
        Ok(self)
    }

    /// Number of scripted faces that have not been dealt yet.
    pub fn scripted_remaining(&self) -> usize {
        self.script.len()
    }

    pub fn generate(&mut self) -> Card {
        let (fruit, count) = match self.script.pop_front() {
            Some(face) => face,
            None => self.random_face(),
        };
        let id = CardId(self.next_id);
        self.next_id += 1;
        Card { id, fruit, count }
    }

    fn random_face(&mut self) -> (FruitType, u8) {
        let fruit = *FruitType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&FruitType::Strawberry);
        let count = self.rng.gen_range(MIN_FRUIT_COUNT..=MAX_FRUIT_COUNT);
        (fruit, count)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut generator = CardGenerator::new(7);
        let ids: HashSet<CardId> = (0..500).map(|_| generator.generate().id).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn scripted_faces_come_first() {
        let mut generator = CardGenerator::new(1)
            .with_script([(FruitType::Plum, 3), (FruitType::Lime, 1)])
            .expect("valid faces");
        let first = generator.generate();
        let second = generator.generate();
        assert_eq!((first.fruit, first.count), (FruitType::Plum, 3));
        assert_eq!((second.fruit, second.count), (FruitType::Lime, 1));
        assert_eq!(generator.scripted_remaining(), 0);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn scripted_counts_outside_one_to_five_are_rejected() {
        for count in [0, 6, 9] {
            let result = CardGenerator::new(0).with_script([(FruitType::Lime, count)]);
            assert!(matches!(result, Err(GameError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn every_face_eventually_appears() {
        let mut generator = CardGenerator::new(42);
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            let card = generator.generate();
            seen.insert((card.fruit, card.count));
        }
        assert_eq!(seen.len(), FRUIT_KINDS * MAX_FRUIT_COUNT as usize);
    }

    proptest! {
        #[test]
        fn counts_stay_within_range(seed in any::<u64>()) {
            let mut generator = CardGenerator::new(seed);
            for _ in 0..64 {
                let card = generator.generate();
                prop_assert!((MIN_FRUIT_COUNT..=MAX_FRUIT_COUNT).contains(&card.count));
            }
        }
    }
}
