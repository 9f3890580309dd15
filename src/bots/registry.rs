use std::error::Error;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::Bot;
use crate::bots::{RandomBot, ReflexBot};

/// Returns a normalized label for a bot spec (the head token before any ':').
pub fn label_for_spec(spec: &str) -> String {
    spec.split(':')
        .next()
        .unwrap_or(spec)
        .trim()
        .to_ascii_lowercase()
}

/// Create a bot instance from a CLI-style spec.
/// Supported specs:
/// - reflex
/// - random[:ring_probability]
pub fn create_bot_from_spec(spec: &str, seed: u64) -> Result<Box<dyn Bot>, Box<dyn Error>> {
    match label_for_spec(spec).as_str() {
        "reflex" => Ok(Box::new(ReflexBot)),
        "random" => {
            let rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9);
            let bot = match spec.split_once(':') {
                Some((_, value)) => {
                    let probability = value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| format!("invalid ring probability: {value}"))?;
                    RandomBot::with_ring_probability(rng, probability)
                }
                None => RandomBot::new(rng),
            };
            Ok(Box::new(bot))
        }
        _ => Err(format!("unrecognized bot spec: {spec}").into()),
    }
}
