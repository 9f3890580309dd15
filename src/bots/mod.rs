pub mod random;
pub mod reflex;
pub mod registry;

pub use random::RandomBot;
pub use reflex::ReflexBot;
pub use registry::{create_bot_from_spec, label_for_spec};
