mod controller;
mod handles;
mod session;
#[cfg(test)]
pub mod test_engine;

pub use controller::ChainController;
pub use session::{ChainSettings, Phase};
