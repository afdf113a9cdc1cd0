pub mod bots;
mod buffs;
mod bullets;
mod enemies;
mod explosions;
mod player;
mod session;
mod sim;
mod timer;

// Re-export key types for easier imports
pub use buffs::Buffs;
pub use bullets::Bullets;
pub use enemies::Enemies;
pub use explosions::Explosions;
pub use player::{Player, PlayerInput};
pub use session::Session;
pub use sim::Simulation;
pub use timer::Timer;
