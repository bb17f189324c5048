pub mod actions;
pub mod activation;
pub mod chat;
pub mod config;
pub mod persistence;
pub mod providers;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod store;

pub use actions::*;
pub use activation::*;
pub use chat::*;
pub use config::*;
pub use persistence::*;
pub use providers::*;
pub use reducer::*;
pub use seed::*;
pub use state::*;
pub use store::*;
