mod common;
mod double_update;
mod queue;
mod state;
mod update;

pub use common::{DoubleUpdateEvent, LocalCommon};
pub use double_update::DoubleUpdate;
pub use queue::RootQueue;
pub use state::CommonState;
pub use update::{SignedUpdate, Update};
