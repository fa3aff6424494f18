mod core;
mod errors;
mod utils;

pub use crate::core::{
    CommonState, DoubleUpdate, DoubleUpdateEvent, LocalCommon, RootQueue, SignedUpdate, Update,
};
pub use errors::*;
pub use utils::*;
