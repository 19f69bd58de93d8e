pub mod ai;
pub mod arena;
pub mod collision;
pub mod forces;
pub mod physics;
