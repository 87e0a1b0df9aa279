pub mod draw;
pub mod movement;
pub mod squish;
pub mod visibility;
