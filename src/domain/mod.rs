pub mod entity;
pub mod physics;
pub mod rules;
pub mod scale;
