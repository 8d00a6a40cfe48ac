//! Heist Tactics - tactical AI and rules advisor for the Heist City skirmish game

pub mod advisor;
pub mod ai;
pub mod core;
pub mod data;
pub mod game;
pub mod spatial;
