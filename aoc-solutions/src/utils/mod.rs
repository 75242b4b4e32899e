//! Reusable building blocks shared by puzzle solutions

pub mod pulse_network;
