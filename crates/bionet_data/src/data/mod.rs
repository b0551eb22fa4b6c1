//! Core data structures for the bionet simulation.

pub mod event;
pub mod neuron;
pub mod region;
pub mod snapshot;
