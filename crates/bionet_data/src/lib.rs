pub mod data;

pub use data::event::*;
pub use data::neuron::*;
pub use data::region::*;
pub use data::snapshot::*;
