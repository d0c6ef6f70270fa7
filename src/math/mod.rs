pub mod random;
pub mod vector;

pub use random::{init_weights, sample_standard_normal};
pub use vector::max_value_index;
