pub mod batch;
pub mod data_point;
pub mod source;

pub use batch::{create_mini_batches, shuffle_batches, split_data, Batch};
pub use data_point::{to_data_points, DataPoint};
pub use source::{load_batch, SampleSource};
