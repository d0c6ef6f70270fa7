use crate::data::data_point::DataPoint;
use crate::error::Result;

/// A sample that is only materialised when its batch is reached.
///
/// Implemented by raw-file descriptors (image paths, record offsets, ...) so
/// incremental training never holds the whole dataset in memory.
pub trait SampleSource: Sync {
    /// Class label known without loading the sample.
    fn label(&self) -> usize;

    /// Loads the sample and encodes its target over `num_classes` classes.
    fn load(&self, num_classes: usize) -> Result<DataPoint>;
}

impl SampleSource for DataPoint {
    fn label(&self) -> usize {
        DataPoint::label(self)
    }

    fn load(&self, _num_classes: usize) -> Result<DataPoint> {
        Ok(self.clone())
    }
}

/// Loads every sample of a batch.
pub fn load_batch<S: SampleSource>(sources: &[S], num_classes: usize) -> Result<Vec<DataPoint>> {
    sources.iter().map(|source| source.load(num_classes)).collect()
}
