use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::data_point::DataPoint;
use crate::error::{Error, Result};

/// An ordered group of samples.  Batch boundaries only matter for gradient
/// averaging.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a, T = DataPoint> {
    items: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    pub fn new(items: &'a [T]) -> Batch<'a, T> {
        Batch { items }
    }

    pub fn items(&self) -> &'a [T] {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Splits `data` into consecutive batches of `batch_size`; the last one may
/// be shorter.
pub fn create_mini_batches<T>(data: &[T], batch_size: usize) -> Result<Vec<Batch<'_, T>>> {
    if batch_size == 0 {
        return Err(Error::Configuration("batch_size must be at least 1".into()));
    }
    Ok(data.chunks(batch_size).map(Batch::new).collect())
}

/// Shuffles `data` then splits it at `floor(len * training_split)` into
/// `(training, validation)`.
pub fn split_data<T, R: Rng + ?Sized>(mut data: Vec<T>, training_split: f64, rng: &mut R) -> Result<(Vec<T>, Vec<T>)> {
    if !(0.0..=1.0).contains(&training_split) {
        return Err(Error::Configuration(format!(
            "training_split must lie in [0, 1], got {training_split}"
        )));
    }
    data.shuffle(rng);
    let training_len = (data.len() as f64 * training_split) as usize;
    let validation = data.split_off(training_len);
    Ok((data, validation))
}

/// Fisher-Yates shuffle of whole batches (or any slice).
pub fn shuffle_batches<T, R: Rng + ?Sized>(batches: &mut [T], rng: &mut R) {
    batches.shuffle(rng);
}
