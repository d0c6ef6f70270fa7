use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strata_nn::train::learning_rate_for_epoch;
use strata_nn::{
    ActivationFunction, DataPoint, EvalSplit, LearnPool, LossType, Network, NetworkConfig,
    SampleSource, Sgd, TrainConfig, Trainer,
};

/// Two well separated clusters around (-1, -1) and (1, 1).
fn separable() -> Vec<DataPoint> {
    (0..20)
        .flat_map(|i| {
            let dx = (i % 5) as f64 * 0.06 - 0.12;
            let dy = (i / 5) as f64 * 0.06 - 0.09;
            [
                DataPoint::new(vec![-1.0 + dx, -1.0 + dy], 0, 2).unwrap(),
                DataPoint::new(vec![1.0 + dy, 1.0 + dx], 1, 2).unwrap(),
            ]
        })
        .collect()
}

fn small_net() -> NetworkConfig {
    NetworkConfig::new(
        vec![2, 4, 2],
        ActivationFunction::TanH,
        ActivationFunction::Softmax,
        LossType::CrossEntropy,
    )
}

#[test]
fn separable_clusters_reach_high_training_accuracy() {
    for seed in 0..3 {
        let config = TrainConfig {
            epochs: 50,
            training_split: 1.0,
            batch_size: 2,
            learning_rate: 0.1,
            learning_rate_decay: 0.0,
            momentum: 0.0,
            regularization: 0.0,
            seed: Some(seed),
            ..TrainConfig::default()
        };
        let mut trainer = Trainer::new(config).unwrap();
        trainer.init_network(small_net()).unwrap();
        trainer.load_data(separable()).unwrap();
        trainer.train().unwrap();

        let evaluation = trainer.eval(EvalSplit::Training).unwrap();
        assert!(evaluation.accuracy() >= 95.0, "seed {seed}: {}", evaluation.accuracy_string());
        assert_eq!(trainer.history().len(), 50);
    }
}

#[test]
fn decay_schedule_recomputes_from_the_base_rate() {
    assert_relative_eq!(learning_rate_for_epoch(0.05, 0.075, 3), 0.05 / (1.0 + 0.075 * 3.0));
}

#[test]
fn trainer_steps_with_the_decayed_rate_each_epoch() {
    let data = separable();
    let initial = Network::with_rng(small_net(), &mut StdRng::seed_from_u64(5)).unwrap();
    let mut manual = Network::from_snapshot(initial.snapshot()).unwrap();

    // A single batch makes the per-epoch shuffle irrelevant.
    let config = TrainConfig {
        epochs: 3,
        batch_size: data.len(),
        learning_rate: 0.05,
        learning_rate_decay: 0.075,
        momentum: 0.0,
        regularization: 0.0,
        seed: Some(1),
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer.set_network(initial);
    trainer.load_split_data(data.clone(), Vec::new());
    trainer.train().unwrap();

    let mut pool = LearnPool::new();
    for epoch in 0..3 {
        let rate = 0.05 / (1.0 + 0.075 * epoch as f64);
        manual.learn(&data, &mut pool, &Sgd::plain(rate)).unwrap();
    }

    let trained = trainer.network().unwrap();
    for (a, b) in trained.layers().iter().zip(manual.layers()) {
        for (x, y) in a.weights().iter().zip(b.weights()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-9);
        }
        for (x, y) in a.biases().iter().zip(b.biases()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-9);
        }
    }
}

static LOADS: AtomicUsize = AtomicUsize::new(0);

/// Stands in for an on-disk sample; counts how often it is materialised.
struct CountingSource {
    inputs: Vec<f64>,
    label: usize,
}

impl SampleSource for CountingSource {
    fn label(&self) -> usize {
        self.label
    }

    fn load(&self, num_classes: usize) -> strata_nn::Result<DataPoint> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        DataPoint::new(self.inputs.clone(), self.label, num_classes)
    }
}

#[test]
fn incremental_training_loads_each_sample_once_per_epoch() {
    let sources: Vec<CountingSource> = separable()
        .into_iter()
        .map(|dp| CountingSource { inputs: dp.inputs().to_vec(), label: dp.label() })
        .collect();
    let (training, validation) = sources.split_at(30);

    let config = TrainConfig {
        epochs: 4,
        batch_size: 8,
        learning_rate: 0.1,
        seed: Some(2),
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer.init_network(small_net()).unwrap();

    LOADS.store(0, Ordering::SeqCst);
    trainer.train_incremental(training, validation).unwrap();

    assert_eq!(LOADS.load(Ordering::SeqCst), 4 * (30 + 10));
    assert_eq!(trainer.history().len(), 4);
}
