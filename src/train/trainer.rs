use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::data::batch::{create_mini_batches, shuffle_batches, split_data, Batch};
use crate::data::data_point::DataPoint;
use crate::data::source::{load_batch, SampleSource};
use crate::error::{Error, Result};
use crate::eval::evaluation::{evaluate, evaluate_sources, format_class_probabilities, EvaluationData};
use crate::layers::learn_data::LearnPool;
use crate::network::config::NetworkConfig;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::history::History;
use crate::train::progress::display_progress;
use crate::train::schedule::learning_rate_for_epoch;
use crate::train::train_config::TrainConfig;

/// Called after every epoch with `(epoch_index, evaluation, epoch_loss)`.
pub type EpochCallback = Box<dyn FnMut(usize, &EvaluationData, f64) + Send>;

/// Lifecycle of a `Trainer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// Network or training data still missing.
    Uninitialized,
    /// Network and data bound, no epoch run yet.
    Configured,
    /// An epoch is in progress.
    Training,
    /// Between two epochs.
    Idle,
    /// The configured number of epochs completed.
    Done,
}

/// Which bound split to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalSplit {
    Training,
    Validation,
}

/// Owns a network, its data splits and the epoch / mini-batch loop.
pub struct Trainer {
    config: TrainConfig,
    network: Option<Network>,
    history: History,
    training_data: Arc<Vec<DataPoint>>,
    validation_data: Arc<Vec<DataPoint>>,
    learn_pool: LearnPool,
    thread_pool: Option<ThreadPool>,
    rng: StdRng,
    state: TrainerState,
    on_epoch_complete: Option<EpochCallback>,
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("network", &self.network.as_ref().map(|n| &n.config().layer_sizes))
            .field("training_samples", &self.training_data.len())
            .field("validation_samples", &self.validation_data.len())
            .field("epochs_recorded", &self.history.len())
            .finish()
    }
}

/// Runs `f` inside the dedicated pool when one is configured.
fn run_in<R: Send>(pool: &Option<ThreadPool>, f: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Trainer> {
        config.validate()?;
        let thread_pool = match config.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Configuration(format!("cannot build thread pool: {e}")))?,
            ),
            None => None,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Trainer {
            config,
            network: None,
            history: History::new(),
            training_data: Arc::new(Vec::new()),
            validation_data: Arc::new(Vec::new()),
            learn_pool: LearnPool::new(),
            thread_pool,
            rng,
            state: TrainerState::Uninitialized,
            on_epoch_complete: None,
        })
    }

    /// Registers the per-epoch completion callback.
    pub fn on_epoch_complete<F>(&mut self, callback: F)
    where
        F: FnMut(usize, &EvaluationData, f64) + Send + 'static,
    {
        self.on_epoch_complete = Some(Box::new(callback));
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn training_data(&self) -> &[DataPoint] {
        &self.training_data
    }

    pub fn validation_data(&self) -> &[DataPoint] {
        &self.validation_data
    }

    fn network_ref(&self) -> Result<&Network> {
        self.network.as_ref()
            .ok_or_else(|| Error::Configuration("trainer has no network; call init_network first".into()))
    }

    fn refresh_state(&mut self) {
        self.state = if self.network.is_some() && !self.training_data.is_empty() {
            TrainerState::Configured
        } else {
            TrainerState::Uninitialized
        };
    }

    /// Builds a fresh randomly initialised network (seeded by `config.seed`).
    pub fn init_network(&mut self, config: NetworkConfig) -> Result<()> {
        let network = Network::with_rng(config, &mut self.rng)?;
        info!(layer_sizes = ?network.config().layer_sizes, "initialised network");
        self.set_network(network);
        Ok(())
    }

    /// Replaces the network; the scratch pool is rebuilt on the next batch.
    pub fn set_network(&mut self, network: Network) {
        self.network = Some(network);
        self.learn_pool.clear();
        self.refresh_state();
    }

    /// Shuffles `data` and splits it by `config.training_split`.
    pub fn load_data(&mut self, data: Vec<DataPoint>) -> Result<()> {
        let (training, validation) = split_data(data, self.config.training_split, &mut self.rng)?;
        self.load_split_data(training, validation);
        Ok(())
    }

    /// Binds already split training and validation data.
    pub fn load_split_data(&mut self, training: Vec<DataPoint>, validation: Vec<DataPoint>) {
        info!(training = training.len(), validation = validation.len(), "loading data");
        self.training_data = Arc::new(training);
        self.validation_data = Arc::new(validation);
        self.refresh_state();
    }

    /// Runs `config.epochs` epochs over the bound in-memory data.
    pub fn train(&mut self) -> Result<()> {
        self.network_ref()?;
        if self.training_data.is_empty() {
            return Err(Error::Configuration("no training data loaded".into()));
        }
        let training = Arc::clone(&self.training_data);
        let evaluation_set = if self.validation_data.is_empty() {
            warn!("validation split is empty; evaluating on training data");
            Arc::clone(&self.training_data)
        } else {
            Arc::clone(&self.validation_data)
        };
        let network = self.network_ref()?;
        training.iter()
            .chain(evaluation_set.iter())
            .try_for_each(|data_point| network.check_sample(data_point))?;

        let batches = create_mini_batches(training.as_slice(), self.config.batch_size)?;
        info!(samples = training.len(), batches = batches.len(), "started training");
        self.run_epochs(
            batches,
            |batch| Ok(Cow::Borrowed(batch.items())),
            |network| evaluate(network, &evaluation_set),
        )
    }

    /// Trains on lazily loaded samples: each batch is materialised only when
    /// it is reached and dropped afterwards.
    pub fn train_incremental<S: SampleSource>(&mut self, training: &[S], validation: &[S]) -> Result<()> {
        let num_classes = self.network_ref()?.output_size();
        if training.is_empty() {
            return Err(Error::Configuration("no training samples given".into()));
        }
        let evaluation_set = if validation.is_empty() {
            warn!("validation split is empty; evaluating on training samples");
            training
        } else {
            validation
        };
        if self.state == TrainerState::Uninitialized {
            self.state = TrainerState::Configured;
        }

        let batches = create_mini_batches(training, self.config.batch_size)?;
        info!(samples = training.len(), batches = batches.len(), "started incremental training");
        self.run_epochs(
            batches,
            |batch| Ok(Cow::Owned(load_batch(batch.items(), num_classes)?)),
            |network| evaluate_sources(network, evaluation_set),
        )
    }

    /// Runs the epoch loop; an aborted run leaves the trainer `Idle` (or
    /// `Configured` when no epoch completed) instead of `Training`.
    fn run_epochs<'d, T, L, E>(&mut self, batches: Vec<Batch<'d, T>>, load: L, evaluate_epoch: E) -> Result<()>
    where
        L: Fn(&Batch<'d, T>) -> Result<Cow<'d, [DataPoint]>>,
        E: Fn(&Network) -> Result<EvaluationData> + Send + Sync,
    {
        let completed = self.history.len();
        let result = self.epoch_loop(batches, load, evaluate_epoch);
        if let Err(err) = &result {
            self.state = if self.history.len() > completed {
                TrainerState::Idle
            } else {
                TrainerState::Configured
            };
            warn!(error = %err, "training aborted");
        }
        result
    }

    fn epoch_loop<'d, T, L, E>(&mut self, mut batches: Vec<Batch<'d, T>>, load: L, evaluate_epoch: E) -> Result<()>
    where
        L: Fn(&Batch<'d, T>) -> Result<Cow<'d, [DataPoint]>>,
        E: Fn(&Network) -> Result<EvaluationData> + Send + Sync,
    {
        let network = self.network.as_mut()
            .ok_or_else(|| Error::Configuration("trainer has no network".into()))?;
        let base = Sgd::new(self.config.learning_rate, self.config.regularization, self.config.momentum);
        let total_batches = batches.len();

        for epoch in 0..self.config.epochs {
            self.state = TrainerState::Training;
            if epoch > 0 {
                shuffle_batches(&mut batches, &mut self.rng);
            }
            let rate = learning_rate_for_epoch(self.config.learning_rate, self.config.learning_rate_decay, epoch);
            let optimizer = base.with_learning_rate(rate);

            let mut epoch_loss = 0.0;
            for (i, batch) in batches.iter().enumerate() {
                if self.config.show_progress {
                    display_progress(i, total_batches);
                }
                let data = load(batch)?;
                let learn_pool = &mut self.learn_pool;
                let batch_loss = run_in(&self.thread_pool, || {
                    network.learn(&data, learn_pool, &optimizer)?;
                    network.total_loss(&data)
                })?;
                epoch_loss += batch_loss;
            }
            epoch_loss /= total_batches.max(1) as f64;

            let network_view: &Network = network;
            let evaluation = run_in(&self.thread_pool, || evaluate_epoch(network_view))?;
            self.history.push(epoch_loss, evaluation.accuracy());
            info!(
                epoch,
                loss = epoch_loss,
                accuracy = evaluation.accuracy(),
                learning_rate = rate,
                "epoch complete"
            );
            if let Some(callback) = self.on_epoch_complete.as_mut() {
                callback(epoch, &evaluation, epoch_loss);
            }
            self.state = TrainerState::Idle;
        }

        self.state = TrainerState::Done;
        debug!(epochs = self.history.len(), "training finished");
        Ok(())
    }

    /// Evaluates the network on one of the bound splits.
    pub fn eval(&self, split: EvalSplit) -> Result<EvaluationData> {
        let data = match split {
            EvalSplit::Training => &self.training_data,
            EvalSplit::Validation => &self.validation_data,
        };
        self.evaluate(data)
    }

    pub fn evaluate(&self, data: &[DataPoint]) -> Result<EvaluationData> {
        let network = self.network_ref()?;
        run_in(&self.thread_pool, || evaluate(network, data))
    }

    /// Raw network outputs for `inputs`.
    pub fn classify(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.network_ref()?.predict(inputs)
    }

    /// Logs per-class percentages for one sample and returns the predicted class.
    pub fn predict_single(&self, data_point: &DataPoint) -> Result<usize> {
        let (predicted, outputs) = self.network_ref()?.classify(data_point.inputs())?;
        for line in format_class_probabilities(&outputs).lines() {
            info!("{line}");
        }
        Ok(predicted)
    }

    pub fn save_network(&self, path: &str) -> Result<()> {
        self.network_ref()?.save_json(path)
    }

    /// Replaces the network with one loaded from `path`.
    pub fn load_network(&mut self, path: &str) -> Result<()> {
        let network = Network::load_json(path)?;
        self.set_network(network);
        Ok(())
    }
}
