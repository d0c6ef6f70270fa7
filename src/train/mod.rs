pub mod history;
pub mod progress;
pub mod schedule;
pub mod train_config;
pub mod trainer;

pub use history::{History, HistoryEntry};
pub use schedule::learning_rate_for_epoch;
pub use train_config::TrainConfig;
pub use trainer::{EpochCallback, EvalSplit, Trainer, TrainerState};
