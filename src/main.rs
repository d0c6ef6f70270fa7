// The library (src/lib.rs and its modules) holds all the training logic.
// This binary trains a small network on two synthetic clusters so the
// logging and progress output can be seen end to end:
//   cargo run --release
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strata_nn::{ActivationFunction, DataPoint, LossType, NetworkConfig, TrainConfig, Trainer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn clusters(count: usize, rng: &mut StdRng) -> strata_nn::Result<Vec<DataPoint>> {
    (0..count)
        .map(|i| {
            let label = i % 2;
            let centre = if label == 0 { -1.0 } else { 1.0 };
            let inputs = vec![
                centre + rng.gen_range(-0.5..0.5),
                centre + rng.gen_range(-0.5..0.5),
            ];
            DataPoint::new(inputs, label, 2)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = TrainConfig {
        epochs: 20,
        batch_size: 16,
        seed: Some(42),
        show_progress: true,
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(config)?;
    trainer.init_network(NetworkConfig::new(
        vec![2, 4, 2],
        ActivationFunction::ReLU,
        ActivationFunction::Softmax,
        LossType::CrossEntropy,
    ))?;
    trainer.load_data(clusters(400, &mut StdRng::seed_from_u64(7))?)?;
    trainer.on_epoch_complete(|epoch, evaluation, loss| {
        info!("Epoch {epoch} -- {evaluation} -- Loss : {loss:.4}");
    });
    trainer.train()?;

    let evaluation = trainer.eval(strata_nn::EvalSplit::Validation)?;
    info!("{}", evaluation.accuracy_string());
    Ok(())
}
