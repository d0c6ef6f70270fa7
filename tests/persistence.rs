use approx::assert_relative_eq;
use strata_nn::{
    ActivationFunction, DataPoint, Error, History, LossType, Network, NetworkConfig,
    NetworkSnapshot, TrainConfig, Trainer,
};

fn trained_trainer() -> Trainer {
    let config = TrainConfig {
        epochs: 5,
        batch_size: 4,
        seed: Some(21),
        ..TrainConfig::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer.init_network(NetworkConfig::new(
        vec![3, 5, 3],
        ActivationFunction::SiLU,
        ActivationFunction::Softmax,
        LossType::CrossEntropy,
    )).unwrap();
    let data = (0..30)
        .map(|i| {
            let label = i % 3;
            let mut inputs = vec![0.1; 3];
            inputs[label] = 0.9 - (i as f64) * 0.01;
            DataPoint::new(inputs, label, 3).unwrap()
        })
        .collect();
    trainer.load_data(data).unwrap();
    trainer.train().unwrap();
    trainer
}

#[test]
fn save_and_reload_predicts_the_same_outputs() {
    let trainer = trained_trainer();
    let original = trainer.network().unwrap();
    assert!(original.layers().iter().any(|l| l.weight_velocities().iter().any(|v| *v != 0.0)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nn.json");
    let path = path.to_str().unwrap();
    trainer.save_network(path).unwrap();

    let reloaded = Network::load_json(path).unwrap();
    let input = [0.2, 0.7, 0.1];
    let before = original.predict(&input).unwrap();
    let after = reloaded.predict(&input).unwrap();
    for (b, a) in before.iter().zip(&after) {
        assert_relative_eq!(*b, *a, max_relative = 1e-12);
    }

    assert_eq!(reloaded.config(), original.config());
    assert_eq!(reloaded.layers()[0].activation(), ActivationFunction::SiLU);
    assert_eq!(reloaded.layers()[1].activation(), ActivationFunction::Softmax);
    for layer in reloaded.layers() {
        assert!(layer.weight_gradients().iter().all(|g| *g == 0.0));
        assert!(layer.bias_gradients().iter().all(|g| *g == 0.0));
        assert!(layer.weight_velocities().iter().all(|v| *v == 0.0));
        assert!(layer.bias_velocities().iter().all(|v| *v == 0.0));
    }
}

#[test]
fn trainer_can_continue_from_a_saved_network() {
    let trainer = trained_trainer();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nn.json");
    let path = path.to_str().unwrap();
    trainer.save_network(path).unwrap();

    let mut resumed = Trainer::new(TrainConfig { epochs: 2, seed: Some(4), ..TrainConfig::default() }).unwrap();
    resumed.load_network(path).unwrap();
    resumed.load_split_data(trainer.training_data().to_vec(), trainer.validation_data().to_vec());
    resumed.train().unwrap();
    assert_eq!(resumed.history().len(), 2);
}

#[test]
fn snapshot_file_names_strategies() {
    let trainer = trained_trainer();
    let json = serde_json::to_value(trainer.network().unwrap().snapshot()).unwrap();

    assert_eq!(json["config"]["hidden_activation"], "silu");
    assert_eq!(json["config"]["loss"], "cross_entropy");
    assert_eq!(json["layers"][0]["num_nodes_in"], 3);
    assert_eq!(json["layers"][0]["weights"].as_array().unwrap().len(), 15);
    assert!(json["layers"][0].get("velocity_w").is_none());
}

#[test]
fn corrupt_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    assert!(matches!(
        Network::load_json(garbage.to_str().unwrap()),
        Err(Error::Serialization(_))
    ));

    let mut snapshot: NetworkSnapshot = trained_trainer().network().unwrap().snapshot();
    snapshot.layers[1].biases.push(0.0);
    let bad = dir.path().join("bad.json");
    snapshot.save_json(bad.to_str().unwrap()).unwrap();
    assert!(matches!(
        Network::load_json(bad.to_str().unwrap()),
        Err(Error::InvalidSnapshot(_))
    ));

    let unknown = dir.path().join("unknown.json");
    let mut value = serde_json::to_value(trained_trainer().network().unwrap().snapshot()).unwrap();
    value["config"]["loss"] = "hinge".into();
    std::fs::write(&unknown, value.to_string()).unwrap();
    assert!(matches!(
        Network::load_json(unknown.to_str().unwrap()),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn history_is_saved_independently() {
    let trainer = trained_trainer();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hist.json");
    let path = path.to_str().unwrap();

    trainer.history().save_json(path).unwrap();
    let restored = History::load_json(path).unwrap();
    assert_eq!(restored.len(), 5);
    assert_eq!(&restored, trainer.history());
}
