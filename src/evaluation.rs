use crate::{data::MnistBatcher, model::Model, training::TrainingConfig};
use burn::{
    data::{
        dataloader::batcher::Batcher,
        dataset::{vision::MnistDataset, vision::MnistItem, Dataset},
    },
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

/// Average loss and accuracy of a model over a dataset split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub loss: f64,
    pub accuracy: f64,
}

/// Evaluate the trained model saved under `artifact_dir` on the MNIST test
/// split.
pub fn evaluate<B: Backend>(artifact_dir: &str, device: B::Device) -> EvalReport {
    let config = TrainingConfig::load(format!("{artifact_dir}/config.json"))
        .expect("Config should exist for the model; run train first");
    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .expect("Trained model should exist; run train first");

    let model = config.model.init::<B>(&device).load_record(record);

    evaluate_model(&model, &MnistDataset::test(), config.batch_size, &device)
}

/// Compute the average cross-entropy loss and the accuracy of `model` over
/// every item of `dataset`, including a final partial batch.
pub fn evaluate_model<B: Backend, D: Dataset<MnistItem>>(
    model: &Model<B>,
    dataset: &D,
    batch_size: usize,
    device: &B::Device,
) -> EvalReport {
    let batcher = MnistBatcher::default();
    let num_items = dataset.len();

    // Nothing to average over an empty split.
    if num_items == 0 {
        return EvalReport {
            loss: 0.0,
            accuracy: 0.0,
        };
    }

    let mut total_loss = 0.0;
    let mut num_correct = 0i64;

    for start in (0..num_items).step_by(batch_size) {
        let end = usize::min(start + batch_size, num_items);
        let items: Vec<_> = (start..end).filter_map(|index| dataset.get(index)).collect();
        let batch = batcher.batch(items, device);

        let output = model.forward(batch.images);
        let loss = CrossEntropyLossConfig::new()
            .init(device)
            .forward(output.clone(), batch.targets.clone());

        total_loss += loss.into_scalar().elem::<f64>() * (end - start) as f64;

        let predictions = output.argmax(1).flatten::<1>(0, 1);
        num_correct += predictions
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
    }

    EvalReport {
        loss: total_loss / num_items as f64,
        accuracy: num_correct as f64 / num_items as f64,
    }
}
