use crate::{data::MnistBatcher, training::TrainingConfig};
use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    prelude::*,
    record::{CompactRecorder, Recorder},
};

/// Predict the digit class of each item using the trained model saved under
/// `artifact_dir`. Returns one predicted label per input item, in order.
pub fn predict<B: Backend>(artifact_dir: &str, device: B::Device, items: Vec<MnistItem>) -> Vec<u8> {
    let config = TrainingConfig::load(format!("{artifact_dir}/config.json"))
        .expect("Config should exist for the model; run train first");
    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .expect("Trained model should exist; run train first");

    let model = config.model.init::<B>(&device).load_record(record);

    let batcher = MnistBatcher::default();
    let batch = batcher.batch(items, &device);
    let output = model.forward(batch.images);
    let predicted = output.argmax(1).flatten::<1>(0, 1);

    predicted
        .into_data()
        .iter::<i64>()
        .map(|class| class as u8)
        .collect()
}
