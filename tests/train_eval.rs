//! Integration tests for the training and inference workflow.
//!
//! These exercise cross-module interactions: batcher -> model -> loss ->
//! optimizer steps, evaluation over a dataset, and checkpoint round-trips.
//! All use the NdArray backend and synthetic items — no dataset download.

use burn::backend::{ndarray::NdArray, Autodiff};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistItem;
use burn::data::dataset::InMemDataset;
use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::prelude::*;
use burn::record::CompactRecorder;
use tempfile::TempDir;

use mnist_dnn::data::{MnistBatch, MnistBatcher};
use mnist_dnn::evaluation::evaluate_model;
use mnist_dnn::inference::predict;
use mnist_dnn::model::ModelConfig;
use mnist_dnn::training::TrainingConfig;

type TestBackend = NdArray<f32>;
type TestAutodiffBackend = Autodiff<TestBackend>;

/// Image intensity keyed to the label so the classes are linearly separable.
fn item(label: u8) -> MnistItem {
    MnistItem {
        image: [[label as f32 * 25.0; 28]; 28],
        label,
    }
}

#[test]
fn sgd_training_reduces_loss() {
    let device = Default::default();
    let batcher = MnistBatcher::default();

    let items: Vec<MnistItem> = (0..10u8).cycle().take(80).map(item).collect();
    let batch: MnistBatch<TestAutodiffBackend> = batcher.batch(items, &device);

    let mut model = ModelConfig::new().init::<TestAutodiffBackend>(&device);
    let mut optim = SgdConfig::new().init();

    let mut first_loss = None;
    let mut last_loss = f64::MAX;

    for _ in 0..100 {
        let output =
            model.forward_classification(batch.images.clone(), batch.targets.clone());
        last_loss = output.loss.clone().into_scalar().elem::<f64>();
        first_loss.get_or_insert(last_loss);

        let grads = GradientsParams::from_grads(output.loss.backward(), &model);
        model = optim.step(0.05, model, grads);
    }

    let first_loss = first_loss.unwrap();
    assert!(
        last_loss < first_loss,
        "loss should decrease: first={first_loss}, last={last_loss}"
    );
}

#[test]
fn trained_model_evaluates_better_than_untrained() {
    let device = Default::default();
    let batcher = MnistBatcher::default();
    let dataset = InMemDataset::new((0..10u8).map(item).collect());

    let untrained = ModelConfig::new().init::<TestBackend>(&device);
    let before = evaluate_model(&untrained, &dataset, 4, &device);

    let items: Vec<MnistItem> = (0..10u8).cycle().take(80).map(item).collect();
    let batch: MnistBatch<TestAutodiffBackend> = batcher.batch(items, &device);

    let mut model = ModelConfig::new().init::<TestAutodiffBackend>(&device);
    let mut optim = SgdConfig::new().init();
    for _ in 0..200 {
        let output =
            model.forward_classification(batch.images.clone(), batch.targets.clone());
        let grads = GradientsParams::from_grads(output.loss.backward(), &model);
        model = optim.step(0.05, model, grads);
    }

    let after = evaluate_model(&model.valid(), &dataset, 4, &device);

    assert!(after.loss.is_finite());
    assert!(
        after.loss < before.loss,
        "training should reduce eval loss: before={}, after={}",
        before.loss,
        after.loss
    );
    assert!((0.0..=1.0).contains(&after.accuracy));
}

#[test]
fn checkpoint_round_trip_preserves_predictions() {
    let device: <TestBackend as Backend>::Device = Default::default();
    let tmp = TempDir::new().unwrap();
    let artifact_dir = tmp.path().to_str().unwrap();

    TrainingConfig::new(ModelConfig::new(), SgdConfig::new())
        .save(format!("{artifact_dir}/config.json"))
        .unwrap();

    let model = ModelConfig::new().init::<TestBackend>(&device);
    let items: Vec<MnistItem> = (0..10u8).map(item).collect();

    let batch: MnistBatch<TestBackend> = MnistBatcher::default().batch(items.clone(), &device);
    let expected: Vec<u8> = model
        .forward(batch.images)
        .argmax(1)
        .flatten::<1>(0, 1)
        .into_data()
        .iter::<i64>()
        .map(|class| class as u8)
        .collect();

    model
        .save_file(format!("{artifact_dir}/model"), &CompactRecorder::new())
        .unwrap();

    let predictions = predict::<TestBackend>(artifact_dir, device, items);
    assert_eq!(predictions, expected);
}
