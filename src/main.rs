use burn::{
    data::dataset::{vision::MnistDataset, vision::MnistItem, Dataset},
    optim::SgdConfig,
    tensor::backend::AutodiffBackend,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mnist_dnn::{
    evaluation, inference,
    model::ModelConfig,
    training::{self, TrainingConfig},
};

/// Train a feed-forward MNIST classifier, evaluate it on the test split, and
/// print predictions for the first test samples.
#[derive(Parser, Debug)]
#[command(name = "mnist-dnn", version, about)]
struct Cli {
    /// Learning rate for gradient descent.
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f64,

    /// Number of training epochs.
    #[arg(long, default_value_t = 30)]
    epochs: usize,

    /// Number of samples per batch.
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Directory for the model checkpoint, config, and training logs.
    #[arg(long, default_value = "/tmp/mnist-dnn")]
    model_dir: String,

    /// Random seed for shuffling and initialization.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of dataloader workers.
    #[arg(long, default_value_t = 4)]
    num_workers: usize,
}

fn launch<B: AutodiffBackend>(device: B::Device, args: &Cli) {
    let artifact_dir = args.model_dir.as_str();

    let config = TrainingConfig::new(ModelConfig::new(), SgdConfig::new())
        .with_learning_rate(args.learning_rate)
        .with_num_epochs(args.epochs)
        .with_batch_size(args.batch_size)
        .with_seed(args.seed)
        .with_num_workers(args.num_workers);

    tracing::info!(artifact_dir, "training");
    training::train::<B>(artifact_dir, config, device.clone());

    tracing::info!("evaluating on the test split");
    let report = evaluation::evaluate::<B::InnerBackend>(artifact_dir, device.clone());
    println!(
        "{}",
        serde_json::to_string(&report).expect("Report should serialize to JSON")
    );

    let items: Vec<MnistItem> = MnistDataset::test().iter().take(10).collect();
    let expected: Vec<u8> = items.iter().map(|item| item.label).collect();
    let predictions = inference::predict::<B::InnerBackend>(artifact_dir, device, items);
    for (predicted, expected) in predictions.into_iter().zip(expected) {
        println!("Predicted {predicted} Expected {expected}");
    }
}

#[cfg(any(
    feature = "ndarray",
    feature = "ndarray-blas-accelerate",
    feature = "ndarray-blas-netlib",
    feature = "ndarray-blas-openblas",
))]
mod ndarray {
    use crate::{launch, Cli};
    use burn::backend::{
        ndarray::{NdArray, NdArrayDevice},
        Autodiff,
    };

    pub fn run(args: &Cli) {
        launch::<Autodiff<NdArray>>(NdArrayDevice::Cpu, args);
    }
}

#[cfg(feature = "tch-cpu")]
mod tch_cpu {
    use crate::{launch, Cli};
    use burn::backend::{
        libtorch::{LibTorch, LibTorchDevice},
        Autodiff,
    };

    pub fn run(args: &Cli) {
        launch::<Autodiff<LibTorch>>(LibTorchDevice::Cpu, args);
    }
}

#[cfg(feature = "tch-gpu")]
mod tch_gpu {
    use crate::{launch, Cli};
    use burn::backend::{
        libtorch::{LibTorch, LibTorchDevice},
        Autodiff,
    };

    pub fn run(args: &Cli) {
        #[cfg(not(target_os = "macos"))]
        let device = LibTorchDevice::Cuda(0);
        #[cfg(target_os = "macos")]
        let device = LibTorchDevice::Mps;

        launch::<Autodiff<LibTorch>>(device, args);
    }
}

#[cfg(feature = "wgpu")]
mod wgpu {
    use crate::{launch, Cli};
    use burn::backend::{
        wgpu::{Wgpu, WgpuDevice},
        Autodiff,
    };

    pub fn run(args: &Cli) {
        launch::<Autodiff<Wgpu>>(WgpuDevice::default(), args);
    }
}

#[cfg(feature = "cuda")]
mod cuda {
    use crate::{launch, Cli};
    use burn::backend::{
        cuda::{Cuda, CudaDevice},
        Autodiff,
    };

    pub fn run(args: &Cli) {
        launch::<Autodiff<Cuda>>(CudaDevice::default(), args);
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();

    #[cfg(any(
        feature = "ndarray",
        feature = "ndarray-blas-accelerate",
        feature = "ndarray-blas-netlib",
        feature = "ndarray-blas-openblas",
    ))]
    ndarray::run(&args);
    #[cfg(feature = "tch-cpu")]
    tch_cpu::run(&args);
    #[cfg(feature = "tch-gpu")]
    tch_gpu::run(&args);
    #[cfg(feature = "wgpu")]
    wgpu::run(&args);
    #[cfg(feature = "cuda")]
    cuda::run(&args);
}
