use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use vision::{Device, ExportConfig, FeatureExtractor, VisionConfig};

#[derive(Parser)]
#[command(name = "imgvec")]
#[command(about = "Image embedding indexer and model exporter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a directory of images and build a nearest-neighbor index
    Index {
        /// Directory of images (.jpg, .jpeg, .png)
        #[arg(long)]
        images: PathBuf,
        /// Output directory for the embeddings and index artifacts
        #[arg(long, default_value = "models")]
        out: PathBuf,
        /// Path to the ONNX feature-extractor model
        #[arg(long, default_value = "models/resnet50.onnx")]
        model: PathBuf,
        /// Compute device for inference
        #[arg(long, value_enum, default_value = "cpu")]
        device: DeviceArg,
        /// CUDA device id (with --device cuda)
        #[arg(long, default_value_t = 0)]
        cuda_device: i32,
    },
    /// Validate an ONNX feature extractor and package it for deployment
    Export {
        /// Path to the source ONNX model
        #[arg(long, default_value = "models/resnet50.onnx")]
        model: PathBuf,
        /// Destination bundle file
        #[arg(long, default_value = "models/resnet50_embed.bundle")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Cpu,
    Cuda,
}

impl From<DeviceArg> for Device {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Cuda => Device::Cuda,
        }
    }
}

fn main() -> Result<()> {
    common::logging::init_logging("info");

    let cli = Cli::parse();
    match cli.command {
        Commands::Index {
            images,
            out,
            model,
            device,
            cuda_device,
        } => run_index(images, out, model, device.into(), cuda_device),
        Commands::Export { model, out } => run_export(model, out),
    }
}

fn run_index(
    images: PathBuf,
    out: PathBuf,
    model: PathBuf,
    device: Device,
    cuda_device_id: i32,
) -> Result<()> {
    let config = VisionConfig {
        model_path: model,
        device,
        cuda_device_id,
        ..VisionConfig::default()
    };

    let extractor = FeatureExtractor::new(&config)?;
    info!("indexing images from {}", images.display());

    let collection = index::collect_embeddings(&images, &extractor)?;
    let built = index::BruteForceIndex::build(&collection)?;
    index::save_artifacts(&out, &collection, &built)?;

    println!(
        "Saved {} embeddings and nearest-neighbor index to {}",
        collection.len(),
        out.display()
    );
    Ok(())
}

fn run_export(model: PathBuf, out: PathBuf) -> Result<()> {
    let config = ExportConfig {
        model_path: model,
        output_path: out,
    };

    let path = vision::export_model(&config)?;
    println!("Saved exported embedding model bundle to {}", path.display());
    Ok(())
}
