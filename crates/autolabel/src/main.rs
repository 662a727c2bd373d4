use autolabel::{
    AutolabelConfig, InferenceBackend, LabelOutcome, LabelRequest, ModelResolver,
    logging::setup_logging,
    resolve::default_models_dir,
};
use clap::Parser;
use std::path::PathBuf;

#[cfg(feature = "ort-backend")]
use autolabel::backend::ort::OrtBackend as Backend;

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the binary");

/// Write YOLO-format labels for one image using an ONNX detector.
#[derive(Parser, Debug)]
#[command(name = "autolabel", version, about)]
struct Args {
    /// Image to label
    image: PathBuf,

    /// Output label file (`.txt`)
    label: PathBuf,

    /// Class names file, one per line
    names: PathBuf,

    /// ONNX model; searched for when omitted
    model: Option<PathBuf>,

    /// Minimum class score to keep a detection
    #[arg(long)]
    conf_thres: Option<f32>,

    /// IoU above which overlapping boxes of one class are suppressed
    #[arg(long)]
    iou_thres: Option<f32>,

    /// Square model input size
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    imgsz: Option<u32>,

    /// Directory searched for `*.onnx` models (defaults to the executable's)
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AutolabelConfig::from_env();
    if let Some(conf) = args.conf_thres {
        config.confidence_threshold = conf;
    }
    if let Some(iou) = args.iou_thres {
        config.iou_threshold = iou;
    }
    if let Some(size) = args.imgsz {
        config.input_size = size;
    }

    setup_logging(&config);
    tracing::debug!(config = ?config, "Loaded configuration");

    let resolver = ModelResolver::new(args.models_dir.unwrap_or_else(default_models_dir));
    let model_path = resolver.resolve(args.model.as_deref(), config.model_override.as_deref())?;
    tracing::info!("Using model: {}", model_path.display());

    let request = LabelRequest {
        image_path: args.image,
        label_path: args.label,
        names_path: args.names,
        model_path,
    };

    match autolabel::run(&request, &config, Backend::load_model)? {
        LabelOutcome::Skipped => {
            tracing::info!(image = %request.image_path.display(), "Image skipped");
        }
        LabelOutcome::NoDetections => {
            tracing::info!("No detections, label file not written");
        }
        LabelOutcome::Written(written) => {
            tracing::info!(
                count = written.count,
                label = %written.label_path.display(),
                side_record = ?written.side_record,
                "Labels written"
            );
        }
    }

    Ok(())
}
