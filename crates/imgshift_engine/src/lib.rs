//! Imgshift engine: file reading, the conversion boundary and artifact delivery.
mod acquire;
mod convert;
mod deliver;
mod engine;
mod invoke;
mod settings;
mod types;

pub use acquire::{guess_mime, AcquireError, ByteSource, FileAcquirer};
pub use convert::{ConvertError, Converter, ImageCrateConverter};
pub use deliver::{
    ensure_output_dir, ArtifactDelivery, ArtifactReference, DeliveryError, DirectorySaveTarget,
    SaveTarget,
};
pub use engine::{EngineHandle, EngineParts};
pub use invoke::ConversionInvoker;
pub use settings::EngineSettings;
pub use types::EngineEvent;
