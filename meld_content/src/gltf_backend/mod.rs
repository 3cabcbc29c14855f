//! [`AssetImporter`](crate::backend::AssetImporter) and [`AssetExporter`](crate::backend::AssetExporter)
//! implementations on top of the `gltf` crate.

mod exporter;
mod importer;

pub use exporter::*;
pub use importer::*;
