//! # Overview
//!
//! Crate for aggregating a directory of independently authored 3D asset files
//! into one combined binary glTF file.
//!
//! Every file is imported into a shared [`SceneGraph`](scene_graph::SceneGraph)
//! as its own subtree. The imported nodes are renamed with a prefix derived from
//! the file name, so that nodes of different files never collide, attached to
//! the single root node `MASTER_ROOT` and their rotation and scale are baked.
//! Afterwards nodes that follow the hotspot naming convention are tagged with
//! metadata and the whole graph is written as one file.
//!
//! ## Example:
//!
//! **Source Directory:**
//!
//! ```text
//! assets/
//! ├─ parts/
//! │  ├─ bed.glb          (Frame, Mattress)
//! │  ├─ monitor arm.glb  (Frame, Screen)
//! │  ├─ HS.gltf          (BED01__Bed Light)
//! ```
//!
//! **Aggregate:**
//!
//! ```text
//! MASTER_ROOT
//! ├─ HS__BED01__Bed Light   { type: hotspot, hotspotId: BED01, label: Bed Light }
//! ├─ bed__Frame
//! ├─ bed__Mattress
//! ├─ monitor_arm__Frame
//! ├─ monitor_arm__Screen
//! ```
//!
//! # Components
//!
//! The [`Pipeline`](pipeline::Pipeline) runs all stages in order. File formats
//! are hidden behind the [`AssetImporter`](backend::AssetImporter) and
//! [`AssetExporter`](backend::AssetExporter) traits, which are implemented for
//! glTF in [`gltf_backend`].

mod common;

pub mod backend;
pub mod bake;
pub mod config;
pub mod glb;
pub mod gltf_backend;
pub mod hotspot;
pub mod mesh;
pub mod normalization;
pub mod pipeline;
pub mod placeholder;
pub mod scene_graph;
pub mod source;

pub use common::*;
