use std::path::PathBuf;

use meld_shared::log::info;

use crate::{
    backend::{AssetExporter, AssetImporter},
    config::PipelineConfig,
    hotspot::extract_hotspots,
    normalization::import_and_normalize,
    placeholder::inject_placeholders,
    scene_graph::SceneGraph,
    source::enumerate_sources,
    Result,
};

/// Summary of a successful [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub source_directory: PathBuf,
    pub file_count: usize,
    /// Number of nodes in the aggregate including the root.
    pub node_count: usize,
    pub hotspot_count: usize,
    pub placeholder_count: usize,
    pub output: PathBuf,
}

/// Aggregates all asset files of a project into one output file.
///
/// A run clears the graph, imports and normalizes every source file in name
/// order, optionally injects placeholders, tags hotspots and finally writes
/// the graph with the exporter. The first error aborts the run.
pub struct Pipeline<I, E> {
    config: PipelineConfig,
    importer: I,
    exporter: E,
    scene_graph: SceneGraph,
}

impl<I: AssetImporter, E: AssetExporter> Pipeline<I, E> {
    pub fn new(config: PipelineConfig, importer: I, exporter: E) -> Self {
        Self {
            config,
            importer,
            exporter,
            scene_graph: SceneGraph::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The graph as it was left by the last run.
    pub fn scene_graph(&self) -> &SceneGraph {
        &self.scene_graph
    }

    pub fn run(&mut self) -> Result<PipelineReport> {
        self.scene_graph.clear();

        let (source_directory, files) = enumerate_sources(&self.config.candidate_dirs())?;
        for file in &files {
            import_and_normalize(&mut self.scene_graph, &mut self.importer, file)?;
        }

        let placeholder_count = inject_placeholders(&mut self.scene_graph, self.config.placeholders);
        let hotspot_count = extract_hotspots(&mut self.scene_graph);

        let output = self.config.output_path();
        self.exporter.export(&self.scene_graph, &output, &self.config.export)?;

        let report = PipelineReport {
            source_directory,
            file_count: files.len(),
            node_count: self.scene_graph.len(),
            hotspot_count,
            placeholder_count,
            output,
        };
        info!(
            "Aggregated {} file(s) with {} node(s) and {} hotspot(s) into '{}'",
            report.file_count,
            report.node_count,
            report.hotspot_count,
            report.output.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use meld_test::{setup_logger, spectral::prelude::*, write_gltf_nodes, FixtureNode};
    use tempdir::TempDir;

    use crate::{
        backend::ExportOptions,
        glb::verify_glb,
        gltf_backend::{GltfExporter, GltfImporter},
        scene_graph::{NodeDescription, NodeHandle, NodeKind, MASTER_ROOT_NAME},
        Error,
    };

    use super::*;

    /// Creates one node named after the file.
    #[derive(Default)]
    struct FakeImporter {
        imported: Vec<PathBuf>,
    }

    impl AssetImporter for FakeImporter {
        fn import(&mut self, path: &Path, scene_graph: &mut SceneGraph) -> Result<Vec<NodeHandle>> {
            self.imported.push(path.to_owned());
            Ok(vec![scene_graph.insert(NodeDescription::new("HS__A", NodeKind::Group))])
        }
    }

    /// Remembers the names of the graph it was asked to write.
    #[derive(Default)]
    struct FakeExporter {
        exported: Option<(Vec<String>, PathBuf)>,
    }

    impl AssetExporter for FakeExporter {
        fn export(&mut self, scene_graph: &SceneGraph, path: &Path, _options: &ExportOptions) -> Result<()> {
            let names = scene_graph.iter().map(|(_, node)| node.name().to_owned()).collect();
            self.exported = Some((names, path.to_owned()));
            Ok(())
        }
    }

    fn touch(path: PathBuf) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn stages_run_in_order() {
        let root = TempDir::new("project").unwrap();
        touch(root.path().join("assets/parts/b.glb"));
        touch(root.path().join("assets/parts/a.gltf"));
        let config = PipelineConfig {
            placeholders: true,
            ..PipelineConfig::new(root.path())
        };

        let mut pipeline = Pipeline::new(config, FakeImporter::default(), FakeExporter::default());
        let report = pipeline.run().unwrap();

        assert_eq!(
            pipeline.importer.imported,
            vec![root.path().join("assets/parts/a.gltf"), root.path().join("assets/parts/b.glb")]
        );
        let (names, output) = pipeline.exporter.exported.clone().unwrap();
        assert_eq!(
            names,
            vec![
                MASTER_ROOT_NAME,
                "a__HS__A",
                "b__HS__A",
                "PLACEHOLDER__Monitor",
                "PLACEHOLDER__Ventilator",
                "PLACEHOLDER__Bed"
            ]
        );
        assert_eq!(output, root.path().join("public/main.glb"));
        assert_eq!(
            report,
            PipelineReport {
                source_directory: root.path().join("assets/parts"),
                file_count: 2,
                node_count: 6,
                hotspot_count: 0,
                placeholder_count: 3,
                output,
            }
        );
    }

    #[test]
    fn runs_start_from_an_empty_graph() {
        let root = TempDir::new("project").unwrap();
        touch(root.path().join("public/parts/a.glb"));
        let mut pipeline = Pipeline::new(
            PipelineConfig::new(root.path()),
            FakeImporter::default(),
            FakeExporter::default(),
        );
        pipeline.run().unwrap();
        pipeline.run().unwrap();
        assert_that!(pipeline.scene_graph().len()).is_equal_to(2);
        assert_that!(pipeline.scene_graph().find("a__HS__A")).is_some();
    }

    #[test]
    fn empty_input_writes_nothing() {
        let root = TempDir::new("project").unwrap();
        touch(root.path().join("assets/parts/readme.txt"));
        let mut pipeline = Pipeline::new(PipelineConfig::new(root.path()), GltfImporter, GltfExporter);
        let result = pipeline.run();
        assert!(matches!(result, Err(Error::EmptyInput(_))));
        assert!(!root.path().join("public/main.glb").exists());
    }

    #[test]
    fn missing_source_directory() {
        let root = TempDir::new("project").unwrap();
        let mut pipeline = Pipeline::new(
            PipelineConfig::new(root.path()),
            FakeImporter::default(),
            FakeExporter::default(),
        );
        assert!(matches!(pipeline.run(), Err(Error::SourceDirectoryNotFound(_))));
        assert_that!(pipeline.exporter.exported).is_none();
    }

    #[test]
    fn aggregate_gltf_files() {
        setup_logger();
        let root = TempDir::new("project").unwrap();
        // Both candidates are populated, only the first one is used.
        write_gltf_nodes(
            root.path().join("assets/glb_parts/monitor arm.gltf"),
            &[
                FixtureNode::named("Root").with_children(&[1]).with_scale([2.0, 2.0, 2.0]),
                FixtureNode::named("Screen").with_translation([0.0, 1.0, 0.0]),
            ],
        );
        write_gltf_nodes(
            root.path().join("assets/glb_parts/bed.gltf"),
            &[FixtureNode::named("Root"), FixtureNode::named("Root")],
        );
        // The file stem turns every node of this file into a hotspot.
        write_gltf_nodes(root.path().join("assets/glb_parts/HS.gltf"), &[FixtureNode::named("MON01__Monitor")]);
        write_gltf_nodes(root.path().join("public/parts/ignored.gltf"), &[FixtureNode::named("Ignored")]);

        let config = PipelineConfig {
            placeholders: true,
            ..PipelineConfig::new(root.path())
        };
        let mut pipeline = Pipeline::new(config, GltfImporter, GltfExporter);
        let report = pipeline.run().unwrap();

        assert_that!(report.source_directory).is_equal_to(root.path().join("assets/glb_parts"));
        assert_that!(report.file_count).is_equal_to(3);
        assert_that!(report.node_count).is_equal_to(9);
        assert_that!(report.hotspot_count).is_equal_to(1);

        let scene_graph = pipeline.scene_graph();
        assert_that!(scene_graph.find("bed__Root")).is_some();
        assert_that!(scene_graph.find("bed__Root.001")).is_some();
        assert_that!(scene_graph.find("Ignored")).is_none();
        assert_eq!(scene_graph.parentless(), vec![scene_graph.root()]);

        let screen = scene_graph.find("monitor_arm__Screen").unwrap();
        assert_eq!(scene_graph.node(screen).transform.translation.y, 2.0);
        assert!(scene_graph.node(screen).metadata.is_empty());

        let monitor = scene_graph.find("HS__MON01__Monitor").unwrap();
        assert_eq!(scene_graph.node(monitor).metadata.get("hotspotId").map(String::as_str), Some("MON01"));

        let summary = verify_glb(&report.output, 0).unwrap();
        assert_that!(summary.size).is_greater_than(crate::glb::DEFAULT_MIN_SIZE);

        let mut reimported = SceneGraph::new();
        let handles = GltfImporter.import(&report.output, &mut reimported).unwrap();
        assert_that!(handles.len()).is_equal_to(report.node_count);
        let hotspot = reimported.find("HS__MON01__Monitor").unwrap();
        assert_eq!(reimported.node(hotspot).metadata.get("label").map(String::as_str), Some("Monitor"));
    }
}
