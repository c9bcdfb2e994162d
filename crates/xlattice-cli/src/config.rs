use crate::cli::{BuildArgs, JobArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use xlattice::core::models::graph::GeometricGraph;
use xlattice::core::models::ids::NodeId;
use xlattice::core::utils::geometry::{Axis, FaceSelector};
use xlattice::engine::config::{self as core_config, DistributionMode, Operation};
use xlattice::engine::error::LatticeError;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLatticeConfig {
    tolerance: Option<f64>,
    default_diameter: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialNode {
    id: u64,
    position: [f64; 3],
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialEdge {
    nodes: [u64; 2],
    diameter: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
enum PartialDistributionMode {
    #[default]
    Position,
    Orientation,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialOperation {
    Translate {
        offset: [f64; 3],
    },
    Scale {
        factor: Option<f64>,
        factors: Option<[f64; 3]>,
    },
    Flip {
        axis: Axis,
    },
    Mirror {
        face: String,
    },
    Tessellate {
        counts: [i64; 3],
    },
    DiameterConstant {
        value: f64,
        #[serde(default)]
        mode: PartialDistributionMode,
        reference: Option<Axis>,
    },
    DiameterGradient {
        axis: Axis,
        from: f64,
        to: f64,
    },
    DiameterByInclination {
        reference: Option<Axis>,
        aligned: f64,
        perpendicular: f64,
    },
}

impl TryFrom<PartialOperation> for Operation {
    type Error = CliError;

    fn try_from(p: PartialOperation) -> Result<Self> {
        Ok(match p {
            PartialOperation::Translate { offset } => {
                Operation::Translate(Vector3::from(offset))
            }
            PartialOperation::Scale { factor, factors } => match (factor, factors) {
                (Some(f), None) => Operation::uniform_scale(f),
                (None, Some(fs)) => Operation::Scale(Vector3::from(fs)),
                _ => {
                    return Err(CliError::Config(
                        "A `scale` operation needs exactly one of `factor` or `factors`."
                            .to_string(),
                    ));
                }
            },
            PartialOperation::Flip { axis } => Operation::Flip(axis),
            PartialOperation::Mirror { face } => {
                let face: FaceSelector = face.parse().map_err(LatticeError::from)?;
                Operation::Mirror(face)
            }
            PartialOperation::Tessellate { counts } => Operation::Tessellate(counts),
            PartialOperation::DiameterConstant {
                value,
                mode,
                reference,
            } => {
                let mode = match (mode, reference) {
                    (PartialDistributionMode::Position, None) => DistributionMode::Position,
                    (PartialDistributionMode::Position, Some(_)) => {
                        return Err(CliError::Config(
                            "`reference` only applies to `mode = \"orientation\"`.".to_string(),
                        ));
                    }
                    (PartialDistributionMode::Orientation, reference) => {
                        DistributionMode::Orientation {
                            reference: reference.unwrap_or(Axis::Z),
                        }
                    }
                };
                Operation::DiameterConstant { value, mode }
            }
            PartialOperation::DiameterGradient { axis, from, to } => {
                Operation::DiameterGradient { axis, from, to }
            }
            PartialOperation::DiameterByInclination {
                reference,
                aligned,
                perpendicular,
            } => Operation::DiameterByInclination {
                reference: reference.unwrap_or(Axis::Z),
                aligned,
                perpendicular,
            },
        })
    }
}

/// A job file as written by the user: every section optional until merged.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialJobConfig {
    lattice: Option<PartialLatticeConfig>,
    #[serde(default)]
    nodes: Vec<PartialNode>,
    #[serde(default)]
    edges: Vec<PartialEdge>,
    #[serde(default)]
    operations: Vec<PartialOperation>,
}

/// A fully resolved job.
#[derive(Debug)]
pub struct JobConfig {
    pub lattice: core_config::LatticeConfig,
    pub graph: GeometricGraph,
    pub operations: Vec<Operation>,
}

impl PartialJobConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the lattice settings and the unit-cell graph.
    /// Operations from the file are kept.
    pub fn merge_with_job_args(mut self, args: &JobArgs) -> Result<JobConfig> {
        self.apply_set_values(&args.set_values)?;
        let lattice_config = self.lattice.take().unwrap_or_default();

        let lattice = core_config::LatticeConfigBuilder::new()
            .tolerance(
                args.tolerance
                    .or(lattice_config.tolerance)
                    .unwrap_or(xlattice::core::utils::tolerance::DEFAULT_TOLERANCE),
            )
            .default_diameter(
                args.default_diameter
                    .or(lattice_config.default_diameter)
                    .unwrap_or(core_config::DEFAULT_DIAMETER),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let graph = Self::build_graph(&self.nodes, &self.edges)?;
        let operations = self
            .operations
            .into_iter()
            .map(Operation::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(JobConfig {
            lattice,
            graph,
            operations,
        })
    }

    /// Like [`merge_with_job_args`](Self::merge_with_job_args), then applies
    /// the `build`-only flags.
    pub fn merge_with_cli(self, args: &BuildArgs) -> Result<JobConfig> {
        let mut job = self.merge_with_job_args(&args.job)?;
        if args.no_operations {
            debug!("Dropping {} operation(s) from the job file.", job.operations.len());
            job.operations.clear();
        }
        if let Some(counts) = &args.tessellate {
            let counts = parser::parse_triple::<i64>(counts)
                .map_err(|e| CliError::Argument(e.to_string()))?;
            job.operations.push(Operation::Tessellate(counts));
        }
        Ok(job)
    }

    fn build_graph(nodes: &[PartialNode], edges: &[PartialEdge]) -> Result<GeometricGraph> {
        if nodes.is_empty() {
            return Err(CliError::Config(
                "The job file defines no `[[nodes]]`.".to_string(),
            ));
        }
        let mut graph = GeometricGraph::new();
        for node in nodes {
            graph
                .add_node(NodeId(node.id), Point3::from(node.position))
                .map_err(LatticeError::from)?;
        }
        for edge in edges {
            let [a, b] = edge.nodes;
            graph
                .add_edge(NodeId(a), NodeId(b), edge.diameter)
                .map_err(LatticeError::from)?;
        }
        debug!(
            "Built unit cell with {} node(s) and {} edge(s).",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let parse_float = || -> Result<f64> {
                value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })
            };

            match key {
                "lattice.tolerance" => {
                    self.lattice
                        .get_or_insert_with(Default::default)
                        .tolerance = Some(parse_float()?);
                }
                "lattice.default-diameter" => {
                    self.lattice
                        .get_or_insert_with(Default::default)
                        .default_diameter = Some(parse_float()?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};
    use xlattice::engine::error::ValidationError;

    const SEGMENT_JOB: &str = r#"
        [lattice]
        tolerance = 1e-5
        default-diameter = 0.2

        [[nodes]]
        id = 1
        position = [0.0, 0.0, 0.0]

        [[nodes]]
        id = 2
        position = [1.0, 0.0, 0.0]

        [[edges]]
        nodes = [1, 2]

        [[operations]]
        type = "scale"
        factor = 2.0

        [[operations]]
        type = "mirror"
        face = "+x"

        [[operations]]
        type = "diameter-constant"
        value = 0.3
        mode = "orientation"
    "#;

    fn write_job_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn parse_build_args(config_path: &Path, extra: &[&str]) -> BuildArgs {
        let mut args = vec!["xlattice", "build", "-c", config_path.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Build(build_args) => build_args,
            other => panic!("Expected 'build' subcommand, got {:?}", other),
        }
    }

    fn load(content: &str, extra: &[&str]) -> Result<JobConfig> {
        let dir = tempdir().unwrap();
        let path = write_job_file(&dir, "job.toml", content);
        let args = parse_build_args(&path, extra);
        PartialJobConfig::from_file(&path)?.merge_with_cli(&args)
    }

    #[test]
    fn test_load_job_file_with_all_sections() {
        let job = load(SEGMENT_JOB, &[]).unwrap();

        assert_eq!(job.lattice.tolerance.value(), 1e-5);
        assert_eq!(job.lattice.default_diameter, 0.2);
        assert_eq!(job.graph.node_count(), 2);
        assert!(job.graph.contains_edge(NodeId(1), NodeId(2)));
        assert_eq!(
            job.operations,
            vec![
                Operation::uniform_scale(2.0),
                Operation::Mirror(FaceSelector::max(Axis::X)),
                Operation::DiameterConstant {
                    value: 0.3,
                    mode: DistributionMode::Orientation { reference: Axis::Z },
                },
            ]
        );
    }

    #[test]
    fn test_cli_args_override_file_values() {
        let job = load(
            SEGMENT_JOB,
            &["--tolerance", "1e-3", "--tessellate", "3,1,1", "--no-operations"],
        )
        .unwrap();

        assert_eq!(job.lattice.tolerance.value(), 1e-3);
        assert_eq!(job.operations, vec![Operation::Tessellate([3, 1, 1])]);
    }

    #[test]
    fn test_set_value_overrides_file_and_defaults() {
        let job = load(
            SEGMENT_JOB,
            &["-S", "lattice.default-diameter=0.05", "-S", "lattice.tolerance=1e-7"],
        )
        .unwrap();
        assert_eq!(job.lattice.default_diameter, 0.05);
        assert_eq!(job.lattice.tolerance.value(), 1e-7);
    }

    #[test]
    fn test_missing_lattice_section_uses_defaults() {
        let content = r#"
            [[nodes]]
            id = 7
            position = [0.5, 0.5, 0.5]
        "#;
        let job = load(content, &[]).unwrap();
        assert_eq!(job.lattice, core_config::LatticeConfig::default());
        assert!(job.operations.is_empty());
    }

    #[test]
    fn test_unknown_set_key_returns_error() {
        let result = load(SEGMENT_JOB, &["-S", "lattice.colour=red"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("lattice.colour")));
    }

    #[test]
    fn test_invalid_tolerance_returns_error() {
        let result = load(SEGMENT_JOB, &["--tolerance=-1"]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("tolerance")));
    }

    #[test]
    fn test_bad_tessellate_argument_returns_error() {
        let result = load(SEGMENT_JOB, &["--tessellate", "3,1"]);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let content = r#"
            [[nodes]]
            id = 1
            position = [0.0, 0.0, 0.0]
            colour = "red"
        "#;
        let result = load(content, &[]);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn test_duplicate_node_ids_are_rejected() {
        let content = r#"
            [[nodes]]
            id = 1
            position = [0.0, 0.0, 0.0]

            [[nodes]]
            id = 1
            position = [1.0, 0.0, 0.0]
        "#;
        let result = load(content, &[]);
        assert!(matches!(
            result,
            Err(CliError::Lattice(LatticeError::Graph(_)))
        ));
    }

    #[test]
    fn test_invalid_face_selector_is_a_validation_error() {
        let content = r#"
            [[nodes]]
            id = 1
            position = [0.0, 0.0, 0.0]

            [[operations]]
            type = "mirror"
            face = "+w"
        "#;
        let result = load(content, &[]);
        assert!(matches!(
            result,
            Err(CliError::Lattice(LatticeError::Validation(
                ValidationError::Face(_)
            )))
        ));
    }

    #[test]
    fn test_scale_requires_exactly_one_form() {
        let content = r#"
            [[nodes]]
            id = 1
            position = [0.0, 0.0, 0.0]

            [[operations]]
            type = "scale"
            factor = 2.0
            factors = [1.0, 2.0, 3.0]
        "#;
        assert!(matches!(load(content, &[]), Err(CliError::Config(_))));
    }

    #[test]
    fn test_empty_job_file_is_rejected() {
        assert!(matches!(load("", &[]), Err(CliError::Config(_))));
    }
}
