use crate::core::utils::geometry::{Axis, FaceSelector};
use crate::core::utils::tolerance::Tolerance;
use nalgebra::Vector3;
use thiserror::Error;

/// Diameter assigned to edges that never had one.
pub const DEFAULT_DIAMETER: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeConfig {
    pub tolerance: Tolerance,
    pub default_diameter: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            default_diameter: DEFAULT_DIAMETER,
        }
    }
}

#[derive(Default)]
pub struct LatticeConfigBuilder {
    tolerance: Option<f64>,
    default_diameter: Option<f64>,
}

impl LatticeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tolerance(mut self, epsilon: f64) -> Self {
        self.tolerance = Some(epsilon);
        self
    }
    pub fn default_diameter(mut self, diameter: f64) -> Self {
        self.default_diameter = Some(diameter);
        self
    }

    pub fn build(self) -> Result<LatticeConfig, ConfigError> {
        let epsilon = self
            .tolerance
            .ok_or(ConfigError::MissingParameter("tolerance"))?;
        let tolerance = Tolerance::new(epsilon).map_err(|e| ConfigError::InvalidParameter {
            name: "tolerance",
            reason: e.to_string(),
        })?;

        let default_diameter = self
            .default_diameter
            .ok_or(ConfigError::MissingParameter("default_diameter"))?;
        if !(default_diameter.is_finite() && default_diameter > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "default_diameter",
                reason: format!("must be finite and positive, got {}", default_diameter),
            });
        }

        Ok(LatticeConfig {
            tolerance,
            default_diameter,
        })
    }
}

/// How a diameter function interprets each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMode {
    /// `f(x, y, z)` of the edge midpoint.
    Position,
    /// `f(azimuth, inclination)` of the edge direction relative to `reference`.
    Orientation { reference: Axis },
}

/// One step of a build pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Translate(Vector3<f64>),
    Scale(Vector3<f64>),
    Flip(Axis),
    Mirror(FaceSelector),
    Tessellate([i64; 3]),
    /// Every edge gets `value`.
    DiameterConstant { value: f64, mode: DistributionMode },
    /// Linear interpolation from `from` to `to` across the unit's extents
    /// along `axis`, evaluated at each edge midpoint.
    DiameterGradient { axis: Axis, from: f64, to: f64 },
    /// Interpolates on `|cos(inclination)|`: edges parallel to `reference`
    /// get `aligned`, edges perpendicular to it get `perpendicular`.
    DiameterByInclination {
        reference: Axis,
        aligned: f64,
        perpendicular: f64,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Translate(_) => "translate",
            Operation::Scale(_) => "scale",
            Operation::Flip(_) => "flip",
            Operation::Mirror(_) => "mirror",
            Operation::Tessellate(_) => "tessellate",
            Operation::DiameterConstant { .. } => "diameter-constant",
            Operation::DiameterGradient { .. } => "diameter-gradient",
            Operation::DiameterByInclination { .. } => "diameter-by-inclination",
        }
    }

    pub fn uniform_scale(factor: f64) -> Self {
        Operation::Scale(Vector3::repeat(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_config_with_all_parameters() {
        let config = LatticeConfigBuilder::new()
            .tolerance(1e-4)
            .default_diameter(0.2)
            .build()
            .unwrap();
        assert_eq!(config.tolerance.value(), 1e-4);
        assert_eq!(config.default_diameter, 0.2);
    }

    #[test]
    fn builder_reports_missing_parameters() {
        let err = LatticeConfigBuilder::new().default_diameter(0.2).build();
        assert_eq!(err, Err(ConfigError::MissingParameter("tolerance")));

        let err = LatticeConfigBuilder::new().tolerance(1e-6).build();
        assert_eq!(err, Err(ConfigError::MissingParameter("default_diameter")));
    }

    #[test]
    fn builder_rejects_non_positive_values() {
        let err = LatticeConfigBuilder::new()
            .tolerance(0.0)
            .default_diameter(0.2)
            .build();
        assert!(matches!(
            err,
            Err(ConfigError::InvalidParameter {
                name: "tolerance",
                ..
            })
        ));

        let err = LatticeConfigBuilder::new()
            .tolerance(1e-6)
            .default_diameter(f64::NAN)
            .build();
        assert!(matches!(
            err,
            Err(ConfigError::InvalidParameter {
                name: "default_diameter",
                ..
            })
        ));
    }

    #[test]
    fn operation_names_are_kebab_case() {
        assert_eq!(Operation::uniform_scale(2.0).name(), "scale");
        assert_eq!(
            Operation::DiameterConstant {
                value: 0.1,
                mode: DistributionMode::Position
            }
            .name(),
            "diameter-constant"
        );
    }
}
