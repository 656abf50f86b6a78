use crate::equation_system::{FixedParameters, ShiftedProductSystem};
use crate::newton::NewtonSettings;
use crate::orchestrator::RunOptions;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Everything a run needs besides seeds and the drive path.
///
/// Every field has a default, so `{}` is a valid configuration and reproduces
/// the stock equation family with a fixed 20-step corrector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parameters: FixedParameters,
    pub newton: NewtonSettings,
    pub run: RunOptions,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Invalid engine configuration.")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize engine configuration.")
    }

    pub fn validate(&self) -> Result<()> {
        self.parameters
            .validate()
            .context("Invalid fixed parameters.")?;
        if self.newton.max_steps == 0 {
            bail!("max_steps must be greater than zero.");
        }
        if !(self.newton.pivot_epsilon >= 0.0) {
            bail!("pivot_epsilon must be non-negative.");
        }
        if let Some(tol) = self.newton.tolerance {
            if !(tol > 0.0) {
                bail!("tolerance must be positive.");
            }
        }
        Ok(())
    }

    /// Builds the equation system described by `parameters`.
    pub fn system(&self) -> Result<ShiftedProductSystem> {
        ShiftedProductSystem::new(self.parameters.clone()).context("Failed to build equation system.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::real;

    #[test]
    fn empty_object_is_the_default_configuration() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.newton.max_steps, 20);
        assert_eq!(config.newton.tolerance, None);
        assert_eq!(config.parameters.left_anchors, vec![real(6.0), real(5.0)]);
        assert_eq!(config.parameters.shifts[2], real(-5.0));
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let json = r#"{
            "parameters": { "left_anchors": [[1.0, 0.0]], "right_anchors": [[0.0, 1.0]] },
            "newton": { "tolerance": 1e-10 },
            "run": { "max_concurrency": 2 }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.parameters.anchor_count(), 1);
        assert_eq!(config.parameters.shifts, FixedParameters::default().shifts);
        assert_eq!(config.newton.max_steps, 20);
        assert_eq!(config.newton.tolerance, Some(1e-10));
        assert_eq!(config.run.max_concurrency, Some(2));
        assert!(config.system().is_ok());
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_invalid_settings() {
        for json in [
            r#"{ "parameters": { "left_anchors": [[1.0, 0.0]], "right_anchors": [] } }"#,
            r#"{ "newton": { "max_steps": 0 } }"#,
            r#"{ "newton": { "tolerance": -1.0 } }"#,
            r#"{ "newton": { "pivot_epsilon": -1.0 } }"#,
            r#"{ "newton": "fast" }"#,
        ] {
            assert!(EngineConfig::from_json_str(json).is_err(), "accepted {}", json);
        }
    }
}
