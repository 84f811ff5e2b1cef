// src/config.rs

//! Configuration for natural-gradient ICA.

use crate::error::{IcaError, Result};
use crate::score::ScoreFunction;
use ndarray::Array2;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Orientation of the observed signal matrix.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignalLayout {
    /// One row per channel, one column per sample.
    #[default]
    ChannelsBySamples,
    /// One row per sample, one column per channel (e.g. decoded audio frames).
    SamplesByChannels,
}

/// Configuration parameters for natural-gradient ICA.
///
/// | Field | Default |
/// |---|---|
/// | `step_size` | `0.1` |
/// | `n_iter` | `100` |
/// | `score` | [`ScoreFunction::Laplace`] |
/// | `back_projection_channel` | `1` |
/// | `track_cost` | `false` |
/// | `w_init` | `None` (standard normal entries) |
/// | `random_state` | `None` |
/// | `layout` | [`SignalLayout::ChannelsBySamples`] |
/// | `verbose` | `false` |
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug)]
pub struct IcaConfig {
    /// Step size of the natural-gradient update.
    pub step_size: f64,

    /// Number of iterations. There is no early stopping.
    pub n_iter: usize,

    /// Score function, i.e. the assumed source density.
    pub score: ScoreFunction,

    /// Reference channel for back-projection (1-based).
    /// 0 normalizes the estimate to a unit peak instead.
    pub back_projection_channel: usize,

    /// If true, record the cost before the first and after every iteration.
    pub track_cost: bool,

    /// Initial demixing matrix. If None, uses random initialization.
    pub w_init: Option<Array2<f64>>,

    /// Random seed for reproducibility.
    pub random_state: Option<u64>,

    /// Orientation of the observed signal and of the returned estimate.
    pub layout: SignalLayout,

    /// If true, log per-iteration progress at info level.
    pub verbose: bool,
}

impl Default for IcaConfig {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            n_iter: 100,
            score: ScoreFunction::default(),
            back_projection_channel: 1,
            track_cost: false,
            w_init: None,
            random_state: None,
            layout: SignalLayout::default(),
            verbose: false,
        }
    }
}

impl IcaConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Validate the parameters that do not depend on the signal.
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(IcaError::InvalidConfig {
                parameter: "step_size".into(),
                message: format!("must be a positive finite number, got {}", self.step_size),
            });
        }

        if self.n_iter == 0 {
            return Err(IcaError::InvalidConfig {
                parameter: "n_iter".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(())
    }

    /// Check the parameters that depend on the channel count.
    pub(crate) fn validate_for_channels(&self, n_channels: usize) -> Result<()> {
        if n_channels < 2 {
            return Err(IcaError::InputShape {
                message: format!("at least 2 channels are required, got {}", n_channels),
            });
        }

        if let Some(w) = &self.w_init {
            if w.shape() != [n_channels, n_channels] {
                return Err(IcaError::InputShape {
                    message: format!(
                        "w_init shape {:?} doesn't match expected ({}, {})",
                        w.shape(),
                        n_channels,
                        n_channels
                    ),
                });
            }
            if w.iter().any(|v| !v.is_finite()) {
                return Err(IcaError::InputShape {
                    message: "w_init contains non-finite values".into(),
                });
            }
        }

        if self.back_projection_channel > n_channels {
            return Err(IcaError::BackProjectionChannelOutOfRange {
                channel: self.back_projection_channel,
                n_channels,
            });
        }

        Ok(())
    }
}

/// Builder for constructing `IcaConfig` with a fluent API.
#[derive(Default)]
pub struct ConfigBuilder {
    config: IcaConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: IcaConfig::default(),
        }
    }

    /// Set the step size.
    pub fn step_size(mut self, step_size: f64) -> Self {
        self.config.step_size = step_size;
        self
    }

    /// Set the number of iterations.
    pub fn n_iter(mut self, n_iter: usize) -> Self {
        self.config.n_iter = n_iter;
        self
    }

    /// Set the score function.
    pub fn score(mut self, score: ScoreFunction) -> Self {
        self.config.score = score;
        self
    }

    /// Set the back-projection reference channel (1-based, 0 to normalize).
    pub fn back_projection_channel(mut self, channel: usize) -> Self {
        self.config.back_projection_channel = channel;
        self
    }

    /// Enable or disable cost tracking.
    pub fn track_cost(mut self, track_cost: bool) -> Self {
        self.config.track_cost = track_cost;
        self
    }

    /// Set the initial demixing matrix.
    pub fn w_init(mut self, w_init: Array2<f64>) -> Self {
        self.config.w_init = Some(w_init);
        self
    }

    /// Set the random seed.
    pub fn random_state(mut self, seed: u64) -> Self {
        self.config.random_state = Some(seed);
        self
    }

    /// Set the signal orientation.
    pub fn layout(mut self, layout: SignalLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Enable or disable verbose progress logging.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> IcaConfig {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<IcaConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IcaConfig::default();
        assert_eq!(config.step_size, 0.1);
        assert_eq!(config.n_iter, 100);
        assert_eq!(config.score, ScoreFunction::Laplace);
        assert_eq!(config.back_projection_channel, 1);
        assert!(!config.track_cost);
        assert!(config.w_init.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = IcaConfig::builder()
            .step_size(0.05)
            .n_iter(250)
            .score(ScoreFunction::Cosh)
            .back_projection_channel(0)
            .track_cost(true)
            .random_state(7)
            .layout(SignalLayout::SamplesByChannels)
            .build_validated()
            .unwrap();

        assert_eq!(config.step_size, 0.05);
        assert_eq!(config.n_iter, 250);
        assert_eq!(config.score, ScoreFunction::Cosh);
        assert_eq!(config.back_projection_channel, 0);
        assert!(config.track_cost);
        assert_eq!(config.random_state, Some(7));
        assert_eq!(config.layout, SignalLayout::SamplesByChannels);
    }

    #[test]
    fn test_invalid_step_size() {
        for step in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let result = IcaConfig::builder().step_size(step).build_validated();
            assert!(
                matches!(result, Err(IcaError::InvalidConfig { ref parameter, .. }) if parameter == "step_size"),
                "step {step} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_iterations() {
        let result = IcaConfig::builder().n_iter(0).build_validated();
        assert!(matches!(result, Err(IcaError::InvalidConfig { .. })));
    }

    #[test]
    fn test_single_channel_rejected() {
        let config = IcaConfig::default();
        assert!(matches!(
            config.validate_for_channels(1),
            Err(IcaError::InputShape { .. })
        ));
    }

    #[test]
    fn test_w_init_shape_mismatch() {
        let config = IcaConfig::builder().w_init(Array2::eye(2)).build();
        assert!(matches!(
            config.validate_for_channels(3),
            Err(IcaError::InputShape { .. })
        ));

        let config = IcaConfig::builder().w_init(Array2::zeros((3, 2))).build();
        assert!(matches!(
            config.validate_for_channels(3),
            Err(IcaError::InputShape { .. })
        ));
    }

    #[test]
    fn test_channel_selector_range() {
        let config = IcaConfig::builder().back_projection_channel(3).build();
        assert!(config.validate_for_channels(3).is_ok());

        let config = IcaConfig::builder().back_projection_channel(4).build();
        assert!(matches!(
            config.validate_for_channels(3),
            Err(IcaError::BackProjectionChannelOutOfRange {
                channel: 4,
                n_channels: 3
            })
        ));
    }
}
