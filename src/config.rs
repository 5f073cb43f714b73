//! Operator and run configuration
//!
//! Operators are configured from a flat list of named parameters, as written
//! in the optimizer's configuration files. Each operator turns that list into
//! a typed record once, at configuration time; mutation never looks at
//! parameter names again.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::SearchContext;
use crate::correlation::target::ProcessingModel;
use crate::error::{OperatorError, ResourceError};
use crate::hyperparameter::adaptive::SelfAdaptation;
use crate::hyperparameter::schedules::StepSizeDecay;

/// Value of a named operator parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterValue {
    DoubleValue(f64),
    IntValue(i64),
    BooleanValue(bool),
    /// Path relative to the run's home folder
    FileValue(PathBuf),
}

/// One named operator parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorParameter {
    pub name: String,
    #[serde(flatten)]
    pub value: ParameterValue,
}

impl OperatorParameter {
    pub fn double(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::DoubleValue(value),
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::IntValue(value),
        }
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::BooleanValue(value),
        }
    }

    pub fn file(name: impl Into<String>, value: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::FileValue(value.into()),
        }
    }
}

/// Parameter names understood by the operators
pub mod names {
    pub const GAMMA: &str = "gamma";
    pub const ALPHA: &str = "alpha";
    pub const BOUNDARY_FOR_SELF_ADAPTATION: &str = "boundaryForSelfAdaptation";
    pub const INCREASE_FOR_HIGHER_SUCCESS_RATE: &str = "increaseForHigherSuccessRate";
    pub const INTERVAL_FOR_SUCCESS_RATE_CALCULATION: &str = "intervalForSuccessRateCalculation";
    pub const P_01: &str = "p_01";
    pub const P_10: &str = "p_10";
    pub const MAX_RATE_OF_SELECTED_FEATURES: &str = "maxRateOfSelectedFeatures";
    pub const PATH_TO_CORRELATION_TABLE: &str = "Path to correlation table";
    pub const PROBABILITY: &str = "Probability";
    pub const STEP_SIZE: &str = "Step size";
    pub const ADAPTATION_FUNCTION_PARAMETER: &str = "Adaptation function parameter";
}

/// Sentinel for "no self-adaptation" in `alpha`
pub const ALPHA_DISABLED: f64 = -1.0;

/// Typed lookups over a parameter list
///
/// The last occurrence of a name wins. Names not asked for are ignored.
#[derive(Clone, Copy, Debug)]
pub struct Parameters<'a> {
    params: &'a [OperatorParameter],
}

impl<'a> Parameters<'a> {
    pub fn new(params: &'a [OperatorParameter]) -> Self {
        Self { params }
    }

    fn find(&self, name: &str) -> Option<&'a ParameterValue> {
        self.params
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Double parameter; integer values are widened
    pub fn double(&self, name: &str) -> Result<Option<f64>, OperatorError> {
        match self.find(name) {
            None => Ok(None),
            Some(ParameterValue::DoubleValue(v)) => Ok(Some(*v)),
            Some(ParameterValue::IntValue(v)) => Ok(Some(*v as f64)),
            Some(_) => Err(type_error(name, "double")),
        }
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, OperatorError> {
        match self.find(name) {
            None => Ok(None),
            Some(ParameterValue::IntValue(v)) => Ok(Some(*v)),
            Some(_) => Err(type_error(name, "integer")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>, OperatorError> {
        match self.find(name) {
            None => Ok(None),
            Some(ParameterValue::BooleanValue(v)) => Ok(Some(*v)),
            Some(_) => Err(type_error(name, "boolean")),
        }
    }

    pub fn file(&self, name: &str) -> Result<Option<&'a Path>, OperatorError> {
        match self.find(name) {
            None => Ok(None),
            Some(ParameterValue::FileValue(v)) => Ok(Some(v.as_path())),
            Some(_) => Err(type_error(name, "file")),
        }
    }

    pub fn require_double(&self, name: &str) -> Result<f64, OperatorError> {
        self.double(name)?
            .ok_or_else(|| OperatorError::MissingParameter(name.to_string()))
    }

    pub fn require_file(&self, name: &str) -> Result<&'a Path, OperatorError> {
        self.file(name)?
            .ok_or_else(|| OperatorError::MissingParameter(name.to_string()))
    }
}

fn type_error(name: &str, expected: &'static str) -> OperatorError {
    OperatorError::ParameterType {
        name: name.to_string(),
        expected,
    }
}

fn invalid(message: String) -> OperatorError {
    OperatorError::InvalidConfiguration(message)
}

fn non_negative(name: &str, value: f64) -> Result<f64, OperatorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{} must be a non-negative number, got {}", name, value)))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<f64, OperatorError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(format!("{} must be in [0, 1], got {}", name, value)))
    }
}

/// Parse the optional success-rate rule shared by the bit-flip operators
///
/// Absent `alpha`, or `alpha == -1`, disables self-adaptation.
pub fn self_adaptation_from(params: &Parameters<'_>) -> Result<Option<SelfAdaptation>, OperatorError> {
    let alpha = match params.double(names::ALPHA)? {
        None => return Ok(None),
        Some(a) if a == ALPHA_DISABLED => return Ok(None),
        Some(a) => a,
    };
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(invalid(format!("alpha must be positive, got {}", alpha)));
    }

    let boundary = params
        .double(names::BOUNDARY_FOR_SELF_ADAPTATION)?
        .unwrap_or(0.2);
    let boundary = unit_interval(names::BOUNDARY_FOR_SELF_ADAPTATION, boundary)?;

    let interval = params
        .int(names::INTERVAL_FOR_SUCCESS_RATE_CALCULATION)?
        .unwrap_or(1);
    if interval < 1 {
        return Err(invalid(format!(
            "{} must be at least 1, got {}",
            names::INTERVAL_FOR_SUCCESS_RATE_CALCULATION,
            interval
        )));
    }

    let increase = params
        .boolean(names::INCREASE_FOR_HIGHER_SUCCESS_RATE)?
        .unwrap_or(true);

    Ok(Some(
        SelfAdaptation::new(alpha)
            .with_boundary(boundary)
            .with_interval(interval as usize)
            .with_increase_for_higher_success_rate(increase),
    ))
}

/// Configuration of the random bit flip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomBitFlipConfig {
    /// Expected number of flips per pass at factor 1
    pub gamma: f64,
    /// Success-rate rule for the flip probability multiplier
    pub self_adaptation: Option<SelfAdaptation>,
}

impl RandomBitFlipConfig {
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            self_adaptation: None,
        }
    }

    pub fn with_self_adaptation(mut self, rule: SelfAdaptation) -> Self {
        self.self_adaptation = Some(rule);
        self
    }

    pub fn from_parameters(params: &[OperatorParameter]) -> Result<Self, OperatorError> {
        let params = Parameters::new(params);
        let gamma = non_negative(names::GAMMA, params.double(names::GAMMA)?.unwrap_or(1.0))?;
        Ok(Self {
            gamma,
            self_adaptation: self_adaptation_from(&params)?,
        })
    }
}

impl Default for RandomBitFlipConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Configuration of the asymmetric bit flip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsymmetricBitFlipConfig {
    /// Weight of 0 → 1 flips
    pub p01: f64,
    /// Weight of 1 → 0 flips
    pub p10: f64,
    /// Global rate multiplier (1 unless configured)
    pub gamma: f64,
    /// Upper bound on the share of selected slots after a pass
    pub max_rate_of_selected_features: f64,
    pub self_adaptation: Option<SelfAdaptation>,
}

impl AsymmetricBitFlipConfig {
    pub fn new(p01: f64, p10: f64) -> Self {
        Self {
            p01,
            p10,
            gamma: 1.0,
            max_rate_of_selected_features: 1.0,
            self_adaptation: None,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_max_rate_of_selected_features(mut self, rate: f64) -> Self {
        self.max_rate_of_selected_features = rate;
        self
    }

    pub fn with_self_adaptation(mut self, rule: SelfAdaptation) -> Self {
        self.self_adaptation = Some(rule);
        self
    }

    pub fn from_parameters(params: &[OperatorParameter]) -> Result<Self, OperatorError> {
        let params = Parameters::new(params);
        let p01 = non_negative(names::P_01, params.require_double(names::P_01)?)?;
        let p10 = non_negative(names::P_10, params.require_double(names::P_10)?)?;
        let gamma = non_negative(names::GAMMA, params.double(names::GAMMA)?.unwrap_or(1.0))?;
        let max_rate = params
            .double(names::MAX_RATE_OF_SELECTED_FEATURES)?
            .unwrap_or(1.0);
        let max_rate = unit_interval(names::MAX_RATE_OF_SELECTED_FEATURES, max_rate)?;
        Ok(Self {
            p01,
            p10,
            gamma,
            max_rate_of_selected_features: max_rate,
            self_adaptation: self_adaptation_from(&params)?,
        })
    }
}

/// Sources for building a correlation table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTableConfig {
    /// Coefficient file, resolved against the home folder
    pub coefficients: PathBuf,
    /// Feature table defining dimension offsets
    pub feature_table: PathBuf,
    /// Replicated copies per raw dimension
    pub replication_factor: usize,
}

impl CorrelationTableConfig {
    pub fn from_parameters(
        params: &[OperatorParameter],
        context: &SearchContext,
    ) -> Result<Self, OperatorError> {
        let params = Parameters::new(params);
        let coefficients =
            context.resolve_path(params.require_file(names::PATH_TO_CORRELATION_TABLE)?);
        let run = context.configuration();
        let feature_table = run
            .feature_table
            .as_ref()
            .map(|p| context.resolve_path(p))
            .ok_or_else(|| OperatorError::MissingParameter(RunConfiguration::FEATURE_TABLE.to_string()))?;
        Ok(Self {
            coefficients,
            feature_table,
            replication_factor: run.effective_replication_factor(),
        })
    }
}

/// How IntegerMutation adapts its expected step size
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSizeAdaptation {
    /// Follow a fixed decay curve over the run
    Decay(StepSizeDecay),
    /// Rescale with [`rescale_step_size`] at the end of every interval;
    /// only the rule's alpha, boundary and interval apply
    ///
    /// [`rescale_step_size`]: crate::operators::integer::rescale_step_size
    SuccessRate(SelfAdaptation),
}

/// Configuration of the integer mutation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegerMutationConfig {
    /// Probability that a call mutates at all
    pub probability: f64,
    /// Size of one discrete step
    pub step_size: f64,
    pub adaptation: StepSizeAdaptation,
}

impl IntegerMutationConfig {
    pub fn new(probability: f64, step_size: f64, adaptation: StepSizeAdaptation) -> Self {
        Self {
            probability,
            step_size,
            adaptation,
        }
    }

    /// Parse the parameter list
    ///
    /// `alpha == -1` (or no `alpha`) selects the decay curve, which then
    /// requires the adaptation function parameter; any other `alpha` selects
    /// the success rule.
    pub fn from_parameters(params: &[OperatorParameter]) -> Result<Self, OperatorError> {
        let params = Parameters::new(params);
        let probability = unit_interval(
            names::PROBABILITY,
            params.double(names::PROBABILITY)?.unwrap_or(1.0),
        )?;
        let step_size = params.double(names::STEP_SIZE)?.unwrap_or(1.0);
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(invalid(format!("{} must be positive, got {}", names::STEP_SIZE, step_size)));
        }

        let adaptation = match params.double(names::ALPHA)? {
            Some(alpha) if alpha != ALPHA_DISABLED => {
                if !(alpha.is_finite() && alpha > 0.0) {
                    return Err(invalid(format!("alpha must be positive, got {}", alpha)));
                }
                StepSizeAdaptation::SuccessRate(SelfAdaptation::one_fifth(alpha))
            }
            _ => {
                let base = params.require_double(names::ADAPTATION_FUNCTION_PARAMETER)?;
                if !(base > 0.0 && base < 1.0) {
                    return Err(invalid(format!(
                        "{} must be in (0, 1), got {}",
                        names::ADAPTATION_FUNCTION_PARAMETER,
                        base
                    )));
                }
                StepSizeAdaptation::Decay(StepSizeDecay::new(base))
            }
        };

        Ok(Self {
            probability,
            step_size,
            adaptation,
        })
    }
}

/// Run-level constants operators may consult
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RunConfiguration {
    /// Feature table listing `(id, dimension count)` in order
    pub feature_table: Option<PathBuf>,
    /// Maximum factor of generated features related to the raw feature set
    pub replication_factor: Option<usize>,
    /// Training category, e.g. `"12"` or `"12[...]"`
    pub training_input: Option<String>,
    /// Annotation table listing categories
    pub annotation_table: Option<PathBuf>,
    /// Root the music files live under
    pub music_database: Option<PathBuf>,
    /// Root of the processed-feature files
    pub processed_feature_database: Option<PathBuf>,
    /// Processing chain the features were produced with
    pub processing: Option<ProcessingModel>,
}

impl RunConfiguration {
    pub const FEATURE_TABLE: &'static str = "Feature table";

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ResourceError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| ResourceError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replication factor, where an absent or zero value means 1
    pub fn effective_replication_factor(&self) -> usize {
        match self.replication_factor {
            None | Some(0) => 1,
            Some(f) => f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_json_shape() {
        let json = r#"[
            {"name": "gamma", "doubleValue": 2.0},
            {"name": "intervalForSuccessRateCalculation", "intValue": 5},
            {"name": "increaseForHigherSuccessRate", "booleanValue": false},
            {"name": "Path to correlation table", "fileValue": "corr.csv"}
        ]"#;
        let params: Vec<OperatorParameter> = serde_json::from_str(json).unwrap();
        assert_eq!(params[0], OperatorParameter::double("gamma", 2.0));
        assert_eq!(params[1], OperatorParameter::int("intervalForSuccessRateCalculation", 5));
        assert_eq!(params[2], OperatorParameter::boolean("increaseForHigherSuccessRate", false));
        assert_eq!(params[3], OperatorParameter::file("Path to correlation table", "corr.csv"));
    }

    #[test]
    fn test_parameters_type_errors() {
        let list = vec![OperatorParameter::boolean("gamma", true)];
        let params = Parameters::new(&list);
        assert!(matches!(
            params.double("gamma"),
            Err(OperatorError::ParameterType { .. })
        ));
        assert_eq!(params.double("missing").unwrap(), None);
        assert!(matches!(
            params.require_double("missing"),
            Err(OperatorError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_int_widens_to_double() {
        let list = vec![OperatorParameter::int("gamma", 3)];
        assert_eq!(Parameters::new(&list).double("gamma").unwrap(), Some(3.0));
    }

    #[test]
    fn test_random_bit_flip_config() {
        let config = RandomBitFlipConfig::from_parameters(&[
            OperatorParameter::double("gamma", 4.0),
            OperatorParameter::double("alpha", 1.5),
            OperatorParameter::double("boundaryForSelfAdaptation", 0.3),
            OperatorParameter::int("intervalForSuccessRateCalculation", 10),
            OperatorParameter::boolean("increaseForHigherSuccessRate", false),
        ])
        .unwrap();
        assert_eq!(config.gamma, 4.0);
        let rule = config.self_adaptation.unwrap();
        assert_eq!(rule.alpha, 1.5);
        assert_eq!(rule.boundary, 0.3);
        assert_eq!(rule.interval, 10);
        assert!(!rule.increase_for_higher_success_rate);
    }

    #[test]
    fn test_alpha_sentinel_disables_adaptation() {
        let config = RandomBitFlipConfig::from_parameters(&[
            OperatorParameter::double("gamma", 1.0),
            OperatorParameter::double("alpha", -1.0),
        ])
        .unwrap();
        assert!(config.self_adaptation.is_none());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = RandomBitFlipConfig::from_parameters(&[
            OperatorParameter::double("alpha", 1.2),
            OperatorParameter::int("intervalForSuccessRateCalculation", 0),
        ]);
        assert!(matches!(result, Err(OperatorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_asymmetric_requires_probabilities() {
        let result = AsymmetricBitFlipConfig::from_parameters(&[OperatorParameter::double("p_01", 0.5)]);
        assert_eq!(result, Err(OperatorError::MissingParameter("p_10".to_string())));

        let config = AsymmetricBitFlipConfig::from_parameters(&[
            OperatorParameter::double("p_01", 0.5),
            OperatorParameter::double("p_10", 2.0),
            OperatorParameter::double("maxRateOfSelectedFeatures", 0.25),
        ])
        .unwrap();
        assert_eq!(config.gamma, 1.0);
        assert_eq!(config.max_rate_of_selected_features, 0.25);
    }

    #[test]
    fn test_integer_mutation_modes() {
        let decay = IntegerMutationConfig::from_parameters(&[
            OperatorParameter::double("Probability", 0.5),
            OperatorParameter::double("Step size", 10.0),
            OperatorParameter::double("alpha", -1.0),
            OperatorParameter::double("Adaptation function parameter", 0.9),
        ])
        .unwrap();
        assert!(matches!(decay.adaptation, StepSizeAdaptation::Decay(_)));

        let rule = IntegerMutationConfig::from_parameters(&[
            OperatorParameter::double("Step size", 10.0),
            OperatorParameter::double("alpha", 1.3),
        ])
        .unwrap();
        match rule.adaptation {
            StepSizeAdaptation::SuccessRate(r) => {
                assert_eq!(r.interval, 5);
                assert_eq!(r.boundary, 0.2);
            }
            other => panic!("unexpected adaptation {:?}", other),
        }
    }

    #[test]
    fn test_integer_mutation_decay_needs_parameter() {
        let result = IntegerMutationConfig::from_parameters(&[OperatorParameter::double("Step size", 1.0)]);
        assert_eq!(
            result,
            Err(OperatorError::MissingParameter("Adaptation function parameter".to_string()))
        );
    }

    #[test]
    fn test_correlation_table_config_resolves_paths() {
        let run = RunConfiguration {
            feature_table: Some(PathBuf::from("features.csv")),
            replication_factor: Some(0),
            ..Default::default()
        };
        let ctx = SearchContext::new(10, 5)
            .with_home_folder("/home/run")
            .with_configuration(run);
        let config = CorrelationTableConfig::from_parameters(
            &[OperatorParameter::file("Path to correlation table", "corr.csv")],
            &ctx,
        )
        .unwrap();
        assert_eq!(config.coefficients, PathBuf::from("/home/run/corr.csv"));
        assert_eq!(config.feature_table, PathBuf::from("/home/run/features.csv"));
        assert_eq!(config.replication_factor, 1);
    }

    #[test]
    fn test_correlation_table_config_needs_feature_table() {
        let ctx = SearchContext::new(10, 5);
        let result = CorrelationTableConfig::from_parameters(
            &[OperatorParameter::file("Path to correlation table", "corr.csv")],
            &ctx,
        );
        assert_eq!(
            result,
            Err(OperatorError::MissingParameter("Feature table".to_string()))
        );
    }

    #[test]
    fn test_run_configuration_json() {
        let json = r#"{"feature_table": "ft.csv", "replication_factor": 2}"#;
        let run: RunConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(run.feature_table, Some(PathBuf::from("ft.csv")));
        assert_eq!(run.effective_replication_factor(), 2);
        assert!(run.training_input.is_none());
    }
}
