//! Estimation configuration: `key = value` parsing and validation.
//!
//! Keys are case-insensitive, `#` starts a comment, and the four
//! effect-list keys take brace-delimited sets that may span lines:
//!
//! ```text
//! samplerSteps = 2000           # proposals per sweep
//! structParams = {Arc, Reciprocity,
//!                 AltInStars}
//! attrParams   = {Sender(smoker), Matching(region)}
//! ```
//!
//! Parsing is purely syntactic; [`EstimConfig::validate`] enforces the
//! cross-key rules before any file is opened.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;

/// One element of an effect list: the effect name and its attribute or
/// covariate arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EffectSpec {
    /// Catalog name, e.g. `Reciprocity` or `Sender`.
    pub name: String,
    /// Attribute column names bound at resolution time.
    pub args: Vec<String>,
}

/// A parsed estimation configuration with defaults for every omitted key.
#[derive(Clone, Debug)]
pub struct EstimConfig {
    /// Step multiplier for the seed phase.
    pub aca_s: f64,
    /// Step multiplier for the equilibrium phase.
    pub aca_ee: f64,
    /// Target coefficient of variation for θ.
    pub comp_c: f64,
    /// Proposals per sweep (m).
    pub sampler_steps: u64,
    /// Seed-phase step count per node (M₁ = ⌊Ssteps · n / m⌋).
    pub s_steps: u64,
    /// Equilibrium outer iterations.
    pub ee_steps: u64,
    /// Equilibrium inner iterations.
    pub ee_inner_steps: u64,
    /// Emit every inner iteration instead of one row per outer pass.
    pub output_all_steps: bool,
    /// Use the fixed-density sampler.
    pub use_ifd_sampler: bool,
    /// Step scale for the fixed-density auxiliary parameter.
    pub ifd_k: f64,
    /// Write the final simulated network.
    pub output_simulated_network: bool,
    /// Snowball-conditional estimation.
    pub use_conditional_estimation: bool,
    /// Reject add proposals that would close a mutual dyad.
    pub forbid_reciprocity: bool,
    /// Floor on |mean θ| in the step-scale retuning.
    pub theta_mean_floor: f64,
    /// σ threshold below which a θ window skips retuning.
    pub theta_sd_threshold: f64,
    /// Decay λ for the alternating statistics.
    pub alternating_lambda: f64,
    /// Base PRNG seed; tasks mix in their id. Entropy when absent.
    pub rng_seed: Option<u64>,
    /// Observed network, Pajek arc list.
    pub arclist_file: Option<PathBuf>,
    /// Binary attribute table.
    pub binattr_file: Option<PathBuf>,
    /// Categorical attribute table.
    pub catattr_file: Option<PathBuf>,
    /// Continuous attribute table.
    pub contattr_file: Option<PathBuf>,
    /// Set attribute table.
    pub setattr_file: Option<PathBuf>,
    /// Snowball zone file.
    pub zone_file: Option<PathBuf>,
    /// Prefix of the θ output stream.
    pub theta_file_prefix: String,
    /// Prefix of the accumulated-drift output stream.
    pub dza_file_prefix: String,
    /// Prefix of the simulated-network output.
    pub sim_net_file_prefix: String,
    /// Structural effects, in configured order.
    pub struct_params: Vec<EffectSpec>,
    /// Attribute effects.
    pub attr_params: Vec<EffectSpec>,
    /// Dyadic-covariate effects.
    pub dyadic_params: Vec<EffectSpec>,
    /// Attribute-interaction effects.
    pub attr_interaction_params: Vec<EffectSpec>,
    /// Declared but inert; retained for forward compatibility.
    pub borisenko_update: Option<bool>,
    /// Declared but inert; retained for forward compatibility.
    pub learning_rate: Option<f64>,
    /// Declared but inert; retained for forward compatibility.
    pub min_theta: Option<f64>,
}

impl Default for EstimConfig {
    fn default() -> Self {
        Self {
            aca_s: 0.1,
            aca_ee: 1e-9,
            comp_c: 1e-2,
            sampler_steps: 1000,
            s_steps: 100,
            ee_steps: 500,
            ee_inner_steps: 100,
            output_all_steps: false,
            use_ifd_sampler: false,
            ifd_k: 0.1,
            output_simulated_network: false,
            use_conditional_estimation: false,
            forbid_reciprocity: false,
            theta_mean_floor: 0.1,
            theta_sd_threshold: 1e-10,
            alternating_lambda: 2.0,
            rng_seed: None,
            arclist_file: None,
            binattr_file: None,
            catattr_file: None,
            contattr_file: None,
            setattr_file: None,
            zone_file: None,
            theta_file_prefix: "theta_values".to_owned(),
            dza_file_prefix: "dzA_values".to_owned(),
            sim_net_file_prefix: "sim_network".to_owned(),
            struct_params: Vec::new(),
            attr_params: Vec::new(),
            dyadic_params: Vec::new(),
            attr_interaction_params: Vec::new(),
            borisenko_update: None,
            learning_rate: None,
            min_theta: None,
        }
    }
}

impl EstimConfig {
    /// Parses a configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on I/O failure or any syntactic problem,
    /// with the offending line number.
    pub fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed lines, unknown keys, or
    /// values that do not parse as the key's type.
    pub fn parse_str(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let lines: Vec<&str> = text.lines().collect();
        let mut index = 0;
        while index < lines.len() {
            let stripped = strip_comment(lines[index]);
            let trimmed = stripped.trim();
            let line_no = index + 1;
            if trimmed.is_empty() {
                index += 1;
                continue;
            }
            let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
                return Err(ConfigError::Syntax {
                    line: line_no,
                    reason: format!("expected `key = value`, found `{trimmed}`"),
                });
            };
            let key = raw_key.trim().to_ascii_lowercase();
            let mut value = raw_value.trim().to_owned();
            if value.starts_with('{') {
                while !value.contains('}') {
                    index += 1;
                    let Some(next) = lines.get(index) else {
                        return Err(ConfigError::Syntax {
                            line: line_no,
                            reason: format!("unterminated set for key `{}`", raw_key.trim()),
                        });
                    };
                    value.push(' ');
                    value.push_str(strip_comment(next).trim());
                }
            }
            config.apply(&key, raw_key.trim(), &value, line_no)?;
            index += 1;
        }
        Ok(config)
    }

    fn apply(
        &mut self,
        key: &str,
        key_as_written: &str,
        value: &str,
        line: usize,
    ) -> Result<(), ConfigError> {
        match key {
            "aca_s" => self.aca_s = parse_f64(key, value, line)?,
            "aca_ee" => self.aca_ee = parse_f64(key, value, line)?,
            "compc" => self.comp_c = parse_f64(key, value, line)?,
            "samplersteps" => self.sampler_steps = parse_u64(key, value, line)?,
            "ssteps" => self.s_steps = parse_u64(key, value, line)?,
            "eesteps" => self.ee_steps = parse_u64(key, value, line)?,
            "eeinnersteps" => self.ee_inner_steps = parse_u64(key, value, line)?,
            "outputallsteps" => self.output_all_steps = parse_bool(key, value, line)?,
            "useifdsampler" => self.use_ifd_sampler = parse_bool(key, value, line)?,
            "ifd_k" => self.ifd_k = parse_f64(key, value, line)?,
            "outputsimulatednetwork" => {
                self.output_simulated_network = parse_bool(key, value, line)?;
            }
            "useconditionalestimation" => {
                self.use_conditional_estimation = parse_bool(key, value, line)?;
            }
            "forbidreciprocity" => self.forbid_reciprocity = parse_bool(key, value, line)?,
            "thetameanfloor" => self.theta_mean_floor = parse_f64(key, value, line)?,
            "thetasdthreshold" => self.theta_sd_threshold = parse_f64(key, value, line)?,
            "alternatinglambda" => {
                let lambda = parse_f64(key, value, line)?;
                if lambda <= 1.0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_owned(),
                        value: value.to_owned(),
                        line,
                    });
                }
                self.alternating_lambda = lambda;
            }
            "rngseed" => self.rng_seed = Some(parse_u64(key, value, line)?),
            "arclistfile" => self.arclist_file = Some(PathBuf::from(value)),
            "binattrfile" => self.binattr_file = Some(PathBuf::from(value)),
            "catattrfile" => self.catattr_file = Some(PathBuf::from(value)),
            "contattrfile" => self.contattr_file = Some(PathBuf::from(value)),
            "setattrfile" => self.setattr_file = Some(PathBuf::from(value)),
            "zonefile" => self.zone_file = Some(PathBuf::from(value)),
            "thetafileprefix" => self.theta_file_prefix = value.to_owned(),
            "dzafileprefix" => self.dza_file_prefix = value.to_owned(),
            "simnetfileprefix" => self.sim_net_file_prefix = value.to_owned(),
            "structparams" => self.struct_params = parse_effect_set(value, line)?,
            "attrparams" => self.attr_params = parse_effect_set(value, line)?,
            "dyadicparams" => self.dyadic_params = parse_effect_set(value, line)?,
            "attrinteractionparams" => {
                self.attr_interaction_params = parse_effect_set(value, line)?;
            }
            "useborisenkoupdate" => self.borisenko_update = Some(parse_bool(key, value, line)?),
            "learningrate" => self.learning_rate = Some(parse_f64(key, value, line)?),
            "mintheta" => self.min_theta = Some(parse_f64(key, value, line)?),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key_as_written.to_owned(),
                    line,
                });
            }
        }
        Ok(())
    }

    /// Enforces the cross-key rules.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a required key is missing or two
    /// options cannot be combined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arclist_file.is_none() {
            return Err(ConfigError::MissingKey {
                key: "arclistFile",
            });
        }
        if self.sampler_steps == 0 {
            return Err(ConfigError::IncompatibleOptions {
                reason: "samplerSteps must be positive".to_owned(),
            });
        }
        if self.use_ifd_sampler && self.struct_params.iter().any(|s| s.name == "Arc") {
            return Err(ConfigError::IncompatibleOptions {
                reason: "the IFD sampler's auxiliary parameter replaces the Arc effect; \
                         remove Arc from structParams"
                    .to_owned(),
            });
        }
        if self.use_ifd_sampler && self.use_conditional_estimation {
            return Err(ConfigError::IncompatibleOptions {
                reason: "the IFD sampler does not support conditional estimation".to_owned(),
            });
        }
        if self.use_conditional_estimation && self.forbid_reciprocity {
            return Err(ConfigError::IncompatibleOptions {
                reason: "forbidReciprocity cannot be combined with conditional estimation"
                    .to_owned(),
            });
        }
        if self.use_conditional_estimation && self.zone_file.is_none() {
            return Err(ConfigError::MissingKey { key: "zoneFile" });
        }
        if self.borisenko_update.is_some()
            || self.learning_rate.is_some()
            || self.min_theta.is_some()
        {
            warn!(
                "useBorisenkoUpdate, learningRate, and minTheta are declared \
                 but not consulted by the estimator"
            );
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default()
}

fn parse_f64(key: &str, value: &str, line: usize) -> Result<f64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        line,
    })
}

fn parse_u64(key: &str, value: &str, line: usize) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        line,
    })
}

fn parse_bool(key: &str, value: &str, line: usize) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            line,
        }),
    }
}

/// Parses `{A, B(x), C(x, y)}` into effect specs, splitting on commas
/// outside parentheses only.
fn parse_effect_set(value: &str, line: usize) -> Result<Vec<EffectSpec>, ConfigError> {
    let syntax = |reason: String| ConfigError::Syntax { line, reason };
    let inner = value
        .strip_prefix('{')
        .and_then(|rest| rest.trim_end().strip_suffix('}'))
        .ok_or_else(|| syntax(format!("expected a brace-delimited set, found `{value}`")))?;

    let mut specs = Vec::new();
    for element in split_top_level(inner) {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }
        specs.push(parse_effect_spec(element, line)?);
    }
    Ok(specs)
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_effect_spec(element: &str, line: usize) -> Result<EffectSpec, ConfigError> {
    let syntax = |reason: String| ConfigError::Syntax { line, reason };
    let Some((name, rest)) = element.split_once('(') else {
        return Ok(EffectSpec {
            name: element.to_owned(),
            args: Vec::new(),
        });
    };
    let args_text = rest
        .strip_suffix(')')
        .ok_or_else(|| syntax(format!("unbalanced parentheses in `{element}`")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(syntax(format!("missing effect name in `{element}`")));
    }
    let args: Vec<String> = args_text
        .split(',')
        .map(|arg| arg.trim().to_owned())
        .collect();
    if args.iter().any(String::is_empty) {
        return Err(syntax(format!("empty argument in `{element}`")));
    }
    Ok(EffectSpec {
        name: name.to_owned(),
        args,
    })
}
