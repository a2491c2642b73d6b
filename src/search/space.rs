//! Parameter values, domains and the hyperparameter search space

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SearchError};

/// Parameter value (sampled from a domain or fixed by a model definition)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Categorical(String),
}

impl ParameterValue {
    /// Get as float (converts int to float if needed)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            ParameterValue::Bool(_) | ParameterValue::Categorical(_) => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) => Some(*v as i64),
            ParameterValue::Bool(_) | ParameterValue::Categorical(_) => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Categorical(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{b}"),
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Float(v) => write!(f, "{v:.6}"),
            ParameterValue::Categorical(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Categorical(v.to_string())
    }
}

/// A concrete hyperparameter configuration, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, ParameterValue>);

impl ParamSet {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, name: &str, value: impl Into<ParameterValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Look up a parameter
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    /// Float parameter, or `default` when absent
    pub fn float_or(&self, name: &str, default: f64) -> Result<f64> {
        match self.0.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_float()
                .ok_or_else(|| SearchError::InvalidValue(name.to_string(), v.to_string())),
        }
    }

    /// Integer parameter, or `default` when absent
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.0.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_int()
                .ok_or_else(|| SearchError::InvalidValue(name.to_string(), v.to_string())),
        }
    }

    /// String parameter, or `default` when absent
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        match self.0.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_str()
                .ok_or_else(|| SearchError::InvalidValue(name.to_string(), v.to_string())),
        }
    }

    /// Overlay `other` on top of `self` (values in `other` win)
    pub fn merged(&self, other: &ParamSet) -> ParamSet {
        let mut out = self.clone();
        for (k, v) in &other.0 {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, ParameterValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

/// Parameter domain (search space)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParameterDomain {
    /// Continuous range [low, high], optionally log-scaled
    Continuous {
        low: f64,
        high: f64,
        log_scale: bool,
    },
    /// Discrete integer range [low, high]
    Discrete { low: i64, high: i64 },
    /// Explicit list of values
    Choice { values: Vec<ParameterValue> },
}

impl ParameterDomain {
    /// Shorthand for a list of choices
    pub fn choice<V: Into<ParameterValue>>(values: impl IntoIterator<Item = V>) -> Self {
        ParameterDomain::Choice {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Sample a random value from this domain
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParameterValue {
        match self {
            ParameterDomain::Continuous {
                low,
                high,
                log_scale,
            } => {
                let value = if *log_scale {
                    let log_low = low.ln();
                    let log_high = high.ln();
                    let log_val = log_low + rng.random::<f64>() * (log_high - log_low);
                    log_val.exp()
                } else {
                    low + rng.random::<f64>() * (high - low)
                };
                ParameterValue::Float(value)
            }
            ParameterDomain::Discrete { low, high } => {
                ParameterValue::Int(rng.random_range(*low..=*high))
            }
            ParameterDomain::Choice { values } => {
                let idx = rng.random_range(0..values.len());
                values[idx].clone()
            }
        }
    }

    /// Check if a value is valid for this domain
    pub fn is_valid(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (ParameterDomain::Continuous { low, high, .. }, ParameterValue::Float(v)) => {
                *v >= *low && *v <= *high
            }
            (ParameterDomain::Discrete { low, high }, ParameterValue::Int(v)) => {
                *v >= *low && *v <= *high
            }
            (ParameterDomain::Choice { values }, v) => values.contains(v),
            _ => false,
        }
    }

    fn check(&self, name: &str) -> Result<()> {
        let invalid =
            |msg: &str| Err(SearchError::InvalidDomain(name.to_string(), msg.to_string()));
        match self {
            ParameterDomain::Continuous {
                low,
                high,
                log_scale,
            } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return invalid("expected finite low <= high");
                }
                if *log_scale && *low <= 0.0 {
                    return invalid("log-scaled range must be strictly positive");
                }
                Ok(())
            }
            ParameterDomain::Discrete { low, high } if low > high => {
                invalid("expected low <= high")
            }
            ParameterDomain::Discrete { .. } => Ok(()),
            ParameterDomain::Choice { values } if values.is_empty() => invalid("no choices"),
            ParameterDomain::Choice { .. } => Ok(()),
        }
    }
}

/// Hyperparameter search space
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HyperparameterSpace {
    /// Parameter name -> domain mapping (ordered so sampling is reproducible)
    params: BTreeMap<String, ParameterDomain>,
}

impl HyperparameterSpace {
    /// Create an empty search space
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the search space
    pub fn add(&mut self, name: &str, domain: ParameterDomain) {
        self.params.insert(name.to_string(), domain);
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, name: &str, domain: ParameterDomain) -> Self {
        self.add(name, domain);
        self
    }

    /// Get a parameter domain
    pub fn get(&self, name: &str) -> Option<&ParameterDomain> {
        self.params.get(name)
    }

    /// Check if space is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterate over parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterDomain)> {
        self.params.iter()
    }

    /// Sample a random configuration
    pub fn sample_random<R: Rng>(&self, rng: &mut R) -> ParamSet {
        self.params
            .iter()
            .map(|(name, domain)| (name.clone(), domain.sample(rng)))
            .collect()
    }

    /// Reject malformed domains before any candidate is built
    pub fn check(&self) -> Result<()> {
        self.params
            .iter()
            .try_for_each(|(name, domain)| domain.check(name))
    }

    /// Validate a configuration against the space
    pub fn validate(&self, config: &ParamSet) -> Result<()> {
        for (name, domain) in &self.params {
            match config.get(name) {
                Some(value) if domain.is_valid(value) => {}
                Some(value) => {
                    return Err(SearchError::InvalidValue(name.clone(), format!("{value:?}")))
                }
                None => return Err(SearchError::ParameterNotFound(name.clone())),
            }
        }
        Ok(())
    }
}
