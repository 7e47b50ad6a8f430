use std::error::Error;

use affinity::AffinityMask;
use serde::Deserialize;
use tmc::domains::DomainList;

////////////////////////////////////////////////////////////////////////////////

/// Domains of a hint, written either as a cpulist string, a single index or
/// a YAML sequence.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum Domains {
    Index(usize),
    List(Vec<usize>),
    Text(String),
}

impl Domains {
    fn to_list(&self) -> Result<DomainList, Box<dyn Error>> {
        let list = match self {
            Self::Index(idx) => DomainList::new(vec![*idx]),
            Self::List(v) => DomainList::new(v.clone()),
            Self::Text(s) => s.parse::<DomainList>()?,
        };

        Ok(list)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Deserialize)]
struct Hint {
    name: String,
    domains: Domains,
}

/// Named affinity hints loaded from YAML.
#[derive(Debug, Deserialize)]
pub struct HintsConfig {
    width: Option<usize>,
    hints: Vec<Hint>,
}

impl HintsConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let file = std::fs::File::open(path)?;
        let config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Returns the configured width, falling back to `default`.
    pub fn width(&self, default: usize) -> usize {
        self.width.unwrap_or(default)
    }

    /// Builds a mask for each hint, in file order.
    pub fn masks(&self, width: usize) -> Result<Vec<(String, AffinityMask)>, Box<dyn Error>> {
        self.hints
            .iter()
            .map(|hint| -> Result<_, Box<dyn Error>> {
                let domains = hint
                    .domains
                    .to_list()
                    .map_err(|err| format!("hint '{}': {err}", hint.name))?;
                let mask = domains
                    .to_mask(width)
                    .map_err(|err| format!("hint '{}': {err}", hint.name))?;
                Ok((hint.name.clone(), mask))
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
