//! Version naming for the Black Duck project version.

use std::str::FromStr;

/// How much of the artifact version names the Black Duck project version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersioningModel {
    Full,
    Semantic,
    MajorMinor,
    Major,
}

impl VersioningModel {
    /// Number of leading components kept, `None` for the full version.
    fn components(&self) -> Option<usize> {
        match self {
            VersioningModel::Full => None,
            VersioningModel::Semantic => Some(3),
            VersioningModel::MajorMinor => Some(2),
            VersioningModel::Major => Some(1),
        }
    }

    /// Shape `version` according to the model.
    ///
    /// Pre-release and build suffixes are dropped for every model but `Full`;
    /// missing components are filled with `0`.
    pub fn apply(&self, version: &str) -> String {
        let Some(count) = self.components() else {
            return version.to_string();
        };

        let core = version
            .split(['-', '+'])
            .next()
            .unwrap_or_default()
            .trim();

        let mut parts: Vec<&str> = core.split('.').filter(|p| !p.is_empty()).collect();
        parts.truncate(count);
        while parts.len() < count {
            parts.push("0");
        }
        parts.join(".")
    }
}

impl FromStr for VersioningModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(VersioningModel::Full),
            "semantic" => Ok(VersioningModel::Semantic),
            "major-minor" => Ok(VersioningModel::MajorMinor),
            "major" => Ok(VersioningModel::Major),
            other => Err(format!(
                "unknown versioning model {:?} (expected full, semantic, major-minor or major)",
                other
            )),
        }
    }
}
