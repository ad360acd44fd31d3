use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static INVALID_BRANCH_NAME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(INVALID_BRANCH_NAME_REGEX).expect("branch name pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self, EngineError> {
        let name = name.into();
        if name.is_empty() || INVALID_BRANCH_NAME.is_match(&name) {
            return Err(EngineError::InvalidBranchName(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self(super::DEFAULT_BRANCH.to_string())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for BranchName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("master")]
    #[case("feature/login")]
    #[case("release-1.2")]
    fn accepts_valid_names(#[case] name: &str) {
        assert_eq!(BranchName::try_parse(name).unwrap().as_ref(), name);
    }

    #[rstest]
    #[case("")]
    #[case(".hidden")]
    #[case("a..b")]
    #[case("/leading")]
    #[case("trailing/")]
    #[case("name.lock")]
    #[case("with space")]
    #[case("star*")]
    #[case("at@{")]
    fn rejects_invalid_names(#[case] name: &str) {
        assert!(matches!(
            BranchName::try_parse(name),
            Err(EngineError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn defaults_to_master() {
        assert_eq!(BranchName::default().as_str(), crate::artifacts::branch::DEFAULT_BRANCH);
    }
}
