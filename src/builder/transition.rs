//! Name-based transition descriptors.

use crate::builder::error::BuildError;
use crate::core::ExitCode;
use serde::{Deserialize, Serialize};

/// Transition written against state names, resolved to ids at build time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub from: String,
    pub exit: ExitCode,
    pub to: String,
}

impl TransitionSpec {
    pub fn new(from: impl Into<String>, exit: ExitCode, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            exit,
            to: to.into(),
        }
    }
}

/// Builder for constructing transitions with a fluent API.
#[derive(Debug, Default)]
pub struct TransitionBuilder {
    from: Option<String>,
    exit: Option<ExitCode>,
    to: Option<String>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the exit code that selects this transition (required).
    pub fn on(mut self, exit: ExitCode) -> Self {
        self.exit = Some(exit);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionSpec, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let exit = self.exit.ok_or(BuildError::MissingExit)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(TransitionSpec { from, exit, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_required_fields() {
        let result = TransitionBuilder::new().from("OFF").build();
        assert_eq!(result, Err(BuildError::MissingExit));

        let result = TransitionBuilder::new().on(ExitCode::USER).to("ON").build();
        assert_eq!(result, Err(BuildError::MissingFromState));

        let result = TransitionBuilder::new().from("OFF").on(ExitCode::USER).build();
        assert_eq!(result, Err(BuildError::MissingToState));
    }

    #[test]
    fn fluent_api_builds_transition() {
        let spec = TransitionBuilder::new()
            .from("ON")
            .on(ExitCode::TIMEOUT)
            .to("OFF")
            .build()
            .unwrap();

        assert_eq!(spec, TransitionSpec::new("ON", ExitCode::TIMEOUT, "OFF"));
    }

    #[test]
    fn spec_deserializes_from_json() {
        let spec: TransitionSpec =
            serde_json::from_str(r#"{ "from": "OFF", "exit": 16, "to": "ON" }"#).unwrap();
        assert_eq!(spec, TransitionSpec::new("OFF", ExitCode::USER, "ON"));

        let reserved = serde_json::from_str::<TransitionSpec>(
            r#"{ "from": "OFF", "exit": 7, "to": "ON" }"#,
        );
        assert!(reserved.is_err());
    }
}
