use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::UnknownVariant {
            kind: "agent",
            value: "NOBODY".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown agent: NOBODY");
        assert_eq!(
            CoreError::Validation("name is required".into()).to_string(),
            "Validation error: name is required"
        );
    }
}
