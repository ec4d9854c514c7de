//! Per-model request shaping.

/// Name of the request field carrying the token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    MaxTokens,
    MaxCompletionTokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProfile {
    pub token_field: TokenField,
    /// Provider rejects custom sampling; temperature is pinned to 1.0 and
    /// `top_p` is not sent.
    pub fixed_sampling: bool,
}

pub const FIXED_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const REASONING_PREFIXES: &[&str] = &["o1", "o3", "o4"];

impl ModelProfile {
    pub fn for_model(model: &str) -> Self {
        if is_gpt5_family(model) || is_reasoning_model(model) {
            Self {
                token_field: TokenField::MaxCompletionTokens,
                fixed_sampling: true,
            }
        } else {
            Self {
                token_field: TokenField::MaxTokens,
                fixed_sampling: false,
            }
        }
    }
}

/// The family that gets a fallback retry on empty output.
pub fn is_gpt5_family(model: &str) -> bool {
    bare_name(model).starts_with("gpt-5")
}

fn is_reasoning_model(model: &str) -> bool {
    let name = bare_name(model);
    REASONING_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
    })
}

// Strips a vendor prefix such as "openai/".
fn bare_name(model: &str) -> String {
    let lower = model.trim().to_ascii_lowercase();
    match lower.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt5_family_uses_completion_tokens_and_fixed_sampling() {
        for model in ["gpt-5", "gpt-5-mini", "GPT-5.1", "openai/gpt-5-nano"] {
            let profile = ModelProfile::for_model(model);
            assert_eq!(profile.token_field, TokenField::MaxCompletionTokens, "{model}");
            assert!(profile.fixed_sampling, "{model}");
            assert!(is_gpt5_family(model), "{model}");
        }
    }

    #[test]
    fn test_reasoning_models() {
        assert!(ModelProfile::for_model("o3-mini").fixed_sampling);
        assert!(ModelProfile::for_model("o1").fixed_sampling);
        assert!(!is_gpt5_family("o3-mini"));
        assert!(!ModelProfile::for_model("o100-custom").fixed_sampling);
    }

    #[test]
    fn test_classic_models() {
        let profile = ModelProfile::for_model("gpt-4o");
        assert_eq!(profile.token_field, TokenField::MaxTokens);
        assert!(!profile.fixed_sampling);
        assert!(!is_gpt5_family("gpt-4o-mini"));
    }
}
