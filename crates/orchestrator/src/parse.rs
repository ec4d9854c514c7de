use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{OrchestratorError, Result};
use crate::payloads::Payload;

pub struct ResponseParser;

impl ResponseParser {
    /// Pull the JSON object out of a model reply that may wrap it in a code
    /// fence or surrounding prose.
    pub fn extract_json(content: &str) -> Option<&str> {
        let mut body = content.trim();

        if let Some(start) = body.find("```") {
            let after_fence = &body[start + 3..];
            let after_lang = after_fence
                .find('\n')
                .map_or(after_fence, |nl| &after_fence[nl + 1..]);
            body = match after_lang.find("```") {
                Some(end) => &after_lang[..end],
                None => after_lang,
            };
        }

        let start = body.find('{')?;
        let end = body.rfind('}')?;
        (start < end).then(|| &body[start..=end])
    }

    /// Free-text reply, trimmed. An empty reply is unusable.
    pub fn text(runner: &'static str, content: &str) -> Result<String> {
        let text = content.trim();
        if text.is_empty() {
            warn!(runner, "Model returned an empty response");
            return Err(OrchestratorError::invalid_output(runner, "empty response"));
        }
        Ok(text.to_string())
    }

    /// Extract, deserialize and check a structured payload.
    pub fn parse<T>(runner: &'static str, content: &str) -> Result<T>
    where
        T: DeserializeOwned + Payload,
    {
        let json = Self::extract_json(content).ok_or_else(|| {
            warn!(
                runner,
                content_preview = %content.chars().take(300).collect::<String>(),
                "No JSON object in model response"
            );
            OrchestratorError::invalid_output(runner, "response contained no JSON object")
        })?;

        let payload: T = serde_json::from_str(json).map_err(|e| {
            warn!(runner, error = %e, "Model JSON did not match the expected shape");
            OrchestratorError::invalid_output(runner, e.to_string())
        })?;

        payload
            .check()
            .map_err(|reason| OrchestratorError::invalid_output(runner, reason))?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::JudgePayload;

    #[test]
    fn test_extract_from_fenced_block() {
        let content = "Here you go:\n```json\n{\"verdict\": \"ship it\"}\n```\nThanks";
        assert_eq!(
            ResponseParser::extract_json(content),
            Some("{\"verdict\": \"ship it\"}")
        );
    }

    #[test]
    fn test_extract_outermost_object() {
        let content = "Result: {\"a\": {\"b\": 1}} done";
        assert_eq!(
            ResponseParser::extract_json(content),
            Some("{\"a\": {\"b\": 1}}")
        );
    }

    #[test]
    fn test_extract_none_without_object() {
        assert_eq!(ResponseParser::extract_json("no json here"), None);
        assert_eq!(ResponseParser::extract_json("} backwards {"), None);
    }

    #[test]
    fn test_parse_reports_invalid_output() {
        let err = ResponseParser::parse::<JudgePayload>("judge", "I prefer route B.").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidOutput { runner: "judge", .. }));

        let err = ResponseParser::parse::<JudgePayload>("judge", "{\"verdict\": \"\"}").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidOutput { .. }));
    }

    #[test]
    fn test_parse_valid_payload() {
        let payload = ResponseParser::parse::<JudgePayload>(
            "judge",
            "```\n{\"winner\": \"Cellar Door\", \"verdict\": \"Simplest to run.\", \"ranking\": [\"Cellar Door\"]}\n```",
        )
        .unwrap();
        assert_eq!(payload.winner, "Cellar Door");
    }

    #[test]
    fn test_text_rejects_blank_reply() {
        assert_eq!(ResponseParser::text("framing", "  ## Frame \n").unwrap(), "## Frame");
        let err = ResponseParser::text("framing", " \n ").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidOutput { runner: "framing", .. }));
    }
}
