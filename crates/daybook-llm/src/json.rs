//! JSON extraction from model replies.

/// Extract a JSON object from text (handles markdown code blocks).
///
/// Models asked for JSON occasionally wrap it in prose or a code fence;
/// callers run replies through this before deserializing.
pub fn extract_json(text: &str) -> String {
    // Check for markdown code block
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    // Check for plain code block
    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    // Find first { and last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        return text[start..=end].to_string();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"tone": "calm", "pacing": "slow"}"#;
        let json = extract_json(text);
        assert_eq!(json, text);
    }

    #[test]
    fn test_extract_json_code_block() {
        let text = r#"Here's the profile:
```json
{"tone": "calm", "pacing": "slow"}
```"#;
        let json = extract_json(text);
        assert!(json.contains("calm"));
        assert!(json.starts_with('{'));
    }

    #[test]
    fn test_extract_json_with_prefix() {
        let text = r#"Sure! Here's the analysis: {"keywords": ["bread"]}"#;
        let json = extract_json(text);
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_no_json_passthrough() {
        let text = "no structured data here";
        assert_eq!(extract_json(text), text);
    }
}
