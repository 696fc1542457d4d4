// Helpers for pulling structured payloads out of free-text model output

use serde_json::Value;

const FENCE: &str = "```";
const FENCE_LANGS: [&str; 3] = ["json", "sql", "sqlite"];

/// Return the body of the first markdown code fence, or the trimmed text
/// when there is no fence.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let after = &trimmed[start + FENCE.len()..];
    let body = match after.find('\n') {
        // The rest of the opening line is the language tag
        Some(nl) if !after[..nl].trim().contains(' ') => &after[nl + 1..],
        _ => strip_inline_lang(after),
    };

    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn strip_inline_lang(s: &str) -> &str {
    for lang in FENCE_LANGS {
        let tagged = s
            .get(..lang.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(lang));
        if tagged && s[lang.len()..].starts_with(char::is_whitespace) {
            return &s[lang.len()..];
        }
    }
    s
}

/// Parse a JSON value out of model output.
///
/// Tries the fenced/trimmed text first, then the outermost `{...}` span for
/// answers that wrap the JSON in prose. Returns the first parse error when
/// neither attempt succeeds.
pub fn extract_json(text: &str) -> Result<Value, serde_json::Error> {
    let body = strip_code_fences(text);
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let span = body
                .find('{')
                .zip(body.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &body[start..=end]);

            match span.map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => Ok(value),
                _ => Err(first_err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(strip_code_fences("  SELECT 1;  "), "SELECT 1;");
    }

    #[test]
    fn test_fenced_block_with_language() {
        let text = "```sql\nSELECT name FROM institutions\n```";
        assert_eq!(strip_code_fences(text), "SELECT name FROM institutions");
    }

    #[test]
    fn test_inline_fence_with_language() {
        assert_eq!(strip_code_fences("```sql SELECT 1```"), "SELECT 1");
    }

    #[test]
    fn test_inline_fence_with_multibyte_text() {
        assert_eq!(strip_code_fences("```日本 graph```"), "日本 graph");
        assert_eq!(strip_code_fences("```€€ x```"), "€€ x");
    }

    #[test]
    fn test_fence_after_prose() {
        let text = "Here is the graph:\n```json\n{\"nodes\": []}\n```\nHope it helps";
        assert_eq!(strip_code_fences(text), "{\"nodes\": []}");
    }

    #[test]
    fn test_extract_json_from_prose() {
        let value = extract_json("Sure! {\"major\": \"CS\"} Let me know.").unwrap();
        assert_eq!(value, json!({"major": "CS"}));
    }

    #[test]
    fn test_extract_json_failure() {
        assert!(extract_json("not valid json").is_err());
    }
}
