//! JSON extraction and repair for LLM responses.
//!
//! Models wrap the blueprint in prose, code fences, or cut it off mid-object.
//! Extraction order:
//! 1. the span from the first `{` to the last `}`
//! 2. the whole text after fence stripping
//! 3. progressively more aggressive repairs (trailing commas, unbalanced
//!    brackets, truncated strings, control characters)

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ForgeError, Result};

/// Extract and parse JSON from an LLM response.
///
/// This is the primary entry point for parsing model output.
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new()
        .parse_or_repair(content)
        .map(|(value, _)| value)
}

/// The slice between the first `{` and the last `}` (inclusive), if any.
pub fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// JSON repair strategies
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse JSON, attempting repair if the plain extraction fails.
    ///
    /// Returns (Value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        if let Some(span) = brace_span(raw)
            && let Ok(value) = serde_json::from_str::<Value>(span)
        {
            return Ok((value, false));
        }

        let cleaned = self.preprocess(raw);
        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Brace extraction failed, attempting JSON repair");

        // Repairs start from the first `{` so leading prose is not carried along
        let base = cleaned
            .find('{')
            .map(|start| &cleaned[start..])
            .unwrap_or(&cleaned);

        for attempt in 1..=self.max_repair_attempts {
            let repaired = self.repair_attempt(base, attempt);

            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                warn!("JSON repaired on attempt {}", attempt);
                return Ok((value, true));
            }
        }

        Err(ForgeError::LlmApi(format!(
            "Failed to parse or repair JSON after {} attempts. Content preview: {}...",
            self.max_repair_attempts,
            &cleaned.chars().take(200).collect::<String>()
        )))
    }

    fn preprocess(&self, raw: &str) -> String {
        let s = self.strip_code_fences(raw.trim());
        s.trim_start_matches('\u{feff}').trim().to_string()
    }

    fn strip_code_fences(&self, s: &str) -> String {
        let mut result = s;

        if result.starts_with("```")
            && let Some(first_newline) = result.find('\n')
        {
            result = &result[first_newline + 1..];
        }

        if let Some(stripped) = result.trim_end().strip_suffix("```") {
            result = stripped.trim_end();
        }

        result.to_string()
    }

    /// Attempt repair with increasing aggressiveness
    fn repair_attempt(&self, s: &str, level: usize) -> String {
        match level {
            1 => self.balance_brackets(&self.fix_trailing_commas(s)),
            2 => {
                let fixed = self.fix_truncated_strings(&self.fix_trailing_commas(s));
                self.balance_brackets(&fixed)
            }
            _ => {
                let fixed = self.remove_control_chars(&self.fix_trailing_commas(s));
                let fixed = self.balance_brackets(&self.fix_truncated_strings(&fixed));
                self.truncate_to_valid(&fixed)
            }
        }
    }

    /// Drop commas directly before `]` or `}`
    fn fix_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());

        for (i, &ch) in chars.iter().enumerate() {
            if ch == ',' {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            result.push(ch);
        }

        result
    }

    /// Append missing closers, innermost first
    fn balance_brackets(&self, s: &str) -> String {
        let mut result = s.to_string();
        let mut stack = Vec::new();
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => stack.push('}'),
                '[' if !in_string => stack.push(']'),
                '}' | ']' if !in_string => {
                    stack.pop();
                }
                _ => {}
            }
        }

        if in_string {
            result.push('"');
        }

        while let Some(closer) = stack.pop() {
            result.push(closer);
        }

        result
    }

    /// Close strings that run into a newline
    fn fix_truncated_strings(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 10);
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => {
                    escape = true;
                    result.push(ch);
                }
                '"' => {
                    in_string = !in_string;
                    result.push(ch);
                }
                '\n' | '\r' if in_string => {
                    result.push('"');
                    in_string = false;
                    result.push(ch);
                }
                _ => result.push(ch),
            }
        }

        if in_string {
            result.push('"');
        }

        result
    }

    fn remove_control_chars(&self, s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect()
    }

    /// Cut to the end of the first complete top-level value
    fn truncate_to_valid(&self, s: &str) -> String {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s.char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' | '[' if !in_string => depth += 1,
                '}' | ']' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return s[..i + 1].to_string();
                    }
                }
                _ => {}
            }
        }

        s.to_string()
    }
}
