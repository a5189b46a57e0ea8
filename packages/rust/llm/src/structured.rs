//! Parsing of JSON-object completions.

use serde::de::DeserializeOwned;

use leadforge_shared::{LeadForgeError, Result};

/// Parse a completion that should be a single JSON object.
///
/// Tolerates surrounding whitespace and a Markdown code fence, which some
/// models add even in JSON mode. Anything else is a
/// [`LeadForgeError::MalformedReply`].
pub fn parse_structured<T: DeserializeOwned>(completion: &str) -> Result<T> {
    let body = strip_fence(completion.trim());
    serde_json::from_str(body).map_err(|e| LeadForgeError::malformed_reply(e.to_string()))
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Profile {
        summary: String,
        industry: String,
    }

    #[test]
    fn parses_plain_object() {
        let p: Profile =
            parse_structured(r#" {"summary": "Foo sells widgets", "industry": "Manufacturing"} "#)
                .expect("parse");
        assert_eq!(p.industry, "Manufacturing");
    }

    #[test]
    fn parses_fenced_object() {
        let reply = "```json\n{\"summary\": \"s\", \"industry\": \"i\"}\n```";
        let p: Profile = parse_structured(reply).expect("parse");
        assert_eq!(p.summary, "s");
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse_structured::<Profile>("Sure! Foo is a widget maker.").unwrap_err();
        assert!(matches!(err, LeadForgeError::MalformedReply { .. }));
    }

    #[test]
    fn missing_key_is_malformed() {
        let err = parse_structured::<Profile>(r#"{"summary": "s"}"#).unwrap_err();
        assert!(matches!(err, LeadForgeError::MalformedReply { .. }));
    }
}
