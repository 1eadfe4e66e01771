use serde::Serialize;

pub const FEATURE_AUTH: &str = "FEATURE_AUTH";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlagsSnapshot {
    pub auth: bool,
}

/// Interpret a boolean switch, falling back to `default` when unset or unrecognized.
pub fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_spellings() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(parse_flag(Some(raw), false));
        }
        for raw in ["0", "False", "no", "OFF"] {
            assert!(!parse_flag(Some(raw), true));
        }
    }

    #[test]
    fn falls_back_to_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe"), false));
    }
}
