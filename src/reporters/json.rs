//! JSON reporter
//!
//! Outputs the full result contract as pretty-printed JSON with camelCase
//! keys. Useful for CI gates, piping to jq, or further processing.

use crate::error::{TrinityError, TrinityResult};
use crate::models::TrinityValidationResult;

/// Render result as JSON
pub fn generate_json_report(result: &TrinityValidationResult) -> TrinityResult<String> {
    serde_json::to_string_pretty(result).map_err(|e| TrinityError::Serialize(e.to_string()))
}

/// Render result as compact JSON (single line)
pub fn render_compact(result: &TrinityValidationResult) -> TrinityResult<String> {
    serde_json::to_string(result).map_err(|e| TrinityError::Serialize(e.to_string()))
}

/// Read a saved JSON report back
pub fn parse_json_report(json: &str) -> TrinityResult<TrinityValidationResult> {
    serde_json::from_str(json).map_err(|e| TrinityError::JsonParse {
        path: "<report>".into(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_json_contract_fields() {
        let json_str = generate_json_report(&test_result()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["valid"], false);
        assert_eq!(parsed["score"]["overall"], 90);
        assert_eq!(parsed["metadata"]["projectName"], "shop");
        assert_eq!(parsed["metadata"]["minTrinityScore"], 90);
        assert_eq!(parsed["errors"][0]["category"], "implementation");
        assert_eq!(parsed["synchronization"]["missingTests"][0], "src/foo.ts");
        assert_eq!(parsed["metadata"]["mode"], "all");
    }

    #[test]
    fn test_json_round_trip_keeps_gate_fields() {
        let original = test_result();
        let back = parse_json_report(&generate_json_report(&original).unwrap()).unwrap();
        assert_eq!(back.score, original.score);
        assert_eq!(back.valid, original.valid);
        assert_eq!(back.metadata.project_name, "shop");
        assert_eq!(back, original);
    }

    #[test]
    fn test_json_render_compact() {
        let json_str = render_compact(&test_result()).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        assert!(parse_json_report("{ nope").is_err());
    }
}
