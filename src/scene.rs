use crate::foundation::error::{ScenecastError, ScenecastResult};

/// One timed unit of the script: narration text plus optional topical
/// keywords for background lookup.
///
/// Produced by the upstream script parser and consumed read-only here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// 1-based position in the script.
    pub index: u32,
    pub text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Validate the parser contract: scene indices must be contiguous starting
/// at 1, in order. A list that violates this cannot be assembled into a
/// coherent timeline, so the whole run is rejected.
pub fn validate_scene_order(scenes: &[Scene]) -> ScenecastResult<()> {
    for (i, scene) in scenes.iter().enumerate() {
        let expected = i as u32 + 1;
        if scene.index != expected {
            return Err(ScenecastError::invalid_scene(format!(
                "scene indices must be contiguous from 1: expected {expected}, got {}",
                scene.index
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(index: u32) -> Scene {
        Scene {
            index,
            text: "some text".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn contiguous_indices_pass() {
        assert!(validate_scene_order(&[scene(1), scene(2), scene(3)]).is_ok());
        assert!(validate_scene_order(&[]).is_ok());
    }

    #[test]
    fn gap_or_wrong_start_is_rejected() {
        assert!(validate_scene_order(&[scene(2)]).is_err());
        assert!(validate_scene_order(&[scene(1), scene(3)]).is_err());
        assert!(validate_scene_order(&[scene(1), scene(1)]).is_err());
    }

    #[test]
    fn scene_json_roundtrip() {
        let s = Scene {
            index: 1,
            text: "a mountain sunrise".to_string(),
            keywords: vec!["mountain".to_string(), "sunrise".to_string()],
        };
        let json = serde_json::to_string(&s).unwrap();
        let de: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(de, s);
    }

    #[test]
    fn missing_keywords_default_to_empty() {
        let de: Scene = serde_json::from_str(r#"{"index":1,"text":"hi"}"#).unwrap();
        assert!(de.keywords.is_empty());
    }
}
