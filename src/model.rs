use rmcp::schemars;
use serde::{Deserialize, Serialize};

fn default_speaker_id() -> i64 {
    0
}

fn default_length_scale() -> f64 {
    1.1
}

fn default_noise_scale() -> f64 {
    0.667
}

fn default_noise_w_scale() -> f64 {
    0.333
}

fn default_volume() -> f64 {
    0.15
}

/// Arguments of the `speak` tool.
#[derive(Debug, Clone, PartialEq, Deserialize, schemars::JsonSchema)]
pub struct SpeechRequest {
    /// The text to convert to speech
    pub text: String,

    /// Voice speaker ID (default: 0)
    #[serde(default = "default_speaker_id")]
    pub speaker_id: i64,

    /// Speech speed control (default: 1.1, lower = faster)
    #[serde(default = "default_length_scale")]
    pub length_scale: f64,

    /// Voice variation control (default: 0.667)
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,

    /// Pronunciation variation control (default: 0.333)
    #[serde(default = "default_noise_w_scale")]
    pub noise_w_scale: f64,

    /// Volume level from 0.01 to 1.00 (default: 0.15)
    #[serde(default = "default_volume")]
    pub volume: f64,
}

impl SpeechRequest {
    #[cfg(test)]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker_id: default_speaker_id(),
            length_scale: default_length_scale(),
            noise_scale: default_noise_scale(),
            noise_w_scale: default_noise_w_scale(),
            volume: default_volume(),
        }
    }

    /// Body for the TTS service. Volume stays local.
    pub fn query(&self) -> SynthesisQuery {
        SynthesisQuery {
            text: self.text.clone(),
            speaker_id: self.speaker_id,
            length_scale: self.length_scale,
            noise_scale: self.noise_scale,
            noise_w_scale: self.noise_w_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisQuery {
    pub text: String,
    pub speaker_id: i64,
    pub length_scale: f64,
    pub noise_scale: f64,
    pub noise_w_scale: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_text_only() {
        let request: SpeechRequest = serde_json::from_value(json!({ "text": "hello" })).unwrap();

        assert_eq!(request, SpeechRequest::new("hello"));
        assert_eq!(request.speaker_id, 0);
        assert!((request.length_scale - 1.1).abs() < f64::EPSILON);
        assert!((request.noise_scale - 0.667).abs() < f64::EPSILON);
        assert!((request.noise_w_scale - 0.333).abs() < f64::EPSILON);
        assert!((request.volume - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn test_query_leaves_volume_out() {
        let mut request = SpeechRequest::new("hello");
        request.speaker_id = 3;
        request.volume = 0.9;

        let body = serde_json::to_value(request.query()).unwrap();

        assert_eq!(
            body,
            json!({
                "text": "hello",
                "speaker_id": 3,
                "length_scale": 1.1,
                "noise_scale": 0.667,
                "noise_w_scale": 0.333,
            })
        );
    }

    #[test]
    fn test_missing_text_is_rejected() {
        let result: Result<SpeechRequest, _> = serde_json::from_value(json!({ "volume": 0.5 }));
        assert!(result.is_err());
    }
}
