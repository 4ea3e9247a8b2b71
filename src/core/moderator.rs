use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::services::ToxicityModel;

/// What to do with a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_safe: bool,
    pub is_toxic: bool,
    pub action: ModerationAction,
    pub message: String,
}

/// Binary toxicity gate in front of messages and publications.
///
/// Fails open: only a confident "toxic" label blocks content. Missing
/// models, classifier errors and other labels all count as safe.
#[derive(Clone)]
pub struct ContentModerator {
    model: Option<Arc<dyn ToxicityModel>>,
    toxic_label: String,
    threshold: f32,
}

impl ContentModerator {
    pub fn new(model: Option<Arc<dyn ToxicityModel>>, toxic_label: impl Into<String>, threshold: f32) -> Self {
        Self {
            model,
            toxic_label: toxic_label.into(),
            threshold,
        }
    }

    pub fn with_defaults(model: Option<Arc<dyn ToxicityModel>>) -> Self {
        Self::new(model, "toxic", 0.7)
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub async fn is_toxic(&self, text: &str) -> bool {
        let Some(model) = &self.model else {
            return false;
        };

        match model.classify(text).await {
            Ok(labels) => {
                let toxic = labels.iter().any(|l| {
                    l.label.eq_ignore_ascii_case(&self.toxic_label) && l.score > self.threshold
                });
                tracing::debug!("Toxicity labels: {:?} -> toxic={}", labels, toxic);
                toxic
            }
            Err(e) => {
                tracing::warn!("Toxicity classifier failed, allowing content: {}", e);
                false
            }
        }
    }

    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        let is_toxic = self.is_toxic(text).await;

        if is_toxic {
            tracing::info!("Blocked toxic content ({} chars)", text.len());
            ModerationVerdict {
                is_safe: false,
                is_toxic: true,
                action: ModerationAction::Block,
                message: "Content appears to contain toxic language and should be reviewed".to_string(),
            }
        } else {
            ModerationVerdict {
                is_safe: true,
                is_toxic: false,
                action: ModerationAction::Approve,
                message: "Content appears safe".to_string(),
            }
        }
    }
}
