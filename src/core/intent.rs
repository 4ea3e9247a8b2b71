use serde::{Deserialize, Serialize};

use crate::core::encoder::ProfileEncoder;
use crate::core::similarity::cosine_similarity;

pub const UNKNOWN_INTENT: &str = "unknown";

/// An assistant intent and the phrases that define it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub name: String,
    pub description: String,
    pub examples: Vec<String>,
}

impl IntentDefinition {
    fn new(name: &str, description: &str, examples: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Intents understood by the French-speaking assistant
pub fn default_intents() -> Vec<IntentDefinition> {
    vec![
        IntentDefinition::new(
            "find_groups",
            "Chercher et trouver des groupes",
            &[
                "Je veux trouver des groupes",
                "Chercher des groupes",
                "Où sont les groupes?",
                "Montrez-moi les groupes",
                "Je cherche un groupe",
                "Groupes disponibles",
                "Voir les groupes",
                "Lister les groupes",
            ],
        ),
        IntentDefinition::new(
            "demande_soutien",
            "Demander de l'aide ou du soutien",
            &[
                "J'ai besoin d'aide",
                "Je demande de l'aide",
                "Pouvez-vous m'aider?",
                "J'ai besoin de soutien",
                "Je cherche de l'assistance",
                "J'ai un problème",
                "Je suis bloqué",
                "Aide moi s'il te plaît",
            ],
        ),
        IntentDefinition::new(
            "search_parrain",
            "Chercher un parrain ou mentor",
            &[
                "Je cherche un parrain",
                "Où trouver un mentor?",
                "J'ai besoin d'un parrain",
                "Trouver un mentor",
                "Chercher un parrain",
                "Qui peut être mon parrain?",
                "Je veux un mentor",
                "Parrain disponible",
            ],
        ),
        IntentDefinition::new(
            "ask_for_parrain",
            "Proposer ses services de parrainage",
            &[
                "Je veux devenir parrain",
                "Comment être mentor?",
                "Je peux aider comme parrain",
                "Proposer mes services de parrain",
                "Être mentor",
                "Devenir parrain",
                "Offrir mon aide comme mentor",
                "Je veux mentorer",
            ],
        ),
        IntentDefinition::new(
            "find_skill_swap",
            "Chercher des partenaires d'échange de compétences",
            &[
                "Je cherche un échange de compétences",
                "Skill swap",
                "Je veux échanger mes compétences",
                "Partenaires d'apprentissage",
            ],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    pub intent: String,
    pub confidence: f64,
}

/// Nearest-centroid intent classifier over sentence embeddings.
///
/// Each intent is represented by the mean embedding of its examples.
pub struct IntentClassifier {
    encoder: ProfileEncoder,
    definitions: Vec<IntentDefinition>,
    centroids: Vec<(String, Vec<f32>)>,
    threshold: f64,
}

impl IntentClassifier {
    /// Embed every example and build the centroids. Intents whose examples
    /// cannot be embedded are left out.
    pub async fn build(encoder: ProfileEncoder, definitions: Vec<IntentDefinition>, threshold: f64) -> Self {
        let mut centroids = Vec::with_capacity(definitions.len());

        if encoder.is_available() {
            for definition in &definitions {
                let mut vectors = Vec::with_capacity(definition.examples.len());
                for example in &definition.examples {
                    let v = encoder.encode_text(example.clone()).await;
                    if !v.is_empty() {
                        vectors.push(v);
                    }
                }
                match mean_vector(vectors.iter().map(|v| v.as_slice())) {
                    Some(centroid) => centroids.push((definition.name.clone(), centroid)),
                    None => tracing::warn!("No usable embeddings for intent {}", definition.name),
                }
            }
        }

        tracing::info!("Intent classifier ready with {} intents", centroids.len());

        Self {
            encoder,
            definitions,
            centroids,
            threshold,
        }
    }

    pub fn definitions(&self) -> &[IntentDefinition] {
        &self.definitions
    }

    pub async fn classify(&self, text: &str) -> IntentMatch {
        if self.centroids.is_empty() {
            return IntentMatch {
                intent: UNKNOWN_INTENT.to_string(),
                confidence: 0.0,
            };
        }

        let vector = self.encoder.encode_text(text.to_string()).await;

        let mut best: Option<(&str, f64)> = None;
        for (name, centroid) in &self.centroids {
            if let Some(similarity) = cosine_similarity(&vector, centroid) {
                if best.map_or(true, |(_, s)| similarity > s) {
                    best = Some((name.as_str(), similarity));
                }
            }
        }

        // Confidence never drops below zero, even for opposed vectors
        match best {
            Some((name, confidence)) if confidence >= self.threshold => IntentMatch {
                intent: name.to_string(),
                confidence: confidence.max(0.0),
            },
            Some((_, confidence)) => IntentMatch {
                intent: UNKNOWN_INTENT.to_string(),
                confidence: confidence.max(0.0),
            },
            None => IntentMatch {
                intent: UNKNOWN_INTENT.to_string(),
                confidence: 0.0,
            },
        }
    }
}

fn mean_vector<'a>(vectors: impl Iterator<Item = &'a [f32]>) -> Option<Vec<f32>> {
    let mut sum: Option<Vec<f32>> = None;
    let mut count = 0usize;

    for v in vectors {
        let Some(acc) = sum.as_mut() else {
            sum = Some(v.to_vec());
            count += 1;
            continue;
        };
        if acc.len() != v.len() {
            continue;
        }
        for (a, x) in acc.iter_mut().zip(v) {
            *a += x;
        }
        count += 1;
    }

    sum.map(|acc| acc.into_iter().map(|a| a / count as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{EmbeddingModel, ModelError};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Bag-of-keywords embedding: one dimension per keyword
    struct KeywordModel;

    #[async_trait]
    impl EmbeddingModel for KeywordModel {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
            let text = text.to_lowercase();
            let v: Vec<f32> = ["groupe", "aide", "parrain", "mentor", "compétences"]
                .iter()
                .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
                .collect();
            Ok(v)
        }
    }

    fn definitions() -> Vec<IntentDefinition> {
        vec![
            IntentDefinition::new("find_groups", "", &["Voir les groupes", "Chercher un groupe"]),
            IntentDefinition::new("demande_soutien", "", &["J'ai besoin d'aide"]),
        ]
    }

    #[tokio::test]
    async fn test_classifies_nearest_intent() {
        let encoder = ProfileEncoder::new(Some(Arc::new(KeywordModel) as Arc<dyn EmbeddingModel>));
        let classifier = IntentClassifier::build(encoder, definitions(), 0.5).await;

        let found = classifier.classify("Je cherche des groupes").await;
        assert_eq!(found.intent, "find_groups");
        assert!((found.confidence - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unmatched_text_is_unknown() {
        let encoder = ProfileEncoder::new(Some(Arc::new(KeywordModel) as Arc<dyn EmbeddingModel>));
        let classifier = IntentClassifier::build(encoder, definitions(), 0.5).await;

        assert_eq!(classifier.classify("Bonjour").await.intent, UNKNOWN_INTENT);
    }

    #[tokio::test]
    async fn test_without_model_everything_is_unknown() {
        let classifier = IntentClassifier::build(ProfileEncoder::unavailable(), default_intents(), 0.5).await;
        assert_eq!(classifier.definitions().len(), 5);
        assert_eq!(classifier.classify("Je cherche un parrain").await.intent, UNKNOWN_INTENT);
    }

    /// Points "groupe" messages one way and everything else the opposite way
    struct OpposedModel;

    #[async_trait]
    impl EmbeddingModel for OpposedModel {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
            if text.to_lowercase().contains("groupe") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![-1.0, 0.0])
            }
        }
    }

    #[tokio::test]
    async fn test_confidence_is_never_negative() {
        let encoder = ProfileEncoder::new(Some(Arc::new(OpposedModel) as Arc<dyn EmbeddingModel>));
        let definitions = vec![IntentDefinition::new("find_groups", "", &["Voir les groupes"])];
        let classifier = IntentClassifier::build(encoder, definitions, 0.5).await;

        let found = classifier.classify("Bonjour").await;
        assert_eq!(found.intent, UNKNOWN_INTENT);
        assert_eq!(found.confidence, 0.0);
    }

    #[test]
    fn test_mean_vector() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let mean = mean_vector([a.as_slice(), b.as_slice()].into_iter()).unwrap();
        assert_eq!(mean, vec![0.5, 0.5]);
    }
}
