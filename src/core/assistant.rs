use std::sync::Arc;

use crate::core::intent::{IntentClassifier, IntentMatch};
use crate::core::recommender::{RecommendError, RecommendationOrchestrator};
use crate::models::{AssistantReply, Profile, RecommendationItem, Role};

/// Items listed in one assistant reply
const REPLY_LIMIT: usize = 5;

const UNKNOWN_REPLY: &str = "Je ne comprends pas votre demande. Pouvez-vous reformuler ?";
const MISSING_COMPETENCE_REPLY: &str = "Pouvez-vous préciser dans quel domaine vous avez besoin d'aide ?";
const MISSING_PARRAIN_REPLY: &str = "Pouvez-vous me dire quel parrain vous intéresse ?";

struct Replies {
    success: &'static str,
    no_results: &'static str,
    error: &'static str,
}

const GROUP_REPLIES: Replies = Replies {
    success: "Voici les groupes que j'ai trouvés :",
    no_results: "Je n'ai trouvé aucun groupe correspondant à votre recherche.",
    error: "Désolé, je n'ai pas pu récupérer les groupes pour le moment.",
};

const PARRAIN_REPLIES: Replies = Replies {
    success: "Voici les parrains disponibles :",
    no_results: "Je n'ai trouvé aucun parrain disponible pour le moment.",
    error: "Je n'ai pas pu récupérer la liste des parrains.",
};

const SKILL_SWAP_REPLIES: Replies = Replies {
    success: "Voici des partenaires d'échange de compétences recommandés pour vous :",
    no_results: "Je n'ai trouvé aucun partenaire d'échange de compétences pour le moment.",
    error: "Je n'ai pas pu trouver de partenaires d'échange de compétences.",
};

/// Conversational front end: classifies a message and answers the
/// read-only intents from the recommendation pipelines.
///
/// Requests that would create records (support requests, mentoring
/// requests) are answered with a follow-up question and never write.
#[derive(Clone)]
pub struct Assistant {
    classifier: Arc<IntentClassifier>,
    orchestrator: RecommendationOrchestrator,
}

impl Assistant {
    pub fn new(classifier: Arc<IntentClassifier>, orchestrator: RecommendationOrchestrator) -> Self {
        Self {
            classifier,
            orchestrator,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Answer a message from `user_id`. Fails only when the user does not
    /// exist or the request times out; a failing listing is reported in the
    /// reply message.
    pub async fn process_message(&self, user_id: i64, text: &str) -> Result<AssistantReply, RecommendError> {
        self.orchestrator.bounded(self.respond(user_id, text)).await
    }

    async fn respond(&self, user_id: i64, text: &str) -> Result<AssistantReply, RecommendError> {
        let profile = self.orchestrator.load_profile(user_id).await?;
        let IntentMatch { intent, confidence } = self.classifier.classify(text).await;

        let (message, data) = match intent.as_str() {
            "find_groups" => {
                let found = self
                    .orchestrator
                    .groups(&profile, REPLY_LIMIT)
                    .await
                    .map(|groups| groups.into_iter().map(RecommendationItem::Group).collect());
                listing(found, &GROUP_REPLIES)
            }
            "search_parrain" => listing(self.mentor_items(&profile).await, &PARRAIN_REPLIES),
            "find_skill_swap" => {
                let found = self
                    .orchestrator
                    .skill_swap(&profile, REPLY_LIMIT)
                    .await
                    .map(|partners| partners.into_iter().map(RecommendationItem::Profile).collect());
                listing(found, &SKILL_SWAP_REPLIES)
            }
            "ask_for_parrain" => match self.mentor_items(&profile).await {
                Ok(items) => (MISSING_PARRAIN_REPLY.to_string(), Some(items)),
                Err(e) => {
                    tracing::warn!("Mentor listing failed for assistant user {}: {}", user_id, e);
                    (PARRAIN_REPLIES.error.to_string(), Some(Vec::new()))
                }
            },
            "demande_soutien" => (MISSING_COMPETENCE_REPLY.to_string(), None),
            _ => (UNKNOWN_REPLY.to_string(), None),
        };

        tracing::info!("Assistant reply for user {}: intent={} ({:.3})", user_id, intent, confidence);

        Ok(AssistantReply {
            intent,
            confidence,
            message,
            data,
            suggestions: suggestions(&profile),
        })
    }

    async fn mentor_items(&self, profile: &Profile) -> Result<Vec<RecommendationItem>, RecommendError> {
        Ok(self
            .orchestrator
            .mentors(profile, REPLY_LIMIT)
            .await?
            .into_iter()
            .map(RecommendationItem::Profile)
            .collect())
    }
}

fn listing(
    found: Result<Vec<RecommendationItem>, RecommendError>,
    replies: &Replies,
) -> (String, Option<Vec<RecommendationItem>>) {
    match found {
        Ok(items) if items.is_empty() => (replies.no_results.to_string(), Some(items)),
        Ok(items) => (replies.success.to_string(), Some(items)),
        Err(e) => {
            tracing::warn!("Assistant listing failed: {}", e);
            (replies.error.to_string(), Some(Vec::new()))
        }
    }
}

/// Follow-up prompts offered after every reply
pub fn suggestions(profile: &Profile) -> Vec<String> {
    let mut suggestions: Vec<String> = [
        "Montrez-moi les groupes disponibles",
        "J'ai besoin d'aide en programmation",
        "Je cherche un parrain",
        "Je veux échanger mes compétences",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if profile.has_role(Role::Mentor) {
        suggestions.push("Je veux aider comme parrain".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{default_intents, ContentModerator, ProfileEncoder};
    use crate::models::{Competency, Group, Program};
    use crate::services::{EmbeddingModel, InMemoryProfileStore, ModelError, ProfileStore};
    use async_trait::async_trait;

    /// Bag-of-keywords embedding: one dimension per keyword
    struct KeywordModel;

    #[async_trait]
    impl EmbeddingModel for KeywordModel {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
            let text = text.to_lowercase();
            Ok(["groupe", "aide", "parrain", "mentor", "compétences"]
                .iter()
                .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
                .collect())
        }
    }

    fn person(id: i64, role: Role, program: Program, level: u8, interests: &[&str], skills: &[(&str, u8)]) -> Profile {
        Profile {
            id,
            display_name: format!("User{}", id),
            roles: vec![role],
            program: Some(program),
            level: Some(level),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            competencies: skills
                .iter()
                .map(|(name, level)| Competency {
                    name: name.to_string(),
                    level: *level,
                })
                .collect(),
        }
    }

    fn group(id: i64, interest: &str) -> Group {
        Group {
            id,
            name: format!("Group{}", id),
            description: String::new(),
            interest: interest.to_string(),
        }
    }

    async fn assistant() -> Assistant {
        let profiles = vec![
            person(1, Role::Student, Program::Api, 2, &["IA"], &[("Python", 3)]),
            person(2, Role::Mentor, Program::Api, 4, &[], &[("Python", 5), ("SQL", 4)]),
            person(3, Role::Student, Program::Bdai, 2, &[], &[("SQL", 4)]),
            person(4, Role::Student, Program::Wmd, 1, &[], &[]),
        ];
        let store = InMemoryProfileStore::new(profiles, vec![group(1, "IA"), group(2, "Web")]);

        let encoder = ProfileEncoder::new(Some(Arc::new(KeywordModel) as Arc<dyn EmbeddingModel>));
        let classifier = Arc::new(IntentClassifier::build(encoder.clone(), default_intents(), 0.5).await);
        let orchestrator = RecommendationOrchestrator::new(
            Arc::new(store) as Arc<dyn ProfileStore>,
            encoder,
            ContentModerator::with_defaults(None),
        );

        Assistant::new(classifier, orchestrator)
    }

    fn item_ids(reply: &AssistantReply) -> Vec<i64> {
        reply
            .data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|item| match item {
                RecommendationItem::Profile(c) => c.candidate.id,
                RecommendationItem::Group(g) => g.group.id,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_find_groups_lists_interest_groups() {
        let reply = assistant().await.process_message(1, "Montrez-moi les groupes").await.unwrap();

        assert_eq!(reply.intent, "find_groups");
        assert_eq!(reply.message, GROUP_REPLIES.success);
        assert_eq!(item_ids(&reply), vec![1]);
    }

    #[tokio::test]
    async fn test_find_groups_without_matches() {
        let reply = assistant().await.process_message(4, "Je cherche un groupe").await.unwrap();

        assert_eq!(reply.intent, "find_groups");
        assert_eq!(reply.message, GROUP_REPLIES.no_results);
        assert_eq!(reply.data, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_search_parrain_lists_mentors() {
        let reply = assistant().await.process_message(1, "Je cherche un parrain").await.unwrap();

        assert_eq!(reply.intent, "search_parrain");
        assert_eq!(reply.message, PARRAIN_REPLIES.success);
        assert_eq!(item_ids(&reply), vec![2]);
    }

    #[tokio::test]
    async fn test_skill_swap_lists_partners() {
        let reply = assistant()
            .await
            .process_message(1, "Je veux échanger mes compétences")
            .await
            .unwrap();

        assert_eq!(reply.intent, "find_skill_swap");
        assert_eq!(reply.message, SKILL_SWAP_REPLIES.success);
        let ids = item_ids(&reply);
        assert!(!ids.is_empty() && ids.len() <= REPLY_LIMIT);
        assert!(!ids.contains(&1));
    }

    #[tokio::test]
    async fn test_unknown_message() {
        let reply = assistant().await.process_message(1, "Bonjour").await.unwrap();

        assert_eq!(reply.intent, crate::core::intent::UNKNOWN_INTENT);
        assert_eq!(reply.message, UNKNOWN_REPLY);
        assert!(reply.data.is_none());
        assert_eq!(reply.suggestions.len(), 4);
    }

    #[tokio::test]
    async fn test_mentors_get_extra_suggestion() {
        let reply = assistant().await.process_message(2, "Bonjour").await.unwrap();

        assert_eq!(reply.suggestions.len(), 5);
        assert_eq!(reply.suggestions[4], "Je veux aider comme parrain");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let err = assistant().await.process_message(99, "Voir les groupes").await.unwrap_err();
        assert!(matches!(err, RecommendError::ProfileNotFound(99)));
    }
}
