//! Card Data Resolver — one structured payload plus a first-person message
//! per category.
//!
//! The portfolio document is the source of truth: a category with static
//! data is answered verbatim, with no LLM call for the structured part. The
//! LLM synthesizes a payload only for missing categories, and always writes
//! the accompanying message.

use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::cards::prompts;
use crate::errors::AppError;
use crate::llm_client::prompts::FIRST_PERSON_INSTRUCTION;
use crate::models::cards::{ContactCard, ProjectCard, ResumeCard, SkillCard, StructuredOutput};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCategory {
    Me,
    Projects,
    Skills,
    Contact,
    Resume,
    Fun,
}

impl FromStr for CardCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "me" => Ok(CardCategory::Me),
            "projects" => Ok(CardCategory::Projects),
            "skills" => Ok(CardCategory::Skills),
            "contact" => Ok(CardCategory::Contact),
            "resume" => Ok(CardCategory::Resume),
            "fun" => Ok(CardCategory::Fun),
            _ => Err(()),
        }
    }
}

/// Resolved card: the structured payload, the accompanying message, and —
/// for the projects category only — the full ordered project list for
/// multi-item rendering. `structured_data` stays the first project there
/// for single-card consumers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResolution {
    pub structured_data: StructuredOutput,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectCard>>,
}

pub async fn resolve_card(
    state: &AppState,
    category: CardCategory,
) -> Result<CardResolution, AppError> {
    match category {
        CardCategory::Me => resolve_me(state).await,
        CardCategory::Projects => resolve_projects(state).await,
        CardCategory::Skills => resolve_skills(state).await,
        CardCategory::Contact => resolve_contact(state).await,
        CardCategory::Resume => resolve_resume(state).await,
        CardCategory::Fun => resolve_fun(state).await,
    }
}

/// Synthesizes a structured payload for a missing category and checks the
/// model produced the variant the category asked for.
async fn synthesize_card(
    state: &AppState,
    card_system: &str,
    card_input: &str,
    expected: &str,
) -> Result<StructuredOutput, AppError> {
    let system = format!("{}\n\n{card_system}", state.system_prompt);
    let data = state
        .llm
        .complete_structured(&system, &[], card_input)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let got = variant_name(&data);
    if got != expected {
        return Err(AppError::Llm(format!(
            "expected a {expected} card, got {got}"
        )));
    }
    Ok(data)
}

async fn generate_message(
    state: &AppState,
    message_system: &str,
    message_input: &str,
) -> Result<String, AppError> {
    let system = format!(
        "{}\n\n{message_system} {FIRST_PERSON_INSTRUCTION}",
        state.system_prompt
    );
    state
        .llm
        .complete(&system, &[], message_input)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))
}

fn variant_name(data: &StructuredOutput) -> &'static str {
    match data {
        StructuredOutput::Project(_) => "project",
        StructuredOutput::Skill(_) => "skill",
        StructuredOutput::Contact(_) => "contact",
        StructuredOutput::Resume(_) => "resume",
        StructuredOutput::Info(_) => "info",
    }
}

async fn resolve_me(state: &AppState) -> Result<CardResolution, AppError> {
    let structured_data =
        synthesize_card(state, prompts::ME_CARD_SYSTEM, prompts::ME_CARD_INPUT, "info").await?;
    let message =
        generate_message(state, prompts::ME_MESSAGE_SYSTEM, prompts::ME_MESSAGE_INPUT).await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: None,
    })
}

async fn resolve_projects(state: &AppState) -> Result<CardResolution, AppError> {
    let projects = &state.portfolio.projects;

    let (structured_data, all_projects) = match projects.first() {
        Some(first) => {
            debug!("projects card resolved from static data ({} projects)", projects.len());
            (
                StructuredOutput::Project(ProjectCard::from_project(first)),
                projects.iter().map(ProjectCard::from_project).collect(),
            )
        }
        None => (
            synthesize_card(
                state,
                prompts::PROJECT_CARD_SYSTEM,
                prompts::PROJECT_CARD_INPUT,
                "project",
            )
            .await?,
            Vec::new(),
        ),
    };

    let message = generate_message(
        state,
        prompts::PROJECTS_MESSAGE_SYSTEM,
        prompts::PROJECTS_MESSAGE_INPUT,
    )
    .await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: Some(all_projects),
    })
}

async fn resolve_skills(state: &AppState) -> Result<CardResolution, AppError> {
    let structured_data = match state.portfolio.skills.first() {
        Some(group) => StructuredOutput::Skill(SkillCard::from_group(group)),
        None => {
            synthesize_card(
                state,
                prompts::SKILL_CARD_SYSTEM,
                prompts::SKILL_CARD_INPUT,
                "skill",
            )
            .await?
        }
    };

    let message = generate_message(
        state,
        prompts::SKILLS_MESSAGE_SYSTEM,
        prompts::SKILLS_MESSAGE_INPUT,
    )
    .await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: None,
    })
}

async fn resolve_contact(state: &AppState) -> Result<CardResolution, AppError> {
    let structured_data = match &state.portfolio.contact_info {
        Some(contact) => StructuredOutput::Contact(ContactCard::from_contact(contact)),
        None => {
            synthesize_card(
                state,
                prompts::CONTACT_CARD_SYSTEM,
                prompts::CONTACT_CARD_INPUT,
                "contact",
            )
            .await?
        }
    };

    let message = generate_message(
        state,
        prompts::CONTACT_MESSAGE_SYSTEM,
        prompts::CONTACT_MESSAGE_INPUT,
    )
    .await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: None,
    })
}

async fn resolve_resume(state: &AppState) -> Result<CardResolution, AppError> {
    let structured_data = match &state.portfolio.resume {
        Some(resume) => StructuredOutput::Resume(ResumeCard::from_resume(resume)),
        None => {
            synthesize_card(
                state,
                prompts::RESUME_CARD_SYSTEM,
                prompts::RESUME_CARD_INPUT,
                "resume",
            )
            .await?
        }
    };

    let message = generate_message(
        state,
        prompts::RESUME_MESSAGE_SYSTEM,
        prompts::RESUME_MESSAGE_INPUT,
    )
    .await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: None,
    })
}

async fn resolve_fun(state: &AppState) -> Result<CardResolution, AppError> {
    let structured_data = synthesize_card(
        state,
        prompts::FUN_CARD_SYSTEM,
        prompts::FUN_CARD_INPUT,
        "info",
    )
    .await?;
    let message = generate_message(
        state,
        prompts::FUN_MESSAGE_SYSTEM,
        prompts::FUN_MESSAGE_INPUT,
    )
    .await?;

    Ok(CardResolution {
        structured_data,
        message,
        projects: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::llm_client::stub::StubProvider;
    use crate::models::cards::InfoCard;
    use crate::models::portfolio::PortfolioData;

    fn portfolio_with_data() -> PortfolioData {
        serde_json::from_str(
            r#"{
                "personalInfo": {"name": "Ada", "bio": "Analyst.", "location": "London"},
                "projects": [
                    {
                        "title": "Engine Notes",
                        "description": "Annotated translation.",
                        "year": 1843,
                        "technologies": ["Bernoulli numbers"],
                        "links": [{"label": "Archive", "url": "https://example.org"}]
                    },
                    {
                        "title": "Flyology",
                        "description": "Early flight studies.",
                        "year": 1828,
                        "technologies": [],
                        "links": []
                    }
                ],
                "skills": [
                    {"category": "Mathematics", "skills": ["Calculus", "Number theory"]},
                    {"category": "Writing", "skills": ["Translation"]}
                ],
                "contactInfo": {
                    "email": "a@b.com",
                    "location": "X",
                    "socialLinks": [{"platform": "Letters", "url": "https://example.org/l"}]
                },
                "resume": {
                    "name": "ada.pdf",
                    "title": "Resume",
                    "format": "PDF",
                    "updatedDate": "1843-09-01",
                    "size": "1 MB"
                }
            }"#,
        )
        .unwrap()
    }

    fn info_card() -> StructuredOutput {
        StructuredOutput::Info(InfoCard {
            title: "About me".to_string(),
            content: "Hello.".to_string(),
            metadata: None,
        })
    }

    #[test]
    fn test_category_parses_all_six_names() {
        for (name, expected) in [
            ("me", CardCategory::Me),
            ("projects", CardCategory::Projects),
            ("skills", CardCategory::Skills),
            ("contact", CardCategory::Contact),
            ("resume", CardCategory::Resume),
            ("fun", CardCategory::Fun),
        ] {
            assert_eq!(name.parse::<CardCategory>().unwrap(), expected);
        }
        assert!("banner".parse::<CardCategory>().is_err());
    }

    #[tokio::test]
    async fn test_contact_uses_static_data_verbatim_without_structured_call() {
        let state = AppState::for_tests_with_portfolio(
            StubProvider {
                panic_on_structured: true,
                message: "write to me".to_string(),
                ..Default::default()
            },
            portfolio_with_data(),
        );

        let resolution = resolve_card(&state, CardCategory::Contact).await.unwrap();
        match resolution.structured_data {
            StructuredOutput::Contact(card) => {
                assert_eq!(card.email, "a@b.com");
                assert_eq!(card.location, "X");
                assert!(card.phone.is_none());
                assert_eq!(card.social_links[0].platform, "Letters");
            }
            other => panic!("expected contact card, got {other:?}"),
        }
        assert_eq!(resolution.message, "write to me");
    }

    #[tokio::test]
    async fn test_projects_returns_first_card_and_full_list() {
        let state = AppState::for_tests_with_portfolio(
            StubProvider {
                panic_on_structured: true,
                ..Default::default()
            },
            portfolio_with_data(),
        );

        let resolution = resolve_card(&state, CardCategory::Projects).await.unwrap();
        match &resolution.structured_data {
            StructuredOutput::Project(card) => assert_eq!(card.title, "Engine Notes"),
            other => panic!("expected project card, got {other:?}"),
        }
        let all = resolution.projects.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].title, "Flyology");
    }

    #[tokio::test]
    async fn test_skills_uses_first_static_group() {
        let state = AppState::for_tests_with_portfolio(
            StubProvider {
                panic_on_structured: true,
                ..Default::default()
            },
            portfolio_with_data(),
        );

        let resolution = resolve_card(&state, CardCategory::Skills).await.unwrap();
        match resolution.structured_data {
            StructuredOutput::Skill(card) => {
                assert_eq!(card.category, "Mathematics");
                assert_eq!(card.skills, vec!["Calculus", "Number theory"]);
            }
            other => panic!("expected skill card, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resume_uses_static_metadata() {
        let state = AppState::for_tests_with_portfolio(
            StubProvider {
                panic_on_structured: true,
                ..Default::default()
            },
            portfolio_with_data(),
        );

        let resolution = resolve_card(&state, CardCategory::Resume).await.unwrap();
        match resolution.structured_data {
            StructuredOutput::Resume(card) => {
                assert_eq!(card.name, "ada.pdf");
                assert_eq!(card.updated_date, "1843-09-01");
            }
            other => panic!("expected resume card, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_category_falls_back_to_synthesis() {
        // Minimal portfolio: no projects, so the card is synthesized.
        let provider = std::sync::Arc::new(StubProvider {
            structured: Some(StructuredOutput::Project(ProjectCard {
                title: "Imagined".to_string(),
                description: "Synthesized".to_string(),
                year: 2024,
                technologies: vec![],
                links: vec![],
            })),
            ..Default::default()
        });
        let state =
            AppState::for_tests_shared(provider.clone(), crate::state::minimal_portfolio());

        let resolution = resolve_card(&state, CardCategory::Projects).await.unwrap();
        assert!(matches!(
            resolution.structured_data,
            StructuredOutput::Project(_)
        ));
        assert_eq!(resolution.projects.as_deref(), Some(&[][..]));
        assert_eq!(provider.structured_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesized_wrong_variant_is_an_error() {
        // Asked for a project card, the model answers with an info card.
        let state = AppState::for_tests(StubProvider {
            structured: Some(info_card()),
            ..Default::default()
        });

        let err = resolve_card(&state, CardCategory::Projects).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.to_string().contains("project"));
    }

    #[tokio::test]
    async fn test_me_always_synthesizes_an_info_card() {
        let provider = std::sync::Arc::new(StubProvider {
            structured: Some(info_card()),
            ..Default::default()
        });
        let state = AppState::for_tests_shared(provider.clone(), portfolio_with_data());

        let resolution = resolve_card(&state, CardCategory::Me).await.unwrap();
        assert!(matches!(resolution.structured_data, StructuredOutput::Info(_)));

        assert_eq!(provider.structured_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.complete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fun_synthesizes_and_surfaces_provider_failure() {
        // Structured call fails -> the endpoint call fails with the provider message.
        let state = AppState::for_tests(StubProvider::default());

        let err = resolve_card(&state, CardCategory::Fun).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.to_string().contains("structured output unavailable"));
    }
}
