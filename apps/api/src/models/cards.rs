//! Structured output schema — the closed set of card payloads shared between
//! card generation and the chat stream.
//!
//! The `type` tag is the discriminant. Serde enforces the contract: an
//! unknown or missing discriminant, or a variant missing a required field,
//! fails deserialization outright — there is no partial accept.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::portfolio::{ContactInfo, Project, ResumeInfo, SkillGroup};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuredOutput {
    Project(ProjectCard),
    Skill(SkillCard),
    Contact(ContactCard),
    Resume(ResumeCard),
    Info(InfoCard),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub technologies: Vec<String>,
    pub links: Vec<CardLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCard {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCard {
    pub email: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub social_links: Vec<CardSocialLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCard {
    pub name: String,
    pub title: String,
    pub format: String,
    pub updated_date: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl ProjectCard {
    /// Builds a card from a static portfolio project, verbatim.
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            year: project.year,
            technologies: project.technologies.clone(),
            links: project
                .links
                .iter()
                .map(|l| CardLink {
                    label: l.label.clone(),
                    url: l.url.clone(),
                })
                .collect(),
        }
    }
}

impl SkillCard {
    pub fn from_group(group: &SkillGroup) -> Self {
        Self {
            category: group.category.clone(),
            skills: group.skills.clone(),
        }
    }
}

impl ContactCard {
    pub fn from_contact(contact: &ContactInfo) -> Self {
        Self {
            email: contact.email.clone(),
            location: contact.location.clone(),
            phone: contact.phone.clone(),
            social_links: contact
                .social_links
                .iter()
                .map(|l| CardSocialLink {
                    platform: l.platform.clone(),
                    url: l.url.clone(),
                })
                .collect(),
        }
    }
}

impl ResumeCard {
    pub fn from_resume(resume: &ResumeInfo) -> Self {
        Self {
            name: resume.name.clone(),
            title: resume.title.clone(),
            format: resume.format.clone(),
            updated_date: resume.updated_date.clone(),
            size: resume.size.clone(),
            url: resume.url.clone(),
        }
    }
}
