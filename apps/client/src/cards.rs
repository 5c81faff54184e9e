//! Client-side copy of the card wire contract.
//!
//! Deliberately duplicated rather than shared with the API crate: the SSE
//! and card endpoints are the contract, and the client must reject payloads
//! the server never promised (unknown discriminants fail to parse here).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

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
    pub phone: Option<String>,
    #[serde(default)]
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
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub content: String,
    pub metadata: Option<BTreeMap<String, Value>>,
}

/// Response body of `GET /api/cards/:category`. `projects` is present for
/// the projects category only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    pub structured_data: StructuredOutput,
    pub message: String,
    #[serde(default)]
    pub projects: Option<Vec<ProjectCard>>,
}
