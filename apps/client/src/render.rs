//! Card renderer — pure mapping from a structured payload to a terminal
//! block. One arm per discriminant, nothing else.

use colored::Colorize;

use crate::cards::{
    ContactCard, InfoCard, ProjectCard, ResumeCard, SkillCard, StructuredOutput,
};

pub fn render_card(card: &StructuredOutput) -> String {
    match card {
        StructuredOutput::Project(card) => render_project(card),
        StructuredOutput::Skill(card) => render_skill(card),
        StructuredOutput::Contact(card) => render_contact(card),
        StructuredOutput::Resume(card) => render_resume(card),
        StructuredOutput::Info(card) => render_info(card),
    }
}

/// Renders the full project list under the first card (projects category).
pub fn render_project_list(projects: &[ProjectCard]) -> String {
    let mut out = String::new();
    for (index, project) in projects.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&render_project(project));
    }
    out
}

fn render_project(card: &ProjectCard) -> String {
    let mut out = format!(
        "{} {}\n{}\n",
        card.title.bold(),
        format!("({})", card.year).dimmed(),
        card.description
    );
    if !card.technologies.is_empty() {
        out.push_str(&format!(
            "{} {}\n",
            "tech:".cyan(),
            card.technologies.join(", ")
        ));
    }
    for link in &card.links {
        out.push_str(&format!("{} {}\n", format!("{}:", link.label).cyan(), link.url));
    }
    out
}

fn render_skill(card: &SkillCard) -> String {
    let mut out = format!("{}\n", card.category.bold());
    for skill in &card.skills {
        out.push_str(&format!("  - {skill}\n"));
    }
    out
}

fn render_contact(card: &ContactCard) -> String {
    let mut out = format!("{}\n", "Contact".bold());
    out.push_str(&format!("{} {}\n", "email:".cyan(), card.email));
    if let Some(phone) = &card.phone {
        out.push_str(&format!("{} {phone}\n", "phone:".cyan()));
    }
    out.push_str(&format!("{} {}\n", "location:".cyan(), card.location));
    for link in &card.social_links {
        out.push_str(&format!(
            "{} {}\n",
            format!("{}:", link.platform).cyan(),
            link.url
        ));
    }
    out
}

fn render_resume(card: &ResumeCard) -> String {
    let mut out = format!("{} {}\n", card.title.bold(), card.name);
    out.push_str(&format!(
        "{} {} · {} · updated {}\n",
        "file:".cyan(),
        card.format,
        card.size,
        card.updated_date
    ));
    if let Some(url) = &card.url {
        out.push_str(&format!("{} {url}\n", "download:".cyan()));
    }
    out
}

fn render_info(card: &InfoCard) -> String {
    format!("{}\n{}\n", card.title.bold(), card.content)
}
