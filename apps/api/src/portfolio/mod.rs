//! Portfolio context provider — loads the static document and renders it
//! into the system prompt used by every LLM call.

use std::path::Path;

use tracing::info;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioData;

/// Loads the portfolio document from disk.
///
/// Called once at startup; the document is immutable afterwards. Any I/O or
/// parse failure is a `DataUnavailable` error — every category resolution
/// depends on this document.
pub fn load_portfolio(path: &Path) -> Result<PortfolioData, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::DataUnavailable(format!("{}: {e}", path.display())))?;
    let data: PortfolioData = serde_json::from_str(&raw)
        .map_err(|e| AppError::DataUnavailable(format!("{}: {e}", path.display())))?;
    info!(
        "Portfolio loaded: {} projects, {} skill groups",
        data.projects.len(),
        data.skills.len()
    );
    Ok(data)
}

/// Renders the portfolio document into the natural-language system prompt.
///
/// Section order is fixed; absent optional sections are skipped entirely
/// rather than rendered empty.
pub fn format_system_prompt(data: &PortfolioData) -> String {
    let mut prompt = format!(
        "You are an AI assistant representing {}.\n\n",
        data.personal_info.name
    );

    prompt.push_str("Personal Information:\n");
    prompt.push_str(&format!("- Name: {}\n", data.personal_info.name));
    prompt.push_str(&format!("- Bio: {}\n", data.personal_info.bio));
    prompt.push_str(&format!("- Location: {}\n", data.personal_info.location));
    if let Some(age) = data.personal_info.age {
        prompt.push_str(&format!("- Age: {age}\n"));
    }
    if let Some(tagline) = &data.personal_info.tagline {
        prompt.push_str(&format!("- Tagline: {tagline}\n"));
    }
    prompt.push('\n');

    if !data.projects.is_empty() {
        prompt.push_str("Projects:\n");
        for (index, project) in data.projects.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {} ({})\n",
                index + 1,
                project.title,
                project.year
            ));
            prompt.push_str(&format!("   Description: {}\n", project.description));
            if !project.technologies.is_empty() {
                prompt.push_str(&format!(
                    "   Technologies: {}\n",
                    project.technologies.join(", ")
                ));
            }
            if !project.links.is_empty() {
                let links: Vec<String> = project
                    .links
                    .iter()
                    .map(|l| format!("{}: {}", l.label, l.url))
                    .collect();
                prompt.push_str(&format!("   Links: {}\n", links.join(", ")));
            }
            prompt.push('\n');
        }
    }

    if !data.skills.is_empty() {
        prompt.push_str("Skills:\n");
        for group in &data.skills {
            prompt.push_str(&format!(
                "- {}: {}\n",
                group.category,
                group.skills.join(", ")
            ));
        }
        prompt.push('\n');
    }

    if !data.work_experience.is_empty() {
        prompt.push_str("Work Experience:\n");
        for exp in &data.work_experience {
            prompt.push_str(&format!(
                "- {} at {} ({} - {})\n",
                exp.position,
                exp.company,
                exp.start_date,
                exp.end_date.as_deref().unwrap_or("Present")
            ));
            prompt.push_str(&format!("  {}\n", exp.description));
            if !exp.technologies.is_empty() {
                prompt.push_str(&format!("  Technologies: {}\n", exp.technologies.join(", ")));
            }
        }
        prompt.push('\n');
    }

    if !data.education.is_empty() {
        prompt.push_str("Education:\n");
        for edu in &data.education {
            let field = edu
                .field
                .as_deref()
                .map(|f| format!(" in {f}"))
                .unwrap_or_default();
            prompt.push_str(&format!(
                "- {}{} from {}\n",
                edu.degree, field, edu.institution
            ));
            prompt.push_str(&format!(
                "  {} - {}\n",
                edu.start_date,
                edu.end_date.as_deref().unwrap_or("Present")
            ));
        }
        prompt.push('\n');
    }

    if let Some(contact) = &data.contact_info {
        prompt.push_str("Contact Information:\n");
        prompt.push_str(&format!("- Email: {}\n", contact.email));
        if let Some(phone) = &contact.phone {
            prompt.push_str(&format!("- Phone: {phone}\n"));
        }
        prompt.push_str(&format!("- Location: {}\n", contact.location));
        if !contact.social_links.is_empty() {
            let links: Vec<String> = contact
                .social_links
                .iter()
                .map(|l| format!("{}: {}", l.platform, l.url))
                .collect();
            prompt.push_str(&format!("- Social Links: {}\n", links.join(", ")));
        }
        prompt.push('\n');
    }

    if !data.fun_facts.is_empty() {
        prompt.push_str("Fun Facts:\n");
        for fact in &data.fun_facts {
            prompt.push_str(&format!("- {fact}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str("\nInstructions:\n");
    prompt.push_str(&format!(
        "- Answer questions about {} based on the information above.\n",
        data.personal_info.name
    ));
    prompt.push_str("- Be friendly, professional, and engaging.\n");
    prompt.push_str(
        "- When asked about projects, skills, contact info, or resume, provide structured data along with your response.\n",
    );
    prompt.push_str("- Use the structured output format when appropriate.\n");

    prompt
}
