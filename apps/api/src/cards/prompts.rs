// All LLM prompt constants for the card endpoints. Structured-output prompts
// are appended to the portfolio system prompt; the JSON-only rules come from
// llm_client::prompts and are added by the provider.

/// me — the info card is always synthesized; there is no static shape for it.
pub const ME_CARD_SYSTEM: &str =
    "Generate an info card about yourself. Return only valid JSON matching the schema.";
pub const ME_CARD_INPUT: &str =
    "Generate an info card about yourself with your bio, background, and key information.";

pub const ME_MESSAGE_SYSTEM: &str = "\
    Provide a professional introduction about yourself. \
    You are speaking to a potential employer, client, or hiring manager. \
    Use the information provided above. \
    Write in FIRST PERSON (use \"I\", \"my\", \"me\"). Be confident and professional.";
pub const ME_MESSAGE_INPUT: &str = "Tell me about yourself. Who are you?";

/// projects — fallback when the portfolio document has no projects.
pub const PROJECT_CARD_SYSTEM: &str =
    "Generate a project card. Return only valid JSON matching the schema.";
pub const PROJECT_CARD_INPUT: &str =
    "Generate a project card with details about one of your projects.";

/// The message must add color beyond the card, never restate it.
pub const PROJECTS_MESSAGE_SYSTEM: &str = "\
    Provide a brief, engaging summary about the projects. \
    Do NOT repeat the project details that are already visible in the card. \
    Instead, provide context, insights, or what makes these projects special. \
    Keep it concise (2-3 sentences max).";
pub const PROJECTS_MESSAGE_INPUT: &str =
    "Give me a brief summary about my projects that adds value beyond what's shown in the cards.";

pub const SKILL_CARD_SYSTEM: &str =
    "Generate a skill card. Return only valid JSON matching the schema.";
pub const SKILL_CARD_INPUT: &str = "Generate a skill card with your skills.";

pub const SKILLS_MESSAGE_SYSTEM: &str = "Provide information about your skills.";
pub const SKILLS_MESSAGE_INPUT: &str = "Tell me about your skills.";

pub const CONTACT_CARD_SYSTEM: &str =
    "Generate a contact card. Return only valid JSON matching the schema.";
pub const CONTACT_CARD_INPUT: &str =
    "Generate a contact card with your contact information.";

pub const CONTACT_MESSAGE_SYSTEM: &str = "Provide your contact information.";
pub const CONTACT_MESSAGE_INPUT: &str = "How can I contact you?";

pub const RESUME_CARD_SYSTEM: &str =
    "Generate a resume card. Return only valid JSON matching the schema.";
pub const RESUME_CARD_INPUT: &str = "Generate a resume card with resume information.";

pub const RESUME_MESSAGE_SYSTEM: &str = "Provide information about your resume.";
pub const RESUME_MESSAGE_INPUT: &str = "Show me your resume.";

/// fun — like me, always synthesized as an info card.
pub const FUN_CARD_SYSTEM: &str = "\
    Generate an info card about fun facts or interesting things about yourself. \
    Return only valid JSON matching the schema.";
pub const FUN_CARD_INPUT: &str = "Generate an info card with fun facts about yourself.";

pub const FUN_MESSAGE_SYSTEM: &str = "Share something fun or interesting about yourself.";
pub const FUN_MESSAGE_INPUT: &str = "Tell me something fun about yourself.";
