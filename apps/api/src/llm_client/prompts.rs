// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Appended to the portfolio system prompt for structured-output calls.
/// The `type` values must match the serde discriminants in `models::cards`.
pub const STRUCTURED_OUTPUT_SYSTEM: &str = "\
    Generate structured output for the user query. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies. \
    The JSON object MUST have a \"type\" field set to exactly one of: \
    \"project\", \"skill\", \"contact\", \"resume\", \"info\".";

/// Appended to every card message prompt. The assistant speaks AS the
/// portfolio owner, never about them.
pub const FIRST_PERSON_INSTRUCTION: &str = "\
    Write in FIRST PERSON (use \"I\", \"my\", \"me\" - NOT \"your\", \"you\"). \
    You are speaking as the person, not about them.";
