use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::models::portfolio::PortfolioData;
use crate::portfolio::format_system_prompt;

/// Process-wide context, built once during startup and injected into all
/// route handlers via Axum extractors. Never mutated after construction;
/// the portfolio document and system prompt are safe for unsynchronized
/// concurrent reads.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: Arc<PortfolioData>,
    /// Rendered once from the portfolio document; every LLM call reuses it.
    pub system_prompt: Arc<str>,
    pub llm: Arc<dyn CompletionProvider>,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(portfolio: PortfolioData, llm: Arc<dyn CompletionProvider>, config: Config) -> Self {
        let system_prompt: Arc<str> = format_system_prompt(&portfolio).into();
        Self {
            portfolio: Arc::new(portfolio),
            system_prompt,
            llm,
            config,
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(provider: crate::llm_client::stub::StubProvider) -> Self {
        Self::for_tests_with_portfolio(provider, minimal_portfolio())
    }

    pub fn for_tests_with_portfolio(
        provider: crate::llm_client::stub::StubProvider,
        portfolio: PortfolioData,
    ) -> Self {
        Self::for_tests_shared(Arc::new(provider), portfolio)
    }

    /// Takes a shared stub so tests can inspect its call counters afterwards.
    pub fn for_tests_shared(
        provider: Arc<crate::llm_client::stub::StubProvider>,
        portfolio: PortfolioData,
    ) -> Self {
        Self::new(portfolio, provider, Config::for_tests())
    }
}

#[cfg(test)]
pub fn minimal_portfolio() -> PortfolioData {
    serde_json::from_str(
        r#"{
            "personalInfo": {
                "name": "Ada Lovelace",
                "bio": "Analyst and metaphysician.",
                "location": "London"
            }
        }"#,
    )
    .unwrap()
}
