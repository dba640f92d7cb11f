//! AI summary backend
//!
//! HTTP client for an Ollama-compatible text-generation backend. Consumes
//! already-categorized transactions and statement statistics to produce
//! prose summaries; the analysis engine never depends on it.

use chrono::Datelike;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::CategorizedTransaction;
use crate::stats::StatementStats;

/// Environment variable naming the summary backend host
pub const SUMMARY_HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable naming the model (optional)
pub const SUMMARY_MODEL_ENV: &str = "OLLAMA_MODEL";

const DEFAULT_MODEL: &str = "llama3.2";

/// Client for generating financial summaries via a local LLM
#[derive(Clone)]
pub struct SummaryClient {
    http_client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl SummaryClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables. Returns None when no backend is
    /// configured; summaries are an optional feature.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var(SUMMARY_HOST_ENV).ok()?;
        let model = std::env::var(SUMMARY_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&host, &model))
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check whether the backend is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Summary backend health check failed: {}", e);
                false
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        debug!(model = %self.model, "Requesting summary generation");

        let response = self.http_client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(Error::Summary(format!(
                "Backend returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response.trim().to_string())
    }

    /// Summarize regular bills and direct debits
    pub async fn spending_summary(
        &self,
        outgoings: &[CategorizedTransaction],
        stats: Option<&StatementStats>,
    ) -> Result<String> {
        if outgoings.is_empty() {
            return Ok("No outgoing transactions to analyze.".to_string());
        }
        self.generate(&spending_prompt(outgoings, stats)).await
    }

    /// Summarize discretionary card purchases
    pub async fn purchases_summary(
        &self,
        purchases: &[CategorizedTransaction],
        stats: Option<&StatementStats>,
    ) -> Result<String> {
        if purchases.is_empty() {
            return Ok("No purchase transactions to analyze.".to_string());
        }
        self.generate(&purchases_prompt(purchases, stats)).await
    }

    /// Summarize income sources
    pub async fn income_summary(
        &self,
        income: &[CategorizedTransaction],
        stats: Option<&StatementStats>,
    ) -> Result<String> {
        if income.is_empty() {
            return Ok("No income transactions to analyze.".to_string());
        }
        self.generate(&income_prompt(income, stats)).await
    }

    /// Full financial-health summary over the statement statistics
    pub async fn comprehensive_summary(&self, stats: &StatementStats) -> Result<String> {
        if stats.num_income_transactions == 0
            && stats.num_outgoing_transactions == 0
            && stats.num_purchase_transactions == 0
        {
            return Ok("No financial data available.".to_string());
        }
        self.generate(&comprehensive_prompt(stats)).await
    }
}

/// List transactions largest-first, one line each, for prompt context
fn transaction_lines(transactions: &[CategorizedTransaction], preposition: &str) -> String {
    let mut sorted: Vec<&CategorizedTransaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    sorted
        .iter()
        .map(|t| {
            format!(
                "- £{:.2} on day {} {} {}",
                t.amount,
                t.date.day(),
                preposition,
                t.description()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn multi_month_context(stats: Option<&StatementStats>, label: &str, avg: impl Fn(&StatementStats) -> f64) -> String {
    match stats {
        Some(s) if s.num_months > 1 => format!(
            "\nMulti-Month Analysis ({} months):\n- Average Monthly {}: £{:.2}\n- These are transactions appearing across multiple months\n",
            s.num_months,
            label,
            avg(s)
        ),
        _ => String::new(),
    }
}

fn spending_prompt(outgoings: &[CategorizedTransaction], stats: Option<&StatementStats>) -> String {
    let total: f64 = outgoings.iter().map(|t| t.amount).sum();
    format!(
        "Analyze these bank outgoings (bills, direct debits, standing orders) and provide a summary:\n\n\
         Total Spending: £{:.2}\n\
         Number of Transactions: {}\n\
         {}\n\
         All Transactions:\n{}\n\n\
         Please provide:\n\
         1. Key spending patterns\n\
         2. Largest expense categories\n\
         3. Any recommendations for budgeting\n\n\
         Keep the response concise and actionable.",
        total,
        outgoings.len(),
        multi_month_context(stats, "Outgoings", |s| s.avg_monthly_outgoings),
        transaction_lines(outgoings, "to"),
    )
}

fn purchases_prompt(purchases: &[CategorizedTransaction], stats: Option<&StatementStats>) -> String {
    let total: f64 = purchases.iter().map(|t| t.amount).sum();
    format!(
        "Analyze these purchase transactions (card purchases, debits) and provide a summary:\n\n\
         Total Spending: £{:.2}\n\
         Number of Transactions: {}\n\
         {}\n\
         All Transactions:\n{}\n\n\
         Please provide:\n\
         1. Most frequent shopping categories\n\
         2. Spending patterns\n\
         3. Recommendations for reducing discretionary spending\n\n\
         Keep the response concise and actionable.",
        total,
        purchases.len(),
        multi_month_context(stats, "Purchases", |s| s.avg_monthly_purchases),
        transaction_lines(purchases, "at"),
    )
}

fn income_prompt(income: &[CategorizedTransaction], stats: Option<&StatementStats>) -> String {
    let total: f64 = income.iter().map(|t| t.amount).sum();
    format!(
        "Analyze these income transactions and provide a summary:\n\n\
         Total Income: £{:.2}\n\
         Number of Transactions: {}\n\
         {}\n\
         All Transactions:\n{}\n\n\
         Please provide:\n\
         1. Main sources of income\n\
         2. Income patterns\n\
         3. Any observations\n\n\
         Keep the response concise.",
        total,
        income.len(),
        multi_month_context(stats, "Income", |s| s.avg_monthly_income),
        transaction_lines(income, "from"),
    )
}

fn comprehensive_prompt(stats: &StatementStats) -> String {
    format!(
        "Provide a comprehensive financial summary based on {} month(s) of bank data:\n\n\
         INCOME:\n\
         - Total: £{:.2}\n\
         - Average Monthly: £{:.2}\n\
         - Transactions: {}\n\n\
         OUTGOINGS (Bills & Direct Debits):\n\
         - Total: £{:.2}\n\
         - Average Monthly: £{:.2}\n\
         - Transactions: {}\n\n\
         PURCHASES (Discretionary Spending):\n\
         - Total: £{:.2}\n\
         - Average Monthly: £{:.2}\n\
         - Transactions: {}\n\n\
         OVERALL:\n\
         - Total Spent: £{:.2}\n\
         - Average Monthly Spending: £{:.2}\n\
         - Net Position: £{:.2}\n\n\
         Please provide:\n\
         1. Overall financial health assessment\n\
         2. Key insights about spending vs income\n\
         3. Budget recommendations\n\
         4. Areas for potential savings\n\n\
         Keep the response actionable and insightful.",
        stats.num_months,
        stats.total_income,
        stats.avg_monthly_income,
        stats.num_income_transactions,
        stats.total_outgoings,
        stats.avg_monthly_outgoings,
        stats.num_outgoing_transactions,
        stats.total_purchases,
        stats.avg_monthly_purchases,
        stats.num_purchase_transactions,
        stats.total_spent,
        stats.avg_monthly_spent,
        stats.net_position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn outgoing(day: u32, amount: f64, merchant: &str) -> CategorizedTransaction {
        CategorizedTransaction {
            id: day as i64,
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            amount,
            memo: merchant.to_string(),
            category: Category::Outgoing {
                merchant: merchant.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn empty_inputs_short_circuit_without_a_backend() {
        // Unreachable host: the client must not be called for empty input
        let client = SummaryClient::new("http://127.0.0.1:1", "test");
        let summary = client.spending_summary(&[], None).await.unwrap();
        assert_eq!(summary, "No outgoing transactions to analyze.");

        let summary = client.income_summary(&[], None).await.unwrap();
        assert_eq!(summary, "No income transactions to analyze.");
    }

    #[test]
    fn prompt_lists_transactions_largest_first() {
        let prompt = spending_prompt(
            &[outgoing(3, 9.99, "NETFLIX"), outgoing(1, 120.0, "COUNCIL")],
            None,
        );
        let netflix = prompt.find("NETFLIX").unwrap();
        let council = prompt.find("COUNCIL").unwrap();
        assert!(council < netflix);
        assert!(prompt.contains("£129.99"));
        assert!(prompt.contains("on day 1 to COUNCIL"));
    }

    #[test]
    fn multi_month_context_only_appears_past_one_month() {
        let set = crate::models::CategorizedSet {
            outgoings: vec![outgoing(1, 10.0, "A")],
            ..Default::default()
        };

        let single = crate::stats::compute_stats(&set, 1);
        let prompt = spending_prompt(&set.outgoings, Some(&single));
        assert!(!prompt.contains("Multi-Month Analysis"));

        let multi = crate::stats::compute_stats(&set, 3);
        let prompt = spending_prompt(&set.outgoings, Some(&multi));
        assert!(prompt.contains("Multi-Month Analysis (3 months)"));
    }
}
