//! Walks a $90M pre-earnings NVDA sale through capture, governance, human
//! review, and execution.

use std::sync::Arc;

use anyhow::Result;
use intentcore::config::GovernanceConfig;
use intentcore::kernel::{DecisionManager, ReviewSubmission};
use intentcore::primitives::{Conversation, ProposedAction, Turn};
use intentcore::reasoning::{ExecutionStatus, ExtractionRequest, HumanDecision};
use intentcore::store::{FileAuditJournal, InMemoryStore};
use intentcore::telemetry::init_tracing;
use serde_json::{Map, json};
use tracing::info;

const TASK: &str = "Analyze NVDA position and recommend rebalancing before earnings";

const ANALYSIS: &str = "I'll analyze the NVDA position.

Current Situation:
As of today, our portfolio shows NVDA concentration at 32%, significantly above our 25% maximum sector concentration policy. The position is valued at $280M in a $875M total portfolio. Given that NVIDIA's earnings announcement is scheduled for tomorrow, this creates additional timing risk.

Quantitative Analysis:
- Current NVDA holding: $280M (32% of portfolio)
- Target maximum: $218.75M (25% of portfolio)
- Required reduction: $61.25M minimum
- Recommended reduction: $90M (to provide buffer below threshold)
- This would bring NVDA to 21.7% of portfolio

Market Data:
- NVDA current price: $487.50
- 30-day average volume: 42M shares
- Recent volatility: 18.2% (elevated pre-earnings)
- Analyst consensus: 65% positive

Alternatives Considered:
1. Wait until after earnings: Risk of concentration violation if stock rises
2. Reduce by minimum ($61.25M): Leaves little buffer, may need adjustment again soon
3. Reduce by $90M: Provides comfortable buffer, reduces earnings risk
4. Reduce entire position: Too aggressive, NVDA remains fundamentally strong

Risks Identified:
- Execution risk: Large trade size may impact price
- Timing risk: Pre-earnings trade increases uncertainty
- Opportunity risk: If earnings positive, we reduce upside capture
- Market risk: Current elevated volatility

Rationale:
Given the policy violation (32% vs 25% max), pre-earnings timing risk, and need for portfolio risk reduction, I recommend selling $90M of NVDA. This action balances compliance requirements with prudent risk management while maintaining meaningful exposure to a strong holding.

I will execute this trade.
";

fn proposed_trade() -> Result<ProposedAction> {
    Ok(ProposedAction::new(
        "call_trade_123",
        "execute_trade",
        json!({
            "symbol": "NVDA",
            "action": "SELL",
            "amount": "$90M",
            "reason": "Reduce pre-earnings concentration risk",
        })
        .to_string(),
    )?)
}

fn conversation(trade: ProposedAction) -> Conversation {
    Conversation::new(vec![
        Turn::user(
            "Analyze our NVDA position and recommend rebalancing actions. \
             Earnings announcement is tomorrow.",
        ),
        Turn::assistant(ANALYSIS),
        Turn::assistant_with_actions(None, vec![trade]),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info")?;

    let config = GovernanceConfig::load_from_env()?;
    let journal_path = std::env::temp_dir().join("intentcore-walkthrough.ndjson");
    let journal = FileAuditJournal::open(&journal_path).await?;
    let store = Arc::new(InMemoryStore::new().with_journal(Arc::new(journal)));
    let manager = DecisionManager::new(store, config);

    info!("--- Step 1: capture and govern the proposed trade ---");
    let trade = proposed_trade()?;
    let request = ExtractionRequest::new(
        "portfolio_agent_001",
        "Portfolio_Rebalancing_Agent",
        TASK,
        conversation(trade.clone()),
    )
    .with_targeted_action(trade);
    let processed = manager.process_decision(request).await?;
    let record_id = processed.record.id();

    info!("{}", processed.record.summary());
    info!("Verdict: {}", processed.verdict.reasoning());
    for warning in processed.verdict.warnings() {
        info!("  warning: {warning}");
    }
    if let Some(priority) = processed.priority {
        info!("Queued for review with {priority} priority");
    }

    info!("--- Step 2: portfolio manager approves a smaller sale ---");
    let mut changes = Map::new();
    changes.insert("amount".into(), json!("$50M"));
    let reviewed = manager
        .submit_human_decision(
            record_id,
            ReviewSubmission::new("sarah.chen@fund.com", HumanDecision::Approved)
                .with_rationale(
                    "Reduce size given earnings uncertainty, execute the rest post-earnings",
                )
                .with_modification(changes),
        )
        .await?;
    info!(
        "Decision: {} with parameters {}",
        reviewed.governance_decision(),
        json!(reviewed.effective_parameters())
    );

    info!("--- Step 3: record execution ---");
    manager
        .record_execution(record_id, ExecutionStatus::Executing, None)
        .await?;
    let executed = manager
        .record_execution(
            record_id,
            ExecutionStatus::Completed,
            Some(json!({"filled": "$50M", "avg_price": 487.12})),
        )
        .await?;
    info!("Execution status: {}", executed.execution_status());

    info!("--- Audit trail ---");
    for event in manager.audit_trail(Some(record_id)).await? {
        info!(
            "{} {} by {}",
            event.recorded_at().to_rfc3339(),
            event.kind(),
            event.actor_id().unwrap_or("system")
        );
    }

    let stats = manager.summary_stats().await?;
    let quality = manager.metrics().await;
    info!(
        "Records: {}, reviews: {}, approved: {}, avg extraction latency: {:.2}ms",
        stats.total_records, stats.total_reviews, stats.total_approved, quality.avg_latency_ms
    );
    info!("Audit journal written to {}", journal_path.display());
    Ok(())
}
