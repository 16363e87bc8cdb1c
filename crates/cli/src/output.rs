//! Terminal rendering

use colored::Colorize;
use dealhub_core::domain::summary::{format_money_compact, validation_issues};
use dealhub_core::domain::{
    Agreement, AgreementRow, AgreementVersion, DealSummary, LenderInboxMessage, PollOutcome,
};
use serde_json::Value;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SummaryRow {
    deal: String,
    borrower: String,
    agent: String,
    facilities: usize,
    total: String,
}

#[derive(Tabled)]
struct VersionRow {
    version: i64,
    agreement: String,
    status: String,
    updated: String,
}

#[derive(Tabled)]
struct ListRow {
    id: i64,
    name: String,
    borrower: String,
    agent: String,
    facilities: u32,
    total: String,
    status: String,
    updated: String,
}

#[derive(Tabled)]
struct InboxRow {
    id: i64,
    deal: String,
    recipient: String,
    facilities: usize,
    total: String,
    received: String,
}

#[derive(Tabled)]
struct IssueRow {
    field: String,
    message: String,
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

pub fn print_outcome(outcome: &PollOutcome) {
    let secs = outcome.elapsed().as_secs_f64();
    match outcome {
        PollOutcome::Succeeded { job_key, .. } => println!(
            "{}",
            format!("✓ Extraction {} completed in {:.1}s", job_key, secs)
                .green()
                .bold()
        ),
        PollOutcome::Failed { job_key, error, .. } => {
            println!("{}", format!("✗ Extraction {} failed", job_key).red().bold());
            println!("  {} {}", "Error:".bold(), error);
        }
        PollOutcome::TimedOut { job_key, .. } => {
            println!(
                "{}",
                format!("⚠ Gave up waiting for {} after {:.1}s", job_key, secs)
                    .yellow()
                    .bold()
            );
            println!("  The job may still finish.");
        }
        PollOutcome::Cancelled { job_key, .. } => {
            println!("{}", format!("○ Stopped polling {}", job_key).yellow());
        }
    }

    if let Some(command) = resume_hint(outcome) {
        println!("  Resume with: {}", command);
    }
}

/// Command that picks the job up again, for outcomes that left it running
pub fn resume_hint(outcome: &PollOutcome) -> Option<String> {
    match outcome {
        PollOutcome::TimedOut { job_key, .. } | PollOutcome::Cancelled { job_key, .. } => {
            Some(format!("dealhub wait {}", job_key))
        }
        PollOutcome::Succeeded { .. } | PollOutcome::Failed { .. } => None,
    }
}

pub fn print_document_summary(document: &Value) {
    let summary = DealSummary::from_document(document);
    let row = SummaryRow {
        deal: summary.deal_name,
        borrower: or_dash(&summary.borrower),
        agent: or_dash(&summary.agent),
        facilities: summary.facilities,
        total: format_money_compact(summary.total_amount, "$"),
    };
    println!("{}", Table::new(vec![row]));

    let issues = validation_issues(document);
    if !issues.is_empty() {
        println!();
        println!("{}", format!("{} validation issue(s):", issues.len()).yellow().bold());
        let rows: Vec<IssueRow> = issues
            .into_iter()
            .map(|i| IssueRow {
                field: i.field,
                message: i.message,
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}

pub fn print_version(label: &str, version: &AgreementVersion) {
    println!("{}", format!("✓ {}", label).green().bold());
    let row = VersionRow {
        version: version.id,
        agreement: version
            .agreement_id
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        status: version
            .status
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string),
        updated: version
            .updated_at
            .or(version.created_at)
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
    };
    println!("{}", Table::new(vec![row]));
}

pub fn print_agreements(rows: Vec<AgreementRow>) {
    if rows.is_empty() {
        println!("{}", "No agreements found".yellow());
        return;
    }

    let rows: Vec<ListRow> = rows
        .into_iter()
        .map(|r| ListRow {
            id: r.agreement_id,
            name: r.agreement_name,
            borrower: or_dash(&r.borrower),
            agent: or_dash(&r.agent),
            facilities: r.facilities_count,
            total: or_dash(&r.total_amount),
            status: r.status.to_string(),
            updated: or_dash(&r.last_updated),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_agreement(label: &str, agreement: &Agreement) {
    println!("{}", format!("✓ {}", label).green().bold());
    println!("  {} {}", "Agreement:".bold(), agreement.id);
    println!("  {} {}", "Name:".bold(), agreement.name);
    println!("  {} {}", "Borrower:".bold(), or_dash(&agreement.borrower));
    println!("  {} {}", "Agent:".bold(), or_dash(&agreement.agent));
}

pub fn print_inbox(messages: Vec<LenderInboxMessage>) {
    if messages.is_empty() {
        println!("{}", "Inbox is empty".yellow());
        return;
    }

    let rows: Vec<InboxRow> = messages
        .into_iter()
        .map(|m| {
            let summary = DealSummary::from_document(&m.document());
            InboxRow {
                id: m.id,
                deal: or_dash(&m.deal_name),
                recipient: or_dash(&m.recipient_email),
                facilities: summary.facilities,
                total: format_money_compact(summary.total_amount, "$"),
                received: or_dash(&m.created_at),
            }
        })
        .collect();
    println!("{}", Table::new(rows));
}
