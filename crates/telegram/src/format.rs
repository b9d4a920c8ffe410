//! Plain-text rendering of analyses and announcements for chat messages.

use std::fmt::Write;

use common::{
    Analysis, Announcement, AnnouncementKind, Direction, Idea, IdeaOutcome, ScanStatus,
    SignalRecord, StructureReport,
};

/// Trim and upper-case a user-supplied symbol. `None` when it is blank or
/// contains anything but ASCII letters and digits.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(symbol)
}

pub fn idea(idea: &Idea) -> String {
    let marker = match idea.direction {
        Direction::Long => "🟢",
        Direction::Short => "🔴",
    };
    let mut text = format!(
        "{marker} {} {}\n\
         Entry: {}\n\
         Stop loss: {}\n\
         Take profit: {}\n\
         R:R {} | Score {}",
        idea.direction,
        idea.symbol,
        idea.entry_price,
        idea.stop_loss,
        idea.take_profit,
        idea.risk_reward_ratio,
        idea.confluence_score,
    );
    if !idea.note_tags.is_empty() {
        text.push('\n');
        text.push_str(&idea.note_tags.join(", "));
    }
    text
}

pub fn announcement(announcement: &Announcement) -> String {
    let header = match announcement.kind {
        AnnouncementKind::New => "📣 New trade idea".to_string(),
        AnnouncementKind::Repeat { since } => {
            format!("🔁 Still standing (last sent {} UTC)", since.format("%Y-%m-%d %H:%M"))
        }
        AnnouncementKind::Watch { .. } => "👀 Watchlist hit".to_string(),
    };
    format!("{header}\n{}", idea(&announcement.idea))
}

pub fn analysis(analysis: &Analysis) -> String {
    let Some(price) = analysis.price else {
        return format!("No market data for {}.", analysis.symbol);
    };

    let mut text = format!("📊 {} @ {price}\n", analysis.symbol);
    match &analysis.outcome {
        IdeaOutcome::Actionable(i) => text.push_str(&idea(i)),
        IdeaOutcome::Rejected(r) => {
            let _ = write!(text, "No trade: {} (score {})", r.reason, r.confluence_score);
        }
    }

    if let Some(report) = &analysis.structure {
        let _ = write!(text, "\n\n{}", structure(report));
    }

    if !analysis.context.is_empty() {
        text.push_str("\n\nContext:");
        for ctx in &analysis.context {
            let close = ctx.last_close.map_or("n/a".to_string(), |c| c.to_string());
            let bos = ctx
                .break_of_structure
                .map_or("no BOS".to_string(), |b| format!("BOS {}", b.direction));
            let _ = write!(text, "\n{}: close {close}, {bos}", ctx.interval);
        }
    }
    text
}

fn structure(report: &StructureReport) -> String {
    let yes_no = |hit: bool| if hit { "yes" } else { "no" };
    let bos = report
        .break_of_structure
        .map_or("none".to_string(), |b| b.direction.to_string());
    let fvg = report
        .fair_value_gap
        .map_or("none".to_string(), |g| format!("{} {}-{}", g.direction, g.low, g.high));
    let pattern = report.pattern.map_or("none".to_string(), |p| p.to_string());
    format!(
        "BOS: {bos}\nFVG: {fvg}\nOrder block: {}\nLiquidity: {}\nPattern: {pattern}",
        yes_no(report.order_block.is_some_and(|ob| ob.has_polarity())),
        yes_no(report.liquidity.is_some()),
    )
}

pub fn history(records: &[SignalRecord]) -> String {
    if records.is_empty() {
        return "No ideas announced yet.".to_string();
    }
    let mut text = String::from("Recent ideas:");
    for r in records {
        let _ = write!(
            text,
            "\n{} {} {} @ {} (score {})",
            r.announced_at.format("%m-%d %H:%M"),
            r.idea.direction,
            r.idea.symbol,
            r.idea.entry_price,
            r.idea.confluence_score,
        );
    }
    text
}

pub fn status(status: &ScanStatus, symbols: usize, recipients: usize) -> String {
    let last = status
        .last_cycle_at
        .map_or("never".to_string(), |t| format!("{} UTC", t.format("%Y-%m-%d %H:%M:%S")));
    format!(
        "Signal bot status\n\
         Symbols: {symbols}\n\
         Recipients: {recipients}\n\
         Cycles: {} ({} skipped)\n\
         Last cycle: {last}, {} announcements",
        status.cycles, status.skipped_cycles, status.last_announcements,
    )
}
