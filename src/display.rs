//! Presentation helpers shared by the views and the command line.

use chrono::{DateTime, Local, TimeZone};

use crate::models::{Contract, Event, Severity};

/// Color tier of a risk percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    /// Below 40%.
    Safe,
    /// 40% to 69%.
    Elevated,
    /// 70% and above.
    High,
}

/// Converts a 0-10 risk level into a 0-100 percentage.
///
/// A missing level is shown as 0%, i.e. "safe". This fails open on missing
/// analysis data rather than showing an unknown state.
pub fn risk_percent(risk_level: Option<f64>) -> u8 {
    let level = risk_level.filter(|l| l.is_finite()).unwrap_or(0.0);
    (level / 10.0 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Tier used for coloring a risk percentage.
pub fn risk_tier(percent: u8) -> RiskTier {
    match percent {
        70.. => RiskTier::High,
        40.. => RiskTier::Elevated,
        _ => RiskTier::Safe,
    }
}

/// Shortens long hashes to `abcdef...wxyz`. Values of 12 characters or fewer
/// are returned unchanged.
pub fn short_hash(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        return value.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Formats Unix seconds in the given time zone, or `n/a` when absent or out
/// of range.
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

/// Formats Unix seconds in local time.
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// Severity label, `n/a` when absent.
pub fn severity_label(severity: Option<Severity>) -> &'static str {
    severity.map(|s| s.as_str()).unwrap_or("n/a")
}

/// One summary line for a contract.
pub fn contract_line(contract: &Contract) -> String {
    let percent = risk_percent(contract.risk_level);
    format!(
        "{id}  {name}  {chain}/{network}  {state}  risk {percent}% ({tier:?})",
        id = contract.id,
        name = short_hash(contract.display_name()),
        chain = contract.chain,
        network = contract.network,
        state = if contract.active { "active" } else { "inactive" },
        tier = risk_tier(percent),
    )
}

/// Analysis details of a contract, indented under its summary line. Empty
/// sections are skipped.
pub fn contract_details(contract: &Contract) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(email) = contract.owner_email() {
        lines.push(format!("    owner: {email}"));
    }
    if !contract.breach_vectors.is_empty() {
        lines.push(format!("    breach vectors: {}", contract.breach_vectors.join(", ")));
    }
    if !contract.monitoring_events.is_empty() {
        lines.push(format!("    monitoring: {}", contract.monitoring_events.join(", ")));
    }
    if let Some(report) = contract.formatted_report.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        lines.push("    report:".to_string());
        lines.extend(report.lines().map(|line| format!("      {line}")));
    }
    lines
}

/// Summary lines for an event: the headline plus optional recommendation and
/// AI message lines.
pub fn event_lines(event: &Event) -> Vec<String> {
    let mut lines = vec![format!(
        "{time}  {name}  severity={severity}{breach}",
        time = format_timestamp(event.timestamp),
        name = event.event_name,
        severity = severity_label(event.severity),
        breach = if event.breach_detected { "  [BREACH]" } else { "" },
    )];
    if let Some(action) = event.recommended_action.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("    recommended: {action}"));
    }
    if let Some(message) = event.ai_message() {
        lines.push(format!("    ai analysis: {message}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::test_helpers::{ContractBuilder, EventBuilder};

    #[test]
    fn test_risk_percent_over_documented_range() {
        for tenths in 0..=100 {
            let level = f64::from(tenths) / 10.0;
            let percent = risk_percent(Some(level));
            assert_eq!(f64::from(percent), (level / 10.0 * 100.0).round());
            assert!(percent <= 100);
        }
    }

    #[test]
    fn test_risk_percent_absent_is_zero() {
        assert_eq!(risk_percent(None), 0);
        assert_eq!(risk_tier(risk_percent(None)), RiskTier::Safe);
    }

    #[test]
    fn test_risk_percent_is_clamped() {
        assert_eq!(risk_percent(Some(14.0)), 100);
        assert_eq!(risk_percent(Some(-3.0)), 0);
        assert_eq!(risk_percent(Some(f64::NAN)), 0);
    }

    #[test]
    fn test_risk_tiers() {
        assert_eq!(risk_tier(39), RiskTier::Safe);
        assert_eq!(risk_tier(40), RiskTier::Elevated);
        assert_eq!(risk_tier(69), RiskTier::Elevated);
        assert_eq!(risk_tier(70), RiskTier::High);
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0x1234567890"), "0x1234567890");
        assert_eq!(short_hash("0xabcdef0123456789"), "0xabcd...6789");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp_in(Some(0), &Utc), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp_in(None, &Utc), "n/a");
        assert_eq!(format_timestamp_in(Some(i64::MAX), &Utc), "n/a");
    }

    #[test]
    fn test_contract_line_falls_back_to_hash() {
        let contract = ContractBuilder::new("c1").hash("0xabcdef0123456789").risk_level(7.0).build();
        let line = contract_line(&contract);
        assert!(line.contains("0xabcd...6789"));
        assert!(line.contains("risk 70% (High)"));
    }

    #[test]
    fn test_contract_details_skip_empty_sections() {
        let bare = ContractBuilder::new("c1").build();
        assert!(contract_details(&bare).is_empty());

        let mut contract = ContractBuilder::new("c2")
            .owner_email("ops@example.com")
            .breach_vectors(vec!["reentrancy".into(), "admin key".into()])
            .build();
        contract.formatted_report = Some("Line one\nLine two\n".into());
        let lines = contract_details(&contract);
        assert_eq!(
            lines,
            vec![
                "    owner: ops@example.com",
                "    breach vectors: reentrancy, admin key",
                "    report:",
                "      Line one",
                "      Line two",
            ]
        );
    }

    #[test]
    fn test_event_lines_include_optional_parts() {
        let event = EventBuilder::new("e1")
            .breach(true)
            .recommended_action("Pause")
            .ai_message("Drain pattern")
            .build();
        let lines = event_lines(&event);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("severity=n/a"));
        assert!(lines[0].ends_with("[BREACH]"));
        assert_eq!(lines[2], "    ai analysis: Drain pattern");
    }
}
