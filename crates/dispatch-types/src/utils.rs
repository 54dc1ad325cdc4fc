//! Display helpers for log lines.

/// Formats an amount in currency units, e.g. `25€`.
pub fn format_amount(amount: u64) -> String {
	format!("{}€", amount)
}
