//! When to raise a crisis alert, and what to show.

use crate::flows::CrisisDetectionOutput;

/// Confidence above which a positive detection raises the alert.
pub const CRISIS_CONFIDENCE_THRESHOLD: f64 = 0.7;

pub const ALERT_TITLE: &str = "It sounds like you're going through a lot";

pub const ALERT_MESSAGE: &str = "If you are in crisis or may be in danger, please contact a \
helpline for immediate support. Your safety is the most important thing.";

/// A crisis line to surface with the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Helpline {
    pub name: &'static str,
    pub contact: &'static str,
}

pub const HELPLINES: [Helpline; 2] = [
    Helpline {
        name: "National Suicide Prevention Lifeline",
        contact: "Call 988",
    },
    Helpline {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
    },
];

/// Whether a detection result should raise the alert.
pub fn is_actionable(output: &CrisisDetectionOutput) -> bool {
    output.exceeds_threshold(CRISIS_CONFIDENCE_THRESHOLD)
}

/// The alert as plain text, for terminals and logs.
pub fn alert_text() -> String {
    let mut out = format!("{ALERT_TITLE}\n{ALERT_MESSAGE}\n");
    for line in &HELPLINES {
        out.push_str(&format!("\n  {}: {}", line.name, line.contact));
    }
    out
}
