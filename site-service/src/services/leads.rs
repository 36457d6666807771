//! Lead and meeting-request extraction from chat text.
//!
//! Everything here is pure: no I/O and no failure modes. A turn that
//! matches nothing leaves the lead untouched.

use crate::models::{Lead, MeetingRequest};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern compiles")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[+]?[(]?[0-9]{1,3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}")
        .expect("phone pattern compiles")
});

// Four `|`-separated fields. The topic stops at a closing quote or the end
// of the line, so a marker copied with its surrounding quotes still parses.
static MEETING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"MEETING_REQUEST:[ \t]*([^|\n]+?)[ \t]*\|[ \t]*([^|\n]+?)[ \t]*\|[ \t]*([^|\n]+?)[ \t]*\|[ \t]*([^|\n"]+?)[ \t]*"?[ \t\r]*(?:\n|$)"#,
    )
    .expect("meeting marker pattern compiles")
});

const NAME_PHRASES: [&str; 4] = ["my name is ", "i'm ", "i am ", "call me "];

/// Lead fields observed in a single turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadSignals {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub meeting_captured: bool,
}

impl LeadSignals {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && !self.meeting_captured
    }

    /// Merge into `lead`, last write wins. A name alone does not mark the
    /// lead captured.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(name) = &self.name {
            lead.name = Some(name.clone());
        }
        if let Some(email) = &self.email {
            lead.email = Some(email.clone());
            lead.captured = true;
        }
        if let Some(phone) = &self.phone {
            lead.phone = Some(phone.clone());
            lead.captured = true;
        }
        if self.meeting_captured {
            lead.captured = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_datetime: String,
    pub topic: String,
}

impl MeetingDraft {
    pub fn into_request(self, session_id: &str) -> MeetingRequest {
        MeetingRequest::new(
            session_id.to_string(),
            self.name,
            self.email,
            self.phone,
            self.preferred_datetime,
            self.topic,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub signals: LeadSignals,
    /// `prior` with `signals` applied.
    pub lead: Lead,
    pub meeting: Option<MeetingDraft>,
    /// Assistant text with the marker line removed, trimmed. Unchanged when
    /// no marker matched.
    pub cleaned_text: String,
}

pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

/// The first introduction phrase followed by at least one token wins; up to
/// two tokens form the name.
pub fn find_name(text: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    NAME_PHRASES.iter().find_map(|phrase| {
        let idx = lowered.find(phrase)?;
        let tail = &text[idx + phrase.len()..];
        let name = tail.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
        let name = name.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?'));
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Scan one exchange. Only the first meeting marker is honoured.
pub fn extract(user_text: &str, assistant_text: &str, prior: &Lead) -> Extraction {
    let mut signals = LeadSignals {
        name: find_name(user_text),
        email: find_email(user_text),
        phone: find_phone(user_text),
        meeting_captured: false,
    };

    let mut lead = prior.clone();
    signals.apply_to(&mut lead);

    let mut cleaned_text = assistant_text.to_string();
    let mut meeting = None;

    if let Some(caps) = MEETING_RE.captures(assistant_text) {
        let field = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };
        let draft = MeetingDraft {
            name: field(1),
            email: field(2),
            phone: lead.phone.clone(),
            preferred_datetime: field(3),
            topic: field(4),
        };

        signals.name = Some(draft.name.clone());
        signals.email = Some(draft.email.clone());
        signals.meeting_captured = true;
        signals.apply_to(&mut lead);

        if let Some(whole) = caps.get(0) {
            cleaned_text = strip_marker_line(assistant_text, whole.start(), whole.end());
        }
        meeting = Some(draft);
    }

    Extraction {
        signals,
        lead,
        meeting,
        cleaned_text,
    }
}

fn strip_marker_line(text: &str, start: usize, end: usize) -> String {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let mut rest = &text[end..];
    if let Some(nl) = rest.find('\n') {
        if rest[..nl].trim().is_empty() {
            rest = &rest[nl + 1..];
        }
    }
    format!("{}{}", &text[..line_start], rest).trim().to_string()
}
