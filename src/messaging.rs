use crate::store::Record;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{(.*?)\}\}").unwrap();
    static ref BULK_PHONE_REGEX: Regex = Regex::new(r"^\d{10,15}$").unwrap();
}

/// Digits kept by phone normalization; everything else is separator noise.
fn strip_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.' | '+'))
        .collect()
}

/// Normalize a phone value for the bulk-send path.
///
/// After stripping separators the value must be 10-15 digits; a bare
/// 10-digit number gets the `91` country prefix. Anything else is unusable
/// and excluded from the batch.
pub fn normalize_phone(value: &str) -> Option<String> {
    let digits = strip_phone(value.trim());
    if !BULK_PHONE_REGEX.is_match(&digits) {
        return None;
    }
    if digits.len() == 10 {
        Some(format!("91{}", digits))
    } else {
        Some(digits)
    }
}

/// Looser check used outside the bulk sender: usable when the value has at
/// least 7 digits once non-digits are removed.
pub fn is_sendable_phone(value: &str) -> bool {
    value.chars().filter(|c| c.is_ascii_digit()).count() >= 7
}

/// Replace `{{Column Name}}` placeholders with the record's field values.
/// Unknown placeholders become empty strings.
pub fn fill_placeholders(template: &str, record: &Record) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            record.get(caps[1].trim()).to_string()
        })
        .into_owned()
}

/// Canned message templates offered by the messaging dialogs.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Template {
    Registration,
    Reminder,
    ThankYou,
    Feedback,
    Promo,
    Custom,
}

impl Template {
    /// Render the template body for an event; `{{Name}}` placeholders are
    /// left for per-record filling. `Custom` renders empty.
    pub fn render(self, event_name: &str) -> String {
        match self {
            Template::Registration => format!(
                "Dear {{{{Name}}}},\n\nThank you for registering for {event_name}!\n\nYour registration has been confirmed. We look forward to seeing you at the event.\n\nBest regards,\nThe {event_name} Team"
            ),
            Template::Reminder => format!(
                "Hi {{{{Name}}}},\n\nJust a friendly reminder that {event_name} is coming up soon! We're excited to see you there.\n\nBest,\nThe {event_name} Team"
            ),
            Template::ThankYou => format!(
                "Dear {{{{Name}}}},\n\nThank you for attending {event_name}! We hope you had a great time.\n\nWe would love to hear your feedback.\n\nBest regards,\nThe {event_name} Team"
            ),
            Template::Feedback => format!(
                "Hi {{{{Name}}}},\n\nWe'd love to get your feedback on {event_name}. Your feedback is important to us and will help us improve future events.\n\nThanks,\nThe {event_name} Team"
            ),
            Template::Promo => format!(
                "Hello {{{{Name}}}},\n\nAs a valued member of our community, we're excited to offer you a special discount for our next event!\n\nWe hope to see you there!\n\nBest,\nThe {event_name} Team"
            ),
            Template::Custom => String::new(),
        }
    }
}

/// Build a `mailto:` URI with percent-encoded subject and body.
pub fn mailto_link(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

/// Build a `https://wa.me/<digits>?text=...` deep link.
pub fn whatsapp_link(phone_digits: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        phone_digits,
        urlencoding::encode(message)
    )
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Channel {
    Email,
    WhatsApp,
}

/// One prepared outbound message: the link is handed to the browser layer,
/// which opens it. Success means "the link was opened", not delivered.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Outbound {
    pub recipient: String,
    pub url: String,
}

/// The result of preparing a batch: usable links plus how many records were
/// excluded for an unusable recipient value. Invalid entries never block
/// the rest of the batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub messages: Vec<Outbound>,
    pub skipped: usize,
}

/// Prepare a send batch over a set of records.
///
/// The recipient comes from `column` on each record; the message template
/// is personalized per record via `{{Header}}` placeholders. WhatsApp
/// recipients go through the strict 10-15 digit normalization; email
/// recipients only need to be non-empty.
pub fn build_batch(
    records: &[&Record],
    column: &str,
    subject: &str,
    message: &str,
    channel: Channel,
) -> Batch {
    let mut batch = Batch::default();

    for record in records {
        let raw = record.get(column).trim().to_string();
        let personalized = fill_placeholders(message, record);

        let outbound = match channel {
            Channel::Email => {
                if raw.is_empty() {
                    None
                } else {
                    Some(Outbound {
                        url: mailto_link(&raw, subject, &personalized),
                        recipient: raw,
                    })
                }
            }
            Channel::WhatsApp => normalize_phone(&raw).map(|digits| Outbound {
                url: whatsapp_link(&digits, &personalized),
                recipient: digits,
            }),
        };

        match outbound {
            Some(m) => batch.messages.push(m),
            None => batch.skipped += 1,
        }
    }

    if batch.skipped > 0 {
        log::warn!(
            "{} record(s) excluded from the {} batch for unusable recipients",
            batch.skipped,
            match channel {
                Channel::Email => "email",
                Channel::WhatsApp => "whatsapp",
            }
        );
    }
    batch
}
