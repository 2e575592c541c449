//! Email delivery summary built from raw provider events (sent, delivered,
//! opened, clicked, bounced, complained).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::assemble::DeliverySummaryRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailEventKind {
    #[default]
    Sent,
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Complained,
    #[serde(other)]
    Other,
}

impl EmailEventKind {
    /// Rank used to pick a recipient's headline status. Unrecognised
    /// events rank with `sent` and never replace it.
    pub fn priority(self) -> u8 {
        match self {
            Self::Complained => 5,
            Self::Bounced => 4,
            Self::Clicked => 3,
            Self::Opened => 2,
            Self::Delivered => 1,
            Self::Sent | Self::Other => 0,
        }
    }
}

/// One webhook event as stored by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailEventRow {
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub event_type: EmailEventKind,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl EmailEventRow {
    fn recipient_key(&self) -> &str {
        match self.creator_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.email_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipientEvent {
    pub event_type: EmailEventKind,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Delivery state of a single recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipientDelivery {
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub recipient: String,
    /// Highest-priority event seen for the recipient.
    pub status: EmailEventKind,
    #[serde(default)]
    pub events: Vec<RecipientEvent>,
}

/// Fold a campaign's email events into per-recipient counts.
///
/// Events are grouped by creator id, falling back to the provider email id.
/// `total_sent` is the number of recipients; each of delivered, opened,
/// clicked and bounced counts a recipient once if any of its events has
/// that type. Recipients keep first-seen order.
pub fn delivery_summary(events: &[EmailEventRow]) -> DeliverySummaryRow {
    let mut recipients: Vec<RecipientDelivery> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for event in events {
        let slot = *index.entry(event.recipient_key()).or_insert_with(|| {
            recipients.push(RecipientDelivery {
                creator_id: event.creator_id.clone().unwrap_or_default(),
                email_id: event.email_id.clone(),
                recipient: event.recipient.clone(),
                status: EmailEventKind::Sent,
                events: Vec::new(),
            });
            recipients.len() - 1
        });
        recipients[slot].events.push(RecipientEvent {
            event_type: event.event_type,
            created_at: event.created_at.clone(),
        });
    }

    let mut summary = DeliverySummaryRow {
        total_sent: recipients.len() as u64,
        ..Default::default()
    };

    for recipient in &mut recipients {
        let mut best = EmailEventKind::Sent;
        for e in &recipient.events {
            if e.event_type.priority() > best.priority() {
                best = e.event_type;
            }
        }
        recipient.status = best;

        let seen: HashSet<EmailEventKind> = recipient.events.iter().map(|e| e.event_type).collect();
        summary.delivered += u64::from(seen.contains(&EmailEventKind::Delivered));
        summary.opened += u64::from(seen.contains(&EmailEventKind::Opened));
        summary.clicked += u64::from(seen.contains(&EmailEventKind::Clicked));
        summary.bounced += u64::from(seen.contains(&EmailEventKind::Bounced));
    }

    debug!(
        events = events.len(),
        recipients = summary.total_sent,
        "Email events folded into delivery summary"
    );
    summary.per_creator = recipients;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn events(value: serde_json::Value) -> Vec<EmailEventRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_counts_each_recipient_once_per_type() {
        let rows = events(json!([
            {"email_id": "em-1", "event_type": "sent", "creator_id": "cr-1", "recipient": "a@test.com"},
            {"email_id": "em-1", "event_type": "delivered", "creator_id": "cr-1"},
            {"email_id": "em-1", "event_type": "opened", "creator_id": "cr-1"},
            {"email_id": "em-1", "event_type": "opened", "creator_id": "cr-1"},
            {"email_id": "em-2", "event_type": "sent", "creator_id": "cr-2", "recipient": "b@test.com"},
            {"email_id": "em-2", "event_type": "bounced", "creator_id": "cr-2"},
            {"email_id": "em-3", "event_type": "delivered", "creator_id": "cr-3"},
            {"email_id": "em-3", "event_type": "clicked", "creator_id": "cr-3"}
        ]));
        let summary = delivery_summary(&rows);

        assert_eq!(summary.total_sent, 3);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.opened, 1);
        assert_eq!(summary.clicked, 1);
        assert_eq!(summary.bounced, 1);

        let statuses: Vec<EmailEventKind> = summary.per_creator.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![EmailEventKind::Opened, EmailEventKind::Bounced, EmailEventKind::Clicked]
        );
        assert_eq!(summary.per_creator[0].recipient, "a@test.com");
        assert_eq!(summary.per_creator[0].events.len(), 4);
    }

    #[test]
    fn test_groups_by_email_id_without_creator() {
        let rows = events(json!([
            {"email_id": "em-1", "event_type": "sent", "creator_id": ""},
            {"email_id": "em-1", "event_type": "delivered"},
            {"email_id": "em-2", "event_type": "complained"},
            {"email_id": "em-2", "event_type": "delivery_delayed"}
        ]));
        let summary = delivery_summary(&rows);

        assert_eq!(summary.total_sent, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.per_creator[0].email_id, "em-1");
        assert_eq!(summary.per_creator[1].status, EmailEventKind::Complained);
        assert_eq!(summary.per_creator[1].events[1].event_type, EmailEventKind::Other);
    }

    #[test]
    fn test_no_events_is_all_zero() {
        let summary = delivery_summary(&[]);
        assert_eq!(summary.total_sent, 0);
        assert_eq!(summary.delivered, 0);
        assert!(summary.per_creator.is_empty());
    }
}
