//! Wire types for the v1.1 direct message events API.
//!
//! Only the fields the bot reads are modelled. Everything is optional or
//! defaulted except event `id` and `type`, so an unexpected event shape is
//! kept (and then filtered) rather than failing the whole page.

use serde::Deserialize;

use crate::types::{Cursor, EventId, EventKind, EventPage, InboxEvent, SenderId, UrlEntity};

/// Response body of `GET direct_messages/events/list.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct EventsListResponse {
    #[serde(default)]
    pub events: Vec<WireEvent>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message_create: Option<WireMessageCreate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessageCreate {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub message_data: WireMessageData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireMessageData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub entities: WireEntities,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireEntities {
    #[serde(default)]
    pub urls: Vec<WireUrl>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUrl {
    #[serde(default)]
    pub expanded_url: String,
}

impl From<WireEvent> for InboxEvent {
    fn from(event: WireEvent) -> Self {
        let (sender, data) = match event.message_create {
            Some(mc) => (mc.sender_id, mc.message_data),
            None => (String::new(), WireMessageData::default()),
        };
        InboxEvent {
            id: EventId(event.id),
            kind: EventKind::from_tag(&event.kind),
            sender: SenderId(sender),
            text: data.text,
            links: data
                .entities
                .urls
                .into_iter()
                .map(|u| UrlEntity::new(u.expanded_url))
                .collect(),
        }
    }
}

impl From<EventsListResponse> for EventPage {
    fn from(resp: EventsListResponse) -> Self {
        EventPage {
            events: resp.events.into_iter().map(InboxEvent::from).collect(),
            next_cursor: Cursor(resp.next_cursor.unwrap_or_default()),
        }
    }
}
