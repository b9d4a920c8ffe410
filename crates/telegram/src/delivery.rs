use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{info, warn};

use common::{Announcement, AnnouncementKind, AnnouncementSink, Error, Notifier, Result};
use store::SignalBook;

use crate::format;

/// Sends plain-text messages through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient), text)
            .await
            .map(|_| ())
            .map_err(|e| Error::Delivery(e.to_string()))
    }
}

/// Routes announcements to their recipients.
///
/// New and repeated ideas go to the admin and every granted user; watchlist
/// hits go only to the user who watches the symbol. A failed send is logged
/// and the remaining recipients are still served.
pub struct Broadcaster {
    notifier: Arc<dyn Notifier>,
    book: SignalBook,
    admin_id: i64,
}

impl Broadcaster {
    pub fn new(notifier: Arc<dyn Notifier>, book: SignalBook, admin_id: i64) -> Self {
        Self { notifier, book, admin_id }
    }

    /// Admin first, then granted users in id order, without duplicates.
    async fn subscribers(&self) -> Vec<i64> {
        let granted = self.book.granted().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load permissions, notifying admin only");
            BTreeSet::new()
        });
        std::iter::once(self.admin_id)
            .chain(granted.into_iter().filter(|&id| id != self.admin_id))
            .collect()
    }

    async fn send(&self, recipient: i64, text: &str) {
        if let Err(e) = self.notifier.send(recipient, text).await {
            warn!(recipient, error = %e, "Failed to deliver announcement");
        }
    }
}

#[async_trait]
impl AnnouncementSink for Broadcaster {
    async fn deliver(&self, announcements: &[Announcement]) {
        let mut subscribers: Option<Vec<i64>> = None;

        for announcement in announcements {
            let text = format::announcement(announcement);
            match announcement.kind {
                AnnouncementKind::Watch { user_id } => self.send(user_id, &text).await,
                AnnouncementKind::New | AnnouncementKind::Repeat { .. } => {
                    if subscribers.is_none() {
                        subscribers = Some(self.subscribers().await);
                    }
                    for &id in subscribers.iter().flatten() {
                        self.send(id, &text).await;
                    }
                }
            }
        }
        info!(count = announcements.len(), "Announcements delivered");
    }
}
