use chrono::{DateTime, Utc};
use serde::Serialize;

/// Listing lifecycle events the notification service turns into owner emails.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingEvent {
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingNotification {
    pub event: ListingEvent,
    pub recipient_email: String,
    pub business_id: i64,
    pub business_name: String,
    pub rejection_reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct NotifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotifyClient {
    pub fn new(base_url: String) -> Self {
        let normalized = normalize_base_url(&base_url);
        Self {
            client: reqwest::Client::new(),
            base_url: normalized,
        }
    }

    /// Confirmation email for a freshly submitted listing.
    pub async fn listing_submitted(
        &self,
        recipient_email: String,
        business_id: i64,
        business_name: String,
    ) -> Result<(), String> {
        self.send(ListingNotification {
            event: ListingEvent::Submitted,
            recipient_email,
            business_id,
            business_name,
            rejection_reason: None,
            occurred_at: Utc::now(),
        })
        .await
    }

    pub async fn listing_approved(
        &self,
        recipient_email: String,
        business_id: i64,
        business_name: String,
    ) -> Result<(), String> {
        self.send(ListingNotification {
            event: ListingEvent::Approved,
            recipient_email,
            business_id,
            business_name,
            rejection_reason: None,
            occurred_at: Utc::now(),
        })
        .await
    }

    pub async fn listing_rejected(
        &self,
        recipient_email: String,
        business_id: i64,
        business_name: String,
        reason: String,
    ) -> Result<(), String> {
        self.send(ListingNotification {
            event: ListingEvent::Rejected,
            recipient_email,
            business_id,
            business_name,
            rejection_reason: Some(reason),
            occurred_at: Utc::now(),
        })
        .await
    }

    async fn send(&self, notification: ListingNotification) -> Result<(), String> {
        let url = format!("{}/notifications/listing", self.base_url);
        let response = self.client.post(&url)
            .json(&notification)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Failed to deliver notification: {}", text));
        }

        Ok(())
    }
}

fn normalize_base_url(value: &str) -> String {
    let trimmed = value.trim_end_matches('/');
    if trimmed.ends_with("/api/v1") {
        trimmed.to_string()
    } else {
        format!("{}/api/v1", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_the_api_prefix_once() {
        assert_eq!(
            normalize_base_url("http://localhost:8085"),
            "http://localhost:8085/api/v1"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8085/"),
            "http://localhost:8085/api/v1"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8085/api/v1/"),
            "http://localhost:8085/api/v1"
        );
    }

    #[test]
    fn rejection_notifications_carry_the_reason() {
        let notification = ListingNotification {
            event: ListingEvent::Rejected,
            recipient_email: "owner@example.com".into(),
            business_id: 5,
            business_name: "Corner Cafe".into(),
            rejection_reason: Some("Listing copy is advertising spam".into()),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["event"], "rejected");
        assert_eq!(json["recipientEmail"], "owner@example.com");
        assert_eq!(json["rejectionReason"], "Listing copy is advertising spam");
    }
}
