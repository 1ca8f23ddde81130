//! GetRevenueReportHandler - Query handler for a user's revenue report.
//!
//! Reads every source concurrently, then builds the ledger and report in
//! memory. The query never writes, so repeating it is always safe.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::revenue::{
    heatmap, reconcile, HeatmapDay, Ledger, ReconciliationPolicy, RevenueReport, RevenueSources,
    ServiceDirectory,
};
use crate::ports::{ConversationRepository, ListingRepository, NotificationRepository, PaymentLedger};

/// Query for one user's report.
#[derive(Debug, Clone)]
pub struct GetRevenueReportQuery {
    pub user_id: UserId,
    /// Last day of the current window; today in UTC when `None`.
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRevenueReportResult {
    pub report: RevenueReport,
    pub heatmap: Vec<HeatmapDay>,
}

pub struct GetRevenueReportHandler {
    ledger: Arc<dyn PaymentLedger>,
    notifications: Arc<dyn NotificationRepository>,
    conversations: Arc<dyn ConversationRepository>,
    listings: Arc<dyn ListingRepository>,
    policy: ReconciliationPolicy,
}

impl GetRevenueReportHandler {
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        notifications: Arc<dyn NotificationRepository>,
        conversations: Arc<dyn ConversationRepository>,
        listings: Arc<dyn ListingRepository>,
    ) -> Self {
        Self {
            ledger,
            notifications,
            conversations,
            listings,
            policy: ReconciliationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconciliationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn handle(
        &self,
        query: GetRevenueReportQuery,
    ) -> Result<GetRevenueReportResult, EngagementError> {
        let user_id = &query.user_id;

        // 1. Pull all sources
        let (transactions, notifications, messages, threads, listings) = futures::try_join!(
            self.ledger.transactions_for_user(user_id),
            self.notifications.for_user(user_id),
            self.conversations.messages_for_user(user_id),
            self.conversations.threads_for_user(user_id),
            self.listings.find_by_provider(user_id),
        )?;
        debug!(
            user_id = %user_id,
            transactions = transactions.len(),
            notifications = notifications.len(),
            messages = messages.len(),
            threads = threads.len(),
            "revenue sources loaded"
        );

        // 2. Normalize, role-filter and deduplicate
        let now = Timestamp::now();
        let ledger = Ledger::build(
            user_id,
            RevenueSources {
                transactions: &transactions,
                notifications: &notifications,
                messages: &messages,
            },
            now,
        );
        let estimated = ledger.estimated_dates();
        if !estimated.is_empty() {
            warn!(
                user_id = %user_id,
                count = estimated.len(),
                ids = ?estimated,
                "revenue records with unreadable dates were dated now"
            );
        }

        // 3. Report and heatmap
        let today = query.today.unwrap_or_else(|| now.date());
        let directory = ServiceDirectory::new(&threads, &listings);
        let report = reconcile(&ledger, &directory, today, &self.policy)?;
        let heatmap = heatmap(&ledger)?;

        info!(
            user_id = %user_id,
            entries = ledger.len(),
            current_revenue = %report.current_revenue,
            previous_revenue = %report.previous_revenue,
            used_fallback = report.used_fallback,
            "revenue report built"
        );

        Ok(GetRevenueReportResult { report, heatmap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryDocumentStore, Snapshot};
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::conversation::Message;
    use crate::domain::foundation::{ListingId, Money, RawDate, ThreadId};
    use crate::domain::payment::Transaction;
    use crate::domain::revenue::UNKNOWN_SERVICE;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn at(date: &str) -> RawDate {
        RawDate::Text(format!("{date}T12:00:00Z"))
    }

    fn handler_for(store: InMemoryDocumentStore) -> GetRevenueReportHandler {
        let store = Arc::new(store);
        GetRevenueReportHandler::new(store.clone(), store.clone(), store.clone(), store)
    }

    fn confirmed_tx(id: &str, amount: u64, date: &str) -> Transaction {
        let mut tx = Transaction::pending(
            user("bob"),
            user("alice"),
            Some(ListingId::new("L1").unwrap()),
            Money::from_major(amount),
            None,
            None,
        );
        tx.id = crate::domain::foundation::TransactionId::new(id).unwrap();
        tx.confirm().unwrap();
        tx.created_at = at(date);
        tx
    }

    fn proof_message(text: &str, date: &str) -> Message {
        let mut message = Message::plain(
            ThreadId::for_service(&user("alice"), &user("bob"), Some(&ListingId::new("L1").unwrap())),
            user("alice"),
            user("bob"),
            text,
        );
        message.kind = crate::domain::conversation::MessageKind::PaymentProof;
        message.payment_proof = Some("https://cdn.example/p.png".to_string());
        message.timestamp = at(date);
        message
    }

    #[tokio::test]
    async fn transaction_and_proof_message_both_count() {
        let store = InMemoryDocumentStore::from_snapshot(Snapshot {
            transactions: vec![confirmed_tx("A", 500, "2024-03-20")],
            messages: vec![proof_message("I paid ₱500", "2024-03-21")],
            ..Snapshot::default()
        });

        let result = handler_for(store)
            .handle(GetRevenueReportQuery {
                user_id: user("bob"),
                today: Some(today()),
            })
            .await
            .unwrap();

        assert_eq!(result.report.current_revenue, Money::from_major(1000));
        assert_eq!(result.report.provider_income, Money::from_major(1000));
        assert_eq!(result.report.total_transaction_count, 2);
        assert_eq!(result.heatmap.len(), 2);
    }

    #[tokio::test]
    async fn client_view_counts_spending_not_revenue() {
        let store = InMemoryDocumentStore::from_snapshot(Snapshot {
            transactions: vec![confirmed_tx("A", 500, "2024-03-20")],
            ..Snapshot::default()
        });

        let result = handler_for(store)
            .handle(GetRevenueReportQuery {
                user_id: user("alice"),
                today: Some(today()),
            })
            .await
            .unwrap();

        assert!(result.report.current_revenue.is_zero());
        assert_eq!(result.report.client_spending, Money::from_major(500));
    }

    #[tokio::test]
    async fn unattributed_message_lands_in_unknown_service() {
        let mut message = proof_message("₱300", "2024-03-25");
        message.conversation_id = ThreadId::new("legacy-thread").unwrap();
        let store = InMemoryDocumentStore::from_snapshot(Snapshot {
            messages: vec![message],
            ..Snapshot::default()
        });

        let result = handler_for(store)
            .handle(GetRevenueReportQuery {
                user_id: user("bob"),
                today: Some(today()),
            })
            .await
            .unwrap();

        let labels: Vec<_> = result
            .report
            .per_service_breakdown
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec![UNKNOWN_SERVICE]);
    }

    #[tokio::test]
    async fn out_of_range_stored_amounts_fail_the_report() {
        let mut a = confirmed_tx("A", 0, "2024-03-20");
        a.amount = Money::new(rust_decimal::Decimal::MAX).unwrap();
        let mut b = confirmed_tx("B", 0, "2024-03-21");
        b.amount = Money::new(rust_decimal::Decimal::MAX).unwrap();
        let store = InMemoryDocumentStore::from_snapshot(Snapshot {
            transactions: vec![a, b],
            ..Snapshot::default()
        });

        let err = handler_for(store)
            .handle(GetRevenueReportQuery {
                user_id: user("bob"),
                today: Some(today()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::Internal(_)));
    }

    #[tokio::test]
    async fn report_reflects_workflow_confirmation() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        fx.confirmed("alice", "L1").await;

        let result = fx
            .report_handler()
            .handle(GetRevenueReportQuery {
                user_id: user("bob"),
                today: None,
            })
            .await
            .unwrap();

        // The confirmed transaction and its proof message have distinct ids.
        assert_eq!(result.report.current_revenue, Money::from_major(2000));
        let top = &result.report.per_service_breakdown[0];
        assert_eq!(top.label, "Plumbing");
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let fx = Fixture::new();
        fx.store.set_unavailable(true);

        let err = fx
            .report_handler()
            .handle(GetRevenueReportQuery {
                user_id: user("bob"),
                today: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::StoreUnavailable(_)));
    }
}
