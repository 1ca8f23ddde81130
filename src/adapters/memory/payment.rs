use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::payment::{ProviderStats, Transaction};
use crate::ports::{ConfirmPayment, PaymentConfirmation, PaymentLedger};

use super::InMemoryDocumentStore;

#[async_trait]
impl PaymentLedger for InMemoryDocumentStore {
    async fn record_pending(&self, transaction: &Transaction) -> Result<(), DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        match data.transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(stored) => *stored = transaction.clone(),
            None => data.transactions.push(transaction.clone()),
        }
        Ok(())
    }

    async fn find_by_proof(
        &self,
        proof_ref: &str,
        provider_id: &UserId,
    ) -> Result<Option<Transaction>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .find(|t| t.matches_proof(proof_ref, provider_id))
            .cloned())
    }

    async fn confirm_payment(
        &self,
        request: ConfirmPayment,
    ) -> Result<PaymentConfirmation, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;

        // Every check and every new value is computed before the first write.
        let message_index = data
            .messages
            .iter()
            .position(|m| m.id == request.message_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MessageNotFound,
                    format!("Message not found: {}", request.message_id),
                )
                .with_detail("message_id", request.message_id.to_string())
            })?;
        let message = &data.messages[message_index];

        let proof_ref = match (&message.payment_proof, message.is_payment_proof()) {
            (Some(url), true) => url.clone(),
            _ => {
                return Err(DomainError::validation(
                    "message_id",
                    format!("Message {} carries no payment proof", request.message_id),
                ))
            }
        };
        if message.payment_confirmed {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!("Payment for message {} is already confirmed", request.message_id),
            )
            .with_detail("message_id", request.message_id.to_string()));
        }

        let existing = data
            .transactions
            .iter()
            .position(|t| t.matches_proof(&proof_ref, &request.provider_id));
        let mut transaction = match existing {
            Some(index) => data.transactions[index].clone(),
            None => Transaction::pending(
                request.provider_id.clone(),
                request.client_id.clone(),
                request.listing_id.clone(),
                request.amount,
                Some(proof_ref),
                Some(request.message_id.clone()),
            ),
        };
        transaction.confirm()?;

        let mut stats = data
            .stats
            .get(&request.provider_id)
            .cloned()
            .unwrap_or_else(|| ProviderStats::empty(request.provider_id.clone()));
        stats.record_payment(transaction.amount)?;

        let mut listing = match &request.listing_id {
            Some(id) => Some(data.listings.get(id).cloned().ok_or_else(|| {
                DomainError::new(ErrorCode::ListingNotFound, format!("Listing not found: {}", id))
                    .with_detail("listing_id", id.to_string())
            })?),
            None => None,
        };
        if let Some(listing) = listing.as_mut() {
            listing.record_completion();
        }

        let engagement = match data
            .engagements
            .values()
            .find(|e| e.holds_payment_message(&request.message_id))
        {
            Some(stored) => {
                let mut engagement = stored.clone();
                engagement.confirm_payment(&request.message_id, transaction.id.clone())?;
                Some(engagement)
            }
            None => None,
        };

        // Commit.
        data.messages[message_index].payment_confirmed = true;
        match existing {
            Some(index) => data.transactions[index] = transaction.clone(),
            None => data.transactions.push(transaction.clone()),
        }
        data.stats.insert(request.provider_id.clone(), stats.clone());
        let listing_completions = listing.map(|listing| {
            let completions = listing.total_completions;
            data.listings.insert(listing.id.clone(), listing);
            completions
        });
        if let Some(engagement) = &engagement {
            data.engagements
                .insert(engagement.id.clone(), engagement.clone());
        }

        Ok(PaymentConfirmation {
            transaction,
            stats,
            listing_completions,
            engagement,
        })
    }

    async fn transactions_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .filter(|t| &t.provider_id == user_id || &t.client_id == user_id)
            .cloned()
            .collect())
    }

    async fn provider_stats(&self, provider_id: &UserId) -> Result<ProviderStats, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .stats
            .get(provider_id)
            .cloned()
            .unwrap_or_else(|| ProviderStats::empty(provider_id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Message;
    use crate::domain::engagement::{Engagement, EngagementStatus};
    use crate::domain::foundation::{ListingId, MessageId, Money, ThreadId};
    use crate::domain::listing::ServiceListing;
    use crate::domain::payment::TransactionStatus;
    use crate::ports::{ConversationRepository, EngagementRepository, ListingRepository};

    const PROOF: &str = "https://cdn.example/proof.png";

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn listing_id() -> ListingId {
        ListingId::new("L1").unwrap()
    }

    async fn store_with_proof() -> (InMemoryDocumentStore, MessageId) {
        let store = InMemoryDocumentStore::new();
        ListingRepository::save(
            &store,
            &ServiceListing::new(listing_id(), user("bob"), "Plumbing", Money::from_major(1000)),
        )
        .await
        .unwrap();
        let message = Message::payment_proof(
            ThreadId::for_service(&user("alice"), &user("bob"), Some(&listing_id())),
            user("alice"),
            user("bob"),
            PROOF,
            Some(Money::from_major(1000)),
            listing_id(),
        );
        let appended = store.append_message(message, None).await.unwrap();
        (store, appended.message.id)
    }

    fn request(message_id: MessageId) -> ConfirmPayment {
        ConfirmPayment {
            message_id,
            provider_id: user("bob"),
            client_id: user("alice"),
            listing_id: Some(listing_id()),
            amount: Money::from_major(1000),
        }
    }

    #[tokio::test]
    async fn confirm_creates_transaction_when_none_pending() {
        let (store, message_id) = store_with_proof().await;

        let confirmation = store.confirm_payment(request(message_id.clone())).await.unwrap();

        assert_eq!(confirmation.transaction.status, TransactionStatus::Confirmed);
        assert_eq!(confirmation.transaction.message_id, Some(message_id));
        assert_eq!(confirmation.stats.total_revenue, Money::from_major(1000));
        assert_eq!(confirmation.stats.completed_count, 1);
        assert_eq!(confirmation.listing_completions, Some(1));
        assert_eq!(store.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn confirm_reuses_pending_transaction_and_its_amount() {
        let (store, message_id) = store_with_proof().await;
        let pending = Transaction::pending(
            user("bob"),
            user("alice"),
            Some(listing_id()),
            Money::from_major(750),
            Some(PROOF.to_string()),
            Some(message_id.clone()),
        );
        store.record_pending(&pending).await.unwrap();

        let confirmation = store.confirm_payment(request(message_id)).await.unwrap();

        assert_eq!(confirmation.transaction.id, pending.id);
        assert_eq!(confirmation.stats.total_revenue, Money::from_major(750));
        assert_eq!(store.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn second_confirmation_changes_nothing() {
        let (store, message_id) = store_with_proof().await;
        store.confirm_payment(request(message_id.clone())).await.unwrap();

        let err = store.confirm_payment(request(message_id)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyProcessed);
        let stats = store.provider_stats(&user("bob")).await.unwrap();
        assert_eq!(stats.total_revenue, Money::from_major(1000));
        assert_eq!(stats.completed_count, 1);
        assert_eq!(store.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn failed_confirmation_leaves_no_partial_writes() {
        let (store, message_id) = store_with_proof().await;
        let mut req = request(message_id.clone());
        req.listing_id = Some(ListingId::new("missing").unwrap());

        let err = store.confirm_payment(req).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ListingNotFound);
        let message = store.find_message(&message_id).await.unwrap().unwrap();
        assert!(!message.payment_confirmed);
        assert_eq!(store.transaction_count().await, 0);
        assert!(store.provider_stats(&user("bob")).await.unwrap().total_revenue.is_zero());
    }

    #[tokio::test]
    async fn plain_message_cannot_be_confirmed() {
        let store = InMemoryDocumentStore::new();
        let message = Message::plain(
            ThreadId::for_service(&user("alice"), &user("bob"), None),
            user("alice"),
            user("bob"),
            "hello",
        );
        let appended = store.append_message(message, None).await.unwrap();

        let err = store
            .confirm_payment(request(appended.message.id))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_message_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .confirm_payment(request(MessageId::generate()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageNotFound);
    }

    #[tokio::test]
    async fn transactions_for_user_covers_both_roles() {
        let (store, message_id) = store_with_proof().await;
        store.confirm_payment(request(message_id)).await.unwrap();

        assert_eq!(store.transactions_for_user(&user("bob")).await.unwrap().len(), 1);
        assert_eq!(store.transactions_for_user(&user("alice")).await.unwrap().len(), 1);
        assert!(store.transactions_for_user(&user("carol")).await.unwrap().is_empty());
    }

    async fn engagement_awaiting(store: &InMemoryDocumentStore, proofs: &[&MessageId]) -> Engagement {
        let listing =
            ServiceListing::new(listing_id(), user("bob"), "Plumbing", Money::from_major(1000));
        let mut engagement = Engagement::select(&listing, user("alice")).unwrap();
        engagement.accept().unwrap();
        engagement.mark_reserved().unwrap();
        for proof in proofs {
            engagement.submit_payment((*proof).clone()).unwrap();
        }
        store.insert(&engagement).await.unwrap();
        engagement
    }

    #[tokio::test]
    async fn confirmation_moves_the_engagement_in_the_same_unit() {
        let (store, message_id) = store_with_proof().await;
        let engagement = engagement_awaiting(&store, &[&message_id]).await;

        let confirmation = store.confirm_payment(request(message_id)).await.unwrap();

        let confirmed = confirmation.engagement.unwrap();
        assert_eq!(confirmed.status, EngagementStatus::PaymentConfirmed);
        assert_eq!(confirmed.transaction_id, Some(confirmation.transaction.id.clone()));
        let stored = EngagementRepository::find_by_id(&store, &engagement.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, confirmed);
    }

    #[tokio::test]
    async fn superseded_proof_is_refused_without_writes() {
        let (store, old_proof) = store_with_proof().await;
        engagement_awaiting(&store, &[&old_proof, &MessageId::generate()]).await;

        let err = store.confirm_payment(request(old_proof.clone())).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        let message = store.find_message(&old_proof).await.unwrap().unwrap();
        assert!(!message.payment_confirmed);
        assert_eq!(store.transaction_count().await, 0);
        assert!(store.provider_stats(&user("bob")).await.unwrap().total_revenue.is_zero());
    }

    #[tokio::test]
    async fn counter_overflow_aborts_the_confirmation() {
        let (store, message_id) = store_with_proof().await;
        let mut req = request(message_id.clone());
        req.amount = Money::from_major(1);
        store.data.write().await.stats.insert(user("bob"), {
            let mut stats = ProviderStats::empty(user("bob"));
            stats.total_revenue = Money::new(rust_decimal::Decimal::MAX).unwrap();
            stats
        });

        let err = store.confirm_payment(req).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
        let message = store.find_message(&message_id).await.unwrap().unwrap();
        assert!(!message.payment_confirmed);
        assert_eq!(store.transaction_count().await, 0);
    }
}
