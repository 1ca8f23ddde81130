//! Deduplicated per-user ledger.
//!
//! Candidates are pulled from all three source streams, filtered to the ones
//! that concern the user, then deduplicated by candidate id only. When ids
//! collide the winner is the highest-priority source
//! (transaction, then notification, then message) and, within one source, the
//! larger amount, then the earlier date. Any remaining tie is broken on the
//! other candidate fields, so the result never depends on arrival order.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::domain::conversation::Message;
use crate::domain::foundation::{DomainError, ListingId, Money, ThreadId, Timestamp, UserId};
use crate::domain::notification::Notification;
use crate::domain::payment::Transaction;

use super::{Candidate, CandidateKind, Party};

/// Raw source records for one reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueSources<'a> {
    pub transactions: &'a [Transaction],
    pub notifications: &'a [Notification],
    pub messages: &'a [Message],
}

/// A candidate together with the user's side of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub candidate: Candidate,
    pub party: Party,
}

impl LedgerEntry {
    pub fn is_income(&self) -> bool {
        self.party == Party::Payee
    }
}

/// Deduplicated entries for one user, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Normalizes, role-filters and deduplicates `sources` for `user_id`.
    ///
    /// `now` is the fallback for unusable dates.
    pub fn build(user_id: &UserId, sources: RevenueSources<'_>, now: Timestamp) -> Self {
        let candidates = sources
            .transactions
            .iter()
            .filter_map(|tx| Candidate::from_transaction(tx, now))
            .chain(
                sources
                    .notifications
                    .iter()
                    .filter_map(|n| Candidate::from_notification(n, now)),
            )
            .chain(
                sources
                    .messages
                    .iter()
                    .filter_map(|m| Candidate::from_message(m, now)),
            );

        let relevant = candidates.filter_map(|candidate| {
            candidate
                .party_for(user_id)
                .map(|party| LedgerEntry { candidate, party })
        });

        Self::dedup(relevant)
    }

    /// Collapses entries sharing an id down to the winning one.
    pub fn dedup(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<LedgerEntry> = Vec::new();

        for entry in entries {
            match slots.get(&entry.candidate.id) {
                Some(&slot) => {
                    if outranks(&entry, &kept[slot]) {
                        kept[slot] = entry;
                    }
                }
                None => {
                    slots.insert(entry.candidate.id.clone(), kept.len());
                    kept.push(entry);
                }
            }
        }

        Self { entries: kept }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn income(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| e.is_income())
    }

    pub fn spending(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| !e.is_income())
    }

    /// All-time income.
    pub fn total_income(&self) -> Result<Money, DomainError> {
        Money::try_sum(self.income().map(|e| e.candidate.amount))
    }

    /// All-time spending.
    pub fn total_spending(&self) -> Result<Money, DomainError> {
        Money::try_sum(self.spending().map(|e| e.candidate.amount))
    }

    /// Ids of entries whose date is a fallback.
    pub fn estimated_dates(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.candidate.date_estimated)
            .map(|e| e.candidate.id.clone())
            .collect()
    }
}

fn outranks(challenger: &LedgerEntry, holder: &LedgerEntry) -> bool {
    rank(challenger) < rank(holder)
}

/// Lower wins: source priority, larger amount, earlier date, then the rest.
#[allow(clippy::type_complexity)]
fn rank(
    entry: &LedgerEntry,
) -> (
    CandidateKind,
    Reverse<Money>,
    Timestamp,
    bool,
    &Option<ListingId>,
    &Option<ThreadId>,
    &Option<UserId>,
    &Option<UserId>,
    &Option<UserId>,
    bool,
) {
    let c = &entry.candidate;
    (
        c.kind,
        Reverse(c.amount),
        c.date,
        c.date_estimated,
        &c.service_id,
        &c.conversation_id,
        &c.payee,
        &c.payer,
        &c.recipient,
        !entry.is_income(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MessageId, TransactionId};
    use crate::domain::payment::TransactionStatus;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn confirmed_tx(id: &str, amount: u64) -> Transaction {
        let mut tx = Transaction::pending(
            user("bob"),
            user("alice"),
            Some(ListingId::new("L1").unwrap()),
            Money::from_major(amount),
            None,
            None,
        );
        tx.id = TransactionId::new(id).unwrap();
        tx.status = TransactionStatus::Confirmed;
        tx
    }

    fn proof(id: &str, text: &str) -> Message {
        let mut message = Message::payment_proof(
            ThreadId::new("alice_bob_L1").unwrap(),
            user("alice"),
            user("bob"),
            "https://cdn.example/p.png",
            None,
            ListingId::new("L1").unwrap(),
        );
        message.id = MessageId::new(id).unwrap();
        message.text = text.to_string();
        message
    }

    #[test]
    fn distinct_ids_across_sources_are_both_counted() {
        let transactions = [confirmed_tx("A", 500)];
        let messages = [proof("B", "I paid ₱500")];
        let ledger = Ledger::build(
            &user("bob"),
            RevenueSources {
                transactions: &transactions,
                messages: &messages,
                ..Default::default()
            },
            Timestamp::now(),
        );

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_income().unwrap(), Money::from_major(1000));
    }

    #[test]
    fn shared_id_is_counted_once_with_transaction_winning() {
        let transactions = [confirmed_tx("A", 500)];
        let messages = [proof("A", "I paid ₱700")];
        let ledger = Ledger::build(
            &user("bob"),
            RevenueSources {
                transactions: &transactions,
                messages: &messages,
                ..Default::default()
            },
            Timestamp::now(),
        );

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].candidate.kind, CandidateKind::Transaction);
        assert_eq!(ledger.total_income().unwrap(), Money::from_major(500));
    }

    #[test]
    fn same_source_duplicates_resolve_the_same_in_any_order() {
        let small = confirmed_tx("A", 300);
        let large = confirmed_tx("A", 900);
        let build = |transactions: &[Transaction]| {
            Ledger::build(
                &user("bob"),
                RevenueSources {
                    transactions,
                    ..Default::default()
                },
                Timestamp::now(),
            )
        };

        let forward = build(&[small.clone(), large.clone()]);
        let backward = build(&[large, small]);

        assert_eq!(forward.len(), 1);
        assert_eq!(forward.total_income().unwrap(), Money::from_major(900));
        assert_eq!(forward, backward);
    }

    #[test]
    fn equal_amounts_keep_the_earlier_date() {
        let mut late = confirmed_tx("A", 500);
        late.created_at = crate::domain::foundation::RawDate::Text("2024-03-02T00:00:00Z".to_string());
        let mut early = confirmed_tx("A", 500);
        early.created_at = crate::domain::foundation::RawDate::Text("2024-03-01T00:00:00Z".to_string());

        let transactions = [late, early];
        let ledger = Ledger::build(
            &user("bob"),
            RevenueSources {
                transactions: &transactions,
                ..Default::default()
            },
            Timestamp::now(),
        );

        assert_eq!(
            ledger.entries()[0].candidate.date,
            Timestamp::parse_rfc3339("2024-03-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn unrelated_users_see_nothing() {
        let transactions = [confirmed_tx("A", 500)];
        let ledger = Ledger::build(
            &user("carol"),
            RevenueSources {
                transactions: &transactions,
                ..Default::default()
            },
            Timestamp::now(),
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn client_side_is_spending() {
        let transactions = [confirmed_tx("A", 500)];
        let ledger = Ledger::build(
            &user("alice"),
            RevenueSources {
                transactions: &transactions,
                ..Default::default()
            },
            Timestamp::now(),
        );
        assert_eq!(ledger.total_spending().unwrap(), Money::from_major(500));
        assert!(ledger.total_income().unwrap().is_zero());
    }
}
