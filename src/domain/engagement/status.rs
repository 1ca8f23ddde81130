//! Engagement status state machine.
//!
//! One engagement is one selection-to-resolution cycle between a client and
//! a listing. `Declined`, `MadeAvailable` and `Replaced` end the cycle; the
//! client may start a fresh one afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of one engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    /// Client is looking at listings. No record exists yet.
    Browsing,

    /// Client picked a listing; waiting on the provider.
    Selected,

    /// Provider agreed; reservation not yet taken.
    Accepted,

    /// Provider refused.
    Declined,

    /// Listing is held for this client.
    Reserved,

    /// Client uploaded proof of payment. May repeat.
    PaymentSubmitted,

    /// Provider confirmed the payment and revenue was counted.
    PaymentConfirmed,

    /// Rating prompt delivered to the client.
    RatingRequested,

    /// Provider released the listing back to the market.
    MadeAvailable,

    /// Provider retired the listing.
    Replaced,
}

impl EngagementStatus {
    /// True while the engagement still occupies the client/listing pair.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// True for the states in which a payment proof may be submitted.
    pub fn accepts_payment_proof(&self) -> bool {
        matches!(
            self,
            EngagementStatus::Reserved | EngagementStatus::PaymentSubmitted
        )
    }

    /// True once the payment has been confirmed.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            EngagementStatus::PaymentConfirmed
                | EngagementStatus::RatingRequested
                | EngagementStatus::MadeAvailable
                | EngagementStatus::Replaced
        )
    }
}

impl fmt::Display for EngagementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngagementStatus::Browsing => "browsing",
            EngagementStatus::Selected => "selected",
            EngagementStatus::Accepted => "accepted",
            EngagementStatus::Declined => "declined",
            EngagementStatus::Reserved => "reserved",
            EngagementStatus::PaymentSubmitted => "payment_submitted",
            EngagementStatus::PaymentConfirmed => "payment_confirmed",
            EngagementStatus::RatingRequested => "rating_requested",
            EngagementStatus::MadeAvailable => "made_available",
            EngagementStatus::Replaced => "replaced",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for EngagementStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EngagementStatus::*;
        matches!(
            (self, target),
            (Browsing, Selected)
                | (Selected, Accepted)
                | (Selected, Declined)
                | (Accepted, Reserved)
                | (Reserved, PaymentSubmitted)
                | (PaymentSubmitted, PaymentSubmitted) // re-upload
                | (PaymentSubmitted, PaymentConfirmed)
                | (PaymentConfirmed, RatingRequested)
                | (PaymentConfirmed, MadeAvailable)
                | (PaymentConfirmed, Replaced)
                | (RatingRequested, MadeAvailable)
                | (RatingRequested, Replaced)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EngagementStatus::*;
        match self {
            Browsing => vec![Selected],
            Selected => vec![Accepted, Declined],
            Accepted => vec![Reserved],
            Reserved => vec![PaymentSubmitted],
            PaymentSubmitted => vec![PaymentSubmitted, PaymentConfirmed],
            PaymentConfirmed => vec![RatingRequested, MadeAvailable, Replaced],
            RatingRequested => vec![MadeAvailable, Replaced],
            Declined | MadeAvailable | Replaced => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use EngagementStatus::*;

    const ALL: [EngagementStatus; 10] = [
        Browsing,
        Selected,
        Accepted,
        Declined,
        Reserved,
        PaymentSubmitted,
        PaymentConfirmed,
        RatingRequested,
        MadeAvailable,
        Replaced,
    ];

    #[test]
    fn happy_path_is_valid() {
        let path = [
            Browsing,
            Selected,
            Accepted,
            Reserved,
            PaymentSubmitted,
            PaymentConfirmed,
            RatingRequested,
            MadeAvailable,
        ];
        for pair in path.windows(2) {
            assert_eq!(pair[0].transition_to(pair[1]), Ok(pair[1]));
        }
    }

    #[test]
    fn selected_can_be_declined() {
        assert_eq!(Selected.transition_to(Declined), Ok(Declined));
    }

    #[test]
    fn payment_can_be_resubmitted() {
        assert!(PaymentSubmitted.can_transition_to(&PaymentSubmitted));
    }

    #[test]
    fn cannot_skip_reservation() {
        let err = Selected.transition_to(PaymentSubmitted).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(err.detail("from"), Some("Selected"));
    }

    #[test]
    fn resolution_only_after_confirmation() {
        assert!(!Reserved.can_transition_to(&MadeAvailable));
        assert!(!PaymentSubmitted.can_transition_to(&Replaced));
        assert!(PaymentConfirmed.can_transition_to(&Replaced));
    }

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = ALL.iter().filter(|s| s.is_terminal()).copied().collect();
        assert_eq!(terminal, vec![Declined, MadeAvailable, Replaced]);
    }

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn payment_proof_states() {
        assert!(Reserved.accepts_payment_proof());
        assert!(PaymentSubmitted.accepts_payment_proof());
        assert!(!Selected.accepts_payment_proof());
    }

    #[test]
    fn displays_snake_case() {
        assert_eq!(PaymentSubmitted.to_string(), "payment_submitted");
    }
}
