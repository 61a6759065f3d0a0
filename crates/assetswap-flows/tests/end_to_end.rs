//! End-to-end swap tests.
//!
//! Buyer, seller and currency issuer each run their own node against one
//! shared in-memory ledger, talking over in-process sessions. These tests
//! exercise issuance, the worked swap scenarios, contention for the same
//! outputs, and every failure path's cleanup.

use std::sync::Arc;

use assetswap_flows::{
    FailureReason, LocalSession, MessageChannel, Observer, ObserverLog, ResponderPhase, SwapMessage,
    SwapNode, TradeRequest,
};
use assetswap_types::{
    CommitError, Identity, IssuerRef, OwnableState, PartySignature, ReservationConfig,
    SignedTransaction, StateAndRef, SwapConfig, SwapError, TokenAmount, TokenKind, TradeTerms,
    ValidationError,
};
use assetswap_vault::InMemoryLedger;
use rust_decimal::Decimal;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_config() -> SwapConfig {
    SwapConfig {
        reservation: ReservationConfig {
            max_attempts: 5,
            backoff_min_ms: 0,
            backoff_max_ms: 2,
        },
        session_timeout_ms: 5_000,
        default_commission_rate: Decimal::ZERO,
    }
}

/// Outcome of one three-party negotiation.
struct SwapOutcome {
    buyer: Result<SignedTransaction, SwapError>,
    seller: Result<SignedTransaction, SwapError>,
    issuer: Result<SignedTransaction, SwapError>,
    seller_phase: ResponderPhase,
}

/// Run buyer, seller and issuer roles concurrently until all three return.
async fn run_swap(
    buyer: SwapNode,
    seller: SwapNode,
    issuer: SwapNode,
    terms: TradeTerms,
) -> SwapOutcome {
    let timeout = buyer.config().session_timeout();
    let (mut buyer_end, mut seller_buyer_end) =
        LocalSession::pair(buyer.party(), seller.party(), timeout);
    let (mut seller_issuer_end, mut issuer_end) =
        LocalSession::pair(seller.party(), issuer.party(), timeout);

    let initiator = buyer.buy_with_terms(terms);
    let mut responder = seller.sell(issuer.party().clone());
    let cosigner = issuer.cosign();

    // Each role owns its session ends so they close as soon as it returns.
    let (buyer, (seller, seller_phase), issuer) = tokio::join!(
        async move { initiator.run(&mut buyer_end).await },
        async move {
            let result = responder
                .run(&mut seller_buyer_end, &mut seller_issuer_end)
                .await;
            (result, responder.phase().clone())
        },
        async move { cosigner.run(&mut issuer_end).await },
    );
    SwapOutcome {
        buyer,
        seller,
        issuer,
        seller_phase,
    }
}

/// Outcome of a negotiation where one side is played by hand.
struct ScriptedOutcome {
    /// The real counterparty's result.
    other: Result<SignedTransaction, SwapError>,
    seller: Result<SignedTransaction, SwapError>,
    seller_phase: ResponderPhase,
    /// The last message the scripted side received.
    scripted_last: Result<SwapMessage, SwapError>,
}

/// Real buyer and seller; the issuer answers the signature request with `reply`.
async fn swap_with_scripted_issuer(
    market: &Market,
    terms: TradeTerms,
    reply: SwapMessage,
) -> ScriptedOutcome {
    let timeout = market.buyer.config().session_timeout();
    let (mut buyer_end, mut seller_buyer_end) =
        LocalSession::pair(market.buyer.party(), market.seller.party(), timeout);
    let (mut seller_issuer_end, mut issuer_end) =
        LocalSession::pair(market.seller.party(), market.issuer.party(), timeout);

    let initiator = market.buyer.buy_with_terms(terms);
    let mut responder = market.seller.sell(market.issuer.party().clone());

    let (buyer, (seller, seller_phase), scripted_last) = tokio::join!(
        async move { initiator.run(&mut buyer_end).await },
        async move {
            let result = responder
                .run(&mut seller_buyer_end, &mut seller_issuer_end)
                .await;
            (result, responder.phase().clone())
        },
        async move {
            let request = issuer_end.receive().await.unwrap();
            assert_eq!(request.kind(), "SignatureRequest");
            issuer_end.send(reply).await.unwrap();
            issuer_end.receive().await
        },
    );
    ScriptedOutcome {
        other: buyer,
        seller,
        seller_phase,
        scripted_last,
    }
}

/// Real seller and issuer; the buyer only sends `request`.
async fn swap_with_scripted_buyer(market: &Market, request: TradeRequest) -> ScriptedOutcome {
    let timeout = market.buyer.config().session_timeout();
    let (mut buyer_end, mut seller_buyer_end) =
        LocalSession::pair(market.buyer.party(), market.seller.party(), timeout);
    let (mut seller_issuer_end, mut issuer_end) =
        LocalSession::pair(market.seller.party(), market.issuer.party(), timeout);

    let mut responder = market.seller.sell(market.issuer.party().clone());
    let cosigner = market.issuer.cosign();

    let (scripted_last, (seller, seller_phase), issuer) = tokio::join!(
        async move {
            buyer_end
                .send(SwapMessage::TradeRequest(request))
                .await
                .unwrap();
            buyer_end.receive().await
        },
        async move {
            let result = responder
                .run(&mut seller_buyer_end, &mut seller_issuer_end)
                .await;
            (result, responder.phase().clone())
        },
        async move { cosigner.run(&mut issuer_end).await },
    );
    ScriptedOutcome {
        other: issuer,
        seller,
        seller_phase,
        scripted_last,
    }
}

/// Three parties, one ledger, one regulator.
struct Market {
    ledger: Arc<InMemoryLedger>,
    log: Arc<ObserverLog>,
    regulator: Identity,
    issuer: SwapNode,
    seller: SwapNode,
    buyer: SwapNode,
}

impl Market {
    fn new() -> Self {
        Self::with_config(test_config())
    }

    fn with_config(config: SwapConfig) -> Self {
        init_tracing();
        let ledger = Arc::new(InMemoryLedger::new());
        let log = Arc::new(ObserverLog::new());
        let regulator = Identity::random("regulator");
        let observer = Observer::new(regulator.party().clone(), log.clone());
        let node = |name: &str| {
            SwapNode::new(Identity::random(name), ledger.clone(), config.clone())
                .unwrap()
                .with_observer(observer.clone())
        };
        let issuer = node("issuer");
        let seller = node("seller");
        let buyer = node("buyer");
        Self {
            ledger,
            log,
            regulator,
            issuer,
            seller,
            buyer,
        }
    }

    fn new_buyer(&self, name: &str) -> SwapNode {
        SwapNode::new(Identity::random(name), self.ledger.clone(), test_config()).unwrap()
    }

    fn fund_currency(&self, owner: &SwapNode, quantity: u64) {
        self.ledger.deposit(OwnableState::dummy_currency(
            self.issuer.party(),
            owner.party(),
            quantity,
        ));
    }

    fn fund_asset(&self, owner: &SwapNode, quantity: u64) {
        self.ledger
            .deposit(OwnableState::dummy_asset(owner.party(), quantity));
    }

    fn balance(&self, node: &SwapNode, kind: TokenKind) -> u128 {
        self.ledger.balance(&node.party().key, kind)
    }

    async fn swap(&self, terms: TradeTerms) -> SwapOutcome {
        run_swap(
            self.buyer.clone(),
            self.seller.clone(),
            self.issuer.clone(),
            terms,
        )
        .await
    }

    fn assert_supply_conserved(&self) {
        self.ledger.verify_supply(TokenKind::Asset).unwrap();
        self.ledger.verify_supply(TokenKind::Currency).unwrap();
    }

    fn assert_nothing_reserved(&self) {
        for node in [&self.buyer, &self.seller, &self.issuer] {
            assert_eq!(
                node.guard().table().locked_count(),
                0,
                "{} still holds reservations",
                node.party()
            );
        }
    }
}

// =========================================================================
// Issuance
// =========================================================================

#[tokio::test]
async fn issue_at_cap_accepted_above_cap_rejected() {
    let market = Market::new();
    let flow = market.seller.issue_flow();

    let stx = flow.issue(100).await.unwrap();
    assert_eq!(market.balance(&market.seller, TokenKind::Asset), 100);
    assert_eq!(market.log.received_by(&market.regulator.key()), vec![stx.id()]);

    let err = flow.issue(101).await.unwrap_err();
    assert!(matches!(
        err,
        SwapError::Validation(ValidationError::IssuanceCapExceeded { .. })
    ));
    assert_eq!(market.ledger.transaction_count(), 1);
    market.assert_supply_conserved();
}

// =========================================================================
// Worked scenarios
// =========================================================================

#[tokio::test]
async fn exact_swap_without_commission() {
    let market = Market::new();
    market.seller.issue_flow().issue(100).await.unwrap();
    market.fund_currency(&market.buyer, 1000);

    let outcome = market
        .swap(TradeTerms::new(100, 1000, Decimal::ZERO))
        .await;
    let stx = outcome.seller.unwrap();
    assert_eq!(outcome.buyer.unwrap().id(), stx.id());
    assert_eq!(outcome.issuer.unwrap().id(), stx.id());
    assert_eq!(outcome.seller_phase, ResponderPhase::Done);

    assert_eq!(stx.tx.outputs.len(), 2, "no change or commission legs");
    assert_eq!(market.balance(&market.buyer, TokenKind::Asset), 100);
    assert_eq!(market.balance(&market.buyer, TokenKind::Currency), 0);
    assert_eq!(market.balance(&market.seller, TokenKind::Asset), 0);
    assert_eq!(market.balance(&market.seller, TokenKind::Currency), 1000);
    assert_eq!(market.balance(&market.issuer, TokenKind::Currency), 0);

    assert!(stx.missing_signers().is_empty());
    assert!(market.ledger.transaction(&stx.id()).is_some());
    market.assert_supply_conserved();
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn nine_percent_commission_goes_to_issuer() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let outcome = market
        .swap(TradeTerms::new(100, 1000, Decimal::new(9, 2)))
        .await;
    outcome.seller.unwrap();

    assert_eq!(market.balance(&market.seller, TokenKind::Currency), 910);
    assert_eq!(market.balance(&market.issuer, TokenKind::Currency), 90);
    assert_eq!(market.balance(&market.buyer, TokenKind::Asset), 100);
    market.assert_supply_conserved();
}

#[tokio::test]
async fn change_returned_on_both_legs() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let outcome = market
        .swap(TradeTerms::new(60, 400, Decimal::new(9, 2)))
        .await;
    let stx = outcome.seller.unwrap();
    assert_eq!(stx.tx.outputs.len(), 5);

    assert_eq!(market.balance(&market.buyer, TokenKind::Currency), 600);
    assert_eq!(market.balance(&market.issuer, TokenKind::Currency), 36);
    assert_eq!(market.balance(&market.seller, TokenKind::Currency), 364);
    assert_eq!(market.balance(&market.buyer, TokenKind::Asset), 60);
    assert_eq!(market.balance(&market.seller, TokenKind::Asset), 40);
    market.assert_supply_conserved();
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn regulator_sees_every_finalized_trade() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let first = market
        .swap(TradeTerms::new(50, 500, Decimal::ZERO))
        .await
        .seller
        .unwrap();
    let second = market
        .swap(TradeTerms::new(50, 500, Decimal::ZERO))
        .await
        .seller
        .unwrap();

    assert_eq!(
        market.log.received_by(&market.regulator.key()),
        vec![first.id(), second.id()]
    );
    assert_eq!(market.balance(&market.buyer, TokenKind::Asset), 100);
}

#[tokio::test]
async fn observer_notified_before_finalized_is_sent() {
    let market = Market::new();
    market.fund_asset(&market.seller, 10);
    market.fund_currency(&market.buyer, 100);

    let timeout = market.buyer.config().session_timeout();
    let (mut buyer_end, mut seller_buyer_end) =
        LocalSession::pair(market.buyer.party(), market.seller.party(), timeout);
    let (mut seller_issuer_end, mut issuer_end) =
        LocalSession::pair(market.seller.party(), market.issuer.party(), timeout);
    let initiator = market
        .buyer
        .buy_with_terms(TradeTerms::new(10, 100, Decimal::ZERO));
    let mut responder = market.seller.sell(market.issuer.party().clone());
    let cosigner = market.issuer.cosign();
    let log = market.log.clone();
    let regulator = market.regulator.key();

    let ((finalized, seen_on_finalized), seller, _) = tokio::join!(
        async move {
            let stx = initiator.run(&mut buyer_end).await.unwrap();
            (stx.id(), log.received_by(&regulator))
        },
        async move {
            responder
                .run(&mut seller_buyer_end, &mut seller_issuer_end)
                .await
        },
        async move { cosigner.run(&mut issuer_end).await },
    );
    assert_eq!(seller.unwrap().id(), finalized);
    assert_eq!(seen_on_finalized, vec![finalized]);
}

#[tokio::test]
async fn observer_failure_does_not_roll_back() {
    let market = Market::new();
    market.fund_asset(&market.seller, 10);
    market.fund_currency(&market.buyer, 100);
    market.log.set_failing(true);

    let outcome = market.swap(TradeTerms::new(10, 100, Decimal::ZERO)).await;
    let stx = outcome.seller.unwrap();
    assert!(market.ledger.transaction(&stx.id()).is_some());
    assert!(market.log.received_by(&market.regulator.key()).is_empty());
}

// =========================================================================
// Contention
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_buyers_one_seller_output() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    let buyers: Vec<SwapNode> = (0..4).map(|i| market.new_buyer(&format!("buyer-{i}"))).collect();
    for buyer in &buyers {
        market.fund_currency(buyer, 1000);
    }

    let handles: Vec<_> = buyers
        .iter()
        .map(|buyer| {
            tokio::spawn(run_swap(
                buyer.clone(),
                market.seller.clone(),
                market.issuer.clone(),
                TradeTerms::new(100, 1000, Decimal::ZERO),
            ))
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        match outcome.seller {
            Ok(_) => {
                winners += 1;
                assert!(outcome.buyer.is_ok());
            }
            Err(SwapError::InsufficientBalance {
                kind: TokenKind::Asset,
                ..
            }) => {
                assert_eq!(
                    outcome.seller_phase,
                    ResponderPhase::Failed(FailureReason::InsufficientBalance)
                );
                assert!(matches!(
                    outcome.buyer,
                    Err(SwapError::CounterpartyAborted { .. })
                ));
            }
            Err(other) => panic!("unexpected seller error: {other}"),
        }
    }
    assert_eq!(winners, 1);

    let paid: Vec<u128> = buyers
        .iter()
        .map(|b| market.balance(b, TokenKind::Currency))
        .collect();
    assert_eq!(paid.iter().filter(|&&c| c == 0).count(), 1);
    assert_eq!(paid.iter().filter(|&&c| c == 1000).count(), 3);
    for buyer in &buyers {
        assert_eq!(buyer.guard().table().locked_count(), 0);
    }
    assert_eq!(market.seller.guard().table().locked_count(), 0);
    market.assert_supply_conserved();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_buyers_get_distinct_outputs() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_asset(&market.seller, 100);
    let buyers: Vec<SwapNode> = (0..2).map(|i| market.new_buyer(&format!("buyer-{i}"))).collect();
    for buyer in &buyers {
        market.fund_currency(buyer, 500);
    }

    let handles: Vec<_> = buyers
        .iter()
        .map(|buyer| {
            tokio::spawn(run_swap(
                buyer.clone(),
                market.seller.clone(),
                market.issuer.clone(),
                TradeTerms::new(100, 500, Decimal::ZERO),
            ))
        })
        .collect();

    let mut consumed = Vec::new();
    for handle in handles {
        let stx = handle.await.unwrap().seller.unwrap();
        consumed.extend(stx.tx.input_refs());
    }
    let distinct: std::collections::HashSet<_> = consumed.iter().collect();
    assert_eq!(distinct.len(), consumed.len(), "an output was spent twice");
    assert_eq!(market.balance(&market.seller, TokenKind::Currency), 1000);
    market.assert_supply_conserved();
}

// =========================================================================
// Failure paths
// =========================================================================

#[tokio::test]
async fn seller_short_of_assets_aborts_and_releases() {
    let market = Market::new();
    market.fund_asset(&market.seller, 50);
    market.fund_currency(&market.buyer, 1000);

    let outcome = market.swap(TradeTerms::new(100, 1000, Decimal::ZERO)).await;
    assert!(matches!(
        outcome.seller,
        Err(SwapError::InsufficientBalance { needed: 100, available: 50, .. })
    ));
    assert!(matches!(
        outcome.buyer,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert!(matches!(
        outcome.issuer,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert_eq!(market.ledger.transaction_count(), 0);
    market.assert_nothing_reserved();

    // The buyer's currency is free again.
    let again = market
        .buyer
        .guard()
        .try_reserve(&market.buyer.party().key, TokenKind::Currency, 1000)
        .await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn buyer_short_of_currency_never_contacts_seller() {
    let market = Market::with_config(SwapConfig {
        reservation: ReservationConfig::no_retry(),
        ..test_config()
    });
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 100);

    let outcome = market.swap(TradeTerms::new(100, 1000, Decimal::ZERO)).await;
    assert!(matches!(
        outcome.buyer,
        Err(SwapError::InsufficientBalance {
            kind: TokenKind::Currency,
            ..
        })
    ));
    assert!(matches!(outcome.seller, Err(SwapError::ChannelClosed)));
    assert_eq!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::Protocol)
    );
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn commit_failure_surfaced_unchanged() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);
    market.ledger.set_available(false);

    let outcome = market.swap(TradeTerms::new(100, 1000, Decimal::ZERO)).await;
    assert!(matches!(
        outcome.seller,
        Err(SwapError::Commit(CommitError::Unavailable { .. }))
    ));
    assert!(matches!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::Commit(CommitError::Unavailable { .. }))
    ));
    assert!(matches!(
        outcome.buyer,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert_eq!(market.balance(&market.buyer, TokenKind::Currency), 1000);
    assert_eq!(market.balance(&market.seller, TokenKind::Asset), 100);
    market.assert_nothing_reserved();

    // Nothing leaked: the same swap goes through once the ledger is back.
    market.ledger.set_available(true);
    market
        .swap(TradeTerms::new(100, 1000, Decimal::ZERO))
        .await
        .seller
        .unwrap();
    assert_eq!(market.balance(&market.buyer, TokenKind::Asset), 100);
}

#[tokio::test]
async fn invalid_terms_rejected_before_reserving() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let outcome = market
        .swap(TradeTerms::new(100, 1000, Decimal::ONE))
        .await;
    assert!(matches!(
        outcome.buyer,
        Err(SwapError::InvalidCommissionRate { .. })
    ));
    assert!(outcome.seller.is_err());
    market.assert_nothing_reserved();
    assert_eq!(market.ledger.transaction_count(), 0);
}

#[tokio::test]
async fn issuer_refusal_aborts_everyone() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let outcome = swap_with_scripted_issuer(
        &market,
        TradeTerms::new(100, 1000, Decimal::ZERO),
        SwapMessage::Refused {
            reason: "commission too low".into(),
        },
    )
    .await;
    assert!(matches!(
        &outcome.seller,
        Err(SwapError::SignatureRefused { party, reason })
            if *party == market.issuer.party().key && reason == "commission too low"
    ));
    assert_eq!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::Cosigning)
    );
    assert!(matches!(
        outcome.other,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert!(matches!(
        outcome.scripted_last,
        Ok(SwapMessage::Aborted { .. })
    ));

    assert_eq!(market.ledger.transaction_count(), 0);
    assert_eq!(market.balance(&market.buyer, TokenKind::Currency), 1000);
    assert_eq!(market.balance(&market.seller, TokenKind::Asset), 100);
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn forged_issuer_signature_aborts_everyone() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    market.fund_currency(&market.buyer, 1000);

    let forged = SwapMessage::Signature(PartySignature {
        by: market.issuer.party().key,
        bytes: vec![0; 64],
    });
    let outcome =
        swap_with_scripted_issuer(&market, TradeTerms::new(100, 1000, Decimal::ZERO), forged)
            .await;
    assert!(matches!(
        &outcome.seller,
        Err(SwapError::SignatureInvalid { party }) if *party == market.issuer.party().key
    ));
    assert_eq!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::Cosigning)
    );
    assert!(matches!(
        outcome.other,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert!(matches!(
        outcome.scripted_last,
        Ok(SwapMessage::Aborted { .. })
    ));
    assert_eq!(market.ledger.transaction_count(), 0);
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn mixed_issue_currency_fails_contract_check() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    let issuer_key = market.issuer.party().key;
    let standard = market.ledger.deposit(OwnableState::dummy_currency(
        market.issuer.party(),
        market.buyer.party(),
        500,
    ));
    let second_series = market.ledger.deposit(OwnableState::new(
        TokenAmount {
            issuer: IssuerRef::new(issuer_key, 1),
            ..TokenAmount::currency(issuer_key, 500)
        },
        market.buyer.party().clone(),
    ));
    let inputs: Vec<StateAndRef> = vec![standard, second_series];

    let outcome = swap_with_scripted_buyer(
        &market,
        TradeRequest {
            inputs,
            terms: TradeTerms::new(100, 1000, Decimal::ZERO),
        },
    )
    .await;

    let expected = ValidationError::IssuerConservationViolation {
        kind: TokenKind::Currency,
        issuer: IssuerRef::new(issuer_key, 0),
        inputs: 500,
        outputs: 1000,
    };
    assert!(matches!(
        &outcome.seller,
        Err(SwapError::Validation(v)) if *v == expected
    ));
    assert_eq!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::Rejected(expected))
    );
    assert!(matches!(
        outcome.scripted_last,
        Ok(SwapMessage::Aborted { .. })
    ));
    assert!(matches!(
        outcome.other,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert_eq!(market.ledger.transaction_count(), 0);
    market.assert_nothing_reserved();
}

#[tokio::test]
async fn currency_from_another_issuer_refused() {
    let market = Market::new();
    market.fund_asset(&market.seller, 100);
    let other_bank = Identity::random("other-bank");
    market.ledger.deposit(OwnableState::dummy_currency(
        other_bank.party(),
        market.buyer.party(),
        1000,
    ));

    let outcome = market.swap(TradeTerms::new(100, 1000, Decimal::ZERO)).await;
    assert!(matches!(
        outcome.seller,
        Err(SwapError::TermsMismatch { .. })
    ));
    assert_eq!(
        outcome.seller_phase,
        ResponderPhase::Failed(FailureReason::InvalidRequest)
    );
    assert!(matches!(
        outcome.buyer,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert!(matches!(
        outcome.issuer,
        Err(SwapError::CounterpartyAborted { .. })
    ));
    assert_eq!(market.ledger.transaction_count(), 0);
    assert_eq!(market.balance(&market.buyer, TokenKind::Currency), 1000);
    market.assert_nothing_reserved();
}
