//! Game session: drives players through rounds.
//!
//! A session owns the offer ledger, balance book, matcher and settler of one
//! group and enforces the round sequence:
//!
//! ```text
//! OFFERS -> PURCHASES -> SETTLEMENT -> CLOSED -> (carryover) -> OFFERS ...
//! ```
//!
//! Every call is checked against the current [`RoundPhase`]; a call in the
//! wrong phase fails with `WrongRoundPhase` and changes nothing.

use std::collections::{BTreeMap, HashMap};

use fruitmarket_export::{PlayerRow, RoundSnapshot, SessionSnapshot};
use fruitmarket_ledger::{BalanceBook, OfferLedger, OfferValidator};
use fruitmarket_matchcore::PurchaseMatcher;
use fruitmarket_settlement::RoundSettler;
use fruitmarket_types::constants::MAX_UNIT_PRICE;
use fruitmarket_types::{
    CarryoverReport, GameConfig, MarketError, MatchReport, Offer, OfferInput, Player, PlayerId,
    PlayerPhase, Purchase, PurchaseRequest, Result, RoundBalance, RoundNumber, RoundPhase,
    SettlementReceipt, SubmissionReport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// What the session remembers about one round.
#[derive(Debug, Clone)]
struct RoundRecord {
    round: RoundNumber,
    phase: RoundPhase,
    player_phases: HashMap<PlayerId, PlayerPhase>,
    purchases: Vec<Purchase>,
    receipt: Option<SettlementReceipt>,
}

impl RoundRecord {
    fn open(round: RoundNumber, players: &[Player]) -> Self {
        Self {
            round,
            phase: RoundPhase::Offers,
            player_phases: players
                .iter()
                .map(|p| (p.id, PlayerPhase::initial(p.role)))
                .collect(),
            purchases: Vec::new(),
            receipt: None,
        }
    }

    /// Move a player forward to `target`. Never moves backwards.
    fn promote(&mut self, player: PlayerId, target: PlayerPhase) {
        if let Some(phase) = self.player_phases.get_mut(&player) {
            while *phase != target {
                match phase.next() {
                    Some(next) => *phase = next,
                    None => break,
                }
            }
        }
    }

    fn promote_all(&mut self, target: PlayerPhase) {
        let players: Vec<PlayerId> = self.player_phases.keys().copied().collect();
        for player in players {
            self.promote(player, target);
        }
    }
}

/// One group playing the market game.
pub struct GameSession {
    config: GameConfig,
    /// Participants in `id_in_group` order, as round-1 instances.
    participants: Vec<Player>,
    ledger: OfferLedger,
    book: BalanceBook,
    matcher: PurchaseMatcher,
    settler: RoundSettler,
    /// The round being played.
    current: RoundRecord,
    /// Rounds already carried over.
    history: BTreeMap<RoundNumber, RoundRecord>,
}

impl GameSession {
    /// Start a session. Round-1 balances are drawn from the configured
    /// distribution, seeded from `config.seed` when present.
    ///
    /// # Errors
    /// `Configuration` if the config does not validate.
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Start a session drawing round-1 balances from `rng`.
    ///
    /// # Errors
    /// `Configuration` if the config does not validate.
    pub fn with_rng<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let participants: Vec<Player> = (1..=config.players_per_group)
            .map(|id_in_group| {
                Player::new(
                    PlayerId::new(),
                    id_in_group,
                    RoundNumber::FIRST,
                    config.buyer_id_in_group,
                )
            })
            .collect();

        let mut book = BalanceBook::new();
        let ids: Vec<PlayerId> = participants.iter().map(|p| p.id).collect();
        book.draw_initial(&ids, &config.initial_balance, rng)?;

        let validator = OfferValidator::with_limits(Decimal::from(MAX_UNIT_PRICE), config.max_offer_lines);
        let current = RoundRecord::open(RoundNumber::FIRST, &participants);

        tracing::info!(
            players = participants.len(),
            rounds = config.num_rounds,
            policy = ?config.match_policy,
            enforce_budget = config.enforce_budget,
            "Game session started"
        );

        Ok(Self {
            matcher: PurchaseMatcher::from_config(&config),
            config,
            participants,
            ledger: OfferLedger::with_validator(validator),
            book,
            settler: RoundSettler::new(),
            current,
            history: BTreeMap::new(),
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> RoundNumber {
        self.current.round
    }

    #[must_use]
    pub fn final_round(&self) -> RoundNumber {
        RoundNumber(self.config.num_rounds)
    }

    /// Phase of the current round.
    #[must_use]
    pub fn round_phase(&self) -> RoundPhase {
        self.current.phase
    }

    /// Whether the final round has been settled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.round() == self.final_round() && self.round_phase() == RoundPhase::Closed
    }

    /// Players of the current round in `id_in_group` order.
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        self.participants.iter().map(|p| p.in_round(self.round())).collect()
    }

    /// A player's instance in the current round.
    ///
    /// # Errors
    /// `UnknownPlayer` if the player is not part of this session.
    pub fn player(&self, id: PlayerId) -> Result<Player> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.in_round(self.round()))
            .ok_or(MarketError::UnknownPlayer(id))
    }

    /// The player at `id_in_group` in the current round.
    ///
    /// # Errors
    /// `UnknownPosition` if no player holds that position.
    pub fn player_at(&self, id_in_group: u32) -> Result<Player> {
        self.participants
            .iter()
            .find(|p| p.id_in_group == id_in_group)
            .map(|p| p.in_round(self.round()))
            .ok_or(MarketError::UnknownPosition(id_in_group))
    }

    /// The group's buyer in the current round.
    ///
    /// # Errors
    /// `UnknownPosition` if the group has no buyer.
    pub fn buyer(&self) -> Result<Player> {
        self.player_at(self.config.buyer_id_in_group)
    }

    /// A player's progress through the current round.
    #[must_use]
    pub fn player_phase(&self, id: PlayerId) -> Option<PlayerPhase> {
        self.current.player_phases.get(&id).copied()
    }

    /// A player's balance in `round`.
    ///
    /// # Errors
    /// - `UnknownPlayer` if the player is not part of this session
    /// - `UnknownRound` if the round has not been opened
    pub fn balance(&self, id: PlayerId, round: RoundNumber) -> Result<RoundBalance> {
        self.player(id)?;
        self.book
            .get(id, round)
            .ok_or(MarketError::UnknownRound(round))
    }

    /// Offers of the current round, in posting order.
    pub fn offers(&self) -> impl Iterator<Item = &Offer> + '_ {
        self.ledger.offers_in_round(self.round())
    }

    /// Offers a seller has in the current round, carried remainders first.
    pub fn offers_by_seller(&self, seller: PlayerId) -> impl Iterator<Item = &Offer> + '_ {
        self.ledger.offers_by_seller(seller, self.round())
    }

    /// Purchases made so far in `round`.
    #[must_use]
    pub fn purchases(&self, round: RoundNumber) -> &[Purchase] {
        self.record(round)
            .map_or(&[][..], |r| r.purchases.as_slice())
    }

    /// Settlement receipt of `round`, once settled.
    #[must_use]
    pub fn receipt(&self, round: RoundNumber) -> Option<&SettlementReceipt> {
        self.record(round).and_then(|r| r.receipt.as_ref())
    }

    // ---------------------------------------------------------------------
    // Round actions
    // ---------------------------------------------------------------------

    /// A seller posts offers for the current round.
    ///
    /// # Errors
    /// - `WrongRoundPhase` outside the offer phase
    /// - `UnknownPlayer` if the seller is not part of this session
    /// - `WrongRole` if the player is the buyer
    pub fn submit_offers(&mut self, seller: PlayerId, lines: &[OfferInput]) -> Result<SubmissionReport> {
        self.expect_phase(RoundPhase::Offers)?;
        let player = self.player(seller)?;
        let report = self.ledger.submit_offers(&player, lines)?;
        self.current.promote(seller, PlayerPhase::Submitted);
        Ok(report)
    }

    /// Close the offer phase.
    ///
    /// # Errors
    /// `WrongRoundPhase` outside the offer phase.
    pub fn begin_purchases(&mut self) -> Result<()> {
        self.transition(RoundPhase::Offers)
    }

    /// The buyer purchases against the current round's offers.
    ///
    /// With budget enforcement on, the buyer's budget is their starting
    /// balance less what they already spent this round, so splitting lines
    /// across calls does not raise it.
    ///
    /// # Errors
    /// - `WrongRoundPhase` outside the purchase phase
    /// - `UnknownPlayer` if the buyer is not part of this session
    /// - `WrongRole` if the player is a seller
    /// - under all-or-nothing matching, the first failing line's error
    pub fn match_purchases(&mut self, buyer: PlayerId, lines: &[PurchaseRequest]) -> Result<MatchReport> {
        self.expect_phase(RoundPhase::Purchases)?;
        let player = self.player(buyer)?;
        let spent: Decimal = self
            .current
            .purchases
            .iter()
            .filter(|p| p.buyer_id == buyer)
            .map(|p| p.cost)
            .sum();
        let budget = self.book.starting(buyer, self.round())? - spent;
        let report = self
            .matcher
            .match_purchases(&mut self.ledger, &player, budget, lines)?;

        self.current.purchases.extend(report.purchases.iter().cloned());
        self.current.promote(buyer, PlayerPhase::Matched);
        Ok(report)
    }

    /// Close the purchase phase. Every player's submissions are final.
    ///
    /// # Errors
    /// `WrongRoundPhase` outside the purchase phase.
    pub fn begin_settlement(&mut self) -> Result<()> {
        self.transition(RoundPhase::Purchases)?;
        self.current.promote_all(PlayerPhase::Matched);
        Ok(())
    }

    /// Settle the current round and close it.
    ///
    /// # Errors
    /// - `WrongRoundPhase` outside the settlement phase
    /// - any settlement error; the round stays in the settlement phase
    pub fn settle_round(&mut self) -> Result<SettlementReceipt> {
        self.expect_phase(RoundPhase::Settlement)?;
        let receipt = self.settler.settle_round(
            &mut self.book,
            self.current.round,
            &self.current.purchases,
        )?;

        self.transition(RoundPhase::Settlement)?;
        self.current.promote_all(PlayerPhase::Settled);
        self.current.receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Carry the closed round into the next one and open it.
    ///
    /// # Errors
    /// - `WrongRoundPhase` unless the current round is closed
    /// - `FinalRoundReached` after the final round
    pub fn carry_over_round(&mut self) -> Result<CarryoverReport> {
        self.expect_phase(RoundPhase::Closed)?;
        let final_round = self.final_round();
        let report = fruitmarket_settlement::carry_over_round(
            &mut self.ledger,
            &mut self.book,
            self.current.round,
            final_round,
        )?;

        let players: Vec<Player> = self.participants.iter().map(|p| p.in_round(report.to)).collect();
        let closed = std::mem::replace(&mut self.current, RoundRecord::open(report.to, &players));
        self.history.insert(closed.round, closed);
        tracing::info!(round = report.to.0, "Round opened");
        Ok(report)
    }

    /// Run the step that leaves the current phase and return the new phase.
    ///
    /// # Errors
    /// Whatever the underlying step returns.
    pub fn advance(&mut self) -> Result<RoundPhase> {
        match self.round_phase() {
            RoundPhase::Offers => self.begin_purchases()?,
            RoundPhase::Purchases => self.begin_settlement()?,
            RoundPhase::Settlement => {
                self.settle_round()?;
            }
            RoundPhase::Closed => {
                self.carry_over_round()?;
            }
        }
        Ok(self.round_phase())
    }

    /// Everything played so far, for export.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let rounds = self
            .history
            .values()
            .chain(std::iter::once(&self.current))
            .map(|record| {
                let round = record.round;
                let players = self
                    .participants
                    .iter()
                    .filter_map(|p| {
                        let balance = self.book.get(p.id, round)?;
                        let phase = record.player_phases.get(&p.id).copied()?;
                        Some(PlayerRow {
                            player: p.in_round(round),
                            phase,
                            balance,
                        })
                    })
                    .collect();
                let mut snapshot = RoundSnapshot {
                    round,
                    phase: record.phase,
                    players,
                    offers: self.ledger.offers_in_round(round).cloned().collect(),
                    purchases: record.purchases.clone(),
                };
                snapshot.sort_players();
                snapshot
            })
            .collect();
        SessionSnapshot { rounds }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn record(&self, round: RoundNumber) -> Option<&RoundRecord> {
        if round == self.current.round {
            Some(&self.current)
        } else {
            self.history.get(&round)
        }
    }

    fn expect_phase(&self, expected: RoundPhase) -> Result<()> {
        let actual = self.round_phase();
        if actual != expected {
            return Err(MarketError::WrongRoundPhase { expected, actual });
        }
        Ok(())
    }

    /// Leave `from` for the next phase.
    fn transition(&mut self, from: RoundPhase) -> Result<()> {
        self.expect_phase(from)?;
        let next = from.next().ok_or(MarketError::WrongRoundPhase {
            expected: from,
            actual: from,
        })?;
        self.current.phase = next;
        tracing::info!(round = self.current.round.0, from = %from, to = %next, "Round phase advanced");
        Ok(())
    }
}
