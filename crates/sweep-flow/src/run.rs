//! The run controller.
//!
//! Drives one invocation through a strictly-forward state machine. A
//! failed stage terminates the run; effects of completed stages (a filled
//! sell, a finished transfer) stay in place and are never reversed.
//! Re-invocation is the recovery path: every amount is re-derived from
//! live balances, so re-running is safe for whatever remains.

use crate::error::{FlowError, FlowResult};
use crate::plan::plan_sell;
use crate::settle::SettleWait;
use crate::stages::{select_amount, validate_destination};
use rust_decimal::Decimal;
use std::fmt;
use sweep_core::{Balance, PairMeta, Price, Size, TokenMeta, Venue, WITHDRAW_DECIMALS};
use sweep_exchange::{ExchangeApi, FillResult, PriceSource};
use tracing::{error, info};

/// What this invocation should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Liquidate the base asset, then move proceeds to perps.
    SellAndTransfer,
    /// Move existing spot quote balance to perps.
    TransferOnly,
    /// Withdraw perps quote balance to a chain address.
    Withdraw,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SellAndTransfer => write!(f, "sell_and_transfer"),
            Self::TransferOnly => write!(f, "transfer_only"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Controller states. Transitions are strictly forward; `Failed` is
/// reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    MetadataResolved,
    Selling,
    Sold,
    Transferring,
    Transferred,
    Withdrawing,
    Withdrawn,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::MetadataResolved => "metadata_resolved",
            Self::Selling => "selling",
            Self::Sold => "sold",
            Self::Transferring => "transferring",
            Self::Transferred => "transferred",
            Self::Withdrawing => "withdrawing",
            Self::Withdrawn => "withdrawn",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Everything one invocation needs; nothing survives past it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    /// Pair name as listed on the spot universe (e.g., "PURR/USDC").
    pub pair_name: String,
    pub base_token: String,
    pub quote_token: String,
    /// Base amount to sell; None sells everything available.
    pub base_amount: Option<Decimal>,
    /// Quote amount to transfer/withdraw; None uses everything minus buffer.
    pub quote_amount: Option<Decimal>,
    pub slippage_bps: u32,
    /// Destination address; required for withdraw mode only.
    pub destination: Option<String>,
    pub settle_wait: SettleWait,
    pub price_source: PriceSource,
}

/// Drives one run to completion against an exchange.
pub struct Runner<E> {
    exchange: E,
    cfg: RunConfig,
    state: RunState,
}

impl<E: ExchangeApi> Runner<E> {
    pub fn new(exchange: E, cfg: RunConfig) -> Self {
        Self {
            exchange,
            cfg,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        info!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    /// Run the configured mode to completion.
    pub async fn run(&mut self) -> FlowResult<()> {
        let outcome = self.drive().await;
        if let Err(e) = &outcome {
            error!(state = %self.state, error = %e, "Run failed");
            self.transition(RunState::Failed);
        }
        outcome
    }

    async fn drive(&mut self) -> FlowResult<()> {
        info!(mode = %self.cfg.mode, pair = %self.cfg.pair_name, "Starting run");
        match self.cfg.mode {
            Mode::SellAndTransfer => {
                let pair = self.resolve_pair().await?;
                self.sell(&pair).await?;
                self.cfg.settle_wait.await_settlement().await;
                self.transfer(&pair.quote).await?;
            }
            Mode::TransferOnly => {
                let quote = self.exchange.token_metadata(&self.cfg.quote_token).await?;
                self.transition(RunState::MetadataResolved);
                self.transfer(&quote).await?;
            }
            Mode::Withdraw => {
                self.withdraw().await?;
            }
        }
        self.transition(RunState::Done);
        Ok(())
    }

    async fn resolve_pair(&mut self) -> FlowResult<PairMeta> {
        let pair = self
            .exchange
            .pair_metadata(
                &self.cfg.pair_name,
                &self.cfg.base_token,
                &self.cfg.quote_token,
            )
            .await?;
        info!(
            pair = %pair.name,
            asset_id = pair.asset_id(),
            sz_decimals = pair.base.sz_decimals,
            price_decimals = pair.price_decimals(),
            "Metadata resolved"
        );
        self.transition(RunState::MetadataResolved);
        Ok(pair)
    }

    async fn sell(&mut self, pair: &PairMeta) -> FlowResult<()> {
        self.transition(RunState::Selling);

        let balance = self
            .exchange
            .balance(&self.cfg.base_token, Venue::Spot)
            .await?;
        if !balance.is_positive() {
            return Err(FlowError::InsufficientBalance {
                token: balance.token,
                available: balance.available,
                context: format!("no {} available on spot", self.cfg.base_token),
            });
        }

        let reference = self
            .exchange
            .reference_price(&self.cfg.pair_name, self.cfg.price_source)
            .await?;

        let plan = plan_sell(
            self.cfg.base_amount.map(Size::new),
            Size::new(balance.available),
            Price::new(reference),
            self.cfg.slippage_bps,
            pair.base.sz_decimals,
            pair.price_decimals(),
        )?;

        info!(
            size = %plan.size,
            limit_px = %plan.limit_px,
            reference = %reference,
            slippage_bps = self.cfg.slippage_bps,
            "Selling with IOC market emulation"
        );

        match self.exchange.submit_order(pair, &plan).await? {
            FillResult::Filled {
                total_size,
                avg_price,
                oid,
            } if !total_size.is_zero() => {
                info!(filled = %total_size, avg_px = %avg_price, oid, "Order filled");
                self.transition(RunState::Sold);
                Ok(())
            }
            FillResult::Filled { .. } => Err(FlowError::OrderNotFilled {
                reason: "filled size was zero".to_string(),
            }),
            FillResult::Rejected { reason } => Err(FlowError::OrderNotFilled { reason }),
        }
    }

    async fn transfer(&mut self, quote: &TokenMeta) -> FlowResult<()> {
        self.transition(RunState::Transferring);

        let balance = self
            .exchange
            .balance(&self.cfg.quote_token, Venue::Spot)
            .await?;
        if !balance.is_positive() {
            let context = match self.cfg.mode {
                Mode::SellAndTransfer => format!(
                    "no {} on spot after sell (the order may not have filled)",
                    self.cfg.quote_token
                ),
                _ => format!("no {} available on spot", self.cfg.quote_token),
            };
            return Err(FlowError::InsufficientBalance {
                token: balance.token,
                available: balance.available,
                context,
            });
        }

        let amount = select_amount(
            "transfer amount",
            self.cfg.quote_amount,
            balance.available,
            quote.wei_decimals,
        )?;

        info!(amount = %amount, available = %balance.available, "Transferring spot -> perps");
        self.exchange.transfer_to_perps(amount).await?;
        self.transition(RunState::Transferred);
        Ok(())
    }

    async fn withdraw(&mut self) -> FlowResult<()> {
        let destination = self.cfg.destination.clone().ok_or_else(|| {
            FlowError::Config("a destination address is required for withdraw mode".to_string())
        })?;
        validate_destination(&destination)?;

        self.transition(RunState::Withdrawing);

        // Only the quote leg needs to resolve for a withdrawal.
        let quote = self.exchange.token_metadata(&self.cfg.quote_token).await?;

        let balance = self.exchange.balance(&quote.symbol, Venue::Perps).await?;
        if !balance.is_positive() {
            return Err(FlowError::InsufficientBalance {
                token: balance.token,
                available: balance.available,
                context: format!("no {} withdrawable on perps", quote.symbol),
            });
        }

        let amount = select_amount(
            "withdrawal amount",
            self.cfg.quote_amount,
            balance.available,
            WITHDRAW_DECIMALS,
        )?;

        info!(amount = %amount, destination = %destination, "Withdrawing to chain");
        self.exchange.withdraw(amount, &destination).await?;
        self.transition(RunState::Withdrawn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use sweep_core::OrderPlan;
    use sweep_exchange::{BoxFuture, ExchangeResult};

    /// Recording stub for `ExchangeApi`.
    struct StubExchange {
        spot_base: Decimal,
        spot_quote_before: Decimal,
        spot_quote_after: Decimal,
        perps_quote: Decimal,
        reference: Decimal,
        fill_size: Decimal,
        reject_reason: Option<String>,
        calls: Mutex<Vec<String>>,
        sold: Mutex<bool>,
    }

    impl StubExchange {
        fn new() -> Self {
            Self {
                spot_base: dec!(100),
                spot_quote_before: dec!(0),
                spot_quote_after: dec!(2.0489),
                perps_quote: dec!(0),
                reference: dec!(0.0205),
                fill_size: dec!(100),
                reject_reason: None,
                calls: Mutex::new(Vec::new()),
                sold: Mutex::new(false),
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn called(&self, name: &str) -> bool {
            self.calls()
                .iter()
                .any(|c| c == name || c.starts_with(&format!("{name}:")))
        }
    }

    fn purr_usdc_pair() -> PairMeta {
        PairMeta {
            name: "PURR/USDC".to_string(),
            index: 0,
            base: TokenMeta {
                symbol: "PURR".to_string(),
                index: 1,
                sz_decimals: 2,
                wei_decimals: 5,
            },
            quote: TokenMeta {
                symbol: "USDC".to_string(),
                index: 0,
                sz_decimals: 2,
                wei_decimals: 8,
            },
        }
    }

    impl ExchangeApi for StubExchange {
        fn pair_metadata<'a>(
            &'a self,
            _pair_name: &'a str,
            _base: &'a str,
            _quote: &'a str,
        ) -> BoxFuture<'a, ExchangeResult<PairMeta>> {
            Box::pin(async move {
                self.record("pair_metadata");
                Ok(purr_usdc_pair())
            })
        }

        fn token_metadata<'a>(
            &'a self,
            symbol: &'a str,
        ) -> BoxFuture<'a, ExchangeResult<TokenMeta>> {
            Box::pin(async move {
                self.record(format!("token_metadata:{symbol}"));
                Ok(purr_usdc_pair().quote)
            })
        }

        fn balance<'a>(
            &'a self,
            token: &'a str,
            venue: Venue,
        ) -> BoxFuture<'a, ExchangeResult<Balance>> {
            Box::pin(async move {
                self.record(format!("balance:{venue}:{token}"));
                let available = match venue {
                    Venue::Spot => {
                        if token == "PURR" {
                            self.spot_base
                        } else if *self.sold.lock().unwrap() {
                            self.spot_quote_after
                        } else {
                            self.spot_quote_before
                        }
                    }
                    Venue::Perps => self.perps_quote,
                };
                Ok(Balance::new(token, venue, available))
            })
        }

        fn reference_price<'a>(
            &'a self,
            _pair_name: &'a str,
            _source: PriceSource,
        ) -> BoxFuture<'a, ExchangeResult<Decimal>> {
            Box::pin(async move {
                self.record("reference_price");
                Ok(self.reference)
            })
        }

        fn submit_order<'a>(
            &'a self,
            _pair: &'a PairMeta,
            plan: &'a OrderPlan,
        ) -> BoxFuture<'a, ExchangeResult<FillResult>> {
            Box::pin(async move {
                self.record(format!("submit_order:{}:{}", plan.size, plan.limit_px));
                *self.sold.lock().unwrap() = true;
                Ok(match &self.reject_reason {
                    Some(reason) => FillResult::Rejected {
                        reason: reason.clone(),
                    },
                    None => FillResult::Filled {
                        total_size: self.fill_size,
                        avg_price: self.reference,
                        oid: 1,
                    },
                })
            })
        }

        fn transfer_to_perps<'a>(&'a self, amount: Decimal) -> BoxFuture<'a, ExchangeResult<()>> {
            Box::pin(async move {
                self.record(format!("transfer:{amount}"));
                Ok(())
            })
        }

        fn withdraw<'a>(
            &'a self,
            amount: Decimal,
            destination: &'a str,
        ) -> BoxFuture<'a, ExchangeResult<()>> {
            Box::pin(async move {
                self.record(format!("withdraw:{amount}:{destination}"));
                Ok(())
            })
        }
    }

    fn config(mode: Mode) -> RunConfig {
        RunConfig {
            mode,
            pair_name: "PURR/USDC".to_string(),
            base_token: "PURR".to_string(),
            quote_token: "USDC".to_string(),
            base_amount: None,
            quote_amount: None,
            slippage_bps: 30,
            destination: None,
            settle_wait: SettleWait::from_millis(0),
            price_source: PriceSource::BestBid,
        }
    }

    #[tokio::test]
    async fn test_sell_and_transfer_happy_path() {
        let mut runner = Runner::new(StubExchange::new(), config(Mode::SellAndTransfer));
        runner.run().await.unwrap();
        assert_eq!(runner.state(), RunState::Done);

        let calls = runner.exchange.calls();
        // 100 PURR at bid 0.0205 with 30 bps: px = floor(0.0204385, 6)
        assert!(calls.contains(&"submit_order:100:0.020438".to_string()));
        // 2.0489 floored at 8 decimals minus one tick buffer
        assert!(calls.contains(&"transfer:2.04889999".to_string()));

        // transfer's balance read happens after the order, never before
        let order_pos = calls
            .iter()
            .position(|c| c.starts_with("submit_order"))
            .unwrap();
        let quote_read_pos = calls
            .iter()
            .position(|c| c == "balance:spot:USDC")
            .unwrap();
        assert!(quote_read_pos > order_pos);
    }

    #[tokio::test]
    async fn test_no_base_balance_fails_before_order() {
        let mut stub = StubExchange::new();
        stub.spot_base = dec!(0);
        let mut runner = Runner::new(stub, config(Mode::SellAndTransfer));

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FlowError::InsufficientBalance { .. }));
        assert_eq!(runner.state(), RunState::Failed);
        assert!(!runner.exchange.called("submit_order"));
        assert!(!runner.exchange.called("transfer"));
    }

    #[tokio::test]
    async fn test_no_quote_after_sell_fails_transfer() {
        let mut stub = StubExchange::new();
        stub.spot_quote_after = dec!(0);
        let mut runner = Runner::new(stub, config(Mode::SellAndTransfer));

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FlowError::InsufficientBalance { .. }));
        assert_eq!(runner.state(), RunState::Failed);
        // the sell went through and is not rolled back
        assert!(runner.exchange.called("submit_order"));
        assert!(!runner.exchange.called("transfer"));
    }

    #[tokio::test]
    async fn test_unfilled_ioc_stops_the_run() {
        let mut stub = StubExchange::new();
        stub.reject_reason = Some("Order could not immediately match".to_string());
        let mut runner = Runner::new(stub, config(Mode::SellAndTransfer));

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FlowError::OrderNotFilled { .. }));
        assert_eq!(runner.state(), RunState::Failed);
        assert!(!runner.exchange.called("transfer"));
    }

    #[tokio::test]
    async fn test_transfer_only_never_touches_the_order_path() {
        let mut stub = StubExchange::new();
        stub.spot_quote_before = dec!(12.5);
        let mut runner = Runner::new(stub, config(Mode::TransferOnly));

        runner.run().await.unwrap();
        assert_eq!(runner.state(), RunState::Done);
        assert!(!runner.exchange.called("submit_order"));
        assert!(!runner.exchange.called("reference_price"));
        assert!(runner.exchange.called("transfer"));
    }

    #[tokio::test]
    async fn test_transfer_request_capped_by_balance() {
        let mut stub = StubExchange::new();
        stub.spot_quote_before = dec!(12.5);
        let mut cfg = config(Mode::TransferOnly);
        cfg.quote_amount = Some(dec!(1000));
        let mut runner = Runner::new(stub, cfg);

        runner.run().await.unwrap();
        assert!(runner.exchange.calls().contains(&"transfer:12.5".to_string()));
    }

    #[tokio::test]
    async fn test_withdraw_floors_to_eight_decimals() {
        let mut stub = StubExchange::new();
        stub.perps_quote = dec!(100);
        let mut cfg = config(Mode::Withdraw);
        cfg.quote_amount = Some(dec!(50.123456789));
        cfg.destination = Some("0x1111111111111111111111111111111111111111".to_string());
        let mut runner = Runner::new(stub, cfg);

        runner.run().await.unwrap();
        assert_eq!(runner.state(), RunState::Done);
        assert!(runner.exchange.calls().contains(
            &"withdraw:50.12345678:0x1111111111111111111111111111111111111111".to_string()
        ));
        assert!(!runner.exchange.called("submit_order"));
    }

    #[tokio::test]
    async fn test_withdraw_uses_live_perps_balance_when_unbounded() {
        let mut stub = StubExchange::new();
        stub.perps_quote = dec!(33.333333339);
        let mut cfg = config(Mode::Withdraw);
        cfg.destination = Some("0x1111111111111111111111111111111111111111".to_string());
        let mut runner = Runner::new(stub, cfg);

        runner.run().await.unwrap();
        // floor(33.333333339, 8) - 0.00000001 = 33.33333332
        assert!(runner.exchange.calls().contains(
            &"withdraw:33.33333332:0x1111111111111111111111111111111111111111".to_string()
        ));
    }

    #[tokio::test]
    async fn test_malformed_destination_makes_zero_network_calls() {
        let mut cfg = config(Mode::Withdraw);
        cfg.destination = Some("not-an-address".to_string());
        let mut runner = Runner::new(StubExchange::new(), cfg);

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidDestination(_)));
        assert_eq!(runner.state(), RunState::Failed);
        assert!(runner.exchange.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_destination_is_a_config_error() {
        let mut runner = Runner::new(StubExchange::new(), config(Mode::Withdraw));
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
        assert!(runner.exchange.calls().is_empty());
    }

    #[tokio::test]
    async fn test_requested_sell_amount_capped() {
        let mut cfg = config(Mode::SellAndTransfer);
        cfg.base_amount = Some(dec!(1000));
        let mut runner = Runner::new(StubExchange::new(), cfg);

        runner.run().await.unwrap();
        // capped at the live 100 PURR balance
        assert!(runner
            .exchange
            .calls()
            .contains(&"submit_order:100:0.020438".to_string()));
    }
}
