//! Pre-admission validation.
//!
//! Placement runs through a [`Validator`] before any book mutation: buys
//! must be covered by quote funds for the full limit notional, sells by
//! fractional holdings of the asset. The check is synchronous and advisory
//! only — the engine never moves balances itself; custody stays with the
//! surrounding platform.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokmatch_types::{AssetId, EngineError, MakerId, Result, Side};

/// Decides whether a maker may place an order.
pub trait Validator: Send + Sync {
    /// Check that `maker` can cover an order of `quantity` at limit `price`.
    ///
    /// # Errors
    /// - `InsufficientFunds` when a buy's notional exceeds available funds
    /// - `NotAssetOwner` when a sell exceeds the maker's holdings
    fn check_funds(
        &self,
        maker: MakerId,
        asset_id: &AssetId,
        side: Side,
        price: u64,
        quantity: u64,
    ) -> Result<()>;
}

/// Validator that admits everything. Useful when custody checks happen
/// upstream of the engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unrestricted;

impl Validator for Unrestricted {
    fn check_funds(
        &self,
        _maker: MakerId,
        _asset_id: &AssetId,
        _side: Side,
        _price: u64,
        _quantity: u64,
    ) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Balances {
    /// Quote funds per maker, in the smallest currency unit.
    funds: HashMap<MakerId, u128>,
    /// Fractional holdings per maker and asset.
    holdings: HashMap<(MakerId, AssetId), u64>,
}

/// In-memory balance book: quote funds for buys, per-asset holdings for
/// sells. Checks are against deposited totals; nothing is frozen or moved
/// on placement.
#[derive(Debug, Default)]
pub struct BalanceValidator {
    inner: Mutex<Balances>,
}

impl BalanceValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit quote funds to a maker.
    pub fn deposit_funds(&self, maker: MakerId, amount: u128) {
        let mut inner = self.inner.lock();
        let balance = inner.funds.entry(maker).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Credit fractional holdings of an asset to a maker.
    pub fn deposit_holdings(&self, maker: MakerId, asset_id: AssetId, quantity: u64) {
        let mut inner = self.inner.lock();
        let held = inner.holdings.entry((maker, asset_id)).or_insert(0);
        *held = held.saturating_add(quantity);
    }

    /// Quote funds currently credited to a maker.
    #[must_use]
    pub fn funds(&self, maker: MakerId) -> u128 {
        self.inner.lock().funds.get(&maker).copied().unwrap_or(0)
    }

    /// Holdings of an asset currently credited to a maker.
    #[must_use]
    pub fn holdings(&self, maker: MakerId, asset_id: &AssetId) -> u64 {
        self.inner
            .lock()
            .holdings
            .get(&(maker, asset_id.clone()))
            .copied()
            .unwrap_or(0)
    }
}

impl Validator for BalanceValidator {
    fn check_funds(
        &self,
        maker: MakerId,
        asset_id: &AssetId,
        side: Side,
        price: u64,
        quantity: u64,
    ) -> Result<()> {
        let inner = self.inner.lock();
        match side {
            Side::Buy => {
                let needed = u128::from(price) * u128::from(quantity);
                let available = inner.funds.get(&maker).copied().unwrap_or(0);
                if available < needed {
                    return Err(EngineError::InsufficientFunds { needed, available });
                }
            }
            Side::Sell => {
                let held = inner
                    .holdings
                    .get(&(maker, asset_id.clone()))
                    .copied()
                    .unwrap_or(0);
                if held < quantity {
                    return Err(EngineError::NotAssetOwner {
                        maker,
                        asset: asset_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
