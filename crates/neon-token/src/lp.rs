// crates/neon-token/src/lp.rs
//
// Liquidity-pool token used as the vault's staking asset.
//
// A plain fee-less fungible ledger. Real deployments stake the NEON/ETH pool
// share; here the supply is minted once to the configured holders.

use serde::{Deserialize, Serialize};

use neon_core::units::{wei_string, WEI_PER_NEON};
use neon_core::{Address, NeonError, TokenLedger, TransferReceipt, Wei};

use crate::balances::Balances;

/// Default LP supply handed to the market wallet: 1,000 LP.
pub const DEFAULT_LP_SUPPLY: Wei = 1_000 * WEI_PER_NEON;

/// Read-only LP summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpInfo {
    pub address: Address,
    pub symbol: String,
    #[serde(with = "wei_string")]
    pub total_supply: Wei,
}

/// Fee-less staking asset.
#[derive(Debug, Clone)]
pub struct LpToken {
    address: Address,
    symbol: String,
    book: Balances,
}

impl LpToken {
    /// Mint the LP supply to `holders`.
    pub fn genesis<I>(address: Address, symbol: &str, holders: I) -> Result<Self, NeonError>
    where
        I: IntoIterator<Item = (Address, Wei)>,
    {
        let book = Balances::with_allocations(holders)?;
        tracing::info!("{} genesis: {} wei minted", symbol, book.total_supply());
        Ok(Self {
            address,
            symbol: symbol.to_string(),
            book,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> Wei {
        self.book.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> Wei {
        self.book.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Wei {
        self.book.allowance(owner, spender)
    }

    pub fn is_conserved(&self) -> bool {
        self.book.is_conserved()
    }

    pub fn info(&self) -> LpInfo {
        LpInfo {
            address: self.address,
            symbol: self.symbol.clone(),
            total_supply: self.total_supply(),
        }
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Wei) -> Result<(), NeonError> {
        self.book.approve(owner, spender, amount)
    }

    fn execute(
        &mut self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError> {
        if to.is_zero() {
            return Err(NeonError::InvalidAddress(
                "cannot transfer to the zero address".to_string(),
            ));
        }
        if let Some(spender) = spender {
            self.book.check_allowance(&from, &spender, amount)?;
        }
        self.book.check_debit(&from, amount)?;
        if let Some(spender) = spender {
            self.book.spend_allowance(from, spender, amount);
        }
        self.book.settle(from, to, amount, None);
        Ok(TransferReceipt::fee_free(from, to, amount))
    }
}

impl TokenLedger for LpToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Wei {
        self.book.balance_of(account)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<TransferReceipt, NeonError> {
        self.execute(None, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError> {
        self.execute(Some(spender), from, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp() -> LpToken {
        LpToken::genesis(Address::repeat(0xbb), "NEON-LP", [(Address::repeat(1), DEFAULT_LP_SUPPLY)]).unwrap()
    }

    #[test]
    fn test_genesis() {
        let t = lp();
        assert_eq!(t.total_supply(), 1_000 * WEI_PER_NEON);
        assert_eq!(t.balance_of(&Address::repeat(1)), DEFAULT_LP_SUPPLY);
        assert_eq!(TokenLedger::address(&t), Address::repeat(0xbb));
    }

    #[test]
    fn test_transfer_is_fee_free() {
        let mut t = lp();
        let receipt = TokenLedger::transfer(&mut t, Address::repeat(1), Address::repeat(2), 100).unwrap();
        assert_eq!(receipt.fee, 0);
        assert_eq!(t.balance_of(&Address::repeat(2)), 100);
        assert!(t.is_conserved());
    }

    #[test]
    fn test_transfer_from_needs_allowance() {
        let mut t = lp();
        let (owner, spender) = (Address::repeat(1), Address::repeat(3));
        assert!(TokenLedger::transfer_from(&mut t, spender, owner, spender, 5).is_err());
        t.approve(owner, spender, 5).unwrap();
        TokenLedger::transfer_from(&mut t, spender, owner, spender, 5).unwrap();
        assert_eq!(t.balance_of(&spender), 5);
        assert_eq!(t.allowance(&owner, &spender), 0);
    }
}
