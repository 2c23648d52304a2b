// crates/neon-token/src/token.rs
//
// The NEON value ledger.
//
// A fixed-supply, 18-decimal token whose transfers withhold a governance-set
// fee and credit it to the reward pool (the staking vault). The fee amount is
// reported on the returned receipt; the economy layer forwards it to the
// vault's epoch book within the same call.
//
// Genesis allocation (10,000 NEON):
//   - Presale distributor: 5,000 NEON
//   - Uniswap liquidity airdrop: 4,250 NEON
//   - Marketing: 500 NEON
//   - Team: 250 NEON

use serde::{Deserialize, Serialize};

use neon_core::units::{wei_string, WEI_PER_NEON};
use neon_core::{Address, Governance, NeonError, TokenLedger, TransferReceipt, Wei};

use crate::balances::Balances;
use crate::fee::TransferFeeConfig;

/// Token name.
pub const TOKEN_NAME: &str = "NEONToken";

/// Token symbol.
pub const TOKEN_SYMBOL: &str = "NEON";

/// Presale distributor allocation: 5,000 NEON.
pub const PRESALE_ALLOCATION: Wei = 5_000 * WEI_PER_NEON;

/// Uniswap liquidity airdrop allocation: 4,250 NEON.
pub const UNISWAP_ALLOCATION: Wei = 4_250 * WEI_PER_NEON;

/// Marketing allocation: 500 NEON.
pub const MARKET_ALLOCATION: Wei = 500 * WEI_PER_NEON;

/// Team allocation: 250 NEON.
pub const TEAM_ALLOCATION: Wei = 250 * WEI_PER_NEON;

/// Total supply: 10,000 NEON.
pub const TOTAL_SUPPLY: Wei =
    PRESALE_ALLOCATION + UNISWAP_ALLOCATION + MARKET_ALLOCATION + TEAM_ALLOCATION;

/// Recipients of the genesis allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub presale: Address,
    pub uniswap_airdrop: Address,
    pub market: Address,
    pub team: Address,
}

/// Read-only token summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "wei_string")]
    pub total_supply: Wei,
    pub transfer_fee_bps: u16,
    pub reward_pool: Address,
    pub presale: Address,
    pub paused: bool,
    pub governance: Address,
}

/// The fee-bearing NEON ledger.
#[derive(Debug, Clone)]
pub struct NeonToken {
    /// The token's own address.
    address: Address,
    governance: Governance,
    book: Balances,
    fee: TransferFeeConfig,
    /// Presale distributor; its outgoing transfers are fee-exempt.
    presale: Address,
    paused: bool,
}

impl NeonToken {
    /// Mint the genesis supply and hand governance to `governance`.
    pub fn genesis(
        address: Address,
        governance: Address,
        allocation: &GenesisAllocation,
    ) -> Result<Self, NeonError> {
        let book = Balances::with_allocations([
            (allocation.presale, PRESALE_ALLOCATION),
            (allocation.uniswap_airdrop, UNISWAP_ALLOCATION),
            (allocation.market, MARKET_ALLOCATION),
            (allocation.team, TEAM_ALLOCATION),
        ])?;
        tracing::info!(
            "{} genesis: {} wei minted, governance {}",
            TOKEN_SYMBOL,
            book.total_supply(),
            governance
        );
        Ok(Self {
            address,
            governance: Governance::new("token", governance),
            book,
            fee: TransferFeeConfig::default(),
            presale: allocation.presale,
            paused: false,
        })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        neon_core::DECIMALS
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

    /// Current transfer fee in basis points.
    pub fn transfer_fee(&self) -> u16 {
        self.fee.rate_bps
    }

    /// Address credited with transfer fees (zero until configured).
    pub fn reward_pool(&self) -> Address {
        self.fee.reward_pool
    }

    pub fn presale(&self) -> Address {
        self.presale
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn governance(&self) -> &Governance {
        &self.governance
    }

    /// Whether the sum of all balances equals the total supply.
    pub fn is_conserved(&self) -> bool {
        self.book.is_conserved()
    }

    /// All holders with a non-zero balance.
    pub fn holders(&self) -> Vec<(Address, Wei)> {
        self.book.holders().map(|(a, b)| (*a, *b)).collect()
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            decimals: self.decimals(),
            total_supply: self.total_supply(),
            transfer_fee_bps: self.fee.rate_bps,
            reward_pool: self.fee.reward_pool,
            presale: self.presale,
            paused: self.paused,
            governance: self.governance.principal(),
        }
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Set the allowance of `spender` over `owner`'s balance.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Wei) -> Result<(), NeonError> {
        self.book.approve(owner, spender, amount)?;
        tracing::debug!("approve {} -> {}: {} wei", owner, spender, amount);
        Ok(())
    }

    fn execute(
        &mut self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError> {
        if self.paused {
            return Err(NeonError::PausedState);
        }
        if to.is_zero() {
            return Err(NeonError::InvalidAddress(
                "cannot transfer to the zero address".to_string(),
            ));
        }
        if let Some(spender) = spender {
            self.book.check_allowance(&from, &spender, amount)?;
        }
        self.book.check_debit(&from, amount)?;

        let quote = self.fee.quote(&from, &to, amount, &[self.presale]);

        // Validation is complete; mutate.
        if let Some(spender) = spender {
            self.book.spend_allowance(from, spender, amount);
        }
        let fee_credit = (quote.fee > 0).then_some((self.fee.reward_pool, quote.fee));
        self.book.settle(from, to, quote.delivered, fee_credit);

        tracing::debug!(
            "transfer {} -> {}: {} wei (delivered {}, fee {})",
            from,
            to,
            amount,
            quote.delivered,
            quote.fee
        );

        Ok(TransferReceipt {
            from,
            to,
            amount,
            delivered: quote.delivered,
            fee: quote.fee,
            fee_recipient: fee_credit.map(|(pool, _)| pool),
        })
    }

    /// Move `amount` from `from` to `to`, withholding the transfer fee.
    ///
    /// # Errors
    /// `PausedState` while paused, `InvalidAddress` for a zero recipient,
    /// `InsufficientBalance` if `from` holds less than `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<TransferReceipt, NeonError> {
        self.execute(None, from, to, amount)
    }

    /// Delegated transfer: `spender` moves `amount` out of `from`.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError> {
        self.execute(Some(spender), from, to, amount)
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Change the transfer fee. Applies to every subsequent transfer.
    pub fn change_transfer_fee(&mut self, caller: &Address, rate_bps: u16) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        let old = self.fee.rate_bps;
        self.fee.set_rate(rate_bps)?;
        tracing::info!("Transfer fee changed: {} bps -> {} bps", old, rate_bps);
        Ok(())
    }

    /// Point fee crediting at a new reward pool. Zero disables fees.
    pub fn change_reward_pool(&mut self, caller: &Address, pool: Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        tracing::info!("Reward pool changed: {} -> {}", self.fee.reward_pool, pool);
        self.fee.reward_pool = pool;
        Ok(())
    }

    /// Change the fee-exempt presale distributor.
    pub fn change_presale(&mut self, caller: &Address, presale: Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        tracing::info!("Presale address changed: {} -> {}", self.presale, presale);
        self.presale = presale;
        Ok(())
    }

    /// Block all transfers.
    pub fn pause(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        if self.paused {
            return Err(NeonError::InvalidState("token is already paused".to_string()));
        }
        self.paused = true;
        tracing::warn!("{} transfers paused by {}", TOKEN_SYMBOL, caller);
        Ok(())
    }

    /// Re-enable transfers.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        if !self.paused {
            return Err(NeonError::InvalidState("token is not paused".to_string()));
        }
        self.paused = false;
        tracing::info!("{} transfers unpaused by {}", TOKEN_SYMBOL, caller);
        Ok(())
    }

    /// Single-step governance transfer.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NeonError> {
        self.governance.transfer_ownership(caller, new_owner)
    }

    /// Two-step governance transfer, step one.
    pub fn nominate_owner(&mut self, caller: &Address, candidate: Address) -> Result<(), NeonError> {
        self.governance.nominate(caller, candidate)
    }

    /// Two-step governance transfer, step two.
    pub fn accept_ownership(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.governance.accept(caller)
    }
}

impl TokenLedger for NeonToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Wei {
        NeonToken::balance_of(self, account)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<TransferReceipt, NeonError> {
        NeonToken::transfer(self, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError> {
        NeonToken::transfer_from(self, spender, from, to, amount)
    }
}
