// crates/neon-token/src/balances.rs
//
// Balance book shared by the NEON token and the LP staking asset.
//
// Owns account balances, delegated allowances and the fixed total supply.
// Supply is minted once at genesis and never changes afterwards, so the sum
// of all balances equals `total_supply` at every observation point.

use std::collections::BTreeMap;

use neon_core::units::Wei;
use neon_core::{Address, NeonError};

/// Balances, allowances and supply of one fungible asset.
#[derive(Debug, Clone, Default)]
pub struct Balances {
    balances: BTreeMap<Address, Wei>,
    allowances: BTreeMap<(Address, Address), Wei>,
    total_supply: Wei,
}

impl Balances {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book by minting each `(holder, amount)` pair.
    ///
    /// Repeated holders accumulate. Fails if the supply would overflow or a
    /// holder is the zero address.
    pub fn with_allocations<I>(allocations: I) -> Result<Self, NeonError>
    where
        I: IntoIterator<Item = (Address, Wei)>,
    {
        let mut book = Self::new();
        for (holder, amount) in allocations {
            if holder.is_zero() {
                return Err(NeonError::InvalidAddress(
                    "cannot mint to the zero address".to_string(),
                ));
            }
            book.total_supply = book.total_supply.checked_add(amount).ok_or_else(|| {
                NeonError::InvalidAmount("genesis supply overflows u128".to_string())
            })?;
            *book.balances.entry(holder).or_insert(0) += amount;
        }
        Ok(book)
    }

    /// Total supply in wei.
    pub fn total_supply(&self) -> Wei {
        self.total_supply
    }

    /// Balance of `account` (0 for unknown accounts).
    pub fn balance_of(&self, account: &Address) -> Wei {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move out of `owner`.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Wei {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Set the allowance of `spender` over `owner`'s balance.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Wei) -> Result<(), NeonError> {
        if spender.is_zero() {
            return Err(NeonError::InvalidAddress(
                "cannot approve the zero address".to_string(),
            ));
        }
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    /// Fail unless `account` holds at least `amount`.
    pub fn check_debit(&self, account: &Address, amount: Wei) -> Result<(), NeonError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(NeonError::InsufficientBalance {
                account: *account,
                available,
                needed: amount,
            });
        }
        Ok(())
    }

    /// Fail unless `spender` may move at least `amount` out of `owner`.
    pub fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Wei,
    ) -> Result<(), NeonError> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(NeonError::InsufficientAllowance {
                spender: *spender,
                available,
                needed: amount,
            });
        }
        Ok(())
    }

    /// Reduce an allowance. Callers must have run `check_allowance` first.
    pub(crate) fn spend_allowance(&mut self, owner: Address, spender: Address, amount: Wei) {
        let remaining = self.allowance(&owner, &spender).saturating_sub(amount);
        if remaining == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), remaining);
        }
    }

    /// Debit `from` by `delivered + fee`, credit `to` with `delivered` and
    /// `fee_recipient` with `fee`.
    ///
    /// Callers must have run `check_debit(from, delivered + fee)` first; the
    /// debit happens before any credit so self-transfers are safe.
    pub(crate) fn settle(
        &mut self,
        from: Address,
        to: Address,
        delivered: Wei,
        fee: Option<(Address, Wei)>,
    ) {
        let fee_amount = fee.map(|(_, f)| f).unwrap_or(0);
        let debit = delivered + fee_amount;

        let from_balance = self.balance_of(&from);
        debug_assert!(from_balance >= debit, "settle called without check_debit");
        let new_from = from_balance - debit;
        if new_from == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, new_from);
        }

        self.credit(to, delivered);
        if let Some((recipient, amount)) = fee {
            self.credit(recipient, amount);
        }
    }

    fn credit(&mut self, account: Address, amount: Wei) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(account).or_insert(0) += amount;
    }

    /// Whether the sum of all balances equals the total supply.
    pub fn is_conserved(&self) -> bool {
        let sum = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b));
        sum == Some(self.total_supply)
    }

    /// All non-zero holders, ordered by address.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Wei)> {
        self.balances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat(1)
    }

    fn bob() -> Address {
        Address::repeat(2)
    }

    #[test]
    fn test_allocations_accumulate() {
        let book = Balances::with_allocations([(alice(), 10), (bob(), 5), (alice(), 3)]).unwrap();
        assert_eq!(book.balance_of(&alice()), 13);
        assert_eq!(book.balance_of(&bob()), 5);
        assert_eq!(book.total_supply(), 18);
        assert!(book.is_conserved());
    }

    #[test]
    fn test_mint_to_zero_rejected() {
        assert!(Balances::with_allocations([(Address::ZERO, 1)]).is_err());
    }

    #[test]
    fn test_mint_overflow_rejected() {
        assert!(Balances::with_allocations([(alice(), u128::MAX), (bob(), 1)]).is_err());
    }

    #[test]
    fn test_check_debit() {
        let book = Balances::with_allocations([(alice(), 10)]).unwrap();
        assert!(book.check_debit(&alice(), 10).is_ok());
        assert_eq!(
            book.check_debit(&alice(), 11),
            Err(NeonError::InsufficientBalance {
                account: alice(),
                available: 10,
                needed: 11,
            })
        );
    }

    #[test]
    fn test_settle_with_fee() {
        let pool = Address::repeat(9);
        let mut book = Balances::with_allocations([(alice(), 100)]).unwrap();
        book.settle(alice(), bob(), 99, Some((pool, 1)));
        assert_eq!(book.balance_of(&alice()), 0);
        assert_eq!(book.balance_of(&bob()), 99);
        assert_eq!(book.balance_of(&pool), 1);
        assert!(book.is_conserved());
    }

    #[test]
    fn test_self_settle_keeps_balance() {
        let mut book = Balances::with_allocations([(alice(), 100)]).unwrap();
        book.settle(alice(), alice(), 100, None);
        assert_eq!(book.balance_of(&alice()), 100);
        assert!(book.is_conserved());
    }

    #[test]
    fn test_allowance_lifecycle() {
        let mut book = Balances::with_allocations([(alice(), 100)]).unwrap();
        book.approve(alice(), bob(), 40).unwrap();
        assert_eq!(book.allowance(&alice(), &bob()), 40);
        assert!(book.check_allowance(&alice(), &bob(), 41).is_err());
        book.spend_allowance(alice(), bob(), 15);
        assert_eq!(book.allowance(&alice(), &bob()), 25);
        book.approve(alice(), bob(), 0).unwrap();
        assert_eq!(book.allowance(&alice(), &bob()), 0);
    }

    #[test]
    fn test_approve_zero_spender_rejected() {
        let mut book = Balances::new();
        assert!(book.approve(alice(), Address::ZERO, 1).is_err());
    }
}
