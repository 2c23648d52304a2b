// crates/neon-vault/tests/vault_flow.rs
//
// Vault behaviour against real NEON and LP ledgers.

use neon_core::{Address, FeeSink, NeonError, TokenLedger, Wei, WEI_PER_NEON};
use neon_token::{GenesisAllocation, LpToken, NeonToken};
use neon_vault::NeonVault;

const T0: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

fn gov() -> Address {
    Address::repeat(0x01)
}

fn market() -> Address {
    Address::repeat(0x12)
}

fn dev() -> Address {
    Address::repeat(0xde)
}

struct Harness {
    token: NeonToken,
    lp: LpToken,
    vault: NeonVault,
}

impl Harness {
    fn new() -> Self {
        let allocation = GenesisAllocation {
            presale: Address::repeat(0x10),
            uniswap_airdrop: Address::repeat(0x11),
            market: market(),
            team: Address::repeat(0x13),
        };
        let mut token = NeonToken::genesis(Address::repeat(0xaa), gov(), &allocation).unwrap();
        let lp = LpToken::genesis(
            Address::repeat(0xbb),
            "NEON-LP",
            [(market(), 1_000 * WEI_PER_NEON), (Address::repeat(0x20), 1_000 * WEI_PER_NEON)],
        )
        .unwrap();
        let mut vault = NeonVault::new(Address::repeat(0xee), gov(), T0);

        token.change_reward_pool(&gov(), vault.address()).unwrap();
        vault.change_staking_asset(&gov(), TokenLedger::address(&lp)).unwrap();
        vault.change_reward_asset(&gov(), TokenLedger::address(&token)).unwrap();
        vault.change_dev_fee_receiver(&gov(), dev()).unwrap();
        Self { token, lp, vault }
    }

    /// Transfer NEON and route the fee into the vault, as the economy does.
    fn transfer(&mut self, from: Address, to: Address, amount: Wei, now: u64) {
        let receipt = self.token.transfer(from, to, amount).unwrap();
        if receipt.fee > 0 {
            self.vault.record_fee_income(receipt.fee, now).unwrap();
        }
    }

    fn stake(&mut self, who: Address, amount: Wei, now: u64) -> Result<u64, NeonError> {
        self.lp.approve(who, self.vault.address(), amount).unwrap();
        self.vault.stake(who, amount, &mut self.lp, now)
    }

    fn claim(&mut self, who: Address, now: u64) -> Wei {
        self.vault.get_reward(who, &mut self.token, now).unwrap().reward
    }
}

#[test]
fn reward_is_zero_until_a_full_epoch_closes() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 50 * WEI_PER_NEON, T0 + 10);
    assert_eq!(h.vault.epoch_reward(T0), 5 * WEI_PER_NEON / 10);

    h.stake(market(), 1_000 * WEI_PER_NEON, T0 + 20).unwrap();
    assert_eq!(h.vault.pending_reward(&market(), T0 + 20), 0);
    assert_eq!(h.claim(market(), T0 + 30), 0);
    assert_eq!(h.vault.pending_reward(&market(), T0 + DAY - 1), 0);
    // The stake joined epoch 0 part-way, so its income stays in the vault.
    assert_eq!(h.claim(market(), T0 + DAY), 0);

    h.transfer(market(), Address::repeat(0x42), 50 * WEI_PER_NEON, T0 + DAY + 10);
    assert_eq!(h.vault.pending_reward(&market(), T0 + 2 * DAY - 1), 0);

    // Epoch 1 was held from open to close: its whole distributable is due.
    let expected = 5 * WEI_PER_NEON / 10 * 96 / 100;
    assert_eq!(h.vault.pending_reward(&market(), T0 + 2 * DAY), expected);
    let before = h.token.balance_of(&market());
    assert_eq!(h.claim(market(), T0 + 2 * DAY), expected);
    assert_eq!(h.token.balance_of(&market()), before + expected);
    assert!(h.token.is_conserved());
}

#[test]
fn stake_placed_just_before_close_earns_nothing() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 1);
    h.stake(market(), 1_000 * WEI_PER_NEON, T0 + DAY - 1).unwrap();

    assert_eq!(h.vault.pending_reward(&market(), T0 + DAY), 0);
    assert_eq!(h.claim(market(), T0 + DAY), 0);
    let closed = h.vault.epochs().get(0).unwrap();
    assert_eq!(closed.total_staked, 1_000 * WEI_PER_NEON);
    assert_eq!(closed.eligible_staked, 0);

    // Withdrawn straight after the close: no epoch was held throughout.
    h.vault
        .withdraw(market(), 1_000 * WEI_PER_NEON, &mut h.lp, T0 + DAY + 1)
        .unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 2);
    assert_eq!(h.claim(market(), T0 + 5 * DAY), 0);
    assert_eq!(h.token.balance_of(&h.vault.address()), 2 * WEI_PER_NEON);
}

#[test]
fn mid_epoch_changes_count_only_stake_held_throughout() {
    let mut h = Harness::new();
    let other = Address::repeat(0x20);
    h.stake(market(), 300 * WEI_PER_NEON, T0).unwrap();
    h.stake(other, 100 * WEI_PER_NEON, T0).unwrap();

    h.transfer(market(), Address::repeat(0x42), 400 * WEI_PER_NEON, T0 + DAY + 100);
    h.vault
        .withdraw(market(), 200 * WEI_PER_NEON, &mut h.lp, T0 + DAY + 200)
        .unwrap();
    h.stake(other, 500 * WEI_PER_NEON, T0 + DAY + 300).unwrap();

    let epoch = h.vault.epochs().current().clone();
    assert_eq!(epoch.total_staked, 700 * WEI_PER_NEON);
    assert_eq!(epoch.eligible_staked, 200 * WEI_PER_NEON);

    let distributable = 4 * WEI_PER_NEON * 9_600 / 10_000;
    assert_eq!(h.claim(market(), T0 + 2 * DAY), distributable / 2);
    assert_eq!(h.claim(other, T0 + 2 * DAY), distributable / 2);
}

#[test]
fn stake_validates_amount_and_asset() {
    let mut h = Harness::new();
    assert!(matches!(
        h.vault.stake(market(), 0, &mut h.lp, T0),
        Err(NeonError::InvalidAmount(_))
    ));
    // No allowance granted.
    assert!(matches!(
        h.vault.stake(market(), WEI_PER_NEON, &mut h.lp, T0),
        Err(NeonError::TransferFailed(_))
    ));
    // Above balance.
    assert!(matches!(
        h.stake(market(), 2_000 * WEI_PER_NEON, T0),
        Err(NeonError::TransferFailed(_))
    ));
    // The NEON token is not the staking asset.
    assert!(matches!(
        h.vault.stake(market(), WEI_PER_NEON, &mut h.token, T0),
        Err(NeonError::TransferFailed(_))
    ));
    assert_eq!(h.vault.total_staked(), 0);
}

#[test]
fn unconfigured_staking_asset_fails() {
    let mut lp = LpToken::genesis(Address::repeat(0xbb), "NEON-LP", [(market(), 10)]).unwrap();
    let mut vault = NeonVault::new(Address::repeat(0xee), gov(), T0);
    lp.approve(market(), vault.address(), 10).unwrap();
    assert!(matches!(
        vault.stake(market(), 10, &mut lp, T0),
        Err(NeonError::TransferFailed(_))
    ));
}

#[test]
fn stake_tracks_user_and_epoch_totals() {
    let mut h = Harness::new();
    h.stake(market(), 400 * WEI_PER_NEON, T0 + 5).unwrap();
    h.stake(market(), 100 * WEI_PER_NEON, T0 + DAY + 5).unwrap();

    assert_eq!(h.vault.user_total_staked(&market()), 500 * WEI_PER_NEON);
    assert_eq!(h.vault.total_staked(), 500 * WEI_PER_NEON);
    assert_eq!(h.vault.user_started_time(&market()), T0 + 5);
    assert_eq!(h.vault.user_epoch_staked(&market(), T0), 400 * WEI_PER_NEON);
    assert_eq!(h.vault.user_epoch_staked(&market(), T0 + DAY), 500 * WEI_PER_NEON);
    assert_eq!(h.vault.epoch_total_staked(T0), 400 * WEI_PER_NEON);
    assert_eq!(h.vault.epoch_total_staked(T0 + DAY), 500 * WEI_PER_NEON);
    assert_eq!(h.lp.balance_of(&h.vault.address()), 500 * WEI_PER_NEON);
}

#[test]
fn withdraw_returns_stake() {
    let mut h = Harness::new();
    h.stake(market(), 400 * WEI_PER_NEON, T0).unwrap();
    assert!(matches!(
        h.vault.withdraw(market(), 401 * WEI_PER_NEON, &mut h.lp, T0 + 1),
        Err(NeonError::InsufficientStake { .. })
    ));
    h.vault
        .withdraw(market(), 150 * WEI_PER_NEON, &mut h.lp, T0 + 1)
        .unwrap();
    assert_eq!(h.vault.user_total_staked(&market()), 250 * WEI_PER_NEON);
    assert_eq!(h.vault.total_staked(), 250 * WEI_PER_NEON);
    assert_eq!(h.lp.balance_of(&market()), 750 * WEI_PER_NEON);
    // A withdrawal inside the open epoch reduces its recorded stake.
    assert_eq!(h.vault.user_epoch_staked(&market(), T0), 250 * WEI_PER_NEON);
}

#[test]
fn rewards_split_pro_rata() {
    let mut h = Harness::new();
    let other = Address::repeat(0x20);
    h.stake(market(), 300 * WEI_PER_NEON, T0).unwrap();
    h.stake(other, 100 * WEI_PER_NEON, T0).unwrap();
    h.transfer(market(), Address::repeat(0x42), 400 * WEI_PER_NEON, T0 + DAY + 100);

    let income = 4 * WEI_PER_NEON;
    assert_eq!(h.vault.epoch_reward(T0 + DAY), income);
    let distributable = income * 9_600 / 10_000;

    let a = h.claim(market(), T0 + 2 * DAY);
    let b = h.claim(other, T0 + 2 * DAY);
    assert_eq!(a, distributable * 3 / 4);
    assert_eq!(b, distributable / 4);
    assert!(a + b <= distributable);
}

#[test]
fn dev_fee_is_paid_once_per_epoch() {
    let mut h = Harness::new();
    let other = Address::repeat(0x20);
    h.stake(market(), 100 * WEI_PER_NEON, T0).unwrap();
    h.stake(other, 100 * WEI_PER_NEON, T0).unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 1);

    let first = h.vault.get_reward(market(), &mut h.token, T0 + 2 * DAY).unwrap();
    let cut = WEI_PER_NEON * 4 / 100;
    assert_eq!(first.dev_fee_paid, cut);
    let second = h.vault.get_reward(other, &mut h.token, T0 + 2 * DAY).unwrap();
    assert_eq!(second.dev_fee_paid, 0);
    assert_eq!(h.token.balance_of(&dev()), cut);
    assert!(h.vault.epochs().get(1).unwrap().dev_fee_paid);

    // A repeated claim pays nothing.
    let again = h.vault.get_reward(market(), &mut h.token, T0 + 2 * DAY + 5).unwrap();
    assert_eq!(again.reward, 0);
    assert_eq!(again.dev_fee_paid, 0);
}

#[test]
fn dev_fee_deferred_without_receiver_then_collected() {
    let mut h = Harness::new();
    h.vault.change_dev_fee_receiver(&gov(), Address::ZERO).unwrap();
    h.stake(market(), 100 * WEI_PER_NEON, T0).unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 1);

    let now = T0 + 2 * DAY;
    let receipt = h.vault.get_reward(market(), &mut h.token, now).unwrap();
    assert_eq!(receipt.dev_fee_paid, 0);
    assert!(!h.vault.epochs().get(1).unwrap().dev_fee_paid);

    assert!(matches!(
        h.vault.collect_dev_fees(&gov(), &mut h.token, now),
        Err(NeonError::InvalidState(_))
    ));
    h.vault.change_dev_fee_receiver(&gov(), dev()).unwrap();
    assert!(matches!(
        h.vault.collect_dev_fees(&market(), &mut h.token, now),
        Err(NeonError::Unauthorized(_))
    ));
    let collected = h.vault.collect_dev_fees(&gov(), &mut h.token, now).unwrap();
    assert_eq!(collected, WEI_PER_NEON * 4 / 100);
    assert_eq!(h.token.balance_of(&dev()), collected);
    assert_eq!(h.vault.collect_dev_fees(&gov(), &mut h.token, now).unwrap(), 0);
}

#[test]
fn unstaked_epoch_income_is_stranded() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 1);
    h.stake(market(), 100 * WEI_PER_NEON, T0 + DAY + 1).unwrap();

    assert_eq!(h.claim(market(), T0 + 3 * DAY), 0);
    assert_eq!(h.token.balance_of(&h.vault.address()), WEI_PER_NEON);
    assert_eq!(
        h.vault.collect_dev_fees(&gov(), &mut h.token, T0 + 3 * DAY).unwrap(),
        0
    );
}

#[test]
fn closed_epoch_reward_never_changes() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 1);
    let closed = h.vault.epoch_reward(T0);

    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 1);
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 5 * DAY);
    assert_eq!(h.vault.epoch_reward(T0), closed);
    assert_eq!(h.vault.epoch_reward(T0 + DAY), WEI_PER_NEON);
    assert_eq!(h.vault.epoch_reward(T0 + 5 * DAY), WEI_PER_NEON);
}

#[test]
fn reward_period_change_preserves_closed_epochs() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 1);
    h.transfer(market(), Address::repeat(0x42), 200 * WEI_PER_NEON, T0 + DAY + 1);
    let day0 = h.vault.epoch_reward(T0);
    let day1 = h.vault.epoch_reward(T0 + DAY);

    h.vault.change_reward_period(&gov(), 2 * DAY, T0 + 2 * DAY + 1).unwrap();
    assert_eq!(h.vault.reward_period(), 2 * DAY);
    assert_eq!(h.vault.epoch_reward(T0), day0);
    assert_eq!(h.vault.epoch_reward(T0 + DAY), day1);

    h.vault.change_reward_period(&gov(), DAY, T0 + 3 * DAY).unwrap();
    assert_eq!(h.vault.reward_period(), DAY);
    assert_eq!(h.vault.epoch_reward(T0), day0);
    assert_eq!(h.vault.epoch_reward(T0 + DAY), day1);
    assert_eq!(h.vault.contract_start_time(), T0);
}

#[test]
fn period_round_trip_keeps_income_between_changes() {
    let mut h = Harness::new();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 1);
    h.vault.change_reward_period(&gov(), 2 * DAY, T0 + 100).unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 100);
    let before = h.vault.epoch_reward(T0 + DAY + 100);
    assert_eq!(before, 2 * WEI_PER_NEON);

    h.vault.change_reward_period(&gov(), DAY, T0 + DAY + 200).unwrap();
    assert_eq!(h.vault.epoch_reward(T0 + DAY + 100), before);
    assert_eq!(h.vault.epoch_reward(T0 + 1), before);

    let closed = h.vault.epochs().get(0).unwrap();
    assert_eq!(closed.end_time, Some(T0 + DAY + 200));
    assert_eq!(h.vault.last_rewarded_time(), T0 + DAY + 200);

    // The successor runs a full new period from the change.
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 2 * DAY + 100);
    assert_eq!(h.vault.epoch_reward(T0 + 2 * DAY + 100), WEI_PER_NEON);
    assert_eq!(h.vault.epoch_reward(T0 + DAY + 100), before);
}

#[test]
fn shortened_period_closes_open_epoch_at_change() {
    let mut h = Harness::new();
    let hour = 3_600;
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + 4 * hour);
    h.vault.change_reward_period(&gov(), hour, T0 + 5 * hour).unwrap();

    assert_eq!(h.vault.epoch_reward(T0 + 4 * hour), WEI_PER_NEON);
    assert_eq!(h.vault.current_epoch(), 1);
    assert_eq!(h.vault.last_rewarded_time(), T0 + 5 * hour);

    h.transfer(market(), Address::repeat(0x42), 200 * WEI_PER_NEON, T0 + 5 * hour + 10);
    assert_eq!(h.vault.epoch_reward(T0 + 5 * hour), 2 * WEI_PER_NEON);
    assert_eq!(h.vault.epoch_reward(T0 + 4 * hour), WEI_PER_NEON);
}

#[test]
fn epoch_views_carry_stake_without_sync() {
    let mut h = Harness::new();
    h.stake(market(), 1_000 * WEI_PER_NEON, T0 + 1).unwrap();

    let later = T0 + 2 * DAY + 5;
    assert_eq!(h.vault.epoch_total_staked(later), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.user_epoch_staked(&market(), later), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.user_epoch_staked(&Address::repeat(0x20), later), 0);
    assert_eq!(h.vault.epoch_reward(later), 0);

    // Same answers once the book has caught up, skipped epoch included.
    h.vault.sync(T0 + 3 * DAY);
    assert_eq!(h.vault.epoch_total_staked(later), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.epoch_total_staked(T0 + DAY + 5), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.user_epoch_staked(&market(), T0 + DAY + 5), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.epoch_total_staked(T0 - 1), 0);
}

#[test]
fn exit_claims_and_withdraws() {
    let mut h = Harness::new();
    h.stake(market(), 1_000 * WEI_PER_NEON, T0).unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 1);

    let (receipt, withdrawn) = h
        .vault
        .exit(market(), &mut h.lp, &mut h.token, T0 + 2 * DAY)
        .unwrap();
    assert_eq!(withdrawn, 1_000 * WEI_PER_NEON);
    assert_eq!(receipt.reward, WEI_PER_NEON * 96 / 100);
    assert_eq!(h.lp.balance_of(&market()), 1_000 * WEI_PER_NEON);
    assert_eq!(h.vault.user_total_staked(&market()), 0);
    assert!(h.vault.position(&market()).unwrap().is_empty());

    assert!(matches!(
        h.vault.exit(market(), &mut h.lp, &mut h.token, T0 + 2 * DAY),
        Err(NeonError::InvalidState(_))
    ));
}

#[test]
fn governance_setters_require_principal() {
    let mut h = Harness::new();
    let outsider = Address::repeat(0x42);
    assert_eq!(
        h.vault.change_reward_period(&outsider, 1, T0),
        Err(NeonError::Unauthorized(outsider))
    );
    assert!(h.vault.change_dev_fee(&outsider, 1, T0).is_err());
    assert!(h.vault.change_dev_fee_receiver(&outsider, outsider).is_err());
    assert!(h.vault.change_staking_asset(&outsider, outsider).is_err());
    assert!(h.vault.change_reward_asset(&outsider, outsider).is_err());
    assert!(matches!(
        h.vault.change_reward_period(&gov(), 0, T0),
        Err(NeonError::InvalidAmount(_))
    ));
    assert!(matches!(
        h.vault.change_dev_fee(&gov(), 10_001, T0),
        Err(NeonError::InvalidAmount(_))
    ));
    assert_eq!(h.vault.dev_fee(), 400);
    assert_eq!(h.vault.reward_period(), DAY);
}

#[test]
fn dev_fee_rate_is_fixed_at_close() {
    let mut h = Harness::new();
    h.stake(market(), 100 * WEI_PER_NEON, T0).unwrap();
    h.transfer(market(), Address::repeat(0x42), 100 * WEI_PER_NEON, T0 + DAY + 1);
    // Changed after the epoch elapsed: the epoch closes at the old rate.
    h.vault.change_dev_fee(&gov(), 0, T0 + 2 * DAY).unwrap();
    assert_eq!(h.claim(market(), T0 + 2 * DAY), WEI_PER_NEON * 96 / 100);
}
