//! Pure economy logic: money, experience, fame, prices and payment.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::InsufficientFunds;
use crate::stations::{DecorKind, FurnitureKind};

/// Ambient modifiers derived from the decor on the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bonuses {
    /// Multiplier on XP earned from customers.
    pub xp_multiplier: f32,
    /// Multiplier on patience decay; never below `MIN_PATIENCE_DECAY`.
    pub patience_decay: f32,
    /// Probability of a big tip.
    pub tip_chance: f64,
}

pub const MIN_PATIENCE_DECAY: f32 = 0.5;

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            xp_multiplier: 1.0,
            patience_decay: 1.0,
            tip_chance: 0.0,
        }
    }
}

impl Bonuses {
    /// Plants add 10% XP, lamps slow decay by 10% each, rugs add 10% tip chance.
    pub fn from_decor(decor: impl IntoIterator<Item = DecorKind>) -> Self {
        let mut bonuses = Self::default();
        for kind in decor {
            match kind {
                DecorKind::Plant => bonuses.xp_multiplier += 0.1,
                DecorKind::Lamp => bonuses.patience_decay *= 0.9,
                DecorKind::Rug => bonuses.tip_chance += 0.1,
            }
        }
        bonuses.patience_decay = bonuses.patience_decay.max(MIN_PATIENCE_DECAY);
        bonuses
    }
}

/// What a satisfied customer leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub money: i64,
    pub tip: i64,
    pub xp: u32,
}

/// Payment for a finished meal.
///
/// `big_tip` is the outcome of the caller's roll against `tip_chance`: a big
/// tip is half the remaining patience, a normal one a tenth. VIPs pay and
/// reward triple.
pub fn compute_payment(patience: f32, vip: bool, big_tip: bool, bonuses: &Bonuses) -> Payment {
    let patience = patience.max(0.0);
    let tip = if big_tip {
        (patience / 2.0).floor() as i64
    } else {
        (patience / 10.0).floor() as i64
    };
    let mut money = 20 + tip;
    let mut xp = ((10 + tip) as f32 * bonuses.xp_multiplier).floor() as u32;
    if vip {
        money *= 3;
        xp *= 3;
    }
    Payment { money, tip, xp }
}

/// Fame earned from one happy customer: 1 to 6 points.
pub fn fame_gain(patience: f32, max_patience: f32) -> f32 {
    if max_patience <= 0.0 {
        return 1.0;
    }
    let satisfaction = (patience / max_patience).clamp(0.0, 1.0);
    (satisfaction * 5.0).floor() + 1.0
}

/// Seconds between automatic customer arrivals; shrinks from 8 to 2 with fame.
pub fn spawn_interval(fame: f32) -> f32 {
    let fame_level = (fame / 50.0).min(2.0);
    (8.0 - fame_level * 3.0).max(2.0)
}

/// Purchase price of a piece of furniture.
pub fn furniture_cost(kind: FurnitureKind) -> i64 {
    match kind {
        FurnitureKind::Table => 50,
        FurnitureKind::Stove => 100,
        FurnitureKind::Counter => 30,
        FurnitureKind::Garden => 20,
        FurnitureKind::DrinkMachine => 150,
        FurnitureKind::Decor(DecorKind::Plant) => 15,
        FurnitureKind::Decor(DecorKind::Rug) => 10,
        FurnitureKind::Decor(DecorKind::Lamp) => 25,
    }
}

/// Money returned when furniture is sold. Only core kitchen pieces refund.
pub fn furniture_refund(kind: FurnitureKind) -> i64 {
    match kind {
        FurnitureKind::Table => 25,
        FurnitureKind::Stove => 50,
        FurnitureKind::Counter => 15,
        FurnitureKind::Garden => 10,
        _ => 0,
    }
}

/// Level / XP track with a growing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u32,
    pub max_xp: u32,
}

impl Progression {
    pub fn new(max_xp: u32) -> Self {
        Self {
            level: 1,
            xp: 0,
            max_xp,
        }
    }

    /// Add XP; returns true on level-up. Excess XP does not carry over.
    pub fn gain(&mut self, amount: u32) -> bool {
        self.xp += amount;
        if self.xp >= self.max_xp {
            self.level += 1;
            self.xp = 0;
            self.max_xp = (self.max_xp as f32 * 1.5).floor() as u32;
            true
        } else {
            false
        }
    }
}

/// The restaurant's books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub money: i64,
    pub progress: Progression,
    pub fame: f32,
    pub max_fame: f32,
    pub customers_served: u32,
    pub happy_customers: u32,
    /// Simulated seconds since opening.
    pub operating_time: f64,
}

impl Ledger {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            money: config.starting_money,
            progress: Progression::new(config.starting_max_xp),
            fame: 0.0,
            max_fame: config.starting_max_fame,
            customers_served: 0,
            happy_customers: 0,
            operating_time: 0.0,
        }
    }

    pub fn can_afford(&self, amount: i64) -> bool {
        self.money >= amount
    }

    /// Pay `amount`, or leave the balance untouched.
    pub fn spend(&mut self, amount: i64) -> Result<(), InsufficientFunds> {
        if !self.can_afford(amount) {
            return Err(InsufficientFunds {
                needed: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    pub fn earn(&mut self, amount: i64) {
        self.money += amount;
    }

    /// Returns true on a restaurant level-up.
    pub fn add_xp(&mut self, amount: u32) -> bool {
        self.progress.gain(amount)
    }

    /// Book a served customer. Fame only grows while under the cap.
    pub fn record_payment(&mut self, payment: &Payment, fame: f32) {
        self.earn(payment.money);
        self.customers_served += 1;
        self.add_xp(payment.xp);
        if self.fame < self.max_fame {
            self.fame += fame;
            self.happy_customers += 1;
        }
    }

    /// Passive fame growth; raises the cap by `cap_step` once it is reached.
    pub fn accrue(&mut self, dt: f32, fame_per_sec: f32, cap_step: f32) {
        self.operating_time += dt as f64;
        if self.fame < self.max_fame {
            self.fame = (self.fame + fame_per_sec * dt).min(self.max_fame);
        }
        if self.fame >= self.max_fame {
            self.max_fame += cap_step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonuses_from_decor() {
        let b = Bonuses::from_decor([DecorKind::Plant, DecorKind::Plant, DecorKind::Rug]);
        assert!((b.xp_multiplier - 1.2).abs() < 1e-6);
        assert!((b.tip_chance - 0.1).abs() < 1e-9);
        assert_eq!(b.patience_decay, 1.0);
    }

    #[test]
    fn test_patience_decay_floor() {
        let b = Bonuses::from_decor(std::iter::repeat(DecorKind::Lamp).take(20));
        assert_eq!(b.patience_decay, MIN_PATIENCE_DECAY);
        let one = Bonuses::from_decor([DecorKind::Lamp]);
        assert!((one.patience_decay - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_payment() {
        let bonuses = Bonuses::default();
        let p = compute_payment(25.0, false, false, &bonuses);
        assert_eq!(p, Payment { money: 22, tip: 2, xp: 12 });

        let big = compute_payment(25.0, false, true, &bonuses);
        assert_eq!(big.tip, 12);
        assert_eq!(big.money, 32);

        let vip = compute_payment(25.0, true, false, &bonuses);
        assert_eq!(vip.money, 66);
        assert_eq!(vip.xp, 36);
    }

    #[test]
    fn test_fame_gain_range() {
        assert_eq!(fame_gain(0.0, 30.0), 1.0);
        assert_eq!(fame_gain(30.0, 30.0), 6.0);
        assert_eq!(fame_gain(15.0, 30.0), 3.0);
    }

    #[test]
    fn test_spawn_interval() {
        assert_eq!(spawn_interval(0.0), 8.0);
        assert_eq!(spawn_interval(50.0), 5.0);
        assert_eq!(spawn_interval(100.0), 2.0);
        assert_eq!(spawn_interval(500.0), 2.0);
    }

    #[test]
    fn test_progression() {
        let mut p = Progression::new(100);
        assert!(!p.gain(99));
        assert!(p.gain(5));
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
        assert_eq!(p.max_xp, 150);
    }

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut ledger = Ledger::new(&SimConfig::default());
        assert!(ledger.spend(150).is_err());
        assert_eq!(ledger.money, 100);
        assert!(ledger.spend(100).is_ok());
        assert_eq!(ledger.money, 0);
    }

    #[test]
    fn test_fame_cap_grows() {
        let mut ledger = Ledger::new(&SimConfig::default());
        ledger.fame = 99.99;
        ledger.accrue(10.0, 0.5 / 60.0, 50.0);
        assert_eq!(ledger.fame, 100.0);
        assert_eq!(ledger.max_fame, 150.0);
    }

    #[test]
    fn test_refunds() {
        assert_eq!(furniture_refund(FurnitureKind::Stove), 50);
        assert_eq!(furniture_refund(FurnitureKind::DrinkMachine), 0);
        assert_eq!(furniture_refund(FurnitureKind::Decor(DecorKind::Plant)), 0);
        assert!(furniture_cost(FurnitureKind::Table) > furniture_refund(FurnitureKind::Table));
    }
}
