//! Garage upgrades as multiplicative physics modifiers.
//!
//! The economy side owns purchasing; the simulation only reads a copied
//! [`Upgrades`] value per rider.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineTier {
    pub speed_mult: f64,
    pub accel_mult: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingTier {
    pub heat_mult: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurboTier {
    pub turbo_mult: f64,
}

pub const ENGINE_TIERS: [EngineTier; 3] = [
    EngineTier {
        speed_mult: 1.0,
        accel_mult: 1.0,
    },
    EngineTier {
        speed_mult: 1.15,
        accel_mult: 1.1,
    },
    EngineTier {
        speed_mult: 1.3,
        accel_mult: 1.25,
    },
];

pub const COOLING_TIERS: [CoolingTier; 3] = [
    CoolingTier { heat_mult: 1.0 },
    CoolingTier { heat_mult: 0.75 },
    CoolingTier { heat_mult: 0.5 },
];

pub const TURBO_TIERS: [TurboTier; 3] = [
    TurboTier { turbo_mult: 1.0 },
    TurboTier { turbo_mult: 1.2 },
    TurboTier { turbo_mult: 1.45 },
];

/// Default bike body color (#e53935)
pub const STOCK_COLOR: [u8; 3] = [0xe5, 0x39, 0x35];

/// Tier indices plus cosmetic color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upgrades {
    pub engine: u8,
    pub cooling: u8,
    pub turbo: u8,
    pub color: [u8; 3],
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            engine: 0,
            cooling: 0,
            turbo: 0,
            color: STOCK_COLOR,
        }
    }
}

impl Upgrades {
    pub fn engine_tier(&self) -> EngineTier {
        ENGINE_TIERS
            .get(self.engine as usize)
            .copied()
            .unwrap_or(ENGINE_TIERS[0])
    }

    pub fn cooling_tier(&self) -> CoolingTier {
        COOLING_TIERS
            .get(self.cooling as usize)
            .copied()
            .unwrap_or(COOLING_TIERS[0])
    }

    pub fn turbo_tier(&self) -> TurboTier {
        TURBO_TIERS
            .get(self.turbo as usize)
            .copied()
            .unwrap_or(TURBO_TIERS[0])
    }
}
