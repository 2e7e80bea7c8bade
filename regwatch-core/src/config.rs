//! Tunables for expiration and status derivation.

use serde::{Deserialize, Serialize};

/// Days before expiration at which a registration counts as expiring soon.
pub const DEFAULT_EXPIRING_SOON_DAYS: u32 = 30;
/// Length of the first registration cycle of a newly issued plate.
pub const DEFAULT_NEW_PLATE_TERM_YEARS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Engine configuration, usually read from the `[engine]` table of a config file.
pub struct EngineConfig {
    /// Registrations expiring within this many days are flagged as expiring soon.
    pub expiring_soon_threshold_days: u32,
    /// Years a newly issued plate stays valid before joining the digit schedule.
    pub new_plate_initial_term_years: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expiring_soon_threshold_days: DEFAULT_EXPIRING_SOON_DAYS,
            new_plate_initial_term_years: DEFAULT_NEW_PLATE_TERM_YEARS,
        }
    }
}
