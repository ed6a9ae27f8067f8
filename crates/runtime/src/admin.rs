//! Validation for the administrative surface.
//!
//! The admin commands accept raw numbers from operators; everything is checked
//! here before the director sees it.

use raid_content::BossDefinition;
use raid_core::{SessionMode, Ticks};

use crate::api::{Result, RuntimeError};
use crate::collaborators::Location;

pub const MIN_MULTIPLIER: u32 = 1;
pub const MAX_MULTIPLIER: u32 = 100;
pub const MIN_DURATION_SECONDS: u32 = 60;
pub const MAX_DURATION_SECONDS: u32 = 3600;

/// An operator's request to start a raid.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    pub mode: SessionMode,
    pub boss: BossDefinition,
    pub location: Location,
    /// Simple mode only; falls back to the configured default.
    pub multiplier: Option<u32>,
    /// Falls back to the configured duration.
    pub duration_seconds: Option<u32>,
}

impl StartRequest {
    /// Simple-mode raid, the mode the `start` command uses.
    pub fn coop(boss: BossDefinition, location: Location) -> Self {
        Self {
            mode: SessionMode::Simple,
            boss,
            location,
            multiplier: None,
            duration_seconds: None,
        }
    }

    pub fn scripted(boss: BossDefinition, location: Location) -> Self {
        Self {
            mode: SessionMode::Scripted,
            ..Self::coop(boss, location)
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(multiplier) = self.multiplier
            && !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&multiplier)
        {
            return Err(RuntimeError::InvalidMultiplier(multiplier));
        }
        if let Some(seconds) = self.duration_seconds
            && !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&seconds)
        {
            return Err(RuntimeError::InvalidDuration(seconds));
        }
        Ok(())
    }

    pub fn duration(&self) -> Option<Ticks> {
        self.duration_seconds.map(Ticks::from_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StartRequest {
        StartRequest::coop(
            BossDefinition::new("eevee", 50),
            Location::new("overworld", 0.0, 64.0, 0.0),
        )
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(request().validate().is_ok());
        assert_eq!(request().duration(), None);
    }

    #[test]
    fn multiplier_bounds_are_inclusive() {
        assert!(request().with_multiplier(1).validate().is_ok());
        assert!(request().with_multiplier(100).validate().is_ok());
        assert!(matches!(
            request().with_multiplier(0).validate(),
            Err(RuntimeError::InvalidMultiplier(0))
        ));
        assert!(matches!(
            request().with_multiplier(101).validate(),
            Err(RuntimeError::InvalidMultiplier(101))
        ));
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(request().with_duration_seconds(60).validate().is_ok());
        assert!(request().with_duration_seconds(3600).validate().is_ok());
        assert!(matches!(
            request().with_duration_seconds(59).validate(),
            Err(RuntimeError::InvalidDuration(59))
        ));
        assert_eq!(
            request().with_duration_seconds(90).duration(),
            Some(Ticks(1800))
        );
    }
}
