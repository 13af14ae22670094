//! Disruption severity and the removal-count rule derived from it.

use std::fmt;

use crate::{Result, error::KairoError};

/// Fraction of a scenario's candidate pool to disrupt, in `[0, 1]`.
///
/// # Examples
/// ```
/// use kairo_core::Severity;
///
/// let severity = Severity::new(0.3)?;
/// assert_eq!(severity.get(), 0.3);
/// assert!(Severity::new(1.5).is_err());
/// # Ok::<(), kairo_core::KairoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Severity(f64);

impl Severity {
    /// The whole pool.
    pub const FULL: Self = Self(1.0);

    /// Validates a severity fraction.
    ///
    /// # Errors
    /// Returns [`KairoError::InvalidSeverity`] when `value` is non-finite or
    /// outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(KairoError::InvalidSeverity { got: value })
        }
    }

    /// Returns the fraction.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> f64 { self.0 }

    /// Number of pool members to remove under `floor`.
    ///
    /// An empty pool always yields zero.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{RemovalFloor, Severity};
    ///
    /// let severity = Severity::new(0.25)?;
    /// assert_eq!(severity.removal_count(10, RemovalFloor::AtLeastOne), 2);
    /// assert_eq!(Severity::new(0.0)?.removal_count(10, RemovalFloor::AtLeastOne), 1);
    /// assert_eq!(Severity::new(0.0)?.removal_count(10, RemovalFloor::Exact), 0);
    /// assert_eq!(severity.removal_count(0, RemovalFloor::AtLeastOne), 0);
    /// # Ok::<(), kairo_core::KairoError>(())
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "severity is within [0, 1] so the product is within [0, pool]"
    )]
    pub fn removal_count(self, pool: usize, floor: RemovalFloor) -> usize {
        if pool == 0 {
            return 0;
        }
        let scaled = ((pool as f64) * self.0).floor() as usize;
        let count = match floor {
            RemovalFloor::AtLeastOne => scaled.max(1),
            RemovalFloor::Exact => scaled,
        };
        count.min(pool)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Severity {
    type Error = KairoError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

/// Minimum-removal policy for fraction-based scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalFloor {
    /// Remove at least one pool member whenever the pool is non-empty.
    #[default]
    AtLeastOne,
    /// Remove exactly `floor(pool × severity)` members.
    Exact,
}
