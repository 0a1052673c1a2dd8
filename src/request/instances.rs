//! Instance-count defaulting for the `NumberInstances` triple.

use std::collections::BTreeMap;

use crate::error::RequestError;

const DEFAULT_MIN: u32 = 1;
const DEFAULT_SCALE: u32 = 2;

/// Resolved `Min`/`Max`/`Desired` instance counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceCounts {
    /// Minimum number of instances.
    pub min: u32,
    /// Maximum number of instances.
    pub max: u32,
    /// Number of instances to start with.
    pub desired: u32,
}

impl InstanceCounts {
    /// Complete a partially supplied triple.
    ///
    /// Exactly one rule applies, chosen by which counts were supplied:
    ///
    /// 1. `desired` given: `min` defaults to 1, `max` to `desired`.
    /// 2. `min` given without `desired`: `desired` becomes `max(2, min)`
    ///    and `max` defaults to the same value.
    /// 3. only `max` given: `min` is 1 and `desired` is `min(2, max)`.
    /// 4. nothing given: `{min: 1, max: 2, desired: 2}`.
    ///
    /// Presence is decided by `Option`, so an explicit `0` counts as
    /// supplied. A `max` of zero, or any triple that breaks
    /// `min <= desired <= max` after defaulting, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] for the `NumberInstances`
    /// field when the resolved counts are inconsistent.
    pub fn resolve(
        min: Option<u32>,
        max: Option<u32>,
        desired: Option<u32>,
    ) -> Result<Self, RequestError> {
        let counts = match (desired, min, max) {
            (Some(desired_count), min_count, max_count) => Self {
                min: min_count.unwrap_or(DEFAULT_MIN),
                max: max_count.unwrap_or(desired_count),
                desired: desired_count,
            },
            (None, Some(min_count), max_count) => {
                let scaled = min_count.max(DEFAULT_SCALE);
                Self {
                    min: min_count,
                    max: max_count.unwrap_or(scaled),
                    desired: scaled,
                }
            }
            (None, None, Some(max_count)) => Self {
                min: DEFAULT_MIN,
                max: max_count,
                desired: max_count.min(DEFAULT_SCALE),
            },
            (None, None, None) => Self {
                min: DEFAULT_MIN,
                max: DEFAULT_SCALE,
                desired: DEFAULT_SCALE,
            },
        };
        counts.validate()?;
        Ok(counts)
    }

    fn validate(self) -> Result<(), RequestError> {
        if self.max == 0 {
            return Err(invalid("a group needs a maximum of at least one instance"));
        }
        if self.min > self.desired || self.desired > self.max {
            return Err(invalid(&format!(
                "expected Min <= Desired <= Max, got Min={}, Desired={}, Max={}",
                self.min, self.desired, self.max
            )));
        }
        Ok(())
    }

    /// Render the triple as the string-valued wire map.
    #[must_use]
    pub fn to_wire_map(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (String::from("Desired"), self.desired.to_string()),
            (String::from("Max"), self.max.to_string()),
            (String::from("Min"), self.min.to_string()),
        ])
    }
}

fn invalid(reason: &str) -> RequestError {
    RequestError::InvalidArgument {
        field: String::from("NumberInstances"),
        reason: reason.to_owned(),
    }
}
