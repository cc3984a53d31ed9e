//! Run parameters
//!
//! Product catalog, service-time table and rework settings for one run.
//! Everything here is immutable once a run starts.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::error::ConfigError;

/// Index of a product type in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductType(pub usize);

/// Product types and the ordered stages every type goes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub types: Vec<String>,
    pub stages: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            types: vec![
                "Bluetooth Headphones".to_string(),
                "Tablet".to_string(),
                "Printer".to_string(),
            ],
            stages: vec![
                "Picking".to_string(),
                "Quality Check".to_string(),
                "Packing".to_string(),
                "Labeling".to_string(),
                "Sorting".to_string(),
            ],
        }
    }
}

impl Catalog {
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn type_name(&self, ty: ProductType) -> &str {
        self.types.get(ty.0).map(String::as_str).unwrap_or("?")
    }

    pub fn stage_name(&self, stage: usize) -> &str {
        self.stages.get(stage).map(String::as_str).unwrap_or("?")
    }

    pub fn product_types(&self) -> impl Iterator<Item = ProductType> + '_ {
        (0..self.types.len()).map(ProductType)
    }
}

/// Closed integer range `[min, max]`, sampled uniformly.
///
/// Used both for item counts and for durations in whole simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: u64,
    pub max: u64,
}

impl UniformRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn fixed(v: u64) -> Self {
        Self { min: v, max: v }
    }

    pub fn validate(&self, what: impl Into<String>) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                what: what.into(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Degenerate ranges do not consume randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn sample_secs<R: Rng + ?Sized>(&self, rng: &mut R) -> SimTime {
        SimTime::from_secs(self.sample(rng))
    }
}

/// When items enter their stage-0 queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrivalPolicy {
    /// Every item is ready at time zero.
    #[default]
    Batch,
    /// The k-th item of each type arrives at `k × every_secs`.
    Interval { every_secs: u64 },
}

impl ArrivalPolicy {
    pub fn arrival(&self, seq: u64) -> SimTime {
        match *self {
            ArrivalPolicy::Batch => SimTime::ZERO,
            ArrivalPolicy::Interval { every_secs } => {
                SimTime::from_secs(seq.saturating_mul(every_secs))
            }
        }
    }
}

/// Which time counts as an item's entry into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    /// Start of service at stage 0; queueing before stage 0 is not lead time.
    #[default]
    FirstService,
    /// Arrival time assigned at seeding.
    Seeded,
}

/// Immutable parameters of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    #[serde(default)]
    pub catalog: Catalog,
    /// Items seeded per product type.
    pub items_per_type: UniformRange,
    /// Base service time in seconds, indexed `[type][stage]`.
    pub service_secs: Vec<Vec<UniformRange>>,
    pub rework_probability: f64,
    /// Extra seconds added to a stage visit that needs rework.
    pub rework_extra_secs: UniformRange,
    /// Wall-clock sleep per simulated second; 0 disables pacing.
    #[serde(default)]
    pub time_scale: f64,
    #[serde(default)]
    pub arrival: ArrivalPolicy,
    #[serde(default)]
    pub entry: EntryPolicy,
}

impl RunParameters {
    /// Same service range for every station.
    pub fn uniform(
        catalog: Catalog,
        items_per_type: UniformRange,
        service_secs: UniformRange,
        rework_probability: f64,
        rework_extra_secs: UniformRange,
    ) -> Self {
        let service_secs = vec![vec![service_secs; catalog.stage_count()]; catalog.type_count()];
        Self {
            catalog,
            items_per_type,
            service_secs,
            rework_probability,
            rework_extra_secs,
            time_scale: 0.0,
            arrival: ArrivalPolicy::default(),
            entry: EntryPolicy::default(),
        }
    }

    /// Draws one fixed base time per station from `durations`.
    ///
    /// The same range doubles as the rework extra range.
    pub fn generate<R: Rng + ?Sized>(
        catalog: Catalog,
        items_per_type: UniformRange,
        durations: UniformRange,
        rework_probability: f64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        items_per_type.validate("items per type")?;
        durations.validate("service time")?;
        let service_secs = (0..catalog.type_count())
            .map(|_| {
                (0..catalog.stage_count())
                    .map(|_| UniformRange::fixed(durations.sample(rng)))
                    .collect()
            })
            .collect();
        let params = Self {
            catalog,
            items_per_type,
            service_secs,
            rework_probability,
            rework_extra_secs: durations,
            time_scale: 0.0,
            arrival: ArrivalPolicy::default(),
            entry: EntryPolicy::default(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_arrival(mut self, arrival: ArrivalPolicy) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn with_entry(mut self, entry: EntryPolicy) -> Self {
        self.entry = entry;
        self
    }

    pub fn service(&self, ty: ProductType, stage: usize) -> UniformRange {
        self.service_secs[ty.0][stage]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let types = self.catalog.type_count();
        let stages = self.catalog.stage_count();
        if types == 0 {
            return Err(ConfigError::NoProductTypes);
        }
        if stages == 0 {
            return Err(ConfigError::NoStages);
        }
        self.items_per_type.validate("items per type")?;

        let rows_ok = self.service_secs.len() == types;
        let bad_row = self.service_secs.iter().find(|row| row.len() != stages);
        if !rows_ok || bad_row.is_some() {
            return Err(ConfigError::ServiceShape {
                types: self.service_secs.len(),
                stages: bad_row.or(self.service_secs.first()).map_or(0, Vec::len),
                expected_types: types,
                expected_stages: stages,
            });
        }
        for (t, row) in self.service_secs.iter().enumerate() {
            for (s, range) in row.iter().enumerate() {
                range.validate(format!(
                    "service time for {}/{}",
                    self.catalog.type_name(ProductType(t)),
                    self.catalog.stage_name(s)
                ))?;
            }
        }

        if !(0.0..=1.0).contains(&self.rework_probability) {
            return Err(ConfigError::ReworkProbability(self.rework_probability));
        }
        self.rework_extra_secs.validate("rework extra time")?;
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::TimeScale(self.time_scale));
        }
        Ok(())
    }
}
