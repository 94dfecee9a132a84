//! Seeded synthetic district extracts for demos and load testing.
//!
//! All randomness in the crate lives here. The same seed and district count
//! always produce the same rows.

use crate::scoring::RawDistrict;
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_DISTRICTS: usize = 150;

const STATES: [&str; 20] = [
    "Uttar Pradesh",
    "Maharashtra",
    "Bihar",
    "West Bengal",
    "Madhya Pradesh",
    "Tamil Nadu",
    "Rajasthan",
    "Karnataka",
    "Gujarat",
    "Andhra Pradesh",
    "Odisha",
    "Telangana",
    "Kerala",
    "Jharkhand",
    "Assam",
    "Punjab",
    "Chhattisgarh",
    "Haryana",
    "Delhi",
    "Jammu and Kashmir",
];

#[derive(Debug, Clone)]
pub struct SyntheticExtract {
    districts: usize,
    seed: u64,
    reference_date: Option<NaiveDate>,
}

impl Default for SyntheticExtract {
    fn default() -> Self {
        Self::new(DEFAULT_DISTRICTS, DEFAULT_SEED)
    }
}

impl SyntheticExtract {
    pub fn new(districts: usize, seed: u64) -> Self {
        Self {
            districts,
            seed,
            reference_date: None,
        }
    }

    /// Stamp every row with `date` instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn generate(&self) -> Vec<RawDistrict> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let last_updated = self
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive());

        (0..self.districts)
            .map(|position| {
                // Shared strain drives all three counters so they move together.
                let strain = rng.random::<f64>() * rng.random::<f64>();

                let population = log_normal(&mut rng, 12.5, 0.8).round().max(1_000.0);
                let enrolment_rate =
                    (0.98 - strain * 0.35 + rng.random_range(-0.04..0.04)).clamp(0.40, 1.0);
                let demographic_rate =
                    (0.02 + strain * 0.07 + rng.random_range(0.0..0.02)).clamp(0.0, 0.25);
                let backlog_rate =
                    (0.005 + strain * 0.08 + rng.random_range(-0.005..0.01)).clamp(0.0, 0.20);

                let state = STATES.choose(&mut rng).copied().unwrap_or(STATES[0]);
                let mut row = RawDistrict::new(
                    format!("DIS_{position:04}"),
                    format!("District_{}{position:03}", letter(position)),
                    state,
                    population as u64,
                    (population * enrolment_rate).round() as u64,
                    (population * backlog_rate).round() as u64,
                )
                .with_demographic_updates((population * demographic_rate).round() as u64);
                row.last_updated = Some(last_updated);
                row
            })
            .collect()
    }
}

fn letter(position: usize) -> char {
    char::from(b'A' + (position % 26) as u8)
}

/// Box-Muller draw mapped through `exp`.
fn log_normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random();
    let standard = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    (mean + std_dev * standard).exp()
}
