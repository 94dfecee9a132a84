use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Risk tiers. Which subset is in play depends on the active
/// [`RiskCutPoints`](super::RiskCutPoints); the four-tier set uses
/// Low/Medium/High/Critical and the three-tier set Stable/Moderate/Critical.
/// Severity order only exists within a cut-point set, see
/// [`RiskCutPoints::categories`](super::RiskCutPoints::categories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Stable,
    Low,
    Moderate,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Some(Self::Stable),
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// The three normalized sub-indices feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubIndex {
    Ehi,
    Dsi,
    Bci,
}

impl SubIndex {
    pub const fn ordered() -> [Self; 3] {
        [Self::Ehi, Self::Dsi, Self::Bci]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ehi => "Enrolment Health Index",
            Self::Dsi => "Demographic Stability Index",
            Self::Bci => "Biometric Compliance Index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    LowChildCompliance,
    InfraStress,
    CatchupSpike,
    FutureSurge,
}

impl FlagKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::LowChildCompliance,
            Self::InfraStress,
            Self::CatchupSpike,
            Self::FutureSurge,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LowChildCompliance => "Low Child Compliance",
            Self::InfraStress => "Infrastructure Stress",
            Self::CatchupSpike => "Catch-up Spike",
            Self::FutureSurge => "Future Surge Risk",
        }
    }
}

/// One row of the source extract: identity plus raw administrative counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDistrict {
    pub district_id: String,
    pub district_name: String,
    pub state: String,
    pub population: u64,
    pub total_enrolments: u64,
    pub pending_biometric_updates: u64,
    pub demographic_updates: Option<u64>,
    /// Pre-computed source scores carried by dashboard extracts. When present
    /// they replace the counter-derived rate for the matching sub-index.
    pub enrolment_saturation_index: Option<f64>,
    pub demographic_friction_score: Option<f64>,
    pub biometric_stress_index: Option<f64>,
    pub last_updated: Option<NaiveDate>,
}

impl RawDistrict {
    pub fn new(
        district_id: impl Into<String>,
        district_name: impl Into<String>,
        state: impl Into<String>,
        population: u64,
        total_enrolments: u64,
        pending_biometric_updates: u64,
    ) -> Self {
        Self {
            district_id: district_id.into(),
            district_name: district_name.into(),
            state: state.into(),
            population,
            total_enrolments,
            pending_biometric_updates,
            demographic_updates: None,
            enrolment_saturation_index: None,
            demographic_friction_score: None,
            biometric_stress_index: None,
            last_updated: None,
        }
    }

    pub fn with_demographic_updates(mut self, updates: u64) -> Self {
        self.demographic_updates = Some(updates);
        self
    }

    pub fn with_source_score(mut self, index: SubIndex, score: f64) -> Self {
        match index {
            SubIndex::Ehi => self.enrolment_saturation_index = Some(score),
            SubIndex::Dsi => self.demographic_friction_score = Some(score),
            SubIndex::Bci => self.biometric_stress_index = Some(score),
        }
        self
    }

    /// Raw (pre-normalization) metric for a sub-index.
    pub fn raw_metric(&self, index: SubIndex) -> Option<f64> {
        let source_score = match index {
            SubIndex::Ehi => self.enrolment_saturation_index,
            SubIndex::Dsi => self.demographic_friction_score,
            SubIndex::Bci => self.biometric_stress_index,
        };

        source_score.filter(|value| value.is_finite()).or_else(|| {
            let numerator = match index {
                SubIndex::Ehi => Some(self.total_enrolments),
                SubIndex::Dsi => self.demographic_updates,
                SubIndex::Bci => Some(self.pending_biometric_updates),
            };
            numerator.and_then(|count| self.per_capita(count))
        })
    }

    pub fn biometric_backlog_ratio(&self) -> Option<f64> {
        self.per_capita(self.pending_biometric_updates)
    }

    fn per_capita(&self, count: u64) -> Option<f64> {
        if self.population == 0 {
            None
        } else {
            Some(count as f64 / self.population as f64)
        }
    }
}

/// The four early-warning flags of a scored district.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictFlags {
    pub low_child_compliance: bool,
    pub infra_stress: bool,
    pub catchup_spike: bool,
    pub future_surge: bool,
}

impl DistrictFlags {
    pub fn is_set(&self, kind: FlagKind) -> bool {
        match kind {
            FlagKind::LowChildCompliance => self.low_child_compliance,
            FlagKind::InfraStress => self.infra_stress,
            FlagKind::CatchupSpike => self.catchup_spike,
            FlagKind::FutureSurge => self.future_surge,
        }
    }

    pub fn count(&self) -> u8 {
        FlagKind::ordered()
            .into_iter()
            .filter(|kind| self.is_set(*kind))
            .count() as u8
    }

    pub fn raised(&self) -> Vec<FlagKind> {
        FlagKind::ordered()
            .into_iter()
            .filter(|kind| self.is_set(*kind))
            .collect()
    }
}

/// A fully scored district. Every derived field is recomputed together on
/// refresh; `flags_count` is derived from `flags` and has no storage of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRecord {
    pub district_id: String,
    pub district_name: String,
    pub state: String,
    pub population: u64,
    pub total_enrolments: u64,
    pub pending_biometric_updates: u64,
    pub ehi: f64,
    pub dsi: f64,
    pub bci: f64,
    pub alhs: f64,
    pub flags: DistrictFlags,
    pub risk_category: RiskCategory,
    pub last_updated: Option<NaiveDate>,
}

impl DistrictRecord {
    pub fn flags_count(&self) -> u8 {
        self.flags.count()
    }

    pub fn sub_index(&self, index: SubIndex) -> f64 {
        match index {
            SubIndex::Ehi => self.ehi,
            SubIndex::Dsi => self.dsi,
            SubIndex::Bci => self.bci,
        }
    }

    pub fn to_view(&self) -> DistrictView {
        DistrictView {
            district_id: self.district_id.clone(),
            district_name: self.district_name.clone(),
            state: self.state.clone(),
            population: self.population,
            total_enrolments: self.total_enrolments,
            pending_biometric_updates: self.pending_biometric_updates,
            ehi: self.ehi,
            dsi: self.dsi,
            bci: self.bci,
            alhs: self.alhs,
            low_child_compliance: self.flags.low_child_compliance,
            infra_stress: self.flags.infra_stress,
            catchup_spike: self.flags.catchup_spike,
            future_surge: self.flags.future_surge,
            flags_count: self.flags_count(),
            risk_category: self.risk_category,
            last_updated: self.last_updated,
        }
    }
}

/// Flat, serializable shape of a scored district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictView {
    pub district_id: String,
    pub district_name: String,
    pub state: String,
    pub population: u64,
    pub total_enrolments: u64,
    pub pending_biometric_updates: u64,
    pub ehi: f64,
    pub dsi: f64,
    pub bci: f64,
    pub alhs: f64,
    pub low_child_compliance: bool,
    pub infra_stress: bool,
    pub catchup_spike: bool,
    pub future_surge: bool,
    pub flags_count: u8,
    pub risk_category: RiskCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}
