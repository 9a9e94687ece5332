use serde::{Deserialize, Serialize};

use super::Modality;

/// canonical tags
const MODALITY_TABLE: &[(&str, Modality)] = &[
    ("MONTHLY", Modality::Monthly),
    ("DAILY_FREE", Modality::DailyFree),
    ("DAILY_FIXED_TERM", Modality::DailyFixedTerm),
    ("LEGACY", Modality::Legacy),
];

/// retired tags and the modality that reproduces their behavior
///
/// Changing a row changes the debt of every un-migrated record carrying that tag.
const LEGACY_ALIASES: &[(&str, Modality)] = &[
    ("DAILY", Modality::Legacy),
    ("DAILY_30", Modality::Legacy),
    ("DAILY_60", Modality::Legacy),
    ("DAILY_90", Modality::Legacy),
    ("WEEKLY", Modality::Legacy),
    ("BIWEEKLY", Modality::Legacy),
    ("DAILY_FIXED", Modality::DailyFixedTerm),
    ("FIXED_TERM", Modality::DailyFixedTerm),
    ("DAILY_FREE_INTEREST", Modality::DailyFree),
    ("FREE_DAILY", Modality::DailyFree),
    ("MENSAL", Modality::Monthly),
    ("MONTHLY_SIMPLE", Modality::Monthly),
];

/// modality used when a tag is unknown
pub const FALLBACK_MODALITY: Modality = Modality::Monthly;

/// how a stored tag was turned into a modality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModalityResolution {
    /// tag matched a canonical tag as stored
    Exact { modality: Modality },
    /// tag matched after normalization or through the legacy alias table
    Alias { tag: String, modality: Modality },
    /// tag unknown, fallback applied; callers should surface this as a warning
    Fallback { tag: String, modality: Modality },
}

impl ModalityResolution {
    pub fn modality(&self) -> Modality {
        match self {
            ModalityResolution::Exact { modality }
            | ModalityResolution::Alias { modality, .. }
            | ModalityResolution::Fallback { modality, .. } => *modality,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ModalityResolution::Fallback { .. })
    }
}

/// tag lookup: exact match, then legacy aliases, then the monthly fallback
#[derive(Debug, Clone, Copy)]
pub struct ModalityRegistry {
    modalities: &'static [(&'static str, Modality)],
    aliases: &'static [(&'static str, Modality)],
    fallback: Modality,
}

impl Default for ModalityRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ModalityRegistry {
    pub const fn standard() -> Self {
        Self {
            modalities: MODALITY_TABLE,
            aliases: LEGACY_ALIASES,
            fallback: FALLBACK_MODALITY,
        }
    }

    /// resolve a stored tag; never fails
    pub fn resolve(&self, tag: &str) -> ModalityResolution {
        if let Some(modality) = lookup(self.modalities, tag) {
            return ModalityResolution::Exact { modality };
        }

        let normalized = normalize(tag);
        if let Some(modality) =
            lookup(self.modalities, &normalized).or_else(|| lookup(self.aliases, &normalized))
        {
            return ModalityResolution::Alias {
                tag: tag.to_string(),
                modality,
            };
        }

        log::warn!(
            "unknown billing modality {:?}, falling back to {}",
            tag,
            self.fallback
        );
        ModalityResolution::Fallback {
            tag: tag.to_string(),
            modality: self.fallback,
        }
    }

    pub fn get(&self, tag: &str) -> Modality {
        self.resolve(tag).modality()
    }

    /// the alias table, for audit
    pub fn aliases(&self) -> &'static [(&'static str, Modality)] {
        self.aliases
    }
}

fn lookup(table: &[(&str, Modality)], tag: &str) -> Option<Modality> {
    table
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, modality)| *modality)
}

fn normalize(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
