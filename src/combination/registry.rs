//! Named band combinations
//!
//! Each combination maps to an ordered (red, green, blue) band triple.
//! Only some combinations have a mapping yet; the rest are recognised
//! names that cannot be rendered.

use std::fmt;
use std::str::FromStr;

use crate::errors::{BandKitError, BandKitResult};

use super::band::Band;

/// A named recipe for an RGB composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandCombination {
    GeneralLandCover,
    Water,
    ExposedSoil,
    Vegetation,
    RoofingAndRoads,
    ArtificialFeaturesInDesert,
    ArtificialFeaturesInVegetation,
    UnderwaterObstruction,
    DirectionOfTravel,
    PolymersPlastics,
    SeeingFireThroughSmoke,
    Fires,
    FiresAndCharredVegetation,
    Minerals,
    SoilMoisture,
    StandingWater,
    Metal,
}

/// (combination, name, red/green/blue bands)
const REGISTRY: [(BandCombination, &str, Option<[Band; 3]>); 17] = [
    (BandCombination::GeneralLandCover, "GENERAL_LAND_COVER",
     Some([Band::NearInfrared2, Band::Yellow, Band::RedEdge])),
    (BandCombination::Water, "WATER",
     Some([Band::NearInfrared2, Band::NearInfrared1, Band::RedEdge])),
    (BandCombination::ExposedSoil, "EXPOSED_SOIL",
     Some([Band::Red, Band::NearInfrared2, Band::Yellow])),
    (BandCombination::Vegetation, "VEGETATION", None),
    (BandCombination::RoofingAndRoads, "ROOFING_AND_ROADS",
     Some([Band::Red, Band::NearInfrared1, Band::NearInfrared2])),
    (BandCombination::ArtificialFeaturesInDesert, "ARTIFICIAL_FEATURES_IN_DESERT",
     Some([Band::Yellow, Band::Coastal, Band::NearInfrared1])),
    (BandCombination::ArtificialFeaturesInVegetation, "ARTIFICIAL_FEATURES_IN_VEGETATION", None),
    (BandCombination::UnderwaterObstruction, "UNDERWATER_OBSTRUCTION", None),
    (BandCombination::DirectionOfTravel, "DIRECTION_OF_TRAVEL", None),
    (BandCombination::PolymersPlastics, "POLYMERS_PLASTICS", None),
    (BandCombination::SeeingFireThroughSmoke, "SEEING_FIRE_THROUGH_SMOKE", None),
    (BandCombination::Fires, "FIRES", None),
    (BandCombination::FiresAndCharredVegetation, "FIRES_AND_CHARRED_VEGETATION", None),
    (BandCombination::Minerals, "MINERALS", None),
    (BandCombination::SoilMoisture, "SOIL_MOISTURE", None),
    (BandCombination::StandingWater, "STANDING_WATER", None),
    (BandCombination::Metal, "METAL", None),
];

impl BandCombination {
    /// Every combination in declaration order
    pub const ALL: [BandCombination; 17] = [
        BandCombination::GeneralLandCover,
        BandCombination::Water,
        BandCombination::ExposedSoil,
        BandCombination::Vegetation,
        BandCombination::RoofingAndRoads,
        BandCombination::ArtificialFeaturesInDesert,
        BandCombination::ArtificialFeaturesInVegetation,
        BandCombination::UnderwaterObstruction,
        BandCombination::DirectionOfTravel,
        BandCombination::PolymersPlastics,
        BandCombination::SeeingFireThroughSmoke,
        BandCombination::Fires,
        BandCombination::FiresAndCharredVegetation,
        BandCombination::Minerals,
        BandCombination::SoilMoisture,
        BandCombination::StandingWater,
        BandCombination::Metal,
    ];

    fn entry(self) -> &'static (BandCombination, &'static str, Option<[Band; 3]>) {
        &REGISTRY[self as usize]
    }

    /// Upper-snake identifier, e.g. `GENERAL_LAND_COVER`
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Lower-snake identifier used in output file names
    pub fn slug(self) -> String {
        self.name().to_lowercase()
    }

    /// The (red, green, blue) bands, if this combination has a mapping
    pub fn bands(self) -> Option<[Band; 3]> {
        self.entry().2
    }

    /// The (red, green, blue) bands, or `UnsupportedCombination`
    pub fn required_bands(self) -> BandKitResult<[Band; 3]> {
        self.bands()
            .ok_or_else(|| BandKitError::UnsupportedCombination(self.name().to_string()))
    }

    /// Whether a band triple is defined
    pub fn is_registered(self) -> bool {
        self.bands().is_some()
    }
}

impl FromStr for BandCombination {
    type Err = BandKitError;

    /// Case-insensitive; `-` and spaces are read as `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        REGISTRY.iter()
            .find(|(_, name, _)| *name == normalized)
            .map(|(combination, _, _)| *combination)
            .ok_or_else(|| BandKitError::InvalidArgument(format!("Unknown band combination: {}", s)))
    }
}

impl fmt::Display for BandCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rows_line_up_with_variants() {
        for (i, combination) in BandCombination::ALL.iter().enumerate() {
            assert_eq!(REGISTRY[i].0, *combination);
            assert_eq!(*combination as usize, i);
        }
    }

    #[test]
    fn registered_triples() {
        use Band::*;
        assert_eq!(BandCombination::GeneralLandCover.bands(), Some([NearInfrared2, Yellow, RedEdge]));
        assert_eq!(BandCombination::Water.bands(), Some([NearInfrared2, NearInfrared1, RedEdge]));
        assert_eq!(BandCombination::ExposedSoil.bands(), Some([Red, NearInfrared2, Yellow]));
        assert_eq!(BandCombination::RoofingAndRoads.bands(), Some([Red, NearInfrared1, NearInfrared2]));
        assert_eq!(BandCombination::ArtificialFeaturesInDesert.bands(), Some([Yellow, Coastal, NearInfrared1]));
    }

    #[test]
    fn listed_in_declaration_order() {
        let names: Vec<_> = BandCombination::ALL.iter().take(6).map(|c| c.name()).collect();
        assert_eq!(names, ["GENERAL_LAND_COVER", "WATER", "EXPOSED_SOIL", "VEGETATION",
                           "ROOFING_AND_ROADS", "ARTIFICIAL_FEATURES_IN_DESERT"]);
        assert_eq!(BandCombination::ALL[16], BandCombination::Metal);
    }

    #[test]
    fn lookups_are_stable() {
        for combination in BandCombination::ALL {
            assert_eq!(combination.bands(), combination.bands());
        }
    }

    #[test]
    fn twelve_names_have_no_mapping() {
        let unregistered: Vec<_> = BandCombination::ALL.iter()
            .filter(|c| !c.is_registered())
            .collect();
        assert_eq!(unregistered.len(), 12);
        assert!(matches!(BandCombination::Metal.required_bands(),
                         Err(BandKitError::UnsupportedCombination(name)) if name == "METAL"));
    }

    #[test]
    fn parses_loosely() {
        assert_eq!("water".parse::<BandCombination>().unwrap(), BandCombination::Water);
        assert_eq!("roofing-and-roads".parse::<BandCombination>().unwrap(), BandCombination::RoofingAndRoads);
        assert!("SUNSET".parse::<BandCombination>().is_err());
    }

    #[test]
    fn slug_is_lowercase_name() {
        assert_eq!(BandCombination::GeneralLandCover.slug(), "general_land_cover");
    }
}
