//! Closed choice families used by selector parameters.
//!
//! A choice is persisted as an explicit `Family:Member` tag, so decoding is a
//! direct lookup. Member names may overlap as substrings (`Heat` and
//! `CogenerationToppingExtraHeat`) without ambiguity.

use std::fmt;

/// Declares a choice family enum with stable member names and the 1-based
/// numeric codes accepted in user input files.
macro_rules! choice_family {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member of the family, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the member's stable name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Returns the numeric code used by legacy input files.
            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Looks up a member by its exact name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|m| m.name() == name)
            }

            /// Looks up a member by its numeric code.
            pub fn from_code(code: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|m| m.code() == code)
            }
        }
    };
}

choice_family! {
    /// Reservoir heat-extraction model.
    ReservoirModel {
        /// Multiple parallel fractures (Gringarten).
        MultipleParallelFractures = 1,
        /// 1D linear heat sweep.
        LinearHeatSweep = 2,
        /// Single fracture m/A thermal drawdown.
        SingleFracture = 3,
        /// Annual percentage thermal drawdown.
        AnnualPercentage = 4,
        /// User-provided temperature profile.
        UserProvidedProfile = 5,
        /// External TOUGH2 simulator.
        Tough2Simulator = 6,
    }
}

choice_family! {
    /// What the produced heat is used for.
    EndUseOption {
        /// Electricity only.
        Electricity = 1,
        /// Direct-use heat only.
        Heat = 2,
        /// Topping cycle, extra heat.
        CogenerationToppingExtraHeat = 31,
        /// Topping cycle, extra electricity.
        CogenerationToppingExtraElectricity = 32,
        /// Bottoming cycle, extra electricity.
        CogenerationBottomingExtraElectricity = 41,
        /// Bottoming cycle, extra heat.
        CogenerationBottomingExtraHeat = 42,
        /// Parallel cycle, extra heat.
        CogenerationParallelExtraHeat = 51,
        /// Parallel cycle, extra electricity.
        CogenerationParallelExtraElectricity = 52,
    }
}

choice_family! {
    /// Power conversion cycle.
    PowerPlantType {
        /// Subcritical organic Rankine cycle.
        SubcriticalOrc = 1,
        /// Supercritical organic Rankine cycle.
        SupercriticalOrc = 2,
        /// Single-flash steam plant.
        SingleFlash = 3,
        /// Double-flash steam plant.
        DoubleFlash = 4,
    }
}

choice_family! {
    /// Levelized cost model.
    EconomicModel {
        /// Fixed charge rate model.
        FixedChargeRate = 1,
        /// Standard discounted levelized cost.
        StandardLevelizedCost = 2,
        /// BICYCLE levelized cost model.
        Bicycle = 3,
    }
}

impl EndUseOption {
    /// Fraction of the produced heat routed through the power cycle.
    pub fn electric_share(self) -> f64 {
        match self {
            EndUseOption::Electricity => 1.0,
            EndUseOption::Heat => 0.0,
            EndUseOption::CogenerationToppingExtraHeat => 0.7,
            EndUseOption::CogenerationToppingExtraElectricity => 0.85,
            EndUseOption::CogenerationBottomingExtraElectricity => 0.6,
            EndUseOption::CogenerationBottomingExtraHeat => 0.4,
            EndUseOption::CogenerationParallelExtraHeat => 0.3,
            EndUseOption::CogenerationParallelExtraElectricity => 0.5,
        }
    }
}

/// Identifies a choice family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ChoiceFamily {
    /// See [`ReservoirModel`].
    ReservoirModel,
    /// See [`EndUseOption`].
    EndUseOption,
    /// See [`PowerPlantType`].
    PowerPlantType,
    /// See [`EconomicModel`].
    EconomicModel,
}

impl ChoiceFamily {
    /// Returns the family name used as the tag prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceFamily::ReservoirModel => "ReservoirModel",
            ChoiceFamily::EndUseOption => "EndUseOption",
            ChoiceFamily::PowerPlantType => "PowerPlantType",
            ChoiceFamily::EconomicModel => "EconomicModel",
        }
    }
}

impl fmt::Display for ChoiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected member of one choice family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// A reservoir model selection.
    ReservoirModel(ReservoirModel),
    /// An end-use selection.
    EndUseOption(EndUseOption),
    /// A power plant selection.
    PowerPlantType(PowerPlantType),
    /// An economic model selection.
    EconomicModel(EconomicModel),
}

impl Choice {
    /// Returns the family this choice belongs to.
    pub fn family(self) -> ChoiceFamily {
        match self {
            Choice::ReservoirModel(_) => ChoiceFamily::ReservoirModel,
            Choice::EndUseOption(_) => ChoiceFamily::EndUseOption,
            Choice::PowerPlantType(_) => ChoiceFamily::PowerPlantType,
            Choice::EconomicModel(_) => ChoiceFamily::EconomicModel,
        }
    }

    /// Returns the selected member's name.
    pub fn member(self) -> &'static str {
        match self {
            Choice::ReservoirModel(m) => m.name(),
            Choice::EndUseOption(m) => m.name(),
            Choice::PowerPlantType(m) => m.name(),
            Choice::EconomicModel(m) => m.name(),
        }
    }

    /// Returns the persisted `Family:Member` tag.
    pub fn tag(self) -> String {
        format!("{}:{}", self.family(), self.member())
    }

    /// Looks up a member of `family` by exact name.
    pub fn from_member(family: ChoiceFamily, name: &str) -> Option<Self> {
        match family {
            ChoiceFamily::ReservoirModel => ReservoirModel::from_name(name).map(Choice::ReservoirModel),
            ChoiceFamily::EndUseOption => EndUseOption::from_name(name).map(Choice::EndUseOption),
            ChoiceFamily::PowerPlantType => PowerPlantType::from_name(name).map(Choice::PowerPlantType),
            ChoiceFamily::EconomicModel => EconomicModel::from_name(name).map(Choice::EconomicModel),
        }
    }

    /// Looks up a member of `family` by its legacy numeric code.
    pub fn from_code(family: ChoiceFamily, code: u8) -> Option<Self> {
        match family {
            ChoiceFamily::ReservoirModel => ReservoirModel::from_code(code).map(Choice::ReservoirModel),
            ChoiceFamily::EndUseOption => EndUseOption::from_code(code).map(Choice::EndUseOption),
            ChoiceFamily::PowerPlantType => PowerPlantType::from_code(code).map(Choice::PowerPlantType),
            ChoiceFamily::EconomicModel => EconomicModel::from_code(code).map(Choice::EconomicModel),
        }
    }

    /// Decodes a persisted `Family:Member` tag, requiring the family to match.
    pub fn from_tag(family: ChoiceFamily, tag: &str) -> Option<Self> {
        let (prefix, member) = tag.split_once(':')?;
        if prefix != family.as_str() {
            return None;
        }
        Self::from_member(family, member)
    }

    /// Parses user-supplied text: a full tag, a member name, or a numeric code.
    pub fn parse(family: ChoiceFamily, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.contains(':') {
            return Self::from_tag(family, text);
        }
        if let Ok(code) = text.parse::<u8>() {
            return Self::from_code(family, code);
        }
        Self::from_member(family, text)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family(), self.member())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_format() {
        let c = Choice::ReservoirModel(ReservoirModel::AnnualPercentage);
        assert_eq!(c.tag(), "ReservoirModel:AnnualPercentage");
        assert_eq!(c.to_string(), c.tag());
    }

    #[test]
    fn tag_lookup_is_exact_for_overlapping_names() {
        // "Heat" is a substring of several cogeneration members.
        let heat = Choice::from_tag(ChoiceFamily::EndUseOption, "EndUseOption:Heat").unwrap();
        assert_eq!(heat, Choice::EndUseOption(EndUseOption::Heat));

        let topping = Choice::from_tag(
            ChoiceFamily::EndUseOption,
            "EndUseOption:CogenerationToppingExtraHeat",
        )
        .unwrap();
        assert_eq!(
            topping,
            Choice::EndUseOption(EndUseOption::CogenerationToppingExtraHeat)
        );
    }

    #[test]
    fn tag_with_wrong_family_is_rejected() {
        assert!(Choice::from_tag(ChoiceFamily::PowerPlantType, "EconomicModel:Bicycle").is_none());
    }

    #[test]
    fn tag_with_unknown_member_is_rejected() {
        assert!(Choice::from_tag(ChoiceFamily::EconomicModel, "EconomicModel:Unicycle").is_none());
    }

    #[test]
    fn every_member_tag_roundtrips() {
        let families = [
            ChoiceFamily::ReservoirModel,
            ChoiceFamily::EndUseOption,
            ChoiceFamily::PowerPlantType,
            ChoiceFamily::EconomicModel,
        ];
        for family in families {
            for code in 0..=u8::MAX {
                if let Some(c) = Choice::from_code(family, code) {
                    assert_eq!(Choice::from_tag(family, &c.tag()), Some(c));
                }
            }
        }
    }

    #[test]
    fn parse_accepts_code_name_and_tag() {
        let expected = Some(Choice::EconomicModel(EconomicModel::StandardLevelizedCost));
        assert_eq!(Choice::parse(ChoiceFamily::EconomicModel, "2"), expected);
        assert_eq!(
            Choice::parse(ChoiceFamily::EconomicModel, "StandardLevelizedCost"),
            expected
        );
        assert_eq!(
            Choice::parse(ChoiceFamily::EconomicModel, " EconomicModel:StandardLevelizedCost "),
            expected
        );
        assert_eq!(Choice::parse(ChoiceFamily::EconomicModel, "9"), None);
    }

    #[test]
    fn end_use_codes_match_legacy_numbering() {
        assert_eq!(EndUseOption::from_code(31), Some(EndUseOption::CogenerationToppingExtraHeat));
        assert_eq!(EndUseOption::CogenerationParallelExtraElectricity.code(), 52);
        assert_eq!(EndUseOption::ALL.len(), 8);
    }

    #[test]
    fn electric_share_bounds() {
        for option in EndUseOption::ALL {
            let share = option.electric_share();
            assert!((0.0..=1.0).contains(&share));
        }
        assert_eq!(EndUseOption::Electricity.electric_share(), 1.0);
        assert_eq!(EndUseOption::Heat.electric_share(), 0.0);
    }
}
