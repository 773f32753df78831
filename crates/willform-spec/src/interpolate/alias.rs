use std::borrow::Cow;

/// Conventional storage keys for list-shaped section answers.
pub const FALLBACK_ALIASES: &[(&str, &str)] = &[
    ("guardiansSection", "guardianData"),
    ("substituteGuardiansSection", "substituteGuardianData"),
    ("guardianshipDetailsSection", "guardianshipDetailsData"),
    ("signingOnBehalfSection", "signingOnBehalfData"),
    ("interpreterSection", "interpreterData"),
    ("chattelRecipientsSection", "chattelRecipientsData"),
    ("excludedPersonSection", "excludedPersonData"),
    ("petCarerSection", "petCarerData"),
    ("substitutePetCarerSection", "substitutePetCarerData"),
    ("professionalTrusteesSection", "professionalTrusteeData"),
    (
        "substituteProfessionalTrusteesSection",
        "substituteProfessionalTrusteeData",
    ),
    ("separateTrusteesSection", "separateTrusteeData"),
    ("monetaryGiftsSection", "monetaryGiftsDetails"),
    ("specificGiftsSection", "specificGiftsDetails"),
    ("propertyGiftsSection", "propertyGiftsDetails"),
    ("debtorsSection", "debtorsData"),
    ("partnerSection", "partnerData"),
    ("executorsSection", "executorData"),
    ("substituteExecutorsSection", "substituteExecutorData"),
    ("professionalExecutorSection", "professionalExecutorData"),
    (
        "substituteProfessionalExecutorSection",
        "substituteProfessionalExecutorData",
    ),
    ("digitalExecutorsSection", "digitalExecutorData"),
    ("trusteesSection", "trusteeData"),
    ("substituteTrusteesSection", "substituteTrusteeData"),
    ("charityBenefitSection", "charityBenefitDetails"),
    ("chattelsGiftBeneficiarySection", "chattelsGiftBeneficiaryData"),
];

/// Storage key tried before the literal section id; unlisted sections use `<id>Data`.
pub fn fallback_alias(section_id: &str) -> Cow<'static, str> {
    FALLBACK_ALIASES
        .iter()
        .find(|(section, _)| *section == section_id)
        .map(|(_, alias)| Cow::Borrowed(*alias))
        .unwrap_or_else(|| Cow::Owned(format!("{section_id}Data")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_sections_use_table() {
        assert_eq!(fallback_alias("guardiansSection"), "guardianData");
        assert_eq!(fallback_alias("monetaryGiftsSection"), "monetaryGiftsDetails");
    }

    #[test]
    fn unlisted_sections_append_data() {
        assert_eq!(fallback_alias("witness"), "witnessData");
    }
}
