use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fees::FeeSchedule;
use crate::shipping::{PolicyBasis, PriceBand, ShippingRateCell, WeightBand};
use crate::strategy::{PricingEffect, PricingPolicyRule, RoundingRule};
use crate::tariffs::{
    CountryRateOverride, CountryTariffProfile, TariffChapter, TariffFullCode, TariffHeading,
    TariffSubheading,
};

use super::InMemoryDataset;

/// Duty-unpaid cell rates for weight band `w`: first 12 + 8w, additional
/// 6 + 4w, handling 2.
pub(crate) fn ddu_first_rate(w: u32) -> Decimal {
    dec!(12) + dec!(8) * Decimal::from(w)
}

/// Duty-prepaid cell rates for weight band `w` and price band `p`: first
/// 20 + 8w + 4p, additional 10 + 4w, handling 3.
pub(crate) fn ddp_first_rate(w: u32, p: u32) -> Decimal {
    dec!(20) + dec!(8) * Decimal::from(w) + dec!(4) * Decimal::from(p)
}

fn rule(id: &str, seq: u64, margin: Decimal, rounding: RoundingRule) -> PricingPolicyRule {
    PricingPolicyRule {
        id: id.to_string(),
        priority: 0,
        created_seq: seq,
        channel: None,
        account: None,
        category: None,
        min_price: None,
        max_price: None,
        effect: PricingEffect {
            target_margin: margin,
            floor_price: None,
            rounding,
        },
    }
}

/// Weight bands 0-0.5-1-2-5kg; duty-prepaid price bands <=250, <=350, <=450
/// starting at 150. Zone US has every cell, zone GB is duty-unpaid only.
pub(crate) fn sample_dataset() -> InMemoryDataset {
    let weight_bands = vec![
        (dec!(0), dec!(0.5)),
        (dec!(0.5), dec!(1.0)),
        (dec!(1.0), dec!(2.0)),
        (dec!(2.0), dec!(5.0)),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (min_weight, max_weight))| WeightBand {
        index: i as u32,
        min_weight,
        max_weight,
    })
    .collect::<Vec<_>>();

    let price_bands = vec![
        ("<=250", dec!(150), dec!(250)),
        ("<=350", dec!(250), dec!(350)),
        ("<=450", dec!(350), dec!(450)),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, min_price, max_price))| PriceBand {
        index: i as u32,
        label: label.to_string(),
        min_price,
        max_price,
    })
    .collect::<Vec<_>>();

    let mut rate_cells = Vec::new();
    for w in 0..weight_bands.len() as u32 {
        for zone in ["US", "GB"] {
            rate_cells.push(ShippingRateCell {
                weight_band: w,
                price_band: None,
                zone: zone.to_string(),
                basis: PolicyBasis::DutyUnpaid,
                first_unit_rate: ddu_first_rate(w),
                additional_unit_rate: dec!(6) + dec!(4) * Decimal::from(w),
                handling_fee: dec!(2),
            });
        }
        for p in 0..price_bands.len() as u32 {
            rate_cells.push(ShippingRateCell {
                weight_band: w,
                price_band: Some(p),
                zone: "US".to_string(),
                basis: PolicyBasis::DutyPrepaid,
                first_unit_rate: ddp_first_rate(w, p),
                additional_unit_rate: dec!(10) + dec!(4) * Decimal::from(w),
                handling_fee: dec!(3),
            });
        }
    }

    let mut ebay = rule("ebay", 1, dec!(0.20), RoundingRule::Charm99);
    ebay.channel = Some("ebay".to_string());
    let mut etsy = rule("etsy-floor", 2, dec!(0.15), RoundingRule::Whole);
    etsy.channel = Some("etsy".to_string());
    etsy.effect.floor_price = Some(dec!(60));
    let mut cameras = rule("cameras", 3, dec!(0.25), RoundingRule::Cents);
    cameras.category = Some("cameras".to_string());

    InMemoryDataset {
        version: Some("fixture-1".to_string()),
        chapters: vec![
            TariffChapter {
                code: "85".to_string(),
                description: "Electrical machinery".to_string(),
                is_excluded: false,
            },
            TariffChapter {
                code: "90".to_string(),
                description: "Optical instruments".to_string(),
                is_excluded: false,
            },
            TariffChapter {
                code: "93".to_string(),
                description: "Arms and ammunition".to_string(),
                is_excluded: true,
            },
        ],
        headings: vec![
            TariffHeading {
                code: "8525".to_string(),
                description: "Transmission apparatus; cameras".to_string(),
            },
            TariffHeading {
                code: "9006".to_string(),
                description: "Photographic cameras".to_string(),
            },
            TariffHeading {
                code: "9302".to_string(),
                description: "Revolvers and pistols".to_string(),
            },
        ],
        subheadings: vec![
            TariffSubheading {
                code: "852589".to_string(),
                description: "Other cameras".to_string(),
            },
            TariffSubheading {
                code: "900659".to_string(),
                description: "Other photographic cameras".to_string(),
            },
            TariffSubheading {
                code: "930200".to_string(),
                description: "Revolvers and pistols".to_string(),
            },
        ],
        full_codes: vec![
            TariffFullCode {
                code: "8525893000".to_string(),
                description: "Digital still image video cameras".to_string(),
                general_rate: dec!(0.021),
                special_rates: BTreeMap::from([
                    ("AU".to_string(), dec!(0)),
                    ("column2".to_string(), dec!(0.35)),
                ]),
            },
            TariffFullCode {
                code: "9006594000".to_string(),
                description: "Other cameras".to_string(),
                general_rate: dec!(0.032),
                special_rates: BTreeMap::new(),
            },
            TariffFullCode {
                code: "9302000000".to_string(),
                description: "Revolvers and pistols".to_string(),
                general_rate: dec!(0.026),
                special_rates: BTreeMap::new(),
            },
        ],
        country_profiles: vec![
            CountryTariffProfile {
                trade_remedy_surcharge: dec!(0.075),
                ..CountryTariffProfile::new("CN", dec!(0.10))
            },
            CountryTariffProfile::new("JP", dec!(0.03)),
            CountryTariffProfile {
                antidumping_surcharge: dec!(0.02),
                ..CountryTariffProfile::new("VN", dec!(0.05))
            },
        ],
        country_overrides: vec![CountryRateOverride {
            code: "8525893000".to_string(),
            country: "CN".to_string(),
            rate: dec!(0.271),
        }],
        weight_bands,
        price_bands,
        rate_cells,
        pricing_rules: vec![
            rule("default", 0, dec!(0.15), RoundingRule::Cents),
            ebay,
            etsy,
            cameras,
        ],
        fee_schedules: vec![
            FeeSchedule::new("ebay", dec!(0.13), dec!(0.30), dec!(0.0165)),
            FeeSchedule::new("amazon", dec!(0.15), dec!(0), dec!(0)),
            FeeSchedule::new("etsy", dec!(0.065), dec!(0.20), dec!(0)),
        ],
    }
}
