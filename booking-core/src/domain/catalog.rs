//! Derivation of the purchasable booking options shown in step 1.
//!
//! Pure: the same inputs always produce the same list.

use shared::{
    ActivePackage, BookingType, BookingTypeOption, DemoEligibility, PackageStatus, PackageTier,
    PlatformSettings, TeacherSettings,
};

/// Everything the catalog is derived from
#[derive(Debug, Clone, Copy)]
pub struct CatalogInput<'a> {
    /// Per-session price of the selected subject; zero is a free subject
    pub base_price: u64,
    pub platform: PlatformSettings,
    pub teacher: TeacherSettings,
    /// Tiers in display order
    pub tiers: &'a [PackageTier],
    /// Unknown for guests, in which case the demo is offered
    pub demo_eligibility: Option<&'a DemoEligibility>,
    /// Package the student already owns for this teacher and subject
    pub active_package: Option<&'a ActivePackage>,
    pub currency: &'a str,
}

/// Price breakdown of one package tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPricing {
    pub original_price: u64,
    pub price: u64,
    pub savings: u64,
}

/// `round(base × sessions × (1 − discount/100))`
pub fn price_tier(base_price: u64, tier: &PackageTier) -> TierPricing {
    let original_price = base_price * tier.session_count as u64;
    let factor = 1.0 - tier.discount_percent / 100.0;
    let price = (original_price as f64 * factor).round().max(0.0) as u64;
    TierPricing {
        original_price,
        price,
        savings: original_price.saturating_sub(price),
    }
}

/// Build the ordered option list: demo, single, existing package, then one entry per active tier
pub fn derive_booking_options(input: &CatalogInput<'_>) -> Vec<BookingTypeOption> {
    let mut options = Vec::new();

    if input.platform.demos_enabled && input.teacher.demo_enabled {
        options.push(demo_option(input));
    }

    options.push(BookingTypeOption {
        booking_type: BookingType::Single,
        enabled: true,
        reason: None,
        package_id: None,
        tier_id: None,
        price: input.base_price,
        display_price: Some(format_currency(input.base_price, input.currency)),
        original_price: None,
        discount_percent: None,
        savings: None,
        session_count: Some(1),
        sessions_remaining: None,
        expires_at: None,
        is_recommended: false,
        recurring_ratio: None,
    });

    let existing = input.active_package.map(existing_package_option);
    let existing_recommended = existing.as_ref().map(|o| o.is_recommended).unwrap_or(false);
    if let Some(option) = existing {
        options.push(option);
    }

    if input.platform.packages_enabled {
        let recommended_tier = if existing_recommended {
            None
        } else {
            best_value_tier(input.tiers).map(|tier| tier.id.clone())
        };

        for tier in input.tiers.iter().filter(|tier| tier.is_active) {
            let pricing = price_tier(input.base_price, tier);
            options.push(BookingTypeOption {
                booking_type: BookingType::Package,
                enabled: true,
                reason: None,
                package_id: None,
                tier_id: Some(tier.id.clone()),
                price: pricing.price,
                display_price: Some(format_currency(pricing.price, input.currency)),
                original_price: Some(pricing.original_price),
                discount_percent: Some(tier.discount_percent),
                savings: Some(format!(
                    "{} ({}%)",
                    format_currency(pricing.savings, input.currency),
                    format_percent(tier.discount_percent)
                )),
                session_count: Some(tier.session_count),
                sessions_remaining: None,
                expires_at: None,
                is_recommended: recommended_tier.as_deref() == Some(tier.id.as_str()),
                recurring_ratio: tier.recurring_ratio,
            });
        }
    }

    options
}

fn demo_option(input: &CatalogInput<'_>) -> BookingTypeOption {
    let enabled = input.demo_eligibility.map(|e| e.allowed).unwrap_or(true);
    let reason = input
        .demo_eligibility
        .filter(|e| !e.allowed)
        .map(|e| demo_disabled_reason(e.reason.as_deref()).to_string());

    BookingTypeOption {
        booking_type: BookingType::Demo,
        enabled,
        reason,
        package_id: None,
        tier_id: None,
        price: 0,
        display_price: Some("Free".to_string()),
        original_price: None,
        discount_percent: None,
        savings: None,
        session_count: Some(1),
        sessions_remaining: None,
        expires_at: None,
        is_recommended: false,
        recurring_ratio: None,
    }
}

fn existing_package_option(package: &ActivePackage) -> BookingTypeOption {
    let remaining = package.sessions_remaining();
    let usable = remaining > 0 && package.status == PackageStatus::Active;
    let reason = if remaining == 0 {
        Some("No sessions remaining".to_string())
    } else if package.status != PackageStatus::Active {
        Some("Package is not active".to_string())
    } else {
        None
    };

    BookingTypeOption {
        booking_type: BookingType::Package,
        enabled: usable,
        reason,
        package_id: Some(package.id.clone()),
        tier_id: None,
        price: 0,
        display_price: Some("From your package".to_string()),
        original_price: None,
        discount_percent: None,
        savings: None,
        session_count: Some(package.session_count),
        sessions_remaining: Some(remaining),
        expires_at: package.expires_at.clone(),
        is_recommended: usable,
        recurring_ratio: None,
    }
}

/// Highest discount among active tiers; the earlier tier wins a tie
fn best_value_tier(tiers: &[PackageTier]) -> Option<&PackageTier> {
    tiers
        .iter()
        .filter(|tier| tier.is_active)
        .fold(None, |best: Option<&PackageTier>, tier| match best {
            Some(current) if current.discount_percent >= tier.discount_percent => Some(current),
            _ => Some(tier),
        })
}

pub fn demo_disabled_reason(code: Option<&str>) -> &'static str {
    match code {
        Some("ALREADY_USED") => "You already used your free demo with this teacher",
        Some("PENDING_EXISTS") => "You already have a pending demo request",
        Some("DEMO_DISABLED") => "This teacher is not offering demos right now",
        _ => "Not available",
    }
}

/// `8000` -> `"8,000 SDG"`
pub fn format_currency(amount: u64, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if currency.is_empty() {
        grouped
    } else {
        format!("{} {}", grouped, currency)
    }
}

fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &str, sessions: u32, discount: f64) -> PackageTier {
        PackageTier {
            id: id.to_string(),
            session_count: sessions,
            discount_percent: discount,
            display_order: 0,
            is_active: true,
            recurring_ratio: Some(0.8),
        }
    }

    fn input<'a>(base_price: u64, tiers: &'a [PackageTier]) -> CatalogInput<'a> {
        CatalogInput {
            base_price,
            platform: PlatformSettings {
                demos_enabled: true,
                packages_enabled: true,
            },
            teacher: TeacherSettings { demo_enabled: true },
            tiers,
            demo_eligibility: None,
            active_package: None,
            currency: "SDG",
        }
    }

    #[test]
    fn test_package_pricing_scenario() {
        let tiers = [tier("t8", 8, 10.0)];
        let options = derive_booking_options(&input(1000, &tiers));
        let package = options.iter().find(|o| o.tier_id.as_deref() == Some("t8")).unwrap();

        assert_eq!(package.price, 7200);
        assert_eq!(package.original_price, Some(8000));
        assert_eq!(package.savings.as_deref(), Some("800 SDG (10%)"));
        assert_eq!(package.display_price.as_deref(), Some("7,200 SDG"));
        assert_eq!(package.recurring_ratio, Some(0.8));
    }

    #[test]
    fn test_order_is_demo_single_then_tiers() {
        let tiers = [tier("t4", 4, 5.0), tier("t8", 8, 10.0), tier("t12", 12, 15.0)];
        let options = derive_booking_options(&input(500, &tiers));
        let kinds: Vec<(BookingType, Option<&str>)> = options
            .iter()
            .map(|o| (o.booking_type, o.tier_id.as_deref()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (BookingType::Demo, None),
                (BookingType::Single, None),
                (BookingType::Package, Some("t4")),
                (BookingType::Package, Some("t8")),
                (BookingType::Package, Some("t12")),
            ]
        );
    }

    #[test]
    fn test_demo_requires_both_flags() {
        let mut catalog = input(500, &[]);
        catalog.teacher.demo_enabled = false;
        assert!(derive_booking_options(&catalog)
            .iter()
            .all(|o| o.booking_type != BookingType::Demo));

        let mut catalog = input(500, &[]);
        catalog.platform.demos_enabled = false;
        assert!(derive_booking_options(&catalog)
            .iter()
            .all(|o| o.booking_type != BookingType::Demo));
    }

    #[test]
    fn test_zero_tiers_offers_demo_and_single_only() {
        let options = derive_booking_options(&input(800, &[]));
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].booking_type, BookingType::Demo);
        assert_eq!(options[1].booking_type, BookingType::Single);
    }

    #[test]
    fn test_free_subject_propagates_zero_price() {
        let options = derive_booking_options(&input(0, &[tier("t8", 8, 10.0)]));
        let single = options.iter().find(|o| o.booking_type == BookingType::Single).unwrap();
        assert_eq!(single.price, 0);
        assert_eq!(single.display_price.as_deref(), Some("0 SDG"));
    }

    #[test]
    fn test_packages_disabled_hides_tiers() {
        let tiers = [tier("t8", 8, 10.0)];
        let mut catalog = input(1000, &tiers);
        catalog.platform.packages_enabled = false;
        assert!(derive_booking_options(&catalog).iter().all(|o| o.tier_id.is_none()));
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let tiers = [tier("t4", 4, 5.0), tier("t8", 8, 12.5)];
        let catalog = input(750, &tiers);
        assert_eq!(derive_booking_options(&catalog), derive_booking_options(&catalog));
    }

    #[test]
    fn test_best_discount_is_recommended_and_inactive_skipped() {
        let mut inactive = tier("t20", 20, 30.0);
        inactive.is_active = false;
        let tiers = [tier("t4", 4, 5.0), tier("t8", 8, 10.0), tier("t12", 12, 10.0), inactive];
        let options = derive_booking_options(&input(1000, &tiers));

        let recommended: Vec<&str> = options
            .iter()
            .filter(|o| o.is_recommended)
            .filter_map(|o| o.tier_id.as_deref())
            .collect();
        assert_eq!(recommended, vec!["t8"]);
        assert!(options.iter().all(|o| o.tier_id.as_deref() != Some("t20")));
    }

    #[test]
    fn test_ineligible_demo_is_listed_disabled() {
        let eligibility = DemoEligibility {
            allowed: false,
            reason: Some("ALREADY_USED".to_string()),
        };
        let mut catalog = input(1000, &[]);
        catalog.demo_eligibility = Some(&eligibility);

        let options = derive_booking_options(&catalog);
        let demo = &options[0];
        assert_eq!(demo.booking_type, BookingType::Demo);
        assert!(!demo.enabled);
        assert_eq!(
            demo.reason.as_deref(),
            Some("You already used your free demo with this teacher")
        );
    }

    #[test]
    fn test_existing_package_follows_single_and_takes_recommendation() {
        let package = ActivePackage {
            id: "pkg-1".to_string(),
            session_count: 8,
            sessions_used: 3,
            status: PackageStatus::Active,
            expires_at: Some("2025-06-01".to_string()),
        };
        let tiers = [tier("t8", 8, 10.0)];
        let mut catalog = input(1000, &tiers);
        catalog.active_package = Some(&package);

        let options = derive_booking_options(&catalog);
        assert_eq!(options[1].booking_type, BookingType::Single);
        let existing = &options[2];
        assert_eq!(existing.package_id.as_deref(), Some("pkg-1"));
        assert_eq!(existing.tier_id, None);
        assert_eq!(existing.price, 0);
        assert_eq!(existing.sessions_remaining, Some(5));
        assert!(existing.is_recommended);
        assert!(options.iter().filter(|o| o.is_recommended).count() == 1);
        assert!(options.iter().all(|o| o.has_valid_package_reference()));
    }

    #[test]
    fn test_depleted_package_is_disabled() {
        let package = ActivePackage {
            id: "pkg-2".to_string(),
            session_count: 4,
            sessions_used: 4,
            status: PackageStatus::Active,
            expires_at: None,
        };
        let mut catalog = input(1000, &[]);
        catalog.active_package = Some(&package);

        let existing = derive_booking_options(&catalog)
            .into_iter()
            .find(|o| o.package_id.is_some())
            .unwrap();
        assert!(!existing.enabled);
        assert!(!existing.is_recommended);
        assert_eq!(existing.reason.as_deref(), Some("No sessions remaining"));
    }

    #[test]
    fn test_format_currency_grouping() {
        assert_eq!(format_currency(0, "SDG"), "0 SDG");
        assert_eq!(format_currency(999, "SDG"), "999 SDG");
        assert_eq!(format_currency(1000, "SDG"), "1,000 SDG");
        assert_eq!(format_currency(1234567, ""), "1,234,567");
    }
}
