use booking_core::api::SchedulingApi;
use booking_core::domain::catalog::{derive_booking_options, CatalogInput};
use shared::{ActivePackage, BookingTypeOption, DemoEligibility, PackageTier, TeacherBookingProfile};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;

pub struct BookingOptionsState {
    pub options: Vec<BookingTypeOption>,
    pub loading: bool,
}

/// Catalog for the selected subject, with eligibility and owned packages for signed-in users
#[hook]
pub fn use_booking_options(
    api_client: &ApiClient,
    teacher: &TeacherBookingProfile,
    subject_id: &str,
    signed_in: bool,
    currency: &str,
) -> BookingOptionsState {
    let tiers = use_state(|| Option::<Vec<PackageTier>>::None);
    let eligibility = use_state(|| Option::<DemoEligibility>::None);
    let active_package = use_state(|| Option::<ActivePackage>::None);
    let loading = use_state(|| false);

    {
        let api_client = api_client.clone();
        let tiers = tiers.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api_client.get_package_tiers().await {
                    Ok(list) => tiers.set(Some(list)),
                    Err(e) => log::warn!("Falling back to teacher tiers: {}", e),
                }
            });
            || ()
        });
    }

    {
        let api_client = api_client.clone();
        let eligibility = eligibility.clone();
        let active_package = active_package.clone();
        let loading = loading.clone();
        use_effect_with(
            (teacher.id.clone(), subject_id.to_string(), signed_in),
            move |(teacher_id, subject_id, signed_in)| {
                eligibility.set(None);
                active_package.set(None);
                if *signed_in && !subject_id.is_empty() {
                    let teacher_id = teacher_id.clone();
                    let subject_id = subject_id.clone();
                    spawn_local(async move {
                        loading.set(true);
                        match api_client.check_demo_eligibility(&teacher_id).await {
                            Ok(result) => eligibility.set(Some(result)),
                            Err(e) => log::warn!("Demo eligibility unavailable: {}", e),
                        }
                        match api_client.get_active_package(&teacher_id, &subject_id).await {
                            Ok(package) => active_package.set(package),
                            Err(e) => log::warn!("Active package lookup failed: {}", e),
                        }
                        loading.set(false);
                    });
                }
                || ()
            },
        );
    }

    let base_price = teacher
        .subjects
        .iter()
        .find(|s| s.id == subject_id)
        .map(|s| s.price)
        .unwrap_or(0);
    let tier_list: &[PackageTier] = match &*tiers {
        Some(list) => list,
        None => &teacher.package_tiers,
    };

    let options = derive_booking_options(&CatalogInput {
        base_price,
        platform: teacher.global_settings,
        teacher: teacher.teacher_settings,
        tiers: tier_list,
        demo_eligibility: (*eligibility).as_ref(),
        active_package: (*active_package).as_ref(),
        currency,
    });

    BookingOptionsState {
        options,
        loading: *loading,
    }
}
