use booking_core::domain::catalog::format_currency;
use shared::{BookingType, BookingTypeOption};
use yew::prelude::*;

use crate::services::date_utils::format_iso_date;

/// Heading of a catalog entry
pub fn option_title(option: &BookingTypeOption) -> String {
    match option.booking_type {
        BookingType::Demo => "Free demo session".to_string(),
        BookingType::Single => "Single session".to_string(),
        BookingType::Package if option.is_existing_package() => format!(
            "Your package ({} of {} sessions left)",
            option.sessions_remaining.unwrap_or(0),
            option.session_count.unwrap_or(0)
        ),
        BookingType::Package => format!("{} sessions package", option.session_count.unwrap_or(0)),
    }
}

#[derive(Properties, PartialEq)]
pub struct BookingTypeStepProps {
    pub options: Vec<BookingTypeOption>,
    pub loading: bool,
    pub selected: Option<BookingTypeOption>,
    pub currency: String,
    pub on_select: Callback<BookingTypeOption>,
}

#[function_component(BookingTypeStep)]
pub fn booking_type_step(props: &BookingTypeStepProps) -> Html {
    html! {
        <div class="booking-step booking-type-step">
            <div class="step-intro">
                <h3>{"How many sessions?"}</h3>
                <p>{"Packages are scheduled on fixed weekly times and cost less per session"}</p>
            </div>

            {if props.loading {
                html! { <p class="step-loading">{"Checking your packages..."}</p> }
            } else {
                html! {}
            }}

            <div class="option-list">
                {for props.options.iter().map(|option| {
                    let is_selected = props.selected.as_ref().map(|s| s.same_entry(option)).unwrap_or(false);
                    let key = format!(
                        "{}-{}",
                        option.booking_type.as_str(),
                        option.tier_id.as_deref().or(option.package_id.as_deref()).unwrap_or("base")
                    );
                    let onclick = {
                        let on_select = props.on_select.clone();
                        let option = option.clone();
                        Callback::from(move |_: MouseEvent| {
                            if option.enabled {
                                on_select.emit(option.clone());
                            }
                        })
                    };
                    let price = option
                        .display_price
                        .clone()
                        .unwrap_or_else(|| format_currency(option.price, &props.currency));

                    html! {
                        <button type="button" {key}
                            class={classes!(
                                "option-card",
                                is_selected.then_some("selected"),
                                (!option.enabled).then_some("disabled"),
                                option.is_recommended.then_some("recommended")
                            )}
                            disabled={!option.enabled}
                            {onclick}>
                            {if option.is_recommended {
                                html! { <span class="option-badge">{"Best value"}</span> }
                            } else {
                                html! {}
                            }}
                            <span class="option-check">{if is_selected { "✓" } else { "" }}</span>
                            <span class="option-title">{option_title(option)}</span>
                            <span class="option-price">
                                {match (option.original_price, option.is_new_package_purchase()) {
                                    (Some(original), true) if original > option.price => html! {
                                        <s class="option-original-price">{format_currency(original, &props.currency)}</s>
                                    },
                                    _ => html! {},
                                }}
                                <strong>{if option.price == 0 && option.booking_type == BookingType::Demo {
                                    "Free".to_string()
                                } else {
                                    price
                                }}</strong>
                            </span>
                            {match &option.savings {
                                Some(savings) => html! { <span class="option-savings">{format!("Save {}", savings)}</span> },
                                None => html! {},
                            }}
                            {match &option.expires_at {
                                Some(expires) => html! { <span class="option-expiry">{format!("Expires {}", format_iso_date(expires))}</span> },
                                None => html! {},
                            }}
                            {match &option.reason {
                                Some(reason) if !option.enabled => html! { <span class="option-reason">{reason}</span> },
                                _ => html! {},
                            }}
                        </button>
                    }
                })}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn option(booking_type: BookingType) -> BookingTypeOption {
        BookingTypeOption {
            booking_type,
            enabled: true,
            reason: None,
            package_id: None,
            tier_id: None,
            price: 0,
            display_price: None,
            original_price: None,
            discount_percent: None,
            savings: None,
            session_count: None,
            sessions_remaining: None,
            expires_at: None,
            is_recommended: false,
            recurring_ratio: None,
        }
    }

    #[wasm_bindgen_test]
    fn test_option_titles() {
        assert_eq!(option_title(&option(BookingType::Demo)), "Free demo session");

        let mut tier = option(BookingType::Package);
        tier.tier_id = Some("tier-8".into());
        tier.session_count = Some(8);
        assert_eq!(option_title(&tier), "8 sessions package");

        let mut owned = option(BookingType::Package);
        owned.package_id = Some("pkg-1".into());
        owned.session_count = Some(10);
        owned.sessions_remaining = Some(3);
        assert_eq!(option_title(&owned), "Your package (3 of 10 sessions left)");
    }
}
