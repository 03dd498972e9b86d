//! Built-in canned lookups.
//!
//! Stand-ins for real product, order and weather backends. They answer a
//! handful of known inputs and return a fixed apology otherwise.

use crate::action::{ActionArgs, ActionRegistry, ActionSpec};

/// Describes the products available for a product type.
#[must_use]
pub fn lookup_products(product_type: &str) -> String {
    let product_type = product_type.to_lowercase();
    if product_type.contains("electronics") {
        "We have a wide range of laptops, smartphones, and headphones.".to_string()
    } else if product_type.contains("clothing") {
        "Our clothing collection includes shirts, pants, and dresses.".to_string()
    } else {
        "I couldn't find products for that type.".to_string()
    }
}

/// Reports the status of an order.
#[must_use]
pub fn get_order_status(order_number: &str) -> String {
    if order_number == "123456789" {
        "Your order #123456789 is currently out for delivery and expected by tomorrow.".to_string()
    } else {
        "Sorry, I couldn't find an order with that number.".to_string()
    }
}

/// Reports the current weather for a location.
#[must_use]
pub fn get_current_weather(location: &str) -> String {
    match location.to_lowercase().as_str() {
        "melbourne" => {
            "The weather in Melbourne is currently partly cloudy with 20 degrees Celsius."
                .to_string()
        }
        "sydney" => "The weather in Sydney is sunny with 25 degrees Celsius.".to_string(),
        _ => format!("Sorry, I don't have real-time weather data for {location}."),
    }
}

/// Registers the three built-in lookups with their argument and slot contracts.
pub fn register_builtin_lookups(registry: &mut ActionRegistry) {
    registry.register_fn(
        ActionSpec::new("lookup_products")
            .argument("product_type")
            .output_slot("product_data"),
        |args: &ActionArgs| lookup_products(args.get("product_type")),
    );
    registry.register_fn(
        ActionSpec::new("get_order_status")
            .argument("order_number")
            .output_slot("order_data"),
        |args: &ActionArgs| get_order_status(args.get("order_number")),
    );
    registry.register_fn(
        ActionSpec::new("get_current_weather")
            .argument("location")
            .output_slot("weather_data"),
        |args: &ActionArgs| get_current_weather(args.get("location")),
    );
}
