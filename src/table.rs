use crate::config::Environment;
use crate::model::{Address, ResolvedEndpoint};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

/// Render resolved endpoints and the remembered addresses as a table
pub fn endpoint_table(
    environment: &Environment,
    endpoint: &ResolvedEndpoint,
    fallbacks: &[Address],
) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(vec!["Endpoint", "URL"]);

    let mode = if environment.is_production() {
        "production (static)"
    } else {
        "development (discovered)"
    };
    table.add_row(vec![
        Cell::new("Mode").add_attribute(Attribute::Bold),
        Cell::new(mode),
    ]);
    table.add_row(vec![Cell::new("GraphQL"), Cell::new(&endpoint.graphql_url)]);
    table.add_row(vec![Cell::new("WebSocket"), Cell::new(&endpoint.websocket_url)]);

    let remembered = if fallbacks.is_empty() {
        "none".to_string()
    } else {
        fallbacks
            .iter()
            .map(Address::to_string)
            .collect::<Vec<String>>()
            .join(", ")
    };
    table.add_row(vec![Cell::new("Fallbacks"), Cell::new(remembered)]);

    table
}
