//! Route templates for span names and metric labels.

use uuid::Uuid;

/// Parameter name for a UUID that follows `collection` in a path.
fn parameter_for(collection: &str) -> &'static str {
    match collection {
        "vouchers" => "{voucher}",
        "orders" => "{order}",
        "payments" => "{payment}",
        "loyalty" => "{customer}",
        _ => "{uuid}",
    }
}

/// Collapse identifiers in `path` back into the router's parameter names, so
/// every payment shares one metric series and span name.
pub(super) fn route_template(path: &str) -> String {
    let mut template = String::with_capacity(path.len());
    let mut previous = "";

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        template.push('/');

        if Uuid::parse_str(segment).is_ok() {
            template.push_str(parameter_for(previous));
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}
