use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use uuid::Uuid;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub(super) fn parse_uuid(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| anyhow::anyhow!("Invalid id {:?}: {}", value, e))
}

pub fn format_date(date: Date) -> anyhow::Result<String> {
    Ok(date.format(DATE_FORMAT)?)
}

pub fn parse_date(value: &str) -> anyhow::Result<Date> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid date {:?} (expected YYYY-MM-DD): {}", value, e))
}

pub(super) fn format_timestamp(ts: OffsetDateTime) -> anyhow::Result<String> {
    Ok(ts.format(&Rfc3339)?)
}

pub(super) fn parse_timestamp(value: &str) -> anyhow::Result<OffsetDateTime> {
    Ok(OffsetDateTime::parse(value, &Rfc3339)?)
}

/// Customer-facing reference, e.g. `HR-1A2B3C4D5E6F`. Display only; the
/// id stays the key.
pub(super) fn booking_number(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("HR-{}", simple[..12].to_uppercase())
}
