//! HTTP-date handling (RFC 7231 §7.1.1.1)

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// IMF-fixdate, the only format we emit
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 format
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` format
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP-date forms
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Drop sub-second precision; HTTP dates only carry whole seconds
pub fn truncate_to_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(0)
}
