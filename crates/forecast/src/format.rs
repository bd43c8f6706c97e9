//! Payload-to-text formatting.
//!
//! Pure functions over the cached JSON payloads. Decoding failures mean
//! the upstream returned 2xx with an unexpected shape and surface as
//! `Error::MalformedPayload`. Times are rendered in the configured NZ
//! timezone since NIWA data is New Zealand specific.

use chrono_tz::Tz;
use common::{Error, TidePayload, UvPayload};
use serde_json::Value;

/// Risk category for a UV index value.
///
/// Ranges are half-open and fixed by the WHO UV index scale: anything
/// below 3 is "Low", `[3,6)` "Medium", `[6,8)` "High", `[8,11)`
/// "Very High", 11 and above "Extreme". A JSON null reads "No data";
/// anything non-numeric reads "Invalid data" (numeric strings parse).
pub fn uv_risk(value: &Value) -> &'static str {
    let index = match value {
        Value::Null => return "No data",
        Value::Number(n) => match n.as_f64() {
            Some(v) => v,
            None => return "Invalid data",
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return "Invalid data",
        },
        _ => return "Invalid data",
    };

    if index < 3.0 {
        "Low"
    } else if index < 6.0 {
        "Medium"
    } else if index < 8.0 {
        "High"
    } else if index < 11.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

/// UV value rendered to one decimal place, or "--" when unusable.
fn uv_value_display(value: &Value) -> String {
    let index = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match index {
        Some(v) => format!("{:.1}", v),
        None => "--".to_string(),
    }
}

/// Render a tide payload as a small date/time/height table.
pub fn format_tide(payload: &Value, tz: Tz) -> Result<String, Error> {
    let tide: TidePayload = serde_json::from_value(payload.clone())
        .map_err(|e| Error::MalformedPayload(format!("tide data: {}", e)))?;

    let mut out = format!(
        "NIWA Tide Data for location ({}, {}):\n",
        tide.metadata.latitude, tide.metadata.longitude
    );
    out.push_str("Date        Time   Height (m)\n");

    for value in &tide.values {
        let local = value.time.with_timezone(&tz);
        out.push_str(&format!(
            "{}  {}  {:>9.2}\n",
            local.format("%Y-%m-%d"),
            local.format("%H:%M"),
            value.value
        ));
    }

    Ok(out)
}

/// One page of formatted UV records plus the caller's next cursor state.
#[derive(Debug, Clone)]
pub struct UvPage {
    pub text: String,
    /// Where the owner's session cursor should move: `end` while records
    /// remain, 0 once the forecast is complete.
    pub next_cursor: usize,
    pub is_end: bool,
}

/// Render the `[begin, begin + page_size)` window of a UV forecast.
///
/// `products[0]` supplies the time axis and cloudy-sky series,
/// `products[1]` the clear-sky series. A `begin` at or past the end of the
/// record list (stale session after the upstream forecast shrank) yields an
/// empty page that reports completion.
pub fn format_uv(payload: &Value, begin: usize, page_size: usize, tz: Tz) -> Result<UvPage, Error> {
    let uv: UvPayload = serde_json::from_value(payload.clone())
        .map_err(|e| Error::MalformedPayload(format!("UV data: {}", e)))?;

    if uv.products.len() < 2 {
        return Err(Error::MalformedPayload(format!(
            "UV data: expected cloudy and clear sky products, got {}",
            uv.products.len()
        )));
    }
    let cloudy = &uv.products[0].values;
    let clear = &uv.products[1].values;

    let total = cloudy.len();
    let end = (begin + page_size).min(total);
    let is_end = begin + page_size > total;
    let next_cursor = if is_end { 0 } else { end };

    let mut text = format!("NIWA UV Forecast for location ({}):\n", uv.coord);

    let null = Value::Null;
    for (i, cloudy_value) in cloudy.iter().enumerate().skip(begin).take(page_size) {
        let clear_value = clear.get(i).map(|v| &v.value).unwrap_or(&null);
        let local = cloudy_value.time.with_timezone(&tz);

        text.push_str(&format!("{}\n", local.format("%Y-%m-%d %H:%M")));
        text.push_str(&format!(
            "  Clear sky:  {} ({})\n",
            uv_value_display(clear_value),
            uv_risk(clear_value)
        ));
        text.push_str(&format!(
            "  Cloudy sky: {} ({})\n",
            uv_value_display(&cloudy_value.value),
            uv_risk(&cloudy_value.value)
        ));
    }

    if is_end {
        text.push_str("End of UV forecast.\n");
    } else {
        text.push_str("More UV records available; repeat the request to continue.\n");
    }

    Ok(UvPage {
        text,
        next_cursor,
        is_end,
    })
}
