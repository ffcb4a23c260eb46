//! Visit counter handler.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use booth_models::VisitStats;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::metrics;
use crate::security::{is_bot, is_valid_visitor_id, VISITOR_COOKIE};
use crate::state::AppState;

/// Count a pageview and report pv/uv.
///
/// Bots get readings without being counted. A visitor without a usable
/// `v_id` cookie is issued one that lives for a year.
pub async fn record_visit(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> ApiResult<(CookieJar, Json<VisitStats>)> {
    let existing = jar
        .get(VISITOR_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| is_valid_visitor_id(v));

    let (visitor_id, issued) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let bot = is_bot(user_agent);
    metrics::record_visit(bot);

    let stats = if bot {
        state.visits.read().await?
    } else {
        state.visits.record(&visitor_id).await?
    };

    let jar = if issued {
        jar.add(visitor_cookie(visitor_id))
    } else {
        jar
    };

    Ok((jar, Json(stats)))
}

fn visitor_cookie(id: String) -> Cookie<'static> {
    Cookie::build((VISITOR_COOKIE, id))
        .path("/")
        .max_age(time::Duration::days(365))
        .same_site(SameSite::Lax)
        .http_only(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_cookie_attributes() {
        let rendered = visitor_cookie("abc".to_string()).to_string();
        assert!(rendered.starts_with("v_id=abc"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=31536000"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("HttpOnly"));
    }
}
