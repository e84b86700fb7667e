use axum::extract::State;
use axum::Json;

use crate::dto::ContactRequest;
use crate::error::AppError;
use crate::state::AppState;

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Contact form relay. The email to the site owner is the primary action;
/// the mailing-list signup is best-effort and never fails the request.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.name.trim().is_empty() || body.message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and message are required".to_string(),
        ));
    }
    if !looks_like_email(&body.email) {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }

    let recipient = &state.config.email.contact_recipient;
    if recipient.is_empty() {
        return Err(AppError::ServiceUnavailable(
            "Contact form is not configured".to_string(),
        ));
    }

    let subject = format!("Website contact from {}", body.name.trim());
    let html = format!(
        "<p><strong>{}</strong> &lt;{}&gt; wrote:</p><p>{}</p>",
        escape_html(body.name.trim()),
        escape_html(&body.email),
        escape_html(body.message.trim()).replace('\n', "<br>")
    );

    state
        .email
        .send(recipient, &subject, &html, Some(&body.email))
        .await
        .map_err(|e| AppError::Upstream(format!("contact email: {e}")))?;

    if body.subscribe {
        if let Err(e) = state
            .mailing_list
            .create_subscriber(&body.email, Some(body.name.trim()))
            .await
        {
            // Best-effort: a failed signup must not fail the contact action.
            tracing::warn!("Mailing-list signup during contact failed: {e:#}");
        }
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("reader@example.com"));
        assert!(!looks_like_email("reader"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("reader@nodot"));
        assert!(!looks_like_email("reader@.com"));
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }
}
