use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::error::ApiError;
use crate::messages::StoredMessage;
use crate::routes::AppState;

pub async fn index() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html lang="de">
<head><meta charset="utf-8"><title>Flugbasar</title></head>
<body>
  <h1>Flugbasar</h1>
  <p>Flüge, Wetter und Sehenswürdigkeiten für dein Reiseziel.</p>
  <ul>
    <li><code>GET /flights/&lt;dep&gt;/&lt;arr&gt;</code> – Flugverbindungen</li>
    <li><code>GET /api/weather?city=Z%C3%BCrich</code> – Wetter und 5-Tage-Prognose</li>
    <li><code>GET /api/places?city=Z%C3%BCrich</code> – Sehenswürdigkeiten</li>
    <li><code>GET /time</code> – Serverzeit</li>
  </ul>
  <p><a href="/kontakt">Kontakt</a> · <a href="/messages">Nachrichten</a></p>
  <p id="server-time"></p>
</body>
</html>"#,
    )
}

#[derive(Debug, Deserialize)]
pub struct KontaktPageQuery {
    pub sent: Option<u8>,
}

pub async fn kontakt(Query(query): Query<KontaktPageQuery>) -> Html<String> {
    let notice = if query.sent.is_some() {
        "<p><strong>Danke! Deine Nachricht wurde gespeichert.</strong></p>"
    } else {
        ""
    };

    Html(format!(
        r#"<!doctype html>
<html lang="de">
<head><meta charset="utf-8"><title>Kontakt – Flugbasar</title></head>
<body>
  <h1>Kontakt</h1>
  {notice}
  <form method="post" action="/kontakt">
    <label>Name <input name="name" required></label><br>
    <label>E-Mail <input name="email" type="email" required></label><br>
    <label>Nachricht <textarea name="nachricht" required></textarea></label><br>
    <button type="submit">Absenden</button>
  </form>
  <p><a href="/">Zurück</a></p>
</body>
</html>"#
    ))
}

#[derive(Debug, Deserialize)]
pub struct KontaktForm {
    pub name: String,
    pub email: String,
    pub nachricht: String,
}

pub async fn kontakt_submit(
    State(state): State<AppState>,
    Form(form): Form<KontaktForm>,
) -> Result<Redirect, ApiError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let nachricht = form.nachricht.trim();

    if name.is_empty() || email.is_empty() || nachricht.is_empty() {
        return Err(ApiError::Validation(
            "Name, E-Mail und Nachricht sind erforderlich".to_string(),
        ));
    }

    let id = state.messages.save(name, email, nachricht).await?;
    tracing::info!("stored contact message {id}");

    Ok(Redirect::to("/kontakt?sent=1"))
}

pub async fn messages_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let messages = state.messages.list().await?;
    Ok(Html(render_messages(&messages)))
}

fn render_messages(messages: &[StoredMessage]) -> String {
    let mut items = String::new();
    for message in messages {
        items.push_str(&format!(
            "<li><strong>{}</strong> &lt;{}&gt; – {}<br>{}</li>\n",
            html_escape::encode_text(&message.record.name),
            html_escape::encode_text(&message.record.email),
            html_escape::encode_text(&message.record.sent_at),
            html_escape::encode_text(&message.record.nachricht),
        ));
    }

    if items.is_empty() {
        items.push_str("<li>Noch keine Nachrichten.</li>\n");
    }

    format!(
        r#"<!doctype html>
<html lang="de">
<head><meta charset="utf-8"><title>Nachrichten – Flugbasar</title></head>
<body>
  <h1>Nachrichten</h1>
  <ul>
{items}  </ul>
  <p><a href="/">Zurück</a></p>
</body>
</html>"#
    )
}
