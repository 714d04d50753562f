//! Google Calendar provider: interactive OAuth grant, token refresh, and
//! fetching today's events.

use anyhow::{Context, Result};
use google_calendar::types::OrderBy;
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use calclock_core::{ClockError, Event, EventTime};

use crate::config::{AccountTokens, GcalConfig};

const REDIRECT_PORT: u16 = 8085;

// Read-only access is all the clock ever needs.
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

/// Create a Google Calendar client from stored tokens
pub fn create_client(config: &GcalConfig, tokens: &AccountTokens) -> Client {
    Client::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        redirect_uri(),
        tokens.access_token.clone(),
        tokens.refresh_token.clone(),
    )
}

/// Run the full interactive OAuth flow: open the consent page in a browser,
/// wait for the localhost callback, and exchange the code for tokens.
pub async fn authenticate(config: &GcalConfig) -> Result<AccountTokens> {
    let mut client = Client::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
    let auth_url = client.user_consent_url(&scopes);

    println!("\nOpen this URL in your browser to grant calendar access:\n");
    println!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = wait_for_callback().await?;

    println!("\nReceived authorization code, exchanging for tokens...");

    let access_token = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange authorization code for tokens")?;

    let expires_at = if access_token.expires_in > 0 {
        Some(chrono::Utc::now() + chrono::Duration::seconds(access_token.expires_in))
    } else {
        None
    };

    println!("Authentication successful!");

    Ok(AccountTokens {
        access_token: access_token.access_token,
        refresh_token: access_token.refresh_token,
        expires_at,
    })
}

/// Refresh an expired access token
pub async fn refresh(config: &GcalConfig, tokens: &AccountTokens) -> Result<AccountTokens> {
    let client = create_client(config, tokens);

    let access_token = client
        .refresh_access_token()
        .await
        .context("Failed to refresh token")?;

    let expires_at = if access_token.expires_in > 0 {
        Some(chrono::Utc::now() + chrono::Duration::seconds(access_token.expires_in))
    } else {
        None
    };

    // Google typically doesn't return a new refresh_token on refresh
    let refresh_token = if access_token.refresh_token.is_empty() {
        tokens.refresh_token.clone()
    } else {
        access_token.refresh_token
    };

    Ok(AccountTokens {
        access_token: access_token.access_token,
        refresh_token,
        expires_at,
    })
}

/// Accept one HTTP request on the redirect port and pull `code` and `state`
/// out of its query string.
async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .with_context(|| format!("Failed to bind OAuth callback listener on port {}", REDIRECT_PORT))?;

    println!("Waiting for OAuth callback on port {}...", REDIRECT_PORT);

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    // Request line looks like: GET /callback?code=xxx&state=yyy HTTP/1.1
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request in OAuth callback"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let query_param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
            .ok_or_else(|| anyhow::anyhow!("No {} in OAuth callback", name))
    };

    let code = query_param("code")?;
    let state = query_param("state")?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>calclock is authorized</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok((code, state))
}

/// Fetch today's remaining events from the configured calendar.
///
/// The window runs from now to 23:59:59 of the current UTC day, with
/// recurring events expanded and server-side ordering by start time, so the
/// returned list is already chronological.
pub async fn fetch_today(
    config: &GcalConfig,
    tokens: &AccountTokens,
) -> Result<Vec<Event>, ClockError> {
    let client = create_client(config, tokens);

    let now = chrono::Utc::now();
    let end_of_day = now.date_naive().and_hms_opt(23, 59, 59).unwrap().and_utc();
    let time_min = now.to_rfc3339();
    let time_max = end_of_day.to_rfc3339();

    let response = client
        .events()
        .list_all(
            &config.calendar_id,
            "",                 // i_cal_uid
            0,                  // max_attendees
            OrderBy::StartTime, // order_by
            &[],                // private_extended_property
            "",                 // q (search query)
            &[],                // shared_extended_property
            false,              // show_deleted
            false,              // show_hidden_invitations
            true,               // single_events: expand recurring events
            &time_max,          // time_max
            &time_min,          // time_min
            "",                 // time_zone
            "",                 // updated_min
        )
        .await
        .map_err(|e| ClockError::Fetch(format!("listing events failed: {e}")))?;

    let mut events = Vec::new();

    for item in response.body {
        if item.status == "cancelled" {
            continue;
        }

        // Use the date-time if present, else the all-day date.
        let Some(start) = item.start else { continue };
        let start = if let Some(dt) = start.date_time {
            EventTime::DateTime(dt)
        } else if let Some(d) = start.date {
            EventTime::Date(d)
        } else {
            continue;
        };

        let summary = if item.summary.is_empty() {
            "(No title)".to_string()
        } else {
            item.summary
        };

        events.push(Event { summary, start });
    }

    Ok(events)
}
