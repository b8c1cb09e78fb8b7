//! One-shot flash messages carried in the session across a redirect.

use tower_sessions::Session;

use crate::models::{FlashMessage, session_keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_flash(
    session: &Session,
    message: FlashMessage,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<FlashMessage> = session
        .get(session_keys::FLASH_MESSAGES)
        .await?
        .unwrap_or_default();
    pending.push(message);
    session.insert(session_keys::FLASH_MESSAGES, pending).await
}

/// Remove and return all queued messages.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take_flashes(
    session: &Session,
) -> Result<Vec<FlashMessage>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH_MESSAGES)
        .await?
        .unwrap_or_default())
}
