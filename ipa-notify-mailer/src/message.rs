//! Conversion of [`Email`] into a lettre [`Message`], shared by all transports.
use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};

pub fn build_message(email: Email) -> Result<Message, MailerError> {
    email.validate()?;

    let mut message_builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject);

    for to in email.to {
        message_builder = message_builder.to(to.parse()?);
    }

    if let Some(reply_to) = email.reply_to {
        message_builder = message_builder.reply_to(reply_to.parse()?);
    }

    // Both parts present means multipart/alternative, text first
    let message = match (email.text_body, email.html_body) {
        (Some(text), Some(html)) => message_builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text))
                .singlepart(SinglePart::html(html)),
        )?,
        (Some(text), None) => message_builder
            .header(ContentType::TEXT_PLAIN)
            .body(text)?,
        (None, Some(html)) => message_builder
            .header(ContentType::TEXT_HTML)
            .body(html)?,
        (None, None) => {
            return Err(MailerError::Builder("No email body provided".to_string()));
        }
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(text: Option<&str>, html: Option<&str>) -> Email {
        Email {
            to: vec!["admin@domain.com".to_string()],
            from: "IPA Notifier <noreply@domain.com>".to_string(),
            reply_to: None,
            subject: "Locked Users".to_string(),
            html_body: html.map(str::to_string),
            text_body: text.map(str::to_string),
        }
    }

    #[test]
    fn test_build_multipart_message() {
        let message = build_message(email(
            Some("Following users are locked"),
            Some("<p>Following users are locked</p>"),
        ))
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Locked Users"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("To: admin@domain.com"));
    }

    #[test]
    fn test_build_text_only_message() {
        let message = build_message(email(Some("Following users are locked"), None)).unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("Following users are locked"));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut invalid = email(Some("body"), None);
        invalid.to = vec!["not an address".to_string()];

        assert!(matches!(
            build_message(invalid),
            Err(MailerError::Address(_))
        ));
    }

    #[test]
    fn test_missing_body_is_rejected() {
        assert!(matches!(
            build_message(email(None, None)),
            Err(MailerError::Builder(_))
        ));
    }
}
