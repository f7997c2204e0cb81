use crate::{
    Email, MailerError,
    templates::{LOCKED_USERS, LockedUserLine, PASSWORD_EXPIRATION, TemplateData, TemplateEngine},
};

pub struct PasswordExpirationEmail;

impl PasswordExpirationEmail {
    pub fn subject(left_days: i64) -> String {
        if left_days > 0 {
            format!("Password will expire in {left_days} days")
        } else {
            "Your password expired".to_string()
        }
    }

    pub async fn build<T: TemplateEngine>(
        engine: &T,
        from: &str,
        to: &str,
        uid: &str,
        expire_date: &str,
        left_days: i64,
    ) -> Result<Email, MailerError> {
        let template_data = TemplateData::new()
            .insert("uid", uid)?
            .insert("expire_date", expire_date)?
            .insert("left_days", left_days)?;

        let html_body = engine
            .render_html(PASSWORD_EXPIRATION, template_data.clone())
            .await?;
        let text_body = engine
            .render_text(PASSWORD_EXPIRATION, template_data)
            .await?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(Self::subject(left_days))
            .html_body(html_body)
            .text_body(text_body)
            .build()
    }
}

pub struct LockedUsersEmail;

impl LockedUsersEmail {
    pub const SUBJECT: &'static str = "Locked Users";

    pub async fn build<T: TemplateEngine>(
        engine: &T,
        from: &str,
        to: &str,
        users: &[LockedUserLine],
    ) -> Result<Email, MailerError> {
        let template_data = TemplateData::new().insert("users", users)?;

        let html_body = engine
            .render_html(LOCKED_USERS, template_data.clone())
            .await?;
        let text_body = engine.render_text(LOCKED_USERS, template_data).await?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(Self::SUBJECT)
            .html_body(html_body)
            .text_body(text_body)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::AskamaTemplateEngine;

    #[test]
    fn test_expiration_subject() {
        assert_eq!(
            PasswordExpirationEmail::subject(5),
            "Password will expire in 5 days"
        );
        assert_eq!(PasswordExpirationEmail::subject(0), "Your password expired");
        assert_eq!(PasswordExpirationEmail::subject(-5), "Your password expired");
    }

    #[tokio::test]
    async fn test_password_expiration_email() {
        let engine = AskamaTemplateEngine::new();

        let email = PasswordExpirationEmail::build(
            &engine,
            "noreply@domain.com",
            "alice@domain.com",
            "alice",
            "2026-10-24 12:00:00",
            5,
        )
        .await
        .unwrap();

        assert_eq!(email.to, vec!["alice@domain.com"]);
        assert_eq!(email.from, "noreply@domain.com");
        assert_eq!(email.subject, "Password will expire in 5 days");
        assert_eq!(
            email.text_body.as_deref(),
            Some("Your password will expire on 2026-10-24 12:00:00")
        );
        assert!(email.html_body.is_some());
    }

    #[tokio::test]
    async fn test_expired_password_email() {
        let engine = AskamaTemplateEngine::new();

        let email = PasswordExpirationEmail::build(
            &engine,
            "noreply@domain.com",
            "alice@domain.com",
            "alice",
            "2026-10-14 12:00:00",
            -5,
        )
        .await
        .unwrap();

        assert_eq!(email.subject, "Your password expired");
        assert_eq!(
            email.text_body.as_deref(),
            Some("Your password expired on 2026-10-14 12:00:00")
        );
    }

    #[tokio::test]
    async fn test_locked_users_email() {
        let engine = AskamaTemplateEngine::new();
        let users = vec![
            LockedUserLine::new("user1", &["server1"]),
            LockedUserLine::new("user2", &["server1", "server2"]),
        ];

        let email = LockedUsersEmail::build(&engine, "noreply@domain.com", "admin@domain.com", &users)
            .await
            .unwrap();

        assert_eq!(email.to, vec!["admin@domain.com"]);
        assert_eq!(email.subject, "Locked Users");
        assert_eq!(
            email.text_body.as_deref(),
            Some("Following users are locked\nuser1 blocked on server1\nuser2 blocked on server1, server2")
        );
    }
}
