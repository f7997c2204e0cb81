use crate::{MailerError, templates::TemplateData};
use askama::Template;
use async_trait::async_trait;

pub const PASSWORD_EXPIRATION: &str = "password_expiration";
pub const LOCKED_USERS: &str = "locked_users";

#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn render(&self, template_name: &str, data: TemplateData) -> Result<String, MailerError>;
    async fn render_html(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError>;
    async fn render_text(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError>;
}

/// Renders the compiled-in notification templates.
#[derive(Debug, Clone, Default)]
pub struct AskamaTemplateEngine;

impl AskamaTemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TemplateEngine for AskamaTemplateEngine {
    async fn render(&self, template_name: &str, data: TemplateData) -> Result<String, MailerError> {
        self.render_text(template_name, data).await
    }

    async fn render_html(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError> {
        match template_name {
            PASSWORD_EXPIRATION => {
                let template = crate::templates::PasswordExpirationHtmlTemplate::from_data(&data)?;
                Ok(template.render()?)
            }
            LOCKED_USERS => {
                let template = crate::templates::LockedUsersHtmlTemplate::from_data(&data)?;
                Ok(template.render()?)
            }
            other => Err(MailerError::UnknownTemplate(other.to_string())),
        }
    }

    async fn render_text(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError> {
        match template_name {
            PASSWORD_EXPIRATION => {
                let template = crate::templates::PasswordExpirationTemplate::from_data(&data)?;
                Ok(template.render()?)
            }
            LOCKED_USERS => {
                let template = crate::templates::LockedUsersTemplate::from_data(&data)?;
                Ok(template.render()?)
            }
            other => Err(MailerError::UnknownTemplate(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::LockedUserLine;

    #[tokio::test]
    async fn test_render_expiration() {
        let engine = AskamaTemplateEngine::new();
        let data = TemplateData::new()
            .insert("uid", "alice")
            .unwrap()
            .insert("expire_date", "2026-10-22 08:30:00")
            .unwrap()
            .insert("left_days", 3)
            .unwrap();

        let text = engine
            .render_text(PASSWORD_EXPIRATION, data.clone())
            .await
            .unwrap();
        assert_eq!(text, "Your password will expire on 2026-10-22 08:30:00");

        let html = engine.render_html(PASSWORD_EXPIRATION, data).await.unwrap();
        assert!(html.contains("Hello alice,"));
        assert!(html.contains("3 days left"));
    }

    #[tokio::test]
    async fn test_render_locked_users() {
        let engine = AskamaTemplateEngine::new();
        let data = TemplateData::new()
            .insert(
                "users",
                vec![LockedUserLine::new("bob", &["ipa1.domain.com"])],
            )
            .unwrap();

        let text = engine.render(LOCKED_USERS, data).await.unwrap();
        assert_eq!(text, "Following users are locked\nbob blocked on ipa1.domain.com");
    }

    #[tokio::test]
    async fn test_missing_field() {
        let engine = AskamaTemplateEngine::new();
        let data = TemplateData::new().insert("left_days", 1).unwrap();

        let result = engine.render_text(PASSWORD_EXPIRATION, data).await;
        assert!(matches!(result, Err(MailerError::Builder(_))));
    }

    #[tokio::test]
    async fn test_unknown_template() {
        let engine = AskamaTemplateEngine::new();
        let result = engine.render_text("welcome", TemplateData::new()).await;
        assert!(matches!(result, Err(MailerError::UnknownTemplate(name)) if name == "welcome"));
    }
}
