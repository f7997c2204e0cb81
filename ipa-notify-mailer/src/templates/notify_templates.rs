use crate::{MailerError, templates::TemplateData};
use askama::Template;
use serde::{Deserialize, Serialize};

/// One line of the locked-user digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedUserLine {
    pub uid: String,
    /// Comma separated replica names.
    pub servers: String,
}

impl LockedUserLine {
    pub fn new<S: AsRef<str>>(uid: impl Into<String>, servers: &[S]) -> Self {
        Self {
            uid: uid.into(),
            servers: servers
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Template)]
#[template(
    source = "{% if left_days > 0 %}Your password will expire on {{ expire_date }}{% else %}Your password expired on {{ expire_date }}{% endif %}",
    ext = "txt"
)]
pub struct PasswordExpirationTemplate {
    pub expire_date: String,
    pub left_days: i64,
}

impl PasswordExpirationTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        Ok(Self {
            expire_date: data.require_str("expire_date")?,
            left_days: data.require("left_days")?,
        })
    }
}

#[derive(Template)]
#[template(
    source = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Password expiration</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background-color: #f4f4f4; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .warning { background-color: #fff3cd; border: 1px solid #ffeaa7; padding: 15px; border-radius: 4px; margin: 20px 0; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <p>Hello {{ uid }},</p>

        <div class="warning">
        {% if left_days > 0 %}
            <p>Your password will expire on <strong>{{ expire_date }}</strong> ({{ left_days }} days left).</p>
        {% else %}
            <p>Your password expired on <strong>{{ expire_date }}</strong>.</p>
        {% endif %}
        </div>

        <p>Please change your password before you lose access to your account.</p>

        <div class="footer">
            <p>This email was sent automatically by the identity management notifier.</p>
        </div>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct PasswordExpirationHtmlTemplate {
    pub uid: String,
    pub expire_date: String,
    pub left_days: i64,
}

impl PasswordExpirationHtmlTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        Ok(Self {
            uid: data.require_str("uid")?,
            expire_date: data.require_str("expire_date")?,
            left_days: data.require("left_days")?,
        })
    }
}

#[derive(Template)]
#[template(
    source = "Following users are locked{% for user in users %}
{{ user.uid }} blocked on {{ user.servers }}{% endfor %}",
    ext = "txt"
)]
pub struct LockedUsersTemplate {
    pub users: Vec<LockedUserLine>,
}

impl LockedUsersTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        Ok(Self {
            users: data.require("users")?,
        })
    }
}

#[derive(Template)]
#[template(
    source = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Locked Users</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background-color: #f4f4f4; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        table { border-collapse: collapse; width: 100%; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #eee; }
    </style>
</head>
<body>
    <div class="container">
        <h2>Following users are locked</h2>
        <table>
            <tr><th>User</th><th>Blocked on</th></tr>
            {% for user in users %}
            <tr><td>{{ user.uid }}</td><td>{{ user.servers }}</td></tr>
            {% endfor %}
        </table>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct LockedUsersHtmlTemplate {
    pub users: Vec<LockedUserLine>,
}

impl LockedUsersHtmlTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        Ok(Self {
            users: data.require("users")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_user_line_joins_servers() {
        let line = LockedUserLine::new("user2", &["ipa1.domain.com", "ipa2.domain.com"]);
        assert_eq!(line.servers, "ipa1.domain.com, ipa2.domain.com");
    }

    #[test]
    fn test_expiration_text_future() {
        let text = PasswordExpirationTemplate {
            expire_date: "2026-10-24 12:00:00".to_string(),
            left_days: 5,
        }
        .render()
        .unwrap();

        assert_eq!(text, "Your password will expire on 2026-10-24 12:00:00");
    }

    #[test]
    fn test_expiration_text_past() {
        let text = PasswordExpirationTemplate {
            expire_date: "2026-10-14 12:00:00".to_string(),
            left_days: -5,
        }
        .render()
        .unwrap();

        assert_eq!(text, "Your password expired on 2026-10-14 12:00:00");
    }

    #[test]
    fn test_locked_users_text() {
        let text = LockedUsersTemplate {
            users: vec![
                LockedUserLine::new("user1", &["server1"]),
                LockedUserLine::new("user2", &["server1", "server2"]),
            ],
        }
        .render()
        .unwrap();

        assert_eq!(
            text,
            "Following users are locked\nuser1 blocked on server1\nuser2 blocked on server1, server2"
        );
    }

    #[test]
    fn test_html_escapes_uid() {
        let html = LockedUsersHtmlTemplate {
            users: vec![LockedUserLine::new("<script>", &["server1"])],
        }
        .render()
        .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<td><script>"));
    }
}
