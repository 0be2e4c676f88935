//! Lead capture: contact-form validation and best-effort email delivery.
//!
//! A lead is transient: validated, optionally emailed, assigned a random id,
//! and not stored. Mail delivery is fire-and-forget relative to the HTTP
//! response; a transport failure never turns a valid lead into an error.

use serde::Deserialize;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::BotConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Lead {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub brief: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl Lead {
    /// Length/format constraints from the contact form contract. Returns every
    /// violation so the 400 body can name all offending fields at once.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();
        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > 100 {
            problems.push("name must be 1-100 characters");
        }
        let phone_len = self.phone.trim().chars().count();
        if phone_len < 5 || phone_len > 40 {
            problems.push("phone must be 5-40 characters");
        }
        // An omitted email is fine, but any present value must parse, even "".
        if let Some(email) = self.email.as_deref() {
            if !is_email_shaped(email.trim()) {
                problems.push("email is not a valid address");
            }
        }
        if let Some(company) = &self.company {
            if company.chars().count() > 120 {
                problems.push("company must be at most 120 characters");
            }
        }
        let brief_len = self.brief.trim().chars().count();
        if brief_len < 5 || brief_len > 2000 {
            problems.push("brief must be 5-2000 characters");
        }
        if self.session_id.chars().count() < 6 {
            problems.push("sessionId must be at least 6 characters");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

fn is_email_shaped(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// SMTP collaborator for lead notifications. Built only when both an SMTP host
/// and a destination address are configured.
pub struct LeadMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl LeadMailer {
    pub fn from_config(config: &BotConfig) -> Option<Self> {
        let smtp = config.smtp.as_ref()?;
        let to = config.leads_email_to.as_deref()?;

        let from: Mailbox = format!("Assistant Bot <{}>", smtp.user).parse().ok()?;
        let to: Mailbox = to.parse().ok()?;
        let transport = SmtpTransport::relay(&smtp.host)
            .ok()?
            .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
            .build();
        Some(Self { transport, from, to })
    }

    /// Plain-text summary sent to the leads inbox.
    pub fn format_summary(id: &str, lead: &Lead) -> String {
        [
            format!("ID: {}", id),
            format!("Имя: {}", lead.name),
            format!("Телефон: {}", lead.phone),
            format!("Email: {}", lead.email.as_deref().unwrap_or("-")),
            format!("Компания: {}", lead.company.as_deref().unwrap_or("-")),
            format!("Суть: {}", lead.brief),
            format!("Сессия: {}", lead.session_id),
        ]
        .join("\n")
    }

    /// Blocking SMTP send; callers run this off the async runtime
    /// (`spawn_blocking`) and only log failures.
    pub fn send_lead(
        &self,
        id: &str,
        lead: &Lead,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("Новая заявка #{}", id))
            .body(Self::format_summary(id, lead))?;
        self.transport.send(&message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_lead() -> Lead {
        Lead {
            name: "Иван".into(),
            phone: "+7 978 800-27-27".into(),
            email: Some("ivan@example.com".into()),
            company: Some("ООО Ромашка".into()),
            brief: "Нужен корпоративный сайт до конца месяца".into(),
            session_id: "session_123".into(),
        }
    }

    #[test]
    fn test_valid_lead_passes() {
        assert!(valid_lead().validate().is_ok());
    }

    #[test]
    fn test_short_brief_and_phone_are_rejected() {
        let mut lead = valid_lead();
        lead.brief = "сайт".into();
        let err = lead.validate().unwrap_err();
        assert!(err.contains("brief"));

        let mut lead = valid_lead();
        lead.phone = "123".into();
        let err = lead.validate().unwrap_err();
        assert!(err.contains("phone"));
    }

    #[test]
    fn test_multiple_violations_are_all_reported() {
        let lead = Lead {
            name: String::new(),
            phone: "12".into(),
            email: Some("not-an-email".into()),
            company: None,
            brief: "ок".into(),
            session_id: "abc".into(),
        };
        let err = lead.validate().unwrap_err();
        assert!(err.contains("name"));
        assert!(err.contains("phone"));
        assert!(err.contains("email"));
        assert!(err.contains("brief"));
        assert!(err.contains("sessionId"));
    }

    #[test]
    fn test_email_is_optional_but_checked_when_present() {
        let mut lead = valid_lead();
        lead.email = None;
        assert!(lead.validate().is_ok());

        lead.email = Some("has spaces@example.com".into());
        assert!(lead.validate().is_err());
    }

    #[test]
    fn test_present_but_empty_email_is_rejected() {
        let mut lead = valid_lead();
        lead.email = Some(String::new());
        let err = lead.validate().unwrap_err();
        assert!(err.contains("email"));

        lead.email = Some("   ".into());
        assert!(lead.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email_shaped("a@b.ru"));
        assert!(is_email_shaped("user.name@mail.example.com"));
        assert!(!is_email_shaped("@b.ru"));
        assert!(!is_email_shaped("a@b"));
        assert!(!is_email_shaped("a@.ru"));
        assert!(!is_email_shaped("plain"));
    }

    #[test]
    fn test_summary_contains_all_fields() {
        let lead = valid_lead();
        let summary = LeadMailer::format_summary("lead-1", &lead);
        assert!(summary.contains("ID: lead-1"));
        assert!(summary.contains("Имя: Иван"));
        assert!(summary.contains("Телефон: +7 978 800-27-27"));
        assert!(summary.contains("Суть: Нужен корпоративный сайт"));
        assert!(summary.contains("Сессия: session_123"));
    }

    #[test]
    fn test_summary_dashes_for_missing_optionals() {
        let mut lead = valid_lead();
        lead.email = None;
        lead.company = None;
        let summary = LeadMailer::format_summary("x", &lead);
        assert!(summary.contains("Email: -"));
        assert!(summary.contains("Компания: -"));
    }
}
