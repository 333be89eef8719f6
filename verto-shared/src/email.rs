/// Outbound email
///
/// SMTP delivery via lettre. The transport is optional: when SMTP is
/// not configured the mailer runs in log-only mode, printing what it
/// would have sent — invite links stay reachable in development
/// through the server logs.
///
/// Two messages leave this system: project invites (token link) and
/// release-update notifications (collaborator fan-out). Whether a
/// failed invite send fails the request is the caller's decision; see
/// [`crate::invites::create_invite`].

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, warn};

/// Error type for email operations
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Recipient or sender address failed to parse
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Message construction failed
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP delivery failed
    #[error("Failed to send email: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP configuration for the mailer
///
/// `host == None` disables delivery entirely (log-only mode).
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP server hostname; None disables sending
    pub smtp_host: Option<String>,

    /// SMTP port (587 STARTTLS by convention, 465 implicit TLS)
    pub smtp_port: u16,

    /// Use implicit TLS instead of STARTTLS
    pub smtp_secure: bool,

    /// Optional SMTP credentials
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,

    /// From header, e.g. "Verto <no-reply@verto.app>"
    pub from: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            smtp_secure: false,
            smtp_username: None,
            smtp_password: None,
            from: "Verto <no-reply@verto.app>".to_string(),
        }
    }
}

/// Template data for a project invite email
#[derive(Debug, Clone)]
pub struct ProjectInviteEmail {
    /// Full acceptance URL carrying the token
    pub invite_link: String,

    /// Project display name
    pub project_name: String,

    /// Email of the user who sent the invite
    pub inviter_email: String,
}

/// Template data for a release-update notification
#[derive(Debug, Clone)]
pub struct ReleaseUpdateEmail {
    pub project_name: String,
    pub environment: String,
    pub version: String,
    pub updated_by: String,
}

/// Outbound mailer
///
/// Cheap to clone; the SMTP transport pools connections internally.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    /// Builds a mailer from configuration
    ///
    /// Missing SMTP host yields a log-only mailer rather than an
    /// error, so the service runs without email infrastructure.
    pub fn new(config: MailerConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from.parse()?;

        let transport = match &config.smtp_host {
            None => {
                warn!("SMTP configuration missing, emails will be logged instead of sent");
                None
            }
            Some(host) => {
                let mut builder = if config.smtp_secure {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                };

                builder = builder.port(config.smtp_port);

                if let (Some(user), Some(pass)) =
                    (config.smtp_username.clone(), config.smtp_password.clone())
                {
                    builder = builder.credentials(Credentials::new(user, pass));
                }

                Some(builder.build())
            }
        };

        Ok(Self { transport, from })
    }

    /// Sends a project invite email
    ///
    /// In log-only mode the invite link is written to the log at WARN
    /// so it can be copied out during development.
    pub async fn send_project_invite(
        &self,
        recipient: &str,
        template: &ProjectInviteEmail,
    ) -> Result<(), EmailError> {
        let Some(transport) = &self.transport else {
            warn!(
                recipient,
                invite_link = %template.invite_link,
                "email transport not configured, logging invite instead"
            );
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse()?)
            .subject(format!(
                "You're invited to collaborate on {}",
                template.project_name
            ))
            .multipart(MultiPart::alternative_plain_html(
                invite_plain_text(template),
                invite_html(template),
            ))?;

        if let Err(e) = transport.send(message).await {
            error!(recipient, error = %e, "failed to send invite email");
            return Err(e.into());
        }

        Ok(())
    }

    /// Sends a release-update notification
    ///
    /// Callers treat this as best-effort; see the release upsert flow.
    pub async fn send_release_update(
        &self,
        recipient: &str,
        template: &ReleaseUpdateEmail,
    ) -> Result<(), EmailError> {
        let Some(transport) = &self.transport else {
            warn!(
                recipient,
                project = %template.project_name,
                "email transport not configured, skipping release notification"
            );
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse()?)
            .subject(format!(
                "{} released {} to {}",
                template.project_name, template.version, template.environment
            ))
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(release_update_plain_text(template)),
            )?;

        if let Err(e) = transport.send(message).await {
            error!(recipient, error = %e, "failed to send release notification");
            return Err(e.into());
        }

        Ok(())
    }
}

fn invite_plain_text(template: &ProjectInviteEmail) -> String {
    [
        format!(
            "{} invited you to collaborate on {}.",
            template.inviter_email, template.project_name
        ),
        "Click the link below to accept the invitation:".to_string(),
        template.invite_link.clone(),
        String::new(),
        "If you did not expect this email, you can ignore it.".to_string(),
    ]
    .join("\n")
}

fn invite_html(template: &ProjectInviteEmail) -> String {
    format!(
        "<p><strong>{inviter}</strong> invited you to collaborate on <strong>{project}</strong>.</p>\
         <p><a href=\"{link}\" target=\"_blank\" rel=\"noopener\">Accept invitation</a></p>\
         <p style=\"font-size: 12px; color: #555;\">If the button above does not work, copy and \
         paste this link into your browser:<br>{link}</p>",
        inviter = template.inviter_email,
        project = template.project_name,
        link = template.invite_link,
    )
}

fn release_update_plain_text(template: &ReleaseUpdateEmail) -> String {
    format!(
        "{updated_by} updated {project}: version {version} is now on {environment}.",
        updated_by = template.updated_by,
        project = template.project_name,
        version = template.version,
        environment = template.environment,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invite_template() -> ProjectInviteEmail {
        ProjectInviteEmail {
            invite_link: "http://localhost:5173/?inviteToken=abc123".to_string(),
            project_name: "Acme Corp".to_string(),
            inviter_email: "owner@acme.com".to_string(),
        }
    }

    #[test]
    fn test_invite_plain_text_contains_link_and_inviter() {
        let text = invite_plain_text(&invite_template());
        assert!(text.contains("owner@acme.com"));
        assert!(text.contains("Acme Corp"));
        assert!(text.contains("http://localhost:5173/?inviteToken=abc123"));
    }

    #[test]
    fn test_invite_html_repeats_link_for_copy_paste() {
        let html = invite_html(&invite_template());
        assert_eq!(html.matches("http://localhost:5173/?inviteToken=abc123").count(), 2);
    }

    #[test]
    fn test_release_update_text() {
        let text = release_update_plain_text(&ReleaseUpdateEmail {
            project_name: "Acme Corp".to_string(),
            environment: "prod".to_string(),
            version: "1.4.2".to_string(),
            updated_by: "owner@acme.com".to_string(),
        });

        assert!(text.contains("prod"));
        assert!(text.contains("1.4.2"));
    }

    #[test]
    fn test_log_only_mailer_sends_nothing_and_succeeds() {
        let mailer = Mailer::new(MailerConfig::default()).unwrap();
        assert!(mailer.transport.is_none());
    }

    #[test]
    fn test_invalid_from_address_rejected() {
        let config = MailerConfig {
            from: "not an address".to_string(),
            ..Default::default()
        };

        assert!(Mailer::new(config).is_err());
    }
}
