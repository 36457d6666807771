//! Outbound email: contact-form notifications, the visitor auto-response and
//! meeting approval requests.

use crate::config::{CompanyConfig, SmtpConfig};
use crate::models::{Contact, MeetingRequest};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the site owner about a new contact-form submission.
    async fn send_contact_notification(&self, contact: &Contact) -> Result<(), AppError>;

    /// Thank the visitor for getting in touch.
    async fn send_contact_auto_response(&self, contact: &Contact) -> Result<(), AppError>;

    /// Ask the site owner to approve a meeting the assistant scheduled.
    async fn send_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError>;
}

/// Human label for the contact form's service slug.
pub fn service_label(service: &str) -> &str {
    match service {
        "saas" => "SaaS",
        "it-consulting" => "IT consulting",
        "telco-consulting" => "Telco consulting",
        "leadership" => "Leadership",
        "pnl-optimization" => "PnL optimisation",
        "company-registration" => "Setting up a company in Sweden",
        _ => "Others",
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap_html(heading: &str, inner: &str, footer: &str) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; border: 1px solid #ddd;">
      <h2 style="color: #00FFD1; border-bottom: 2px solid #00FFD1; padding-bottom: 10px;">{heading}</h2>
      <div style="background-color: white; padding: 20px; margin-top: 20px; border-radius: 5px;">
{inner}
      </div>
      <div style="margin-top: 20px; padding: 15px; background-color: #e8f8f5; border-radius: 5px;">
        <p style="margin: 0; font-size: 12px; color: #666;">{footer}</p>
      </div>
    </div>
  </body>
</html>"#
    )
}

pub fn contact_notification(contact: &Contact, to: &str, company: &CompanyConfig) -> EmailMessage {
    let comment = if contact.comment.trim().is_empty() {
        "No comment provided"
    } else {
        contact.comment.as_str()
    };
    let service = service_label(&contact.service);

    let body_text = format!(
        "New Contact Form Submission\n\nName/Company: {}\nEmail: {}\nPhone: {}\nService Interested: {}\nComment:\n{}\n",
        contact.name, contact.email, contact.phone, service, comment
    );

    let email = escape_html(&contact.email);
    let inner = format!(
        r#"        <p><strong>Name/Company:</strong> {}</p>
        <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
        <p><strong>Phone:</strong> {}</p>
        <p><strong>Service Interested:</strong> {}</p>
        <p><strong>Comment:</strong></p>
        <p style="background-color: #f5f5f5; padding: 15px; border-left: 4px solid #00FFD1;">{}</p>"#,
        escape_html(&contact.name),
        escape_html(&contact.phone),
        escape_html(service),
        escape_html(comment),
    );
    let footer = format!(
        r#"This email was sent from the {} contact form.<br>Please respond to the customer at: <a href="mailto:{email}">{email}</a>"#,
        escape_html(&company.name)
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("New Contact Form Submission from {}", contact.name),
        body_text,
        body_html: wrap_html("New Contact Form Submission", &inner, &footer),
        reply_to: Some(contact.email.clone()),
    }
}

pub fn contact_auto_response(contact: &Contact, company: &CompanyConfig) -> EmailMessage {
    let service = service_label(&contact.service);

    let body_text = format!(
        "Dear {},\n\nThank you for contacting {}. We have received your inquiry about {} and will get back to you as soon as possible.\n\nBest regards,\nThe {} Team\n{}\n{}\n",
        contact.name, company.name, service, company.name, company.contact_email, company.website
    );

    let inner = format!(
        r#"        <p>Dear {},</p>
        <p>Thank you for contacting {}. We have received your inquiry about <strong>{}</strong> and will get back to you as soon as possible.</p>
        <p>Best regards,<br>The {} Team</p>"#,
        escape_html(&contact.name),
        escape_html(&company.name),
        escape_html(service),
        escape_html(&company.name),
    );
    let footer = format!(
        "{} | {}",
        escape_html(&company.contact_email),
        escape_html(&company.website)
    );

    EmailMessage {
        to: contact.email.clone(),
        subject: "Thank You for Contacting MITAICT".to_string(),
        body_text,
        body_html: wrap_html("Thank You for Reaching Out", &inner, &footer),
        reply_to: Some(company.contact_email.clone()),
    }
}

pub fn meeting_request(request: &MeetingRequest, to: &str) -> EmailMessage {
    let phone = request
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or("Not provided");
    let topic = if request.topic.trim().is_empty() {
        "General consultation"
    } else {
        request.topic.as_str()
    };

    let body_text = format!(
        "A visitor requested a meeting through the website chat.\n\nName: {}\nEmail: {}\nPhone: {}\nPreferred time: {}\nTopic: {}\nChat session: {}\n\nPlease review and approve or reject this request in the admin panel.\n",
        request.name, request.email, phone, request.preferred_datetime, topic, request.session_id
    );

    let email = escape_html(&request.email);
    let inner = format!(
        r#"        <p><strong>Name:</strong> {}</p>
        <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
        <p><strong>Phone:</strong> {}</p>
        <p><strong>Preferred time:</strong> {}</p>
        <p><strong>Topic:</strong> {}</p>"#,
        escape_html(&request.name),
        escape_html(phone),
        escape_html(&request.preferred_datetime),
        escape_html(topic),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Meeting Request from {} - Approval Required", request.name),
        body_text,
        body_html: wrap_html(
            "New Meeting Request",
            &inner,
            "Requested via the website chat assistant. Review it in the admin panel.",
        ),
        reply_to: Some(request.email.clone()),
    }
}

pub struct SmtpNotifier {
    config: SmtpConfig,
    company: CompanyConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig, company: CompanyConfig) -> Result<Self, AppError> {
        if !config.enabled {
            tracing::info!("SMTP disabled; outbound email will be skipped");
            return Ok(Self {
                config,
                company,
                transport: None,
            });
        }

        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().clone(),
        );

        let relay = if config.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder = relay.map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to create SMTP relay: {}", e)))?;

        let transport = builder.port(config.port).credentials(creds).build();

        Ok(Self {
            config,
            company,
            transport: Some(transport),
        })
    }

    async fn send(&self, email: EmailMessage) -> Result<(), AppError> {
        let Some(transport) = self.transport.as_ref() else {
            tracing::info!(to = %email.to, subject = %email.subject, "SMTP disabled, email skipped");
            return Ok(());
        };

        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::EmailError(format!("Invalid from address: {}", e)))?;
        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::EmailError(format!("Invalid recipient: {}", e)))?;

        let mut message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            if let Ok(reply_mailbox) = reply_to.parse::<Mailbox>() {
                message_builder = message_builder.reply_to(reply_mailbox);
            }
        }

        let message = message_builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.body_text),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.body_html),
                ),
        )?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::EmailError(format!("Failed to send email: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_contact_notification(&self, contact: &Contact) -> Result<(), AppError> {
        self.send(contact_notification(contact, &self.config.to_email, &self.company))
            .await
    }

    async fn send_contact_auto_response(&self, contact: &Contact) -> Result<(), AppError> {
        self.send(contact_auto_response(contact, &self.company)).await
    }

    async fn send_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError> {
        self.send(meeting_request(request, &self.config.to_email)).await
    }
}

/// Records rendered emails instead of sending them.
pub struct MockNotifier {
    enabled: bool,
    admin_email: String,
    company: CompanyConfig,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockNotifier {
    pub fn new(enabled: bool, admin_email: impl Into<String>, company: CompanyConfig) -> Self {
        Self {
            enabled,
            admin_email: admin_email.into(),
            company,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    async fn record(&self, email: EmailMessage) -> Result<(), AppError> {
        if !self.enabled {
            return Err(AppError::EmailError(
                "Mock notifier is not enabled".to_string(),
            ));
        }
        self.send_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(to = %email.to, subject = %email.subject, "[MOCK] Email would be sent");
        self.sent.lock().await.push(email);
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_contact_notification(&self, contact: &Contact) -> Result<(), AppError> {
        self.record(contact_notification(contact, &self.admin_email, &self.company))
            .await
    }

    async fn send_contact_auto_response(&self, contact: &Contact) -> Result<(), AppError> {
        self.record(contact_auto_response(contact, &self.company)).await
    }

    async fn send_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError> {
        self.record(meeting_request(request, &self.admin_email)).await
    }
}
