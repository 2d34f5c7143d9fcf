//! SMTP mailer and email templates

use anyhow::{Context, Result};
use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use crate::routes::ContactRequest;

/// Part-request email sent to the business inbox
#[derive(Template)]
#[template(path = "part_request.html")]
struct PartRequestEmail<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    car_make: &'a str,
    car_model: &'a str,
    car_year: &'a str,
    part_name: &'a str,
    part_number: Option<&'a str>,
    message: Option<&'a str>,
}

/// Confirmation email sent back to the submitter
#[derive(Template)]
#[template(path = "confirmation.html")]
struct ConfirmationEmail<'a> {
    name: &'a str,
    part_name: &'a str,
}

/// Async SMTP mailer
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    business_email: String,
}

impl Mailer {
    /// Build the transport from the environment.
    ///
    /// # Environment Variables
    /// - `SMTP_HOST`: relay host (default: smtp.gmail.com)
    /// - `SMTP_PORT`: relay port (default: 587)
    /// - `SMTP_USER`: account and From address (required)
    /// - `SMTP_PASS`: account password (required)
    /// - `BUSINESS_EMAIL`: part-request recipient (default: `SMTP_USER`)
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port: u16 = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let user = std::env::var("SMTP_USER")
            .map_err(|_| anyhow::anyhow!("SMTP_USER environment variable not set"))?;
        let pass = std::env::var("SMTP_PASS")
            .map_err(|_| anyhow::anyhow!("SMTP_PASS environment variable not set"))?;
        let business_email = std::env::var("BUSINESS_EMAIL").unwrap_or_else(|_| user.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .with_context(|| format!("Failed to configure SMTP relay {host}"))?
            .port(port)
            .credentials(Credentials::new(user.clone(), pass))
            .build();

        Ok(Self {
            transport,
            from: user,
            business_email,
        })
    }

    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("Invalid From address")?)
            .to(to.parse().with_context(|| format!("Invalid recipient {to}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.transport
            .send(email)
            .await
            .with_context(|| format!("Failed to send email to {to}"))?;

        Ok(())
    }

    /// Relay the part request to the business inbox
    pub async fn send_part_request(&self, request: &ContactRequest) -> Result<()> {
        let html = PartRequestEmail {
            name: &request.name,
            email: &request.email,
            phone: &request.phone,
            car_make: &request.car_make,
            car_model: &request.car_model,
            car_year: &request.car_year,
            part_name: &request.part_name,
            part_number: request.part_number.as_deref(),
            message: request.message.as_deref(),
        }
        .render()
        .context("Failed to render part-request template")?;

        let subject = format!("Part Request: {} for {} {}", request.part_name, request.car_make, request.car_model);
        self.send_html(&self.business_email, &subject, html).await
    }

    /// Confirm receipt to the submitter
    pub async fn send_confirmation(&self, request: &ContactRequest) -> Result<()> {
        let html = ConfirmationEmail {
            name: &request.name,
            part_name: &request.part_name,
        }
        .render()
        .context("Failed to render confirmation template")?;

        self.send_html(&request.email, "We received your part request", html)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_request_template_renders_all_fields() {
        let html = PartRequestEmail {
            name: "Asha",
            email: "asha@example.com",
            phone: "9999999999",
            car_make: "Maruti",
            car_model: "Swift",
            car_year: "2018",
            part_name: "Brake pad",
            part_number: Some("BP-1042"),
            message: Some("Need it this week"),
        }
        .render()
        .unwrap();

        for needle in [
            "Asha",
            "asha@example.com",
            "Maruti",
            "Swift",
            "2018",
            "Brake pad",
            "BP-1042",
            "Need it this week",
        ] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn part_request_template_skips_absent_optionals() {
        let html = PartRequestEmail {
            name: "Asha",
            email: "asha@example.com",
            phone: "9999999999",
            car_make: "Maruti",
            car_model: "Swift",
            car_year: "2018",
            part_name: "Brake pad",
            part_number: None,
            message: None,
        }
        .render()
        .unwrap();

        assert!(!html.contains("Part number"));
        assert!(!html.contains("Message"));
    }

    #[test]
    fn confirmation_template_renders() {
        let html = ConfirmationEmail {
            name: "Asha",
            part_name: "Brake pad",
        }
        .render()
        .unwrap();

        assert!(html.contains("Asha"));
        assert!(html.contains("Brake pad"));
    }
}
