//! Order notification emails.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Every
//! order sends one confirmation to the customer and one notification to
//! each configured admin recipient, fanned out concurrently.

use askama::Template;
use futures::future::join_all;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::OrderConfirmation;

/// HTML template for the customer confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    view: &'a OrderEmailView,
}

/// Plain text template for the customer confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    view: &'a OrderEmailView,
}

/// HTML template for the admin notification email.
#[derive(Template)]
#[template(path = "email/order_notification.html")]
struct OrderNotificationHtml<'a> {
    view: &'a OrderEmailView,
}

/// Plain text template for the admin notification email.
#[derive(Template)]
#[template(path = "email/order_notification.txt")]
struct OrderNotificationText<'a> {
    view: &'a OrderEmailView,
}

/// Errors that can occur when sending order emails.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// SMTP settings are absent from the environment.
    #[error("Email configuration is missing")]
    NotConfigured,

    /// SMTP server rejected the connection check.
    #[error("SMTP connection check failed")]
    ConnectionFailed,

    /// Some of the fanned-out sends failed.
    #[error("Sent {sent} of {} order emails", sent + failed)]
    PartialDelivery {
        /// Emails delivered.
        sent: usize,
        /// Emails that failed.
        failed: usize,
    },
}

/// Pre-rendered view of an order for email templates.
#[derive(Debug)]
struct OrderEmailView {
    order_code: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    address_line: String,
    region_en: String,
    region_ar: String,
    user_note: Option<String>,
    lines: Vec<OrderEmailLine>,
    subtotal: String,
    shipping: String,
    total: String,
}

#[derive(Debug)]
struct OrderEmailLine {
    name_en: String,
    name_ar: String,
    sku: String,
    quantity: u32,
    unit_price: String,
    line_total: String,
}

impl OrderEmailView {
    fn from_confirmation(confirmation: &OrderConfirmation) -> Self {
        let lines = confirmation
            .lines
            .iter()
            .map(|line| OrderEmailLine {
                name_en: line.name_en.clone(),
                name_ar: line.name_ar.clone(),
                sku: line.sku.clone(),
                quantity: line.quantity,
                unit_price: format_aed(line.unit_price),
                line_total: format_aed(line.line_total()),
            })
            .collect();

        Self {
            order_code: confirmation.order.code.to_string(),
            customer_name: confirmation.customer.full_name.clone(),
            customer_email: confirmation.customer.email.to_string(),
            customer_phone: confirmation.customer.phone.clone(),
            address_line: confirmation.address.address_line.clone(),
            region_en: confirmation.region_name_en.clone(),
            region_ar: confirmation.region_name_ar.clone(),
            user_note: confirmation.order.user_note.clone(),
            lines,
            subtotal: format_aed(confirmation.order.subtotal),
            shipping: format_aed(confirmation.order.shipping),
            total: format_aed(confirmation.order.total_price),
        }
    }
}

/// Format a money amount in dirhams.
fn format_aed(amount: Decimal) -> String {
    format!("AED {amount:.2}")
}

struct Inner {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    admin_recipients: Vec<String>,
}

/// Email service for order confirmations and admin notifications.
///
/// Built without SMTP settings it stays disabled and every send fails
/// with [`EmailError::NotConfigured`].
#[derive(Clone)]
pub struct EmailService {
    inner: Option<std::sync::Arc<Inner>>,
}

impl EmailService {
    /// Create a new email service from optional configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be constructed.
    pub fn new(config: Option<&EmailConfig>) -> Result<Self, SmtpError> {
        let Some(config) = config else {
            return Ok(Self { inner: None });
        };

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            inner: Some(std::sync::Arc::new(Inner {
                mailer,
                from_address: config.from_address.clone(),
                admin_recipients: config.admin_recipients.clone(),
            })),
        })
    }

    /// Whether SMTP settings were provided.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Send the customer confirmation and all admin notifications for an order.
    ///
    /// All recipients are attempted even when earlier sends fail; the result
    /// is `Ok` only when every send succeeded.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::NotConfigured` when SMTP settings are absent.
    /// Returns `EmailError::ConnectionFailed` when the SMTP check fails.
    /// Returns `EmailError::PartialDelivery` when some sends failed.
    pub async fn send_order_emails(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), EmailError> {
        let Some(inner) = &self.inner else {
            return Err(EmailError::NotConfigured);
        };

        if !inner.mailer.test_connection().await? {
            return Err(EmailError::ConnectionFailed);
        }

        let view = OrderEmailView::from_confirmation(confirmation);

        let confirmation_html = OrderConfirmationHtml { view: &view }.render()?;
        let confirmation_text = OrderConfirmationText { view: &view }.render()?;
        let notification_html = OrderNotificationHtml { view: &view }.render()?;
        let notification_text = OrderNotificationText { view: &view }.render()?;

        let customer_subject = format!("Order confirmation {} | تأكيد الطلب", view.order_code);
        let admin_subject = format!("New order {}", view.order_code);

        let mut messages = vec![build_multipart_message(
            &inner.from_address,
            &view.customer_email,
            &customer_subject,
            &confirmation_text,
            &confirmation_html,
        )?];
        for recipient in &inner.admin_recipients {
            messages.push(build_multipart_message(
                &inner.from_address,
                recipient,
                &admin_subject,
                &notification_text,
                &notification_html,
            )?);
        }

        let total = messages.len();
        let results = join_all(messages.into_iter().map(|m| inner.mailer.send(m))).await;

        let mut failed = 0usize;
        for result in results {
            if let Err(e) = result {
                failed += 1;
                tracing::warn!(error = %e, order_code = %view.order_code, "Order email failed");
            }
        }

        if failed > 0 {
            return Err(EmailError::PartialDelivery {
                sent: total - failed,
                failed,
            });
        }

        tracing::info!(order_code = %view.order_code, recipients = total, "Order emails sent");
        Ok(())
    }
}

/// Build a multipart email with both plain text and HTML versions.
fn build_multipart_message(
    from: &str,
    to: &str,
    subject: &str,
    text_body: &str,
    html_body: &str,
) -> Result<Message, EmailError> {
    let message = Message::builder()
        .from(
            from.parse()
                .map_err(|_| EmailError::InvalidAddress(from.to_owned()))?,
        )
        .to(to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_owned()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_owned()),
                ),
        )?;

    Ok(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    use sidra_core::{
        AddressId, CustomerId, Email, OrderCode, OrderId, OrderStatus, PaymentMethod, UserId,
    };

    use crate::models::{Address, Customer, Order, OrderConfirmationLine};

    fn sample_confirmation() -> OrderConfirmation {
        let now = Utc::now();
        OrderConfirmation {
            order: Order {
                id: OrderId::new(7),
                code: OrderCode::generate(),
                status: OrderStatus::Confirmed,
                subtotal: Decimal::from(130),
                shipping: Decimal::from(20),
                total_price: Decimal::from(150),
                payment_method: PaymentMethod::Cash,
                customer_id: Some(CustomerId::new(3)),
                address_id: Some(AddressId::new(5)),
                user_note: Some("Ring the bell".to_owned()),
                created_at: now,
                updated_at: now,
            },
            lines: vec![OrderConfirmationLine {
                name_en: "Sidr Honey".to_owned(),
                name_ar: "عسل السدر".to_owned(),
                sku: "HNY-001".to_owned(),
                quantity: 2,
                unit_price: Decimal::from(65),
            }],
            customer: Customer {
                id: CustomerId::new(3),
                user_id: UserId::new(9),
                full_name: "Maryam Al Ali".to_owned(),
                phone: "+971501234567".to_owned(),
                email: Email::parse("maryam@example.com").unwrap(),
                created_at: now,
            },
            address: Address {
                id: AddressId::new(5),
                customer_id: CustomerId::new(3),
                full_name: "Maryam Al Ali".to_owned(),
                phone: "+971501234567".to_owned(),
                address_line: "Villa 12, Al Wasl Road".to_owned(),
                region_code: "DXB".to_owned(),
                notes: None,
                is_default: true,
                created_at: now,
            },
            region_name_en: "Dubai".to_owned(),
            region_name_ar: "دبي".to_owned(),
        }
    }

    #[test]
    fn test_format_aed_pads_to_two_decimals() {
        assert_eq!(format_aed(Decimal::from(150)), "AED 150.00");
        assert_eq!(format_aed(Decimal::new(125, 1)), "AED 12.50");
    }

    #[test]
    fn test_view_carries_totals_and_line_math() {
        let view = OrderEmailView::from_confirmation(&sample_confirmation());
        assert_eq!(view.subtotal, "AED 130.00");
        assert_eq!(view.shipping, "AED 20.00");
        assert_eq!(view.total, "AED 150.00");
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].line_total, "AED 130.00");
        assert_eq!(view.region_ar, "دبي");
    }

    #[test]
    fn test_templates_render_bilingual_content() {
        let view = OrderEmailView::from_confirmation(&sample_confirmation());

        let html = OrderConfirmationHtml { view: &view }.render().unwrap();
        assert!(html.contains(&view.order_code));
        assert!(html.contains("عسل السدر"));
        assert!(html.contains("AED 150.00"));

        let text = OrderNotificationText { view: &view }.render().unwrap();
        assert!(text.contains(&view.order_code));
        assert!(text.contains("Maryam Al Ali"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_reports_missing_configuration() {
        let service = EmailService::new(None).unwrap();
        assert!(!service.is_configured());

        let err = service
            .send_order_emails(&sample_confirmation())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email configuration is missing");
    }
}
