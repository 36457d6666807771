//! System prompt for the sales assistant, rebuilt from store content on
//! every turn.

use super::store::ContentStore;
use crate::config::CompanyConfig;
use crate::models::{AboutContent, SaasProduct, Service};
use service_core::error::AppError;
use std::fmt::Write;
use std::sync::Arc;

const FALLBACK_SERVICES: [(&str, &str); 3] = [
    (
        "IT and Telecommunication Consulting",
        "Infrastructure, network optimization, and advanced solutions.",
    ),
    (
        "Company Registration in Sweden",
        "Complete support for business setup in Sweden.",
    ),
    (
        "Leading Teams",
        "Expert leadership consulting for sales and engineering teams.",
    ),
];

const FALLBACK_PRODUCTS: [(&str, &str); 3] = [
    ("MITACRM", "CRM solution for modern businesses"),
    ("Routing System", "Advanced routing for telecommunications"),
    ("White Label Software", "Customizable solutions"),
];

const DEFAULT_YEARS_EXPERIENCE: &str = "20+";

#[derive(Clone)]
pub struct PromptBuilder {
    content: Arc<dyn ContentStore>,
    company: CompanyConfig,
}

impl PromptBuilder {
    pub fn new(content: Arc<dyn ContentStore>, company: CompanyConfig) -> Self {
        Self { content, company }
    }

    /// Read the current catalog and compose the prompt. Store errors
    /// propagate.
    pub async fn build(&self) -> Result<String, AppError> {
        let services = self.content.list_services().await?;
        let products = self.content.list_products().await?;
        let about = self.content.get_about().await?;
        Ok(compose_system_prompt(
            &self.company,
            &services,
            &products,
            about.as_ref(),
        ))
    }
}

fn about_section(company: &CompanyConfig, about: Option<&AboutContent>) -> String {
    match about {
        Some(about) => format!(
            "About Us:\n- Company: {}\n- Experience: {} years in IT and telecommunications\n- {}\n",
            about.company_name.as_deref().unwrap_or(&company.name),
            about
                .years_experience
                .as_deref()
                .filter(|y| !y.trim().is_empty())
                .unwrap_or(DEFAULT_YEARS_EXPERIENCE),
            about.description.as_deref().unwrap_or_default(),
        ),
        None => format!(
            "About Us: {} is a consulting company with {} years of experience in IT and telecommunications.",
            company.name, DEFAULT_YEARS_EXPERIENCE
        ),
    }
}

fn services_section(services: &[Service]) -> String {
    let mut out = String::from("Our Services:\n");
    if services.is_empty() {
        for (i, (title, description)) in FALLBACK_SERVICES.iter().enumerate() {
            let _ = writeln!(out, "{}. {} - {}", i + 1, title, description);
        }
    } else {
        for (i, service) in services.iter().enumerate() {
            let _ = writeln!(out, "{}. {} - {}", i + 1, service.title, service.description);
        }
    }
    out
}

fn products_section(products: &[SaasProduct]) -> String {
    let mut out = String::from("Our SaaS Products:\n");
    if products.is_empty() {
        for (i, (name, description)) in FALLBACK_PRODUCTS.iter().enumerate() {
            let _ = writeln!(out, "{}. {} - {}", i + 1, name, description);
        }
    } else {
        for (i, product) in products.iter().enumerate() {
            let _ = write!(out, "{}. {} - {}", i + 1, product.name, product.description);
            if let Some(price) = product.price.as_deref().filter(|p| !p.trim().is_empty()) {
                let _ = write!(out, " (Starting at {})", price);
            }
            out.push('\n');
        }
    }
    out
}

/// Pure formatting over an already-loaded catalog.
pub fn compose_system_prompt(
    company: &CompanyConfig,
    services: &[Service],
    products: &[SaasProduct],
    about: Option<&AboutContent>,
) -> String {
    let name = &company.name;
    let contact = &company.contact_email;

    format!(
        r#"You are a friendly and professional sales assistant for {name}. Your goal is to help visitors understand our services and guide them toward scheduling a meeting.

{about}

{services}
{products}

MEETING SCHEDULING - IMPORTANT:
When a user wants to schedule a meeting or consultation:
1. Ask for their name if you don't have it
2. Ask for their email address
3. Ask for their preferred date and time (be flexible, suggest "this week" or "next week" options)
4. Optionally ask what they'd like to discuss

Once you have name, email, and preferred time, respond with EXACTLY this format (the system will detect it):
"MEETING_REQUEST: [name] | [email] | [preferred_datetime] | [topic]"

Then immediately follow with a friendly confirmation like:
"Perfect! I've submitted your meeting request. Our team at {contact} will review it and confirm the time slot with you shortly. Is there anything else I can help you with?"

Guidelines:
- Be warm, helpful, and conversational
- Answer questions about services and products based on the information above
- After 2-3 exchanges, suggest scheduling a free consultation call
- If they share contact info, acknowledge warmly
- Keep responses concise unless they ask for details
- For pricing questions, mention the prices above if available, or suggest a call to discuss their specific needs
- If asked about something not listed above, say you'd be happy to connect them with the team for more details

Example meeting scheduling flow:
User: "I'd like to schedule a meeting"
You: "I'd be happy to help you schedule a consultation! Could I get your name and email address?"
User: "John Smith, john@example.com"
You: "Thanks John! When would work best for you? We have availability this week and next."
User: "How about Thursday at 2pm?"
You: "MEETING_REQUEST: John Smith | john@example.com | Thursday at 2pm | General consultation"
"Great choice! I've submitted your meeting request for Thursday at 2pm. Our team will confirm this time slot with you via email shortly. Is there anything specific you'd like to discuss in the meeting?"
"#,
        about = about_section(company, about),
        services = services_section(services),
        products = products_section(products),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> CompanyConfig {
        CompanyConfig {
            name: "MITA ICT".to_string(),
            contact_email: "info@mitaict.com".to_string(),
            website: "www.mitaict.com".to_string(),
        }
    }

    #[test]
    fn empty_catalog_uses_fallbacks() {
        let prompt = compose_system_prompt(&company(), &[], &[], None);
        for (title, _) in FALLBACK_SERVICES {
            assert!(prompt.contains(title), "missing {title}");
        }
        for (name, _) in FALLBACK_PRODUCTS {
            assert!(prompt.contains(name), "missing {name}");
        }
        assert!(prompt.contains(
            "About Us: MITA ICT is a consulting company with 20+ years of experience"
        ));
    }

    #[test]
    fn stored_catalog_is_enumerated_with_prices() {
        let services = vec![
            Service::new("Cloud Audits".into(), "Review of cloud spend.".into(), "Cloud".into()),
            Service::new("Sales Coaching".into(), "Team workshops.".into(), "Users".into()),
        ];
        let products = vec![
            SaasProduct::new("Ticketer".into(), "Helpdesk".into(), "#".into(), vec![], Some("$9/mo".into())),
            SaasProduct::new("Mapper".into(), "GIS".into(), "#".into(), vec![], None),
        ];
        let prompt = compose_system_prompt(&company(), &services, &products, None);

        assert!(prompt.contains("1. Cloud Audits - Review of cloud spend.\n2. Sales Coaching - Team workshops.\n"));
        assert!(prompt.contains("1. Ticketer - Helpdesk (Starting at $9/mo)\n2. Mapper - GIS\n"));
        assert!(!prompt.contains("Leading Teams"));
    }

    #[test]
    fn about_block_and_meeting_contract_present() {
        let mut about = AboutContent::empty();
        about.description = Some("Consulting across the Nordics.".into());
        let prompt = compose_system_prompt(&company(), &[], &[], Some(&about));

        assert!(prompt.contains("- Company: MITA ICT\n- Experience: 20+ years"));
        assert!(prompt.contains("- Consulting across the Nordics."));
        assert!(prompt.contains("MEETING_REQUEST: [name] | [email] | [preferred_datetime] | [topic]"));
        assert!(prompt.contains("Our team at info@mitaict.com will review it"));
    }
}
