//! First-boot data: the bootstrap admin account and the default catalog.

use super::store::{AdminStore, ContentStore};
use crate::config::{AdminBootstrapConfig, CompanyConfig};
use crate::models::{AboutContent, Admin, Expertise, SaasProduct, Service};
use crate::utils::{hash_password, Password};
use secrecy::ExposeSecret;
use service_core::error::AppError;

const ABOUT_STORY: &str = "We bring over 20 years of distinguished experience in the IT and telecommunications industry. Our journey has been marked by successfully leading sales and engineering teams, implementing cutting-edge solutions, and driving organizational excellence.\n\nOur expertise spans across multiple domains including IT infrastructure, telecommunications networks, and enterprise software solutions. We have a proven track record in selling and implementing sophisticated software systems such as OSS (Operations Support Systems), OBS (Order and Billing Systems), and comprehensive cybersecurity solutions including EDR (Endpoint Detection and Response), MDR (Managed Detection and Response), and XDR (Extended Detection and Response).\n\nClient satisfaction is not just a goal, it is our foundation. We pride ourselves on understanding our clients' unique challenges and delivering tailored solutions that drive real business value. Our approach combines technical excellence with strategic thinking, ensuring that technology serves your business objectives.\n\nWhether you're looking to optimize your IT infrastructure, implement new telecommunications systems, or build high-performing teams, we bring the experience, expertise, and dedication to help you succeed.";

/// Create the configured admin unless an account with that username exists.
pub async fn ensure_admin(
    admins: &dyn AdminStore,
    config: &AdminBootstrapConfig,
) -> Result<(), AppError> {
    if admins.find_admin_by_username(&config.username).await?.is_some() {
        tracing::debug!(username = %config.username, "Admin account already present");
        return Ok(());
    }

    let hash = hash_password(&Password::new(config.password.expose_secret().clone()))?;
    let admin = Admin::new(config.username.clone(), config.email.clone(), hash.into_string());

    match admins.insert_admin(&admin).await {
        Ok(()) => {
            tracing::info!(username = %config.username, "Bootstrap admin account created");
            Ok(())
        }
        // Another instance won the race.
        Err(e) if e.is_conflict() => Ok(()),
        Err(e) => Err(e),
    }
}

fn default_services() -> Vec<Service> {
    [
        (
            "IT and Telecommunication",
            "Comprehensive IT and telecom consulting services with 20+ years of industry experience. From infrastructure to advanced solutions.",
            "Network",
        ),
        (
            "Company Registration in Sweden",
            "Complete support for company registration and business setup in Sweden. Navigate Swedish regulations with ease.",
            "Building2",
        ),
        (
            "Leading Teams",
            "Expert leadership consulting for sales and engineering teams. Build high-performing organizations.",
            "Users",
        ),
    ]
    .into_iter()
    .map(|(title, description, icon)| Service::new(title.into(), description.into(), icon.into()))
    .collect()
}

fn default_products() -> Vec<SaasProduct> {
    let product = |name: &str, description: &str, url: &str, features: [&str; 4]| {
        SaasProduct::new(
            name.into(),
            description.into(),
            url.into(),
            features.iter().map(|f| f.to_string()).collect(),
            None,
        )
    };
    vec![
        product(
            "MITACRM",
            "Powerful CRM solution designed for modern businesses. Streamline your customer relationships.",
            "https://mitacrm.com/",
            ["Contact Management", "Sales Pipeline", "Analytics Dashboard", "Integration Ready"],
        ),
        product(
            "Routing System",
            "Advanced routing system for telecommunications and network management.",
            "https://trustcode.dev/",
            ["Smart Routing", "Real-time Monitoring", "Scalable Architecture", "API Access"],
        ),
        product(
            "White Label Software",
            "Customizable white label solutions for your business needs.",
            "#",
            ["Full Customization", "Your Branding", "Quick Deployment", "Ongoing Support"],
        ),
    ]
}

fn default_about(company: &CompanyConfig) -> AboutContent {
    let expertise = |title: &str, items: [&str; 3]| Expertise {
        title: title.to_string(),
        description: String::new(),
        items: items.iter().map(|i| i.to_string()).collect(),
    };

    AboutContent {
        company_name: Some(company.name.clone()),
        description: Some(
            "Consulting in IT, telecommunications and leadership for companies of every size."
                .to_string(),
        ),
        years_experience: Some("20+".to_string()),
        story: Some(ABOUT_STORY.to_string()),
        expertise: vec![
            expertise("IT Infrastructure", ["Network Design", "Cloud Solutions", "System Integration"]),
            expertise(
                "Telecommunications",
                ["OSS Implementation", "Network Optimization", "Voice & Data Solutions"],
            ),
            expertise(
                "Cybersecurity",
                ["EDR/MDR/XDR Solutions", "Security Audits", "Compliance Management"],
            ),
            expertise("Leadership", ["Team Building", "Sales Management", "P&L Optimization"]),
        ],
        ..AboutContent::empty()
    }
}

/// Fill empty collections with the default catalog. Collections that
/// already hold data are left alone.
pub async fn seed_content(content: &dyn ContentStore, company: &CompanyConfig) -> Result<(), AppError> {
    if content.list_services().await?.is_empty() {
        for service in default_services() {
            content.insert_service(&service).await?;
        }
        tracing::info!("Default services initialized");
    }

    if content.list_products().await?.is_empty() {
        for product in default_products() {
            content.insert_product(&product).await?;
        }
        tracing::info!("Default SaaS products initialized");
    }

    if content.get_about().await?.is_none() {
        content.upsert_about(&default_about(company)).await?;
        tracing::info!("Default About content initialized");
    }

    Ok(())
}
