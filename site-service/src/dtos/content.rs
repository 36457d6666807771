use super::rfc3339;
use crate::models::{AboutContent, Expertise, SaasProduct, Service};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for both creating and replacing a service.
#[derive(Debug, Deserialize, Validate)]
pub struct ServiceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            created_at: rfc3339(&service.created_at),
            updated_at: rfc3339(&service.updated_at),
            id: service.id,
            title: service.title,
            description: service.description,
            icon: service.icon,
        }
    }
}

/// Body for both creating and replacing a product.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 2000))]
    pub url: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub price: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub features: Vec<String>,
    pub price: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SaasProduct> for ProductResponse {
    fn from(product: SaasProduct) -> Self {
        Self {
            created_at: rfc3339(&product.created_at),
            updated_at: rfc3339(&product.updated_at),
            id: product.id,
            name: product.name,
            description: product.description,
            url: product.url,
            features: product.features,
            price: product.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExpertiseDto {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl From<Expertise> for ExpertiseDto {
    fn from(e: Expertise) -> Self {
        Self {
            title: e.title,
            description: e.description,
            items: e.items,
        }
    }
}

impl From<ExpertiseDto> for Expertise {
    fn from(e: ExpertiseDto) -> Self {
        Self {
            title: e.title,
            description: e.description,
            items: e.items,
        }
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAboutRequest {
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub years_experience: Option<String>,
    #[validate(length(max = 20000))]
    pub story: Option<String>,
    pub expertise: Option<Vec<ExpertiseDto>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AboutResponse {
    pub id: String,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub years_experience: Option<String>,
    pub story: Option<String>,
    pub expertise: Vec<ExpertiseDto>,
    pub updated_at: String,
}

impl From<AboutContent> for AboutResponse {
    fn from(about: AboutContent) -> Self {
        Self {
            updated_at: rfc3339(&about.updated_at),
            id: about.id,
            company_name: about.company_name,
            description: about.description,
            years_experience: about.years_experience,
            story: about.story,
            expertise: about.expertise.into_iter().map(Into::into).collect(),
        }
    }
}
