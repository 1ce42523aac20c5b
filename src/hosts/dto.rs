use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateHostProfileRequest {
    pub business_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHostProfileRequest {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}
