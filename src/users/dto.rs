use serde::Deserialize;

/// PATCH body. Absent and `null` fields are both left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}
