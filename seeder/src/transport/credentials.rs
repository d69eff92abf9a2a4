use serde_json::{Value, json};

/// Login material for one teacher.
///
/// The token is the only mutable part. It is replaced in place by
/// [`ApiClient`](super::ApiClient) when the server answers 401; callers hand
/// the cell over as `&mut`, so at most one stage can refresh it at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    user_name: String,
    password: String,
    token: String,
}

impl Credentials {
    pub fn new(
        user_name: impl Into<String>,
        password: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
            token: token.into(),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn replace_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }
}

pub(crate) fn login_body(user_name: &str, password: &str) -> Value {
    json!({ "userName": user_name, "password": password })
}
